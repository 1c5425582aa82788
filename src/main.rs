use cinedeck::config::AppConfig;
use cinedeck::net::firestore::FirestoreClient;
use cinedeck::state::catalog::CatalogStore;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    let config = AppConfig::from_env().expect("config load failed");
    let http = config.http_client().expect("http client build failed");
    let db = FirestoreClient::new(http, &config.firestore_base_url, &config.project_id, &config.api_key);
    let mut catalog = CatalogStore::with_collection(&config.movies_collection);

    catalog.fetch_latest_movies(&db).await;
    for movie in catalog.state().latest_movies() {
        tracing::info!(id = %movie.id, title = %movie.title, release_date = %movie.release_date, "latest");
    }

    if let Some(query) = std::env::args().nth(1) {
        catalog.search_movies(&db, &query).await;
        tracing::info!(%query, hits = catalog.state().search_results().len(), "search");
        for movie in catalog.state().search_results() {
            tracing::info!(id = %movie.id, title = %movie.title, "match");
        }
    }

    if let Some(error) = &catalog.state().error {
        tracing::error!(%error, "catalog request failed");
        std::process::exit(1);
    }
}
