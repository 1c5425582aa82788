//! Movie catalog state: full list, latest releases, search, and favorites.
//!
//! DESIGN
//! ======
//! Every fetching action shares one `loading`/`error` pair rather than
//! tracking them per list. Failures are logged and recorded, never returned;
//! callers observe them only through `error` and an unchanged or empty list.
//!
//! A `Movie` takes its id from the backend-assigned document id; a stored
//! `id` field never overrides it and is dropped.
//!
//! TRADE-OFFS
//! ==========
//! Search filters a bounded prefix of the collection client-side instead of
//! using an index, so titles beyond the first `SEARCH_SCAN_LIMIT` documents
//! are never matched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::sync::watch;

use super::{BusyGuard, BusyStore};
use crate::config::DEFAULT_MOVIES_COLLECTION;
use crate::net::types::{Document, DocumentStore, Query, SortDirection, StoreError};

pub const RELEASE_DATE_FIELD: &str = "release_date";
pub const LATEST_LIMIT: usize = 4;
pub const SEARCH_SCAN_LIMIT: usize = 50;
pub const SEARCH_RESULT_LIMIT: usize = 5;

// =============================================================================
// MOVIE
// =============================================================================

/// A catalog entry. Known fields are typed; anything else the document carries
/// is kept verbatim in `extra`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub release_date: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Movie {
    /// Look up an untyped field (`poster_path`, `overview`, ...).
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.extra.get(name)
    }

    fn matches_terms(&self, terms: &[String]) -> bool {
        let title = self.title.to_lowercase();
        terms.iter().all(|term| title.contains(term.as_str()))
    }
}

impl From<Document> for Movie {
    fn from(doc: Document) -> Self {
        let mut fields = doc.fields;
        // The document id is authoritative.
        fields.remove("id");
        let title = take_text(&mut fields, "title");
        let release_date = take_text(&mut fields, RELEASE_DATE_FIELD);
        Self { id: doc.id, title, release_date, extra: fields }
    }
}

fn take_text(fields: &mut Map<String, Value>, key: &str) -> String {
    match fields.remove(key) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s,
        Some(other) => other.to_string(),
    }
}

// =============================================================================
// STATE
// =============================================================================

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CatalogState {
    pub movies: Vec<Movie>,
    pub search_results: Vec<Movie>,
    pub latest_movies: Vec<Movie>,
    pub favorite_movies: Vec<Movie>,
    pub loading: bool,
    pub error: Option<String>,
}

impl CatalogState {
    /// Find a movie in the full catalog list.
    #[must_use]
    pub fn movie_by_id(&self, id: &str) -> Option<&Movie> {
        self.movies.iter().find(|m| m.id == id)
    }

    #[must_use]
    pub fn favorite_movies(&self) -> &[Movie] {
        &self.favorite_movies
    }

    #[must_use]
    pub fn search_results(&self) -> &[Movie] {
        &self.search_results
    }

    #[must_use]
    pub fn latest_movies(&self) -> &[Movie] {
        &self.latest_movies
    }

    #[must_use]
    pub fn is_favorite(&self, id: &str) -> bool {
        self.favorite_movies.iter().any(|m| m.id == id)
    }
}

// =============================================================================
// STORE
// =============================================================================

pub struct CatalogStore {
    state: CatalogState,
    tx: watch::Sender<CatalogState>,
    collection: String,
}

impl Default for CatalogStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BusyStore for CatalogStore {
    fn begin(&mut self) {
        self.state.loading = true;
        self.state.error = None;
    }

    fn end(&mut self) {
        self.state.loading = false;
    }

    fn publish(&self) {
        self.tx.send_replace(self.state.clone());
    }
}

impl CatalogStore {
    #[must_use]
    pub fn new() -> Self {
        Self::with_collection(DEFAULT_MOVIES_COLLECTION)
    }

    /// Store backed by a differently named collection.
    #[must_use]
    pub fn with_collection(collection: impl Into<String>) -> Self {
        let (tx, _) = watch::channel(CatalogState::default());
        Self { state: CatalogState::default(), tx, collection: collection.into() }
    }

    #[must_use]
    pub fn state(&self) -> &CatalogState {
        &self.state
    }

    /// Receiver that observes every state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CatalogState> {
        self.tx.subscribe()
    }

    /// Replace `movies` with the whole catalog, newest release first.
    pub async fn fetch_movies(&mut self, db: &dyn DocumentStore) {
        let query = Query::collection(&self.collection).order_by(RELEASE_DATE_FIELD, SortDirection::Descending);
        let mut busy = BusyGuard::start(self);
        match db.query(&query).await {
            Ok(docs) => busy.state.movies = docs.into_iter().map(Movie::from).collect(),
            Err(e) => busy.record_failure("error fetching movies", &e),
        }
    }

    /// Replace `latest_movies` with the newest `LATEST_LIMIT` releases.
    pub async fn fetch_latest_movies(&mut self, db: &dyn DocumentStore) {
        let query = Query::collection(&self.collection)
            .order_by(RELEASE_DATE_FIELD, SortDirection::Descending)
            .limit(LATEST_LIMIT);
        let mut busy = BusyGuard::start(self);
        match db.query(&query).await {
            Ok(docs) => busy.state.latest_movies = docs.into_iter().map(Movie::from).collect(),
            Err(e) => busy.record_failure("error fetching latest movies", &e),
        }
    }

    /// Case-insensitive title search: every whitespace-separated term must
    /// appear in the title. A blank query clears results without a request.
    pub async fn search_movies(&mut self, db: &dyn DocumentStore, query_text: &str) {
        let terms = search_terms(query_text);
        if terms.is_empty() {
            self.clear_search_results();
            return;
        }

        let query = Query::collection(&self.collection).limit(SEARCH_SCAN_LIMIT);
        let mut busy = BusyGuard::start(self);
        match db.query(&query).await {
            Ok(docs) => {
                busy.state.search_results = docs
                    .into_iter()
                    .map(Movie::from)
                    .filter(|m| m.matches_terms(&terms))
                    .take(SEARCH_RESULT_LIMIT)
                    .collect();
            }
            Err(e) => busy.record_failure("error searching movies", &e),
        }
    }

    /// Fetch one movie by id. `None` when it does not exist or the request fails.
    pub async fn get_movie_details(&mut self, db: &dyn DocumentStore, id: &str) -> Option<Movie> {
        let collection = self.collection.clone();
        let mut busy = BusyGuard::start(self);
        match db.get_by_id(&collection, id).await {
            Ok(doc) => doc.map(Movie::from),
            Err(e) => {
                busy.record_failure("error getting movie details", &e);
                None
            }
        }
    }

    /// Add the movie to favorites, or remove it if its id is already there.
    pub fn toggle_favorite(&mut self, movie: Movie) {
        let favorites = &mut self.state.favorite_movies;
        match favorites.iter().position(|m| m.id == movie.id) {
            Some(index) => {
                favorites.remove(index);
            }
            None => favorites.push(movie),
        }
        self.publish();
    }

    pub fn clear_search_results(&mut self) {
        self.state.search_results.clear();
        self.publish();
    }

    pub fn clear_error(&mut self) {
        self.state.error = None;
        self.publish();
    }

    fn record_failure(&mut self, context: &str, err: &StoreError) {
        tracing::error!(error = %err, collection = %self.collection, "{context}");
        self.state.error = Some(err.to_string());
    }
}

fn search_terms(query_text: &str) -> Vec<String> {
    query_text
        .to_lowercase()
        .split_whitespace()
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
#[path = "catalog_test.rs"]
mod tests;
