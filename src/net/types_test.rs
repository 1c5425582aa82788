use super::*;

#[test]
fn rejected_known_code_reads_as_sentence() {
    let err = AuthError::Rejected { code: "INVALID_PASSWORD".into() };
    assert_eq!(err.to_string(), "the password is invalid");
}

#[test]
fn rejected_unknown_code_keeps_raw_code() {
    let err = AuthError::Rejected { code: "OPERATION_NOT_ALLOWED".into() };
    assert_eq!(err.to_string(), "identity provider rejected request: OPERATION_NOT_ALLOWED");
}

#[test]
fn store_response_error_display() {
    let err = StoreError::Response { status: 403, message: "Missing or insufficient permissions.".into() };
    assert_eq!(err.to_string(), "document store error (status 403): Missing or insufficient permissions.");
}

#[test]
fn google_provider_id() {
    assert_eq!(FederatedProvider::Google.provider_id(), "google.com");
}

#[test]
fn query_builder_sets_all_parts() {
    let q = Query::collection("movies")
        .order_by("release_date", SortDirection::Descending)
        .limit(4);
    assert_eq!(q.collection, "movies");
    assert_eq!(q.order_by, Some(("release_date".to_string(), SortDirection::Descending)));
    assert_eq!(q.limit, Some(4));
}

#[test]
fn bare_query_has_no_order_or_limit() {
    let q = Query::collection("movies");
    assert!(q.order_by.is_none());
    assert!(q.limit.is_none());
}
