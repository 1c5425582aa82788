//! Firestore REST client.
//!
//! Thin HTTP wrapper for `documents:runQuery` and single-document GET.
//! Firestore wraps every field in a typed value (`{"stringValue": "..."}`);
//! `decode_value` flattens those into plain JSON so callers only ever see
//! [`Document`] field maps.

use serde::Deserialize;
use serde_json::{Map, Value};

use super::types::{Document, DocumentStore, Query, SortDirection, StoreError};

// =============================================================================
// CLIENT
// =============================================================================

pub struct FirestoreClient {
    http: reqwest::Client,
    base_url: String,
    project_id: String,
    api_key: String,
}

impl FirestoreClient {
    #[must_use]
    pub fn new(
        http: reqwest::Client,
        base_url: impl Into<String>,
        project_id: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self { http, base_url: base_url.into(), project_id: project_id.into(), api_key: api_key.into() }
    }

    fn documents_url(&self) -> String {
        format!("{}/projects/{}/databases/(default)/documents", self.base_url, self.project_id)
    }

    /// Document URL with `collection` and `id` percent-encoded as single path segments.
    fn document_url(&self, collection: &str, id: &str) -> Result<reqwest::Url, StoreError> {
        let mut url = reqwest::Url::parse(&self.documents_url()).map_err(|e| StoreError::Request(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|()| StoreError::Request(format!("base url cannot hold a path: {}", self.base_url)))?
            .extend([collection, id]);
        Ok(url)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<(u16, String), StoreError> {
        let response = request
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| StoreError::Request(e.to_string()))?;
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| StoreError::Request(e.to_string()))?;
        Ok((status, text))
    }
}

#[async_trait::async_trait]
impl DocumentStore for FirestoreClient {
    async fn query(&self, query: &Query) -> Result<Vec<Document>, StoreError> {
        let url = format!("{}:runQuery", self.documents_url());
        tracing::debug!(collection = %query.collection, limit = ?query.limit, "firestore runQuery");

        let (status, text) = self
            .send(self.http.post(&url).json(&structured_query(query)))
            .await?;
        if !(200..300).contains(&status) {
            return Err(parse_error(status, &text));
        }
        parse_run_query_response(&text)
    }

    async fn get_by_id(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        if !is_document_id(id) {
            return Ok(None);
        }
        let url = self.document_url(collection, id)?;
        tracing::debug!(%collection, %id, "firestore get");

        let (status, text) = self.send(self.http.get(url)).await?;
        if status == 404 {
            return Ok(None);
        }
        if !(200..300).contains(&status) {
            return Err(parse_error(status, &text));
        }
        parse_document(&text).map(Some)
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Deserialize)]
struct WireDocument {
    name: String,
    #[serde(default)]
    fields: Map<String, Value>,
}

#[derive(Deserialize)]
struct RunQueryEntry {
    document: Option<WireDocument>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

// =============================================================================
// REQUEST BUILDING
// =============================================================================

/// Ids that can name a document. Anything else cannot exist in the store.
fn is_document_id(id: &str) -> bool {
    !id.is_empty() && id != "." && id != ".." && !id.contains('/')
}

fn structured_query(query: &Query) -> Value {
    let mut structured = Map::new();
    structured.insert("from".into(), serde_json::json!([{ "collectionId": query.collection }]));
    if let Some((field, direction)) = &query.order_by {
        let direction = match direction {
            SortDirection::Ascending => "ASCENDING",
            SortDirection::Descending => "DESCENDING",
        };
        structured.insert(
            "orderBy".into(),
            serde_json::json!([{ "field": { "fieldPath": field }, "direction": direction }]),
        );
    }
    if let Some(limit) = query.limit {
        structured.insert("limit".into(), Value::from(limit));
    }
    serde_json::json!({ "structuredQuery": structured })
}

// =============================================================================
// PARSING
// =============================================================================

fn parse_run_query_response(json: &str) -> Result<Vec<Document>, StoreError> {
    let entries: Vec<RunQueryEntry> = serde_json::from_str(json).map_err(|e| StoreError::Parse(e.to_string()))?;
    // Entries without a document only carry a read time.
    entries
        .into_iter()
        .filter_map(|entry| entry.document)
        .map(into_document)
        .collect()
}

fn parse_document(json: &str) -> Result<Document, StoreError> {
    let wire: WireDocument = serde_json::from_str(json).map_err(|e| StoreError::Parse(e.to_string()))?;
    into_document(wire)
}

fn into_document(wire: WireDocument) -> Result<Document, StoreError> {
    let id = wire
        .name
        .rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| StoreError::Parse(format!("invalid document name: {}", wire.name)))?
        .to_string();
    Ok(Document { id, fields: decode_fields(wire.fields)? })
}

fn decode_fields(fields: Map<String, Value>) -> Result<Map<String, Value>, StoreError> {
    fields
        .into_iter()
        .map(|(key, value)| decode_value(value).map(|v| (key, v)))
        .collect()
}

/// Convert one Firestore typed value into plain JSON.
fn decode_value(value: Value) -> Result<Value, StoreError> {
    let mut typed = match value {
        Value::Object(typed) => typed,
        other => return Err(StoreError::Parse(format!("expected typed value object, got {other}"))),
    };
    let Some((kind, inner)) = typed.iter_mut().next().map(|(k, v)| (k.clone(), v.take())) else {
        return Err(StoreError::Parse("empty typed value".into()));
    };

    match (kind.as_str(), inner) {
        ("nullValue", _) => Ok(Value::Null),
        ("booleanValue", v @ Value::Bool(_)) => Ok(v),
        // Non-finite doubles arrive as "NaN", "Infinity", "-Infinity".
        ("doubleValue", v @ (Value::Number(_) | Value::String(_))) => Ok(v),
        ("integerValue", Value::String(s)) => s
            .parse::<i64>()
            .map(Value::from)
            .map_err(|_| StoreError::Parse(format!("invalid integerValue: {s}"))),
        ("integerValue", v @ Value::Number(_)) => Ok(v),
        ("stringValue" | "timestampValue" | "referenceValue" | "bytesValue", v @ Value::String(_)) => Ok(v),
        ("geoPointValue", v @ Value::Object(_)) => Ok(v),
        ("arrayValue", Value::Object(mut array)) => match array.remove("values") {
            Some(Value::Array(values)) => values
                .into_iter()
                .map(decode_value)
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            _ => Ok(Value::Array(Vec::new())),
        },
        ("mapValue", Value::Object(mut map)) => match map.remove("fields") {
            Some(Value::Object(fields)) => decode_fields(fields).map(Value::Object),
            _ => Ok(Value::Object(Map::new())),
        },
        (kind, inner) => Err(StoreError::Parse(format!("unsupported value {kind}: {inner}"))),
    }
}

fn parse_error(status: u16, body: &str) -> StoreError {
    // runQuery wraps errors in a one-element array.
    let message = serde_json::from_str::<ErrorEnvelope>(body)
        .or_else(|_| {
            serde_json::from_str::<Vec<ErrorEnvelope>>(body).and_then(|mut errs| {
                errs.pop()
                    .ok_or_else(|| serde::de::Error::custom("empty error array"))
            })
        })
        .map_or_else(|_| body.to_string(), |env| env.error.message);
    StoreError::Response { status, message }
}

#[cfg(test)]
#[path = "firestore_test.rs"]
mod tests;
