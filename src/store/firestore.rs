//! Cloud Firestore backend over the REST API
//!
//! Firestore wraps every value in a typed envelope (`{"stringValue": "..."}`,
//! `{"integerValue": "4"}`, ...). Documents are decoded into plain JSON
//! fields on the way in and encoded again for updates.

use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::{json, Map, Value};

use super::{Direction, Document, DocumentStore, Fields, OrderBy, StoreError};

const DEFAULT_ENDPOINT: &str = "https://firestore.googleapis.com/v1";

/// Characters escaped when a document id becomes a path segment
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'?')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Firestore REST client for one database
#[derive(Debug, Clone)]
pub struct FirestoreStore {
    client: Client,
    endpoint: String,
    project_id: String,
    database: String,
    api_key: Option<String>,
}

impl FirestoreStore {
    pub fn new(project_id: &str, database: &str) -> Self {
        Self {
            client: Client::new(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            project_id: project_id.to_string(),
            database: database.to_string(),
            api_key: None,
        }
    }

    pub fn with_api_key(mut self, key: &str) -> Self {
        self.api_key = Some(key.to_string());
        self
    }

    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.trim_end_matches('/').to_string();
        self
    }

    /// `.../projects/{project}/databases/{database}/documents`
    fn documents_url(&self) -> String {
        format!(
            "{}/projects/{}/databases/{}/documents",
            self.endpoint,
            utf8_percent_encode(&self.project_id, SEGMENT),
            utf8_percent_encode(&self.database, SEGMENT)
        )
    }

    fn document_url(&self, collection: &str, id: &str) -> String {
        format!(
            "{}/{}/{}",
            self.documents_url(),
            utf8_percent_encode(collection, SEGMENT),
            utf8_percent_encode(id, SEGMENT)
        )
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => request.query(&[("key", key)]),
            None => request,
        }
    }
}

#[async_trait]
impl DocumentStore for FirestoreStore {
    async fn list(&self, collection: &str, order: &OrderBy) -> Result<Vec<Document>, StoreError> {
        let url = format!("{}:runQuery", self.documents_url());
        let body = run_query_body(collection, order);
        let response = self
            .authorize(self.client.post(&url))
            .json(&body)
            .send()
            .await?;
        let response = check_status(response).await?;
        let rows: Vec<Value> = response.json().await?;

        let mut docs = Vec::with_capacity(rows.len());
        for row in rows {
            // Rows without a document only carry readTime / progress info
            if let Some(doc) = row.get("document") {
                docs.push(decode_document(doc)?);
            }
        }
        tracing::debug!("Firestore returned {} documents from {}", docs.len(), collection);
        Ok(docs)
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        let url = self.document_url(collection, id);
        let response = self.authorize(self.client.get(&url)).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = check_status(response).await?;
        let doc: Value = response.json().await?;
        decode_document(&doc).map(Some)
    }

    async fn update(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError> {
        let url = self.document_url(collection, id);
        let mut request = self
            .authorize(self.client.patch(&url))
            .query(&[("currentDocument.exists", "true")]);
        for name in fields.keys() {
            request = request.query(&[("updateMask.fieldPaths", name)]);
        }

        let body = json!({ "fields": encode_fields(&fields) });
        let response = request.json(&body).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(StoreError::MissingDocument {
                collection: collection.to_string(),
                id: id.to_string(),
            });
        }
        check_status(response).await?;
        Ok(())
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(StoreError::Status {
        status: status.as_u16(),
        message,
    })
}

fn run_query_body(collection: &str, order: &OrderBy) -> Value {
    let direction = match order.direction {
        Direction::Ascending => "ASCENDING",
        Direction::Descending => "DESCENDING",
    };
    json!({
        "structuredQuery": {
            "from": [{ "collectionId": collection }],
            "orderBy": [{
                "field": { "fieldPath": order.field },
                "direction": direction
            }]
        }
    })
}

/// Decode a Firestore document resource into a [`Document`]
fn decode_document(doc: &Value) -> Result<Document, StoreError> {
    let name = doc
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| StoreError::Decode("document without a name".to_string()))?;
    // The id is the last path segment of the resource name
    let id = name.rsplit('/').next().unwrap_or(name);

    let fields = match doc.get("fields").and_then(Value::as_object) {
        Some(raw) => raw
            .iter()
            .map(|(k, v)| (k.clone(), decode_value(v)))
            .collect(),
        None => Fields::new(),
    };
    Ok(Document::new(id, fields))
}

/// Unwrap one typed Firestore value into plain JSON
fn decode_value(value: &Value) -> Value {
    let Some(obj) = value.as_object() else {
        return Value::Null;
    };
    let Some((kind, inner)) = obj.iter().next() else {
        return Value::Null;
    };
    match kind.as_str() {
        "nullValue" => Value::Null,
        // int64 travels as a decimal string
        "integerValue" => match inner {
            Value::String(s) => s.parse::<i64>().map(Value::from).unwrap_or(Value::Null),
            other => other.clone(),
        },
        "booleanValue" | "doubleValue" | "timestampValue" | "stringValue" | "referenceValue"
        | "bytesValue" | "geoPointValue" => inner.clone(),
        "arrayValue" => Value::Array(
            inner
                .get("values")
                .and_then(Value::as_array)
                .map(|values| values.iter().map(decode_value).collect())
                .unwrap_or_default(),
        ),
        "mapValue" => Value::Object(
            inner
                .get("fields")
                .and_then(Value::as_object)
                .map(|fields| {
                    fields
                        .iter()
                        .map(|(k, v)| (k.clone(), decode_value(v)))
                        .collect()
                })
                .unwrap_or_default(),
        ),
        other => {
            tracing::warn!("Unknown Firestore value type: {}", other);
            Value::Null
        }
    }
}

fn encode_fields(fields: &Fields) -> Map<String, Value> {
    fields
        .iter()
        .map(|(k, v)| (k.clone(), encode_value(v)))
        .collect()
}

/// Wrap plain JSON into a typed Firestore value
fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => match n.as_i64() {
            Some(i) => json!({ "integerValue": i.to_string() }),
            None => json!({ "doubleValue": n.as_f64() }),
        },
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => json!({
            "arrayValue": { "values": items.iter().map(encode_value).collect::<Vec<_>>() }
        }),
        Value::Object(map) => json!({ "mapValue": { "fields": encode_fields(map) } }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_document() {
        let raw = json!({
            "name": "projects/p/databases/(default)/documents/blogs/abc123",
            "fields": {
                "title": { "stringValue": "Hello" },
                "likes": { "integerValue": "4" },
                "date": { "timestampValue": "2024-01-05T10:00:00Z" },
                "tags": { "arrayValue": { "values": [{ "stringValue": "rust" }] } },
                "empty": { "arrayValue": {} },
                "author": { "nullValue": null },
                "meta": { "mapValue": { "fields": { "draft": { "booleanValue": false } } } }
            },
            "createTime": "2024-01-05T10:00:00Z"
        });

        let doc = decode_document(&raw).unwrap();
        assert_eq!(doc.id, "abc123");
        assert_eq!(doc.fields["title"], json!("Hello"));
        assert_eq!(doc.fields["likes"], json!(4));
        assert_eq!(doc.fields["date"], json!("2024-01-05T10:00:00Z"));
        assert_eq!(doc.fields["tags"], json!(["rust"]));
        assert_eq!(doc.fields["empty"], json!([]));
        assert_eq!(doc.fields["author"], Value::Null);
        assert_eq!(doc.fields["meta"], json!({ "draft": false }));
    }

    #[test]
    fn test_decode_document_without_name_fails() {
        let err = decode_document(&json!({ "fields": {} })).unwrap_err();
        assert!(matches!(err, StoreError::Decode(_)));
    }

    #[test]
    fn test_encode_fields() {
        let mut fields = Fields::new();
        fields.insert("likes".to_string(), json!(5));
        fields.insert("ratio".to_string(), json!(0.5));
        fields.insert("tags".to_string(), json!(["a"]));

        let encoded = encode_fields(&fields);
        assert_eq!(encoded["likes"], json!({ "integerValue": "5" }));
        assert_eq!(encoded["ratio"], json!({ "doubleValue": 0.5 }));
        assert_eq!(
            encoded["tags"],
            json!({ "arrayValue": { "values": [{ "stringValue": "a" }] } })
        );
    }

    #[test]
    fn test_urls() {
        let store = FirestoreStore::new("portfolio", "(default)").with_endpoint("http://localhost:8080/v1/");
        assert_eq!(
            store.document_url("blogs", "a b/c"),
            "http://localhost:8080/v1/projects/portfolio/databases/(default)/documents/blogs/a%20b%2Fc"
        );
    }

    #[test]
    fn test_run_query_body() {
        let body = run_query_body("blogs", &OrderBy::desc("date"));
        assert_eq!(body["structuredQuery"]["from"][0]["collectionId"], json!("blogs"));
        assert_eq!(
            body["structuredQuery"]["orderBy"][0]["direction"],
            json!("DESCENDING")
        );
    }
}
