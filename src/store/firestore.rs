//! Cloud Firestore over its REST API.
//!
//! Documents travel as Firestore typed values (`stringValue`, `mapValue`, ...).
//! Bodies are converted through their serde form, so the wire names match
//! what the web client writes.

use super::{sort_newest_first, ConfigStore, Configuration};
use crate::bodies::Body;
use crate::error::StorageError;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{json, Map, Value};

const API_ROOT: &str = "https://firestore.googleapis.com/v1";

pub struct FirestoreStore {
    documents_url: String,
    collection: String,
    api_key: String,
    agent: ureq::Agent,
}

impl FirestoreStore {
    pub fn new(project_id: &str, collection: &str, api_key: &str) -> Self {
        Self {
            documents_url: format!("{API_ROOT}/projects/{project_id}/databases/(default)/documents"),
            collection: collection.to_string(),
            api_key: api_key.to_string(),
            agent: ureq::AgentBuilder::new()
                .timeout(std::time::Duration::from_secs(20))
                .build(),
        }
    }

    fn collection_url(&self) -> String {
        format!("{}/{}", self.documents_url, self.collection)
    }
}

impl ConfigStore for FirestoreStore {
    fn save(&self, config: &Configuration) -> Result<String, StorageError> {
        let body = encode_configuration(config, Utc::now())?;
        let doc: Value = self
            .agent
            .post(&self.collection_url())
            .query("key", &self.api_key)
            .send_json(body)?
            .into_json()
            .map_err(|e| StorageError::Malformed(e.to_string()))?;
        let name = doc["name"]
            .as_str()
            .ok_or_else(|| StorageError::Malformed("created document has no name".to_string()))?;
        Ok(document_id(name).to_string())
    }

    fn list_all(&self) -> Result<Vec<Configuration>, StorageError> {
        let query = json!({
            "structuredQuery": {
                "from": [{ "collectionId": self.collection }],
                "orderBy": [{ "field": { "fieldPath": "createdAt" }, "direction": "DESCENDING" }],
            }
        });
        let rows: Value = self
            .agent
            .post(&format!("{}:runQuery", self.documents_url))
            .query("key", &self.api_key)
            .send_json(query)?
            .into_json()
            .map_err(|e| StorageError::Malformed(e.to_string()))?;
        decode_query_rows(&rows)
    }

    fn get_by_id(&self, id: &str) -> Result<Option<Configuration>, StorageError> {
        if id.is_empty() || id.contains('/') {
            return Ok(None);
        }
        let url = format!("{}/{}", self.collection_url(), id);
        match self.agent.get(&url).query("key", &self.api_key).call() {
            Ok(resp) => {
                let doc: Value = resp
                    .into_json()
                    .map_err(|e| StorageError::Malformed(e.to_string()))?;
                decode_document(&doc).map(Some)
            }
            Err(ureq::Error::Status(404, _)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// Last path segment of a full document name.
pub(crate) fn document_id(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}

pub(crate) fn encode_configuration(config: &Configuration, now: DateTime<Utc>) -> Result<Value, StorageError> {
    let planets = serde_json::to_value(config.planets.as_deref().unwrap_or_default())
        .map_err(|e| StorageError::Malformed(e.to_string()))?;
    Ok(json!({
        "fields": {
            "name": { "stringValue": config.name },
            "planets": to_typed(&planets),
            "createdAt": { "timestampValue": now.to_rfc3339_opts(SecondsFormat::Micros, true) },
        }
    }))
}

/// Rows from `runQuery`; rows carrying only a `readTime` are skipped.
pub(crate) fn decode_query_rows(rows: &Value) -> Result<Vec<Configuration>, StorageError> {
    let rows = rows
        .as_array()
        .ok_or_else(|| StorageError::Malformed("runQuery response is not an array".to_string()))?;
    let mut configs = rows
        .iter()
        .filter_map(|row| row.get("document"))
        .map(decode_document)
        .collect::<Result<Vec<_>, _>>()?;
    sort_newest_first(&mut configs);
    Ok(configs)
}

pub(crate) fn decode_document(doc: &Value) -> Result<Configuration, StorageError> {
    let name = doc["name"]
        .as_str()
        .ok_or_else(|| StorageError::Malformed("document has no name".to_string()))?;
    let empty = Map::new();
    let fields = doc["fields"].as_object().unwrap_or(&empty);

    let label = fields
        .get("name")
        .and_then(|v| v["stringValue"].as_str())
        .unwrap_or_default()
        .to_string();

    let planets = fields.get("planets").and_then(|typed| {
        let plain = from_typed(typed)?;
        match serde_json::from_value::<Vec<Body>>(plain) {
            Ok(bodies) => Some(bodies),
            Err(e) => {
                log::warn!("document {name} has an unreadable body list: {e}");
                None
            }
        }
    });

    let created_at = fields
        .get("createdAt")
        .and_then(|v| v["timestampValue"].as_str())
        .or_else(|| doc["createTime"].as_str())
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|t| t.with_timezone(&Utc));

    Ok(Configuration {
        id: Some(document_id(name).to_string()),
        name: label,
        planets,
        created_at,
    })
}

/// Plain JSON to a Firestore typed value.
pub(crate) fn to_typed(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => match n.as_i64() {
            Some(i) => json!({ "integerValue": i.to_string() }),
            None => json!({ "doubleValue": n.as_f64().unwrap_or_default() }),
        },
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => json!({
            "arrayValue": { "values": items.iter().map(to_typed).collect::<Vec<_>>() }
        }),
        Value::Object(map) => {
            let fields: Map<String, Value> = map.iter().map(|(k, v)| (k.clone(), to_typed(v))).collect();
            json!({ "mapValue": { "fields": fields } })
        }
    }
}

/// Firestore typed value to plain JSON. `None` for shapes we don't store.
pub(crate) fn from_typed(typed: &Value) -> Option<Value> {
    let (kind, inner) = typed.as_object()?.iter().next()?;
    match kind.as_str() {
        "nullValue" => Some(Value::Null),
        "booleanValue" => inner.as_bool().map(Value::Bool),
        "integerValue" => {
            let i = match inner {
                Value::String(s) => s.parse::<i64>().ok()?,
                other => other.as_i64()?,
            };
            Some(Value::from(i))
        }
        "doubleValue" => inner.as_f64().map(Value::from),
        "stringValue" | "timestampValue" | "referenceValue" => inner.as_str().map(Value::from),
        "arrayValue" => {
            let values = match inner.get("values") {
                Some(Value::Array(items)) => items.iter().map(from_typed).collect::<Option<Vec<_>>>()?,
                _ => Vec::new(),
            };
            Some(Value::Array(values))
        }
        "mapValue" => {
            let mut out = Map::new();
            if let Some(fields) = inner.get("fields").and_then(Value::as_object) {
                for (k, v) in fields {
                    out.insert(k.clone(), from_typed(v)?);
                }
            }
            Some(Value::Object(out))
        }
        _ => None,
    }
}
