//! JSON:API document codec.
//!
//! API responses are JSON:API documents:
//!
//! ```json
//! {
//!   "data": [{ "type": "league", "id": "1", "attributes": { ... },
//!              "relationships": { "player": { "data": { "type": "player", "id": "5" } } } }],
//!   "included": [{ "type": "player", "id": "5", "attributes": { "login": "foo" } }],
//!   "meta": { "page": { "totalPages": 3 } }
//! }
//! ```
//!
//! Decoding flattens every resource into a single JSON object (`id`, the
//! attributes, and each relationship replaced by the flattened included
//! resource) and then deserializes that object into the DTO.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

/// How deep included relationships are resolved.
///
/// Relationships of included resources are resolved too, down to this depth;
/// below it only `{ "id": ... }` stubs are embedded. This also stops cycles.
const MAX_INCLUDE_DEPTH: usize = 3;

/// A DTO that is decoded from one JSON:API resource type.
pub trait ApiResource: DeserializeOwned {
    /// The `type` member of resources of this kind.
    const TYPE: &'static str;
}

#[derive(Debug, thiserror::Error)]
pub enum JsonApiError {
    #[error("Malformed JSON:API document: {0}")]
    Malformed(String),

    #[error("Expected resource type '{expected}', got '{actual}'")]
    UnexpectedType { expected: String, actual: String },

    #[error("Failed to decode {resource_type} resource: {source}")]
    Decode {
        resource_type: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode {resource_type} resource: {source}")]
    Encode {
        resource_type: String,
        #[source]
        source: serde_json::Error,
    },
}

impl JsonApiError {
    fn malformed(msg: impl Into<String>) -> Self {
        Self::Malformed(msg.into())
    }
}

/// Included resources indexed by type, then id.
struct IncludedIndex<'a> {
    resources: HashMap<&'a str, HashMap<&'a str, &'a Value>>,
}

impl<'a> IncludedIndex<'a> {
    fn from_document(document: &'a Value) -> Self {
        let mut resources: HashMap<&'a str, HashMap<&'a str, &'a Value>> = HashMap::new();
        if let Some(Value::Array(included)) = document.get("included") {
            for resource in included {
                let kind = resource.get("type").and_then(Value::as_str);
                let id = resource.get("id").and_then(Value::as_str);
                if let (Some(kind), Some(id)) = (kind, id) {
                    resources.entry(kind).or_default().insert(id, resource);
                }
            }
        }
        Self { resources }
    }

    fn get(&self, kind: &str, id: &str) -> Option<&'a Value> {
        self.resources.get(kind)?.get(id).copied()
    }
}

/// Decode the collection in `data` into DTOs, keeping document order.
pub fn decode_many<T: ApiResource>(document: &Value) -> Result<Vec<T>, JsonApiError> {
    let index = IncludedIndex::from_document(document);
    match document.get("data") {
        Some(Value::Array(resources)) => resources
            .iter()
            .map(|resource| decode_resource(resource, &index, T::TYPE))
            .collect(),
        Some(Value::Null) | None => Err(JsonApiError::malformed("document has no data")),
        Some(_) => Err(JsonApiError::malformed(
            "expected a collection, got a single resource",
        )),
    }
}

/// Decode the single resource in `data`; `null` data decodes to `None`.
pub fn decode_one<T: ApiResource>(document: &Value) -> Result<Option<T>, JsonApiError> {
    decode_one_as(document, T::TYPE)
}

/// Like [`decode_one`] for DTOs shared by several resource types.
pub fn decode_one_as<T: DeserializeOwned>(
    document: &Value,
    resource_type: &str,
) -> Result<Option<T>, JsonApiError> {
    let index = IncludedIndex::from_document(document);
    match document.get("data") {
        Some(Value::Null) => Ok(None),
        Some(resource @ Value::Object(_)) => {
            decode_resource(resource, &index, resource_type).map(Some)
        }
        Some(Value::Array(resources)) => match resources.as_slice() {
            [] => Ok(None),
            [resource] => decode_resource(resource, &index, resource_type).map(Some),
            _ => Err(JsonApiError::malformed(
                "expected a single resource, got a collection",
            )),
        },
        Some(_) | None => Err(JsonApiError::malformed("document has no data")),
    }
}

/// `meta.page.totalPages` of a paged document, if the server reported it.
pub fn total_pages(document: &Value) -> Option<u32> {
    document
        .pointer("/meta/page/totalPages")
        .and_then(Value::as_u64)
        .and_then(|pages| u32::try_from(pages).ok())
}

/// Build a request document for creating or updating one resource.
///
/// `relationships` are `(name, type, id)` triples of to-one relationships.
pub fn encode<A: Serialize>(
    resource_type: &str,
    id: Option<&str>,
    attributes: &A,
    relationships: &[(&str, &str, &str)],
) -> Result<Value, JsonApiError> {
    let attributes = serde_json::to_value(attributes).map_err(|source| JsonApiError::Encode {
        resource_type: resource_type.to_string(),
        source,
    })?;

    let mut resource = Map::new();
    resource.insert("type".to_string(), Value::String(resource_type.to_string()));
    if let Some(id) = id {
        resource.insert("id".to_string(), Value::String(id.to_string()));
    }
    resource.insert("attributes".to_string(), attributes);

    if !relationships.is_empty() {
        let relationships: Map<String, Value> = relationships
            .iter()
            .map(|(name, kind, id)| {
                (
                    (*name).to_string(),
                    serde_json::json!({ "data": { "type": kind, "id": id } }),
                )
            })
            .collect();
        resource.insert("relationships".to_string(), Value::Object(relationships));
    }

    Ok(serde_json::json!({ "data": Value::Object(resource) }))
}

fn decode_resource<T: DeserializeOwned>(
    resource: &Value,
    index: &IncludedIndex<'_>,
    expected: &str,
) -> Result<T, JsonApiError> {
    let actual = resource
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| JsonApiError::malformed("resource has no type"))?;
    if actual != expected {
        return Err(JsonApiError::UnexpectedType {
            expected: expected.to_string(),
            actual: actual.to_string(),
        });
    }

    let flattened = flatten(resource, index, MAX_INCLUDE_DEPTH)?;
    serde_json::from_value(flattened).map_err(|source| JsonApiError::Decode {
        resource_type: expected.to_string(),
        source,
    })
}

fn flatten(
    resource: &Value,
    index: &IncludedIndex<'_>,
    depth: usize,
) -> Result<Value, JsonApiError> {
    let id = resource
        .get("id")
        .and_then(Value::as_str)
        .ok_or_else(|| JsonApiError::malformed("resource has no id"))?;

    let mut object = match resource.get("attributes") {
        Some(Value::Object(attributes)) => attributes.clone(),
        Some(Value::Null) | None => Map::new(),
        Some(_) => return Err(JsonApiError::malformed("attributes must be an object")),
    };
    object.insert("id".to_string(), Value::String(id.to_string()));

    if let Some(Value::Object(relationships)) = resource.get("relationships") {
        for (name, relationship) in relationships {
            let Some(linkage) = relationship.get("data") else {
                // Links-only relationship: nothing to embed.
                continue;
            };
            let value = match linkage {
                Value::Null => Value::Null,
                Value::Array(items) => Value::Array(
                    items
                        .iter()
                        .map(|item| resolve(item, index, depth))
                        .collect::<Result<_, _>>()?,
                ),
                item => resolve(item, index, depth)?,
            };
            object.insert(name.clone(), value);
        }
    }

    Ok(Value::Object(object))
}

fn resolve(
    linkage: &Value,
    index: &IncludedIndex<'_>,
    depth: usize,
) -> Result<Value, JsonApiError> {
    let kind = linkage
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| JsonApiError::malformed("relationship linkage has no type"))?;
    let id = linkage
        .get("id")
        .and_then(Value::as_str)
        .ok_or_else(|| JsonApiError::malformed("relationship linkage has no id"))?;

    match index.get(kind, id) {
        Some(included) if depth > 0 => flatten(included, index, depth - 1),
        Some(_) => Ok(serde_json::json!({ "id": id })),
        None => {
            tracing::debug!(
                resource_type = %kind,
                resource_id = %id,
                "Relationship not included in document, embedding id only"
            );
            Ok(serde_json::json!({ "id": id }))
        }
    }
}
