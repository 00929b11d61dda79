//! Wire types of the persistence service and their mapping to engine items.
//!
//! The service stores each item's payload as a JSON document inside a string
//! column, so `data` travels as a string. Older responses inline the object;
//! both are accepted on read. Parsing is pure for testability.

use canvas::doc::{Item, ItemId};
use canvas::kind::ItemKind;
use canvas::viewport::Point;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use super::ApiError;

/// One item as the service sends and receives it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRecord {
    /// Absent on create requests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(rename = "type")]
    pub kind: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// The service names this `zindex`; `zIndex` is accepted on read.
    #[serde(default, rename = "zindex", alias = "zIndex")]
    pub z_index: i64,
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub deleted: Option<bool>,
}

/// The signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub user_id: String,
    pub email: String,
    #[serde(default)]
    pub name: String,
}

impl ItemRecord {
    /// Encode an engine item for a create or update request.
    #[must_use]
    pub fn from_item(item: &Item) -> Self {
        Self {
            id: item.id.server(),
            kind: item.kind.wire_name().to_string(),
            x: item.x,
            y: item.y,
            width: item.width,
            height: item.height,
            z_index: item.z_index,
            data: Value::String(item.data.to_string()),
            deleted: Some(item.deleted),
        }
    }

    /// Decode into an engine item. Records without an id or with an unknown
    /// type are skipped with a warning.
    #[must_use]
    pub fn into_item(self) -> Option<Item> {
        let Some(id) = self.id else {
            warn!(kind = %self.kind, "item record has no id; skipping");
            return None;
        };
        let Some(kind) = ItemKind::from_wire(&self.kind) else {
            warn!(item_id = id, kind = %self.kind, "unknown item type; skipping");
            return None;
        };
        let mut item = Item::new(ItemId::Server(id), kind, Point::new(self.x, self.y));
        item.width = self.width;
        item.height = self.height;
        item.z_index = self.z_index;
        item.data = decode_data(id, self.data);
        item.deleted = self.deleted.unwrap_or(false);
        Some(item)
    }
}

/// Decode a stored payload. Anything that is not a JSON object becomes `{}`
/// so the item stays visible and editable with default fields.
#[must_use]
pub fn decode_data(item_id: i64, raw: Value) -> Value {
    match raw {
        Value::Object(_) => raw,
        Value::Null => Value::Object(Map::new()),
        Value::String(text) => match serde_json::from_str::<Value>(&text) {
            Ok(parsed @ Value::Object(_)) => parsed,
            Ok(_) => {
                warn!(item_id, "item data is not an object; using empty data");
                Value::Object(Map::new())
            }
            Err(e) => {
                warn!(item_id, error = %e, "malformed item data; using empty data");
                Value::Object(Map::new())
            }
        },
        _ => {
            warn!(item_id, "item data has unexpected shape; using empty data");
            Value::Object(Map::new())
        }
    }
}

/// Parse a list response, keeping the records that decode.
///
/// # Errors
///
/// Returns [`ApiError::Decode`] if the body is not a list of item records.
pub fn parse_item_list(body: &str) -> Result<Vec<Item>, ApiError> {
    let records: Vec<ItemRecord> = serde_json::from_str(body).map_err(|e| ApiError::Decode(e.to_string()))?;
    Ok(records
        .into_iter()
        .filter_map(ItemRecord::into_item)
        .collect())
}

/// Parse a single-item response.
///
/// # Errors
///
/// Returns [`ApiError::Decode`] if the body is not an item record or names
/// an unknown type.
pub fn parse_item(body: &str) -> Result<Item, ApiError> {
    let record: ItemRecord = serde_json::from_str(body).map_err(|e| ApiError::Decode(e.to_string()))?;
    let kind = record.kind.clone();
    record
        .into_item()
        .ok_or_else(|| ApiError::Decode(format!("unusable item record (type {kind})")))
}

/// Parse the current-user response.
///
/// # Errors
///
/// Returns [`ApiError::Decode`] if required fields are missing.
pub fn parse_user(body: &str) -> Result<User, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::Decode(e.to_string()))
}

#[cfg(test)]
#[path = "wire_test.rs"]
mod tests;
