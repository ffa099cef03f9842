//! Decoding adapter responses into a page of rows
//!
//! Accepted shapes:
//!
//! * GraphQL: `{"data": {<name>: {"totalCount", "pageInfo", "edges": [{"node": ..}]}}}`
//!   with an optional top-level `"errors"` array
//! * the same connection object without the `"data"` wrapper
//! * REST list: `{"count", "next", "previous", "results": [..]}`

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{GridError, Result};

/// Cursor information returned alongside a page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PageInfo {
    pub has_next_page: bool,
    pub has_previous_page: bool,
    pub start_cursor: Option<String>,
    pub end_cursor: Option<String>,
}

/// One page of rows plus the total size of the result set
#[derive(Debug, Clone, PartialEq)]
pub struct Connection<R> {
    pub items: Vec<R>,
    pub total_count: usize,
    pub page_info: PageInfo,
}

impl<R: DeserializeOwned> Connection<R> {
    /// Pull the `queried_object_name` connection out of a raw response
    pub fn from_response(response: &Value, queried_object_name: &str) -> Result<Self> {
        if let Some(errors) = response.get("errors").and_then(Value::as_array) {
            if !errors.is_empty() {
                let messages = errors
                    .iter()
                    .map(|e| {
                        e.get("message")
                            .and_then(Value::as_str)
                            .map(str::to_string)
                            .unwrap_or_else(|| e.to_string())
                    })
                    .collect();
                return Err(GridError::GraphQl(messages));
            }
        }

        if response.get("results").is_some() {
            return Self::from_rest(response);
        }

        let object = response
            .get("data")
            .and_then(|data| data.get(queried_object_name))
            .or_else(|| response.get(queried_object_name))
            .filter(|object| !object.is_null())
            .ok_or_else(|| GridError::MissingObject(queried_object_name.to_string()))?;

        Self::from_connection(object)
    }

    fn from_connection(object: &Value) -> Result<Self> {
        let items = match (object.get("edges"), object.get("items")) {
            (Some(Value::Array(edges)), _) => edges
                .iter()
                .map(|edge| decode_row(edge.get("node").unwrap_or(edge)))
                .collect::<Result<Vec<R>>>()?,
            (_, Some(Value::Array(items))) => {
                items.iter().map(decode_row).collect::<Result<Vec<R>>>()?
            }
            _ => return Err(GridError::Decode("connection has no edges or items".into())),
        };

        let total_count = read_count(object, &["totalCount", "total_count", "count"])
            .unwrap_or(items.len());

        let page_info = match object.get("pageInfo") {
            Some(info) if !info.is_null() => serde_json::from_value(info.clone())
                .map_err(|e| GridError::Decode(format!("pageInfo: {}", e)))?,
            _ => PageInfo::default(),
        };

        Ok(Self {
            items,
            total_count,
            page_info,
        })
    }

    fn from_rest(response: &Value) -> Result<Self> {
        let items = response
            .get("results")
            .and_then(Value::as_array)
            .ok_or_else(|| GridError::Decode("results is not an array".into()))?
            .iter()
            .map(decode_row)
            .collect::<Result<Vec<R>>>()?;

        let total_count = read_count(response, &["count"]).unwrap_or(items.len());
        let link = |key: &str| response.get(key).and_then(Value::as_str).map(str::to_string);

        Ok(Self {
            items,
            total_count,
            page_info: PageInfo {
                has_next_page: link("next").is_some(),
                has_previous_page: link("previous").is_some(),
                start_cursor: link("previous"),
                end_cursor: link("next"),
            },
        })
    }
}

fn decode_row<R: DeserializeOwned>(value: &Value) -> Result<R> {
    R::deserialize(value).map_err(|e| GridError::Decode(e.to_string()))
}

fn read_count(object: &Value, keys: &[&str]) -> Option<usize> {
    keys.iter()
        .find_map(|key| object.get(*key).and_then(Value::as_u64))
        .map(|count| count as usize)
}
