//! Query variables derived from filter, page and sort state

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::filter::Filters;

/// How pagination is spelled in the variables object
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageStyle {
    /// GraphQL connection arguments: `first`, `offset`
    #[default]
    FirstOffset,
    /// REST list arguments: `page` (1-based), `page_size`
    PagePageSize,
}

/// Everything a fetch depends on
///
/// Two equal values describe the same request; the table only issues a new
/// fetch when this changes.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryVariables {
    /// Static variables supplied by the caller (business area, program, ...)
    pub base: Map<String, Value>,
    /// Snapshot of the applied filter
    pub filters: Filters,
    pub page_index: usize,
    pub page_size: usize,
    pub order_by: Option<String>,
}

impl QueryVariables {
    pub fn offset(&self) -> usize {
        self.page_index * self.page_size
    }

    /// Render the JSON object handed to the adapter.
    /// A filter named like a base variable never replaces it.
    pub fn to_json(&self, style: PageStyle) -> Value {
        let mut vars = self.base.clone();
        for (name, value) in self.filters.to_variables() {
            if vars.contains_key(&name) {
                warn!(variable = %name, "Filter shadows a base variable, ignoring it");
                continue;
            }
            vars.insert(name, value);
        }

        match style {
            PageStyle::FirstOffset => {
                vars.insert("first".into(), Value::from(self.page_size));
                vars.insert("offset".into(), Value::from(self.offset()));
            }
            PageStyle::PagePageSize => {
                vars.insert("page".into(), Value::from(self.page_index + 1));
                vars.insert("page_size".into(), Value::from(self.page_size));
            }
        }

        if let Some(order_by) = &self.order_by {
            vars.insert("orderBy".into(), Value::String(order_by.clone()));
        }

        Value::Object(vars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterValue;
    use serde_json::json;

    fn vars() -> QueryVariables {
        let mut base = Map::new();
        base.insert("businessArea".into(), json!("afghanistan"));
        QueryVariables {
            base,
            filters: Filters::new().with("search", FilterValue::Text("Ali".into())),
            page_index: 2,
            page_size: 10,
            order_by: Some("-created_at".into()),
        }
    }

    #[test]
    fn test_first_offset_style() {
        assert_eq!(
            vars().to_json(PageStyle::FirstOffset),
            json!({
                "businessArea": "afghanistan",
                "search": "Ali",
                "first": 10,
                "offset": 20,
                "orderBy": "-created_at",
            })
        );
    }

    #[test]
    fn test_page_style_is_one_based_and_omits_missing_order() {
        let mut vars = vars();
        vars.order_by = None;
        vars.page_index = 0;
        assert_eq!(
            vars.to_json(PageStyle::PagePageSize),
            json!({
                "businessArea": "afghanistan",
                "search": "Ali",
                "page": 1,
                "page_size": 10,
            })
        );
    }

    #[test]
    fn test_filter_cannot_replace_base_variable() {
        let mut vars = vars();
        vars.filters = vars
            .filters
            .with("businessArea", FilterValue::Text("ukraine".into()));

        let json = vars.to_json(PageStyle::FirstOffset);
        assert_eq!(json["businessArea"], json!("afghanistan"));
        assert_eq!(json["search"], json!("Ali"));
    }
}
