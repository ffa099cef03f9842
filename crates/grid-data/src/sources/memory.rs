//! In-memory adapter serving JSON fixture records
//!
//! Stands in for a GraphQL or REST backend: it filters, orders and pages
//! the records from the variables object it is given and answers with
//! the same envelope a real backend would.

use std::cmp::Ordering;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
use std::time::Duration;

use ahash::AHashSet;
use async_trait::async_trait;
use chrono::NaiveDate;
use grid_core::{GridError, QueryAdapter};
use parking_lot::Mutex;
use serde_json::{json, Value};
use tracing::{debug, warn};

/// Response shape produced by a [`MemoryAdapter`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Envelope {
    /// `{"data": {<name>: {"totalCount", "pageInfo", "edges"}}}`
    #[default]
    GraphQl,
    /// `{"count", "next", "previous", "results"}`
    Rest,
}

/// How a filter variable is matched against records
#[derive(Debug, Clone, PartialEq)]
pub enum MatchRule {
    /// Case-insensitive substring in any of the fields
    Search(Vec<String>),
    /// Field equals the value (strings compared case-insensitively)
    Equals(String),
    /// Field is one of the values in an array
    OneOf(String),
    /// Numeric field within `{min, max}`
    Range(String),
    /// Date field (`YYYY-MM-DD...`) within `{min, max}`
    DateRange(String),
    /// `true` keeps only records whose field is `true`
    Flag(String),
}

/// Fixture-backed [`QueryAdapter`]
pub struct MemoryAdapter {
    source_name: String,
    object_name: String,
    records: Vec<Value>,
    rules: Vec<(String, MatchRule)>,
    envelope: Envelope,
    latency: Option<Duration>,
    fail_next: Mutex<Option<String>>,
    calls: AtomicUsize,
}

impl MemoryAdapter {
    /// Serve `records` under `object_name`
    pub fn new(object_name: impl Into<String>, records: Vec<Value>) -> Self {
        let object_name = object_name.into();
        Self {
            source_name: format!("memory:{}", object_name),
            object_name,
            records,
            rules: Vec::new(),
            envelope: Envelope::GraphQl,
            latency: None,
            fail_next: Mutex::new(None),
            calls: AtomicUsize::new(0),
        }
    }

    /// Match filter variable `variable` with `rule`
    pub fn with_rule(mut self, variable: impl Into<String>, rule: MatchRule) -> Self {
        self.rules.push((variable.into(), rule));
        self
    }

    pub fn with_envelope(mut self, envelope: Envelope) -> Self {
        self.envelope = envelope;
        self
    }

    /// Delay every response, to make loading states visible
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Make the next fetch fail with an adapter error
    pub fn fail_next(&self, message: impl Into<String>) {
        *self.fail_next.lock() = Some(message.into());
    }

    /// Number of fetches served so far
    pub fn call_count(&self) -> usize {
        self.calls.load(AtomicOrdering::SeqCst)
    }

    fn query(&self, variables: &Value) -> Result<Value, GridError> {
        let matchers = self
            .rules
            .iter()
            .filter_map(|(variable, rule)| {
                variables
                    .get(variable)
                    .filter(|value| !value.is_null())
                    .map(|value| Matcher::compile(variable, rule, value))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut matched: Vec<&Value> = self
            .records
            .iter()
            .filter(|record| matchers.iter().all(|m| m.matches(record)))
            .collect();

        if let Some(token) = variables.get("orderBy").and_then(Value::as_str) {
            let (descending, field) = match token.strip_prefix('-') {
                Some(field) => (true, field),
                None => (false, token),
            };
            matched.sort_by(|a, b| {
                let ordering = compare_values(lookup(a, field), lookup(b, field));
                if descending {
                    ordering.reverse()
                } else {
                    ordering
                }
            });
        }

        let total = matched.len();
        let (offset, limit) = page_window(variables, total)?;
        let page: Vec<&Value> = matched.into_iter().skip(offset).take(limit).collect();
        let has_next = offset + page.len() < total;
        let has_previous = offset > 0;

        debug!(
            source = %self.source_name,
            total,
            offset,
            returned = page.len(),
            "Served fixture page"
        );

        Ok(match self.envelope {
            Envelope::GraphQl => {
                let edges: Vec<Value> = page
                    .iter()
                    .enumerate()
                    .map(|(idx, node)| json!({ "cursor": (offset + idx).to_string(), "node": node }))
                    .collect();
                json!({
                    "data": {
                        self.object_name.as_str(): {
                            "totalCount": total,
                            "edgeCount": edges.len(),
                            "pageInfo": {
                                "hasNextPage": has_next,
                                "hasPreviousPage": has_previous,
                                "startCursor": edges.first().map(|e| e["cursor"].clone()),
                                "endCursor": edges.last().map(|e| e["cursor"].clone()),
                            },
                            "edges": edges,
                        }
                    }
                })
            }
            Envelope::Rest => {
                let page_number = if limit == 0 { 1 } else { offset / limit + 1 };
                json!({
                    "count": total,
                    "next": has_next.then(|| format!("?page={}", page_number + 1)),
                    "previous": has_previous.then(|| format!("?page={}", page_number - 1)),
                    "results": page,
                })
            }
        })
    }
}

#[async_trait]
impl QueryAdapter for MemoryAdapter {
    async fn fetch(&self, variables: &Value) -> Result<Value, GridError> {
        self.calls.fetch_add(1, AtomicOrdering::SeqCst);

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        let injected = self.fail_next.lock().take();
        if let Some(message) = injected {
            warn!(source = %self.source_name, %message, "Injected failure");
            return Err(GridError::Adapter(message));
        }

        self.query(variables)
    }

    fn source_name(&self) -> &str {
        &self.source_name
    }
}

/// A rule bound to the value it was given
enum Matcher {
    Search { fields: Vec<String>, needle: String },
    Equals { field: String, value: Value },
    OneOf { field: String, values: AHashSet<String> },
    Range { field: String, min: Option<f64>, max: Option<f64> },
    Dates { field: String, min: Option<NaiveDate>, max: Option<NaiveDate> },
    Flag { field: String, on: bool },
}

impl Matcher {
    fn compile(variable: &str, rule: &MatchRule, value: &Value) -> Result<Self, GridError> {
        let invalid = || GridError::Adapter(format!("Invalid value for '{}': {}", variable, value));

        Ok(match rule {
            MatchRule::Search(fields) => Matcher::Search {
                fields: fields.clone(),
                needle: value.as_str().ok_or_else(invalid)?.to_lowercase(),
            },
            MatchRule::Equals(field) => {
                if value.is_array() || value.is_object() {
                    return Err(invalid());
                }
                Matcher::Equals {
                    field: field.clone(),
                    value: value.clone(),
                }
            }
            MatchRule::OneOf(field) => Matcher::OneOf {
                field: field.clone(),
                values: value
                    .as_array()
                    .ok_or_else(invalid)?
                    .iter()
                    .map(|v| v.as_str().map(str::to_lowercase).ok_or_else(invalid))
                    .collect::<Result<_, _>>()?,
            },
            MatchRule::Range(field) => {
                let bound = |key: &str| match value.get(key) {
                    None | Some(Value::Null) => Ok(None),
                    Some(v) => v.as_f64().map(Some).ok_or_else(invalid),
                };
                if !value.is_object() {
                    return Err(invalid());
                }
                Matcher::Range {
                    field: field.clone(),
                    min: bound("min")?,
                    max: bound("max")?,
                }
            }
            MatchRule::DateRange(field) => {
                let bound = |key: &str| match value.get(key) {
                    None | Some(Value::Null) => Ok(None),
                    Some(v) => v.as_str().and_then(parse_date).map(Some).ok_or_else(invalid),
                };
                if !value.is_object() {
                    return Err(invalid());
                }
                Matcher::Dates {
                    field: field.clone(),
                    min: bound("min")?,
                    max: bound("max")?,
                }
            }
            MatchRule::Flag(field) => Matcher::Flag {
                field: field.clone(),
                on: value.as_bool().ok_or_else(invalid)?,
            },
        })
    }

    fn matches(&self, record: &Value) -> bool {
        match self {
            Matcher::Search { fields, needle } => fields.iter().any(|field| {
                lookup(record, field)
                    .map(|v| display(v).to_lowercase().contains(needle.as_str()))
                    .unwrap_or(false)
            }),
            Matcher::Equals { field, value } => match (lookup(record, field), value) {
                (Some(Value::String(a)), Value::String(b)) => a.eq_ignore_ascii_case(b),
                (Some(a), b) => a == b,
                (None, _) => false,
            },
            Matcher::OneOf { field, values } => lookup(record, field)
                .map(|v| values.contains(&display(v).to_lowercase()))
                .unwrap_or(false),
            Matcher::Range { field, min, max } => match lookup(record, field).and_then(Value::as_f64) {
                Some(n) => min.map_or(true, |min| n >= min) && max.map_or(true, |max| n <= max),
                None => false,
            },
            Matcher::Dates { field, min, max } => {
                match lookup(record, field).and_then(Value::as_str).and_then(parse_date) {
                    Some(d) => min.map_or(true, |min| d >= min) && max.map_or(true, |max| d <= max),
                    None => false,
                }
            }
            Matcher::Flag { field, on } => {
                !on || lookup(record, field).and_then(Value::as_bool).unwrap_or(false)
            }
        }
    }
}

/// Offset and limit from either `first`/`offset` or `page`/`page_size`
fn page_window(variables: &Value, total: usize) -> Result<(usize, usize), GridError> {
    let read = |key: &str| -> Result<Option<usize>, GridError> {
        match variables.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(v) => v
                .as_u64()
                .map(|n| Some(n as usize))
                .ok_or_else(|| GridError::Adapter(format!("'{}' must be a non-negative integer", key))),
        }
    };

    if let Some(first) = read("first")? {
        return Ok((read("offset")?.unwrap_or(0), first));
    }
    if let Some(page_size) = read("page_size")? {
        let page = read("page")?.unwrap_or(1).max(1);
        return Ok(((page - 1) * page_size, page_size));
    }
    Ok((0, total))
}

/// Resolve a Django-style path (`head_of_household__full_name`) against a record.
/// Each segment is tried verbatim, then in camelCase.
fn lookup<'a>(record: &'a Value, path: &str) -> Option<&'a Value> {
    path.split("__").try_fold(record, |current, segment| {
        current
            .get(segment)
            .or_else(|| current.get(to_camel_case(segment)))
    })
}

fn to_camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for ch in field.chars() {
        if ch == '_' {
            upper = true;
        } else if upper {
            out.push(ch.to_ascii_uppercase());
            upper = false;
        } else {
            out.push(ch);
        }
    }
    out
}

fn display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn parse_date(text: &str) -> Option<NaiveDate> {
    let day = text.get(..10)?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

/// Numbers numerically, strings case-insensitively, missing values last
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::Null) | None, Some(Value::Null) | None) => Ordering::Equal,
        (Some(Value::Null) | None, _) => Ordering::Greater,
        (_, Some(Value::Null) | None) => Ordering::Less,
        (Some(x), Some(y)) => display(x).to_lowercase().cmp(&display(y).to_lowercase()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grid_core::{Connection, FilterValue, Filters, NumberRange, PageStyle, QueryVariables};
    use serde_json::Map;

    fn households() -> Vec<Value> {
        vec![
            json!({ "id": "1", "unicefId": "HH-001", "size": 4, "status": "ACTIVE", "withdrawn": false,
                    "headOfHousehold": { "fullName": "Amina Yusuf" }, "createdAt": "2024-01-05T10:00:00Z" }),
            json!({ "id": "2", "unicefId": "HH-002", "size": 1, "status": "ACTIVE", "withdrawn": true,
                    "headOfHousehold": { "fullName": "Bilal Karimi" }, "createdAt": "2024-02-11T08:30:00Z" }),
            json!({ "id": "3", "unicefId": "HH-003", "size": 7, "status": "INACTIVE", "withdrawn": false,
                    "headOfHousehold": { "fullName": "Chiara Rossi" }, "createdAt": "2023-12-24T12:00:00Z" }),
            json!({ "id": "4", "unicefId": "HH-004", "size": 2, "status": "ACTIVE", "withdrawn": false,
                    "headOfHousehold": { "fullName": "Dawit Bekele" }, "createdAt": "2024-03-01T09:15:00Z" }),
        ]
    }

    fn adapter() -> MemoryAdapter {
        MemoryAdapter::new("allHouseholds", households())
            .with_rule("search", MatchRule::Search(vec!["unicefId".into(), "headOfHousehold__fullName".into()]))
            .with_rule("status", MatchRule::OneOf("status".into()))
            .with_rule("size", MatchRule::Range("size".into()))
            .with_rule("createdAt", MatchRule::DateRange("createdAt".into()))
            .with_rule("withdrawn", MatchRule::Flag("withdrawn".into()))
    }

    fn ids(response: &Value) -> Vec<String> {
        Connection::<Value>::from_response(response, "allHouseholds")
            .unwrap()
            .items
            .iter()
            .map(|row| row["id"].as_str().unwrap().to_string())
            .collect()
    }

    #[tokio::test]
    async fn test_filters_from_query_variables() {
        let vars = QueryVariables {
            base: Map::new(),
            filters: Filters::new()
                .with("status", FilterValue::MultiChoice(vec!["ACTIVE".into()]))
                .with("size", FilterValue::NumberRange(NumberRange { min: Some(2.0), max: None })),
            page_index: 0,
            page_size: 10,
            order_by: Some("-size".into()),
        };

        let response = adapter().fetch(&vars.to_json(PageStyle::FirstOffset)).await.unwrap();
        assert_eq!(ids(&response), vec!["1", "4"]);
        assert_eq!(response["data"]["allHouseholds"]["totalCount"], json!(2));
    }

    #[tokio::test]
    async fn test_search_reaches_nested_fields() {
        let response = adapter().fetch(&json!({ "search": "karimi" })).await.unwrap();
        assert_eq!(ids(&response), vec!["2"]);

        let response = adapter()
            .fetch(&json!({ "createdAt": { "min": "2024-01-01", "max": null }, "withdrawn": true }))
            .await
            .unwrap();
        assert_eq!(ids(&response), vec!["2"]);
    }

    #[tokio::test]
    async fn test_snake_case_order_and_paging() {
        let adapter = adapter();
        let response = adapter
            .fetch(&json!({ "orderBy": "-created_at", "first": 2, "offset": 2 }))
            .await
            .unwrap();
        assert_eq!(ids(&response), vec!["1", "3"]);
        let page_info = &response["data"]["allHouseholds"]["pageInfo"];
        assert_eq!(page_info["hasNextPage"], json!(false));
        assert_eq!(page_info["hasPreviousPage"], json!(true));

        let response = adapter
            .fetch(&json!({ "orderBy": "head_of_household__full_name", "first": 1 }))
            .await
            .unwrap();
        assert_eq!(ids(&response), vec!["1"]);
        assert_eq!(adapter.call_count(), 2);
    }

    #[tokio::test]
    async fn test_rest_envelope() {
        let adapter = MemoryAdapter::new("households", households()).with_envelope(Envelope::Rest);
        let response = adapter.fetch(&json!({ "page": 2, "page_size": 3 })).await.unwrap();

        assert_eq!(response["count"], json!(4));
        assert_eq!(response["previous"], json!("?page=1"));
        assert_eq!(response["next"], Value::Null);
        let page = Connection::<Value>::from_response(&response, "households").unwrap();
        assert_eq!(page.items.len(), 1);
    }

    #[tokio::test]
    async fn test_malformed_filter_is_rejected() {
        let err = adapter().fetch(&json!({ "size": "large" })).await.unwrap_err();
        assert!(matches!(err, GridError::Adapter(_)));
    }

    #[tokio::test]
    async fn test_injected_failure_is_one_shot() {
        let adapter = adapter();
        adapter.fail_next("connection reset");

        assert_eq!(
            adapter.fetch(&json!({})).await.unwrap_err(),
            GridError::Adapter("connection reset".into())
        );
        assert!(adapter.fetch(&json!({})).await.is_ok());
    }

    #[test]
    fn test_lookup_and_compare() {
        let record = json!({ "headOfHousehold": { "fullName": "Amina" }, "size": null });
        assert_eq!(lookup(&record, "head_of_household__full_name"), Some(&json!("Amina")));
        assert_eq!(compare_values(lookup(&record, "size"), Some(&json!(1))), Ordering::Greater);
        assert_eq!(compare_values(Some(&json!(10)), Some(&json!(9))), Ordering::Greater);
    }
}
