//! Filter values and the draft/applied filter state
//!
//! Input controls edit a *draft*. Only [`FilterState::apply`] copies the
//! draft into the *applied* filter, which is what query variables are
//! built from. The applied filter is always an owned snapshot, so later
//! draft edits never leak into it.

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// A numeric `{min, max}` range. Either bound may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NumberRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// A date `{min, max}` range. Either bound may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DateRange {
    pub min: Option<NaiveDate>,
    pub max: Option<NaiveDate>,
}

/// The value held by a single filter field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FilterValue {
    /// Free text, usually a search box
    Text(String),
    /// One option of an enumeration
    Choice(String),
    /// Several options of an enumeration
    MultiChoice(Vec<String>),
    NumberRange(NumberRange),
    DateRange(DateRange),
    /// Id of another entity (program, admin area, ...)
    Reference(String),
    /// Opt-in toggle; `false` means "not filtered"
    Flag(bool),
}

impl FilterValue {
    /// Whether this value constrains nothing and should not be sent
    pub fn is_empty(&self) -> bool {
        match self {
            FilterValue::Text(s) | FilterValue::Choice(s) | FilterValue::Reference(s) => {
                s.trim().is_empty()
            }
            FilterValue::MultiChoice(values) => values.is_empty(),
            FilterValue::NumberRange(range) => range.min.is_none() && range.max.is_none(),
            FilterValue::DateRange(range) => range.min.is_none() && range.max.is_none(),
            FilterValue::Flag(on) => !on,
        }
    }

    /// Translate into the JSON value placed in query variables
    pub fn to_variable(&self) -> Value {
        match self {
            FilterValue::Text(s) | FilterValue::Choice(s) | FilterValue::Reference(s) => {
                Value::String(s.clone())
            }
            FilterValue::MultiChoice(values) => json!(values),
            FilterValue::NumberRange(range) => json!({ "min": range.min, "max": range.max }),
            FilterValue::DateRange(range) => json!({
                "min": range.min.map(|d| d.format("%Y-%m-%d").to_string()),
                "max": range.max.map(|d| d.format("%Y-%m-%d").to_string()),
            }),
            FilterValue::Flag(on) => Value::Bool(*on),
        }
    }
}

/// Ordered mapping from filter field name to value
///
/// Empty values are never stored: setting one removes the field, so two
/// filters that constrain the same things always compare equal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Filters(IndexMap<String, FilterValue>);

impl Filters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, name: impl Into<String>, value: FilterValue) -> Self {
        self.set(name, value);
        self
    }

    /// Set a field, removing it when the value is empty
    pub fn set(&mut self, name: impl Into<String>, value: FilterValue) {
        let name = name.into();
        if value.is_empty() {
            self.0.shift_remove(&name);
        } else {
            self.0.insert(name, value);
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<FilterValue> {
        self.0.shift_remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&FilterValue> {
        self.0.get(name)
    }

    /// Text of a text-like field, or `""` when unset
    pub fn text(&self, name: &str) -> &str {
        match self.0.get(name) {
            Some(FilterValue::Text(s) | FilterValue::Choice(s) | FilterValue::Reference(s)) => s,
            _ => "",
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FilterValue)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Query variables for every field, in insertion order
    pub fn to_variables(&self) -> Map<String, Value> {
        self.0
            .iter()
            .map(|(name, value)| (name.clone(), value.to_variable()))
            .collect()
    }
}

impl FromIterator<(String, FilterValue)> for Filters {
    fn from_iter<I: IntoIterator<Item = (String, FilterValue)>>(iter: I) -> Self {
        let mut filters = Filters::new();
        for (name, value) in iter {
            filters.set(name, value);
        }
        filters
    }
}

/// An option shown by a choice filter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterOption {
    pub value: String,
    pub label: String,
}

impl FilterOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// What kind of input control a filter field uses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "options", rename_all = "snake_case")]
pub enum FilterKind {
    Text,
    Choice(Vec<FilterOption>),
    MultiChoice(Vec<FilterOption>),
    NumberRange,
    DateRange,
    Reference,
    Flag,
}

/// Declaration of one filter input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterField {
    /// Variable name the value is sent under
    pub name: String,
    pub label: String,
    pub kind: FilterKind,
}

impl FilterField {
    pub fn new(name: impl Into<String>, label: impl Into<String>, kind: FilterKind) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            kind,
        }
    }
}

/// Draft and applied filter pair
#[derive(Debug, Clone, Default)]
pub struct FilterState {
    draft: Filters,
    applied: Filters,
}

impl FilterState {
    /// Seed both draft and applied filter with the same initial value
    pub fn new(initial: Filters) -> Self {
        Self {
            draft: initial.clone(),
            applied: initial,
        }
    }

    pub fn draft(&self) -> &Filters {
        &self.draft
    }

    pub fn applied(&self) -> &Filters {
        &self.applied
    }

    /// Replace the draft. No validation happens here.
    pub fn set_draft(&mut self, next: Filters) {
        self.draft = next;
    }

    /// Edit a single draft field
    pub fn set_field(&mut self, name: impl Into<String>, value: FilterValue) {
        self.draft.set(name, value);
    }

    /// Commit a snapshot of the draft as the applied filter
    pub fn apply(&mut self) -> Filters {
        self.applied = self.draft.clone();
        self.applied.clone()
    }

    /// Reset draft and applied filter to `initial`
    pub fn clear(&mut self, initial: &Filters) {
        self.draft = initial.clone();
        self.applied = initial.clone();
    }

    /// Draft has edits that are not applied yet
    pub fn is_dirty(&self) -> bool {
        self.draft != self.applied
    }
}
