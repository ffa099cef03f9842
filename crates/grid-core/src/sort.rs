//! Sort column / direction and the order-by token derived from them

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

/// How a column id is spelled in the order-by token
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderByFormat {
    /// Use the column id as-is
    #[default]
    Verbatim,
    /// `createdAt` becomes `created_at`
    SnakeCase,
}

/// Current sort of a table. Without a column no ordering is requested.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState {
    pub column: Option<String>,
    pub direction: SortDirection,
}

impl SortState {
    pub fn new(column: Option<String>, direction: SortDirection) -> Self {
        Self { column, direction }
    }

    pub fn unsorted() -> Self {
        Self::default()
    }

    /// Same column flips the direction, a new column starts ascending
    pub fn request_sort(&mut self, column: &str) {
        if self.column.as_deref() == Some(column) {
            self.direction = self.direction.toggled();
        } else {
            self.column = Some(column.to_string());
            self.direction = SortDirection::Asc;
        }
    }

    /// Direction of `column` if it is the sorted one
    pub fn direction_of(&self, column: &str) -> Option<SortDirection> {
        (self.column.as_deref() == Some(column)).then_some(self.direction)
    }

    /// Wire token: `"field"` ascending, `"-field"` descending
    pub fn to_order_by_token(&self, format: OrderByFormat) -> Option<String> {
        self.column
            .as_deref()
            .map(|column| order_by_token(column, self.direction, format))
    }
}

/// Build an order-by token for a field
pub fn order_by_token(field: &str, direction: SortDirection, format: OrderByFormat) -> String {
    let field = match format {
        OrderByFormat::Verbatim => field.to_string(),
        OrderByFormat::SnakeCase => to_snake_case(field),
    };
    match direction {
        SortDirection::Asc => field,
        SortDirection::Desc => format!("-{}", field),
    }
}

fn to_snake_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len() + 4);
    for (idx, ch) in field.chars().enumerate() {
        if ch.is_ascii_uppercase() {
            if idx > 0 && !out.ends_with('_') {
                out.push('_');
            }
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}
