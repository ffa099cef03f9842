//! Demo tables: households and grievance tickets
//! Creates deterministic fixture records and the columns, filters and
//! adapter rules that go with them

use chrono::{Duration, NaiveDate};
use grid_core::{FilterField, FilterKind, FilterOption, HeadCell};
use grid_data::{Envelope, MatchRule, MemoryAdapter};
use serde_json::{json, Value};

const FIRST_NAMES: &[&str] = &[
    "Amina", "Bilal", "Chiara", "Dawit", "Esra", "Farid", "Grace", "Hamid", "Imani", "Joseph",
    "Khadija", "Luis", "Mariam", "Nasir", "Olga",
];
const LAST_NAMES: &[&str] = &[
    "Yusuf", "Karimi", "Rossi", "Bekele", "Demir", "Haidari", "Otieno", "Saleh", "Mensah",
    "Ortega", "Nkosi",
];
const ADMIN_AREAS: &[&str] = &["Kabul", "Herat", "Balkh", "Kandahar", "Nangarhar"];
const HOUSEHOLD_STATUSES: &[&str] = &["ACTIVE", "ACTIVE", "ACTIVE", "INACTIVE"];
const TICKET_CATEGORIES: &[&str] = &[
    "DATA_CHANGE",
    "PAYMENT_VERIFICATION",
    "SENSITIVE_GRIEVANCE",
    "REFERRAL",
    "NEGATIVE_FEEDBACK",
];
const TICKET_STATUSES: &[&str] = &["NEW", "ASSIGNED", "IN_PROGRESS", "FOR_APPROVAL", "CLOSED"];

fn epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 1, 1).unwrap_or_default()
}

/// `count` households with stable, varied values
pub fn households(count: usize) -> Vec<Value> {
    (0..count)
        .map(|i| {
            let first = FIRST_NAMES[(i * 7) % FIRST_NAMES.len()];
            let last = LAST_NAMES[(i * 5 + 3) % LAST_NAMES.len()];
            let registered = epoch() + Duration::days((i * 37 % 540) as i64);
            json!({
                "id": format!("hh-{}", i + 1),
                "unicefId": format!("HH-{:04}", i + 1),
                "headOfHousehold": { "fullName": format!("{} {}", first, last) },
                "size": 1 + (i * 13) % 9,
                "admin2": ADMIN_AREAS[(i * 3) % ADMIN_AREAS.len()],
                "status": HOUSEHOLD_STATUSES[i % HOUSEHOLD_STATUSES.len()],
                "withdrawn": i % 11 == 10,
                "createdAt": format!("{}T09:00:00Z", registered.format("%Y-%m-%d")),
            })
        })
        .collect()
}

/// `count` tickets referencing the first `households` households
pub fn tickets(count: usize, households: usize) -> Vec<Value> {
    (0..count)
        .map(|i| {
            let opened = epoch() + Duration::days((i * 23 % 600) as i64);
            json!({
                "id": format!("grv-{}", i + 1),
                "code": format!("GRV-{:05}", 1000 + i),
                "category": TICKET_CATEGORIES[(i * 3) % TICKET_CATEGORIES.len()],
                "status": TICKET_STATUSES[(i * 7) % TICKET_STATUSES.len()],
                "priority": 1 + i % 3,
                "urgent": i % 6 == 0,
                "household": format!("HH-{:04}", 1 + (i * 17) % households.max(1)),
                "createdAt": format!("{}T14:30:00Z", opened.format("%Y-%m-%d")),
            })
        })
        .collect()
}

pub fn household_columns() -> Vec<HeadCell> {
    vec![
        HeadCell::new("unicefId", "ID"),
        HeadCell::new("headOfHousehold", "Head of household").order_by("head_of_household__full_name"),
        HeadCell::new("size", "Size").numeric(),
        HeadCell::new("admin2", "Admin area"),
        HeadCell::new("status", "Status").unsortable(),
        HeadCell::new("createdAt", "Registered"),
    ]
}

pub fn household_filters() -> Vec<FilterField> {
    vec![
        FilterField::new("search", "Search", FilterKind::Text),
        FilterField::new(
            "admin2",
            "Admin area",
            FilterKind::Choice(ADMIN_AREAS.iter().map(|a| FilterOption::new(*a, *a)).collect()),
        ),
        FilterField::new("size", "Size", FilterKind::NumberRange),
        FilterField::new("registered", "Registered", FilterKind::DateRange),
        FilterField::new("withdrawn", "Withdrawn only", FilterKind::Flag),
    ]
}

pub fn household_row(row: &Value) -> Vec<String> {
    vec![
        text(row, "/unicefId"),
        text(row, "/headOfHousehold/fullName"),
        text(row, "/size"),
        text(row, "/admin2"),
        text(row, "/status"),
        date(row, "/createdAt"),
    ]
}

pub fn households_adapter(records: Vec<Value>) -> MemoryAdapter {
    MemoryAdapter::new("allHouseholds", records)
        .with_rule(
            "search",
            MatchRule::Search(vec!["unicefId".into(), "head_of_household__full_name".into()]),
        )
        .with_rule("admin2", MatchRule::Equals("admin2".into()))
        .with_rule("size", MatchRule::Range("size".into()))
        .with_rule("registered", MatchRule::DateRange("createdAt".into()))
        .with_rule("withdrawn", MatchRule::Flag("withdrawn".into()))
}

pub fn ticket_columns() -> Vec<HeadCell> {
    vec![
        HeadCell::new("code", "Ticket"),
        HeadCell::new("category", "Category"),
        HeadCell::new("status", "Status"),
        HeadCell::new("priority", "Priority").numeric(),
        HeadCell::new("household", "Household").unsortable(),
        HeadCell::new("createdAt", "Opened"),
    ]
}

pub fn ticket_filters() -> Vec<FilterField> {
    let options = |values: &[&str]| -> Vec<FilterOption> {
        values
            .iter()
            .map(|v| FilterOption::new(*v, title_case(v)))
            .collect()
    };
    vec![
        FilterField::new("search", "Search", FilterKind::Text),
        FilterField::new("status", "Status", FilterKind::MultiChoice(options(TICKET_STATUSES))),
        FilterField::new("category", "Category", FilterKind::Choice(options(TICKET_CATEGORIES))),
        FilterField::new("household", "Household", FilterKind::Reference),
        FilterField::new("urgent", "Urgent only", FilterKind::Flag),
    ]
}

pub fn ticket_row(row: &Value) -> Vec<String> {
    vec![
        text(row, "/code"),
        title_case(&text(row, "/category")),
        title_case(&text(row, "/status")),
        text(row, "/priority"),
        text(row, "/household"),
        date(row, "/createdAt"),
    ]
}

pub fn tickets_adapter(records: Vec<Value>) -> MemoryAdapter {
    MemoryAdapter::new("grievanceTickets", records)
        .with_envelope(Envelope::Rest)
        .with_rule("search", MatchRule::Search(vec!["code".into(), "household".into()]))
        .with_rule("status", MatchRule::OneOf("status".into()))
        .with_rule("category", MatchRule::Equals("category".into()))
        .with_rule("household", MatchRule::Equals("household".into()))
        .with_rule("urgent", MatchRule::Flag("urgent".into()))
}

fn text(row: &Value, pointer: &str) -> String {
    match row.pointer(pointer) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::from("-"),
        Some(other) => other.to_string(),
    }
}

fn date(row: &Value, pointer: &str) -> String {
    let full = text(row, pointer);
    full.get(..10).map(str::to_string).unwrap_or(full)
}

/// `IN_PROGRESS` -> `In progress`
fn title_case(value: &str) -> String {
    let lower = value.replace('_', " ").to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => lower,
    }
}
