//! The universal table controller
//!
//! [`TableController`] composes filter, pagination and sort state into a
//! single [`QueryVariables`] value. Every mutation that changes those
//! variables yields a [`FetchRequest`] tagged with a new generation. The
//! caller runs the request against a [`crate::QueryAdapter`] and hands the
//! outcome back through [`TableController::resolve`]; outcomes from older
//! generations are dropped.
//!
//! The controller does no I/O. [`crate::driver::TableDriver`] pairs it with
//! an adapter and a tokio runtime.

mod frame;

pub use frame::{
    Body, HeaderCell, PaginationView, RenderedRow, RowRenderer, SelectionView, TableFrame,
    TableRow,
};

use serde_json::{Map, Value};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::column::HeadCell;
use crate::config::TableConfig;
use crate::error::{GridError, Result};
use crate::filter::{FilterState, FilterValue, Filters};
use crate::pagination::PaginationState;
use crate::query::QueryVariables;
use crate::response::{Connection, PageInfo};
use crate::selection::Selection;
use crate::sort::{order_by_token, SortDirection, SortState};

/// Fetch lifecycle of a table
#[derive(Debug, Clone, PartialEq)]
pub enum TableStatus {
    /// Nothing requested yet
    Idle,
    Loading,
    Success,
    /// Last fetch failed; stays here until the next variable change or reload
    Error(GridError),
}

/// Caller-provided starting values
#[derive(Debug, Clone, Default)]
pub struct InitialVariables {
    /// Static variables sent with every request
    pub base: Map<String, Value>,
    pub filters: Filters,
    pub sort: SortState,
}

impl InitialVariables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.base.insert(name.into(), value.into());
        self
    }

    pub fn with_filters(mut self, filters: Filters) -> Self {
        self.filters = filters;
        self
    }

    pub fn with_sort(mut self, column: impl Into<String>, direction: SortDirection) -> Self {
        self.sort = SortState::new(Some(column.into()), direction);
        self
    }
}

/// A request the caller must run against the adapter
#[derive(Debug, Clone, PartialEq)]
pub struct FetchRequest {
    pub generation: u64,
    pub query: QueryVariables,
    /// `query` rendered for the adapter
    pub variables: Value,
}

/// Outcome of handing a response back to the table
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Rows replaced
    Applied,
    /// Error recorded, previous rows kept
    Failed,
    /// Response belonged to a superseded request and was dropped
    Stale,
    /// Rows applied but the page no longer exists; fetch the clamped page
    Refetch(FetchRequest),
}

/// Inputs a UI can send to a table
#[derive(Debug, Clone, PartialEq)]
pub enum TableAction {
    Sort(String),
    SetPage(usize),
    SetPageSize(usize),
    SetFilter { name: String, value: FilterValue },
    SetDraft(Filters),
    ApplyFilters,
    ClearFilters,
    ToggleRow(String),
    SelectAll,
    Reload,
}

/// Filter + pagination + sort + fetch state of one table instance
pub struct TableController<R> {
    id: Uuid,
    config: TableConfig,
    head_cells: Vec<HeadCell>,
    base: Map<String, Value>,
    initial_filters: Filters,
    filters: FilterState,
    pagination: PaginationState,
    sort: SortState,
    selection: Option<Selection>,
    generation: u64,
    requested: Option<QueryVariables>,
    status: TableStatus,
    rows: Vec<R>,
    page_info: PageInfo,
}

impl<R: TableRow> TableController<R> {
    pub fn new(config: TableConfig, head_cells: Vec<HeadCell>, initial: InitialVariables) -> Self {
        let pagination = PaginationState::new(config.page_size, config.page_size_options.clone());
        let selection = config.selectable.then(Selection::new);

        Self {
            id: Uuid::new_v4(),
            head_cells,
            base: initial.base,
            initial_filters: initial.filters.clone(),
            filters: FilterState::new(initial.filters),
            pagination,
            sort: initial.sort,
            selection,
            generation: 0,
            requested: None,
            status: TableStatus::Idle,
            rows: Vec::new(),
            page_info: PageInfo::default(),
            config,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    pub fn head_cells(&self) -> &[HeadCell] {
        &self.head_cells
    }

    pub fn status(&self) -> &TableStatus {
        &self.status
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.status, TableStatus::Idle | TableStatus::Loading)
    }

    /// Whether applying the draft would do anything: it differs from the
    /// applied filter, or the last fetch failed and applying retries it
    pub fn can_apply(&self) -> bool {
        self.filters.is_dirty() || matches!(self.status, TableStatus::Error(_))
    }

    /// Rows of the last successful fetch
    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    pub fn page_info(&self) -> &PageInfo {
        &self.page_info
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn pagination(&self) -> &PaginationState {
        &self.pagination
    }

    pub fn sort(&self) -> &SortState {
        &self.sort
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    /// Generation of the most recent request
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Variables for the current applied filter, page and sort
    pub fn variables(&self) -> QueryVariables {
        let order_by = self.sort.column.as_deref().map(|column| {
            let field = self
                .head_cells
                .iter()
                .find(|cell| cell.id == column)
                .map_or(column, HeadCell::sort_field);
            order_by_token(field, self.sort.direction, self.config.order_by_format)
        });

        QueryVariables {
            base: self.base.clone(),
            filters: self.filters.applied().clone(),
            page_index: self.pagination.page_index(),
            page_size: self.pagination.page_size(),
            order_by,
        }
    }

    /// First request after mount
    pub fn start(&mut self) -> Option<FetchRequest> {
        self.issue()
    }

    /// Fetch the current variables again, even if unchanged
    pub fn reload(&mut self) -> FetchRequest {
        let query = self.variables();
        self.issue_query(query)
    }

    /// Replace the draft filter. Never fetches.
    pub fn set_draft(&mut self, next: Filters) {
        self.filters.set_draft(next);
    }

    /// Edit one draft field. Never fetches.
    pub fn set_filter(&mut self, name: impl Into<String>, value: FilterValue) {
        self.filters.set_field(name, value);
    }

    /// Commit the draft and go back to the first page
    pub fn apply_filters(&mut self) -> Option<FetchRequest> {
        let applied = self.filters.apply();
        debug!(table = %self.id, fields = applied.len(), "Applying filters");
        self.pagination.reset();
        self.issue()
    }

    /// Reset draft and applied filter to the initial filter
    pub fn clear_filters(&mut self) -> Option<FetchRequest> {
        let initial = self.initial_filters.clone();
        self.clear_filters_to(&initial)
    }

    /// Reset draft and applied filter to `initial`
    pub fn clear_filters_to(&mut self, initial: &Filters) -> Option<FetchRequest> {
        self.filters.clear(initial);
        self.pagination.reset();
        self.issue()
    }

    pub fn set_page(&mut self, index: usize) -> Option<FetchRequest> {
        self.pagination.set_page(index);
        self.issue()
    }

    pub fn set_page_size(&mut self, size: usize) -> Result<Option<FetchRequest>> {
        self.pagination.set_page_size(size)?;
        Ok(self.issue())
    }

    /// Sort by `column`, toggling direction when it is already the sort column.
    /// Columns declared unsortable are ignored.
    pub fn request_sort(&mut self, column: &str) -> Option<FetchRequest> {
        if let Some(cell) = self.head_cells.iter().find(|cell| cell.id == column) {
            if !cell.sortable {
                warn!(table = %self.id, column, "Ignoring sort on unsortable column");
                return None;
            }
        }
        self.sort.request_sort(column);
        self.issue()
    }

    pub fn toggle_row(&mut self, id: &str) {
        if let Some(selection) = self.selection.as_mut() {
            selection.toggle(id);
        }
    }

    /// Toggle between "all loaded rows selected" and "nothing selected"
    pub fn select_all(&mut self) {
        if let Some(selection) = self.selection.as_mut() {
            let ids: Vec<String> = self.rows.iter().map(TableRow::row_id).collect();
            selection.toggle_all(ids.iter().map(String::as_str));
        }
    }

    /// Apply a UI action; returns the fetch it implies, if any
    pub fn dispatch(&mut self, action: TableAction) -> Result<Option<FetchRequest>> {
        let request = match action {
            TableAction::Sort(column) => self.request_sort(&column),
            TableAction::SetPage(index) => self.set_page(index),
            TableAction::SetPageSize(size) => return self.set_page_size(size),
            TableAction::SetFilter { name, value } => {
                self.set_filter(name, value);
                None
            }
            TableAction::SetDraft(draft) => {
                self.set_draft(draft);
                None
            }
            TableAction::ApplyFilters => self.apply_filters(),
            TableAction::ClearFilters => self.clear_filters(),
            TableAction::ToggleRow(id) => {
                self.toggle_row(&id);
                None
            }
            TableAction::SelectAll => {
                self.select_all();
                None
            }
            TableAction::Reload => Some(self.reload()),
        };
        Ok(request)
    }

    /// Hand back the outcome of a request
    pub fn resolve(&mut self, generation: u64, outcome: Result<Connection<R>>) -> Resolution {
        if generation != self.generation {
            debug!(
                table = %self.id,
                generation,
                latest = self.generation,
                "Discarding stale response"
            );
            return Resolution::Stale;
        }

        let page = match outcome {
            Ok(page) => page,
            Err(error) => {
                warn!(table = %self.id, generation, %error, "Fetch failed");
                self.status = TableStatus::Error(error);
                return Resolution::Failed;
            }
        };

        debug!(
            table = %self.id,
            generation,
            rows = page.items.len(),
            total = page.total_count,
            "Applying response"
        );

        let clamped = self.pagination.on_total_count_changed(page.total_count);
        self.rows = page.items;
        self.page_info = page.page_info;
        self.status = TableStatus::Success;

        if clamped {
            info!(
                table = %self.id,
                page = self.pagination.page_index(),
                total = page.total_count,
                "Page out of range, clamped"
            );
            if let Some(request) = self.issue() {
                return Resolution::Refetch(request);
            }
        }
        Resolution::Applied
    }

    /// Build the render model, calling `renderer` once per visible row
    pub fn render(&self, renderer: &impl RowRenderer<R>) -> TableFrame {
        let header = self
            .head_cells
            .iter()
            .map(|cell| HeaderCell {
                id: cell.id.clone(),
                label: cell.label.clone(),
                sortable: cell.sortable,
                numeric: cell.numeric,
                sort: self.sort.direction_of(&cell.id),
            })
            .collect();

        let mut error = None;
        let body = match &self.status {
            TableStatus::Idle | TableStatus::Loading => Body::Skeleton {
                rows: self.pagination.page_size(),
            },
            TableStatus::Success if self.pagination.total_count() == Some(0) => Body::Empty {
                message: self.config.empty_message.clone(),
            },
            TableStatus::Success => Body::Rows(self.render_rows(renderer)),
            TableStatus::Error(e) => {
                error = Some(e.to_string());
                if self.rows.is_empty() {
                    Body::Unavailable
                } else {
                    Body::Rows(self.render_rows(renderer))
                }
            }
        };

        let pagination = (!matches!(body, Body::Empty { .. })).then(|| {
            let (first_item, last_item) = self.pagination.item_range();
            PaginationView {
                page_index: self.pagination.page_index(),
                page_count: self.pagination.page_count(),
                page_size: self.pagination.page_size(),
                page_size_options: self.pagination.page_size_options().to_vec(),
                total_count: self.pagination.total_count(),
                first_item,
                last_item,
                has_previous: self.pagination.has_previous(),
                has_next: self.pagination.has_next(),
            }
        });

        let selection = self.selection.as_ref().map(|selection| {
            let ids: Vec<String> = self.rows.iter().map(TableRow::row_id).collect();
            SelectionView {
                selected: selection.len(),
                all_selected: selection.all_selected(ids.iter().map(String::as_str)),
            }
        });

        let title = self.config.title.as_ref().map(|title| match self.pagination.total_count() {
            Some(total) => format!("{} ({})", title, total),
            None => title.clone(),
        });

        TableFrame {
            title,
            header,
            body,
            loading: self.is_loading(),
            error,
            pagination,
            selection,
        }
    }

    fn render_rows(&self, renderer: &impl RowRenderer<R>) -> Vec<RenderedRow> {
        self.rows
            .iter()
            .map(|row| {
                let id = row.row_id();
                let selected = self
                    .selection
                    .as_ref()
                    .map_or(false, |selection| selection.is_selected(&id));
                RenderedRow {
                    cells: renderer.render_row(row),
                    id,
                    selected,
                }
            })
            .collect()
    }

    /// New request if the variables differ from the last requested ones.
    /// After a failed fetch any variable action retries, even if unchanged.
    fn issue(&mut self) -> Option<FetchRequest> {
        let query = self.variables();
        let failed = matches!(self.status, TableStatus::Error(_));
        if !failed && self.requested.as_ref() == Some(&query) {
            return None;
        }
        Some(self.issue_query(query))
    }

    fn issue_query(&mut self, query: QueryVariables) -> FetchRequest {
        self.generation += 1;
        self.status = TableStatus::Loading;
        self.requested = Some(query.clone());

        let variables = query.to_json(self.config.page_style);
        debug!(table = %self.id, generation = self.generation, %variables, "Issuing fetch");

        FetchRequest {
            generation: self.generation,
            query,
            variables,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn household(n: usize) -> Value {
        json!({ "id": format!("HH-{}", n), "unicefId": format!("HH-{}", n), "size": n % 7 })
    }

    fn page(range: std::ops::Range<usize>, total: usize) -> Connection<Value> {
        Connection {
            items: range.map(household).collect(),
            total_count: total,
            page_info: PageInfo::default(),
        }
    }

    fn renderer(row: &Value) -> Vec<String> {
        vec![row["unicefId"].as_str().unwrap_or_default().to_string()]
    }

    fn table() -> TableController<Value> {
        TableController::new(
            TableConfig::new("allHouseholds").with_title("Households"),
            vec![HeadCell::new("unicefId", "ID"), HeadCell::new("createdAt", "Created")],
            InitialVariables::new().with_base("businessArea", "afghanistan"),
        )
    }

    fn loaded(total: usize) -> TableController<Value> {
        let mut table = table();
        let request = table.start().unwrap();
        let end = total.min(10);
        assert_eq!(table.resolve(request.generation, Ok(page(0..end, total))), Resolution::Applied);
        table
    }

    #[test]
    fn test_start_issues_once() {
        let mut table = table();
        assert_eq!(table.status(), &TableStatus::Idle);

        let request = table.start().unwrap();
        assert_eq!(request.generation, 1);
        assert_eq!(
            request.variables,
            json!({ "businessArea": "afghanistan", "first": 10, "offset": 0 })
        );
        assert!(table.start().is_none());
    }

    #[test]
    fn test_draft_edits_do_not_fetch() {
        let mut table = loaded(22);
        let before = table.variables();

        assert!(table
            .dispatch(TableAction::SetFilter {
                name: "search".into(),
                value: FilterValue::Text("Ali".into()),
            })
            .unwrap()
            .is_none());
        table.set_draft(Filters::new().with("search", FilterValue::Text("Alina".into())));

        assert_eq!(table.variables(), before);
        assert_eq!(table.status(), &TableStatus::Success);
    }

    #[test]
    fn test_apply_resets_page_and_fetches() {
        let mut table = loaded(22);
        table.set_page(2).unwrap();
        let generation = table.generation();
        table.resolve(generation, Ok(page(20..22, 22)));

        table.set_filter("search", FilterValue::Text("Ali".into()));
        let request = table.apply_filters().unwrap();

        assert_eq!(request.query.page_index, 0);
        assert_eq!(request.variables["search"], json!("Ali"));
        assert!(table.is_loading());
    }

    #[test]
    fn test_apply_then_clear_restores_initial() {
        let initial = Filters::new().with("program", FilterValue::Reference("P-1".into()));
        let mut table: TableController<Value> = TableController::new(
            TableConfig::new("allHouseholds"),
            Vec::new(),
            InitialVariables::new().with_filters(initial.clone()),
        );
        table.start();

        table.set_filter("search", FilterValue::Text("x".into()));
        table.apply_filters();
        table.clear_filters();

        assert_eq!(table.filters().draft(), &initial);
        assert_eq!(table.filters().applied(), &initial);
    }

    #[test]
    fn test_set_page_clamps_for_22_rows() {
        let mut table = loaded(22);

        let request = table.set_page(2).unwrap();
        assert_eq!(request.query.page_index, 2);
        table.resolve(request.generation, Ok(page(20..22, 22)));

        assert!(table.set_page(3).is_none());
        assert_eq!(table.pagination().page_index(), 2);
    }

    #[test]
    fn test_request_sort_twice() {
        let mut table = loaded(22);
        assert_eq!(table.sort().column, None);

        let request = table.request_sort("createdAt").unwrap();
        assert_eq!(table.sort(), &SortState::new(Some("createdAt".into()), SortDirection::Asc));
        assert_eq!(request.variables["orderBy"], json!("created_at"));

        let request = table.request_sort("createdAt").unwrap();
        assert_eq!(table.sort(), &SortState::new(Some("createdAt".into()), SortDirection::Desc));
        assert_eq!(request.variables["orderBy"], json!("-created_at"));
    }

    #[test]
    fn test_unsortable_column_is_ignored() {
        let mut table: TableController<Value> = TableController::new(
            TableConfig::new("allHouseholds"),
            vec![HeadCell::new("actions", "").unsortable()],
            InitialVariables::new(),
        );
        table.start();
        assert!(table.request_sort("actions").is_none());
        assert_eq!(table.sort().column, None);
    }

    #[test]
    fn test_order_by_override() {
        let mut table: TableController<Value> = TableController::new(
            TableConfig::new("allHouseholds"),
            vec![HeadCell::new("headOfHousehold", "Head").order_by("headOfHousehold__fullName")],
            InitialVariables::new(),
        );
        let request = table.request_sort("headOfHousehold").unwrap();
        assert_eq!(request.variables["orderBy"], json!("head_of_household__full_name"));
    }

    #[test]
    fn test_page_size_change_resets_page() {
        let mut table = loaded(100);
        table.set_page(4);

        let request = table.set_page_size(20).unwrap().unwrap();
        assert_eq!(request.query.page_index, 0);
        assert_eq!(request.query.page_size, 20);

        assert!(table.set_page_size(13).is_err());
    }

    #[test]
    fn test_stale_response_is_discarded() {
        let mut table = loaded(22);

        let first = table.request_sort("createdAt").unwrap();
        let second = table.request_sort("createdAt").unwrap();

        assert_eq!(table.resolve(second.generation, Ok(page(10..20, 22))), Resolution::Applied);
        assert_eq!(table.resolve(first.generation, Ok(page(0..3, 3))), Resolution::Stale);

        assert_eq!(table.rows()[0]["id"], json!("HH-10"));
        assert_eq!(table.pagination().total_count(), Some(22));
    }

    #[test]
    fn test_shrunk_total_clamps_and_refetches() {
        let mut table = loaded(95);
        let request = table.set_page(9).unwrap();
        table.resolve(request.generation, Ok(page(90..95, 95)));

        table.set_filter("search", FilterValue::Text("a".into()));
        table.apply_filters();
        // user pages ahead before the filtered count arrives
        table.set_page(5);
        let generation = table.generation();

        match table.resolve(generation, Ok(page(0..0, 31))) {
            Resolution::Refetch(request) => assert_eq!(request.query.page_index, 3),
            other => panic!("expected refetch, got {:?}", other),
        }
        assert!(table.is_loading());
    }

    #[test]
    fn test_skeleton_while_loading() {
        let mut table = table();
        table.start();
        let frame = table.render(&renderer);
        assert_eq!(frame.body, Body::Skeleton { rows: 10 });
        assert!(frame.loading);
        assert_eq!(frame.title.as_deref(), Some("Households"));
    }

    #[test]
    fn test_empty_result_renders_placeholder() {
        let table = loaded(0);
        let frame = table.render(&renderer);

        assert!(frame.is_empty_state());
        assert_eq!(frame.body, Body::Empty { message: "No results".into() });
        assert!(frame.pagination.is_none());
        assert_eq!(frame.title.as_deref(), Some("Households (0)"));
    }

    #[test]
    fn test_rows_rendered_through_renderer() {
        let table = loaded(22);
        let frame = table.render(&renderer);

        assert_eq!(frame.rows().len(), 10);
        assert_eq!(frame.rows()[3].cells, vec!["HH-3".to_string()]);
        let pagination = frame.pagination.unwrap();
        assert_eq!(pagination.label(), "1-10 of 22");
        assert_eq!(pagination.page_count, 3);
    }

    #[test]
    fn test_error_keeps_previous_rows() {
        let mut table = loaded(22);
        let request = table.set_page(1).unwrap();

        let resolution = table.resolve(
            request.generation,
            Err(GridError::Adapter("connection reset".into())),
        );
        assert_eq!(resolution, Resolution::Failed);

        let frame = table.render(&renderer);
        assert_eq!(frame.error.as_deref(), Some("Adapter error: connection reset"));
        assert_eq!(frame.rows().len(), 10);
        assert!(!frame.loading);

        // no automatic retry; an explicit reload re-enters loading
        let retry = table.dispatch(TableAction::Reload).unwrap().unwrap();
        assert_eq!(retry.generation, request.generation + 1);
        assert_eq!(table.status(), &TableStatus::Loading);
    }

    #[test]
    fn test_reapply_after_error_retries() {
        let mut table = loaded(22);
        assert!(!table.can_apply());
        assert_eq!(table.apply_filters(), None);

        let request = table.reload();
        table.resolve(request.generation, Err(GridError::Adapter("down".into())));
        assert!(table.can_apply());

        let retry = table.apply_filters().unwrap();
        assert_eq!(retry.generation, request.generation + 1);
        assert_eq!(table.status(), &TableStatus::Loading);

        table.resolve(retry.generation, Err(GridError::Adapter("down".into())));
        let retry = table.set_page(0).unwrap();
        assert_eq!(retry.query.page_index, 0);

        table.resolve(retry.generation, Ok(page(0..10, 22)));
        assert_eq!(table.status(), &TableStatus::Success);
        assert_eq!(table.page_info(), &PageInfo::default());
        assert!(!table.can_apply());
        assert_eq!(table.set_page(0), None);
    }

    #[test]
    fn test_error_without_rows_is_unavailable() {
        let mut table = table();
        let request = table.start().unwrap();
        table.resolve(request.generation, Err(GridError::GraphQl(vec!["boom".into()])));

        let frame = table.render(&renderer);
        assert_eq!(frame.body, Body::Unavailable);
        assert!(frame.error.is_some());
    }

    #[test]
    fn test_select_all_covers_loaded_rows_only() {
        let mut table: TableController<Value> = TableController::new(
            TableConfig::new("allHouseholds").selectable(true),
            vec![HeadCell::new("unicefId", "ID")],
            InitialVariables::new(),
        );
        let request = table.start().unwrap();
        table.resolve(request.generation, Ok(page(0..10, 22)));

        table.dispatch(TableAction::SelectAll).unwrap();
        let frame = table.render(&renderer);
        assert_eq!(frame.selection, Some(SelectionView { selected: 10, all_selected: true }));
        assert!(frame.rows().iter().all(|row| row.selected));

        table.dispatch(TableAction::ToggleRow("HH-0".into())).unwrap();
        assert_eq!(table.selection().unwrap().len(), 9);

        table.select_all();
        table.select_all();
        assert!(table.selection().unwrap().is_empty());
    }
}
