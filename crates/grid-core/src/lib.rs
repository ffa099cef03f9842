//! Core state for paginated, sortable, filterable tables
//!
//! This crate provides the headless pieces of a universal list view:
//! filter draft/applied state, pagination, sorting, selection, the query
//! variables derived from them, and the controller that ties those to an
//! asynchronous [`QueryAdapter`] while discarding stale responses.

pub mod adapter;
pub mod column;
pub mod config;
pub mod driver;
pub mod error;
pub mod filter;
pub mod pagination;
pub mod query;
pub mod response;
pub mod selection;
pub mod sort;
pub mod table;

// Re-export commonly used types
pub use adapter::QueryAdapter;
pub use column::HeadCell;
pub use config::TableConfig;
pub use driver::TableDriver;
pub use error::GridError;
pub use filter::{
    DateRange, FilterField, FilterKind, FilterOption, FilterState, FilterValue, Filters,
    NumberRange,
};
pub use pagination::PaginationState;
pub use query::{PageStyle, QueryVariables};
pub use response::{Connection, PageInfo};
pub use selection::Selection;
pub use sort::{OrderByFormat, SortDirection, SortState};
pub use table::{
    Body, FetchRequest, HeaderCell, InitialVariables, PaginationView, RenderedRow, Resolution,
    RowRenderer, SelectionView, TableAction, TableController, TableFrame, TableRow, TableStatus,
};
