//! egui widgets that draw table frames and filter bars
//!
//! Widgets never mutate table state. They draw a [`grid_core::TableFrame`]
//! or a draft [`grid_core::Filters`] and return the [`grid_core::TableAction`]s
//! the user triggered, which the caller dispatches after the frame.

pub mod filter_bar;
pub mod table_view;
pub mod widget_id;

pub use filter_bar::FilterBar;
pub use table_view::TableView;
pub use widget_id::WidgetId;
