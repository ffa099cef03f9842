//! Table widget drawing a [`TableFrame`]

use egui::{Align, Button, ComboBox, Layout, RichText, Sense, Ui};
use egui_extras::{Column, TableBuilder};
use grid_core::{Body, HeaderCell, PaginationView, SortDirection, TableAction, TableFrame};

use crate::widget_id::WidgetId;

/// Draws one table. Holds layout options only; all state lives in the frame.
#[derive(Debug, Clone)]
pub struct TableView {
    id: WidgetId,
    row_height: f32,
    unavailable_message: String,
}

impl TableView {
    pub fn new(id: WidgetId) -> Self {
        Self {
            id,
            row_height: 22.0,
            unavailable_message: String::from("Data is unavailable"),
        }
    }

    pub fn with_row_height(mut self, row_height: f32) -> Self {
        self.row_height = row_height;
        self
    }

    pub fn with_unavailable_message(mut self, message: impl Into<String>) -> Self {
        self.unavailable_message = message.into();
        self
    }

    /// Draw the frame and return the actions the user triggered
    pub fn show(&self, ui: &mut Ui, frame: &TableFrame) -> Vec<TableAction> {
        let mut actions = Vec::new();

        ui.push_id(self.id.id(), |ui| {
            self.title_bar(ui, frame, &mut actions);

            // empty result set: placeholder only
            match &frame.body {
                Body::Empty { message } => {
                    ui.add_space(8.0);
                    ui.vertical_centered(|ui| ui.weak(message.as_str()));
                }
                Body::Unavailable => {
                    self.table(ui, frame, &mut actions);
                    ui.add_space(8.0);
                    ui.vertical_centered(|ui| ui.weak(self.unavailable_message.as_str()));
                }
                Body::Skeleton { .. } | Body::Rows(_) => self.table(ui, frame, &mut actions),
            }

            if let Some(view) = &frame.pagination {
                ui.separator();
                self.footer(ui, view, &mut actions);
            }
        });

        actions
    }

    fn title_bar(&self, ui: &mut Ui, frame: &TableFrame, actions: &mut Vec<TableAction>) {
        ui.horizontal(|ui| {
            if let Some(title) = &frame.title {
                ui.heading(title.as_str());
            }
            if frame.loading {
                ui.spinner();
            }
            if let Some(error) = &frame.error {
                ui.colored_label(ui.visuals().error_fg_color, format!("⚠ {}", error));
                if ui.button("Retry").clicked() {
                    actions.push(TableAction::Reload);
                }
            }
        });
    }

    fn table(&self, ui: &mut Ui, frame: &TableFrame, actions: &mut Vec<TableAction>) {
        let selectable = frame.selection.is_some();
        let column_count = frame.header.len();

        let mut builder = TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .cell_layout(Layout::left_to_right(Align::Center))
            .min_scrolled_height(0.0)
            .vscroll(true);

        if selectable {
            builder = builder.column(Column::exact(24.0));
        }
        for idx in 0..column_count {
            builder = builder.column(if idx + 1 == column_count {
                Column::remainder().at_least(80.0).clip(true)
            } else {
                Column::initial(150.0).at_least(60.0).clip(true)
            });
        }

        builder
            .header(self.row_height, |mut header| {
                if let Some(selection) = frame.selection {
                    header.col(|ui| {
                        let mut all = selection.all_selected;
                        let enabled = !frame.rows().is_empty();
                        if ui.add_enabled(enabled, egui::Checkbox::new(&mut all, "")).changed() {
                            actions.push(TableAction::SelectAll);
                        }
                    });
                }
                for cell in &frame.header {
                    header.col(|ui| {
                        if let Some(action) = header_cell(ui, cell) {
                            actions.push(action);
                        }
                    });
                }
            })
            .body(|body| match &frame.body {
                Body::Skeleton { rows } => {
                    body.rows(self.row_height, *rows, |_row_index, mut row| {
                        if selectable {
                            row.col(|_ui| {});
                        }
                        for idx in 0..column_count {
                            row.col(|ui| skeleton_bar(ui, idx));
                        }
                    });
                }
                Body::Rows(rows) => {
                    body.rows(self.row_height, rows.len(), |row_index, mut row| {
                        let rendered = &rows[row_index];
                        if selectable {
                            row.col(|ui| {
                                let mut checked = rendered.selected;
                                if ui.checkbox(&mut checked, "").changed() {
                                    actions.push(TableAction::ToggleRow(rendered.id.clone()));
                                }
                            });
                        }
                        for (cell, head) in rendered.cells.iter().zip(&frame.header) {
                            row.col(|ui| {
                                if head.numeric {
                                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                                        ui.label(cell.as_str());
                                    });
                                } else {
                                    ui.label(cell.as_str());
                                }
                            });
                        }
                    });
                }
                Body::Empty { .. } | Body::Unavailable => {}
            });
    }

    fn footer(&self, ui: &mut Ui, view: &PaginationView, actions: &mut Vec<TableAction>) {
        ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
            if ui.add_enabled(view.has_next, Button::new("▶")).clicked() {
                actions.push(TableAction::SetPage(view.page_index + 1));
            }
            if ui.add_enabled(view.has_previous, Button::new("◀")).clicked() {
                actions.push(TableAction::SetPage(view.page_index.saturating_sub(1)));
            }
            ui.label(view.label());

            ComboBox::from_id_source(self.id.with("page_size").id())
                .selected_text(view.page_size.to_string())
                .width(60.0)
                .show_ui(ui, |ui| {
                    for &size in &view.page_size_options {
                        let current = size == view.page_size;
                        if ui.selectable_label(current, size.to_string()).clicked() && !current {
                            actions.push(TableAction::SetPageSize(size));
                        }
                    }
                });
            ui.label("Rows per page:");
        });
    }
}

fn header_cell(ui: &mut Ui, cell: &HeaderCell) -> Option<TableAction> {
    let text = match sort_indicator(cell.sort) {
        Some(arrow) => format!("{} {}", cell.label, arrow),
        None => cell.label.clone(),
    };

    if !cell.sortable {
        ui.strong(text);
        return None;
    }

    let response = ui
        .add(Button::new(RichText::new(text).strong()).frame(false))
        .on_hover_text("Sort");
    response.clicked().then(|| TableAction::Sort(cell.id.clone()))
}

/// Arrow shown next to the active sort column
pub fn sort_indicator(sort: Option<SortDirection>) -> Option<&'static str> {
    match sort? {
        SortDirection::Asc => Some("⏶"),
        SortDirection::Desc => Some("⏷"),
    }
}

fn skeleton_bar(ui: &mut Ui, column: usize) {
    // vary widths so the placeholder does not look like a grid
    let fraction = [0.7, 0.5, 0.85, 0.6][column % 4];
    let width = (ui.available_width() * fraction).max(8.0);
    let (rect, _) = ui.allocate_exact_size(egui::vec2(width, 10.0), Sense::hover());
    ui.painter()
        .rect_filled(rect, 3.0, ui.visuals().widgets.noninteractive.bg_fill);
}

#[cfg(test)]
mod tests {
    use super::*;
    use grid_core::{RenderedRow, SelectionView};

    fn header() -> Vec<HeaderCell> {
        vec![
            HeaderCell {
                id: "unicefId".into(),
                label: "ID".into(),
                sortable: true,
                numeric: false,
                sort: Some(SortDirection::Desc),
            },
            HeaderCell {
                id: "size".into(),
                label: "Size".into(),
                sortable: false,
                numeric: true,
                sort: None,
            },
        ]
    }

    fn frame(body: Body) -> TableFrame {
        TableFrame {
            title: Some("Households (2)".into()),
            header: header(),
            body,
            loading: false,
            error: Some("Adapter error: timeout".into()),
            pagination: Some(PaginationView {
                page_index: 0,
                page_count: 1,
                page_size: 10,
                page_size_options: vec![5, 10, 20],
                total_count: Some(2),
                first_item: 1,
                last_item: 2,
                has_previous: false,
                has_next: false,
            }),
            selection: Some(SelectionView {
                selected: 1,
                all_selected: false,
            }),
        }
    }

    fn collect_texts(shape: &egui::Shape, out: &mut Vec<String>) {
        match shape {
            egui::Shape::Text(text) => out.push(text.galley.text().to_string()),
            egui::Shape::Vec(shapes) => shapes.iter().for_each(|s| collect_texts(s, out)),
            _ => {}
        }
    }

    /// Run one headless frame; returns the actions and every painted text
    fn draw_with(view: &TableView, frame: &TableFrame) -> (Vec<TableAction>, Vec<String>) {
        let ctx = egui::Context::default();
        let mut actions = Vec::new();
        let output = ctx.run(egui::RawInput::default(), |ctx| {
            egui::CentralPanel::default().show(ctx, |ui| {
                actions = view.show(ui, frame);
            });
        });

        let mut texts = Vec::new();
        for clipped in &output.shapes {
            collect_texts(&clipped.shape, &mut texts);
        }
        (actions, texts)
    }

    fn draw(frame: &TableFrame) -> Vec<TableAction> {
        draw_with(&TableView::new(WidgetId::new("households")), frame).0
    }

    #[test]
    fn test_sort_indicator() {
        assert_eq!(sort_indicator(None), None);
        assert_eq!(sort_indicator(Some(SortDirection::Asc)), Some("⏶"));
        assert_eq!(sort_indicator(Some(SortDirection::Desc)), Some("⏷"));
    }

    #[test]
    fn test_every_body_draws_without_input() {
        let rows = Body::Rows(vec![
            RenderedRow {
                id: "1".into(),
                cells: vec!["HH-001".into(), "4".into()],
                selected: true,
            },
            RenderedRow {
                id: "2".into(),
                cells: vec!["HH-002".into(), "1".into()],
                selected: false,
            },
        ]);

        for body in [
            rows,
            Body::Skeleton { rows: 10 },
            Body::Empty {
                message: "No results".into(),
            },
            Body::Unavailable,
        ] {
            assert!(draw(&frame(body)).is_empty());
        }
    }

    #[test]
    fn test_empty_result_draws_placeholder_without_header() {
        let mut empty = frame(Body::Empty {
            message: "No results".into(),
        });
        empty.title = None;
        empty.error = None;
        empty.pagination = None;
        empty.selection = None;
        empty.header[0].label = "UNICEF-ID".into();

        let (_, texts) = draw_with(&TableView::new(WidgetId::new("households")), &empty);
        assert!(texts.iter().any(|t| t == "No results"), "painted: {:?}", texts);
        assert!(!texts.iter().any(|t| t.starts_with("UNICEF-ID")), "painted: {:?}", texts);
    }

    #[test]
    fn test_unavailable_keeps_header_and_custom_message() {
        let view = TableView::new(WidgetId::new("tickets"))
            .with_row_height(26.0)
            .with_unavailable_message("Tickets could not be loaded");

        let (_, texts) = draw_with(&view, &frame(Body::Unavailable));
        assert!(texts.iter().any(|t| t == "Tickets could not be loaded"), "painted: {:?}", texts);
        assert!(texts.iter().any(|t| t.starts_with("ID")), "painted: {:?}", texts);
    }
}
