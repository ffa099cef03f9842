//! Filter bar editing a table's draft filters
//!
//! Every edit becomes a `SetFilter` action against the draft; nothing is
//! queried until the user presses Apply (or Enter in a text field).

use ahash::AHashMap;
use chrono::NaiveDate;
use egui::{Button, ComboBox, TextEdit, Ui};
use grid_core::{DateRange, FilterField, FilterKind, FilterValue, Filters, NumberRange, TableAction};
use tracing::debug;

use crate::widget_id::WidgetId;

/// Input row for a set of [`FilterField`]s
pub struct FilterBar {
    id: WidgetId,
    fields: Vec<FilterField>,
    /// Raw text of range bounds, keyed `"<field>.min"` / `"<field>.max"`
    buffers: AHashMap<String, String>,
}

impl FilterBar {
    pub fn new(id: WidgetId, fields: Vec<FilterField>) -> Self {
        Self {
            id,
            fields,
            buffers: AHashMap::new(),
        }
    }

    /// Forget typed range text so it is re-read from the draft
    pub fn reset(&mut self) {
        debug!(bar = %self.id, "Filter inputs reset");
        self.buffers.clear();
    }

    /// Draw inputs for `draft` and return the actions the user triggered.
    /// Apply is enabled only while `can_apply` holds.
    pub fn show(&mut self, ui: &mut Ui, draft: &Filters, can_apply: bool) -> Vec<TableAction> {
        let mut actions = Vec::new();
        let mut submit = false;
        let Self { id: bar_id, fields, buffers } = self;

        ui.horizontal_wrapped(|ui| {
            for (idx, field) in fields.iter().enumerate() {
                let id = bar_id.with("filter").index(idx);
                ui.label(field.label.as_str());
                let edit = match &field.kind {
                    FilterKind::Text | FilterKind::Reference => {
                        let mut text = draft.text(&field.name).to_string();
                        let response = ui.add(
                            TextEdit::singleline(&mut text)
                                .hint_text(field.label.as_str())
                                .desired_width(140.0),
                        );
                        if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                            submit = true;
                        }
                        response.changed().then(|| match field.kind {
                            FilterKind::Reference => FilterValue::Reference(text),
                            _ => FilterValue::Text(text),
                        })
                    }
                    FilterKind::Choice(options) => {
                        let current = draft.text(&field.name).to_string();
                        let selected = options
                            .iter()
                            .find(|o| o.value == current)
                            .map(|o| o.label.clone())
                            .unwrap_or_else(|| String::from("Any"));
                        let mut picked = None;
                        ComboBox::from_id_source(id.id())
                            .selected_text(selected)
                            .show_ui(ui, |ui| {
                                if ui.selectable_label(current.is_empty(), "Any").clicked() {
                                    picked = Some(String::new());
                                }
                                for option in options {
                                    if ui
                                        .selectable_label(option.value == current, option.label.as_str())
                                        .clicked()
                                    {
                                        picked = Some(option.value.clone());
                                    }
                                }
                            });
                        picked.filter(|p| *p != current).map(FilterValue::Choice)
                    }
                    FilterKind::MultiChoice(options) => {
                        let current: Vec<String> = match draft.get(&field.name) {
                            Some(FilterValue::MultiChoice(values)) => values.clone(),
                            _ => Vec::new(),
                        };
                        let summary = match current.len() {
                            0 => String::from("Any"),
                            n => format!("{} selected", n),
                        };
                        let mut next = None;
                        ui.menu_button(summary, |ui| {
                            for option in options {
                                let mut checked = current.contains(&option.value);
                                if ui.checkbox(&mut checked, option.label.as_str()).changed() {
                                    next = Some(toggle_choice(&current, &option.value));
                                }
                            }
                        });
                        next.map(FilterValue::MultiChoice)
                    }
                    FilterKind::NumberRange => {
                        let range = match draft.get(&field.name) {
                            Some(FilterValue::NumberRange(range)) => *range,
                            _ => NumberRange::default(),
                        };
                        let min = bound_input(ui, buffers, &field.name, "min", range.min.map(|v| v.to_string()));
                        ui.label("–");
                        let max = bound_input(ui, buffers, &field.name, "max", range.max.map(|v| v.to_string()));
                        let next = NumberRange {
                            min: min.map_or(range.min, |text| parse_number_bound(&text).unwrap_or(range.min)),
                            max: max.map_or(range.max, |text| parse_number_bound(&text).unwrap_or(range.max)),
                        };
                        (next != range).then_some(FilterValue::NumberRange(next))
                    }
                    FilterKind::DateRange => {
                        let range = match draft.get(&field.name) {
                            Some(FilterValue::DateRange(range)) => *range,
                            _ => DateRange::default(),
                        };
                        let fmt = |d: NaiveDate| d.format("%Y-%m-%d").to_string();
                        let min = bound_input(ui, buffers, &field.name, "min", range.min.map(fmt));
                        ui.label("–");
                        let max = bound_input(ui, buffers, &field.name, "max", range.max.map(fmt));
                        let next = DateRange {
                            min: min.map_or(range.min, |text| parse_date_bound(&text).unwrap_or(range.min)),
                            max: max.map_or(range.max, |text| parse_date_bound(&text).unwrap_or(range.max)),
                        };
                        (next != range).then_some(FilterValue::DateRange(next))
                    }
                    FilterKind::Flag => {
                        let mut on = matches!(draft.get(&field.name), Some(FilterValue::Flag(true)));
                        ui.checkbox(&mut on, "").changed().then_some(FilterValue::Flag(on))
                    }
                };

                if let Some(value) = edit {
                    actions.push(TableAction::SetFilter {
                        name: field.name.clone(),
                        value,
                    });
                }
                ui.add_space(6.0);
            }

            if ui.add_enabled(can_apply, Button::new("Apply")).clicked() {
                submit = true;
            }
            if ui.button("Clear").clicked() {
                actions.push(TableAction::ClearFilters);
            }
        });

        if submit {
            actions.push(TableAction::ApplyFilters);
        }
        if actions.iter().any(|a| matches!(a, TableAction::ClearFilters)) {
            self.reset();
        }
        actions
    }
}

/// Text box for one range bound. Returns the text when it was edited.
/// Text that does not parse stays in the box but leaves the draft alone.
fn bound_input(
    ui: &mut Ui,
    buffers: &mut AHashMap<String, String>,
    field: &str,
    bound: &str,
    current: Option<String>,
) -> Option<String> {
    let text = buffers
        .entry(format!("{}.{}", field, bound))
        .or_insert_with(|| current.unwrap_or_default());
    let response = ui.add(TextEdit::singleline(text).hint_text(bound).desired_width(80.0));
    response.changed().then(|| text.clone())
}

/// `Some(None)` for a cleared bound, `None` when the text does not parse
pub fn parse_number_bound(text: &str) -> Option<Option<f64>> {
    let text = text.trim();
    if text.is_empty() {
        return Some(None);
    }
    text.parse::<f64>().ok().filter(|v| v.is_finite()).map(Some)
}

/// `Some(None)` for a cleared bound, `None` when the text is not `YYYY-MM-DD`
pub fn parse_date_bound(text: &str) -> Option<Option<NaiveDate>> {
    let text = text.trim();
    if text.is_empty() {
        return Some(None);
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d").ok().map(Some)
}

fn toggle_choice(current: &[String], value: &str) -> Vec<String> {
    if current.iter().any(|v| v == value) {
        current.iter().filter(|v| *v != value).cloned().collect()
    } else {
        let mut next = current.to_vec();
        next.push(value.to_string());
        next
    }
}
