//! Main application state

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::sync::Arc;

use eframe::egui::{self, Context, ScrollArea};
use grid_core::{
    FilterField, GridError, HeadCell, InitialVariables, PaginationState, SortDirection, TableAction,
    TableConfig, TableController, TableDriver, TableFrame,
};
use grid_data::{export_frame_csv, MemoryAdapter};
use grid_ui::{FilterBar, TableView, WidgetId};
use serde_json::Value;
use tokio::runtime::Runtime;
use tracing::{error, info, warn};

type RowFn = fn(&Value) -> Vec<String>;

/// Everything one table on screen needs
pub struct TablePanel {
    name: String,
    driver: TableDriver<Value>,
    adapter: Arc<MemoryAdapter>,
    view: TableView,
    filter_bar: FilterBar,
    render_row: RowFn,
    status: Option<String>,
}

/// Declaration of a panel before it is bound to a runtime
pub struct PanelSpec {
    pub name: &'static str,
    pub config: TableConfig,
    pub columns: Vec<HeadCell>,
    pub filters: Vec<FilterField>,
    pub initial: InitialVariables,
    pub adapter: MemoryAdapter,
    pub render_row: RowFn,
}

impl TablePanel {
    fn new(spec: PanelSpec, runtime: &Runtime, ctx: &Context) -> Self {
        let adapter = Arc::new(spec.adapter);
        let controller = TableController::new(spec.config, spec.columns, spec.initial);
        let repaint = ctx.clone();
        let mut driver = TableDriver::new(controller, adapter.clone(), runtime.handle().clone())
            .with_notifier(move || repaint.request_repaint());
        info!(table = spec.name, source = driver.adapter_name(), "Starting table");
        driver.start();

        let id = WidgetId::new(spec.name);
        let unavailable = format!("{} could not be loaded", spec.name);
        Self {
            name: spec.name.to_string(),
            driver,
            adapter,
            view: TableView::new(id.with("table")).with_unavailable_message(unavailable),
            filter_bar: FilterBar::new(id.with("filters"), spec.filters),
            render_row: spec.render_row,
            status: None,
        }
    }

    fn title(&self) -> String {
        self.driver
            .controller()
            .config()
            .title
            .clone()
            .unwrap_or_else(|| self.name.clone())
    }

    fn show(&mut self, ui: &mut egui::Ui) {
        let mut actions = Vec::new();

        let controller = self.driver.controller();
        let (draft, can_apply) = (controller.filters().draft().clone(), controller.can_apply());
        actions.extend(self.filter_bar.show(ui, &draft, can_apply));
        ui.separator();

        let frame = self.driver.render(&self.render_row);
        actions.extend(self.view.show(ui, &frame));

        let mut export = false;
        ui.horizontal(|ui| {
            export = ui.button("Export page as CSV").clicked();
            if ui
                .button("Fail next request")
                .on_hover_text("The next fetch returns an adapter error")
                .clicked()
            {
                self.adapter.fail_next("Simulated backend outage");
            }
            if let Some(selection) = self.driver.controller().selection() {
                if !selection.is_empty() {
                    ui.label(format!("{} selected", selection.len()));
                }
            }
            if let Some(status) = &self.status {
                ui.weak(status.as_str());
            }
        });

        if export {
            self.status = Some(match self.export(&frame) {
                Ok(message) => message,
                Err(e) => {
                    error!(table = %self.name, "Export failed: {}", e);
                    format!("Export failed: {}", e)
                }
            });
        }

        for action in actions {
            self.dispatch(action);
        }
    }

    fn dispatch(&mut self, action: TableAction) {
        match self.driver.dispatch(action) {
            Ok(()) => {}
            Err(e @ GridError::InvalidPageSize { .. }) => {
                warn!(table = %self.name, "Rejected action: {}", e);
                self.status = Some(e.to_string());
            }
            Err(e) => {
                error!(table = %self.name, "Action failed: {}", e);
                self.status = Some(e.to_string());
            }
        }
    }

    fn export(&self, frame: &TableFrame) -> anyhow::Result<String> {
        let path = export_path(&self.name, self.driver.controller().pagination());
        let file = File::create(&path)?;
        let rows = export_frame_csv(frame, BufWriter::new(file))?;
        info!(table = %self.name, path = %path.display(), rows, "Exported page");
        Ok(format!("Wrote {} rows to {}", rows, path.display()))
    }
}

pub struct CasegridApp {
    /// Owns the worker threads the fetches run on
    _runtime: Runtime,
    panels: Vec<TablePanel>,
    active: usize,
}

impl CasegridApp {
    pub fn new(cc: &eframe::CreationContext<'_>, runtime: Runtime, specs: Vec<PanelSpec>) -> Self {
        let panels = specs
            .into_iter()
            .map(|spec| TablePanel::new(spec, &runtime, &cc.egui_ctx))
            .collect::<Vec<_>>();
        info!(tables = panels.len(), "Tables started");

        Self {
            _runtime: runtime,
            panels,
            active: 0,
        }
    }
}

impl eframe::App for CasegridApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        // Completions are applied on the UI thread, for every table
        for panel in &mut self.panels {
            panel.driver.pump();
        }

        egui::TopBottomPanel::top("tabs").show(ctx, |ui| {
            ui.horizontal(|ui| {
                for (idx, panel) in self.panels.iter().enumerate() {
                    let loading = panel.driver.controller().is_loading();
                    let label = if loading {
                        format!("{} …", panel.title())
                    } else {
                        panel.title()
                    };
                    ui.selectable_value(&mut self.active, idx, label);
                }
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some(panel) = self.panels.get_mut(self.active) {
                ScrollArea::vertical()
                    .id_source(WidgetId::new(&panel.name).with("scroll").build())
                    .show(ui, |ui| panel.show(ui));
            }
        });
    }
}

/// Initial variables used by both demo tables
pub fn newest_first() -> InitialVariables {
    InitialVariables::new().with_sort("createdAt", SortDirection::Desc)
}

/// File name for an exported page, numbered from 1
fn export_path(table: &str, pagination: &PaginationState) -> PathBuf {
    PathBuf::from(format!("{}-page-{}.csv", table, pagination.page_index() + 1))
}
