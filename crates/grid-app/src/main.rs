//! Main application entry point

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context as _, Result};
use eframe::egui;
use grid_data::load_csv_records;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod app;
mod config;
mod demo;

use app::{newest_first, CasegridApp, PanelSpec};
use config::AppConfig;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => {
            info!(path = %path.display(), "Loading configuration");
            AppConfig::load(&path)?
        }
        None => AppConfig::default(),
    };

    let runtime = tokio::runtime::Runtime::new().context("Failed to start tokio runtime")?;

    let households = match &config.households_csv {
        Some(path) => runtime
            .block_on(load_csv_records(path))
            .with_context(|| format!("Failed to load households from {}", path.display()))?,
        None => demo::households(120),
    };
    let tickets = demo::tickets(57, households.len());
    info!(households = households.len(), tickets = tickets.len(), "Fixtures ready");

    let latency = Duration::from_millis(config.latency_ms);
    let specs = vec![
        PanelSpec {
            name: "households",
            config: config.households.clone(),
            columns: demo::household_columns(),
            filters: demo::household_filters(),
            initial: newest_first(),
            adapter: demo::households_adapter(households).with_latency(latency),
            render_row: demo::household_row,
        },
        PanelSpec {
            name: "tickets",
            config: config.tickets.clone(),
            columns: demo::ticket_columns(),
            filters: demo::ticket_filters(),
            initial: newest_first(),
            adapter: demo::tickets_adapter(tickets).with_latency(latency),
            render_row: demo::ticket_row,
        },
    ];

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([800.0, 600.0]),
        default_theme: eframe::Theme::Dark,
        persist_window: false,
        ..Default::default()
    };

    eframe::run_native(
        "Casegrid",
        options,
        Box::new(move |cc| Box::new(CasegridApp::new(cc, runtime, specs))),
    )
    .map_err(|e| anyhow::anyhow!("Failed to run app: {}", e))?;

    Ok(())
}
