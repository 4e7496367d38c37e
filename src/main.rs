use std::sync::Arc;

use anyhow::{anyhow, Context};
use eframe::egui;

use scancam::backend::{AnalysisBackend, HttpBackend};
use scancam::config::SettingsManager;
use scancam::log_collector::get_global_logs_path;
use scancam::ui::AppUI;
use scancam::{LogCollector, APP_TITLE};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // =========================================================================
    // SETTINGS - needed before logging to pick the level
    // =========================================================================
    let settings = SettingsManager::load();

    // =========================================================================
    // LOG COLLECTOR - DECOUPLED FROM UI
    // =========================================================================
    let log_dir = get_global_logs_path().map_err(|e| anyhow!(e))?;
    let log_collector = LogCollector::new(log_dir, settings.log_level())
        .map_err(|e| anyhow!(e))
        .context("LogCollector initialization failed")?;

    // Wire LogCollector as the global logger so every log::* macro reaches disk
    let max_level = settings.log_level();
    if let Err(e) = log::set_boxed_logger(Box::new(log_collector.clone()))
        .map(|()| log::set_max_level(max_level))
    {
        eprintln!("[Main] WARNING: Failed to set LogCollector as global logger: {}", e);
    }
    log::info!(
        "[Main] ScanCAM {} starting, log file {}",
        scancam::VERSION,
        log_collector.log_path().display()
    );

    // =========================================================================
    // BACKEND AND UI
    // =========================================================================
    let backend: Arc<dyn AnalysisBackend> = Arc::new(HttpBackend::new(settings.backend_url.clone()));
    log::info!("[Main] Analysis backend: {}", settings.backend_url);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(APP_TITLE)
            .with_inner_size([settings.window_width, settings.window_height]),
        ..Default::default()
    };

    let result = eframe::run_native(
        APP_TITLE,
        options,
        Box::new(move |cc| Box::new(AppUI::new(cc.egui_ctx.clone(), &settings, backend))),
    );

    // =========================================================================
    // SHUTDOWN
    // =========================================================================
    log::info!("[Main] Application shutting down");
    if let Err(e) = log_collector.wait_for_empty().await {
        eprintln!("[Main] WARNING: Failed to wait for log collector to empty: {}", e);
    }

    result.map_err(|e| anyhow!("eframe error: {}", e))
}
