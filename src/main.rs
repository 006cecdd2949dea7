mod app;
mod config;
mod console;
mod interpreter;
mod launcher;
mod line_editor;
mod submit;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use eframe::egui;
use std::path::PathBuf;

use crate::app::VinylCodeApp;
use crate::config::{Args, Config};
use crate::submit::FormSubmitter;

/// Logs go to ~/.vinylcode/vinylcode.log so they never land in the transcript.
fn init_logging() -> Result<()> {
    use tracing_subscriber::EnvFilter;

    let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
    let log_dir = PathBuf::from(&home).join(".vinylcode");
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("failed to create {}", log_dir.display()))?;
    let log_file = std::fs::File::create(log_dir.join("vinylcode.log"))
        .context("failed to create log file")?;

    let filter = EnvFilter::try_from_env("VINYLCODE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(log_file)
        .with_ansi(false)
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging()?;

    let config = Config::load(&args)?;
    if config.form_url.is_none() {
        tracing::warn!("VINYLCODE_FORM_URL is not set; submissions will fail");
    }
    tracing::info!(?config, console = args.console, "starting vinylcode");

    let runtime = tokio::runtime::Runtime::new().context("failed to start tokio runtime")?;
    // Submissions are spawned from the UI thread, so it must see the runtime.
    let _guard = runtime.enter();
    let submitter = FormSubmitter::new(&config).context("failed to build HTTP client")?;

    if args.console {
        return runtime.block_on(console::run(&config, submitter));
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([800.0, 600.0])
            .with_title("VinylCode CLI")
            .with_resizable(true),
        ..Default::default()
    };

    eframe::run_native(
        "VinylCode",
        options,
        Box::new(move |cc| {
            let mut visuals = egui::Visuals::dark();
            visuals.window_fill = egui::Color32::from_rgb(17, 24, 39);
            visuals.panel_fill = egui::Color32::from_rgb(17, 24, 39);
            cc.egui_ctx.set_visuals(visuals);

            Ok(Box::new(VinylCodeApp::new(&config, submitter)))
        }),
    )
    .map_err(|err| anyhow!("window failed: {err}"))
}
