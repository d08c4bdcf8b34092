//! pdf-clip desktop application.

mod app;
mod clipboard;
mod highlight;

use anyhow::{Context, Result};
use clap::Parser;
use eframe::egui;
use pdf_clip_core::{Session, ViewerConfig};
use pdf_clip_engine::{engine_for, EngineBackend};
use simplelog::{ColorChoice, TermLogger, TerminalMode};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "pdf-clip")]
#[command(about = "Draw a rectangle on a PDF page and extract that region from every page")]
struct Args {
    /// PDF to open on startup.
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,
    /// Engine override; defaults to PDF_CLIP_BACKEND or auto.
    #[arg(long)]
    backend: Option<EngineBackend>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = ViewerConfig::from_env().context("invalid environment configuration")?;
    if let Some(backend) = args.backend {
        config = config.with_backend(backend);
    }

    TermLogger::init(
        config.log_level,
        simplelog::Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )
    .context("failed to initialize logging")?;

    let engine = engine_for(config.backend).context("failed to start PDF engine")?;
    let session = Session::new(engine).with_render_scale(config.render_scale);
    let mut app = app::PdfClipApp::new(session);
    if let Some(path) = args.file {
        app.load_pdf(path);
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 850.0])
            .with_min_inner_size([800.0, 600.0])
            .with_title("PDF Clip"),
        ..Default::default()
    };

    log::info!("starting with {} backend", config.backend);
    eframe::run_native("PDF Clip", options, Box::new(move |_cc| Ok(Box::new(app))))
        .map_err(|err| anyhow::anyhow!("window loop failed: {err}"))
}
