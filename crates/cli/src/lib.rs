use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pdf_clip_core::{SelectionRect, Session, ViewerConfig};
use pdf_clip_engine::{engine_for, EngineBackend, PdfEngine};
use serde::Serialize;
use simplelog::{ColorChoice, TermLogger, TerminalMode};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Parser)]
#[command(name = "pdf-clip-cli")]
#[command(about = "Extract text from a fixed region of every PDF page")]
pub struct Cli {
    /// Engine override; defaults to PDF_CLIP_BACKEND or auto.
    #[arg(long, global = true)]
    backend: Option<EngineBackend>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print machine-readable PDF metadata.
    Info {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Extract the text inside a rectangle from every page.
    Extract {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// Corners in points from the top-left of the page: X0,Y0,X1,Y1.
        #[arg(long, value_parser = parse_rect)]
        rect: SelectionRect,
        /// Keep only pages containing this text (case-insensitive).
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Render one page to a PNG file.
    Render {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long)]
        scale: Option<f32>,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print CLI version.
    Version,
}

#[derive(Debug, Serialize)]
struct InfoOutput {
    path: String,
    page_count: u32,
    first_page_size_pt: Option<PageSizeOutput>,
}

#[derive(Debug, Serialize)]
struct PageSizeOutput {
    width: f32,
    height: f32,
}

#[derive(Debug, Serialize)]
struct ExtractOutput<'a> {
    path: String,
    pages: Vec<PageTextOutput<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    matches: Option<usize>,
}

#[derive(Debug, Serialize)]
struct PageTextOutput<'a> {
    page: u32,
    text: &'a str,
}

pub fn run<I, T>(args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::parse_from(args);

    let mut config = ViewerConfig::from_env().context("invalid environment configuration")?;
    if let Some(backend) = cli.backend {
        config = config.with_backend(backend);
    }
    init_logging(&config);

    match cli.command {
        Commands::Info { file } => run_info(&config, &file),
        Commands::Extract { file, rect, search, json } => {
            run_extract(&config, &file, rect, search.as_deref(), json)
        }
        Commands::Render { file, page, scale, output } => {
            let config = match scale {
                Some(scale) => config.with_render_scale(scale),
                None => config,
            };
            run_render(&config, &file, page, output.as_deref())
        }
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn init_logging(config: &ViewerConfig) {
    // A logger may already be installed when `run` is called more than once in-process.
    let _ = TermLogger::init(
        config.log_level,
        simplelog::Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    );
}

fn open_session(config: &ViewerConfig, file: &Path) -> Result<Session<Box<dyn PdfEngine>>> {
    ensure_pdf_exists(file)?;

    let engine = engine_for(config.backend).context("failed to start PDF engine")?;
    let mut session = Session::new(engine).with_render_scale(config.render_scale);
    session.load(file).context("failed to open PDF")?;
    Ok(session)
}

fn run_info(config: &ViewerConfig, file: &Path) -> Result<()> {
    let session = open_session(config, file)?;

    let page_count = session.page_count()?;
    let first_page_size_pt = if page_count > 0 {
        let size = session.current_page_size()?;
        Some(PageSizeOutput { width: size.width_pt, height: size.height_pt })
    } else {
        None
    };

    let payload = InfoOutput { path: file.display().to_string(), page_count, first_page_size_pt };

    let json = serde_json::to_string_pretty(&payload)?;
    println!("{json}");

    Ok(())
}

fn run_extract(
    config: &ViewerConfig,
    file: &Path,
    rect: SelectionRect,
    search: Option<&str>,
    json: bool,
) -> Result<()> {
    // The rectangle is given in points, independent of the render scale.
    let mut session = open_session(&config.clone().with_render_scale(1.0), file)?;
    session.select(rect);
    session.extract()?;

    let summary = search.and_then(|query| session.search(query));

    if json {
        let pages = match search.filter(|query| !query.is_empty()) {
            Some(query) => pdf_clip_core::filter_pages(session.extracted(), query),
            None => session.extracted().iter().collect(),
        };
        let payload = ExtractOutput {
            path: file.display().to_string(),
            pages: pages.into_iter().map(|(page, text)| PageTextOutput { page, text }).collect(),
            matches: summary.map(|summary| summary.matches),
        };
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        print!("{}", session.view().text());
        if let Some(summary) = summary {
            log::info!("{} matches on {} pages", summary.matches, summary.pages);
        }
    }

    Ok(())
}

fn run_render(config: &ViewerConfig, file: &Path, page: u32, output: Option<&Path>) -> Result<()> {
    if page == 0 {
        anyhow::bail!("--page is 1-based and must be >= 1");
    }

    let mut session = open_session(config, file)?;
    session.go_to(i64::from(page))?;

    let image = session.render_current_page().context("failed to render page")?;

    let output = output.map(ToOwned::to_owned).unwrap_or_else(|| default_render_output(file, page));

    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent)?;
    }

    image
        .save(&output)
        .with_context(|| format!("failed to write image to {}", output.display()))?;

    println!("{}", output.display());

    Ok(())
}

fn parse_rect(value: &str) -> Result<SelectionRect, String> {
    let coords = value
        .split(',')
        .map(|part| part.trim().parse::<f32>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|err| format!("invalid coordinate in '{value}': {err}"))?;

    match coords.as_slice() {
        [x0, y0, x1, y1] => Ok(SelectionRect::new(*x0, *y0, *x1, *y1)),
        _ => Err(format!("expected X0,Y0,X1,Y1 but got '{value}'")),
    }
}

fn ensure_pdf_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        anyhow::bail!("file does not exist: {}", path.display());
    }

    if !path.is_file() {
        anyhow::bail!("path is not a file: {}", path.display());
    }

    Ok(())
}

fn default_render_output(file: &Path, page: u32) -> PathBuf {
    let stem = file.file_stem().and_then(|name| name.to_str()).unwrap_or("page");

    file.with_file_name(format!("{stem}-page-{page}.png"))
}
