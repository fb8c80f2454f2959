use std::fs::File;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::{error, info};
use simplelog::{Config, LevelFilter, WriteLogger};

use reportspool::settings::Settings;
use reportspool::spool::{print_report, DirRenderer, SpoolDir};

/// Print a pre-rendered report through the spool pipeline.
#[derive(Parser, Debug)]
#[command(name = "reportspool", version)]
struct Cli {
    /// Report path, resolved under the render root (e.g. /monthly/invoice)
    report: String,

    /// Printer name recorded with the job
    #[arg(long)]
    printer: Option<String>,

    /// Report parameters as name~value pairs joined with |
    #[arg(long, default_value = "")]
    parameters: String,

    /// Print in landscape orientation
    #[arg(long)]
    landscape: bool,

    /// Page size override: "Original", "Force 5.5 X 8.5" or "Force 8.5 X 11"
    #[arg(long)]
    page_size: Option<String>,

    /// Paper source (tray) index
    #[arg(long)]
    paper_source: Option<usize>,

    /// Directory of pre-rendered page streams
    #[arg(long)]
    render_root: Option<PathBuf>,

    /// Spool output directory
    #[arg(long)]
    spool_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load();

    WriteLogger::init(
        LevelFilter::Debug,
        Config::default(),
        File::create(&settings.log_file)
            .with_context(|| format!("creating log file {:?}", settings.log_file))?,
    )?;

    info!("Starting reportspool");

    let printer_name = cli
        .printer
        .or_else(|| {
            if settings.default_printer.is_empty() {
                None
            } else {
                Some(settings.default_printer.clone())
            }
        })
        .unwrap_or_default();
    if printer_name.is_empty() {
        bail!("no printer given; pass --printer or set default_printer in the config");
    }

    let page_size = cli
        .page_size
        .unwrap_or_else(|| settings.default_page_size.clone());
    let paper_source = cli.paper_source.unwrap_or(settings.paper_source_index);
    let render_root = cli.render_root.unwrap_or_else(|| settings.render_root.clone());
    let spool_dir = cli.spool_dir.unwrap_or_else(|| settings.spool_dir.clone());

    let mut renderer = DirRenderer::new(render_root);
    let mut printer = SpoolDir::create(&spool_dir)
        .with_context(|| format!("opening spool directory {:?}", spool_dir))?;

    let printed = print_report(
        &mut renderer,
        &mut printer,
        &printer_name,
        &cli.report,
        paper_source,
        &cli.parameters,
        cli.landscape,
        &page_size,
    );

    match printed {
        Ok(true) => {
            println!("Spooled {} to {}", cli.report, spool_dir.display());
            Ok(())
        }
        Ok(false) => {
            println!("{} produced no pages; nothing was printed", cli.report);
            Ok(())
        }
        Err(e) => {
            error!("Print failed: {e}");
            Err(e.into())
        }
    }
}
