use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};
use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod controller;
mod domain;
mod employee;
mod filter;
mod form;
mod inputter;
mod model;
mod roster;
mod source;
mod ui;

use controller::Controller;
use domain::{RosterConfig, RosterError};
use model::{Model, Status};
use source::{EmployeeSource, FileSource};
use ui::TableUI;

/// A terminal employee roster with filtering, sorting and pagination.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Employee file to load (csv, parquet or arrow). Starts empty without one.
    path: Option<String>,

    /// Number of employees per page
    #[arg(short = 'n', long, default_value_t = 10)]
    page_size: usize,

    /// Widest a table column is allowed to get
    #[arg(long, default_value_t = 24)]
    max_column_width: usize,

    /// Where to write logs, the terminal belongs to the ui
    #[arg(long, default_value = "roster.log")]
    log_file: String,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn expand(path: &str) -> Result<PathBuf, RosterError> {
    shellexpand::full(path)
        .map(|p| PathBuf::from(p.as_ref()))
        .map_err(|e| RosterError::InvalidPath(e.to_string()))
}

fn setup_logging(args: &Args) -> Result<(), RosterError> {
    let log_file = File::create(expand(&args.log_file)?)?;
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(Arc::new(log_file)).with_ansi(false))
        .with(ErrorLayer::default())
        .init();
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    if let Err(e) = setup_logging(&args) {
        eprintln!("Error: {e}");
        return ExitCode::FAILURE;
    }

    let result = run(&args);
    ratatui::restore();
    match result {
        Err(e) => {
            error!("Exiting with error: {e:?}");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
        Ok(_) => ExitCode::SUCCESS,
    }
}

fn run(args: &Args) -> Result<(), RosterError> {
    let cfg = RosterConfig::default()
        .with_page_size(args.page_size)
        .with_max_column_width(args.max_column_width);
    info!("Starting roster with {cfg:?}");

    let source = match &args.path {
        Some(path) => {
            let source: Arc<dyn EmployeeSource> = Arc::new(FileSource::new(expand(path)?));
            Some(source)
        }
        None => None,
    };

    let mut model = Model::init(&cfg, source);
    let ui = TableUI::new();
    let controller = Controller::new(&cfg);

    let mut terminal = ratatui::init();

    while model.status != Status::QUITTING {
        // Render the current view
        terminal.draw(|f| ui.draw(&model, f))?;

        // Handle events and map to a Message. A quiet tick still updates the
        // model so a finished fetch is picked up.
        let message = controller.handle_event(&model)?;
        model.update(message)?;
    }

    info!("Bye!");
    Ok(())
}
