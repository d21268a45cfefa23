use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::info;
use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use dqv::catalog::Catalog;
use dqv::controller::Controller;
use dqv::domain::{AppConfig, DqvError};
use dqv::model::{Model, Status};
use dqv::report;
use dqv::ui::TableUI;

#[derive(Parser, Debug)]
#[command(name = "dqv", version, about = "Compare raw and cleaned datasets in the terminal.")]
struct Args {
    /// Dataset catalog (JSON). Falls back to the built-in catalog.
    catalog: Option<String>,

    /// Dataset key to open at startup.
    #[arg(long)]
    dataset: Option<String>,

    /// Write a summary report over all catalog datasets and exit.
    #[arg(long, value_name = "FILE")]
    report: Option<String>,
}

fn main() -> ExitCode {
    match run() {
        Err(e) => {
            eprintln!("Error: {:?}", e);
            ExitCode::FAILURE
        }
        Ok(_) => ExitCode::SUCCESS,
    }
}

fn run() -> Result<(), DqvError> {
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(ErrorLayer::default())
        .init();

    let args = Args::parse();

    let catalog = match args.catalog.as_deref() {
        Some(path) => Catalog::from_file(&expand_path(path)?)?,
        None => Catalog::default_catalog(),
    };

    if let Some(path) = args.report.as_deref() {
        let path = expand_path(path)?;
        report::write_report(&catalog, &path)?;
        println!("Report written to {}", path.display());
        return Ok(());
    }

    let cfg = AppConfig::default().with_event_poll_time(100);
    let mut model = Model::init(&cfg, catalog);
    match args.dataset.as_deref() {
        Some(key) => model.select_dataset_by_key(key)?,
        None => model.select_dataset(0),
    }

    let ui = TableUI::new(&cfg);
    let controller = Controller::new(&cfg);

    info!("Starting dqv!");
    let mut terminal = ratatui::init();
    let result = event_loop(&mut terminal, &mut model, &controller, &ui);
    ratatui::restore();
    result
}

fn event_loop(
    terminal: &mut ratatui::DefaultTerminal,
    model: &mut Model,
    controller: &Controller,
    ui: &TableUI,
) -> Result<(), DqvError> {
    while model.status != Status::QUITTING {
        // Render the current view
        terminal.draw(|f| ui.draw(model, f))?;

        // Handle events and map to a Message
        if let Some(message) = controller.handle_event(model)? {
            model.update(message)?;
        }

        // Pick up finished dataset loads
        model.poll_loader()?;
    }
    Ok(())
}

fn expand_path(path: &str) -> Result<PathBuf, DqvError> {
    let expanded = shellexpand::full(path)
        .map_err(|e| DqvError::CatalogError(format!("Cannot expand \"{path}\": {e}")))?;
    Ok(PathBuf::from(expanded.as_ref()))
}
