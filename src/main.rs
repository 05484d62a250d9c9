use std::io;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};

use gridedit::config::{parse_history_limit, EngineConfig};
use gridedit::infra::sqlite::gateway::SqliteGateway;
use gridedit::usecase::services::import_service::ImportService;
use gridedit::{logging, FileId, GridViewer, HistoryCapacity, SupersedePolicy};

mod repl;

#[derive(Debug, Parser)]
#[command(name = "gridedit", about = "Review and lightly edit imported spreadsheet data")]
struct Args {
    /// SQLite dataset store (defaults to the local data directory)
    #[arg(long)]
    db: Option<PathBuf>,

    /// Rows per displayed page
    #[arg(long)]
    page_size: Option<NonZeroUsize>,

    /// Maximum undo snapshots kept; 0 keeps everything
    #[arg(long, value_parser = parse_history_limit)]
    history_limit: Option<HistoryCapacity>,

    /// What starting a new edit does to an unfinished one: commit or cancel
    #[arg(long)]
    supersede: Option<SupersedePolicy>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Import a CSV or XLSX file as one dataset per sheet
    Import {
        path: PathBuf,
        /// Workbook sheet to import; repeat for several, omit for all
        #[arg(long = "sheet")]
        sheets: Vec<String>,
    },
    /// List stored datasets
    List,
    /// Open a dataset in the interactive editor
    Open { id: i64 },
}

fn build_config(args: &Args) -> Result<EngineConfig> {
    let mut config = EngineConfig::load()?;
    if let Some(db) = &args.db {
        config.db_path = db.clone();
    }
    if let Some(page_size) = args.page_size {
        config.page_size = page_size;
    }
    if let Some(history) = args.history_limit {
        config.history = history;
    }
    if let Some(supersede) = args.supersede {
        config.supersede = supersede;
    }
    Ok(config)
}

fn main() -> Result<()> {
    logging::init();
    let args = Args::parse();
    let config = build_config(&args)?;

    match args.command {
        Command::Import { path, sheets } => {
            let service = ImportService::new(config.db_path.clone());
            let imported = service.import_file(&path, &sheets)?;
            for item in imported {
                println!(
                    "imported {} as {} ({} rows)",
                    item.name, item.dataset_id, item.row_count
                );
            }
        }
        Command::List => {
            let service = ImportService::new(config.db_path.clone());
            for dataset in service.list_datasets()? {
                println!(
                    "{:>6}  {:<30}  {:>8} rows  {}",
                    dataset.id.to_string(),
                    dataset.name,
                    dataset.row_count,
                    dataset.source_path
                );
            }
        }
        Command::Open { id } => {
            let gateway = SqliteGateway::new(config.db_path.clone());
            gateway.init()?;
            let mut viewer = GridViewer::open(Arc::new(gateway), FileId(id), &config)?;
            let stdin = io::stdin();
            let stdout = io::stdout();
            repl::run(&mut viewer, stdin.lock(), stdout.lock())?;
        }
    }

    Ok(())
}
