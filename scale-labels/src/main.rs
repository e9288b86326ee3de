//! scale-labels - manage store scales and print their labels.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use scale_labels::{
    Config, LabelRecord, PrintDispatcher, PrintProgress, PrinterAddress, Scale, ScaleStorage,
    init_logger_with_file,
};

/// Scale label station for retail stores.
#[derive(Parser, Debug)]
#[command(name = "scale-labels")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Database file (overrides SCALE_DB_PATH)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Manage stores
    Stores {
        #[command(subcommand)]
        action: StoreAction,
    },
    /// List departments
    Departments,
    /// Manage the scales of a store
    Scales {
        #[command(subcommand)]
        action: ScaleAction,
    },
    /// Print a label document to stdout without sending it
    Render(RenderArgs),
    /// Print labels for the selected scales of a store
    Print(PrintArgs),
    /// Check whether the printer accepts connections
    Status {
        /// Printer address (host or host:port)
        #[arg(short, long)]
        printer: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
enum StoreAction {
    /// List stores
    List,
    /// Create a store
    Create { name: String },
}

#[derive(Subcommand, Debug)]
enum ScaleAction {
    /// List the scales of a store
    List {
        #[arg(short, long)]
        store: String,
    },
    /// Add or update a scale
    Save {
        #[arg(short, long)]
        store: String,
        #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
        number: u32,
        #[arg(short, long)]
        department: String,
        /// QR code content, "\n" separated lines allowed
        #[arg(short, long)]
        payload: Option<String>,
    },
    /// Delete a scale
    Delete {
        #[arg(short, long)]
        store: String,
        #[arg(short, long)]
        number: u32,
    },
    /// Delete every scale of a store
    Clear {
        #[arg(short, long)]
        store: String,
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Args, Debug)]
struct RenderArgs {
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
    number: u32,
    #[arg(short, long)]
    department: String,
    #[arg(short, long)]
    payload: Option<String>,
    #[arg(short, long, default_value = "1", value_parser = clap::value_parser!(u32).range(1..))]
    copies: u32,
}

#[derive(Args, Debug)]
struct PrintArgs {
    #[arg(short, long)]
    store: String,

    /// Printer address (overrides PRINTER_ADDR)
    #[arg(short, long)]
    printer: Option<String>,

    /// Copies per label (overrides PRINT_COPIES)
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
    copies: Option<u32>,

    /// Print every scale of the store
    #[arg(long, conflicts_with = "scale")]
    all: bool,

    /// Scale numbers to print
    #[arg(long = "scale", num_args = 1.., required_unless_present = "all")]
    scale: Vec<u32>,

    /// Output the batch result as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    let mut config = Config::from_env();
    if let Some(db) = cli.db.clone() {
        config.db_path = db;
    }

    let level = if cli.verbose {
        "debug"
    } else {
        config.log_level.as_str()
    };
    init_logger_with_file(Some(level), config.log_dir.as_deref());

    match cli.command {
        Command::Render(args) => render(args),
        Command::Status { printer } => status(&config, printer.as_deref()).await,
        Command::Print(args) => {
            let storage = open_storage(&config)?;
            print(&config, &storage, args).await
        }
        Command::Stores { action } => {
            let storage = open_storage(&config)?;
            stores(&storage, action)
        }
        Command::Departments => {
            let storage = open_storage(&config)?;
            for name in storage.list_departments()? {
                println!("{}", name);
            }
            Ok(())
        }
        Command::Scales { action } => {
            let storage = open_storage(&config)?;
            scales(&storage, action)
        }
    }
}

fn open_storage(config: &Config) -> Result<ScaleStorage> {
    ScaleStorage::open(&config.db_path)
        .with_context(|| format!("Failed to open {}", config.db_path.display()))
}

fn stores(storage: &ScaleStorage, action: StoreAction) -> Result<()> {
    match action {
        StoreAction::List => {
            for store in storage.list_stores()? {
                println!("{}", store.name);
            }
        }
        StoreAction::Create { name } => {
            let store = storage.create_store(&name)?;
            info!(store = %store.name, "Store created");
        }
    }
    Ok(())
}

fn scales(storage: &ScaleStorage, action: ScaleAction) -> Result<()> {
    match action {
        ScaleAction::List { store } => {
            for scale in storage.list_scales(&store)? {
                println!(
                    "{:>4}  {:<14}  {}",
                    scale.number,
                    scale.department_name,
                    scale.payload.as_deref().unwrap_or("").replace('\n', " | ")
                );
            }
        }
        ScaleAction::Save {
            store,
            number,
            department,
            payload,
        } => {
            if !storage.list_departments()?.contains(&department) {
                warn!(department = %department, "Department is not in the department list");
            }
            // Shell arguments carry line breaks as a literal "\n"
            let payload = payload.map(|p| p.replace("\\n", "\n"));
            storage.save_scale(&Scale::new(store, number, department, payload))?;
            info!(number, "Scale saved");
        }
        ScaleAction::Delete { store, number } => {
            if storage.delete_scale(&store, number)? {
                info!(number, "Scale deleted");
            } else {
                warn!(number, "Scale not found");
            }
        }
        ScaleAction::Clear { store, yes } => {
            if !yes {
                bail!("Refusing to delete every scale of {} without --yes", store);
            }
            let deleted = storage.clear_store(&store)?;
            info!(deleted, "Store cleared");
        }
    }
    Ok(())
}

fn render(args: RenderArgs) -> Result<()> {
    let payload = args.payload.map(|p| p.replace("\\n", "\n"));
    let record = LabelRecord::new(args.number, args.department, args.copies, payload)?;
    let document = PrintDispatcher::new().renderer().render(&record);
    println!("{}", document);
    Ok(())
}

async fn status(config: &Config, printer: Option<&str>) -> Result<()> {
    let address = printer_address(config, printer)?;
    if PrintDispatcher::from_config(config).is_online(&address).await {
        println!("{} online", address);
        Ok(())
    } else {
        bail!("{} offline", address)
    }
}

async fn print(config: &Config, storage: &ScaleStorage, args: PrintArgs) -> Result<()> {
    // Validate everything before the first connection
    let address = printer_address(config, args.printer.as_deref())?;
    let copies = args.copies.unwrap_or(config.print_copies);

    let scales = storage.list_scales(&args.store)?;
    let selected: Vec<Scale> = if args.all {
        scales
    } else {
        let mut selected = Vec::with_capacity(args.scale.len());
        for number in &args.scale {
            match scales.iter().find(|s| s.number == *number) {
                Some(scale) => selected.push(scale.clone()),
                None => bail!("Scale {} not found in store {}", number, args.store),
            }
        }
        selected
    };

    if selected.is_empty() {
        bail!("Store {} has no scales", args.store);
    }

    let records = selected
        .iter()
        .map(|s| s.to_label_record(copies))
        .collect::<Result<Vec<_>, _>>()?;

    info!(
        store = %args.store,
        printer = %address,
        labels = records.len(),
        copies,
        "Printing labels"
    );

    // Ctrl-C stops the batch between labels
    let cancel = CancellationToken::new();
    let watcher = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted, stopping after the current label");
                cancel.cancel();
            }
        })
    };

    let (tx, rx) = mpsc::unbounded_channel();
    let reporter = tokio::spawn(report_progress(rx));

    let result = PrintDispatcher::from_config(config)
        .send_batch_with_progress(|_| address.clone(), &records, copies, Some(tx), &cancel)
        .await;

    watcher.abort();
    let _ = reporter.await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!(
            "Sent {}/{} labels, {} failed",
            result.succeeded, result.total, result.failed
        );
        for failure in result.failures() {
            println!("  scale {}: {}", failure.scale_number, failure.message);
        }
    }

    if result.failed > 0 {
        bail!("{} of {} labels failed", result.failed, result.total);
    }
    Ok(())
}

async fn report_progress(mut rx: mpsc::UnboundedReceiver<PrintProgress>) {
    while let Some(progress) = rx.recv().await {
        let outcome = &progress.outcome;
        if outcome.success {
            info!(
                "[{}/{}] scale {} ({}) sent",
                progress.completed, progress.total, outcome.scale_number, outcome.department_name
            );
        } else {
            warn!(
                "[{}/{}] scale {} ({}) failed: {}",
                progress.completed,
                progress.total,
                outcome.scale_number,
                outcome.department_name,
                outcome.message
            );
        }
    }
}

fn printer_address(config: &Config, printer: Option<&str>) -> Result<PrinterAddress> {
    let address = match printer {
        Some(p) => PrinterAddress::parse(p),
        None => config.printer_address(),
    };
    address.context("Invalid printer address")
}
