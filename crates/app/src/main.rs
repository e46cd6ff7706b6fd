use std::fmt;

use progress_core::ProgressSummary;
use progress_core::model::{DisplayNode, DisplayTree, ProgressStatus, StatusAction};
use services::progress_store::DEFAULT_SLOT;
use services::{AppServices, ProgressService, ProgressStoreConfig};
use tracing_subscriber::EnvFilter;

const BUNDLED_CATALOG: &str = include_str!("../catalog/mathematics.json");

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    UnknownCommand(String),
    InvalidDbUrl { raw: String },
    InvalidSlot { raw: String },
    InvalidStatus { raw: String },
    WrongArity { command: &'static str, expected: usize },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::UnknownCommand(cmd) => write!(f, "unknown subcommand: {cmd}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidSlot { raw } => write!(f, "invalid --slot value: {raw:?}"),
            ArgsError::InvalidStatus { raw } => write!(
                f,
                "invalid status: {raw} (expected not-started, in-progress or completed)"
            ),
            ArgsError::WrongArity { command, expected } => {
                write!(f, "{command} expects {expected} argument(s)")
            }
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- [command] [args] [options]");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  show                      Print the topic tree with statuses (default)");
    eprintln!("  summary                   Print module and topic counts");
    eprintln!("  set <id> <status>         Set a topic to not-started, in-progress or completed");
    eprintln!("  start <id>                Mark a not-started topic as in progress");
    eprintln!("  complete <id>             Mark an in-progress topic as completed");
    eprintln!("  reset <id>                Mark a topic as not started");
    eprintln!("  prune                     Rewrite stored progress, dropping unknown topics");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <sqlite_url>         SQLite URL (default: sqlite://progress.sqlite3)");
    eprintln!("  --slot <key>              Storage slot (default: {DEFAULT_SLOT})");
    eprintln!("  --catalog <path.json>     Catalog file (default: bundled mathematics catalog)");
    eprintln!("  -h, --help                Show this help");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  PROGRESS_DB_URL, PROGRESS_SLOT, PROGRESS_CATALOG, RUST_LOG");
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Show,
    Summary,
    Set { id: String, status: ProgressStatus },
    Action { id: String, action: StatusAction },
    Prune,
}

impl Command {
    fn parse(name: &str, positionals: Vec<String>) -> Result<Self, ArgsError> {
        fn exactly<const N: usize>(
            command: &'static str,
            positionals: Vec<String>,
        ) -> Result<[String; N], ArgsError> {
            positionals
                .try_into()
                .map_err(|_| ArgsError::WrongArity {
                    command,
                    expected: N,
                })
        }

        match name {
            "show" => exactly::<0>("show", positionals).map(|_| Self::Show),
            "summary" => exactly::<0>("summary", positionals).map(|_| Self::Summary),
            "prune" => exactly::<0>("prune", positionals).map(|_| Self::Prune),
            "set" => {
                let [id, raw] = exactly::<2>("set", positionals)?;
                let status = raw
                    .parse()
                    .map_err(|_| ArgsError::InvalidStatus { raw: raw.clone() })?;
                Ok(Self::Set { id, status })
            }
            "start" | "complete" | "reset" => {
                let action = match name {
                    "start" => StatusAction::Start,
                    "complete" => StatusAction::Complete,
                    _ => StatusAction::Reset,
                };
                let [id] = exactly::<1>("start|complete|reset", positionals)?;
                Ok(Self::Action { id, action })
            }
            other => Err(ArgsError::UnknownCommand(other.to_string())),
        }
    }
}

struct Args {
    command: Command,
    db_url: String,
    slot: String,
    catalog_path: Option<String>,
}

impl Args {
    fn parse(argv: impl IntoIterator<Item = String>) -> Result<Option<Self>, ArgsError> {
        let mut db_url = std::env::var("PROGRESS_DB_URL")
            .ok()
            .map_or_else(|| "sqlite://progress.sqlite3".into(), normalize_sqlite_url);
        let mut slot = std::env::var("PROGRESS_SLOT").unwrap_or_else(|_| DEFAULT_SLOT.into());
        let mut catalog_path = std::env::var("PROGRESS_CATALOG").ok();
        let mut positionals = Vec::new();

        let mut args = argv.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--slot" => {
                    slot = require_value(&mut args, "--slot")?;
                }
                "--catalog" => {
                    catalog_path = Some(require_value(&mut args, "--catalog")?);
                }
                "--help" | "-h" => return Ok(None),
                flag if flag.starts_with("--") => return Err(ArgsError::UnknownArg(arg)),
                _ => positionals.push(arg),
            }
        }

        if slot.trim().is_empty() {
            return Err(ArgsError::InvalidSlot { raw: slot });
        }

        let command = if positionals.is_empty() {
            Command::Show
        } else {
            let name = positionals.remove(0);
            Command::parse(&name, positionals)?
        };

        Ok(Some(Self {
            command,
            db_url,
            slot,
            catalog_path,
        }))
    }
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

fn status_marker(status: ProgressStatus) -> &'static str {
    match status {
        ProgressStatus::NotStarted => "[ ]",
        ProgressStatus::InProgress => "[~]",
        ProgressStatus::Completed => "[x]",
    }
}

fn print_tree(tree: &DisplayTree) {
    fn print_nodes(nodes: &[DisplayNode], depth: usize) {
        for node in nodes {
            println!(
                "{:indent$}{} {} ({})",
                "",
                status_marker(node.status()),
                node.title(),
                node.id(),
                indent = depth * 2
            );
            print_nodes(node.children(), depth + 1);
        }
    }
    print_nodes(tree.roots(), 0);
}

fn print_summary(label: &str, summary: &ProgressSummary) {
    println!(
        "{label}: {}% complete ({} completed, {} in progress, {} not started, {} total)",
        summary.percent_complete(),
        summary.completed,
        summary.in_progress,
        summary.not_started,
        summary.total
    );
}

async fn execute(
    service: &mut ProgressService,
    command: Command,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Command::Show => {
            if let Some(tree) = service.tree() {
                print_tree(tree);
            }
            println!();
            print_summary("Modules", &service.module_summary()?);
        }
        Command::Summary => {
            print_summary("Modules", &service.module_summary()?);
            print_summary("Topics", &service.tree_summary()?);
        }
        Command::Set { id, status } => {
            let previous = service.set_status(&id, status).await?;
            println!("{id}: {previous} -> {status}");
        }
        Command::Action { id, action } => {
            let next = service.apply_action(&id, action).await?;
            println!("{id}: {next}");
        }
        Command::Prune => {
            service.flush().await?;
            println!("Rewrote stored progress from the current catalog");
        }
    }
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let Some(args) = Args::parse(std::env::args().skip(1)).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?
    else {
        print_usage();
        return Ok(());
    };

    let catalog_json = match &args.catalog_path {
        Some(path) => std::fs::read_to_string(path)?,
        None => BUNDLED_CATALOG.to_owned(),
    };

    // Open + migrate SQLite at startup. Keep this in the binary glue so core/services stay pure.
    prepare_sqlite_file(&args.db_url)?;
    let app = AppServices::new_sqlite(
        &args.db_url,
        &catalog_json,
        ProgressStoreConfig { slot: args.slot },
    )
    .await?;

    let mut service = app.progress_service();
    service.start().await;
    execute(&mut service, args.command).await
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
