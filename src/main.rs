use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use futures::StreamExt;
use jira_tables::config::Config;
use jira_tables::jira::JiraClient;
use jira_tables::table::{self, QueryContext};
use jira_tables::ConnectorError;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Version injected at compile time via JIRA_TABLES_VERSION env var (set by CI/CD),
/// or "dev" for local builds.
pub const VERSION: &str = match option_env!("JIRA_TABLES_VERSION") {
    Some(v) => v,
    None => "dev",
};

/// Query Jira users, boards and projects as tables
#[derive(Parser, Debug)]
#[command(name = "jira-tables", version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    connection: ConnectionArgs,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug, Default)]
struct ConnectionArgs {
    /// Config file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Jira site URL
    #[arg(long, global = true)]
    url: Option<String>,

    /// Account email or username
    #[arg(long, global = true)]
    username: Option<String>,

    /// API token
    #[arg(long, global = true)]
    token: Option<String>,

    /// Personal access token (Jira Server / Data Center)
    #[arg(long, global = true)]
    personal_access_token: Option<String>,

    /// Items requested per page
    #[arg(long, global = true)]
    page_size: Option<usize>,

    /// Concurrent hydrate calls
    #[arg(long, global = true)]
    max_concurrency: Option<usize>,

    /// HTTP timeout in seconds
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,
}

impl ConnectionArgs {
    fn as_config(&self) -> Config {
        Config {
            base_url: self.url.clone(),
            username: self.username.clone(),
            token: self.token.clone(),
            personal_access_token: self.personal_access_token.clone(),
            page_size: self.page_size,
            max_concurrency: self.max_concurrency,
            timeout_secs: self.timeout_secs,
        }
    }

    fn config_path(&self) -> Option<PathBuf> {
        self.config.clone().or_else(Config::default_path)
    }

    /// Effective configuration (flags > environment > file)
    fn effective_config(&self) -> Config {
        let file = match self.config_path() {
            Some(path) => Config::load_from(&path),
            None => Config::default(),
        };
        file.with_env().merge(self.as_config())
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List available tables
    Tables,
    /// Show the columns of a table
    Describe {
        table: String,
    },
    /// Stream the rows of a table as JSON lines
    Query {
        table: String,
        /// Stop after this many rows
        #[arg(short, long)]
        limit: Option<u64>,
        /// Comma-separated columns to return
        #[arg(short, long, value_delimiter = ',')]
        columns: Vec<String>,
    },
    /// Fetch one row by key
    Get {
        table: String,
        key: String,
        /// Comma-separated columns to return
        #[arg(short, long, value_delimiter = ',')]
        columns: Vec<String>,
    },
    /// Write connection flags to the config file
    Configure,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

fn setup_logging(level: LogLevel) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let Some(tracing_level) = level.to_tracing_level() else {
        return Ok(None);
    };

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {:?}", log_path))?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("jira-tables {} started with log level: {:?}", VERSION, level);
    tracing::info!("Log file: {:?}", log_path);

    Ok(Some(guard))
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("jira-tables").join("jira-tables.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".jira-tables").join("jira-tables.log");
    }
    PathBuf::from("jira-tables.log")
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match setup_logging(cli.log_level) {
        Ok(_log_guard) => run(cli).await,
        Err(err) => Err(err),
    };

    if let Err(err) = result {
        match err.downcast_ref::<ConnectorError>() {
            Some(connector_err) => eprintln!("Error: {}", connector_err.hint()),
            None => eprintln!("Error: {err:?}"),
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    match &cli.command {
        Command::Tables => list_tables(),
        Command::Describe { table } => describe_table(table),
        Command::Configure => configure(&cli.connection),
        Command::Query {
            table,
            limit,
            columns,
        } => {
            let client = connect(&cli.connection)?;
            let ctx = QueryContext::default()
                .with_limit(*limit)
                .with_columns(columns.clone());
            query_table(&client, table, &ctx).await
        }
        Command::Get {
            table,
            key,
            columns,
        } => {
            let client = connect(&cli.connection)?;
            if let Some(row) = table::get_row(&client, table, key, columns).await? {
                println!("{}", serde_json::to_string(&row)?);
            }
            Ok(())
        }
    }
}

fn connect(args: &ConnectionArgs) -> Result<JiraClient> {
    let settings = args.effective_config().connection_settings()?;
    Ok(JiraClient::connect(&settings)?)
}

fn list_tables() -> Result<()> {
    let mut out = io::stdout().lock();
    for table in table::all_tables() {
        writeln!(out, "{:<16} {}", table.name, table.description)?;
    }
    Ok(())
}

fn describe_table(name: &str) -> Result<()> {
    let table =
        table::get_table(name).ok_or_else(|| ConnectorError::UnknownTable(name.to_string()))?;

    let mut out = io::stdout().lock();
    writeln!(out, "{} - {}", table.name, table.description)?;
    if let Some(key) = &table.get_key {
        writeln!(out, "get key: {}", key)?;
    }
    for column in &table.columns {
        let hydrate = column.hydrate.map(|h| h.as_str()).unwrap_or("-");
        writeln!(
            out,
            "  {:<20} {:<7} {:<20} {}",
            column.name,
            format!("{:?}", column.column_type).to_lowercase(),
            hydrate,
            column.description
        )?;
    }
    Ok(())
}

async fn query_table(client: &JiraClient, name: &str, ctx: &QueryContext) -> Result<()> {
    let mut rows = table::scan_table(client, name, ctx)?;
    let mut out = io::stdout().lock();
    let mut emitted = 0u64;
    let mut failed = 0u64;

    while let Some(row) = rows.next().await {
        match row {
            Ok(row) => {
                writeln!(out, "{}", serde_json::to_string(&row)?)?;
                emitted += 1;
            }
            Err(err) => {
                eprintln!("Error: {}", err.hint());
                failed += 1;
            }
        }
    }

    tracing::info!("{}: {} rows, {} failed", name, emitted, failed);
    if failed > 0 {
        anyhow::bail!("{} of {} rows failed", failed, emitted + failed);
    }
    Ok(())
}

fn configure(args: &ConnectionArgs) -> Result<()> {
    let path = args
        .config_path()
        .context("No config directory available. Use --config")?;
    let config = Config::load_from(&path).merge(args.as_config());
    config.save_to(&path)?;
    println!("Saved {:?}", path);
    Ok(())
}
