use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tablebuilder::config::validate_table_id;
use tablebuilder::{ApiClient, Config, WorkbookComposer};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "tablebuilder", about = "Export SingStat TableBuilder tables to a workbook")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch every configured table and write one workbook.
    Compose {
        /// YAML config; the built-in DOS table set is used when omitted.
        #[arg(long)]
        config: Option<PathBuf>,
        /// Override the output path from the config.
        #[arg(long)]
        output: Option<PathBuf>,
        /// Override the API root from the config.
        #[arg(long)]
        base_url: Option<String>,
    },
    /// Fetch one table and print its sheet as tab-separated text.
    Show {
        table_id: String,
        #[arg(long, default_value = tablebuilder::fetch::DEFAULT_BASE_URL)]
        base_url: String,
    },
}

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Compose {
            config,
            output,
            base_url,
        } => {
            // ─── 2) load config ──────────────────────────────────────
            let mut cfg = match config {
                Some(path) => Config::from_path(&path)?,
                None => Config::builtin()?,
            };
            if let Some(output) = output {
                cfg.output = output;
            }
            if let Some(base_url) = base_url {
                cfg.base_url = base_url;
            }
            info!(tables = cfg.tables.len(), output = %cfg.output.display(), "startup");

            // ─── 3) fetch, assemble, format, write ───────────────────
            let api = ApiClient::new(&cfg.base_url)
                .with_context(|| format!("building client for {}", cfg.base_url))?;
            let summary = WorkbookComposer::new(&api).compose(&cfg.tables, &cfg.output)?;
            info!(
                written = summary.written.len(),
                skipped = summary.skipped.len(),
                "all done"
            );
            for skipped in &summary.skipped {
                eprintln!("skipped {}: {}", skipped.table_id, skipped.reason);
            }
        }
        Command::Show { table_id, base_url } => {
            validate_table_id(&table_id)?;
            let api = ApiClient::new(&base_url)
                .with_context(|| format!("building client for {}", base_url))?;
            let sheet = WorkbookComposer::new(&api)
                .sheet_for(&table_id)
                .with_context(|| format!("building sheet for table {}", table_id))?;
            print!("{}", sheet.to_tsv());
        }
    }
    Ok(())
}
