use clap::{Parser, ValueEnum};
use color_eyre::Result;
use color_eyre::eyre::eyre;
use std::path::PathBuf;
use tracing::{debug, info};

use filterbox::config::{Config, get_config_dir};
use filterbox::core::ParameterTree;
use filterbox::services::QueryService;

/// Filter a list of JSON records the way an admin list page does
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Enable file logging at the given level (overrides RUST_LOG)
    #[arg(long = "logging", value_enum)]
    logging: Option<LogLevel>,
    /// Path to a config file (overrides default config discovery)
    #[arg(long = "config", value_name = "PATH")]
    config: Option<PathBuf>,
    /// Model whose fields can be filtered
    #[arg(long = "model", default_value = "player")]
    model: String,
    /// JSON file holding an array of records
    #[arg(long = "records", value_name = "PATH")]
    records: Option<PathBuf>,
    /// Submitted filter parameters, e.g. 'f[name][1][o]=like&f[name][1][v]=aa'
    #[arg(long = "query", default_value = "")]
    query: String,
    /// Output format
    #[arg(long = "format", value_enum, default_value_t = OutputFormat::Html)]
    format: OutputFormat,
    /// Write the default config file to the config dir and exit
    #[arg(long = "init-config")]
    init_config: bool,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum LogLevel { Error, Warn, Info, Debug, Trace }

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum OutputFormat {
    /// Filter box and result table markup
    Html,
    /// One line per filter row, then the record count
    Summary,
    /// Canonical parameters and matching records
    Json,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    let cwd = std::env::current_dir()?;
    let log_path = cwd.join("filterbox.log");
    let level = match args.logging {
        Some(LogLevel::Error) => Some(tracing::Level::ERROR),
        Some(LogLevel::Warn)  => Some(tracing::Level::WARN),
        Some(LogLevel::Info)  => Some(tracing::Level::INFO),
        Some(LogLevel::Debug) => Some(tracing::Level::DEBUG),
        Some(LogLevel::Trace) => Some(tracing::Level::TRACE),
        None => Some(tracing::Level::WARN),
    };
    filterbox::logging::init_with(Some(log_path), level)?;

    if args.init_config {
        let path = get_config_dir().join("config.json5");
        Config::write_default(&path)?;
        println!("{}", path.display());
        return Ok(());
    }

    let cfg = Config::from_path(args.config.as_ref())?;
    let model = cfg
        .model(&args.model)
        .ok_or_else(|| eyre!("No model named '{}' in config", args.model))?;
    let records_path = args
        .records
        .ok_or_else(|| eyre!("--records is required"))?;
    let service = QueryService::from_json_file(model, &records_path)?
        .with_settings(cfg.filters.clone())
        .with_columns(cfg.list_columns(&args.model));

    let params = ParameterTree::from_query(&args.query);
    debug!("Parsed {} filter rows from query", params.row_count());
    let page = service.refresh(&params);
    info!("Listing {} records", page.records.len());

    match args.format {
        OutputFormat::Html => println!("{}", page.render()),
        OutputFormat::Summary => {
            for line in page.filter_box.summary() {
                println!("{line}");
            }
            println!("{} of {} records", page.records.len(), service.records().len());
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "params": page.filter_box.build_query_params(),
                "query": page.filter_box.build_query_params().to_query(),
                "records": page.records,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }
    Ok(())
}
