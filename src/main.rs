use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colabfit_mcp::config::{
    default_config_path, find_config_file, load_config, write_default_config, LoggingConfig,
};
use colabfit_mcp::mcp::server::McpServer;
use colabfit_mcp::models::{
    DatasetFilters, DownloadOutcome, DownloadRequest, License, Pagination, PropertyType,
    QueryOutcome, QueryPage, SortBy, SortDirection, DEFAULT_PAGE, DEFAULT_PAGE_SIZE,
};
use colabfit_mcp::operations::{dataset_query, download_dataset};
use colabfit_mcp::sources::ColabFitSource;
use colabfit_mcp::utils::download_dir;
use serde_json::Value;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// ColabFit MCP - Query and download datasets from the ColabFit materials database
#[derive(Parser, Debug)]
#[command(name = "colabfit-mcp")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Query and download datasets from the ColabFit materials database", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging (can be used multiple times for more verbosity: -v, -vv)
    #[arg(long, short, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(long, short)]
    quiet: bool,

    /// Output format
    #[arg(long, short, value_enum, global = true, default_value_t = OutputFormat::Auto)]
    output: OutputFormat,

    /// Configuration file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Show all environment variables
    #[arg(long, global = true)]
    env: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Output format for results
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// Automatic based on terminal (table if TTY, JSON otherwise)
    Auto,
    /// Table format (human-readable)
    Table,
    /// JSON format (machine-readable)
    Json,
}

impl OutputFormat {
    fn resolve(self) -> Self {
        match self {
            OutputFormat::Auto if std::io::stdout().is_terminal() => OutputFormat::Table,
            OutputFormat::Auto => OutputFormat::Json,
            other => other,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Query datasets
    #[command(alias = "q")]
    Query {
        /// Dataset name
        #[arg(long)]
        name: Option<String>,

        /// Dataset authors
        #[arg(long)]
        authors: Option<String>,

        /// Dataset description
        #[arg(long)]
        description: Option<String>,

        /// Chemical elements (comma-separated or repeated)
        #[arg(long = "element", short, value_delimiter = ',')]
        elements: Vec<String>,

        /// Only match datasets containing exactly the given elements
        #[arg(long)]
        exact_elements: bool,

        /// Dataset DOI
        #[arg(long)]
        doi: Option<String>,

        /// Minimum number of configurations
        #[arg(long)]
        min_co: Option<u64>,

        /// Maximum number of configurations
        #[arg(long)]
        max_co: Option<u64>,

        /// Minimum number of distinct elements
        #[arg(long)]
        min_elements: Option<u64>,

        /// Maximum number of distinct elements
        #[arg(long)]
        max_elements: Option<u64>,

        /// Minimum number of atoms
        #[arg(long)]
        min_atoms: Option<u64>,

        /// Maximum number of atoms
        #[arg(long)]
        max_atoms: Option<u64>,

        /// Property types (comma-separated or repeated)
        #[arg(long = "property-type", value_delimiter = ',')]
        property_types: Vec<PropertyType>,

        /// Licenses (comma-separated or repeated)
        #[arg(long, value_delimiter = ',')]
        license: Vec<License>,

        /// Restrict to equilibrium (true) or non-equilibrium (false) datasets
        #[arg(long)]
        equilibrium: Option<bool>,

        /// Sort field
        #[arg(long)]
        sort_by: Option<SortBy>,

        /// Sort direction
        #[arg(long, default_value_t = SortDirection::Descending)]
        sort_direction: SortDirection,

        /// Software used to compute the data (comma-separated or repeated)
        #[arg(long, value_delimiter = ',')]
        software: Vec<String>,

        /// Computational methods (comma-separated or repeated)
        #[arg(long = "method", value_delimiter = ',')]
        methods: Vec<String>,

        /// Page number
        #[arg(long, short, default_value_t = DEFAULT_PAGE)]
        page: usize,

        /// Results per page
        #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
        page_size: usize,
    },

    /// Download a dataset archive
    #[command(alias = "d")]
    Download {
        /// ColabFit dataset ID (e.g. DS_123456abcdef_0)
        dataset_id: String,

        /// "parquet" (ingested data) or "original" (raw data)
        #[arg(long, short, default_value = "parquet")]
        format: String,

        /// Directory to save into (default: configured or platform download directory)
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },

    /// Run the MCP server (stdio by default)
    Serve {
        /// Serve streamable HTTP instead of stdio
        #[arg(long)]
        http: bool,

        /// Port for HTTP mode
        #[arg(long, short, default_value_t = 3000)]
        port: u16,

        /// Host to bind to for HTTP mode
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },

    /// Write a default configuration file
    InitConfig {
        /// Where to write it (default: the user config directory)
        path: Option<PathBuf>,

        /// Replace an existing file
        #[arg(long, short)]
        force: bool,
    },
}

/// Print all available environment variables
fn print_env_vars() {
    println!("ColabFit MCP - Environment Variables");
    println!();
    println!("Credentials (take precedence over the config file):");
    println!("  COLABFIT_USERNAME           Basic-auth user for the ColabFit API (default: mcp-tool)");
    println!("  COLABFIT_PASSWORD           Basic-auth password for the ColabFit API");
    println!();
    println!("Layered Settings (override the config file):");
    println!("  COLABFIT_MCP_API__BASE_URL               Service base URL (default: https://materials.colabfit.org/mcp)");
    println!("  COLABFIT_MCP_API__USERNAME               Basic-auth user");
    println!("  COLABFIT_MCP_API__PASSWORD               Basic-auth password");
    println!("  COLABFIT_MCP_DOWNLOADS__DIRECTORY        Download directory (default: platform download dir)");
    println!("  COLABFIT_MCP_DOWNLOADS__CHUNK_SIZE       Write buffer size in bytes (default: 10000000)");
    println!("  COLABFIT_MCP_HTTP__TIMEOUT_SECS          Overall request timeout (default: none)");
    println!("  COLABFIT_MCP_HTTP__CONNECT_TIMEOUT_SECS  Connect timeout (default: 30)");
    println!("  COLABFIT_MCP_LOGGING__LEVEL              Log level (default: info)");
    println!("  COLABFIT_MCP_LOGGING__FORMAT             'json' for structured logs");
    println!();
    println!("Proxy Settings:");
    println!("  HTTP_PROXY / HTTPS_PROXY / NO_PROXY   Standard proxy variables, honored by the HTTP client");
    println!();
    println!("Other Settings:");
    println!("  RUST_LOG                    Rust logging filter (e.g., debug, colabfit_mcp=trace)");
    std::process::exit(0);
}

/// Logs go to stderr: stdout carries the stdio MCP transport
fn init_tracing(verbose: u8, quiet: bool, logging: &LoggingConfig) {
    let level = if quiet {
        "error"
    } else {
        match verbose {
            0 => logging.level.as_str(),
            1 => "debug",
            _ => "trace",
        }
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("colabfit_mcp={}", level)));

    let registry = tracing_subscriber::registry().with(env_filter);
    if logging.is_json() {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn non_empty<T>(values: Vec<T>) -> Option<Vec<T>> {
    if values.is_empty() {
        None
    } else {
        Some(values)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.env {
        print_env_vars();
    }

    let config_path = cli.config.clone().or_else(find_config_file);
    let config = load_config(config_path.as_deref()).with_context(|| match &config_path {
        Some(path) => format!("Failed to load config file {}", path.display()),
        None => "Failed to load configuration from environment".to_string(),
    })?;

    init_tracing(cli.verbose, cli.quiet, &config.logging);
    if let Some(path) = &config_path {
        tracing::info!("Using config file: {}", path.display());
    }

    match cli.command {
        Some(Commands::Query {
            name,
            authors,
            description,
            elements,
            exact_elements,
            doi,
            min_co,
            max_co,
            min_elements,
            max_elements,
            min_atoms,
            max_atoms,
            property_types,
            license,
            equilibrium,
            sort_by,
            sort_direction,
            software,
            methods,
            page,
            page_size,
        }) => {
            let filters = DatasetFilters {
                name,
                authors,
                description,
                elements: non_empty(elements),
                exact_elements,
                doi,
                min_co,
                max_co,
                min_elements,
                max_elements,
                min_atoms,
                max_atoms,
                property_types: non_empty(property_types),
                license: non_empty(license),
                equilibrium,
                given_sort_by: sort_by,
                given_sort_direction: sort_direction,
                software: non_empty(software),
                methods_text_filter: non_empty(methods),
            };

            let source = ColabFitSource::new(&config)?;
            let outcome = dataset_query(&source, &filters, Pagination::new(page, page_size)).await;
            output_query(&outcome, cli.output)?;

            if let QueryOutcome::Failure(error) = outcome {
                anyhow::bail!("Query failed: {}", error);
            }
        }

        Some(Commands::Download {
            dataset_id,
            format,
            output_dir,
        }) => {
            let dir = output_dir
                .or_else(|| download_dir(&config.downloads))
                .context("Could not determine a download directory; pass --output-dir")?;

            let source = ColabFitSource::new(&config)?;
            let request = DownloadRequest::new(dataset_id, format);
            let outcome = download_dataset(&source, &dir, &request).await;

            match cli.output.resolve() {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&outcome)?),
                _ => {
                    if let DownloadOutcome::Saved { path, bytes } = &outcome {
                        if !cli.quiet {
                            println!("Saved {} ({} bytes)", path.display(), bytes);
                        }
                    }
                }
            }

            if let DownloadOutcome::Failure(error) = outcome {
                anyhow::bail!("Download failed: {}", error);
            }
        }

        Some(Commands::Serve { http, port, host }) => {
            let dir = download_dir(&config.downloads).context(
                "Could not determine a download directory; set downloads.directory in the config",
            )?;
            let source = Arc::new(ColabFitSource::new(&config)?);
            let server = McpServer::new(source, dir)?;

            if http {
                let addr = format!("{}:{}", host, port);
                let (bound_addr, handle) = server.run_http(&addr).await?;
                tracing::info!("MCP server listening on {}", bound_addr);

                handle
                    .await
                    .map_err(|e| anyhow::anyhow!("Server task failed: {}", e))?;
            } else {
                server.run().await?;
            }
        }

        Some(Commands::InitConfig { path, force }) => {
            let path = path
                .or_else(default_config_path)
                .context("Could not determine a config directory; pass a path")?;
            write_default_config(&path, force)?;
            if !cli.quiet {
                eprintln!("Wrote default configuration to {}", path.display());
            }
        }

        None => {
            use clap::CommandFactory;
            Cli::command().print_help()?;
        }
    }

    Ok(())
}

fn output_query(outcome: &QueryOutcome, format: OutputFormat) -> Result<()> {
    match (format.resolve(), outcome) {
        (OutputFormat::Table, QueryOutcome::Page(page)) => print_page_table(page),
        (OutputFormat::Table, QueryOutcome::Failure(_)) => {}
        _ => println!("{}", serde_json::to_string_pretty(outcome)?),
    }
    Ok(())
}

fn field(record: &serde_json::Map<String, Value>, key: &str) -> String {
    match record.get(key) {
        None | Some(Value::Null) => "-".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|v| v.as_str().map(str::to_string).unwrap_or_else(|| v.to_string()))
            .collect::<Vec<_>>()
            .join(", "),
        Some(other) => other.to_string(),
    }
}

fn truncate(text: String, max: usize) -> String {
    if text.chars().count() > max {
        let cut: String = text.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    } else {
        text
    }
}

fn print_page_table(page: &QueryPage) {
    use comfy_table::{Attribute, Cell, Table};

    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.set_header(vec!["ID", "Name", "Elements", "Configurations", "Atoms"]);

    for record in &page.results {
        table.add_row(vec![
            Cell::new(field(record, "id")),
            Cell::new(truncate(field(record, "name"), 50)).add_attribute(Attribute::Bold),
            Cell::new(truncate(field(record, "elements"), 30)),
            Cell::new(field(record, "nconfigurations")),
            Cell::new(field(record, "nsites")),
        ]);
    }

    println!("{table}");
    println!(
        "Page {} of {} ({} results, page size {})",
        page.page,
        page.total_pages,
        page.result_length(),
        page.page_size
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::parse_from(["colabfit-mcp"]);
        assert_eq!(cli.verbose, 0);
        assert!(!cli.quiet);
        assert_eq!(cli.output, OutputFormat::Auto);
        assert!(cli.config.is_none());
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_cli_verbose_flag() {
        let cli = Cli::parse_from(["colabfit-mcp", "-vv"]);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_cli_query_defaults() {
        let cli = Cli::parse_from(["colabfit-mcp", "query"]);
        match cli.command {
            Some(Commands::Query {
                page,
                page_size,
                sort_direction,
                exact_elements,
                elements,
                equilibrium,
                ..
            }) => {
                assert_eq!(page, 1);
                assert_eq!(page_size, 10);
                assert_eq!(sort_direction, SortDirection::Descending);
                assert!(!exact_elements);
                assert!(elements.is_empty());
                assert!(equilibrium.is_none());
            }
            _ => panic!("Expected Query command"),
        }
    }

    #[test]
    fn test_cli_query_with_options() {
        let cli = Cli::parse_from([
            "colabfit-mcp",
            "query",
            "--element",
            "C,H",
            "--element",
            "O",
            "--property-type",
            "energy,atomic_forces",
            "--license",
            "CC-BY-4.0",
            "--sort-by",
            "nsites",
            "--sort-direction",
            "ascending",
            "--equilibrium",
            "false",
            "--page",
            "2",
            "--page-size",
            "5",
        ]);
        match cli.command {
            Some(Commands::Query {
                elements,
                property_types,
                license,
                sort_by,
                sort_direction,
                equilibrium,
                page,
                page_size,
                ..
            }) => {
                assert_eq!(elements, vec!["C", "H", "O"]);
                assert_eq!(
                    property_types,
                    vec![PropertyType::Energy, PropertyType::AtomicForces]
                );
                assert_eq!(license, vec![License::CcBy4]);
                assert_eq!(sort_by, Some(SortBy::Nsites));
                assert_eq!(sort_direction, SortDirection::Ascending);
                assert_eq!(equilibrium, Some(false));
                assert_eq!(page, 2);
                assert_eq!(page_size, 5);
            }
            _ => panic!("Expected Query command"),
        }
    }

    #[test]
    fn test_cli_rejects_unknown_license() {
        let result = Cli::try_parse_from(["colabfit-mcp", "query", "--license", "WTFPL"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_download_command() {
        let cli = Cli::parse_from(["colabfit-mcp", "download", "DS_abc123_0"]);
        match cli.command {
            Some(Commands::Download {
                dataset_id,
                format,
                output_dir,
            }) => {
                assert_eq!(dataset_id, "DS_abc123_0");
                assert_eq!(format, "parquet");
                assert!(output_dir.is_none());
            }
            _ => panic!("Expected Download command"),
        }
    }

    #[test]
    fn test_cli_serve_command() {
        let cli = Cli::parse_from(["colabfit-mcp", "serve"]);
        match cli.command {
            Some(Commands::Serve { http, port, host }) => {
                assert!(!http);
                assert_eq!(port, 3000);
                assert_eq!(host, "127.0.0.1");
            }
            _ => panic!("Expected Serve command"),
        }
    }

    #[test]
    fn test_cli_serve_http() {
        let cli = Cli::parse_from(["colabfit-mcp", "serve", "--http", "--port", "8080"]);
        match cli.command {
            Some(Commands::Serve { http, port, .. }) => {
                assert!(http);
                assert_eq!(port, 8080);
            }
            _ => panic!("Expected Serve command"),
        }
        assert!(Cli::try_parse_from(["colabfit-mcp", "serve", "--stdio"]).is_err());
    }

    #[test]
    fn test_field_rendering() {
        let record = json!({
            "id": "DS_1_0",
            "elements": ["C", "H"],
            "nsites": 120,
            "name": null
        });
        let record = record.as_object().unwrap();

        assert_eq!(field(record, "id"), "DS_1_0");
        assert_eq!(field(record, "elements"), "C, H");
        assert_eq!(field(record, "nsites"), "120");
        assert_eq!(field(record, "name"), "-");
        assert_eq!(field(record, "missing"), "-");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short".to_string(), 10), "short");
        assert_eq!(truncate("a long dataset name".to_string(), 10), "a long ...");
    }
}
