//! amz-paapi - Amazon Product Advertising API command line client
//!
//! Builds signed requests, fetches them and renders the responses.

use amz_paapi::amazon::Locale;
use amz_paapi::api::{ItemLookup, ItemSearch};
use amz_paapi::commands::{CommandOutput, LookupCommand, SearchCommand, SignCommand, UrlCommand};
use amz_paapi::config::{Config, OutputFormat};
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "amz-paapi",
    version,
    about = "Amazon Product Advertising API client",
    long_about = "Signs Product Advertising API requests, sends them and renders the responses as tables, JSON, markdown, CSV or raw XML."
)]
struct Cli {
    /// Marketplace locale (us, uk, de, jp, ...)
    #[arg(short, long, global = true)]
    locale: Option<Locale>,

    /// Proxy URL (e.g., socks5://host:port)
    #[arg(long, global = true)]
    proxy: Option<String>,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output format (table, json, markdown, csv, xml, document)
    #[arg(short, long, global = true)]
    format: Option<OutputFormat>,

    /// Fail on API errors instead of reporting them after the output
    #[arg(long, global = true)]
    strict: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search the catalog by keywords
    #[command(alias = "s")]
    Search {
        /// Search keywords
        keywords: String,

        /// Search index (category), e.g. Books
        #[arg(short, long)]
        index: Option<String>,

        /// Sort order, ignored when searching all indices
        #[arg(long)]
        sort: Option<String>,

        /// Item condition (New, Used, Collectible, Refurbished, All)
        #[arg(long)]
        condition: Option<String>,

        /// Comma-separated response groups
        #[arg(long)]
        response_group: Option<String>,
    },

    /// Look up items by ASIN
    #[command(alias = "l")]
    Lookup {
        /// ASIN(s) to look up
        #[arg(required = true)]
        asins: Vec<String>,

        /// Only offers sold by Amazon
        #[arg(long)]
        amazon_only: bool,

        /// Comma-separated response groups
        #[arg(long)]
        response_group: Option<String>,

        /// Review sort order
        #[arg(long)]
        review_sort: Option<String>,
    },

    /// Print the signed URL for an operation without sending it
    Url {
        /// Operation name, e.g. ItemLookup
        operation: String,

        /// Request parameter as Key=Value (repeatable)
        #[arg(short, long = "param")]
        params: Vec<String>,
    },

    /// Sign an arbitrary request URL with the configured secret key
    Sign {
        /// URL to sign
        url: String,

        /// Protocol version to stamp
        #[arg(long)]
        version: Option<String>,
    },

    /// List supported locales
    Locales,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new(Level::DEBUG.to_string())
    } else {
        EnvFilter::from_default_env().add_directive(Level::WARN.into())
    };

    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).with_writer(std::io::stderr).init();

    // Load config with layered overrides
    let mut config = Config::load(cli.config.as_deref())?.with_env();

    // Apply CLI overrides
    if let Some(locale) = cli.locale {
        config.locale = locale;
    }
    if let Some(format) = cli.format {
        config.format = format;
    }
    if let Some(proxy) = cli.proxy {
        config.proxy = Some(proxy);
    }
    if cli.strict {
        config.strict = true;
    }

    match cli.command {
        Commands::Search { keywords, index, sort, condition, response_group } => {
            let search = ItemSearch { keywords, search_index: index, sort, condition, response_group };
            let output = SearchCommand::new(config).execute(&search).await?;
            print_output(&output);
        }

        Commands::Lookup { asins, amazon_only, response_group, review_sort } => {
            let lookup = ItemLookup { asins, amazon_only, response_group, review_sort };
            let output = LookupCommand::new(config).execute(&lookup).await?;
            print_output(&output);
        }

        Commands::Url { operation, params } => {
            println!("{}", UrlCommand::new(config).execute(&operation, &params)?);
        }

        Commands::Sign { url, version } => {
            println!("{}", SignCommand::new(config).execute(&url, version.as_deref())?);
        }

        Commands::Locales => {
            println!("Supported locales:\n");
            println!("{:<6} {:<28} {:<10}", "Code", "Host", "Currency");
            println!("{:-<6} {:-<28} {:-<10}", "", "", "");

            for locale in Locale::all() {
                println!("{:<6} {:<28} {:<10}", locale.to_string(), locale.host(), locale.currency());
            }
        }
    }

    Ok(())
}

fn print_output(output: &CommandOutput) {
    if !output.text.is_empty() {
        println!("{}", output.text);
    }

    for error in &output.errors {
        eprintln!("Error: {}", error);
    }
}
