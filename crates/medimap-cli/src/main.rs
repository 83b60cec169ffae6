mod commands;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use medimap_core::catalog::SearchFilter;
use medimap_core::geocode::ResolveMode;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "medimap",
    version,
    about = "Symptom triage and nearby facility recommendation"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ModeArg {
    /// Parallel for small catalogs, throttled for large ones
    Auto,
    Parallel,
    Throttled,
}

impl ModeArg {
    pub fn forced(self) -> Option<ResolveMode> {
        match self {
            ModeArg::Auto => None,
            ModeArg::Parallel => Some(ResolveMode::Parallel),
            ModeArg::Throttled => Some(ResolveMode::Throttled),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Classify a symptom description (no facility lookup)
    Classify {
        /// Free-text symptom description
        text: String,

        /// Custom JSON rule table (default: built-in table)
        #[arg(short, long = "rules", value_name = "FILE")]
        rules: Option<PathBuf>,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,
    },
    /// Classify symptoms and recommend facilities from a catalog
    Recommend {
        /// Free-text symptom description
        text: String,

        /// Facility catalog (JSON array)
        #[arg(long, value_name = "FILE")]
        catalog: PathBuf,

        /// Address to coordinate table (JSON object)
        #[arg(long, value_name = "FILE")]
        geocodes: PathBuf,

        /// Favorites (JSON array of {"id": ..})
        #[arg(long, value_name = "FILE")]
        favorites: Option<PathBuf>,

        /// Custom JSON rule table (default: built-in table)
        #[arg(short, long = "rules", value_name = "FILE")]
        rules: Option<PathBuf>,

        /// Maximum number of recommendations
        #[arg(short, long)]
        limit: Option<usize>,

        #[arg(long, value_enum, default_value = "auto")]
        mode: ModeArg,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,
    },
    /// Resolve catalog addresses to coordinates
    Geocode {
        /// Facility catalog (JSON array)
        #[arg(long, value_name = "FILE")]
        catalog: PathBuf,

        /// Address to coordinate table (JSON object)
        #[arg(long, value_name = "FILE")]
        geocodes: PathBuf,

        /// Favorites (JSON array of {"id": ..})
        #[arg(long, value_name = "FILE")]
        favorites: Option<PathBuf>,

        #[arg(long, value_enum, default_value = "auto")]
        mode: ModeArg,

        /// Pause between throttled requests, in milliseconds
        #[arg(long, value_name = "MS")]
        delay_ms: Option<u64>,

        /// Only list facilities of this category ("전체" for all)
        #[arg(long)]
        category: Option<String>,

        /// Only list facilities whose name or address contains every term
        #[arg(long, default_value = "")]
        search: String,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,
    },
    /// Inspect and validate rule tables
    Rules {
        #[command(subcommand)]
        action: RulesAction,
    },
}

#[derive(Subcommand)]
enum RulesAction {
    /// List predefined rule tables
    List,
    /// Explain a rule table in plain language
    Explain {
        /// Preset name
        #[arg(default_value = "default")]
        preset: String,
    },
    /// Validate a custom rule file
    Validate {
        /// Path to JSON rule file
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Classify {
            text,
            rules,
            output,
        } => commands::classify::run(&text, rules, &output),
        Commands::Recommend {
            text,
            catalog,
            geocodes,
            favorites,
            rules,
            limit,
            mode,
            output,
        } => {
            let sources = commands::Sources {
                catalog,
                geocodes,
                favorites,
            };
            commands::recommend::run(&text, sources, rules, limit, mode, &output).await
        }
        Commands::Geocode {
            catalog,
            geocodes,
            favorites,
            mode,
            delay_ms,
            category,
            search,
            output,
        } => {
            let sources = commands::Sources {
                catalog,
                geocodes,
                favorites,
            };
            let filter = SearchFilter {
                category,
                keyword: search,
            };
            commands::geocode::run(sources, mode, delay_ms, filter, &output).await
        }
        Commands::Rules { action } => match action {
            RulesAction::List => commands::rules::list(),
            RulesAction::Explain { preset } => commands::rules::explain(&preset),
            RulesAction::Validate { file } => commands::rules::validate(&file),
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
