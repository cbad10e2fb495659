use catalog_config::{Config, PathManager};
use clap::{ArgAction, Parser, Subcommand};
use color_eyre::eyre::eyre;
use commands::{browse, catalog, config};

mod commands;
mod logging;
mod output;

#[derive(Parser)]
#[command(name = "moviescout")]
#[command(about = "MovieScout - Browse, search and shortlist movies from the catalog")]
#[command(version)]
struct Cli {
    /// Enable verbose output (use multiple times for more verbosity: -v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "human", value_enum)]
    output: output::OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List popular movies, one page at a time
    Discover {
        /// Page to fetch
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Search movies by title
    Search {
        /// Search term; a blank term falls back to discover
        term: String,

        /// Page to fetch
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Look up the trailer for a movie
    Trailer {
        /// Catalog id of the movie
        id: u64,
    },
    /// Browse interactively with infinite scrolling, stars and a watch-later list
    #[command(long_about = "Open an interactive listing. Moving past the last rendered row loads the next page. Movies can be starred, queued for later, and their trailers looked up.")]
    Browse {
        /// Start with a search instead of discover
        #[arg(long)]
        search: Option<String>,

        /// Number of rows shown at once
        #[arg(long, default_value_t = 10)]
        rows: usize,
    },
    /// Show or create the configuration file
    Config {
        #[command(subcommand)]
        cmd: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration (masks the API key)
    Show {
        /// Show the API key unmasked
        #[arg(long, action = ArgAction::SetTrue)]
        full: bool,
    },
    /// Write a configuration file with defaults
    Init {
        /// Catalog API key (if not provided, will prompt)
        #[arg(long)]
        api_key: Option<String>,

        /// Overwrite an existing configuration file
        #[arg(long, action = ArgAction::SetTrue)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    let paths = PathManager::default();
    let config_file = paths.config_file();
    let config = Config::load_or_default(&config_file)
        .map_err(|e| eyre!("Failed to load config from {}: {}", config_file.display(), e))?;

    logging::init_logging(cli.verbose, cli.quiet, &config.logging).map_err(|e| eyre!("{}", e))?;
    tracing::debug!(config_file = %config_file.display(), "Configuration loaded");

    let output = output::Output::new(cli.output, cli.quiet);

    match cli.command {
        Commands::Discover { page } => catalog::run_listing(&config, None, page, &output).await,
        Commands::Search { term, page } => catalog::run_listing(&config, Some(&term), page, &output).await,
        Commands::Trailer { id } => catalog::run_trailer(&config, id, &output).await,
        Commands::Browse { search, rows } => browse::run_browse(&config, search, rows, &output).await,
        Commands::Config { cmd } => config::run_config(cmd, &paths, config, &output),
    }
}
