//! Trimline CLI: inspect trim mappings, plan exports, probe and preview media.
//!
//! Usage:
//!   trimline map [OPTIONS]           Show how a trim range maps frames
//!   trimline plan-export [OPTIONS]   Show the export a trim range produces
//!   trimline probe <URL>             Resolve media metadata with ffprobe
//!   trimline preview [OPTIONS]       Run the player against a headless engine
//!   trimline thumbnails <URL>        Sample the timeline thumbnail strip
//!   trimline config                  Print or write the configuration

use clap::{Parser, Subcommand};

use trimline_common::config::AppConfig;

mod commands;

#[derive(Parser)]
#[command(
    name = "trimline",
    about = "Trim-aware video playback and export tooling",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show activity, player duration and engine window of a trim range
    Map {
        /// Source duration in frames
        #[arg(long)]
        total: u64,

        /// Trim start (source frame, inclusive)
        #[arg(long, default_value = "0")]
        start: u64,

        /// Trim end (source frame, exclusive); defaults to the full source
        #[arg(long)]
        end: Option<u64>,

        /// Source frame to map into player space
        #[arg(long)]
        frame: Option<u64>,
    },

    /// Print the trim job an export of this range would submit
    PlanExport {
        /// Source frame rate
        #[arg(long, default_value = "30")]
        fps: f64,

        /// Source duration in frames
        #[arg(long)]
        total: u64,

        /// Trim start (source frame)
        #[arg(long, default_value = "0")]
        start: u64,

        /// Trim end (source frame); defaults to the full source
        #[arg(long)]
        end: Option<u64>,

        /// Source identifier used for the download filename
        #[arg(long, default_value = "video")]
        source_id: String,
    },

    /// Resolve duration, dimensions and frame rate of a media URL
    Probe {
        /// Media URL or path
        url: String,
    },

    /// Play a synthetic source through the player driver
    Preview {
        /// Source duration in frames
        #[arg(long, default_value = "300")]
        total: u64,

        /// Source frame rate
        #[arg(long, default_value = "30")]
        fps: f64,

        /// Trim start (source frame)
        #[arg(long)]
        start: Option<u64>,

        /// Trim end (source frame)
        #[arg(long)]
        end: Option<u64>,

        /// How long to play (seconds)
        #[arg(long, default_value = "3")]
        secs: f64,
    },

    /// Sample the thumbnail strip of a media URL with ffmpeg
    Thumbnails {
        /// Media URL or path
        url: String,

        /// Number of thumbnails (overrides the configuration)
        #[arg(long)]
        count: Option<usize>,
    },

    /// Print the effective configuration
    Config {
        /// Write the default configuration to the standard location
        #[arg(long)]
        write_default: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load();

    let mut logging = config.logging.clone();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    trimline_common::logging::init_logging(&logging);

    match cli.command {
        Commands::Map {
            total,
            start,
            end,
            frame,
        } => commands::map::run(total, start, end, frame),
        Commands::PlanExport {
            fps,
            total,
            start,
            end,
            source_id,
        } => commands::plan_export::run(fps, total, start, end, source_id),
        Commands::Probe { url } => commands::probe::run(url).await,
        Commands::Preview {
            total,
            fps,
            start,
            end,
            secs,
        } => commands::preview::run(&config, total, fps, start, end, secs).await,
        Commands::Thumbnails { url, count } => {
            commands::thumbnails::run(&config, url, count).await
        }
        Commands::Config { write_default } => commands::config::run(&config, write_default),
    }
}
