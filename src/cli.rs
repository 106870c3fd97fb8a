//! CLI definitions for webpilot.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// webpilot CLI.
#[derive(Parser)]
#[command(name = "webpilot")]
#[command(about = "Browser automation agent core")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path (default: ./webpilot.toml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// DevTools debug host
    #[arg(long, global = true, env = "WEBPILOT_DEBUG_HOST")]
    pub host: Option<String>,

    /// DevTools debug port
    #[arg(long, global = true, env = "WEBPILOT_DEBUG_PORT")]
    pub port: Option<u16>,

    /// Run a launched browser headless
    #[arg(long, global = true)]
    pub headless: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Print the indexed element tree of a page
    Snapshot {
        /// URL to open first (default: the active tab as-is)
        url: Option<String>,

        /// Print the full snapshot as JSON instead of the text tree
        #[arg(long)]
        json: bool,

        /// Report elements this far beyond the viewport, in pixels (-1: everything)
        #[arg(long)]
        viewport_expansion: Option<i64>,
    },

    /// Print a markdown rendering of a page
    Text {
        /// URL to open first (default: the active tab as-is)
        url: Option<String>,

        /// Drop hyperlinks from the markdown
        #[arg(long)]
        no_links: bool,

        /// Chunk size cap in characters
        #[arg(long)]
        max_length: Option<usize>,

        /// Resume offset for paging through long documents
        #[arg(long)]
        start_from: Option<usize>,
    },

    /// Execute one tool action given as `{"tool": ..., "params": ...}` JSON
    Act {
        /// Action JSON, or `-` to read it from stdin
        action: String,

        /// URL to open first (default: the active tab as-is)
        #[arg(long)]
        url: Option<String>,
    },

    /// Run a decision script as a task, streaming events as JSON lines
    Run {
        /// Path to a JSON file holding an array of decisions
        script: PathBuf,

        /// Task instruction recorded on the run
        #[arg(long, default_value = "scripted run")]
        instruction: String,

        /// Step ceiling override
        #[arg(long)]
        max_steps: Option<u32>,

        /// Attach a screenshot to every perception pass
        #[arg(long)]
        screenshots: bool,
    },
}
