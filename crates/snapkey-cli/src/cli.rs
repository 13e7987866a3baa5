use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    version = env!("CARGO_PKG_VERSION"),
    about = "snapkey - a system-wide keyword text expander",
    long_about = "snapkey watches your typing for short keywords and replaces them with longer snippets wherever you type."
)]
pub struct Snapkey {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add a snippet keyword
    Add {
        #[clap(long, short = 'k', help = "Trigger keyword, e.g. \";sig\"")]
        keyword: String,

        #[clap(long, short = 'r', help = "Replacement text")]
        replacement: String,
    },
    /// Remove a snippet by keyword
    Remove {
        #[clap(long, short = 'k', help = "Keyword of the snippet to remove")]
        keyword: String,
    },
    /// List all snippets
    List,
    /// Start the background daemon
    Start,
    /// Stop the background daemon
    Stop,
    /// Check whether the daemon is running
    Status,
    /// Run the expansion worker in the foreground (for debugging)
    Run,
    // Hidden command used internally to run the detached daemon worker
    #[clap(hide = true, name = "daemon-worker")]
    DaemonWorker,
}
