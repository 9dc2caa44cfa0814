use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CLI для осмотра и обкатки файлов индекса ThicketIx
#[derive(Parser, Debug)]
#[command(name = "thicketix", version, about = "ThicketIx index file tool")]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Cmd,
}

#[derive(Subcommand, Debug)]
pub enum Cmd {
    /// Print index file summary (reserved header + derived figures)
    Status {
        #[arg(long)]
        path: PathBuf,
        /// Key shape, e.g. "i32", "i64,i32", "i32,timestamp,i32"
        #[arg(long, default_value = "i64")]
        shape: String,
        /// JSON output (single object)
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Dump all keys in order (requires a cleanly closed file)
    Dump {
        #[arg(long)]
        path: PathBuf,
        #[arg(long, default_value = "i64")]
        shape: String,
    },

    /// Scan keys in [lo, hi]. Compound keys are comma-separated: "1,2"
    Scan {
        #[arg(long)]
        path: PathBuf,
        #[arg(long, default_value = "i64")]
        shape: String,
        #[arg(long)]
        lo: String,
        #[arg(long)]
        hi: String,
    },

    /// Insert a (key, offset) pair
    Insert {
        #[arg(long)]
        path: PathBuf,
        #[arg(long, default_value = "i64")]
        shape: String,
        #[arg(long)]
        key: String,
        #[arg(long, default_value_t = 0)]
        offset: i32,
    },

    /// Delete a (key, offset) pair
    Del {
        #[arg(long)]
        path: PathBuf,
        #[arg(long, default_value = "i64")]
        shape: String,
        #[arg(long)]
        key: String,
        #[arg(long, default_value_t = 0)]
        offset: i32,
    },

    /// Randomized i64 bulk-insert benchmark
    Bench {
        #[arg(long)]
        path: PathBuf,
        #[arg(long, default_value_t = 100_000)]
        n: u32,
        /// Page cache capacity for the run
        #[arg(long, default_value_t = 16)]
        cache: usize,
    },
}
