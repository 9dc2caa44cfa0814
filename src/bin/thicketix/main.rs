use anyhow::Result;

mod cli;
mod cmd_bench;
mod cmd_del;
mod cmd_dump;
mod cmd_insert;
mod cmd_scan;
mod cmd_status;
mod util;

use clap::Parser;

fn main() {
    env_logger::init();
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = cli::Cli::parse();
    match cli.cmd {
        cli::Cmd::Status { path, shape, json } => cmd_status::exec(path, shape, json),

        cli::Cmd::Dump { path, shape } => cmd_dump::exec(path, shape),

        cli::Cmd::Scan {
            path,
            shape,
            lo,
            hi,
        } => cmd_scan::exec(path, shape, lo, hi),

        cli::Cmd::Insert {
            path,
            shape,
            key,
            offset,
        } => cmd_insert::exec(path, shape, key, offset),

        cli::Cmd::Del {
            path,
            shape,
            key,
            offset,
        } => cmd_del::exec(path, shape, key, offset),

        cli::Cmd::Bench { path, n, cache } => cmd_bench::exec(path, n, cache),
    }
}
