//! Collate comparison worker.
//!
//! Serves word-level document comparisons over stdio: one JSON request per
//! line on stdin, a stream of JSON response lines on stdout. Designed to run
//! as an isolated child process so multi-second CPU-bound diffs never block
//! the host's event loop.
//!
//! ## Usage
//!
//! ```text
//! collate-worker [-v | --quiet]
//! echo '{"type":"compare","baseTokens":["a"],"comparisonTokens":["b"]}' | collate-worker
//! ```

use anyhow::Result;
use clap::Parser;
use std::io;

mod session;

#[derive(Parser)]
#[command(name = "collate-worker")]
#[command(about = "Word-level document comparison over stdio", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors (stdout is reserved for JSON)
    #[arg(long)]
    quiet: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Configure logging to stderr only (stdout is for protocol messages)
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    log::info!("collate worker serving on stdio");

    let stdin = io::stdin();
    let stdout = io::stdout();
    session::run(stdin.lock(), stdout.lock())?;

    log::info!("stdin closed, collate worker stopping");
    Ok(())
}
