//! Command-line surface: one executable, one role per invocation.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Which runtime role this invocation plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum Mode {
    Replay,
    Streamer,
    Engine,
}

#[derive(Parser, Debug)]
#[command(name = "mbo-book")]
#[command(about = "Limit order book engine over a recorded MBO event stream")]
pub struct Args {
    /// Which role to run.
    #[arg(long)]
    pub mode: Mode,

    /// Path to the recorded event file (required for replay, streamer).
    #[arg(long)]
    pub dbn: Option<PathBuf>,

    /// Snapshot output path (replay, engine).
    #[arg(long, default_value = "book.json")]
    pub out: PathBuf,

    /// Streamer host to connect to (engine).
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// TCP port (streamer, engine).
    #[arg(long, default_value_t = 9000)]
    pub port: u16,

    /// Events per second; 0 disables pacing (streamer).
    #[arg(long, default_value_t = 200_000)]
    pub rate: u64,

    /// Depth in per-event snapshots (engine).
    #[arg(long, default_value_t = 5)]
    pub levels: usize,
}

/// A usage error: missing `--dbn` where required, or any other argument
/// problem `clap` itself doesn't catch. Always a one-line diagnostic and
/// exit code 1 (§6/§7 band 1).
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct UsageError(pub String);

impl Args {
    /// Validate mode-dependent requirements `clap` can't express declaratively.
    pub fn require_dbn(&self) -> Result<&std::path::Path, UsageError> {
        self.dbn
            .as_deref()
            .ok_or_else(|| UsageError(format!("--dbn is required for --mode={:?}", self.mode)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_replay_invocation() {
        let args = Args::parse_from(["mbo-book", "--mode=replay", "--dbn=events.bin"]);
        assert_eq!(args.mode, Mode::Replay);
        assert_eq!(args.out, std::path::PathBuf::from("book.json"));
        assert_eq!(args.rate, 200_000);
        assert_eq!(args.levels, 5);
    }

    #[test]
    fn missing_dbn_is_a_usage_error() {
        let args = Args::parse_from(["mbo-book", "--mode=replay"]);
        assert!(args.require_dbn().is_err());
    }
}
