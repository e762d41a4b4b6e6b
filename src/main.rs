use clap::Parser;
use mbo_book::cli::{Args, Mode};
use mbo_book::{engine, replay, streamer};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // `Args::parse()` would let clap exit with its own code (2) on a bad
    // `--mode`; §6 requires exit code 1 for every usage error, so the parse
    // error is routed through the same one-line-diagnostic path as the rest.
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("mbo-book: {e}");
            std::process::exit(1);
        }
    };
    if let Err(e) = dispatch(&args) {
        eprintln!("mbo-book: {e}");
        std::process::exit(1);
    }
}

fn dispatch(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    match args.mode {
        Mode::Replay => {
            let dbn = args.require_dbn()?;
            replay::run(dbn, &args.out)?;
        }
        Mode::Streamer => {
            let dbn = args.require_dbn()?;
            streamer::run(dbn, &args.host, args.port, args.rate)?;
        }
        Mode::Engine => {
            let termination = engine::run(&args.host, args.port, &args.out, args.levels)?;
            if termination == engine::Termination::Truncated {
                return Err("stream truncated mid-record".into());
            }
        }
    }
    Ok(())
}
