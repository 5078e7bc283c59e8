use clap::Parser;
use log::{info, LevelFilter};
use snafu::ErrorCompat;

mod args;
mod reports;

fn main() {
    let args = args::Args::parse();

    let level = if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();

    info!("args: {:?}", args);

    if let Err(e) = reports::run_reports(&args) {
        eprintln!("An error occured: {}", e);
        for cause in ErrorCompat::iter_chain(&e).skip(1) {
            eprintln!("  caused by: {}", cause);
        }
        std::process::exit(1);
    }
}
