mod args;
mod dashboard;

use clap::Parser;
use log::{info, LevelFilter};
use snafu::ErrorCompat;

fn main() {
    let args = args::Args::parse();

    let mut logger =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if args.verbose {
        logger.filter_level(LevelFilter::Debug);
    }
    logger.init();
    info!("args: {:?}", args);

    if let Err(e) = dashboard::run_dashboard(&args) {
        for (idx, err) in ErrorCompat::iter_chain(&e).enumerate() {
            if idx == 0 {
                eprintln!("An error occured: {}", err);
            } else {
                eprintln!("  caused by: {}", err);
            }
        }
        std::process::exit(1);
    }
}
