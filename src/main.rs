use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use triageplan::cli::Cli;
use triageplan::config::Config;
use triageplan::pipeline;

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match Config::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };

    info!(?config, "config loaded");

    match pipeline::run(&config) {
        Ok(summary) => {
            info!(
                cycle_id = %summary.cycle_id,
                groups = summary.group_count,
                omitted = summary.omitted_count,
                plans = summary.plan_count,
                "run complete"
            );
            println!(
                "{}: {} groups, {} omitted, {} plans -> {}",
                summary.cycle_id,
                summary.group_count,
                summary.omitted_count,
                summary.plan_count,
                summary.work_set_path.display()
            );
        }
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    }
}
