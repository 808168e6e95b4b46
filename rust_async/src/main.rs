use pert_montecarlo::cli::{parse_args, USAGE};
use pert_montecarlo::logging::init_tracing;
use pert_montecarlo::run_sequential;
use pert_montecarlo_async::run_parallel_async;

#[tokio::main]
async fn main() {
    init_tracing();

    let mut args = std::env::args();
    let program = args.next().unwrap_or_else(|| "pert-montecarlo-async".to_string());

    let cli = match parse_args(args) {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("{}", e);
            eprintln!("Usage: {} [options]\n{}", program, USAGE);
            std::process::exit(1);
        }
    };
    if cli.help {
        println!("Usage: {} [options]\n{}", program, USAGE);
        return;
    }

    let config = &cli.config;
    println!(
        "Running {} trials in chunks of {} using {} async workers...",
        config.total_trials, config.chunk_size, config.pool_size
    );

    let outcome = if cli.sequential {
        run_sequential(config)
    } else {
        run_parallel_async(config).await
    };
    let summary = match outcome {
        Ok(summary) => summary,
        Err(e) => {
            eprintln!("Simulation failed: {}", e);
            std::process::exit(1);
        }
    };

    println!("Base seed: {}", summary.base_seed().unwrap_or_default());
    println!("{}", summary.result);

    if let Some(path) = &cli.output {
        println!("Saving summary to: {}", path.display());
        if let Err(e) = summary.write_json(path) {
            eprintln!("Failed to write summary: {}", e);
            std::process::exit(1);
        }
    }

    println!("Done!");
}
