use std::env;

use pert_montecarlo::cli::{parse_args, USAGE};
use pert_montecarlo::logging::init_tracing;
use pert_montecarlo::{run_parallel, run_sequential};

fn print_usage(program: &str) {
    eprintln!("Usage: {} [options]", program);
    eprintln!("{}", USAGE);
}

fn main() {
    init_tracing();

    let mut args = env::args();
    let program = args.next().unwrap_or_else(|| "pert-montecarlo".to_string());

    let cli = match parse_args(args) {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("{}", e);
            print_usage(&program);
            std::process::exit(1);
        }
    };
    if cli.help {
        print_usage(&program);
        return;
    }

    let config = &cli.config;
    println!("PERT Monte Carlo ({})", if cli.sequential { "sequential" } else { "threads" });
    println!(
        "Trials: {}, workers: {}, chunk: {}, deadline: {}, budget: {}",
        config.total_trials,
        config.pool_size,
        config.chunk_size,
        config.deadline,
        config.budget.map_or_else(|| "none".to_string(), |b| b.to_string())
    );
    for (i, act) in config.activities.iter().enumerate() {
        println!(
            "  activity {}: ({}, {}, {}) mean {:.3} sd {:.3} cost/unit {}",
            i,
            act.a,
            act.m,
            act.b,
            act.pert_mean(),
            act.pert_std_dev(),
            act.cost_rate
        );
    }

    let outcome = if cli.sequential {
        run_sequential(config)
    } else {
        run_parallel(config)
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
        if let Err(e) = summary.write_json(path) {
            eprintln!("Failed to write summary: {}", e);
            std::process::exit(1);
        }
        println!("Summary written to {}", path.display());
    }
}
