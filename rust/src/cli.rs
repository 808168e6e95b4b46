//! Command-line flags shared by the threaded and async binaries.

use std::path::PathBuf;
use std::str::FromStr;

use crate::config::{default_chunk_size, SimulationConfig};
use crate::error::{Result, SimulationError};

pub const USAGE: &str = "\
Options:
  --config FILE     Load settings and activities from a TOML file
  --n N             Total number of trials (default: 2000000)
  --workers N       Worker pool size (default: $PERT_NUM_WORKERS or CPU count)
  --chunk N         Trials per chunk (default: several chunks per worker)
  --deadline T      Deadline in time units (default: 30)
  --budget B        Optional cost ceiling
  --seed S          Base seed (default: wall clock)
  --output FILE     Write a JSON run summary to FILE
  --sequential      Run every chunk on the calling thread
  -h, --help        Show this message";

#[derive(Debug, Clone, PartialEq)]
pub struct CliArgs {
    pub config: SimulationConfig,
    pub output: Option<PathBuf>,
    pub sequential: bool,
    pub help: bool,
}

fn value<T: FromStr>(flag: &str, raw: Option<String>) -> Result<T> {
    let raw = raw.ok_or_else(|| SimulationError::invalid_config(format!("{flag} needs a value")))?;
    raw.parse()
        .map_err(|_| SimulationError::invalid_config(format!("invalid {flag} value: {raw}")))
}

/// Parses flags (without the program name). `--config` is applied first so
/// that explicit flags override the file regardless of their position.
pub fn parse_args<I>(args: I) -> Result<CliArgs>
where
    I: IntoIterator<Item = String>,
{
    let args: Vec<String> = args.into_iter().collect();

    let mut config = match args.iter().position(|a| a == "--config") {
        Some(i) => {
            let path: PathBuf = value("--config", args.get(i + 1).cloned())?;
            SimulationConfig::from_toml_file(path)?
        }
        None => SimulationConfig::default(),
    };

    let mut output = None;
    let mut sequential = false;
    let mut help = false;
    let mut chunk_given = false;
    let mut rederive_chunk = false;

    let mut iter = args.into_iter();
    while let Some(flag) = iter.next() {
        match flag.as_str() {
            "--config" => {
                iter.next();
            }
            "--n" => {
                config.total_trials = value(&flag, iter.next())?;
                rederive_chunk = true;
            }
            "--workers" => {
                config.pool_size = value(&flag, iter.next())?;
                rederive_chunk = true;
            }
            "--chunk" => {
                config.chunk_size = value(&flag, iter.next())?;
                chunk_given = true;
            }
            "--deadline" => config.deadline = value(&flag, iter.next())?,
            "--budget" => config.budget = Some(value(&flag, iter.next())?),
            "--seed" => config.seed = Some(value(&flag, iter.next())?),
            "--output" => output = Some(value::<PathBuf>(&flag, iter.next())?),
            "--sequential" => sequential = true,
            "--help" | "-h" => help = true,
            other => {
                return Err(SimulationError::invalid_config(format!("unknown argument: {other}")));
            }
        }
    }

    if rederive_chunk && !chunk_given {
        config.chunk_size = default_chunk_size(config.total_trials, config.pool_size);
    }

    Ok(CliArgs {
        config,
        output,
        sequential,
        help,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<CliArgs> {
        parse_args(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn flags_override_defaults() {
        let cli = parse(&[
            "--n", "1000", "--workers", "2", "--chunk", "300", "--deadline", "28",
            "--budget", "95000", "--seed", "17", "--output", "out/summary.json",
        ])
        .unwrap();
        assert_eq!(cli.config.total_trials, 1000);
        assert_eq!(cli.config.pool_size, 2);
        assert_eq!(cli.config.chunk_size, 300);
        assert_eq!(cli.config.deadline, 28.0);
        assert_eq!(cli.config.budget, Some(95_000.0));
        assert_eq!(cli.config.seed, Some(17));
        assert_eq!(cli.output, Some(PathBuf::from("out/summary.json")));
        assert!(!cli.sequential);
    }

    #[test]
    fn trial_count_rederives_chunk_size() {
        let cli = parse(&["--workers", "5", "--n", "2000"]).unwrap();
        assert_eq!(cli.config.chunk_size, 100);
    }

    #[test]
    fn workers_alone_rederive_chunk_size() {
        let cli = parse(&["--workers", "64"]).unwrap();
        let chunks = cli.config.total_trials.div_ceil(cli.config.chunk_size);
        assert_eq!(cli.config.chunk_size, default_chunk_size(cli.config.total_trials, 64));
        assert!(chunks >= 64, "{chunks} chunks for 64 workers");
    }

    #[test]
    fn explicit_chunk_wins_over_rederivation() {
        let cli = parse(&["--chunk", "777", "--workers", "8", "--n", "10000"]).unwrap();
        assert_eq!(cli.config.chunk_size, 777);
    }

    #[test]
    fn trial_count_after_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.toml");
        std::fs::write(&path, "pool_size = 4\nchunk_size = 5\n").unwrap();
        let path = path.to_string_lossy().into_owned();

        let cli = parse(&["--config", &path, "--n", "8000"]).unwrap();
        assert_eq!(cli.config.total_trials, 8000);
        assert_eq!(cli.config.pool_size, 4);
        assert_eq!(cli.config.chunk_size, 500);
    }

    #[test]
    fn rejects_unknown_and_malformed_flags() {
        assert!(parse(&["--frobnicate"]).is_err());
        assert!(parse(&["--n", "many"]).is_err());
        assert!(parse(&["--deadline"]).is_err());
    }

    #[test]
    fn config_file_then_flags() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.toml");
        std::fs::write(&path, "deadline = 33.0\nseed = 3\n").unwrap();
        let path = path.to_string_lossy().into_owned();

        let cli = parse(&["--seed", "9", "--config", &path, "--sequential"]).unwrap();
        assert_eq!(cli.config.deadline, 33.0);
        assert_eq!(cli.config.seed, Some(9));
        assert!(cli.sequential);
    }

    #[test]
    fn missing_config_file_is_io_error() {
        assert!(matches!(
            parse(&["--config", "/nonexistent/pert.toml"]),
            Err(SimulationError::Io { .. })
        ));
    }
}
