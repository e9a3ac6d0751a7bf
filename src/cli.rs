use std::env;
use std::path::PathBuf;

/// Default HTTP port for `--serve`.
#[cfg(feature = "api")]
pub const DEFAULT_PORT: u16 = 3000;

#[derive(Debug)]
pub struct CliOptions {
    pub scenario: Option<PathBuf>,
    pub preset: Option<String>,
    /// CSV input series; the synthetic source is used when absent.
    pub input: Option<PathBuf>,
    /// Where to save the input series.
    pub series_out: Option<PathBuf>,
    pub output: Option<PathBuf>,
    /// Append to `output`, skipping timestamps already there.
    pub append: bool,
    pub seed: Option<u64>,
    pub verbose: bool,
    pub help: bool,
    #[cfg(feature = "api")]
    pub serve: bool,
    #[cfg(feature = "api")]
    pub port: u16,
}

pub fn parse_args() -> Result<CliOptions, String> {
    let args: Vec<String> = env::args().skip(1).collect();
    parse_args_from(args)
}

pub fn parse_args_from(args: Vec<String>) -> Result<CliOptions, String> {
    let mut opts = CliOptions {
        scenario: None,
        preset: None,
        input: None,
        series_out: None,
        output: None,
        append: false,
        seed: None,
        verbose: false,
        help: false,
        #[cfg(feature = "api")]
        serve: false,
        #[cfg(feature = "api")]
        port: DEFAULT_PORT,
    };

    let mut i = 0usize;
    while i < args.len() {
        match args[i].as_str() {
            "--scenario" => {
                i += 1;
                let path = args.next_or_err(
                    i,
                    "missing value for --scenario (expected a TOML file path)",
                )?;
                if opts.scenario.replace(PathBuf::from(path)).is_some() {
                    return Err("--scenario provided more than once".to_string());
                }
            }
            "--preset" => {
                i += 1;
                let name = args.next_or_err(
                    i,
                    "missing value for --preset (expected a preset name)",
                )?;
                if opts.preset.replace(name.to_string()).is_some() {
                    return Err("--preset provided more than once".to_string());
                }
            }
            "--input" => {
                i += 1;
                let path = args.next_or_err(
                    i,
                    "missing value for --input (expected a CSV file path)",
                )?;
                if opts.input.replace(PathBuf::from(path)).is_some() {
                    return Err("--input provided more than once".to_string());
                }
            }
            "--series-out" => {
                i += 1;
                let path = args.next_or_err(
                    i,
                    "missing value for --series-out (expected a file path)",
                )?;
                if opts.series_out.replace(PathBuf::from(path)).is_some() {
                    return Err("--series-out provided more than once".to_string());
                }
            }
            "--output" => {
                i += 1;
                let path = args.next_or_err(
                    i,
                    "missing value for --output (expected a file path)",
                )?;
                if opts.output.replace(PathBuf::from(path)).is_some() {
                    return Err("--output provided more than once".to_string());
                }
            }
            "--seed" => {
                i += 1;
                let raw = args.next_or_err(i, "missing value for --seed (expected a u64)")?;
                let seed = raw
                    .parse::<u64>()
                    .map_err(|_| format!("invalid --seed value \"{raw}\" (expected a u64)"))?;
                opts.seed = Some(seed);
            }
            "--append" => opts.append = true,
            "--verbose" | "-v" => opts.verbose = true,
            "--help" | "-h" => opts.help = true,
            #[cfg(feature = "api")]
            "--serve" => opts.serve = true,
            #[cfg(feature = "api")]
            "--port" => {
                i += 1;
                let raw = args.next_or_err(i, "missing value for --port (expected a u16)")?;
                opts.port = raw
                    .parse::<u16>()
                    .map_err(|_| format!("invalid --port value \"{raw}\" (expected a u16)"))?;
            }
            other => return Err(format!("unknown argument: {other}")),
        }
        i += 1;
    }

    if opts.scenario.is_some() && opts.preset.is_some() {
        return Err(
            "arguments `--scenario` and `--preset` are mutually exclusive; choose one source"
                .to_string(),
        );
    }
    if opts.append && opts.output.is_none() {
        return Err("--append requires --output".to_string());
    }
    if opts.scenario.is_none() && opts.preset.is_none() {
        opts.preset = Some("default".to_string());
    }

    Ok(opts)
}

trait SliceArgExt {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String>;
}

impl SliceArgExt for [String] {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String> {
        self.get(index)
            .map(String::as_str)
            .ok_or_else(|| err.to_string())
    }
}

pub fn print_usage() {
    eprintln!("grid-battery-sim: home battery dispatch and economics simulator");
    eprintln!();
    eprintln!("Usage: grid-battery-sim [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --scenario <path>     Load scenario from TOML config file");
    eprintln!("  --preset <name>       Use a built-in preset (default, time_of_use, ideal)");
    eprintln!("  --input <path>        Read the energy series from CSV instead of generating it");
    eprintln!("  --series-out <path>   Save the input series to CSV");
    eprintln!("  --output <path>       Export simulation rows to CSV");
    eprintln!("  --append              Append to --output, skipping rows already present");
    eprintln!("  --seed <u64>          Override the generator seed");
    eprintln!("  -v, --verbose         Log every interval");
    #[cfg(feature = "api")]
    {
        eprintln!("  --serve               Start REST API server after simulation");
        eprintln!("  --port <u16>          API server port (default: 3000)");
    }
    eprintln!("  -h, --help            Show this help message");
}

#[cfg(test)]
mod tests {
    use super::parse_args_from;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn supports_scenario_cli() {
        let opts = parse_args_from(args(&["--scenario", "scenario.toml"]))
            .expect("parse should succeed");
        assert_eq!(
            opts.scenario.as_deref().and_then(|p| p.to_str()),
            Some("scenario.toml")
        );
        assert!(opts.preset.is_none());
    }

    #[test]
    fn defaults_to_default_preset() {
        let opts = parse_args_from(Vec::new()).expect("parse should succeed");
        assert_eq!(opts.preset.as_deref(), Some("default"));
        assert!(!opts.append && !opts.verbose && !opts.help);
    }

    #[test]
    fn parses_all_file_options() {
        let opts = parse_args_from(args(&[
            "--preset",
            "ideal",
            "--input",
            "in.csv",
            "--series-out",
            "series.csv",
            "--output",
            "out.csv",
            "--append",
            "--seed",
            "7",
            "-v",
        ]))
        .expect("parse should succeed");
        assert_eq!(opts.preset.as_deref(), Some("ideal"));
        assert_eq!(opts.input.as_deref().and_then(|p| p.to_str()), Some("in.csv"));
        assert_eq!(opts.series_out.as_deref().and_then(|p| p.to_str()), Some("series.csv"));
        assert_eq!(opts.output.as_deref().and_then(|p| p.to_str()), Some("out.csv"));
        assert!(opts.append);
        assert_eq!(opts.seed, Some(7));
        assert!(opts.verbose);
    }

    #[test]
    fn rejects_scenario_and_preset_together() {
        let err = parse_args_from(args(&["--scenario", "a.toml", "--preset", "ideal"]));
        assert!(err.unwrap_err().contains("mutually exclusive"));
    }

    #[test]
    fn rejects_append_without_output() {
        assert!(parse_args_from(args(&["--append"])).is_err());
    }

    #[test]
    fn rejects_bad_seed_and_missing_value() {
        assert!(parse_args_from(args(&["--seed", "abc"])).is_err());
        assert!(parse_args_from(args(&["--output"])).is_err());
        assert!(parse_args_from(args(&["--bogus"])).is_err());
    }

    #[test]
    fn help_flag() {
        assert!(parse_args_from(args(&["--help"])).unwrap().help);
    }
}
