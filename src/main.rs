mod config;
mod input;
mod output;
mod parser;
mod report;
mod rules;

use clap::Parser;
use config::Settings;
use input::InputSource;
use std::path::PathBuf;
use std::process::ExitCode;

/// Exit codes follow sysexits(3).
const EXIT_DATAERR: u8 = 65;
const EXIT_NOINPUT: u8 = 66;
const EXIT_IOERR: u8 = 74;
const EXIT_CONFIG: u8 = 78;

/// Convert the statistics report printed by `ccache -s` into JSON.
///
/// Reads the report from stdin (or FILE), prints one line of JSON.
#[derive(Parser, Debug)]
#[command(name = "ccache2json", version, about)]
pub struct Cli {
    /// Report file to read instead of stdin ("-" for stdin)
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Fail if any field is missing or malformed instead of leaving it at its default
    #[arg(long)]
    strict: bool,

    /// Indent the JSON output
    #[arg(long)]
    pretty: bool,

    /// Settings file (TOML) with [parser] and [output] sections
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Extra logging (per-field extraction)
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors, not skipped fields
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    fn log_filter(&self) -> &'static str {
        if self.verbose {
            "ccache2json=debug"
        } else if self.quiet {
            "ccache2json=error"
        } else {
            "ccache2json=warn"
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(cli.log_filter())),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .init();

    tracing::debug!(?cli, "parsed CLI arguments");

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}

/// Any failure that ends the run.
#[derive(Debug)]
enum RunError {
    Config(config::ConfigError),
    Input(input::InputError),
    Parse(parser::ParseError),
    Output(output::OutputError),
}

impl RunError {
    fn exit_code(&self) -> u8 {
        match self {
            RunError::Config(_) => EXIT_CONFIG,
            RunError::Input(_) => EXIT_NOINPUT,
            RunError::Parse(_) => EXIT_DATAERR,
            RunError::Output(_) => EXIT_IOERR,
        }
    }
}

impl std::fmt::Display for RunError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunError::Config(e) => write!(f, "{e}"),
            RunError::Input(e) => write!(f, "{e}"),
            RunError::Parse(e) => write!(f, "{e}"),
            RunError::Output(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for RunError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RunError::Config(e) => Some(e),
            RunError::Input(e) => Some(e),
            RunError::Parse(e) => Some(e),
            RunError::Output(e) => Some(e),
        }
    }
}

fn run(cli: &Cli) -> Result<(), RunError> {
    let settings = Settings::load(cli.config.as_deref())
        .map_err(RunError::Config)?
        .with_overrides(cli.strict, cli.pretty);

    let source = InputSource::from_arg(cli.file.as_deref());
    let text = input::read_report(&source).map_err(RunError::Input)?;

    let stdout = std::io::stdout();
    convert(&text, &settings, &mut stdout.lock())
}

/// Parse report text and write it as JSON to `out`.
fn convert<W: std::io::Write>(
    text: &str,
    settings: &Settings,
    out: &mut W,
) -> Result<(), RunError> {
    let outcome = parser::parse_report(text, settings.parser.policy).map_err(RunError::Parse)?;
    if !outcome.issues.is_empty() {
        tracing::info!(
            skipped = outcome.issues.len(),
            "report converted with defaulted fields"
        );
    }
    output::write_report(out, &outcome.report, settings.output.pretty).map_err(RunError::Output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    const SAMPLE: &str = include_str!("../testdata/ccache-stats.txt");

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["ccache2json"]).unwrap();
        assert!(cli.file.is_none());
        assert!(!cli.strict);
        assert!(!cli.pretty);
        assert_eq!(cli.log_filter(), "ccache2json=warn");
    }

    #[test]
    fn test_cli_flags() {
        let cli = Cli::try_parse_from(["ccache2json", "--strict", "--pretty", "-v", "stats.txt"])
            .unwrap();
        assert_eq!(cli.file, Some(PathBuf::from("stats.txt")));
        assert!(cli.strict);
        assert!(cli.pretty);
        assert_eq!(cli.log_filter(), "ccache2json=debug");
    }

    #[test]
    fn test_cli_verbose_conflicts_with_quiet() {
        assert!(Cli::try_parse_from(["ccache2json", "-v", "-q"]).is_err());
    }

    #[test]
    fn test_convert_writes_one_json_line() {
        let mut buf = Vec::new();
        convert(SAMPLE, &Settings::default(), &mut buf).unwrap();
        let s = String::from_utf8(buf).unwrap();
        assert_eq!(s.lines().count(), 1);

        let v: Value = serde_json::from_str(s.trim_end()).unwrap();
        assert_eq!(v["cache_miss"], 207);
        assert_eq!(v["max_cache_size"], "5.0 GB");
    }

    #[test]
    fn test_convert_strict_failure_maps_to_dataerr() {
        let settings = Settings::default().with_overrides(true, false);
        let mut buf = Vec::new();
        let err = convert("cache miss 1\n", &settings, &mut buf).unwrap_err();
        assert!(matches!(err, RunError::Parse(_)));
        assert_eq!(err.exit_code(), EXIT_DATAERR);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_convert_lenient_partial_report() {
        let mut buf = Vec::new();
        convert("cache miss 1\n", &Settings::default(), &mut buf).unwrap();
        let v: Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(v["cache_miss"], 1);
        assert_eq!(v["files_in_cache"], 0);
        assert!(v["stats_zero_time"].is_null());
    }

    #[test]
    fn test_run_missing_input_file_maps_to_noinput() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.txt");
        let cli = Cli::try_parse_from(["ccache2json", path.to_str().unwrap()]).unwrap();
        let err = run(&cli).unwrap_err();
        assert_eq!(err.exit_code(), EXIT_NOINPUT);
    }

    #[test]
    fn test_run_bad_config_maps_to_config() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = dir.path().join("bad.toml");
        std::fs::write(&cfg, "[parser]\npolicy = 3\n").unwrap();
        let cli = Cli::try_parse_from(["ccache2json", "--config", cfg.to_str().unwrap()]).unwrap();
        let err = run(&cli).unwrap_err();
        assert_eq!(err.exit_code(), EXIT_CONFIG);
    }
}
