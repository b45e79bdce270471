use anyhow::{bail, Result};
use clap::error::ErrorKind;
use time::macros::format_description;
use tracing_subscriber::fmt::time::LocalTime;
use tracing_subscriber::EnvFilter;

use crate::report::{RunResult, Severity};

/// Installs the tracing subscriber. Logs go to stderr; stdout is reserved for
/// the status message read by the monitoring system.
pub fn setup_logging(verbose: bool) {
    let default_level = if verbose { "info" } else { "error" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(LocalTime::new(format_description!(
            "[hour]:[minute]:[second].[subsecond digits:3]"
        )))
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Whether a parse failure is a real usage error rather than `--help` or
/// `--version` output.
pub fn is_usage_error(err: &clap::Error) -> bool {
    !matches!(
        err.kind(),
        ErrorKind::DisplayHelp
            | ErrorKind::DisplayVersion
            | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
    )
}

/// Status reported for arguments that could not be parsed. Exit code 2 would
/// read as CRITICAL to the monitoring system, so usage errors are UNKNOWN.
pub fn usage_error_result(err: &clap::Error) -> RunResult {
    RunResult::new(
        Severity::Unknown,
        format!("{}: {}", Severity::Unknown, err.to_string().trim_end()),
    )
}

pub fn validate_args(args: &crate::args::Args) -> Result<()> {
    if args.timeout == Some(0) {
        bail!("--timeout must be greater than 0");
    }

    if let Some(domain) = args.domains.iter().find(|d| d.trim().is_empty()) {
        bail!("--domain must not be empty (got {:?})", domain);
    }

    if args.pmgsh.trim().is_empty() {
        bail!("--pmgsh must not be empty");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::Args;
    use clap::Parser;

    #[test]
    fn defaults_are_valid() {
        assert!(validate_args(&Args::parse_from(["check-pmg"])).is_ok());
    }

    #[test]
    fn rejects_zero_timeout() {
        let args = Args::parse_from(["check-pmg", "--timeout", "0"]);
        let err = validate_args(&args).unwrap_err();
        assert!(err.to_string().contains("--timeout"));
    }

    #[test]
    fn rejects_blank_domain() {
        let args = Args::parse_from(["check-pmg", "-d", "a.com", "-d", " "]);
        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn rejects_empty_cache_path() {
        let err = Args::try_parse_from(["check-pmg", "--cache-file", ""]).unwrap_err();
        assert!(is_usage_error(&err));
    }

    #[test]
    fn bad_flag_value_is_usage_error() {
        let err = Args::try_parse_from(["check-pmg", "--maxcount", "abc"]).unwrap_err();
        assert!(is_usage_error(&err));
    }

    #[test]
    fn usage_error_maps_to_unknown() {
        let err = Args::try_parse_from(["check-pmg", "--maxcount", "abc"]).unwrap_err();
        assert_eq!(err.exit_code(), 2);

        let result = usage_error_result(&err);
        assert_eq!(result.severity(), Severity::Unknown);
        assert_eq!(result.exit_code(), 3);
        assert!(result.render().starts_with("Unknown: "));
        assert!(result.render().contains("abc"));
    }

    #[test]
    fn help_and_version_are_not_usage_errors() {
        let help = Args::try_parse_from(["check-pmg", "--help"]).unwrap_err();
        assert!(!is_usage_error(&help));

        let version = Args::try_parse_from(["check-pmg", "--version"]).unwrap_err();
        assert!(!is_usage_error(&version));
    }
}
