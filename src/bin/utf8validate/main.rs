//! utf8validate CLI tool for certifying files as well-formed UTF-8.

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod text_validate;
use text_validate::{exit_codes, ValidateUtf8Args};

#[derive(Debug, Parser)]
#[command(name = "utf8validate")]
#[command(about = "Validate that a file is well-formed UTF-8", long_about = None)]
#[command(version)]
struct Cli {
    #[command(flatten)]
    args: ValidateUtf8Args,

    /// Log validator internals to stderr (overrides RUST_LOG)
    #[arg(short, long)]
    verbose: bool,
}

/// Install the stderr log subscriber. `RUST_LOG` applies unless `--verbose`.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("utf8validate=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            let code = if e.use_stderr() {
                exit_codes::INVALID_ARGS
            } else {
                exit_codes::SUCCESS
            };
            std::process::exit(code);
        }
    };

    init_logging(cli.verbose);

    let code = match text_validate::run(cli.args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:?}");
            exit_codes::IO_ERROR
        }
    };
    std::process::exit(code);
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn parses_full_invocation() {
        let cli = Cli::try_parse_from([
            "utf8validate",
            "--fail-fast",
            "--buffer-size",
            "4096",
            "-v",
            "data.txt",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert!(cli.args.fail_fast);
        assert_eq!(cli.args.buffer_size, 4096);
        assert_eq!(cli.args.path.to_str(), Some("data.txt"));
    }

    #[test]
    fn short_flags() {
        let cli = Cli::try_parse_from(["utf8validate", "-f", "-b", "16", "-q", "x"]).unwrap();
        assert!(cli.args.fail_fast);
        assert!(cli.args.quiet);
        assert_eq!(cli.args.buffer_size, 16);
    }

    #[test]
    fn path_is_required() {
        let err = Cli::try_parse_from(["utf8validate", "-f"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
        assert!(err.use_stderr());
    }

    #[test]
    fn only_one_path() {
        let err = Cli::try_parse_from(["utf8validate", "a.txt", "b.txt"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownArgument);
    }

    #[test]
    fn non_numeric_buffer_size_is_rejected() {
        let err = Cli::try_parse_from(["utf8validate", "-b", "lots", "a.txt"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
    }

    #[test]
    fn oversized_buffer_size_is_rejected() {
        let err = Cli::try_parse_from(["utf8validate", "-b", "9223372036854775807", "a.txt"])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
        assert!(err.use_stderr());

        let cli = Cli::try_parse_from(["utf8validate", "-b", "2147483647", "a.txt"]).unwrap();
        assert_eq!(cli.args.buffer_size, i64::from(i32::MAX));
        let cli = Cli::try_parse_from(["utf8validate", "-b", "-1", "a.txt"]).unwrap();
        assert_eq!(cli.args.buffer_size, -1);
    }

    #[test]
    fn color_flags_conflict() {
        let err = Cli::try_parse_from(["utf8validate", "-C", "-M", "a.txt"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ArgumentConflict);
    }
}
