//! CLI handler for validating a single file.

use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Instant;
use utf8validate::file::{self, Access, Options};
use utf8validate::text::{Flow, Outcome, Policy, ValidationHandler, Violation, MAX_BUFFER_SIZE};
use utf8validate::Error;

/// Validate a file for UTF-8 compliance.
#[derive(Debug, Parser)]
pub struct ValidateUtf8Args {
    /// File to validate
    pub path: PathBuf,

    /// Stop on the first validation error rather than reporting all errors
    #[arg(short, long)]
    pub fail_fast: bool,

    /// Size of the in-memory buffer for file data, in bytes (non-positive uses the default)
    #[arg(
        short,
        long,
        env = "UTF8VALIDATE_BUFFER_SIZE",
        default_value_t = 8192,
        allow_negative_numbers = true,
        value_parser = clap::value_parser!(i64).range(..=MAX_BUFFER_SIZE as i64)
    )]
    pub buffer_size: i64,

    /// Memory-map the file instead of streaming it through the buffer
    #[arg(short, long)]
    pub mmap: bool,

    /// Quiet mode: exit code only, no output
    #[arg(short, long)]
    pub quiet: bool,

    /// Force color output even when not a TTY
    #[arg(short = 'C', long = "color")]
    pub color: bool,

    /// Disable color output
    #[arg(short = 'M', long = "no-color", conflicts_with = "color")]
    pub no_color: bool,
}

impl ValidateUtf8Args {
    fn options(&self) -> Options {
        let access = if self.mmap {
            Access::Mapped
        } else {
            Access::Buffered
        };
        Options::default()
            .with_buffer_size(self.buffer_size)
            .with_access(access)
    }
}

/// Exit codes for the validate command.
pub mod exit_codes {
    /// UTF-8 is valid.
    pub const SUCCESS: i32 = 0;
    /// UTF-8 is invalid (validation error).
    pub const VALIDATION_ERROR: i32 = 1;
    /// Invalid arguments or file not found.
    pub const INVALID_ARGS: i32 = 2;
    /// I/O error while reading.
    pub const IO_ERROR: i32 = 3;
}

/// ANSI color codes for error output.
mod colors {
    pub const RESET: &str = "\x1b[0m";
    pub const ERROR: &str = "\x1b[1;31m"; // Bold red
    pub const LOCATION: &str = "\x1b[1;34m"; // Bold blue
    pub const SUCCESS: &str = "\x1b[1;32m"; // Bold green
}

/// Color scheme that can be disabled.
#[derive(Debug, Clone, Copy)]
pub struct ColorScheme {
    error: &'static str,
    location: &'static str,
    success: &'static str,
    reset: &'static str,
}

impl ColorScheme {
    pub fn new(use_color: bool) -> Self {
        if use_color {
            Self {
                error: colors::ERROR,
                location: colors::LOCATION,
                success: colors::SUCCESS,
                reset: colors::RESET,
            }
        } else {
            Self::plain()
        }
    }

    pub fn plain() -> Self {
        Self {
            error: "",
            location: "",
            success: "",
            reset: "",
        }
    }

    /// Pick a scheme for `stream` honoring `--color` / `--no-color`.
    fn for_stream(args: &ValidateUtf8Args, stream: atty::Stream) -> Self {
        let use_color = if args.no_color {
            false
        } else if args.color {
            true
        } else {
            atty::is(stream)
        };
        Self::new(use_color)
    }
}

/// Format one violation as a report line.
pub fn format_violation(label: &str, violation: &Violation, scheme: &ColorScheme) -> String {
    let location = match violation.offset {
        Some(offset) => format!("{}@{}", label, offset),
        None => format!("{}@EOF", label),
    };
    format!(
        "{}[{}]{} {}",
        scheme.location, location, scheme.reset, violation.kind
    )
}

/// Handler that writes each violation to `out` and applies `policy`.
pub struct ReportingHandler<W> {
    out: W,
    policy: Policy,
    quiet: bool,
    scheme: ColorScheme,
    count: u64,
    write_error: Option<io::Error>,
}

impl<W: Write> ReportingHandler<W> {
    pub fn new(out: W, policy: Policy, quiet: bool, scheme: ColorScheme) -> Self {
        Self {
            out,
            policy,
            quiet,
            scheme,
            count: 0,
            write_error: None,
        }
    }

    pub fn is_errored(&self) -> bool {
        self.count > 0
    }

    /// Surface any failure to write the report.
    pub fn finish(self) -> io::Result<W> {
        match self.write_error {
            Some(e) => Err(e),
            None => Ok(self.out),
        }
    }
}

impl<W: Write> ValidationHandler for ReportingHandler<W> {
    fn error(&mut self, label: &str, violation: &Violation) -> Flow {
        self.count += 1;
        if !self.quiet && self.write_error.is_none() {
            let line = format_violation(label, violation, &self.scheme);
            if let Err(e) = writeln!(self.out, "{}", line) {
                self.write_error = Some(e);
                return Flow::Abort;
            }
        }
        self.policy.flow()
    }
}

/// Run the validate command against the process's stdout and stderr.
pub fn run(args: ValidateUtf8Args) -> Result<i32> {
    let stdout = io::stdout();
    let stderr = io::stderr();
    run_with(args, &mut stdout.lock(), &mut stderr.lock())
}

/// Run the validate command, writing the report to `out` and diagnostics to
/// `err`.
pub fn run_with<O, E>(args: ValidateUtf8Args, out: &mut O, err: &mut E) -> Result<i32>
where
    O: Write,
    E: Write,
{
    let err_scheme = ColorScheme::for_stream(&args, atty::Stream::Stderr);
    let out_scheme = ColorScheme::for_stream(&args, atty::Stream::Stdout);
    let path = &args.path;

    let problem = if !path.exists() {
        Some("does not exist")
    } else if path.is_dir() {
        Some("is a directory")
    } else {
        None
    };
    if let Some(problem) = problem {
        if !args.quiet {
            writeln!(
                err,
                "{}error{}: file {} {}",
                err_scheme.error,
                err_scheme.reset,
                path.display(),
                problem
            )
            .context("failed to write to stderr")?;
        }
        return Ok(exit_codes::INVALID_ARGS);
    }

    if !args.quiet {
        writeln!(out, "Validating: {}", path.display()).context("failed to write to stdout")?;
    }

    let policy = Policy::from_fail_fast(args.fail_fast);
    let mut handler = ReportingHandler::new(&mut *out, policy, args.quiet, out_scheme);
    let start = Instant::now();
    let result = file::validate_path(path, &args.options(), &mut handler);
    let errored = handler.is_errored();
    handler.finish().context("failed to write report")?;

    let code = match result {
        Ok(Outcome::Valid) => {
            if !args.quiet {
                writeln!(
                    out,
                    "{}Valid OK{} (took {}ms)",
                    out_scheme.success,
                    out_scheme.reset,
                    start.elapsed().as_millis()
                )
                .context("failed to write to stdout")?;
            }
            exit_codes::SUCCESS
        }
        Ok(Outcome::Invalid { .. }) | Ok(Outcome::Aborted(_)) => {
            debug_assert!(errored);
            exit_codes::VALIDATION_ERROR
        }
        Err(Error::Open { path, source }) => {
            if !args.quiet {
                writeln!(
                    err,
                    "{}error{}: {}: {}",
                    err_scheme.error,
                    err_scheme.reset,
                    path.display(),
                    source
                )
                .context("failed to write to stderr")?;
            }
            exit_codes::INVALID_ARGS
        }
        Err(Error::Io(e)) => {
            if !args.quiet {
                writeln!(
                    err,
                    "{}error{}: {}: {}",
                    err_scheme.error,
                    err_scheme.reset,
                    path.display(),
                    e
                )
                .context("failed to write to stderr")?;
            }
            exit_codes::IO_ERROR
        }
    };

    tracing::debug!(exit_code = code, elapsed_ms = start.elapsed().as_millis() as u64, "done");
    Ok(code)
}
