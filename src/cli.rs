// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// We use the "derive" API which lets us define the CLI structure using
// a Rust struct and attributes (the #[...] things). There are no
// subcommands: the tool does one thing, audit a directory.
// =============================================================================

use crate::checker::ExternalOptions;
use crate::site::AuditOptions;
use clap::{ArgAction, Parser};
use log::LevelFilter;
use std::path::PathBuf;
use std::time::Duration;

// This struct represents our entire CLI application
#[derive(Parser, Debug)]
#[command(
    name = "site-link-audit",
    version,
    about = "Find broken links in a directory of static HTML files",
    long_about = "site-link-audit scans the *.html files directly inside a directory and reports \
                  references to local files that don't exist. With --check-external it also \
                  requests every unique http(s) URL and reports the ones that fail.\n\n\
                  Exit codes: 0 = clean, 2 = broken internal links, \
                  3 = broken external links (only with --check-external)."
)]
pub struct Cli {
    /// Directory containing the HTML files to scan
    #[arg(default_value = ".")]
    pub root: PathBuf,

    /// Also check http(s) URLs over the network
    #[arg(long)]
    pub check_external: bool,

    /// Max number of distinct external URLs to check
    #[arg(long, default_value_t = 80)]
    pub external_limit: usize,

    /// Delay in seconds between external requests
    #[arg(long, default_value_t = 0.15)]
    pub external_delay: f64,

    /// Timeout in seconds for each external request
    #[arg(long, default_value_t = 8.0)]
    pub timeout: f64,

    /// Print the report as JSON instead of text
    #[arg(long)]
    pub json: bool,

    /// More log output on stderr (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Log level selected by the -v flags.
    pub fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            _ => LevelFilter::Debug,
        }
    }

    /// Turns the flags into the options the audit runs with.
    pub fn audit_options(&self) -> AuditOptions {
        AuditOptions {
            check_external: self.check_external,
            external: ExternalOptions {
                limit: self.external_limit,
                delay: seconds(self.external_delay).unwrap_or(Duration::ZERO),
                timeout: seconds(self.timeout)
                    .filter(|t| !t.is_zero())
                    .unwrap_or_else(|| ExternalOptions::default().timeout),
            },
        }
    }
}

// Negative, NaN or absurdly large values become None
fn seconds(value: f64) -> Option<Duration> {
    Duration::try_from_secs_f64(value).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["site-link-audit"]);
        assert_eq!(cli.root, PathBuf::from("."));
        assert!(!cli.check_external);
        assert!(!cli.json);

        let options = cli.audit_options();
        assert_eq!(options.external, ExternalOptions::default());
        assert_eq!(cli.log_level(), LevelFilter::Warn);
    }

    #[test]
    fn test_external_flags() {
        let cli = Cli::parse_from([
            "site-link-audit",
            "public",
            "--check-external",
            "--external-limit",
            "5",
            "--external-delay",
            "0.5",
            "--timeout",
            "2",
            "-vv",
        ]);
        let options = cli.audit_options();
        assert!(options.check_external);
        assert_eq!(options.external.limit, 5);
        assert_eq!(options.external.delay, Duration::from_millis(500));
        assert_eq!(options.external.timeout, Duration::from_secs(2));
        assert_eq!(cli.root, PathBuf::from("public"));
        assert_eq!(cli.log_level(), LevelFilter::Debug);
    }

    #[test]
    fn test_bad_durations_fall_back() {
        let cli = Cli::parse_from(["site-link-audit", "--external-delay=-1", "--timeout=0"]);
        let options = cli.audit_options();
        assert_eq!(options.external.delay, Duration::ZERO);
        assert_eq!(options.external.timeout, Duration::from_secs(8));
    }
}
