//! CLI argument parsing.
//!
//! The CLI is intentionally thin: it resolves flags into [`RunOptions`]
//! and leaves all policy to the workflow, so the core stays reusable.

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use crate::workflow::RunOptions;

/// Default per-call timeout for registry lookups, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Parser, Debug)]
#[command(
    name = "pomcov",
    version,
    about = "Run a Maven test build with Surefire and JaCoCo injected into the POM",
    after_help = "Examples:\n  pomcov\n  pomcov --pom service/pom.xml\n  pomcov --skip-build"
)]
pub struct Args {
    /// Path to the POM to augment
    #[arg(long, value_name = "PATH", default_value = "pom.xml")]
    pub pom: PathBuf,

    /// Timeout for each registry lookup, in seconds
    #[arg(long, value_name = "SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// Override the version-registry endpoint
    #[arg(long, value_name = "URL")]
    pub registry_url: Option<String>,

    /// Augment and restore the POM without invoking Maven
    #[arg(long)]
    pub skip_build: bool,
}

impl Args {
    pub fn into_run_options(self) -> RunOptions {
        RunOptions {
            pom: self.pom,
            registry_timeout: Duration::from_secs(self.timeout_secs),
            registry_url: self.registry_url,
            skip_build: self.skip_build,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_tool_conventions() {
        let args = Args::parse_from(["pomcov"]);
        assert_eq!(args.pom, PathBuf::from("pom.xml"));
        assert_eq!(args.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert!(args.registry_url.is_none());
        assert!(!args.skip_build);
    }

    #[test]
    fn flags_flow_into_run_options() {
        let args = Args::parse_from([
            "pomcov",
            "--pom",
            "service/pom.xml",
            "--timeout-secs",
            "5",
            "--registry-url",
            "http://localhost:8080/components",
            "--skip-build",
        ]);
        let options = args.into_run_options();
        assert_eq!(options.pom, PathBuf::from("service/pom.xml"));
        assert_eq!(options.registry_timeout, Duration::from_secs(5));
        assert_eq!(
            options.registry_url.as_deref(),
            Some("http://localhost:8080/components")
        );
        assert!(options.skip_build);
    }
}
