//! Maven executable discovery and invocation.

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Subcommands run against the augmented POM.
pub const MAVEN_GOALS: &[&str] = &["clean", "test"];

/// Run Maven with the given goals in the project directory, streaming its
/// output to the caller's stdout/stderr.
pub fn run_maven(project_dir: &Path, goals: &[&str]) -> Result<()> {
    let executable = maven_executable(project_dir)?;
    tracing::info!(
        executable = %executable.display(),
        goals = %goals.join(" "),
        "running Maven"
    );
    let status = Command::new(&executable)
        .args(goals)
        .current_dir(project_dir)
        .status()
        .with_context(|| format!("run {}", executable.display()))?;
    if !status.success() {
        bail!("Maven command `{}` failed with {status}", goals.join(" "));
    }
    Ok(())
}

/// Prefer the project's Maven wrapper; otherwise fall back to `mvn` on PATH.
fn maven_executable(project_dir: &Path) -> Result<PathBuf> {
    if let Some(wrapper) = wrapper_in(project_dir) {
        return Ok(wrapper);
    }
    which::which("mvn").context("mvn not found on PATH and no Maven wrapper in the project")
}

fn wrapper_in(project_dir: &Path) -> Option<PathBuf> {
    let name = if cfg!(windows) { "mvnw.cmd" } else { "mvnw" };
    let candidate = project_dir.join(name);
    candidate.is_file().then_some(candidate)
}
