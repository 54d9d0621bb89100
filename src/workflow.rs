//! The end-to-end run: back up the POM, augment it, run the test build,
//! restore the original.
//!
//! The backup rename happens before any mutation, and restoration runs on
//! both success and failure. When restoration itself fails the backup file
//! stays on disk and the user is told where to find it.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::maven;
use crate::pom;
use crate::registry::{CentralRegistryClient, VersionResolver};

/// Sibling of the POM holding the untouched original during a run.
pub const BACKUP_FILENAME: &str = "pom_backup.xml";

/// One run's inputs, resolved from the CLI.
#[derive(Debug)]
pub struct RunOptions {
    /// Path to the POM to augment.
    pub pom: PathBuf,
    /// Per-call timeout for registry lookups.
    pub registry_timeout: Duration,
    /// Registry endpoint override.
    pub registry_url: Option<String>,
    /// Augment and restore without invoking Maven.
    pub skip_build: bool,
}

pub fn run(options: &RunOptions) -> Result<()> {
    let resolver = match &options.registry_url {
        Some(url) => CentralRegistryClient::with_url(url.clone(), options.registry_timeout),
        None => CentralRegistryClient::new(options.registry_timeout),
    };
    run_with_resolver(options, &resolver)
}

pub fn run_with_resolver(options: &RunOptions, resolver: &dyn VersionResolver) -> Result<()> {
    let pom = options.pom.as_path();
    let project_dir = project_dir_of(pom);
    let backup = project_dir.join(BACKUP_FILENAME);

    tracing::info!(pom = %pom.display(), backup = %backup.display(), "backing up the original POM");
    fs::rename(pom, &backup)
        .with_context(|| format!("rename {} to {}", pom.display(), backup.display()))?;

    let result = augment_and_build(pom, &backup, &project_dir, resolver, options.skip_build);
    restore(pom, &backup);
    result
}

fn augment_and_build(
    pom: &Path,
    backup: &Path,
    project_dir: &Path,
    resolver: &dyn VersionResolver,
    skip_build: bool,
) -> Result<()> {
    tracing::info!(pom = %pom.display(), "updating the POM to include the build plugins");
    let original = fs::read(backup).with_context(|| format!("read {}", backup.display()))?;
    let updated = pom::configure_plugins(&original, resolver)
        .with_context(|| format!("update {}", pom.display()))?;
    fs::write(pom, &updated).with_context(|| format!("write {}", pom.display()))?;

    if skip_build {
        tracing::info!("skipping the Maven build");
        return Ok(());
    }
    maven::run_maven(project_dir, maven::MAVEN_GOALS)
}

/// Put the original POM back. Best-effort: a failure here must not mask the
/// run's own result, so it is logged and the backup is left for the user.
fn restore(pom: &Path, backup: &Path) {
    if pom.exists() {
        if let Err(err) = fs::remove_file(pom) {
            tracing::warn!(pom = %pom.display(), %err, "can't remove the augmented POM");
        }
    }
    if let Err(err) = fs::rename(backup, pom) {
        tracing::warn!(
            backup = %backup.display(),
            %err,
            "can't restore the original POM; the backup is left in place for manual recovery"
        );
    }
}

fn project_dir_of(pom: &Path) -> PathBuf {
    match pom.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ResolveError;
    use tempfile::TempDir;

    struct FixedResolver;

    impl VersionResolver for FixedResolver {
        fn latest_release_version(&self, _artifact_id: &str) -> Result<String, ResolveError> {
            Ok("1.0.0".to_string())
        }
    }

    fn options(pom: PathBuf) -> RunOptions {
        RunOptions {
            pom,
            registry_timeout: Duration::from_secs(30),
            registry_url: None,
            skip_build: true,
        }
    }

    #[test]
    fn restores_the_original_pom_after_a_run() {
        let dir = TempDir::new().expect("tempdir");
        let pom = dir.path().join("pom.xml");
        let original = "<project><modelVersion>4.0.0</modelVersion></project>";
        fs::write(&pom, original).expect("write pom");

        run_with_resolver(&options(pom.clone()), &FixedResolver).expect("run");

        assert_eq!(fs::read_to_string(&pom).expect("read pom"), original);
        assert!(!dir.path().join(BACKUP_FILENAME).exists());
    }

    #[test]
    fn restores_the_original_pom_when_augmentation_fails() {
        let dir = TempDir::new().expect("tempdir");
        let pom = dir.path().join("pom.xml");
        let original = "<project><modelVersion>9.9.9</modelVersion></project>";
        fs::write(&pom, original).expect("write pom");

        let err = run_with_resolver(&options(pom.clone()), &FixedResolver).unwrap_err();
        assert!(err.to_string().contains("update"));

        assert_eq!(fs::read_to_string(&pom).expect("read pom"), original);
        assert!(!dir.path().join(BACKUP_FILENAME).exists());
    }

    #[test]
    fn fails_when_the_pom_is_missing() {
        let dir = TempDir::new().expect("tempdir");
        let err =
            run_with_resolver(&options(dir.path().join("pom.xml")), &FixedResolver).unwrap_err();
        assert!(err.to_string().contains("rename"));
    }
}
