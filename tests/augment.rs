//! End-to-end augmentation of a realistic POM through the public API.

use pomcov::pom::{self, JACOCO_PLUGIN, SUREFIRE_PLUGIN};
use pomcov::registry::{ResolveError, VersionResolver};
use pomcov::xml::Document;

/// Resolver double returning the same version for every artifactId.
struct StubResolver(&'static str);

impl VersionResolver for StubResolver {
    fn latest_release_version(&self, _artifact_id: &str) -> Result<String, ResolveError> {
        Ok(self.0.to_string())
    }
}

struct NotFoundResolver;

impl VersionResolver for NotFoundResolver {
    fn latest_release_version(&self, artifact_id: &str) -> Result<String, ResolveError> {
        Err(ResolveError::NotFound {
            artifact_id: artifact_id.to_string(),
        })
    }
}

const SPRING_STYLE_POM: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<project xmlns="http://maven.apache.org/POM/4.0.0" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"
    xsi:schemaLocation="http://maven.apache.org/POM/4.0.0 https://maven.apache.org/xsd/maven-4.0.0.xsd">
    <modelVersion>4.0.0</modelVersion>
    <groupId>com.example</groupId>
    <artifactId>demo</artifactId>
    <version>0.0.1-SNAPSHOT</version>
    <name>demo</name>
    <dependencies>
        <dependency>
            <groupId>org.junit.jupiter</groupId>
            <artifactId>junit-jupiter</artifactId>
            <scope>test</scope>
        </dependency>
    </dependencies>
</project>"#;

#[test]
fn minimal_pom_gains_both_plugins_and_coverage_executions() {
    let input = b"<project><modelVersion>4.0.0</modelVersion></project>";
    let out = pom::configure_plugins(input, &StubResolver("1.0.0")).expect("augment");
    let doc = Document::parse(&out).expect("re-parse output");

    let plugins = doc
        .root
        .child("build")
        .expect("build")
        .child("plugins")
        .expect("plugins");
    let artifact_ids: Vec<String> = plugins
        .children_named("plugin")
        .map(|plugin| plugin.child("artifactId").expect("artifactId").text())
        .collect();
    assert_eq!(
        artifact_ids,
        [SUREFIRE_PLUGIN.artifact_id, JACOCO_PLUGIN.artifact_id]
    );
    for plugin in plugins.children_named("plugin") {
        assert_eq!(plugin.child("version").expect("version").text(), "1.0.0");
    }

    let jacoco = plugins
        .children_named("plugin")
        .find(|plugin| {
            plugin
                .child("artifactId")
                .is_some_and(|id| id.text() == JACOCO_PLUGIN.artifact_id)
        })
        .expect("jacoco plugin");
    let ids: Vec<String> = jacoco
        .child("executions")
        .expect("executions")
        .children_named("execution")
        .map(|execution| execution.child("id").expect("id").text())
        .collect();
    assert_eq!(ids, ["default-prepare-agent", "default-report"]);
}

#[test]
fn realistic_pom_keeps_its_metadata_and_namespace() {
    let out = pom::configure_plugins(SPRING_STYLE_POM.as_bytes(), &StubResolver("3.2.5"))
        .expect("augment");
    let rendered = String::from_utf8(out.clone()).expect("utf8 output");
    assert!(rendered.starts_with("<?xml"));
    assert!(rendered.contains(r#"xmlns="http://maven.apache.org/POM/4.0.0""#));

    let doc = Document::parse(&out).expect("re-parse output");
    assert_eq!(doc.root.child("artifactId").expect("artifactId").text(), "demo");
    assert_eq!(
        doc.root
            .child("dependencies")
            .expect("dependencies")
            .children_named("dependency")
            .count(),
        1
    );
    let plugins = doc
        .root
        .child("build")
        .expect("build")
        .child("plugins")
        .expect("plugins");
    assert_eq!(plugins.children_named("plugin").count(), 2);
}

#[test]
fn unknown_artifact_produces_no_output() {
    let input = b"<project><modelVersion>4.0.0</modelVersion></project>";
    let err = pom::configure_plugins(input, &NotFoundResolver).unwrap_err();
    assert!(err.to_string().contains(SUREFIRE_PLUGIN.artifact_id));
}
