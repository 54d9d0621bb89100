//! POM augmentation: validate the document, make sure the
//! `project/build/plugins` ancestry exists, then inject the Surefire and
//! JaCoCo plugins at their latest release versions.
//!
//! Injection replaces any existing plugin with the same artifactId rather
//! than merging into it, so hand-authored configuration on those two
//! plugins is discarded. The whole tree lives for one call and is thrown
//! away on error, which keeps partial mutation harmless.

use thiserror::Error;

use crate::registry::{ResolveError, VersionResolver};
use crate::xml::{Document, Element, Node, XmlError};

pub const REQUIRED_MODEL_VERSION: &str = "4.0.0";

/// Two-part Maven coordinate for a build plugin.
#[derive(Clone, Copy, Debug)]
pub struct PluginCoordinates {
    pub group_id: &'static str,
    pub artifact_id: &'static str,
}

pub const SUREFIRE_PLUGIN: PluginCoordinates = PluginCoordinates {
    group_id: "org.apache.maven.plugins",
    artifact_id: "maven-surefire-plugin",
};

pub const JACOCO_PLUGIN: PluginCoordinates = PluginCoordinates {
    group_id: "org.jacoco",
    artifact_id: "jacoco-maven-plugin",
};

/// A named binding of a plugin goal to a lifecycle phase.
#[derive(Clone, Copy, Debug)]
pub struct ExecutionSpec {
    pub id: &'static str,
    pub goal: &'static str,
    pub phase: Option<&'static str>,
}

/// Lifecycle bindings that make JaCoCo instrument the test run and emit
/// its report.
pub const JACOCO_EXECUTIONS: &[ExecutionSpec] = &[
    ExecutionSpec {
        id: "default-prepare-agent",
        goal: "prepare-agent",
        phase: None,
    },
    ExecutionSpec {
        id: "default-report",
        goal: "report",
        phase: Some("test"),
    },
];

/// Why a POM could not be augmented.
#[derive(Debug, Error)]
pub enum PomError {
    #[error("can't parse POM document: {0}")]
    Parse(#[from] XmlError),
    #[error("required element <{0}> is missing")]
    MissingElement(&'static str),
    #[error("element <{element}> must be {want}, got {got:?}")]
    InvalidValue {
        element: &'static str,
        got: String,
        want: &'static str,
    },
    #[error("can't configure {artifact_id}: {source}")]
    Injection {
        artifact_id: &'static str,
        source: ResolveError,
    },
}

/// Augment a POM so `mvn clean test` runs Surefire and collects JaCoCo
/// coverage. Returns the serialized document; produces no output bytes on
/// any failure.
pub fn configure_plugins(
    input: &[u8],
    resolver: &dyn VersionResolver,
) -> Result<Vec<u8>, PomError> {
    let mut doc = Document::parse(input)?;
    validate(&doc)?;

    let build = ensure_child(&mut doc.root, "build");
    let plugins = ensure_child(build, "plugins");

    inject_plugin(plugins, SUREFIRE_PLUGIN, resolver)?;
    let jacoco = inject_plugin(plugins, JACOCO_PLUGIN, resolver)?;
    jacoco.push_element(executions_block(JACOCO_EXECUTIONS));

    Ok(doc.to_bytes()?)
}

/// Check the minimal structural contract: a `project` root carrying a
/// `modelVersion` equal to [`REQUIRED_MODEL_VERSION`]. Non-mutating.
fn validate(doc: &Document) -> Result<(), PomError> {
    if doc.root.name != "project" {
        return Err(PomError::MissingElement("project"));
    }
    let model_version = doc
        .root
        .child("modelVersion")
        .ok_or(PomError::MissingElement("modelVersion"))?;
    let got = model_version.text();
    if got != REQUIRED_MODEL_VERSION {
        return Err(PomError::InvalidValue {
            element: "modelVersion",
            got,
            want: REQUIRED_MODEL_VERSION,
        });
    }
    Ok(())
}

/// Get-or-append: return the first child element with the given name,
/// creating an empty one at the end of the child list when absent.
fn ensure_child<'a>(parent: &'a mut Element, name: &str) -> &'a mut Element {
    let index = parent
        .children
        .iter()
        .position(|node| matches!(node, Node::Element(element) if element.name == name));
    let index = match index {
        Some(index) => index,
        None => {
            parent.children.push(Node::Element(Element::new(name)));
            parent.children.len() - 1
        }
    };
    match &mut parent.children[index] {
        Node::Element(element) => element,
        _ => unreachable!("index points at an element child"),
    }
}

/// Replace-then-append a plugin declaration: any existing plugin with the
/// same artifactId is removed, and a fresh one with the resolver's latest
/// release version becomes the last child of `plugins`.
fn inject_plugin<'a>(
    plugins: &'a mut Element,
    coordinates: PluginCoordinates,
    resolver: &dyn VersionResolver,
) -> Result<&'a mut Element, PomError> {
    plugins.children.retain(|node| {
        !matches!(node, Node::Element(element)
            if element.name == "plugin" && plugin_artifact_id(element) == coordinates.artifact_id)
    });

    let version = resolver
        .latest_release_version(coordinates.artifact_id)
        .map_err(|source| PomError::Injection {
            artifact_id: coordinates.artifact_id,
            source,
        })?;

    let mut plugin = Element::new("plugin");
    plugin
        .children
        .push(Node::Element(Element::with_text("groupId", coordinates.group_id)));
    plugin.children.push(Node::Element(Element::with_text(
        "artifactId",
        coordinates.artifact_id,
    )));
    plugin
        .children
        .push(Node::Element(Element::with_text("version", version)));
    Ok(plugins.push_element(plugin))
}

fn plugin_artifact_id(plugin: &Element) -> String {
    plugin
        .child("artifactId")
        .map(Element::text)
        .unwrap_or_default()
}

/// Build an `executions` subtree from descriptors: per execution an `id`,
/// a `goals` list with one `goal`, then a `phase` only when present.
/// Pure and deterministic.
fn executions_block(specs: &[ExecutionSpec]) -> Element {
    let mut executions = Element::new("executions");
    for spec in specs {
        let mut execution = Element::new("execution");
        execution
            .children
            .push(Node::Element(Element::with_text("id", spec.id)));
        let mut goals = Element::new("goals");
        goals
            .children
            .push(Node::Element(Element::with_text("goal", spec.goal)));
        execution.children.push(Node::Element(goals));
        if let Some(phase) = spec.phase {
            execution
                .children
                .push(Node::Element(Element::with_text("phase", phase)));
        }
        executions.children.push(Node::Element(execution));
    }
    executions
}
