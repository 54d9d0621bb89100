//! Augments a Maven POM with Surefire and JaCoCo at their latest release
//! versions, then runs the test build against the augmented descriptor.
//!
//! The core is [`pom::configure_plugins`]: bytes in, augmented bytes out,
//! with the version lookup behind the [`registry::VersionResolver`] trait.
//! Everything touching the filesystem or a subprocess lives in
//! [`workflow`] and [`maven`].

pub mod cli;
pub mod maven;
pub mod pom;
pub mod registry;
pub mod workflow;
pub mod xml;
