#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::return_self_not_must_use)]

//! Path resolution for monorepo imports.
//!
//! A [`Registry`] describes the packages of a repository; a [`Resolver`]
//! rewrites import specifiers written in one package (`~/lib/x`, `own-name`,
//! `other-pkg/lib`) into paths the host tool can follow.

pub mod adapters;
pub mod config;
pub mod discover;
pub mod error;
pub mod manifest;
pub mod registry;
pub mod resolver;
pub mod version;

pub use config::{Mode, PackageEntry, PackageSpec, RawConfig, ResolverSettings};
pub use discover::{find_config, EnvOverrides, LoadedConfig};
pub use error::{ConfigError, Error, ResolveError};
pub use manifest::{FsManifests, Manifest, ManifestSource, NoManifests};
pub use registry::{Package, PackageDescriptor, Registry};
pub use resolver::{
    FsProbe, RealFs, ResolveOptions, ResolveTrace, ResolvedWithTrace, Resolver,
    EXPLAIN_SCHEMA_VERSION,
};
pub use version::VERSION;
