//! Subcommand implementations.
//!
//! Every command prints a single JSON object on stdout with `--json`; on
//! failure that object is `{"ok": false, "error": {"code", "message"}}` and
//! the process exits with status 1.

pub mod explain;
pub mod packages;
pub mod resolve;
pub mod version;

use miette::{IntoDiagnostic, Result};
use std::path::{Path, PathBuf};
use uniresolve_core::{find_config, ConfigError, EnvOverrides, Error, LoadedConfig, Resolver};

/// Options shared by all commands.
#[derive(Debug, Clone)]
pub struct Context {
    pub cwd: PathBuf,
    pub json: bool,
    /// `--config`: skip discovery and load this file.
    pub config: Option<PathBuf>,
    /// `--mode`: applied after configuration and environment.
    pub mode: Option<String>,
}

impl Context {
    /// Environment overrides with the command-line flags applied on top.
    pub fn env(&self) -> EnvOverrides {
        let mut env = EnvOverrides::from_env();
        if let Some(config) = &self.config {
            env.root = None;
            env.config = Some(self.absolute(config));
        }
        if let Some(mode) = &self.mode {
            env.mode = Some(mode.clone());
        }
        env
    }

    /// Find the configuration for the working directory and build a resolver.
    pub fn resolver(&self) -> Result<(LoadedConfig, Resolver), ConfigError> {
        let config = find_config(&self.cwd, &self.env())?;
        let resolver = config.resolver()?;
        Ok((config, resolver))
    }

    /// Resolve `path` against the working directory.
    pub fn absolute(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.cwd.join(path)
        }
    }
}

/// Report a command failure.
///
/// With `json`, prints the error object and exits; otherwise returns the
/// error as a diagnostic.
pub fn fail(json: bool, err: impl Into<Error>) -> Result<()> {
    let err: Error = err.into();
    if json {
        println!(
            "{}",
            serde_json::json!({
                "ok": false,
                "error": {
                    "code": err.code(),
                    "message": err.to_string()
                }
            })
        );
        std::process::exit(1);
    }
    Err::<(), Error>(err).into_diagnostic()
}
