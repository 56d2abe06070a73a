//! Resolution tracing for the explain command.
//!
//! Provides step-by-step traces of a single resolution, for debugging why a
//! specifier was (or wasn't) rewritten.

use serde::Serialize;
use std::path::PathBuf;

/// Schema version for the explain output format.
/// Bump when the trace structure changes incompatibly.
pub const EXPLAIN_SCHEMA_VERSION: u32 = 1;

/// A single step in the resolution trace.
#[derive(Debug, Clone, Serialize)]
pub struct ResolveTraceStep {
    /// Step name (e.g., "classify_specifier", "direct_candidate")
    pub step: &'static str,
    /// Whether this step matched or rewrote anything
    pub ok: bool,
    /// Human-readable description of what happened
    pub detail: String,
    /// File path involved in this step, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl ResolveTraceStep {
    /// Create a new trace step.
    pub fn new(step: &'static str, ok: bool, detail: impl Into<String>) -> Self {
        Self {
            step,
            ok,
            detail: detail.into(),
            path: None,
        }
    }

    /// Set the path for this step.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }
}

/// Warning generated during resolution.
#[derive(Debug, Clone, Serialize)]
pub struct TraceWarning {
    /// Warning code (see [`warning_codes`])
    pub code: &'static str,
    /// Human-readable warning message
    pub message: String,
}

/// Complete resolution trace.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResolveTrace {
    /// Ordered list of resolution steps
    pub steps: Vec<ResolveTraceStep>,
    /// Warnings generated during resolution
    pub warnings: Vec<TraceWarning>,
}

impl ResolveTrace {
    /// Create a new empty trace.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a step to the trace.
    pub fn add_step(&mut self, step: ResolveTraceStep) {
        self.steps.push(step);
    }

    /// Add a warning to the trace.
    pub fn add_warning(&mut self, code: &'static str, message: impl Into<String>) {
        self.warnings.push(TraceWarning {
            code,
            message: message.into(),
        });
    }

    /// Names of the recorded steps, in order.
    #[must_use]
    pub fn step_names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|s| s.step).collect()
    }
}

/// Records into a trace when one was requested.
///
/// Step details are built lazily so untraced resolution never formats them.
pub(crate) struct Recorder<'a>(Option<&'a mut ResolveTrace>);

impl<'a> Recorder<'a> {
    pub(crate) fn off() -> Self {
        Self(None)
    }

    pub(crate) fn on(trace: &'a mut ResolveTrace) -> Self {
        Self(Some(trace))
    }

    pub(crate) fn step(
        &mut self,
        step: &'static str,
        ok: bool,
        path: Option<&std::path::Path>,
        detail: impl FnOnce() -> String,
    ) {
        if let Some(trace) = self.0.as_deref_mut() {
            let mut entry = ResolveTraceStep::new(step, ok, detail());
            entry.path = path.map(std::path::Path::to_path_buf);
            trace.add_step(entry);
        }
    }

    pub(crate) fn warn(&mut self, code: &'static str, message: impl FnOnce() -> String) {
        if let Some(trace) = self.0.as_deref_mut() {
            trace.add_warning(code, message());
        }
    }
}

/// Step names used in resolution tracing.
pub mod steps {
    pub const REALPATH_ORIGIN: &str = "realpath_origin";
    pub const FIND_ORIGIN_PACKAGE: &str = "find_origin_package";
    pub const CLASSIFY_SPECIFIER: &str = "classify_specifier";
    pub const RESOLVE_PREFIX: &str = "resolve_prefix";
    pub const FIND_TARGET_PACKAGE: &str = "find_target_package";
    pub const DIRECT_CANDIDATE: &str = "direct_candidate";
    pub const SUBSTITUTE_PACKAGE_DIR: &str = "substitute_package_dir";
    pub const COLLAPSE_MAIN: &str = "collapse_main";
    pub const FINALIZE: &str = "finalize";
}

/// Warning codes for resolution traces.
pub mod warning_codes {
    /// The origin file does not exist, so symlinks could not be resolved.
    pub const ORIGIN_MISSING: &str = "origin_missing";
    /// Production mode, but the target package has no `dest` configured.
    pub const NO_DEST: &str = "no_dest";
    /// The specifier matched a package but nothing rewrote it.
    pub const NOT_REWRITTEN: &str = "not_rewritten";
}
