//! Specifier classification.

use crate::config::ResolverSettings;
use crate::registry::Package;

/// What a specifier refers to, relative to the importing package.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Specifier<'a> {
    /// `.`, `..`, `./...` or `../...`.
    Relative,
    /// The origin package's alias prefix, followed by `rest`.
    Prefixed { package: &'a Package, rest: &'a str },
    /// The origin package's own name, followed by `rest`.
    SelfRef { package: &'a Package, rest: &'a str },
    /// Anything else, including prefix/self matches whose toggle is off.
    Module,
}

impl Specifier<'_> {
    /// Short name for logs and traces.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Relative => "relative",
            Self::Prefixed { .. } => "prefix",
            Self::SelfRef { .. } => "self",
            Self::Module => "module",
        }
    }
}

/// If `target` is `token` or starts with `token/`, return what follows the token.
///
/// An empty token never matches.
pub(crate) fn strip_token<'a>(target: &'a str, token: &str) -> Option<&'a str> {
    if token.is_empty() {
        return None;
    }
    let rest = target.strip_prefix(token)?;
    (rest.is_empty() || rest.starts_with('/')).then_some(rest)
}

/// Whether `target` is a relative specifier.
#[must_use]
pub fn is_relative(target: &str) -> bool {
    strip_token(target, ".").is_some() || strip_token(target, "..").is_some()
}

/// Classify `target` as imported from a file inside `origin` (if any).
pub(crate) fn classify<'a>(
    target: &'a str,
    origin: Option<&'a Package>,
    settings: &ResolverSettings,
) -> Specifier<'a> {
    if is_relative(target) {
        return Specifier::Relative;
    }

    let Some(package) = origin else {
        return Specifier::Module;
    };

    if let Some(rest) = strip_token(target, &package.prefix) {
        return if settings.resolve_prefixes {
            Specifier::Prefixed { package, rest }
        } else {
            Specifier::Module
        };
    }

    if let Some(rest) = package.name.as_deref().and_then(|name| strip_token(target, name)) {
        return if settings.resolve_self {
            Specifier::SelfRef { package, rest }
        } else {
            Specifier::Module
        };
    }

    Specifier::Module
}
