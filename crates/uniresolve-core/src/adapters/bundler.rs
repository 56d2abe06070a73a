//! Bundler request replacement.
//!
//! Bundlers only hand over requests that start with the alias prefix; those
//! are replaced with absolute paths so the bundler's own resolution can take
//! it from there. Package names are left to the bundler.

use crate::error::ResolveError;
use crate::resolver::{FsProbe, Resolver};
use std::path::Path;
use tracing::trace;

/// Replace `request` made from `issuer` if it starts with the alias prefix.
///
/// Returns `None` for requests the bundler should resolve unaided.
pub fn replace_request<P: FsProbe>(
    resolver: &Resolver<P>,
    request: &str,
    issuer: &Path,
) -> Result<Option<String>, ResolveError> {
    let prefix = resolver.settings().prefix.as_str();
    if prefix.is_empty() || !request.starts_with(prefix) {
        trace!(request, "not an alias request");
        return Ok(None);
    }
    resolver.resolve(request, issuer, false).map(Some)
}
