//! Module-loader hook.
//!
//! A loader asks for the filename of `request` as required from `parent`;
//! the request is rewritten first and then handed to the loader's own
//! lookup, so results stay relative like hand-written specifiers.

use crate::error::ResolveError;
use crate::resolver::{FsProbe, Resolver};
use std::path::Path;
use tracing::debug;

/// Rewrite a loader request made from the file `parent`.
pub fn resolve_request<P: FsProbe>(
    resolver: &Resolver<P>,
    request: &str,
    parent: &Path,
) -> Result<String, ResolveError> {
    let resolved = resolver.resolve(request, parent, true)?;
    if resolved != request {
        debug!(request, resolved = %resolved, "transformed");
    }
    Ok(resolved)
}
