//! `uniresolve resolve` command implementation.

use super::{fail, Context};
use miette::Result;
use std::path::Path;

/// Resolve `target` as imported from `from` and print the result.
pub fn run(ctx: &Context, target: &str, from: &Path, absolute: bool) -> Result<()> {
    let (_config, resolver) = match ctx.resolver() {
        Ok(loaded) => loaded,
        Err(e) => return fail(ctx.json, e),
    };
    let from = ctx.absolute(from);

    let resolved = match resolver.resolve(target, &from, !absolute) {
        Ok(resolved) => resolved,
        Err(e) => return fail(ctx.json, e),
    };

    if ctx.json {
        println!(
            "{}",
            serde_json::json!({
                "ok": true,
                "target": target,
                "from": from.to_string_lossy(),
                "resolved": resolved,
                "changed": resolved != target,
            })
        );
    } else {
        println!("{resolved}");
    }
    Ok(())
}
