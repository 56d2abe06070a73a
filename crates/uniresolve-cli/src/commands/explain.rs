//! `uniresolve explain` command implementation.
//!
//! Resolves one specifier and prints every decision the resolver took.

use super::{fail, Context};
use miette::Result;
use std::path::Path;
use uniresolve_core::{ResolvedWithTrace, EXPLAIN_SCHEMA_VERSION};

pub fn run(ctx: &Context, target: &str, from: &Path, absolute: bool) -> Result<()> {
    let (_config, resolver) = match ctx.resolver() {
        Ok(loaded) => loaded,
        Err(e) => return fail(ctx.json, e),
    };
    let from = ctx.absolute(from);

    let result = match resolver.resolve_with_trace(target, &from, !absolute) {
        Ok(result) => result,
        Err(e) => return fail(ctx.json, e),
    };

    if ctx.json {
        println!(
            "{}",
            serde_json::json!({
                "ok": true,
                "schema_version": EXPLAIN_SCHEMA_VERSION,
                "target": target,
                "from": from.to_string_lossy(),
                "mode": resolver.settings().mode,
                "relative": !absolute,
                "resolved": result.resolved,
                "trace": result.trace,
            })
        );
    } else {
        print_explain_human(target, &from, &result);
    }
    Ok(())
}

/// Print the trace in human-readable format.
fn print_explain_human(target: &str, from: &Path, result: &ResolvedWithTrace) {
    println!("Specifier: {target}");
    println!("From: {}", from.display());
    if result.resolved == target {
        println!("Resolved: {} (unchanged)", result.resolved);
    } else {
        println!("Resolved: {}", result.resolved);
    }
    println!();

    println!("Resolution trace:");
    for (i, step) in result.trace.steps.iter().enumerate() {
        let status = if step.ok { "OK" } else { "SKIP" };
        println!("  {}. [{}] {}: {}", i + 1, status, step.step, step.detail);
        if let Some(ref path) = step.path {
            println!("      path: {}", path.display());
        }
    }

    if !result.trace.warnings.is_empty() {
        println!();
        println!("Warnings:");
        for warning in &result.trace.warnings {
            println!("  [{}] {}", warning.code, warning.message);
        }
    }
}
