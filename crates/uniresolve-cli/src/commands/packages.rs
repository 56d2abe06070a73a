//! `uniresolve packages` command implementation.
//!
//! Lists the packages of the discovered configuration, after globs are
//! expanded and manifests merged.

use super::{fail, Context};
use miette::Result;

pub fn run(ctx: &Context) -> Result<()> {
    let (config, resolver) = match ctx.resolver() {
        Ok(loaded) => loaded,
        Err(e) => return fail(ctx.json, e),
    };
    let settings = resolver.settings();
    let packages = resolver.packages();

    if ctx.json {
        println!(
            "{}",
            serde_json::json!({
                "ok": true,
                "config": config.path.to_string_lossy(),
                "root": config.root.to_string_lossy(),
                "mode": settings.mode,
                "packages": packages,
            })
        );
        return Ok(());
    }

    println!("Config: {}", config.path.display());
    println!("Mode: {}", settings.mode);
    println!();
    println!("Packages ({}):", packages.len());
    for pkg in packages {
        println!("  {}", pkg.name.as_deref().unwrap_or("(unnamed)"));
        println!("    {}", pkg.root.display());
        println!(
            "    source: {}  main: {}  dest: {}  prefix: {}",
            pkg.source,
            pkg.main,
            pkg.dest.as_deref().unwrap_or("-"),
            pkg.prefix
        );
    }
    Ok(())
}
