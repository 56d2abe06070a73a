use miette::Result;
use uniresolve_core::version::version_string;
use uniresolve_core::VERSION;

pub fn run(json: bool) -> Result<()> {
    if json {
        println!(
            "{}",
            serde_json::json!({
                "ok": true,
                "version": VERSION,
            })
        );
    } else {
        println!("{}", version_string());
    }
    Ok(())
}
