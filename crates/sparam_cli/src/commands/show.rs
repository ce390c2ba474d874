//! Show command - Summarize a shared parameter file.

use anyhow::Result;
use clap::Args;
use tracing::info;

use super::CommandContext;

#[derive(Args)]
pub struct ShowArgs {}

pub fn execute(ctx: &CommandContext, _args: ShowArgs) -> Result<()> {
    let (path, doc) = ctx.load()?;
    info!("Showing {:?}", path);

    println!("📄 {}", path.display());
    if let Some(meta) = doc.meta() {
        println!("   Version {} (minimum {})", meta.version, meta.min_version);
    }
    println!("   Encoding: {:?}, line endings: {:?}", doc.encoding(), doc.line_ending());
    println!();

    println!("Groups:");
    for group in doc.groups() {
        println!(
            "  {:>4}  {:<30} {} parameter(s)",
            group.id,
            group.name,
            doc.params_in_group(group.id).count()
        );
    }
    println!();
    println!(
        "Total: {} group(s), {} parameter(s)",
        doc.groups().count(),
        doc.params().count()
    );

    Ok(())
}
