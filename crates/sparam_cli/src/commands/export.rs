//! Export command - Print records as JSON.

use anyhow::Result;
use clap::Args;

use sparam_format::SharedParamWriter;

use super::CommandContext;

#[derive(Args)]
pub struct ExportArgs {
    /// Pretty-print the JSON
    #[arg(long)]
    pretty: bool,
}

pub fn execute(ctx: &CommandContext, args: ExportArgs) -> Result<()> {
    let (_path, doc) = ctx.load()?;
    println!("{}", SharedParamWriter::to_json(&doc, args.pretty)?);
    Ok(())
}
