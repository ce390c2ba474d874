//! List command - Print parameters as a table.

use anyhow::Result;
use clap::Args;

use sparam_format::ParamRecord;

use super::{resolve_group, CommandContext};

#[derive(Args)]
pub struct ListArgs {
    /// Only parameters of this group (id or name)
    #[arg(short, long)]
    group: Option<String>,

    /// Include descriptions
    #[arg(long)]
    descriptions: bool,
}

pub fn execute(ctx: &CommandContext, args: ListArgs) -> Result<()> {
    let (_path, doc) = ctx.load()?;

    let group = match &args.group {
        Some(group) => Some(resolve_group(&doc, group)?),
        None => None,
    };

    println!(
        "{:<36}  {:<40}  {:<14}  {:<5}  FLAGS",
        "GUID", "NAME", "DATATYPE", "GROUP"
    );
    for param in doc.params().filter(|p| group.map_or(true, |g| p.group == g)) {
        println!(
            "{:<36}  {:<40}  {:<14}  {:<5}  {}",
            param.guid,
            param.name,
            param.data_type,
            param.group,
            flags(param)
        );
        if args.descriptions && !param.description.is_empty() {
            println!("{:<36}  {}", "", param.description);
        }
    }

    Ok(())
}

/// Compact flag column: visible, user modifiable, hide when no value.
fn flags(param: &ParamRecord) -> String {
    [
        (param.visible, 'V'),
        (param.user_modifiable, 'M'),
        (param.hide_when_no_value, 'H'),
    ]
    .iter()
    .map(|(on, c)| if *on { *c } else { '-' })
    .collect()
}
