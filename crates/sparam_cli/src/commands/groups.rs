//! Group commands - Declare, rename and remove parameter groups.

use anyhow::Result;
use clap::Args;
use tracing::info;

use sparam_format::GroupRecord;

use super::{resolve_group, CommandContext};

#[derive(Args)]
pub struct AddGroupArgs {
    /// Display name of the group
    #[arg(short, long)]
    name: String,

    /// Group id (defaults to one past the highest id in use)
    #[arg(long)]
    id: Option<u32>,
}

#[derive(Args)]
pub struct RenameGroupArgs {
    /// Group to rename (id or name)
    #[arg(short, long)]
    group: String,

    /// New display name
    #[arg(short, long)]
    name: String,
}

#[derive(Args)]
pub struct RemoveGroupArgs {
    /// Group to remove (id or name)
    #[arg(short, long)]
    group: String,
}

pub fn add(ctx: &CommandContext, args: AddGroupArgs) -> Result<()> {
    let (path, mut doc) = ctx.load()?;

    let id = args.id.unwrap_or_else(|| doc.next_group_id());
    info!("Adding group {} '{}'", id, args.name);

    doc.add_group(GroupRecord::new(id, &args.name))?;
    ctx.save(&path, &doc)?;

    ctx.say(format!("✅ Group '{}' added with id {}", args.name, id));
    Ok(())
}

pub fn rename(ctx: &CommandContext, args: RenameGroupArgs) -> Result<()> {
    let (path, mut doc) = ctx.load()?;

    let id = resolve_group(&doc, &args.group)?;
    info!("Renaming group {} to '{}'", id, args.name);

    doc.rename_group(id, &args.name)?;
    ctx.save(&path, &doc)?;

    ctx.say(format!("✅ Group {} renamed to '{}'", id, args.name));
    Ok(())
}

pub fn remove(ctx: &CommandContext, args: RemoveGroupArgs) -> Result<()> {
    let (path, mut doc) = ctx.load()?;

    let id = resolve_group(&doc, &args.group)?;
    info!("Removing group {}", id);

    let removed = doc.remove_group(id)?;
    ctx.save(&path, &doc)?;

    ctx.say(format!("✅ Group '{}' ({}) removed", removed.name, removed.id));
    Ok(())
}
