//! Parameter commands - Add, update and remove parameter definitions.

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use sparam_format::{DataType, Document, Guid, ParamRecord};

use super::{parse_guid, resolve_group, CommandContext};

#[derive(Args)]
pub struct AddParamArgs {
    /// Parameter name, e.g. Flamingo.TitleBlock.Margins
    #[arg(short, long)]
    name: String,

    /// Group (id or name); falls back to default_group in the config
    #[arg(short, long)]
    group: Option<String>,

    /// Data type token; falls back to default_data_type, then TEXT
    #[arg(short = 't', long)]
    data_type: Option<String>,

    /// Data category (FAMILYTYPE parameters)
    #[arg(long)]
    data_category: Option<String>,

    /// GUID to use instead of a generated one
    #[arg(long)]
    guid: Option<String>,

    /// Description text, stored as given
    #[arg(short, long)]
    description: Option<String>,

    /// Hide the parameter in Revit's UI
    #[arg(long)]
    hidden: bool,

    /// Prevent users from modifying the value
    #[arg(long)]
    read_only: bool,

    /// Hide the parameter when it has no value
    #[arg(long)]
    hide_when_no_value: bool,
}

#[derive(Args)]
pub struct UpdateParamArgs {
    /// Parameter to update, by GUID
    #[arg(long, conflicts_with = "name")]
    guid: Option<String>,

    /// Parameter to update, by current name
    #[arg(long)]
    name: Option<String>,

    /// New name
    #[arg(long)]
    rename: Option<String>,

    /// New group (id or name)
    #[arg(short, long)]
    group: Option<String>,

    /// New data type token
    #[arg(short = 't', long)]
    data_type: Option<String>,

    /// New data category; pass an empty string to clear it
    #[arg(long)]
    data_category: Option<String>,

    /// New description
    #[arg(short, long)]
    description: Option<String>,

    /// Visible flag
    #[arg(long)]
    visible: Option<bool>,

    /// User-modifiable flag
    #[arg(long)]
    user_modifiable: Option<bool>,

    /// Hide-when-no-value flag
    #[arg(long)]
    hide_when_no_value: Option<bool>,
}

#[derive(Args)]
pub struct RemoveParamArgs {
    /// Parameter to remove, by GUID
    #[arg(long, conflicts_with = "name", required_unless_present = "name")]
    guid: Option<String>,

    /// Parameter to remove, by name
    #[arg(long)]
    name: Option<String>,
}

pub fn add(ctx: &CommandContext, args: AddParamArgs) -> Result<()> {
    let (path, mut doc) = ctx.load()?;

    let group = args
        .group
        .as_deref()
        .or(ctx.config.default_group.as_deref())
        .context("Missing argument --group (no default_group configured)")?;
    let group = resolve_group(&doc, group)?;

    let data_type = match &args.data_type {
        Some(token) => parse_data_type(token)?,
        None => ctx.config.data_type()?,
    };

    let guid = match &args.guid {
        Some(value) => parse_guid(value)?,
        None => Guid::new_v4().with_uppercase(ctx.config.uppercase_guids),
    };

    let mut param = ParamRecord::new(guid, &args.name, data_type, group);
    if let Some(description) = args.description {
        param = param.with_description(description);
    }
    if let Some(category) = args.data_category {
        param = param.with_data_category(category);
    }
    if args.hidden {
        param = param.hidden();
    }
    if args.read_only {
        param = param.read_only();
    }
    if args.hide_when_no_value {
        param = param.hide_when_no_value();
    }

    info!("Adding parameter '{}' ({}) to group {}", param.name, param.guid, group);
    doc.add_param(param)?;
    ctx.save(&path, &doc)?;

    ctx.say(format!("✅ Parameter '{}' added", args.name));
    ctx.say(format!("GUID: {}", guid));
    Ok(())
}

pub fn update(ctx: &CommandContext, args: UpdateParamArgs) -> Result<()> {
    let (path, mut doc) = ctx.load()?;

    let mut param = find_param(&doc, args.guid.as_deref(), args.name.as_deref())?.clone();

    if let Some(name) = args.rename {
        param.name = name;
    }
    if let Some(group) = &args.group {
        param.group = resolve_group(&doc, group)?;
    }
    if let Some(token) = &args.data_type {
        param.data_type = parse_data_type(token)?;
    }
    if let Some(category) = args.data_category {
        param.data_category = Some(category).filter(|c| !c.is_empty());
    }
    if let Some(description) = args.description {
        param.description = description;
    }
    if let Some(visible) = args.visible {
        param.visible = visible;
    }
    if let Some(user_modifiable) = args.user_modifiable {
        param.user_modifiable = user_modifiable;
    }
    if let Some(hide) = args.hide_when_no_value {
        param.hide_when_no_value = hide;
    }

    info!("Updating parameter {}", param.guid);
    let name = param.name.clone();
    doc.update_param(param)?;
    ctx.save(&path, &doc)?;

    ctx.say(format!("✅ Parameter '{}' updated", name));
    Ok(())
}

pub fn remove(ctx: &CommandContext, args: RemoveParamArgs) -> Result<()> {
    let (path, mut doc) = ctx.load()?;

    let guid = find_param(&doc, args.guid.as_deref(), args.name.as_deref())?.guid;
    info!("Removing parameter {}", guid);

    let removed = doc.remove_param(&guid)?;
    ctx.save(&path, &doc)?;

    ctx.say(format!("✅ Parameter '{}' removed", removed.name));
    Ok(())
}

fn find_param<'a>(doc: &'a Document, guid: Option<&str>, name: Option<&str>) -> Result<&'a ParamRecord> {
    match (guid, name) {
        (Some(guid), _) => {
            let guid = parse_guid(guid)?;
            doc.param(&guid)
                .ok_or_else(|| anyhow::anyhow!("Parameter not found: {}", guid))
        }
        (None, Some(name)) => doc
            .param_by_name(name)
            .ok_or_else(|| anyhow::anyhow!("Parameter not found: {}", name)),
        (None, None) => anyhow::bail!("Missing argument: pass --guid or --name"),
    }
}

fn parse_data_type(token: &str) -> Result<DataType> {
    token
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid argument --data-type: {}", e))
}
