//! Init command - Write an empty shared parameter file.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use sparam_format::{Document, GroupRecord, MetaRecord, TextEncoding};

use super::CommandContext;

#[derive(Args)]
pub struct InitArgs {
    /// Path of the new file (defaults to --file)
    #[arg(short, long)]
    path: Option<PathBuf>,

    /// Overwrite an existing file
    #[arg(long)]
    force: bool,

    /// Name of a first group to declare
    #[arg(long)]
    group: Option<String>,

    /// Write UTF-16LE with BOM, as Revit does
    #[arg(long)]
    utf16: bool,
}

pub fn execute(ctx: &CommandContext, args: InitArgs) -> Result<()> {
    let path = match args.path {
        Some(path) => path,
        None => ctx.target_file()?,
    };

    info!("Initializing shared parameter file at {:?}", path);

    if path.exists() && !args.force {
        anyhow::bail!(
            "Shared parameter file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    let mut doc = Document::new(MetaRecord::default());
    if let Some(name) = args.group {
        doc.add_group(GroupRecord::new(1, name))?;
    }
    if args.utf16 {
        doc.set_encoding(TextEncoding::Utf16LeBom);
    }

    sparam_format::write(&doc, &path).with_context(|| format!("Failed to create {}", path.display()))?;

    ctx.say(format!("✅ Created {}", path.display()));
    Ok(())
}
