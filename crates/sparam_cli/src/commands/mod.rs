//! CLI command definitions.
//!
//! Each subcommand reads the shared parameter file, acts on it and, for
//! edits, rewrites it in full.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use sparam_format::{Document, Guid};

use crate::config::CliConfig;

pub mod export;
pub mod find;
pub mod groups;
pub mod init;
pub mod list;
pub mod params;
pub mod show;
pub mod validate;

/// sparam - Revit shared parameter file tool
#[derive(Parser)]
#[command(name = "sparam")]
#[command(version, about = "Inspect, validate and edit Revit shared parameter files")]
#[command(long_about = r#"
sparam reads, validates and edits Revit shared parameter files while keeping
comments, line endings and encoding intact.

COMMANDS:
  show          → Summary of META, groups and parameter counts
  list          → Parameters as a table
  validate      → Report violated invariants and warnings
  add-group     → Declare a new group
  rename-group  → Rename a group
  remove-group  → Remove an unused group
  add-param     → Add a parameter (GUID generated when omitted)
  update-param  → Change fields of an existing parameter
  remove-param  → Remove a parameter by GUID or name
  export        → Records as JSON
  init          → Write an empty shared parameter file
  find          → Locate shared parameter files under a directory

EXIT CODES:
  0 - Success
  1 - General error
  2 - Invalid arguments or not found
  3 - Validation failure
"#)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Shared parameter file to operate on
    #[arg(short, long, global = true, env = "SPARAM_FILE")]
    pub file: Option<PathBuf>,

    /// Config file (defaults to ./sparam.toml or $SPARAM_CONFIG)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Summarize the file
    Show(show::ShowArgs),

    /// List parameters
    List(list::ListArgs),

    /// Validate the file
    Validate(validate::ValidateArgs),

    /// Declare a new group
    #[command(name = "add-group")]
    AddGroup(groups::AddGroupArgs),

    /// Rename a group
    #[command(name = "rename-group")]
    RenameGroup(groups::RenameGroupArgs),

    /// Remove a group no parameter uses
    #[command(name = "remove-group")]
    RemoveGroup(groups::RemoveGroupArgs),

    /// Add a parameter
    #[command(name = "add-param")]
    AddParam(params::AddParamArgs),

    /// Update an existing parameter
    #[command(name = "update-param")]
    UpdateParam(params::UpdateParamArgs),

    /// Remove a parameter
    #[command(name = "remove-param")]
    RemoveParam(params::RemoveParamArgs),

    /// Export records as JSON
    Export(export::ExportArgs),

    /// Create an empty shared parameter file
    Init(init::InitArgs),

    /// Find shared parameter files under a directory
    Find(find::FindArgs),
}

/// State shared by every command.
pub struct CommandContext {
    pub file: Option<PathBuf>,
    pub config: CliConfig,
    pub quiet: bool,
}

impl CommandContext {
    /// The file to operate on: `--file`, else the configured default.
    pub fn target_file(&self) -> Result<PathBuf> {
        self.file
            .clone()
            .or_else(|| self.config.default_file.clone())
            .context("No shared parameter file given: pass --file or set default_file in sparam.toml")
    }

    pub fn load(&self) -> Result<(PathBuf, Document)> {
        let path = self.target_file()?;
        let doc = sparam_format::read(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Ok((path, doc))
    }

    /// Rewrite the file after an edit.
    pub fn save(&self, path: &Path, doc: &Document) -> Result<()> {
        sparam_format::write(doc, path).with_context(|| format!("Failed to write {}", path.display()))?;
        info!("Wrote {:?}", path);
        Ok(())
    }

    /// Print a line unless `--quiet` is set.
    pub fn say(&self, message: impl AsRef<str>) {
        if !self.quiet {
            println!("{}", message.as_ref());
        }
    }
}

/// Resolve `--group` given as a numeric id or a group name.
pub fn resolve_group(doc: &Document, group: &str) -> Result<u32> {
    if let Ok(id) = group.parse::<u32>() {
        if doc.group(id).is_some() {
            return Ok(id);
        }
    }
    doc.group_by_name(group)
        .map(|g| g.id)
        .ok_or_else(|| anyhow::anyhow!("Group not found: {}", group))
}

pub fn parse_guid(value: &str) -> Result<Guid> {
    value.parse::<Guid>().map_err(|e| anyhow::anyhow!("Invalid argument --guid: {}", e))
}
