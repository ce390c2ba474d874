//! Find command - Locate shared parameter files under a directory.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Args;
use tracing::debug;
use walkdir::WalkDir;

use sparam_format::{encoding, SharedParamReader};

use super::CommandContext;

#[derive(Args)]
pub struct FindArgs {
    /// Directory to search (defaults to the current directory)
    #[arg(short, long)]
    dir: Option<PathBuf>,

    /// Maximum directory depth
    #[arg(long, default_value_t = 8)]
    max_depth: usize,
}

/// A file that looks like a shared parameter file.
#[derive(Debug)]
pub struct Candidate {
    pub path: PathBuf,
    /// `None` when the file parses cleanly.
    pub error: Option<String>,
}

pub fn execute(ctx: &CommandContext, args: FindArgs) -> Result<()> {
    let dir = match args.dir {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    let found = scan(&dir, args.max_depth);
    for candidate in &found {
        // Quiet output is one bare path per line.
        match (&candidate.error, ctx.quiet) {
            (_, true) => println!("{}", candidate.path.display()),
            (None, false) => println!("✅ {}", candidate.path.display()),
            (Some(err), false) => println!("❌ {} ({})", candidate.path.display(), err),
        }
    }
    ctx.say(format!("{} shared parameter file(s) found", found.len()));
    Ok(())
}

/// Walk `dir` for `.txt` files whose text declares a `*META` section.
pub fn scan(dir: &Path, max_depth: usize) -> Vec<Candidate> {
    WalkDir::new(dir)
        .max_depth(max_depth)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.path().extension().map_or(false, |ext| ext.eq_ignore_ascii_case("txt")))
        .filter_map(|e| inspect(e.path()))
        .collect()
}

fn inspect(path: &Path) -> Option<Candidate> {
    let bytes = fs::read(path).ok()?;
    let (text, _) = encoding::decode(&bytes).ok()?;
    if !text.lines().any(|line| line.starts_with("*META\t")) {
        return None;
    }

    debug!("Inspecting {:?}", path);
    let error = SharedParamReader::parse(&text).err().map(|e| e.to_string());
    Some(Candidate {
        path: path.to_path_buf(),
        error,
    })
}
