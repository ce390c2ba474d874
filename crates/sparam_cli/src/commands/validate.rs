//! Validate command - Report violated invariants and warnings.

use anyhow::Result;
use clap::Args;
use tracing::{info, warn};

use sparam_format::{SharedParamError, SharedParamReader, ValidationResult, Violation};

use super::CommandContext;

#[derive(Args)]
pub struct ValidateArgs {
    /// Treat warnings as failures
    #[arg(long)]
    strict: bool,

    /// Do not print warnings
    #[arg(long)]
    no_warnings: bool,
}

pub fn execute(ctx: &CommandContext, args: ValidateArgs) -> Result<()> {
    let path = ctx.target_file()?;
    info!("Validating {:?}", path);

    ctx.say(format!("📋 Validating {}...", path.display()));

    // Only malformed lines stop the read; every other broken invariant is
    // collected by the validator below.
    let doc = match SharedParamReader::read_unchecked(&path) {
        Ok(doc) => doc,
        Err(err) if err.is_invariant_violation() => {
            let message = err.to_string();
            if let Some(violation) = Violation::from_error(err) {
                println!("   ❌ {}", violation);
            }
            anyhow::bail!("Validation failed: {}", message);
        }
        Err(err @ SharedParamError::Io(_)) => {
            return Err(anyhow::Error::new(err).context(format!("File not found or unreadable: {}", path.display())))
        }
        Err(err) => return Err(err.into()),
    };

    let result = sparam_format::validate(&doc);
    report(ctx, &result, !args.no_warnings);

    if !result.is_valid() {
        anyhow::bail!("Validation failed: {} violation(s)", result.violations.len());
    }
    if args.strict && !result.warnings.is_empty() {
        anyhow::bail!("Validation failed: {} warning(s) in strict mode", result.warnings.len());
    }

    ctx.say("✅ All validations passed!");
    Ok(())
}

fn report(ctx: &CommandContext, result: &ValidationResult, show_warnings: bool) {
    if result.is_valid() {
        ctx.say("   ✅ No violations");
    } else {
        println!("   ❌ {} violation(s):", result.violations.len());
        for violation in &result.violations {
            println!("      - {}", violation);
        }
    }

    if show_warnings {
        for warning in &result.warnings {
            warn!("{}", warning);
            println!("   ⚠️  {}", warning);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    use crate::config::CliConfig;

    const DANGLING: &str = "*META\tVERSION\tMINVERSION\n\
META\t2\t1\n\
*GROUP\tID\tNAME\n\
GROUP\t1\tData\n\
*PARAM\tGUID\tNAME\tDATATYPE\tDATACATEGORY\tGROUP\tVISIBLE\tDESCRIPTION\tUSERMODIFIABLE\tHIDEWHENNOVALUE\n\
PARAM\t8d3f0c1a-42b7-4c59-9e21-6a7b8c9d0e1f\tFlamingo.Sheet.Stamp\tIMAGE\t\t5\t1\t\t1\t0\n\
PARAM\t2e4f6a8c-1b3d-4e5f-8a9b-0c1d2e3f4a5b\tFlamingo.Sheet.Reviewer\tTEXT\t\t7\t1\t\t1\t0\n";

    fn context(file: &std::path::Path) -> CommandContext {
        CommandContext {
            file: Some(file.to_path_buf()),
            config: CliConfig::default(),
            quiet: true,
        }
    }

    fn args() -> ValidateArgs {
        ValidateArgs {
            strict: false,
            no_warnings: true,
        }
    }

    #[test]
    fn test_reports_every_dangling_reference() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("SharedParameters.txt");
        fs::write(&path, DANGLING).unwrap();

        let err = execute(&context(&path), args()).unwrap_err();
        assert_eq!(err.to_string(), "Validation failed: 2 violation(s)");
    }

    #[test]
    fn test_malformed_line_fails_validation() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("SharedParameters.txt");
        fs::write(&path, DANGLING.replace("\t7\t1\t\t1\t0", "\t7\t1")).unwrap();

        let err = execute(&context(&path), args()).unwrap_err();
        assert!(err.to_string().starts_with("Validation failed: Format error on line 7"));
    }

    #[test]
    fn test_clean_file_passes() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("SharedParameters.txt");
        fs::write(&path, DANGLING.replace("\t5\t1", "\t1\t1").replace("\t7\t1", "\t1\t1")).unwrap();

        execute(&context(&path), args()).unwrap();
    }
}
