//! Extract command implementation.

use crate::cli::ExtractArgs;
use crate::config::{Config, OutputFormat};
use crate::error::{CliError, Result};
use crate::output::Formatter;
use labscan_extractor::Extractor;
use std::io::Read;
use std::sync::Arc;

/// Execute the extract command.
pub fn execute_extract(args: ExtractArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let text = read_input(&args)?;
    let extractor = Extractor::with_catalog(Arc::new(config.build_catalog()?), config.extractor.clone())?;

    let result = extractor.extract(&text);

    if args.validate && formatter.format() == OutputFormat::Json {
        // Single JSON document so the output stays parseable
        let report = extractor.validate(&result.biomarkers);
        let combined = serde_json::json!({ "result": result, "validation": report });
        println!("{}", serde_json::to_string_pretty(&combined)?);
        return Ok(());
    }

    println!("{}", formatter.format_extraction(&result)?);

    if args.validate {
        let report = extractor.validate(&result.biomarkers);
        println!("{}", formatter.format_validation(&report)?);
    }

    Ok(())
}

fn read_input(args: &ExtractArgs) -> Result<String> {
    if args.stdin {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        return Ok(text);
    }

    let path = args
        .file
        .as_ref()
        .ok_or_else(|| CliError::InvalidInput("Provide a file or --stdin".to_string()))?;
    let bytes = std::fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
