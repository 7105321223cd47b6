//! Catalog command implementation.

use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;

/// Execute the catalog command.
pub fn execute_catalog(config: &Config, formatter: &Formatter) -> Result<()> {
    let catalog = config.build_catalog()?;
    println!("{}", formatter.format_catalog(&catalog)?);
    Ok(())
}
