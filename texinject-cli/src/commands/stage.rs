//! Stage command - copy a container set under a new name.

use std::path::Path;

use texinject::staging::stage_companion_files;

use super::common::{print_staging_report, require_file};
use crate::error::CliError;

/// Run the stage command.
pub fn run(source: &Path, dest: &Path, prefix: &str) -> Result<(), CliError> {
    require_file(source)?;
    let report = stage_companion_files(source, dest, prefix)?;
    print_staging_report(&report);
    Ok(())
}
