//! Scan command - list texture records without modifying anything.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use console::style;
use texinject::scanner::{ScanEvent, TextureRecordScanner};

use super::common::{format_size, require_file};
use crate::error::CliError;

/// Run the scan command.
pub fn run(source: &Path) -> Result<(), CliError> {
    require_file(source)?;

    let file = File::open(source).map_err(|e| CliError::Open {
        path: source.to_path_buf(),
        source: e,
    })?;
    let mut reader = BufReader::new(file);
    let mut scanner = TextureRecordScanner::for_source(&mut reader)?;

    println!(
        "{}  ({})",
        source.display(),
        format_size(scanner.container_len())
    );
    println!();
    println!(
        "{:>12}  {:>12}  {:>12}  {:<6}  {:>11}",
        "DESCRIPTOR", "DATA OFFSET", "DATA SIZE", "FORMAT", "DIMENSIONS"
    );

    let mut found = 0usize;
    let mut oversize = 0usize;

    for event in scanner.events(&mut reader) {
        match event? {
            ScanEvent::Record(record) => {
                found += 1;
                println!(
                    "{:>#12x}  {:>#12x}  {:>12}  {:<6}  {:>11}",
                    record.record_start,
                    record.data_offset,
                    record.data_size,
                    record.format.to_string(),
                    format!("{}x{}", record.width, record.height)
                );
            }
            ScanEvent::Oversize { record, .. } => {
                oversize += 1;
                println!(
                    "{:>#12x}  {:>#12x}  {:>12}  {:<6}  {:>11}  {}",
                    record.record_start,
                    record.data_offset,
                    record.data_size,
                    record.format.to_string(),
                    format!("{}x{}", record.width, record.height),
                    style("past end of file").yellow()
                );
            }
        }
    }

    println!();
    println!("{} texture(s) found", found);
    if oversize > 0 {
        println!("{} descriptor(s) with payload past end of file", oversize);
    }

    Ok(())
}
