//! Import of habits exported by the older format.

use clap::Args;
use habitroom_core::legacy::{import_legacy, parse_records};
use std::path::PathBuf;

use super::open_store;

#[derive(Args)]
pub struct ImportArgs {
    /// JSON file holding an array of habit records
    file: PathBuf,
}

pub fn run(args: ImportArgs) -> Result<(), Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(&args.file)?;
    let (records, mut rejected) = parse_records(&content)?;

    let (mut store, _) = open_store(None)?;
    let mut summary = import_legacy(&mut store, records)?;
    rejected.append(&mut summary.rejected);
    summary.rejected = rejected;

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
