use std::{fs::File, io, path::Path};

use anyhow::Context;
use serde::Serialize;

/// One output row: a member paired with one municipality they represent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct LegislatorRecord {
    pub district: String,
    pub town: String,
    pub member: String,
    pub party: String,
    pub email: String,
    pub phone: String,
    /// Committee names joined with `"; "`.
    pub committees: String,
}

pub fn write_records<W: io::Write>(writer: W, records: &[LegislatorRecord]) -> anyhow::Result<()> {
    let mut csv_writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);
    if records.is_empty() {
        // serde only emits the header alongside the first record.
        csv_writer.write_record([
            "District",
            "Town",
            "Member",
            "Party",
            "Email",
            "Phone",
            "Committees",
        ])?;
    }
    for record in records {
        csv_writer.serialize(record)?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn write_csv(path: &Path, records: &[LegislatorRecord]) -> anyhow::Result<()> {
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    write_records(file, records).with_context(|| format!("failed to write {}", path.display()))
}
