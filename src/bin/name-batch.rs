use anyhow::{Context, Result};
use csv::{ReaderBuilder, Writer};
use iupac_namer::*;
use std::fs::File;
use tracing::*;

/// Reads a CSV with a `smiles` column and writes it back with a `name`
/// column appended. Rows that cannot be named carry the error text.
fn name_csv(input: &str, output: &str) -> Result<()> {
    let file = File::open(input).with_context(|| format!("Failed to open {input}"))?;
    let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(file);
    let headers = rdr.headers()?.clone();
    let smiles_column = headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case("smiles"))
        .with_context(|| format!("{input} has no smiles column"))?;

    let mut wtr = Writer::from_writer(File::create(output)?);
    let mut header_row: Vec<&str> = headers.iter().collect();
    header_row.push("name");
    wtr.write_record(&header_row)?;

    let options = NamingOptions::default();
    let mut memo = RingMemo::new();
    let (mut named, mut failed) = (0, 0);
    for result in rdr.records() {
        let record = result?;
        let smiles = record.get(smiles_column).unwrap_or("").trim();
        let name = match iupac_name_with(smiles, &options, &mut memo) {
            Ok(name) => {
                named += 1;
                name
            }
            Err(err) => {
                failed += 1;
                warn!("Could not name {smiles:?}: {err:#}");
                format!("error: {err:#}")
            }
        };
        let mut row: Vec<&str> = record.iter().collect();
        row.push(&name);
        wtr.write_record(&row)?;
    }
    wtr.flush()?;
    info!(
        "Named {named} molecules, {failed} failures; ring memo {} hits, {} misses. Written to {output}",
        memo.hits(),
        memo.misses()
    );
    Ok(())
}

fn main() -> Result<()> {
    let level = std::env::var("IUPAC_LOG").unwrap_or_else(|_| "info".to_owned());
    init_logging(&level);
    let mut args = std::env::args().skip(1);
    let input = args.next().unwrap_or_else(|| "molecules.csv".to_owned());
    let output = args.next().unwrap_or_else(|| "named-molecules.csv".to_owned());
    name_csv(&input, &output)
}
