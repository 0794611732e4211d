use anyhow::{Context, Result};
use clap::Parser;
use iupac_namer::*;
use std::io::BufRead;
use tracing::*;

/// Prints the IUPAC name of each SMILES string.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Compare rings and chains by atom count alone.
    #[arg(long, conflicts_with = "principal_groups_first")]
    atom_count_rule: bool,
    /// Let the side carrying more principal groups win before atom counts.
    #[arg(long)]
    principal_groups_first: bool,
    /// Write locants even where they are unambiguous ("ethan-1-ol").
    #[arg(long)]
    keep_locants: bool,
    /// Deepest substituent nesting to name before falling back to a formula.
    #[arg(long, value_name = "N")]
    depth: Option<usize>,
    /// Log level; defaults to IUPAC_LOG, then "warn".
    #[arg(long, value_name = "LEVEL")]
    log: Option<String>,
    /// SMILES strings. Read one per line from stdin when none are given.
    smiles: Vec<String>,
}

impl Cli {
    fn options(&self) -> NamingOptions {
        let mut options = NamingOptions::default().with_omit_unambiguous_locants(!self.keep_locants);
        if self.atom_count_rule {
            options = options.with_ring_chain_rule(RingChainRule::AtomCount);
        } else if self.principal_groups_first {
            options = options.with_ring_chain_rule(RingChainRule::PrincipalGroupsFirst);
        }
        if let Some(depth) = self.depth {
            options = options.with_max_substituent_depth(depth);
        }
        options
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let level = cli
        .log
        .clone()
        .or_else(|| std::env::var("IUPAC_LOG").ok())
        .unwrap_or_else(|| "warn".to_owned());
    init_logging(&level);

    let inputs = if cli.smiles.is_empty() {
        std::io::stdin()
            .lock()
            .lines()
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to read SMILES from stdin")?
    } else {
        cli.smiles.clone()
    };

    let options = cli.options();
    let mut memo = RingMemo::new();
    let mut failures = 0;
    for smiles in inputs.iter().map(|s| s.trim()).filter(|s| !s.is_empty()) {
        match iupac_name_with(smiles, &options, &mut memo) {
            Ok(name) => println!("{smiles}\t{name}"),
            Err(err) => {
                failures += 1;
                error!("{smiles}: {err:#}");
            }
        }
    }
    debug!("ring memo: {} hits, {} misses", memo.hits(), memo.misses());
    if failures > 0 {
        anyhow::bail!("{failures} of {} inputs could not be named", inputs.len());
    }
    Ok(())
}
