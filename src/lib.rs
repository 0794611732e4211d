mod error;
pub use error::*;

mod options;
pub use options::*;

mod molecule;
pub use molecule::*;

mod parse;
pub use parse::*;

mod perception;
pub use perception::*;

mod groups;
pub use groups::*;

mod memoize;
pub use memoize::*;

mod formula;
pub use formula::*;

mod ring_names;
pub use ring_names::*;

mod assemble;
pub use assemble::*;

mod candidates;
pub use candidates::*;

mod numbering;
pub use numbering::*;

mod select;
pub use select::*;

mod substituents;
pub use substituents::*;

mod naming;
pub use naming::*;

use tracing_subscriber::filter::{LevelFilter, Targets};
use tracing_subscriber::prelude::*;

/// Installs a stderr formatter at the given level ("trace", "debug", ...).
/// Unknown levels fall back to warnings. Calling it twice is harmless.
pub fn init_logging(level: &str) {
    let level = level.parse::<LevelFilter>().unwrap_or_else(|_| {
        eprintln!("Ignoring unknown log level {level:?}");
        LevelFilter::WARN
    });
    let targets = Targets::new().with_default(level);
    let fmt = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
    let _ = tracing_subscriber::registry().with(targets).with(fmt).try_init();
}

/// Parses a SMILES string and names it with the default options.
pub fn iupac_name(smiles: &str) -> anyhow::Result<String> {
    iupac_name_with(smiles, &NamingOptions::default(), &mut RingMemo::new())
}

pub fn iupac_name_with(smiles: &str, options: &NamingOptions, memo: &mut RingMemo) -> anyhow::Result<String> {
    let molecule = parse_smiles(smiles)?;
    Ok(name_molecule(&molecule, options, memo)?)
}
