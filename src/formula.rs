use crate::{Element, Molecule};
use std::collections::BTreeSet;

fn hill_rank(element: Element, has_carbon: bool) -> u8 {
    match (has_carbon, element) {
        (true, Element::C) => 0,
        (true, Element::H) => 1,
        _ => 2,
    }
}

/// Hill-order formula of `atoms`, implicit hydrogens included, with the net
/// charge appended ("H2O", "Cl-", "H4N+").
pub fn molecular_formula(molecule: &Molecule, atoms: &BTreeSet<usize>) -> String {
    let counts = molecule.element_counts(atoms);
    let has_carbon = counts.contains_key(&Element::C);
    let mut elements: Vec<(Element, usize)> = counts.into_iter().collect();
    elements.sort_by(|(a, _), (b, _)| {
        hill_rank(*a, has_carbon)
            .cmp(&hill_rank(*b, has_carbon))
            .then(a.symbol().cmp(b.symbol()))
    });

    let mut formula = String::new();
    for (element, count) in elements {
        formula.push_str(element.symbol());
        if count > 1 {
            formula.push_str(&count.to_string());
        }
    }

    let charge: i32 = atoms.iter().map(|&a| molecule.atom(a).charge as i32).sum();
    match charge {
        0 => {}
        1 => formula.push('+'),
        -1 => formula.push('-'),
        c if c > 0 => formula.push_str(&format!("{c}+")),
        c => formula.push_str(&format!("{}-", -c)),
    }
    formula
}
