use super::parse_bracket_atom;
use crate::perception::annotate;
use crate::{Atom, Bond, Element, Molecule, MoleculeError};
use anyhow::{Context, Result};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SmilesError {
    #[error("Branch start '(' at position {0} (followed by {1}) without a current atom")]
    BranchNoCurrentAtom(usize, String),
    #[error("Branch end ')' at position {0} (followed by {1}) without a matching '('")]
    BranchEndNoStart(usize, String),
    #[error("Branch opened at position {0} is never closed")]
    UnclosedBranch(usize),
    #[error("Ring closure digit '{0}' at position {1} without a current atom")]
    RingClosureNoCurrentAtom(char, usize),
    #[error("Ring closure {0} is never closed")]
    UnclosedRing(u16),
    #[error("Unclosed bracket '[' at position {0}")]
    UnclosedBracket(usize),
    #[error("Unknown element '{0}' at position {1}")]
    UnknownElement(String, usize),
    #[error("Bad bracket atom '[{0}]' at position {1}")]
    BadBracketAtom(String, usize),
    #[error("Invalid bond at position {0}")]
    InvalidBond(usize, #[source] MoleculeError),
}

/// Parses a SMILES string into a Molecule with rings and aromaticity perceived.
pub fn parse_smiles(smiles: &str) -> Result<Molecule> {
    let molecule = parse_smiles_helper(smiles)
        .context(format!("Failed to parse SMILES string {smiles}"))?;
    Ok(annotate(molecule))
}

fn default_bond(molecule: &Molecule, a: usize, b: usize) -> Bond {
    if molecule.atom(a).aromatic && molecule.atom(b).aromatic {
        Bond::Aromatic
    } else {
        Bond::Single
    }
}

fn connect(
    molecule: &mut Molecule,
    previous: Option<usize>,
    atom: usize,
    bond_type: &mut Option<Bond>,
    position: usize,
) -> Result<(), SmilesError> {
    if let Some(prev) = previous {
        let bond = bond_type
            .take()
            .unwrap_or_else(|| default_bond(molecule, prev, atom));
        molecule
            .add_bond(prev, atom, bond)
            .map_err(|e| SmilesError::InvalidBond(position, e))?;
    }
    *bond_type = None;
    Ok(())
}

fn close_ring(
    molecule: &mut Molecule,
    ring_map: &mut BTreeMap<u16, (usize, Option<Bond>)>,
    ring_number: u16,
    current_atom: Option<usize>,
    bond_type: &mut Option<Bond>,
    label: char,
    position: usize,
) -> Result<(), SmilesError> {
    let current = current_atom.ok_or(SmilesError::RingClosureNoCurrentAtom(label, position))?;
    if let Some((start_atom, opening_bond)) = ring_map.remove(&ring_number) {
        let bond = bond_type
            .take()
            .or(opening_bond)
            .unwrap_or_else(|| default_bond(molecule, start_atom, current));
        molecule
            .add_bond(current, start_atom, bond)
            .map_err(|e| SmilesError::InvalidBond(position, e))?;
    } else {
        ring_map.insert(ring_number, (current, bond_type.take()));
    }
    Ok(())
}

fn parse_smiles_helper(smiles: &str) -> Result<Molecule, SmilesError> {
    let mut molecule = Molecule::new();
    let mut current_atom: Option<usize> = None;
    let mut bond_type: Option<Bond> = None;
    let mut branch_stack: Vec<(usize, usize)> = Vec::new();
    let mut ring_map: BTreeMap<u16, (usize, Option<Bond>)> = BTreeMap::new();
    let mut bracketed: BTreeSet<usize> = BTreeSet::new();

    let chars: Vec<char> = smiles.chars().collect();
    let rest = |i: usize| chars[i..].iter().collect::<String>();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '(' => {
                let atom = current_atom.ok_or_else(|| SmilesError::BranchNoCurrentAtom(i, rest(i)))?;
                branch_stack.push((atom, i));
                i += 1;
            }
            ')' => {
                let (atom, _) = branch_stack
                    .pop()
                    .ok_or_else(|| SmilesError::BranchEndNoStart(i, rest(i)))?;
                current_atom = Some(atom);
                bond_type = None;
                i += 1;
            }
            '-' | '/' | '\\' => {
                bond_type = Some(Bond::Single);
                i += 1;
            }
            '=' => {
                bond_type = Some(Bond::Double);
                i += 1;
            }
            '#' => {
                bond_type = Some(Bond::Triple);
                i += 1;
            }
            ':' => {
                bond_type = Some(Bond::Aromatic);
                i += 1;
            }
            '%' => {
                // Two-digit ring closure label.
                let digits: String = chars.iter().skip(i + 1).take(2).collect();
                let ring_number = match (digits.len(), digits.parse::<u16>()) {
                    (2, Ok(n)) => n,
                    _ => return Err(SmilesError::RingClosureNoCurrentAtom(c, i)),
                };
                close_ring(&mut molecule, &mut ring_map, ring_number, current_atom, &mut bond_type, c, i)?;
                i += 3;
            }
            '0'..='9' => {
                let ring_number = c.to_digit(10).unwrap_or(0) as u16;
                close_ring(&mut molecule, &mut ring_map, ring_number, current_atom, &mut bond_type, c, i)?;
                i += 1;
            }
            '[' => {
                let end = chars[i..]
                    .iter()
                    .position(|&x| x == ']')
                    .map(|offset| i + offset)
                    .ok_or(SmilesError::UnclosedBracket(i))?;
                let content: String = chars[i + 1..end].iter().collect();
                let bracket = parse_bracket_atom(&content)
                    .ok_or_else(|| SmilesError::BadBracketAtom(content.clone(), i))?;
                let mut atom = Atom::new(0, bracket.element);
                atom.isotope = bracket.isotope;
                atom.aromatic = bracket.aromatic;
                atom.chirality = bracket.chirality;
                atom.hydrogens = bracket.hydrogens;
                atom.charge = bracket.charge;
                let new_atom = molecule.push_atom(atom);
                bracketed.insert(new_atom);
                connect(&mut molecule, current_atom, new_atom, &mut bond_type, i)?;
                current_atom = Some(new_atom);
                i = end + 1;
            }
            '.' => {
                // The next atom starts a new component.
                current_atom = None;
                bond_type = None;
                i += 1;
            }
            _ => {
                let two_letter = match (c, chars.get(i + 1)) {
                    ('C', Some('l')) => Some(Element::Cl),
                    ('B', Some('r')) => Some(Element::Br),
                    _ => None,
                };
                let (element, aromatic, width) = match two_letter {
                    Some(element) => (element, false, 2),
                    None => match c {
                        'B' => (Element::B, false, 1),
                        'C' => (Element::C, false, 1),
                        'N' => (Element::N, false, 1),
                        'O' => (Element::O, false, 1),
                        'P' => (Element::P, false, 1),
                        'S' => (Element::S, false, 1),
                        'F' => (Element::F, false, 1),
                        'I' => (Element::I, false, 1),
                        'b' => (Element::B, true, 1),
                        'c' => (Element::C, true, 1),
                        'n' => (Element::N, true, 1),
                        'o' => (Element::O, true, 1),
                        'p' => (Element::P, true, 1),
                        's' => (Element::S, true, 1),
                        _ => return Err(SmilesError::UnknownElement(c.to_string(), i)),
                    },
                };
                let mut atom = Atom::new(0, element);
                atom.aromatic = aromatic;
                let new_atom = molecule.push_atom(atom);
                connect(&mut molecule, current_atom, new_atom, &mut bond_type, i)?;
                current_atom = Some(new_atom);
                i += width;
            }
        }
    }

    if let Some(&(_, position)) = branch_stack.last() {
        return Err(SmilesError::UnclosedBranch(position));
    }
    if let Some(&ring_number) = ring_map.keys().next() {
        return Err(SmilesError::UnclosedRing(ring_number));
    }

    fill_implicit_hydrogens(&mut molecule, &bracketed);
    Ok(molecule)
}

/// Organic-subset atoms take the lowest default valence that fits their bonds.
fn fill_implicit_hydrogens(molecule: &mut Molecule, bracketed: &BTreeSet<usize>) {
    for id in 0..molecule.atom_count() {
        if bracketed.contains(&id) {
            continue;
        }
        let element = molecule.element(id);
        let aromatic = molecule.atom(id).aromatic;
        let mut used: u8 = molecule
            .neighbors(id)
            .into_iter()
            .filter_map(|n| molecule.bond(id, n))
            .map(|b| b.valence())
            .sum();
        if aromatic {
            if matches!(element, Element::O | Element::S | Element::Se) {
                continue;
            }
            used += 1;
        }
        let hydrogens = element
            .default_valences()
            .iter()
            .find(|&&v| v >= used)
            .map(|&v| v - used)
            .unwrap_or(0);
        if let Some(atom) = molecule.atom_mut(id) {
            atom.hydrogens = hydrogens;
        }
    }
}
