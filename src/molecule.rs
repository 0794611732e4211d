use crate::NamingError;
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use std::collections::hash_map::DefaultHasher;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::hash::{Hash, Hasher};
use thiserror::Error;
use tracing::warn;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MoleculeError {
    #[error("bond references atom {0}, but the molecule only has {1} atoms")]
    MissingAtom(usize, usize),
    #[error("atom {0} cannot be bonded to itself")]
    SelfBond(usize),
    #[error("atoms {0} and {1} are already bonded")]
    DuplicateBond(usize, usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Element {
    H,
    Li,
    B,
    C,
    N,
    O,
    F,
    Na,
    Mg,
    Al,
    Si,
    P,
    S,
    Cl,
    K,
    Ca,
    Zn,
    Se,
    Br,
    I,
}

impl Element {
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Some(match symbol {
            "H" => Element::H,
            "Li" => Element::Li,
            "B" => Element::B,
            "C" => Element::C,
            "N" => Element::N,
            "O" => Element::O,
            "F" => Element::F,
            "Na" => Element::Na,
            "Mg" => Element::Mg,
            "Al" => Element::Al,
            "Si" => Element::Si,
            "P" => Element::P,
            "S" => Element::S,
            "Cl" => Element::Cl,
            "K" => Element::K,
            "Ca" => Element::Ca,
            "Zn" => Element::Zn,
            "Se" => Element::Se,
            "Br" => Element::Br,
            "I" => Element::I,
            _ => return None,
        })
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Element::H => "H",
            Element::Li => "Li",
            Element::B => "B",
            Element::C => "C",
            Element::N => "N",
            Element::O => "O",
            Element::F => "F",
            Element::Na => "Na",
            Element::Mg => "Mg",
            Element::Al => "Al",
            Element::Si => "Si",
            Element::P => "P",
            Element::S => "S",
            Element::Cl => "Cl",
            Element::K => "K",
            Element::Ca => "Ca",
            Element::Zn => "Zn",
            Element::Se => "Se",
            Element::Br => "Br",
            Element::I => "I",
        }
    }

    pub fn atomic_number(&self) -> u8 {
        match self {
            Element::H => 1,
            Element::Li => 3,
            Element::B => 5,
            Element::C => 6,
            Element::N => 7,
            Element::O => 8,
            Element::F => 9,
            Element::Na => 11,
            Element::Mg => 12,
            Element::Al => 13,
            Element::Si => 14,
            Element::P => 15,
            Element::S => 16,
            Element::Cl => 17,
            Element::K => 19,
            Element::Ca => 20,
            Element::Zn => 30,
            Element::Se => 34,
            Element::Br => 35,
            Element::I => 53,
        }
    }

    /// Valences tried in order when filling implicit hydrogens.
    pub fn default_valences(&self) -> &'static [u8] {
        match self {
            Element::H => &[1],
            Element::B => &[3],
            Element::C => &[4],
            Element::N => &[3, 5],
            Element::O => &[2],
            Element::F | Element::Cl | Element::Br | Element::I => &[1],
            Element::Si => &[4],
            Element::P => &[3, 5],
            Element::S | Element::Se => &[2, 4, 6],
            Element::Li | Element::Na | Element::K => &[1],
            Element::Mg | Element::Ca | Element::Zn => &[2],
            Element::Al => &[3],
        }
    }

    /// Metals only appear as counter-ions or as "-io" substituent prefixes.
    pub fn is_metal(&self) -> bool {
        self.metallo_prefix().is_some()
    }

    pub fn metallo_prefix(&self) -> Option<&'static str> {
        match self {
            Element::Li => Some("lithio"),
            Element::Na => Some("sodio"),
            Element::K => Some("potassio"),
            Element::Mg => Some("magnesio"),
            Element::Ca => Some("calcio"),
            Element::Al => Some("aluminio"),
            Element::Zn => Some("zincio"),
            _ => None,
        }
    }

    pub fn is_carbon(&self) -> bool {
        *self == Element::C
    }

    pub fn is_hydrogen(&self) -> bool {
        *self == Element::H
    }

    pub fn is_halogen(&self) -> bool {
        matches!(self, Element::F | Element::Cl | Element::Br | Element::I)
    }

    /// Atoms that may sit inside a parent skeleton in place of carbon.
    pub fn is_skeletal_heteroatom(&self) -> bool {
        self.replacement_prefix().is_some()
    }

    /// The "a" prefix used by replacement nomenclature.
    pub fn replacement_prefix(&self) -> Option<&'static str> {
        match self {
            Element::O => Some("oxa"),
            Element::S => Some("thia"),
            Element::Se => Some("selena"),
            Element::N => Some("aza"),
            Element::P => Some("phospha"),
            Element::Si => Some("sila"),
            Element::B => Some("bora"),
            _ => None,
        }
    }

    /// Lower is more senior: O > S > Se > N > P > Si > B.
    pub fn hetero_seniority(&self) -> u8 {
        match self {
            Element::O => 0,
            Element::S => 1,
            Element::Se => 2,
            Element::N => 3,
            Element::P => 4,
            Element::Si => 5,
            Element::B => 6,
            Element::C => u8::MAX,
            _ => 7,
        }
    }

    pub fn halo_prefix(&self) -> Option<&'static str> {
        match self {
            Element::F => Some("fluoro"),
            Element::Cl => Some("chloro"),
            Element::Br => Some("bromo"),
            Element::I => Some("iodo"),
            _ => None,
        }
    }

    pub fn halide_name(&self) -> Option<&'static str> {
        match self {
            Element::F => Some("fluoride"),
            Element::Cl => Some("chloride"),
            Element::Br => Some("bromide"),
            Element::I => Some("iodide"),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Element::H => "hydrogen",
            Element::Li => "lithium",
            Element::B => "boron",
            Element::C => "carbon",
            Element::N => "nitrogen",
            Element::O => "oxygen",
            Element::F => "fluorine",
            Element::Na => "sodium",
            Element::Mg => "magnesium",
            Element::Al => "aluminium",
            Element::Si => "silicon",
            Element::P => "phosphorus",
            Element::S => "sulfur",
            Element::Cl => "chlorine",
            Element::K => "potassium",
            Element::Ca => "calcium",
            Element::Zn => "zinc",
            Element::Se => "selenium",
            Element::Br => "bromine",
            Element::I => "iodine",
        }
    }
}

impl Display for Element {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.symbol())
    }
}

/// Opaque tetrahedral tag carried through from the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Chirality {
    Anticlockwise,
    Clockwise,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Atom {
    pub id: usize,
    pub element: Element,
    pub charge: i8,
    pub hydrogens: u8,
    pub isotope: Option<u16>,
    pub aromatic: bool,
    pub chirality: Option<Chirality>,
}

impl Atom {
    pub fn new(id: usize, element: Element) -> Self {
        Self {
            id,
            element,
            charge: 0,
            hydrogens: 0,
            isotope: None,
            aromatic: false,
            chirality: None,
        }
    }

    pub fn atomic_number(&self) -> u8 {
        self.element.atomic_number()
    }

    pub fn is_carbon(&self) -> bool {
        self.element.is_carbon()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Bond {
    Single,
    Double,
    Triple,
    Aromatic,
}

impl Bond {
    /// Contribution to an atom's valence; aromatic bonds count once and the
    /// missing half is taken from the hydrogen count instead.
    pub fn valence(&self) -> u8 {
        match self {
            Bond::Single | Bond::Aromatic => 1,
            Bond::Double => 2,
            Bond::Triple => 3,
        }
    }

    pub fn is_multiple(&self) -> bool {
        matches!(self, Bond::Double | Bond::Triple)
    }
}

/// One SSSR ring, stored in cyclic order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ring {
    atoms: Vec<usize>,
}

impl Ring {
    pub fn new(atoms: Vec<usize>) -> Self {
        Self { atoms }
    }

    pub fn atoms(&self) -> &[usize] {
        &self.atoms
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    pub fn contains(&self, atom: usize) -> bool {
        self.atoms.contains(&atom)
    }

    pub fn atom_set(&self) -> BTreeSet<usize> {
        self.atoms.iter().copied().collect()
    }

    /// Consecutive atom pairs, closing the cycle.
    pub fn edges(&self) -> Vec<(usize, usize)> {
        let n = self.atoms.len();
        (0..n)
            .map(|i| (self.atoms[i], self.atoms[(i + 1) % n]))
            .collect()
    }
}

pub type MoleculeGraph = UnGraph<Atom, Bond>;

/// Atoms, bonds and perceived rings. Atom ids double as node indices.
#[derive(Debug, Clone, Default)]
pub struct Molecule {
    graph: MoleculeGraph,
    rings: Vec<Ring>,
}

impl Molecule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_atom(&mut self, element: Element) -> usize {
        let id = self.graph.node_count();
        self.graph.add_node(Atom::new(id, element));
        id
    }

    /// Adds a fully described atom; its id is reassigned to its position.
    pub fn push_atom(&mut self, mut atom: Atom) -> usize {
        let id = self.graph.node_count();
        atom.id = id;
        self.graph.add_node(atom);
        id
    }

    pub fn add_bond(&mut self, a: usize, b: usize, bond: Bond) -> Result<(), MoleculeError> {
        let n = self.graph.node_count();
        if a >= n {
            return Err(MoleculeError::MissingAtom(a, n));
        }
        if b >= n {
            return Err(MoleculeError::MissingAtom(b, n));
        }
        if a == b {
            return Err(MoleculeError::SelfBond(a));
        }
        if self.bond(a, b).is_some() {
            return Err(MoleculeError::DuplicateBond(a.min(b), a.max(b)));
        }
        self.graph.add_edge(NodeIndex::new(a), NodeIndex::new(b), bond);
        Ok(())
    }

    pub(crate) fn atom_mut(&mut self, id: usize) -> Option<&mut Atom> {
        self.graph.node_weight_mut(NodeIndex::new(id))
    }

    pub(crate) fn set_bond(&mut self, a: usize, b: usize, bond: Bond) {
        if let Some(edge) = self.graph.find_edge(NodeIndex::new(a), NodeIndex::new(b)) {
            self.graph[edge] = bond;
        }
    }

    pub fn graph(&self) -> &MoleculeGraph {
        &self.graph
    }

    pub fn atom(&self, id: usize) -> &Atom {
        &self.graph[NodeIndex::new(id)]
    }

    pub fn get_atom(&self, id: usize) -> Option<&Atom> {
        self.graph.node_weight(NodeIndex::new(id))
    }

    pub fn element(&self, id: usize) -> Element {
        self.atom(id).element
    }

    pub fn atoms(&self) -> impl Iterator<Item = &Atom> {
        self.graph.node_weights()
    }

    pub fn atom_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn bond_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn bond(&self, a: usize, b: usize) -> Option<Bond> {
        if a >= self.atom_count() || b >= self.atom_count() {
            return None;
        }
        self.graph
            .find_edge(NodeIndex::new(a), NodeIndex::new(b))
            .map(|edge| self.graph[edge])
    }

    /// All bonds as `(low id, high id, bond)`, sorted.
    pub fn bonds(&self) -> Vec<(usize, usize, Bond)> {
        let mut bonds: Vec<_> = self
            .graph
            .edge_references()
            .map(|edge| {
                let (a, b) = (edge.source().index(), edge.target().index());
                (a.min(b), a.max(b), *edge.weight())
            })
            .collect();
        bonds.sort();
        bonds
    }

    /// Neighbours in ascending id order.
    pub fn neighbors(&self, id: usize) -> Vec<usize> {
        let mut out: Vec<usize> = self
            .graph
            .neighbors(NodeIndex::new(id))
            .map(|n| n.index())
            .collect();
        out.sort_unstable();
        out
    }

    /// Neighbours other than explicit hydrogen atoms.
    pub fn heavy_neighbors(&self, id: usize) -> Vec<usize> {
        self.neighbors(id)
            .into_iter()
            .filter(|&n| !self.element(n).is_hydrogen())
            .collect()
    }

    /// Implicit plus explicit hydrogens on an atom.
    pub fn total_hydrogens(&self, id: usize) -> usize {
        let explicit = self
            .neighbors(id)
            .into_iter()
            .filter(|&n| self.element(n).is_hydrogen())
            .count();
        self.atom(id).hydrogens as usize + explicit
    }

    pub fn rings(&self) -> &[Ring] {
        &self.rings
    }

    /// Replaces the ring annotation. Each ring is given as a set of atom ids;
    /// rings naming missing atoms or not forming a simple cycle are dropped.
    pub fn with_rings(mut self, rings: Vec<Vec<usize>>) -> Self {
        let mut kept = Vec::new();
        for (index, ring) in rings.into_iter().enumerate() {
            match self.order_ring(index, &ring) {
                Ok(ordered) => kept.push(ordered),
                Err(err) => warn!("dropping ring: {}", err),
            }
        }
        self.rings = kept;
        self
    }

    pub(crate) fn set_perceived_rings(&mut self, rings: Vec<Ring>) {
        self.rings = rings;
    }

    fn order_ring(&self, index: usize, ring: &[usize]) -> Result<Ring, NamingError> {
        if let Some(&missing) = ring.iter().find(|&&a| a >= self.atom_count()) {
            return Err(NamingError::MalformedRingData {
                ring: index,
                detail: format!("atom {missing} is not in the molecule"),
            });
        }
        let members: BTreeSet<usize> = ring.iter().copied().collect();
        if members.len() < 3 || members.len() != ring.len() {
            return Err(NamingError::MalformedRingData {
                ring: index,
                detail: "a ring needs at least three distinct atoms".to_string(),
            });
        }
        let inside = |a: usize| -> Vec<usize> {
            self.neighbors(a)
                .into_iter()
                .filter(|n| members.contains(n))
                .collect()
        };
        let start = *members.iter().next().unwrap_or(&0);
        let mut order = vec![start];
        let mut prev = start;
        let mut current = match inside(start).first() {
            Some(&n) => n,
            None => {
                return Err(NamingError::MalformedRingData {
                    ring: index,
                    detail: format!("atom {start} has no bonded ring neighbour"),
                })
            }
        };
        while current != start {
            if order.contains(&current) || order.len() > members.len() {
                break;
            }
            order.push(current);
            let next = inside(current).into_iter().find(|&n| n != prev);
            prev = current;
            current = match next {
                Some(n) => n,
                None => break,
            };
        }
        if order.len() != members.len() || members.iter().any(|&a| inside(a).len() != 2) {
            return Err(NamingError::MalformedRingData {
                ring: index,
                detail: "atoms do not form a simple cycle".to_string(),
            });
        }
        Ok(Ring::new(order))
    }

    pub fn ring_atoms(&self) -> BTreeSet<usize> {
        self.rings.iter().flat_map(|r| r.atoms().iter().copied()).collect()
    }

    pub fn is_ring_atom(&self, id: usize) -> bool {
        self.rings.iter().any(|r| r.contains(id))
    }

    /// Connected components as atom-id sets, ordered by their lowest id.
    pub fn components(&self) -> Vec<BTreeSet<usize>> {
        let mut seen = BTreeSet::new();
        let mut out = Vec::new();
        for start in 0..self.atom_count() {
            if seen.contains(&start) {
                continue;
            }
            let mut component = BTreeSet::new();
            let mut stack = vec![start];
            while let Some(atom) = stack.pop() {
                if component.insert(atom) {
                    stack.extend(self.neighbors(atom).into_iter().filter(|n| !component.contains(n)));
                }
            }
            seen.extend(component.iter().copied());
            out.push(component);
        }
        out
    }

    /// Hash of atom, bond and ring contents in id order.
    pub fn content_key(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        for atom in self.atoms() {
            (atom.element, atom.charge, atom.hydrogens, atom.isotope, atom.aromatic).hash(&mut hasher);
        }
        self.bonds().hash(&mut hasher);
        self.rings.hash(&mut hasher);
        hasher.finish()
    }

    /// Element counts, used by the formula fallback.
    pub fn element_counts(&self, atoms: &BTreeSet<usize>) -> BTreeMap<Element, usize> {
        let mut counts = BTreeMap::new();
        for &a in atoms {
            *counts.entry(self.element(a)).or_insert(0) += 1;
            if self.atom(a).hydrogens > 0 {
                *counts.entry(Element::H).or_insert(0) += self.atom(a).hydrogens as usize;
            }
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn propane() -> Molecule {
        let mut mol = Molecule::new();
        let a = mol.add_atom(Element::C);
        let b = mol.add_atom(Element::C);
        let c = mol.add_atom(Element::C);
        mol.add_bond(a, b, Bond::Single).unwrap();
        mol.add_bond(b, c, Bond::Single).unwrap();
        mol
    }

    #[test]
    fn test_bond_invariants() {
        let mut mol = propane();
        assert_eq!(mol.add_bond(0, 1, Bond::Double), Err(MoleculeError::DuplicateBond(0, 1)));
        assert_eq!(mol.add_bond(1, 0, Bond::Single), Err(MoleculeError::DuplicateBond(0, 1)));
        assert_eq!(mol.add_bond(2, 2, Bond::Single), Err(MoleculeError::SelfBond(2)));
        assert_eq!(mol.add_bond(0, 7, Bond::Single), Err(MoleculeError::MissingAtom(7, 3)));
        assert_eq!(mol.bond(2, 1), Some(Bond::Single));
        assert_eq!(mol.neighbors(1), vec![0, 2]);
    }

    #[test]
    fn test_malformed_rings_are_dropped() {
        let mut mol = Molecule::new();
        for _ in 0..4 {
            mol.add_atom(Element::C);
        }
        mol.add_bond(0, 1, Bond::Single).unwrap();
        mol.add_bond(1, 2, Bond::Single).unwrap();
        mol.add_bond(2, 0, Bond::Single).unwrap();
        mol.add_bond(2, 3, Bond::Single).unwrap();
        let mol = mol.with_rings(vec![vec![2, 0, 1], vec![0, 1, 9], vec![0, 1, 3]]);
        assert_eq!(mol.rings().len(), 1);
        assert_eq!(mol.rings()[0].atom_set(), [0, 1, 2].into_iter().collect());
        assert!(mol.is_ring_atom(2));
        assert!(!mol.is_ring_atom(3));
    }

    #[test]
    fn test_content_key_tracks_contents() {
        let a = propane();
        let b = propane();
        assert_eq!(a.content_key(), b.content_key());
        let mut c = propane();
        c.atom_mut(2).unwrap().element = Element::O;
        assert_ne!(a.content_key(), c.content_key());
    }

    #[test]
    fn test_element_table() {
        for symbol in ["H", "Li", "B", "C", "N", "O", "F", "Na", "Mg", "Al", "Si", "P", "S", "Cl", "K", "Ca", "Zn", "Se", "Br", "I"] {
            let element = Element::from_symbol(symbol).unwrap();
            assert_eq!(element.symbol(), symbol);
        }
        assert_eq!(Element::from_symbol("Xx"), None);
        assert_eq!(Element::Na.atomic_number(), 11);
        assert_eq!(Element::Zn.name(), "zinc");
        assert!(Element::K.is_metal());
        assert!(!Element::K.is_skeletal_heteroatom());
        assert!(!Element::Si.is_metal());
        assert_eq!(Element::Li.metallo_prefix(), Some("lithio"));
    }

    #[test]
    fn test_components() {
        let mut mol = propane();
        mol.add_atom(Element::O);
        let components = mol.components();
        assert_eq!(components.len(), 2);
        assert_eq!(components[1], [3].into_iter().collect());
    }
}
