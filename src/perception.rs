use crate::{Bond, Element, Molecule, Ring};
use petgraph::algo::connected_components;
use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;
use std::collections::{BTreeSet, VecDeque};
use tracing::*;

/// Runs ring perception followed by aromaticity perception.
pub fn annotate(molecule: Molecule) -> Molecule {
    let rings = find_sssr(&molecule);
    let mut molecule = molecule;
    molecule.set_perceived_rings(rings);
    perceive_aromaticity(molecule)
}

/// Number of independent cycles: E - V + C.
pub fn expected_ring_count(molecule: &Molecule) -> usize {
    let v = molecule.atom_count();
    let e = molecule.bond_count();
    let c = connected_components(molecule.graph());
    (e + c).saturating_sub(v)
}

/// Smallest set of smallest rings, from Horton candidates filtered by
/// GF(2) independence of their edge sets.
pub fn find_sssr(molecule: &Molecule) -> Vec<Ring> {
    let expected = expected_ring_count(molecule);
    if expected == 0 {
        return vec![];
    }
    let candidates = horton_candidates(molecule);
    let num_edges = molecule.bond_count();

    let mut rings = Vec::with_capacity(expected);
    let mut basis: Vec<Vec<u64>> = Vec::with_capacity(expected);
    for ring in &candidates {
        if rings.len() >= expected {
            break;
        }
        let bv = ring_to_edge_bitvector(ring, num_edges, molecule);
        if bv.iter().all(|&w| w == 0) {
            continue;
        }
        if try_add_to_basis(&mut basis, bv) {
            rings.push(normalize_ring(ring));
        }
    }
    rings.sort_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));
    trace!("perceived {} of {} expected rings", rings.len(), expected);
    rings.into_iter().map(Ring::new).collect()
}

fn horton_candidates(molecule: &Molecule) -> Vec<Vec<usize>> {
    let n = molecule.atom_count();
    let dist = all_pairs_bfs(molecule, n);
    let pred = all_pairs_predecessors(molecule, n, &dist);

    let mut candidates = Vec::new();
    for (u, v, _) in molecule.bonds() {
        for w in 0..n {
            let du = dist[w][u];
            let dv = dist[w][v];
            if du == u32::MAX || dv == u32::MAX {
                continue;
            }
            if du as usize + dv as usize + 1 < 3 {
                continue;
            }
            let path_u = reconstruct_path(&pred, w, u);
            let path_v = reconstruct_path(&pred, w, v);
            if path_u.is_empty() || path_v.is_empty() || paths_share_internal_node(&path_u, &path_v) {
                continue;
            }
            let mut ring = path_u;
            for &node in path_v[1..].iter().rev() {
                ring.push(node);
            }
            candidates.push(ring);
        }
    }
    candidates.sort_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));
    candidates.dedup();
    candidates
}

fn all_pairs_bfs(molecule: &Molecule, n: usize) -> Vec<Vec<u32>> {
    let mut dist = vec![vec![u32::MAX; n]; n];
    for (src, row) in dist.iter_mut().enumerate() {
        row[src] = 0;
        let mut queue = VecDeque::from([src]);
        while let Some(cur) = queue.pop_front() {
            let d = row[cur];
            for nb in molecule.neighbors(cur) {
                if row[nb] == u32::MAX {
                    row[nb] = d + 1;
                    queue.push_back(nb);
                }
            }
        }
    }
    dist
}

fn all_pairs_predecessors(molecule: &Molecule, n: usize, dist: &[Vec<u32>]) -> Vec<Vec<Option<usize>>> {
    let mut pred = vec![vec![None; n]; n];
    for src in 0..n {
        let mut visited = vec![false; n];
        visited[src] = true;
        let mut queue = VecDeque::from([src]);
        while let Some(cur) = queue.pop_front() {
            for nb in molecule.neighbors(cur) {
                if !visited[nb] && dist[src][nb] == dist[src][cur] + 1 {
                    visited[nb] = true;
                    pred[src][nb] = Some(cur);
                    queue.push_back(nb);
                }
            }
        }
    }
    pred
}

fn reconstruct_path(pred: &[Vec<Option<usize>>], src: usize, dst: usize) -> Vec<usize> {
    let mut path = vec![dst];
    let mut cur = dst;
    while cur != src {
        match pred[src][cur] {
            Some(p) => {
                path.push(p);
                cur = p;
            }
            None => return vec![],
        }
    }
    path.reverse();
    path
}

fn paths_share_internal_node(path_u: &[usize], path_v: &[usize]) -> bool {
    if path_u.len() < 2 || path_v.len() < 2 {
        return false;
    }
    path_u[1..].iter().any(|node| path_v[1..].contains(node))
}

fn ring_to_edge_bitvector(ring: &[usize], num_edges: usize, molecule: &Molecule) -> Vec<u64> {
    let mut bv = vec![0u64; num_edges.div_ceil(64)];
    let len = ring.len();
    for i in 0..len {
        let (a, b) = (NodeIndex::new(ring[i]), NodeIndex::new(ring[(i + 1) % len]));
        if let Some(edge) = molecule.graph().find_edge(a, b) {
            let idx = edge.index();
            bv[idx / 64] |= 1u64 << (idx % 64);
        }
    }
    bv
}

fn try_add_to_basis(basis: &mut Vec<Vec<u64>>, candidate: Vec<u64>) -> bool {
    let mut v = candidate;
    for row in basis.iter() {
        if let Some(p) = leading_bit(row) {
            if v[p / 64] & (1u64 << (p % 64)) != 0 {
                xor_into(&mut v, row);
            }
        }
    }
    if v.iter().all(|&w| w == 0) {
        return false;
    }
    basis.push(v);
    true
}

fn leading_bit(bv: &[u64]) -> Option<usize> {
    bv.iter()
        .enumerate()
        .find(|(_, &word)| word != 0)
        .map(|(i, &word)| i * 64 + word.trailing_zeros() as usize)
}

fn xor_into(a: &mut [u64], b: &[u64]) {
    for (aw, bw) in a.iter_mut().zip(b.iter()) {
        *aw ^= *bw;
    }
}

/// Rotates the ring to start at its smallest id, walking toward the smaller neighbour.
fn normalize_ring(ring: &[usize]) -> Vec<usize> {
    let len = ring.len();
    let min_pos = ring
        .iter()
        .enumerate()
        .min_by_key(|&(_, id)| id)
        .map(|(i, _)| i)
        .unwrap_or(0);
    let mut normalized: Vec<usize> = (0..len).map(|i| ring[(min_pos + i) % len]).collect();
    if len > 2 && normalized[1] > normalized[len - 1] {
        normalized[1..].reverse();
    }
    normalized
}

/// Hückel aromaticity over the perceived rings. Returns a new molecule in
/// which aromatic rings have aromatic atoms and aromatic ring bonds, and
/// aromatic bonds outside any aromatic ring are demoted to single bonds.
pub fn perceive_aromaticity(molecule: Molecule) -> Molecule {
    let ring_atoms = molecule.ring_atoms();
    let aromatic_rings: Vec<Ring> = molecule
        .rings()
        .iter()
        .filter(|ring| is_aromatic_ring(&molecule, ring, &ring_atoms))
        .cloned()
        .collect();

    let mut aromatic_atoms = BTreeSet::new();
    let mut aromatic_bonds = BTreeSet::new();
    for ring in &aromatic_rings {
        aromatic_atoms.extend(ring.atoms().iter().copied());
        for (a, b) in ring.edges() {
            aromatic_bonds.insert((a.min(b), a.max(b)));
        }
    }

    let mut out = molecule;
    for id in 0..out.atom_count() {
        let aromatic = aromatic_atoms.contains(&id);
        if let Some(atom) = out.atom_mut(id) {
            atom.aromatic = aromatic;
        }
    }
    for (a, b, bond) in out.bonds() {
        if aromatic_bonds.contains(&(a, b)) {
            out.set_bond(a, b, Bond::Aromatic);
        } else if bond == Bond::Aromatic {
            out.set_bond(a, b, Bond::Single);
        }
    }
    debug!(
        "{} of {} rings are aromatic",
        aromatic_rings.len(),
        out.rings().len()
    );
    out
}

fn is_aromatic_ring(molecule: &Molecule, ring: &Ring, ring_atoms: &BTreeSet<usize>) -> bool {
    if ring.len() < 5 || ring.len() > 7 {
        return false;
    }
    let already_aromatic = ring.atoms().iter().all(|&a| molecule.atom(a).aromatic)
        && ring
            .edges()
            .iter()
            .all(|&(a, b)| molecule.bond(a, b) == Some(Bond::Aromatic));
    if already_aromatic {
        return true;
    }
    let mut pi_total = 0usize;
    for &atom in ring.atoms() {
        match pi_electrons(molecule, atom, ring, ring_atoms) {
            Some(e) => pi_total += e,
            None => return false,
        }
    }
    pi_total >= 2 && (pi_total - 2) % 4 == 0
}

fn pi_electrons(molecule: &Molecule, atom: usize, ring: &Ring, ring_atoms: &BTreeSet<usize>) -> Option<usize> {
    let element = molecule.element(atom);
    let mut endocyclic_double = false;
    let mut aromatic_bond = false;
    for edge in molecule.graph().edges(NodeIndex::new(atom)) {
        let other = if edge.source().index() == atom {
            edge.target().index()
        } else {
            edge.source().index()
        };
        match *edge.weight() {
            Bond::Triple => return None,
            Bond::Double if ring.contains(other) || ring_atoms.contains(&other) => endocyclic_double = true,
            // Exocyclic C=O and friends break the pi system.
            Bond::Double => return None,
            Bond::Aromatic if ring.contains(other) => aromatic_bond = true,
            _ => {}
        }
    }
    if endocyclic_double {
        return Some(1);
    }
    let heavy = molecule.heavy_neighbors(atom).len();
    match element {
        Element::C if aromatic_bond && molecule.atom(atom).aromatic => Some(1),
        Element::N if molecule.atom(atom).charge == 0 => {
            if aromatic_bond && molecule.atom(atom).aromatic && molecule.total_hydrogens(atom) == 0 && heavy < 3 {
                Some(1)
            } else {
                Some(2)
            }
        }
        Element::O | Element::S | Element::Se if molecule.atom(atom).charge == 0 && heavy == 2 => Some(2),
        Element::B if aromatic_bond => Some(0),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_smiles;

    #[test]
    fn test_ring_counts() {
        let cases = [
            ("CCO", 0),
            ("C1CCCCC1", 1),
            ("c1ccc2ccccc2c1", 2),
            ("C1CCC2(CC1)CCC2", 2),
            ("C1CC2CCC1C2", 2),
        ];
        for (smiles, expected) in cases {
            let molecule = parse_smiles(smiles).unwrap();
            assert_eq!(expected_ring_count(&molecule), expected, "{smiles}");
            assert_eq!(molecule.rings().len(), expected, "{smiles}");
        }
    }

    #[test]
    fn test_sssr_picks_smallest_rings() {
        let molecule = parse_smiles("C1CCC2CCCCC2C1").unwrap();
        let sizes: Vec<usize> = molecule.rings().iter().map(|r| r.len()).collect();
        assert_eq!(sizes, vec![6, 6]);
    }

    #[test]
    fn test_aromaticity() {
        let cases = [
            ("C1=CC=CC=C1", true),
            ("c1ccncc1", true),
            ("c1ccoc1", true),
            ("c1ccsc1", true),
            ("c1cc[nH]c1", true),
            ("C1=CNC=C1", true),
            ("C1=CCC=C1", false),
            ("C1CCCCC1", false),
            ("O=C1C=CC(=O)C=C1", false),
        ];
        for (smiles, aromatic) in cases {
            let molecule = parse_smiles(smiles).unwrap();
            assert_eq!(
                molecule.atoms().all(|a| a.aromatic),
                aromatic,
                "{smiles}"
            );
        }
    }

    #[test]
    fn test_kekule_naphthalene_is_aromatic() {
        let molecule = parse_smiles("C1=CC=C2C=CC=CC2=C1").unwrap();
        assert!(molecule.atoms().all(|a| a.aromatic));
        assert_eq!(molecule.rings().len(), 2);
    }

    #[test]
    fn test_aromatic_bond_between_rings_is_single() {
        let molecule = parse_smiles("c1ccccc1c1ccccc1").unwrap();
        assert_eq!(molecule.bond(5, 6), Some(Bond::Single));
    }
}
