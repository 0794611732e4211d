use crate::{
    ring_base, FunctionalGroup, GroupKind, Molecule, NamingOptions, RingAnalysis, RingBase, RingUnit, Traversal,
    UnitShape,
};
use std::collections::{BTreeMap, BTreeSet};
use tracing::*;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidateKind {
    Chain,
    Ring { unit: RingUnit, base: RingBase },
}

/// A possible parent structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub kind: CandidateKind,
    /// A chain in canonical orientation, or the ring unit's atoms in id order.
    pub atoms: Vec<usize>,
    pub atom_set: BTreeSet<usize>,
    pub carbons: usize,
    pub heteroatoms: usize,
    pub aromatic: bool,
}

impl Candidate {
    pub fn chain(molecule: &Molecule, path: Vec<usize>) -> Self {
        let carbons = path.iter().filter(|&&a| molecule.element(a).is_carbon()).count();
        Self {
            kind: CandidateKind::Chain,
            atom_set: path.iter().copied().collect(),
            heteroatoms: path.len() - carbons,
            carbons,
            atoms: path,
            aromatic: false,
        }
    }

    pub fn ring(molecule: &Molecule, unit: RingUnit) -> Self {
        let base = ring_base(molecule, &unit);
        let atoms: Vec<usize> = unit.atoms.iter().copied().collect();
        let carbons = atoms.iter().filter(|&&a| molecule.element(a).is_carbon()).count();
        Self {
            atom_set: unit.atoms.clone(),
            heteroatoms: atoms.len() - carbons,
            carbons,
            atoms,
            aromatic: base.aromatic,
            kind: CandidateKind::Ring { unit, base },
        }
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    pub fn contains(&self, atom: usize) -> bool {
        self.atom_set.contains(&atom)
    }

    pub fn is_chain(&self) -> bool {
        matches!(self.kind, CandidateKind::Chain)
    }

    pub fn is_ring(&self) -> bool {
        !self.is_chain()
    }

    pub fn is_union(&self) -> bool {
        matches!(&self.kind, CandidateKind::Ring { unit, .. } if unit.is_union())
    }

    pub fn is_monocycle(&self) -> bool {
        matches!(&self.kind, CandidateKind::Ring { unit, .. } if unit.shape == UnitShape::Mono)
    }

    pub fn ring_base(&self) -> Option<&RingBase> {
        match &self.kind {
            CandidateKind::Ring { base, .. } => Some(base),
            CandidateKind::Chain => None,
        }
    }

    /// Every numbering the parent allows.
    pub fn traversals(&self) -> Vec<Traversal> {
        match &self.kind {
            CandidateKind::Chain => {
                let forward = self.atoms.clone();
                let mut reverse = forward.clone();
                reverse.reverse();
                let labels: Vec<String> = (1..=forward.len()).map(|i| i.to_string()).collect();
                let mut out = vec![Traversal { order: forward, labels: labels.clone() }];
                if self.atoms.len() > 1 {
                    out.push(Traversal { order: reverse, labels });
                }
                out
            }
            CandidateKind::Ring { base, .. } => base.traversals.clone(),
        }
    }
}

/// The region being named and the facts the generator filters by.
pub struct CandidateQuery<'a> {
    pub molecule: &'a Molecule,
    pub rings: &'a RingAnalysis,
    pub groups: &'a [FunctionalGroup],
    pub principal: Option<GroupKind>,
    pub region: &'a BTreeSet<usize>,
    /// Principal anchors, or the attachment atom of a substituent.
    pub required: &'a BTreeSet<usize>,
    pub attachment: Option<usize>,
    pub options: &'a NamingOptions,
}

impl CandidateQuery<'_> {
    /// Every perceived ring atom. A ring cut by the region boundary still
    /// keeps its atoms out of chains.
    fn ring_atoms(&self) -> &BTreeSet<usize> {
        &self.rings.ring_atoms
    }

    /// Group atoms that must sit outside a chain.
    fn group_atoms(&self) -> BTreeSet<usize> {
        let mut out = BTreeSet::new();
        for group in self.groups {
            for &atom in &group.atoms {
                let kept_anchor = atom == group.anchor
                    && (Some(group.kind) == self.principal || group.kind == GroupKind::Aldehyde);
                if !kept_anchor && Some(atom) != self.attachment {
                    out.insert(atom);
                }
            }
        }
        out
    }

    fn skeletal_bridge(&self, atom: usize) -> bool {
        self.groups
            .iter()
            .filter(|g| g.contains(atom))
            .all(|g| matches!(g.kind, GroupKind::Ether | GroupKind::Sulfide | GroupKind::Amine))
    }
}

fn required_count(path: &[usize], required: &BTreeSet<usize>) -> usize {
    path.iter().filter(|a| required.contains(a)).count()
}

fn neighbors_in(molecule: &Molecule, atom: usize, eligible: &BTreeSet<usize>) -> Vec<usize> {
    molecule
        .heavy_neighbors(atom)
        .into_iter()
        .filter(|n| eligible.contains(n))
        .collect()
}

/// First pass: the best (required atoms, length) over all simple paths.
fn best_path_score(molecule: &Molecule, eligible: &BTreeSet<usize>, required: &BTreeSet<usize>) -> (usize, usize) {
    fn walk(
        molecule: &Molecule,
        eligible: &BTreeSet<usize>,
        required: &BTreeSet<usize>,
        path: &mut Vec<usize>,
        best: &mut (usize, usize),
    ) {
        let score = (required_count(path, required), path.len());
        if score > *best {
            *best = score;
        }
        let Some(&last) = path.last() else { return };
        for next in neighbors_in(molecule, last, eligible) {
            if path.contains(&next) {
                continue;
            }
            path.push(next);
            walk(molecule, eligible, required, path, best);
            path.pop();
        }
    }

    let mut best = (0, 0);
    for &start in eligible {
        walk(molecule, eligible, required, &mut vec![start], &mut best);
    }
    best
}

/// Second pass: every path with exactly the best score, each kept in the
/// orientation that compares lower than its reverse.
fn paths_with_score(
    molecule: &Molecule,
    eligible: &BTreeSet<usize>,
    required: &BTreeSet<usize>,
    score: (usize, usize),
) -> Vec<Vec<usize>> {
    fn walk(
        molecule: &Molecule,
        eligible: &BTreeSet<usize>,
        required: &BTreeSet<usize>,
        score: (usize, usize),
        path: &mut Vec<usize>,
        found: &mut BTreeMap<Vec<usize>, Vec<usize>>,
    ) {
        if path.len() == score.1 {
            if required_count(path, required) == score.0 {
                let mut reverse = path.clone();
                reverse.reverse();
                let canonical = if reverse < *path { reverse } else { path.clone() };
                let mut key = canonical.clone();
                key.sort_unstable();
                trace!("chain path {:?}", canonical);
                found
                    .entry(key)
                    .and_modify(|kept| {
                        if canonical < *kept {
                            *kept = canonical.clone();
                        }
                    })
                    .or_insert(canonical);
            }
            return;
        }
        let Some(&last) = path.last() else { return };
        for next in neighbors_in(molecule, last, eligible) {
            if path.contains(&next) {
                continue;
            }
            path.push(next);
            walk(molecule, eligible, required, score, path, found);
            path.pop();
        }
    }

    let mut found = BTreeMap::new();
    if score.1 == 0 {
        return Vec::new();
    }
    for &start in eligible {
        walk(molecule, eligible, required, score, &mut vec![start], &mut found);
    }
    let mut paths: Vec<Vec<usize>> = found.into_values().collect();
    paths.sort();
    paths
}

/// Paths through skeletal heteroatoms that hold exactly `carbons` carbons,
/// start and end on carbon, and carry `required_atoms` required atoms. A
/// path that could still grow at either end is not a parent chain.
fn hetero_paths(
    molecule: &Molecule,
    eligible: &BTreeSet<usize>,
    required: &BTreeSet<usize>,
    carbons: usize,
    required_atoms: usize,
) -> Vec<Vec<usize>> {
    fn walk(
        molecule: &Molecule,
        eligible: &BTreeSet<usize>,
        carbons: usize,
        path: &mut Vec<usize>,
        found: &mut Vec<Vec<usize>>,
    ) {
        let count = path.iter().filter(|&&a| molecule.element(a).is_carbon()).count();
        if count > carbons {
            return;
        }
        let Some(&last) = path.last() else { return };
        let closed = |end: usize| neighbors_in(molecule, end, eligible).iter().all(|n| path.contains(n));
        if count == carbons && molecule.element(last).is_carbon() && path.len() > count && closed(path[0]) && closed(last)
        {
            found.push(path.clone());
        }
        for next in neighbors_in(molecule, last, eligible) {
            if path.contains(&next) {
                continue;
            }
            path.push(next);
            walk(molecule, eligible, carbons, path, found);
            path.pop();
        }
    }

    let mut found = Vec::new();
    for &start in eligible.iter().filter(|&&a| molecule.element(a).is_carbon()) {
        walk(molecule, eligible, carbons, &mut vec![start], &mut found);
    }
    found.retain(|p| required_count(p, required) == required_atoms);
    let Some(longest) = found.iter().map(Vec::len).max() else {
        return Vec::new();
    };

    let mut unique: BTreeMap<Vec<usize>, Vec<usize>> = BTreeMap::new();
    for path in found.into_iter().filter(|p| p.len() == longest) {
        let mut reverse = path.clone();
        reverse.reverse();
        let canonical = if reverse < path { reverse } else { path };
        let mut key = canonical.clone();
        key.sort_unstable();
        unique
            .entry(key)
            .and_modify(|kept| {
                if canonical < *kept {
                    *kept = canonical.clone();
                }
            })
            .or_insert(canonical);
    }
    unique.into_values().collect()
}

/// Enumerates chain and ring parent candidates for a region.
pub fn generate_candidates(query: &CandidateQuery) -> Vec<Candidate> {
    let molecule = query.molecule;
    let ring_atoms = query.ring_atoms();
    let group_atoms = query.group_atoms();

    let carbons: BTreeSet<usize> = query
        .region
        .iter()
        .copied()
        .filter(|&a| molecule.element(a).is_carbon() && !ring_atoms.contains(&a) && !group_atoms.contains(&a))
        .collect();

    let mut out = Vec::new();
    let score = best_path_score(molecule, &carbons, query.required);
    for path in paths_with_score(molecule, &carbons, query.required, score) {
        out.push(Candidate::chain(molecule, path));
    }

    if query.options.hetero_chains && score.1 > 0 {
        let mut eligible = carbons.clone();
        eligible.extend(query.region.iter().copied().filter(|&a| {
            molecule.element(a).is_skeletal_heteroatom()
                && molecule.atom(a).charge == 0
                && !ring_atoms.contains(&a)
                && query.skeletal_bridge(a)
        }));
        if eligible.len() > carbons.len() {
            for path in hetero_paths(molecule, &eligible, query.required, score.1, score.0) {
                out.push(Candidate::chain(molecule, path));
            }
        }
    }

    for system in &query.rings.systems {
        for unit in &system.units {
            if unit.atoms.iter().all(|a| query.region.contains(a)) {
                out.push(Candidate::ring(molecule, unit.clone()));
            }
        }
    }

    if let Some(attachment) = query.attachment {
        out.retain(|c| c.contains(attachment));
    }
    debug!(
        "{} candidates ({} chains, {} rings)",
        out.len(),
        out.iter().filter(|c| c.is_chain()).count(),
        out.iter().filter(|c| c.is_ring()).count()
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{detect_functional_groups, parse_smiles, principal_kind};

    fn candidates(smiles: &str) -> Vec<Candidate> {
        let molecule = parse_smiles(smiles).unwrap();
        let rings = RingAnalysis::new(&molecule);
        let groups = detect_functional_groups(&molecule);
        let principal = principal_kind(&groups);
        let region: BTreeSet<usize> = (0..molecule.atom_count()).collect();
        let required: BTreeSet<usize> = groups
            .iter()
            .filter(|g| Some(g.kind) == principal)
            .map(|g| g.anchor)
            .collect();
        let options = NamingOptions::default();
        let query = CandidateQuery {
            molecule: &molecule,
            rings: &rings,
            groups: &groups,
            principal,
            region: &region,
            required: &required,
            attachment: None,
            options: &options,
        };
        generate_candidates(&query)
    }

    fn chains(smiles: &str) -> Vec<Vec<usize>> {
        candidates(smiles)
            .into_iter()
            .filter(|c| c.is_chain())
            .map(|c| c.atoms)
            .collect()
    }

    #[test]
    fn test_longest_chains() {
        assert_eq!(chains("CCCC"), vec![vec![0, 1, 2, 3]]);
        assert_eq!(chains("CC(C)C"), vec![vec![0, 1, 2], vec![0, 1, 3], vec![2, 1, 3]]);
        assert_eq!(chains("C"), vec![vec![0]]);
    }

    #[test]
    fn test_chains_carry_principal_groups() {
        // The acid carbon must be in the chain even though a longer path exists.
        assert_eq!(chains("CCCC(CC(=O)O)CCCCC"), vec![vec![5, 4, 3, 8, 9, 10, 11, 12]]);
    }

    #[test]
    fn test_group_atoms_leave_chains() {
        assert_eq!(chains("OCC(=O)O"), vec![vec![1, 2]]);
        // The principal nitrile carbon stays in the chain; halogens never do.
        assert_eq!(chains("CC#N"), vec![vec![0, 1]]);
        assert_eq!(chains("ClCCl"), vec![vec![1]]);
    }

    #[test]
    fn test_ring_candidates() {
        let found = candidates("CC1CCCCC1");
        assert_eq!(found.iter().filter(|c| c.is_ring()).count(), 1);
        assert_eq!(chains("CC1CCCCC1"), vec![vec![0]]);
        let naphthalene = candidates("c1ccc2ccccc2c1");
        assert_eq!(naphthalene.len(), 1);
        assert!(naphthalene[0].is_union());
    }

    #[test]
    fn test_polycyclic_systems_are_one_candidate() {
        for smiles in [
            "c1ccc2cc3ccccc3cc2c1",
            "C1C2CC3CC1CC(C2)C3",
            "C12C3C4C1C5C2C3C45",
            "C1CCC2C(C1)CCC1C2CCC2CCCC12",
        ] {
            let found = candidates(smiles);
            assert_eq!(found.len(), 1, "{smiles}");
            assert!(found[0].is_ring(), "{smiles}");
            assert_eq!(found[0].len(), parse_smiles(smiles).unwrap().atom_count(), "{smiles}");
        }
    }

    #[test]
    fn test_ring_atoms_never_join_chains() {
        // Two spiro junctions leave three separate rings; none lends atoms to a chain.
        let found = candidates("CC1CCC2(CC1)CCC1(CC2)CCC1");
        assert!(found.iter().filter(|c| c.is_chain()).all(|c| c.atoms == vec![0]));
    }

    fn hetero_chains(smiles: &str) -> Vec<Vec<usize>> {
        candidates(smiles)
            .into_iter()
            .filter(|c| c.is_chain() && c.heteroatoms > 0)
            .map(|c| c.atoms)
            .collect()
    }

    #[test]
    fn test_ether_chains_stay_carbon_only() {
        // Heteroatom paths only compete when they hold as many carbons as the best carbon path.
        assert!(hetero_chains("CCOCC").is_empty());
        assert!(hetero_chains("COC").is_empty());
    }

    #[test]
    fn test_hetero_chains_run_end_to_end() {
        // C-O-C-C(OH) would stop short of the methyl on the carbinol carbon.
        assert!(hetero_chains("CC(O)COC").is_empty());
        assert_eq!(hetero_chains("COC(C)CC"), vec![vec![0, 1, 2, 4, 5]]);
    }

    #[test]
    fn test_charged_atoms_stay_out_of_hetero_chains() {
        assert!(hetero_chains("CC[N+](C)(C)C").is_empty());
    }
}
