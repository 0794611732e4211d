use crate::{alpha_key, Bond, Candidate, CandidateKind, Element, FunctionalGroup, Molecule, Traversal};
use std::cmp::{Ordering, Reverse};
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::fmt;
use tracing::*;

/// Where a substituent sits: on a numbered parent atom, or on the nitrogen
/// of an amide-type suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Locant {
    Nitrogen,
    Position(usize),
}

impl fmt::Display for Locant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locant::Nitrogen => write!(f, "N"),
            Locant::Position(n) => write!(f, "{n}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Reverse,
}

/// Locant sets compared component by component, first point of difference.
/// A missing entry counts as larger than any locant.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PriorityLocants(pub Vec<Vec<usize>>);

fn compare_locants(a: &[usize], b: &[usize]) -> Ordering {
    for i in 0..a.len().max(b.len()) {
        match (a.get(i), b.get(i)) {
            (Some(x), Some(y)) if x != y => return x.cmp(y),
            (Some(_), None) => return Ordering::Less,
            (None, Some(_)) => return Ordering::Greater,
            _ => {}
        }
    }
    Ordering::Equal
}

impl Ord for PriorityLocants {
    fn cmp(&self, other: &Self) -> Ordering {
        let empty = Vec::new();
        for i in 0..self.0.len().max(other.0.len()) {
            let a = self.0.get(i).unwrap_or(&empty);
            let b = other.0.get(i).unwrap_or(&empty);
            match compare_locants(a, b) {
                Ordering::Equal => continue,
                unequal => return unequal,
            }
        }
        Ordering::Equal
    }
}

impl PartialOrd for PriorityLocants {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A side branch rooted on a parent atom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchRoot {
    pub parent: usize,
    pub start: usize,
    pub atoms: BTreeSet<usize>,
}

/// Atoms reachable from `start` through atoms `allowed` accepts.
pub fn reachable(molecule: &Molecule, start: usize, allowed: impl Fn(usize) -> bool) -> BTreeSet<usize> {
    let mut seen = BTreeSet::from([start]);
    let mut queue = VecDeque::from([start]);
    while let Some(atom) = queue.pop_front() {
        for next in molecule.heavy_neighbors(atom) {
            if !seen.contains(&next) && allowed(next) {
                seen.insert(next);
                queue.push_back(next);
            }
        }
    }
    seen
}

/// Locant of a multiple bond between positions `a` and `b`. The closing bond
/// of a monocycle takes the higher locant.
pub fn bond_locant(a: usize, b: usize, size: usize, cyclic: bool) -> usize {
    let (lo, hi) = (a.min(b), a.max(b));
    if cyclic && hi - lo != 1 && lo == 1 && hi == size {
        hi
    } else {
        lo
    }
}

/// Everything about a candidate that numbering has to place.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParentFeatures {
    /// Parent atoms carrying a principal group, one entry per group. For a
    /// substituent this is the attachment atom.
    pub principal: Vec<usize>,
    /// Indices of the carried groups in the principal group list.
    pub carried: Vec<usize>,
    /// Group atoms outside the parent that are expressed by the suffix.
    pub consumed: BTreeSet<usize>,
    pub unsaturation: Vec<(usize, usize, Bond)>,
    pub hetero: Vec<(usize, Element)>,
    pub branches: Vec<BranchRoot>,
    pub nitrogen_branches: Vec<BranchRoot>,
}

impl ParentFeatures {
    pub fn new(
        molecule: &Molecule,
        candidate: &Candidate,
        principal_groups: &[FunctionalGroup],
        attachment: Option<usize>,
        region: &BTreeSet<usize>,
    ) -> Self {
        let mut features = Self::default();

        if let Some(attachment) = attachment {
            features.principal.push(attachment);
        }
        for (index, group) in principal_groups.iter().enumerate() {
            let carrier = match &candidate.kind {
                CandidateKind::Chain => candidate.contains(group.anchor).then_some(group.anchor),
                CandidateKind::Ring { .. } if group.kind.carbon_in_group() && !candidate.contains(group.anchor) => {
                    molecule
                        .heavy_neighbors(group.anchor)
                        .into_iter()
                        .find(|&n| candidate.contains(n))
                }
                CandidateKind::Ring { .. } => candidate.contains(group.anchor).then_some(group.anchor),
            };
            let Some(carrier) = carrier else { continue };
            features.principal.push(carrier);
            features.carried.push(index);
            features
                .consumed
                .extend(group.atoms.iter().copied().filter(|&a| a != carrier && !candidate.contains(a)));
            if !candidate.contains(group.anchor) {
                features.consumed.insert(group.anchor);
            }
        }

        features.unsaturation = match &candidate.kind {
            CandidateKind::Chain => candidate
                .atoms
                .windows(2)
                .filter_map(|w| match molecule.bond(w[0], w[1]) {
                    Some(bond @ (Bond::Double | Bond::Triple)) => Some((w[0], w[1], bond)),
                    _ => None,
                })
                .collect(),
            CandidateKind::Ring { base, .. } => base.unsaturation.clone(),
        };
        features.hetero = candidate
            .atoms
            .iter()
            .map(|&a| (a, molecule.element(a)))
            .filter(|(_, e)| !e.is_carbon())
            .collect();

        let mut claimed: BTreeSet<usize> = candidate.atom_set.clone();
        claimed.extend(features.consumed.iter().copied());

        for &index in &features.carried {
            let Some(nitrogen) = principal_groups[index].nitrogen else { continue };
            for start in molecule.heavy_neighbors(nitrogen) {
                if claimed.contains(&start) || !region.contains(&start) {
                    continue;
                }
                let atoms = reachable(molecule, start, |a| !claimed.contains(&a) && region.contains(&a));
                claimed.extend(atoms.iter().copied());
                features.nitrogen_branches.push(BranchRoot { parent: nitrogen, start, atoms });
            }
        }

        for &parent in &candidate.atom_set {
            for start in molecule.heavy_neighbors(parent) {
                if claimed.contains(&start) || !region.contains(&start) {
                    continue;
                }
                let atoms = reachable(molecule, start, |a| !claimed.contains(&a) && region.contains(&a));
                claimed.extend(atoms.iter().copied());
                features.branches.push(BranchRoot { parent, start, atoms });
            }
        }
        features
    }

    /// The priority-locant vector of one traversal. Chains rank principal
    /// groups, multiple bonds, heteroatoms, then substituents; rings put
    /// their heteroatoms first.
    pub fn priority(&self, candidate: &Candidate, traversal: &Traversal) -> PriorityLocants {
        let position: BTreeMap<usize, usize> = traversal
            .order
            .iter()
            .enumerate()
            .map(|(i, &atom)| (atom, i + 1))
            .collect();
        let pos = |atom: usize| position.get(&atom).copied().unwrap_or(usize::MAX);
        let sorted = |mut v: Vec<usize>| {
            v.sort_unstable();
            v
        };

        let principal = sorted(self.principal.iter().map(|&a| pos(a)).collect());
        let unsaturation = sorted(
            self.unsaturation
                .iter()
                .map(|&(a, b, _)| bond_locant(pos(a), pos(b), candidate.len(), candidate.is_monocycle()))
                .collect(),
        );
        let hetero = sorted(self.hetero.iter().map(|&(a, _)| pos(a)).collect());
        let mut senior: Vec<(u8, usize)> = self
            .hetero
            .iter()
            .map(|&(a, e)| (e.hetero_seniority(), pos(a)))
            .collect();
        senior.sort_unstable();
        let senior = senior.into_iter().map(|(_, p)| p).collect();
        let substituents = sorted(self.branches.iter().map(|b| pos(b.parent)).collect());

        PriorityLocants(match candidate.kind {
            CandidateKind::Chain => vec![principal, unsaturation, hetero, substituents],
            CandidateKind::Ring { .. } => vec![hetero, senior, principal, unsaturation, substituents],
        })
    }
}

/// The chosen numbering of a parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberingResult {
    /// Parent atom id to its 1-based position.
    pub locants: BTreeMap<usize, usize>,
    pub order: Vec<usize>,
    pub labels: Vec<String>,
    pub direction: Direction,
    pub priority: PriorityLocants,
}

impl NumberingResult {
    pub fn position(&self, atom: usize) -> Option<usize> {
        self.locants.get(&atom).copied()
    }

    pub fn label(&self, atom: usize) -> String {
        self.position(atom)
            .and_then(|p| self.labels.get(p - 1))
            .cloned()
            .unwrap_or_default()
    }

    pub fn label_at(&self, position: usize) -> String {
        self.labels.get(position.wrapping_sub(1)).cloned().unwrap_or_default()
    }
}

fn direction_of(candidate: &Candidate, order: &[usize]) -> Direction {
    match &candidate.kind {
        CandidateKind::Chain if order == candidate.atoms.as_slice() => Direction::Forward,
        CandidateKind::Chain => Direction::Reverse,
        CandidateKind::Ring { unit, .. } => {
            let (Some(&first), Some(&second)) = (order.first(), order.get(1)) else {
                return Direction::Forward;
            };
            for ring in &unit.rings {
                let atoms = ring.atoms();
                if let Some(i) = atoms.iter().position(|&a| a == first) {
                    if atoms[(i + 1) % atoms.len()] == second {
                        return Direction::Forward;
                    }
                    if atoms[(i + atoms.len() - 1) % atoms.len()] == second {
                        return Direction::Reverse;
                    }
                }
            }
            Direction::Forward
        }
    }
}

/// A named branch as numbering sees it: parent atom, name and size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedBranch {
    pub parent: usize,
    pub name: String,
    pub size: usize,
}

/// Picks the numbering with the lowest priority vector. Ties go to lower
/// double-bond locants, then lower locants for the substituent cited first
/// alphabetically, then larger substituents at lower locants, then the
/// lowest atom-id order.
pub fn assign_locants(
    candidate: &Candidate,
    features: &ParentFeatures,
    traversals: &[Traversal],
    named: &[NamedBranch],
) -> Option<NumberingResult> {
    let scored: Vec<(PriorityLocants, &Traversal)> = traversals
        .iter()
        .map(|t| (features.priority(candidate, t), t))
        .collect();
    let best = scored.iter().map(|(p, _)| p).min()?.clone();
    let tied: Vec<&Traversal> = scored
        .iter()
        .filter(|(p, _)| *p == best)
        .map(|(_, t)| *t)
        .collect();

    let follow_up = |traversal: &Traversal| {
        let pos = |atom: usize| {
            traversal
                .order
                .iter()
                .position(|&a| a == atom)
                .map_or(usize::MAX, |i| i + 1)
        };
        let mut doubles: Vec<usize> = features
            .unsaturation
            .iter()
            .filter(|(_, _, bond)| *bond == Bond::Double)
            .map(|&(a, b, _)| bond_locant(pos(a), pos(b), candidate.len(), candidate.is_monocycle()))
            .collect();
        doubles.sort_unstable();
        let mut alphabetical: Vec<(String, &str, usize)> = named
            .iter()
            .map(|n| (alpha_key(&n.name), n.name.as_str(), pos(n.parent)))
            .collect();
        alphabetical.sort();
        let alphabetical: Vec<usize> = alphabetical.into_iter().map(|(_, _, p)| p).collect();
        let mut sizes: Vec<(usize, Reverse<usize>)> = named.iter().map(|n| (pos(n.parent), Reverse(n.size))).collect();
        sizes.sort();
        let sizes: Vec<Reverse<usize>> = sizes.into_iter().map(|(_, s)| s).collect();
        (doubles, alphabetical, sizes, traversal.order.clone())
    };

    let chosen = tied.into_iter().min_by_key(|t| follow_up(t))?;
    trace!("numbering {:?} with priority {:?}", chosen.order, best);
    Some(NumberingResult {
        locants: chosen.order.iter().enumerate().map(|(i, &a)| (a, i + 1)).collect(),
        order: chosen.order.clone(),
        labels: chosen.labels.clone(),
        direction: direction_of(candidate, &chosen.order),
        priority: best,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_smiles;

    fn locants(v: &[&[usize]]) -> PriorityLocants {
        PriorityLocants(v.iter().map(|c| c.to_vec()).collect())
    }

    #[test]
    fn test_first_point_of_difference() {
        assert!(locants(&[&[2, 3, 5]]) < locants(&[&[2, 4, 4]]));
        assert!(locants(&[&[1], &[3]]) < locants(&[&[1], &[4]]));
        assert!(locants(&[&[2], &[1]]) > locants(&[&[1], &[9]]));
        assert_eq!(locants(&[&[1, 2]]).cmp(&locants(&[&[1, 2]])), Ordering::Equal);
    }

    #[test]
    fn test_missing_entries_rank_last() {
        assert!(locants(&[&[1]]) < locants(&[&[]]));
        assert!(locants(&[&[1, 2]]) < locants(&[&[1]]));
        assert!(locants(&[&[3]]) < locants(&[]));
    }

    #[test]
    fn test_bond_locants() {
        assert_eq!(bond_locant(2, 3, 6, true), 2);
        assert_eq!(bond_locant(1, 6, 6, true), 6);
        assert_eq!(bond_locant(1, 6, 6, false), 1);
        assert_eq!(bond_locant(4, 3, 4, false), 3);
    }

    #[test]
    fn test_chain_numbering() {
        // 2-methylbutane, not 3-methylbutane
        let molecule = parse_smiles("CCC(C)C").unwrap();
        let candidate = Candidate::chain(&molecule, vec![0, 1, 2, 4]);
        let region = (0..molecule.atom_count()).collect();
        let features = ParentFeatures::new(&molecule, &candidate, &[], None, &region);
        assert_eq!(features.branches.len(), 1);
        let numbering = assign_locants(&candidate, &features, &candidate.traversals(), &[]).unwrap();
        assert_eq!(numbering.position(2), Some(2));
        assert_eq!(numbering.direction, Direction::Reverse);
        assert_eq!(numbering.priority, locants(&[&[], &[], &[], &[2]]));
    }

    #[test]
    fn test_alphabetical_follow_up() {
        // 3-ethyl-5-methylheptane: the tie goes to the first-cited prefix.
        let molecule = parse_smiles("CCC(CC)CC(C)CC").unwrap();
        let candidate = Candidate::chain(&molecule, vec![0, 1, 2, 5, 6, 8, 9]);
        let region = (0..molecule.atom_count()).collect();
        let features = ParentFeatures::new(&molecule, &candidate, &[], None, &region);
        let named = vec![
            NamedBranch { parent: 2, name: "ethyl".to_string(), size: 2 },
            NamedBranch { parent: 6, name: "methyl".to_string(), size: 1 },
        ];
        let numbering = assign_locants(&candidate, &features, &candidate.traversals(), &named).unwrap();
        assert_eq!(numbering.position(2), Some(3));
        assert_eq!(numbering.position(6), Some(5));
    }
}
