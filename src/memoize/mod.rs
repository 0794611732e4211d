use crate::{Molecule, Ring};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::*;

/// How the rings of one nameable unit are joined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitShape {
    Mono,
    /// Two rings sharing exactly one atom.
    Spiro { centre: usize },
    /// Two rings sharing a path. Each bridge runs from `bridgeheads.0` to
    /// `bridgeheads.1`; an ortho-fused pair has an empty third bridge.
    Bicyclic {
        bridgeheads: (usize, usize),
        bridges: [Vec<usize>; 3],
    },
    /// A ring system with no cut atom, named by von Baeyer rules as a whole.
    /// `numberings` holds every atom order that gives `descriptor`.
    Polycyclic {
        descriptor: String,
        numberings: Vec<Vec<usize>>,
    },
}

/// Systems larger than this are not searched for a von Baeyer numbering.
const MAX_POLYCYCLIC_ATOMS: usize = 32;

/// One numbering of a ring unit: atoms in locant order plus display labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Traversal {
    pub order: Vec<usize>,
    pub labels: Vec<String>,
}

impl Traversal {
    fn plain(order: Vec<usize>) -> Self {
        let labels = (1..=order.len()).map(|i| i.to_string()).collect();
        Self { order, labels }
    }
}

/// A monocycle or a two-ring union that can be named as one parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RingUnit {
    pub atoms: BTreeSet<usize>,
    pub rings: Vec<Ring>,
    pub shape: UnitShape,
}

impl RingUnit {
    pub fn mono(ring: &Ring) -> Self {
        Self {
            atoms: ring.atom_set(),
            rings: vec![ring.clone()],
            shape: UnitShape::Mono,
        }
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    pub fn is_union(&self) -> bool {
        self.rings.len() > 1
    }

    pub fn is_fused(&self) -> bool {
        matches!(&self.shape, UnitShape::Bicyclic { bridges, .. } if bridges[2].is_empty())
    }

    /// Ring bonds of the unit as `(low, high)` pairs.
    pub fn bonds(&self) -> BTreeSet<(usize, usize)> {
        self.rings
            .iter()
            .flat_map(|r| r.edges())
            .map(|(a, b)| (a.min(b), a.max(b)))
            .collect()
    }

    /// Builds the union of two rings, or `None` when they do not form a
    /// simple spiro or bicyclic system.
    pub fn union(a: &Ring, b: &Ring) -> Option<Self> {
        let set_a = a.atom_set();
        let set_b = b.atom_set();
        let shared: BTreeSet<usize> = set_a.intersection(&set_b).copied().collect();
        let atoms: BTreeSet<usize> = set_a.union(&set_b).copied().collect();
        let rings = vec![a.clone(), b.clone()];
        match shared.len() {
            0 => None,
            1 => {
                let centre = *shared.iter().next()?;
                Some(Self { atoms, rings, shape: UnitShape::Spiro { centre } })
            }
            _ => {
                let heads: Vec<usize> = shared
                    .iter()
                    .copied()
                    .filter(|&s| {
                        let in_a = ring_neighbors(a, s).into_iter().any(|n| !shared.contains(&n));
                        let in_b = ring_neighbors(b, s).into_iter().any(|n| !shared.contains(&n));
                        in_a && in_b
                    })
                    .collect();
                let [h0, h1] = heads.as_slice() else { return None };
                let (h0, h1) = (*h0, *h1);
                let (arc_a1, arc_a2) = arcs(a, h0, h1)?;
                let (arc_b1, arc_b2) = arcs(b, h0, h1)?;
                let only_shared = |arc: &Vec<usize>| arc.iter().all(|x| shared.contains(x));
                let (bridge_a, shared_a) = if only_shared(&arc_a1) { (arc_a2, arc_a1) } else { (arc_a1, arc_a2) };
                let (bridge_b, shared_b) = if only_shared(&arc_b1) { (arc_b2, arc_b1) } else { (arc_b1, arc_b2) };
                if !only_shared(&shared_a) || shared_a != shared_b {
                    return None;
                }
                if bridge_a.iter().any(|x| shared.contains(x)) || bridge_b.iter().any(|x| shared.contains(x)) {
                    return None;
                }
                Some(Self {
                    atoms,
                    rings,
                    shape: UnitShape::Bicyclic {
                        bridgeheads: (h0, h1),
                        bridges: [bridge_a, bridge_b, shared_a],
                    },
                })
            }
        }
    }

    /// Joins the rings of a system into one von Baeyer unit. Systems with a
    /// cut atom (a spiro junction) or more than `MAX_POLYCYCLIC_ATOMS` atoms
    /// give `None`.
    pub fn polycyclic(rings: &[Ring]) -> Option<Self> {
        let atoms: BTreeSet<usize> = rings.iter().flat_map(|r| r.atoms().iter().copied()).collect();
        if rings.len() < 2 || atoms.len() > MAX_POLYCYCLIC_ATOMS {
            return None;
        }
        let adjacency = ring_adjacency(rings);
        if atoms.iter().any(|&cut| !connected_without(&adjacency, cut)) {
            debug!("ring system {atoms:?} has a cut atom");
            return None;
        }
        let (descriptor, numberings) = von_baeyer_numberings(&adjacency)?;
        trace!("von Baeyer [{descriptor}] for {atoms:?}, {} numberings", numberings.len());
        Some(Self {
            atoms,
            rings: rings.to_vec(),
            shape: UnitShape::Polycyclic { descriptor, numberings },
        })
    }

    /// Every rotation and direction of a monocycle.
    pub fn rotations(&self) -> Vec<Traversal> {
        let Some(ring) = self.rings.first() else { return vec![] };
        let atoms = ring.atoms();
        let n = atoms.len();
        let mut out = Vec::with_capacity(2 * n);
        for start in 0..n {
            let forward: Vec<usize> = (0..n).map(|i| atoms[(start + i) % n]).collect();
            let backward: Vec<usize> = (0..n).map(|i| atoms[(start + n - i) % n]).collect();
            out.push(Traversal::plain(forward));
            out.push(Traversal::plain(backward));
        }
        out
    }

    /// Von Baeyer numbering: from a main bridgehead round the largest bridge,
    /// back along the next largest, then the smallest bridge starting from
    /// the end nearer bridgehead 1.
    pub fn von_baeyer_traversals(&self) -> Vec<Traversal> {
        let UnitShape::Bicyclic { bridgeheads: (h0, h1), bridges } = &self.shape else {
            return vec![];
        };
        let mut out = Vec::new();
        for permutation in bridge_permutations(bridges) {
            for &(first, second) in &[(*h0, *h1), (*h1, *h0)] {
                let oriented = |bridge: &Vec<usize>, from_first: bool| -> Vec<usize> {
                    let mut atoms = bridge.clone();
                    // Bridges are stored running from h0 to h1.
                    if (first == *h0) != from_first {
                        atoms.reverse();
                    }
                    atoms
                };
                let mut order = vec![first];
                order.extend(oriented(&permutation[0], true));
                order.push(second);
                order.extend(oriented(&permutation[1], false));
                order.extend(oriented(&permutation[2], true));
                out.push(Traversal::plain(order));
            }
        }
        out
    }

    /// Fused numbering round the perimeter: start at a non-fusion atom next
    /// to a fusion atom and walk away from it. Fusion atoms take the previous
    /// number plus a letter.
    pub fn fused_traversals(&self) -> Vec<Traversal> {
        let UnitShape::Bicyclic { bridgeheads: (h0, h1), bridges } = &self.shape else {
            return vec![];
        };
        if !bridges[2].is_empty() {
            return vec![];
        }
        let mut perimeter = vec![*h0];
        perimeter.extend(bridges[0].iter().copied());
        perimeter.push(*h1);
        perimeter.extend(bridges[1].iter().rev().copied());
        let n = perimeter.len();
        let fusion = |a: usize| a == *h0 || a == *h1;

        let mut out = Vec::new();
        for start in 0..n {
            if fusion(perimeter[start]) {
                continue;
            }
            for step in [1usize, n - 1] {
                let behind = perimeter[(start + n - step) % n];
                if !fusion(behind) {
                    continue;
                }
                let order: Vec<usize> = (0..n).map(|i| perimeter[(start + i * step) % n]).collect();
                let mut labels = Vec::with_capacity(n);
                let mut number = 0;
                for &atom in &order {
                    if fusion(atom) {
                        labels.push(format!("{number}a"));
                    } else {
                        number += 1;
                        labels.push(number.to_string());
                    }
                }
                out.push(Traversal { order, labels });
            }
        }
        out
    }

    pub fn polycyclic_traversals(&self) -> Vec<Traversal> {
        match &self.shape {
            UnitShape::Polycyclic { numberings, .. } => numberings.iter().cloned().map(Traversal::plain).collect(),
            _ => vec![],
        }
    }

    /// Spiro numbering: start next to the spiro atom in the smaller ring,
    /// number it, then the spiro atom, then the larger ring.
    pub fn spiro_traversals(&self) -> Vec<Traversal> {
        let UnitShape::Spiro { centre } = self.shape else { return vec![] };
        let [a, b] = self.rings.as_slice() else { return vec![] };
        let mut pairings = vec![(a, b)];
        if a.len() == b.len() {
            pairings.push((b, a));
        } else if b.len() < a.len() {
            pairings = vec![(b, a)];
        }
        let walks = |ring: &Ring| -> Vec<Vec<usize>> {
            let atoms = ring.atoms();
            let n = atoms.len();
            let Some(at) = atoms.iter().position(|&x| x == centre) else { return vec![] };
            let forward: Vec<usize> = (1..n).map(|i| atoms[(at + i) % n]).collect();
            let mut backward = forward.clone();
            backward.reverse();
            vec![forward, backward]
        };
        let mut out = Vec::new();
        for (small, large) in pairings {
            for first in walks(small) {
                for second in walks(large) {
                    let mut order = first.clone();
                    order.push(centre);
                    order.extend(second);
                    out.push(Traversal::plain(order));
                }
            }
        }
        out
    }
}

fn ring_neighbors(ring: &Ring, atom: usize) -> Vec<usize> {
    let atoms = ring.atoms();
    let n = atoms.len();
    match atoms.iter().position(|&x| x == atom) {
        Some(i) => vec![atoms[(i + 1) % n], atoms[(i + n - 1) % n]],
        None => vec![],
    }
}

/// The two arcs of a ring between `from` and `to`, interior atoms only,
/// each listed from `from` toward `to`.
fn arcs(ring: &Ring, from: usize, to: usize) -> Option<(Vec<usize>, Vec<usize>)> {
    let atoms = ring.atoms();
    let n = atoms.len();
    let i = atoms.iter().position(|&x| x == from)?;
    let j = atoms.iter().position(|&x| x == to)?;
    let forward: Vec<usize> = (1..n)
        .map(|k| atoms[(i + k) % n])
        .take_while(|&x| x != to)
        .collect();
    let backward: Vec<usize> = (1..n)
        .map(|k| atoms[(i + n - k) % n])
        .take_while(|&x| x != to)
        .collect();
    if forward.len() + backward.len() + 2 != n || i == j {
        return None;
    }
    Some((forward, backward))
}

/// Orderings of the three bridges by decreasing length; tied bridges are permuted.
fn bridge_permutations(bridges: &[Vec<usize>; 3]) -> Vec<[Vec<usize>; 3]> {
    const PERMUTATIONS: [[usize; 3]; 6] = [[0, 1, 2], [0, 2, 1], [1, 0, 2], [1, 2, 0], [2, 0, 1], [2, 1, 0]];
    let mut out: Vec<[Vec<usize>; 3]> = Vec::new();
    for p in PERMUTATIONS {
        let lens = [bridges[p[0]].len(), bridges[p[1]].len(), bridges[p[2]].len()];
        if lens[0] >= lens[1] && lens[1] >= lens[2] {
            let candidate = [bridges[p[0]].clone(), bridges[p[1]].clone(), bridges[p[2]].clone()];
            if !out.contains(&candidate) {
                out.push(candidate);
            }
        }
    }
    out
}

type Adjacency = BTreeMap<usize, BTreeSet<usize>>;

fn ring_adjacency(rings: &[Ring]) -> Adjacency {
    let mut out: Adjacency = BTreeMap::new();
    for (a, b) in rings.iter().flat_map(|r| r.edges()) {
        out.entry(a).or_default().insert(b);
        out.entry(b).or_default().insert(a);
    }
    out
}

fn edge(a: usize, b: usize) -> (usize, usize) {
    (a.min(b), a.max(b))
}

fn connected_without(adjacency: &Adjacency, cut: usize) -> bool {
    let Some(&start) = adjacency.keys().find(|&&a| a != cut) else { return true };
    let mut seen = BTreeSet::from([start]);
    let mut stack = vec![start];
    while let Some(atom) = stack.pop() {
        for &next in adjacency.get(&atom).into_iter().flatten() {
            if next != cut && seen.insert(next) {
                stack.push(next);
            }
        }
    }
    seen.len() + 1 == adjacency.len()
}

/// Every simple cycle of greatest length, each listed once from its lowest atom.
fn longest_cycles(adjacency: &Adjacency) -> Vec<Vec<usize>> {
    fn walk(adjacency: &Adjacency, path: &mut Vec<usize>, found: &mut Vec<Vec<usize>>) {
        let (Some(&start), Some(&last)) = (path.first(), path.last()) else { return };
        for &next in adjacency.get(&last).into_iter().flatten() {
            if next == start && path.len() >= 3 && path[1] < last {
                found.push(path.clone());
            } else if next > start && !path.contains(&next) {
                path.push(next);
                walk(adjacency, path, found);
                path.pop();
            }
        }
    }

    let mut found = Vec::new();
    for &start in adjacency.keys() {
        walk(adjacency, &mut vec![start], &mut found);
    }
    let longest = found.iter().map(Vec::len).max().unwrap_or(0);
    found.retain(|c| c.len() == longest);
    found
}

/// Paths between two atoms of `cycle` through atoms off it, ends included.
/// A bond between two atoms not adjacent on the cycle is a zero-atom path.
fn main_bridges(adjacency: &Adjacency, cycle: &[usize]) -> Vec<Vec<usize>> {
    fn walk(adjacency: &Adjacency, on_cycle: &BTreeSet<usize>, path: &mut Vec<usize>, found: &mut Vec<Vec<usize>>) {
        let (Some(&from), Some(&last)) = (path.first(), path.last()) else { return };
        for &next in adjacency.get(&last).into_iter().flatten() {
            if path.contains(&next) {
                continue;
            }
            if on_cycle.contains(&next) {
                if from < next {
                    let mut bridge = path.clone();
                    bridge.push(next);
                    found.push(bridge);
                }
            } else {
                path.push(next);
                walk(adjacency, on_cycle, path, found);
                path.pop();
            }
        }
    }

    let n = cycle.len();
    let on_cycle: BTreeSet<usize> = cycle.iter().copied().collect();
    let cycle_edges: BTreeSet<(usize, usize)> = (0..n).map(|i| edge(cycle[i], cycle[(i + 1) % n])).collect();
    let mut found = Vec::new();
    for &from in cycle {
        for &next in adjacency.get(&from).into_iter().flatten() {
            if on_cycle.contains(&next) {
                if from < next && !cycle_edges.contains(&edge(from, next)) {
                    found.push(vec![from, next]);
                }
            } else {
                walk(adjacency, &on_cycle, &mut vec![from, next], &mut found);
            }
        }
    }
    found
}

/// Ring steps from `from` to `to` walking `cycle` by `step`.
fn cycle_distance(cycle: &[usize], from: usize, to: usize, step: usize) -> Option<usize> {
    let n = cycle.len();
    let i = cycle.iter().position(|&x| x == from)?;
    (1..n).find(|k| cycle[(i + k * step) % n] == to)
}

/// The interior sizes of the two main ring segments a main bridge makes.
fn segments(cycle: &[usize], bridge: &[usize]) -> Option<(usize, usize)> {
    let (&h0, &h1) = (bridge.first()?, bridge.last()?);
    let d = cycle_distance(cycle, h0, h1, 1)?;
    let (one, other) = (d - 1, cycle.len() - d - 1);
    Some((one.max(other), one.min(other)))
}

/// A secondary bridge: interior size and the locants of its two ends.
type Placed = (usize, usize, usize);

/// Numbers the secondary bridges left after the main ring and main bridge,
/// largest first, each from the end nearer the higher-numbered bridgehead.
fn place_secondary(
    adjacency: &Adjacency,
    order: &mut Vec<usize>,
    used: &mut BTreeSet<(usize, usize)>,
    placed: &mut Vec<Placed>,
    out: &mut Vec<(Vec<usize>, Vec<Placed>)>,
) {
    fn walk(adjacency: &Adjacency, order: &[usize], path: &mut Vec<usize>, found: &mut Vec<Vec<usize>>) {
        let Some(&last) = path.last() else { return };
        for &next in adjacency.get(&last).into_iter().flatten() {
            if path.contains(&next) {
                continue;
            }
            if order.contains(&next) {
                let mut bridge = path.clone();
                bridge.push(next);
                found.push(bridge);
            } else {
                path.push(next);
                walk(adjacency, order, path, found);
                path.pop();
            }
        }
    }

    let mut found: Vec<Vec<usize>> = Vec::new();
    for &from in order.iter() {
        for &next in adjacency.get(&from).into_iter().flatten() {
            if used.contains(&edge(from, next)) {
                continue;
            }
            if order.contains(&next) {
                if from < next {
                    found.push(vec![from, next]);
                }
            } else {
                walk(adjacency, order, &mut vec![from, next], &mut found);
            }
        }
    }
    let Some(largest) = found.iter().map(Vec::len).max() else {
        out.push((order.clone(), placed.clone()));
        return;
    };

    fn locant(order: &[usize], atom: usize) -> usize {
        order.iter().position(|&x| x == atom).map_or(0, |i| i + 1)
    }
    for mut bridge in found.into_iter().filter(|b| b.len() == largest) {
        let (Some(&a), Some(&b)) = (bridge.first(), bridge.last()) else { continue };
        if locant(order, a) < locant(order, b) {
            bridge.reverse();
        }
        let (lo, hi) = {
            let (x, y) = (locant(order, a), locant(order, b));
            (x.min(y), x.max(y))
        };
        let interior = &bridge[1..bridge.len() - 1];
        let edges: Vec<(usize, usize)> = bridge.windows(2).map(|w| edge(w[0], w[1])).collect();
        let before = order.len();
        order.extend(interior.iter().copied());
        used.extend(edges.iter().copied());
        placed.push((interior.len(), lo, hi));
        place_secondary(adjacency, order, used, placed, out);
        placed.pop();
        for e in &edges {
            used.remove(e);
        }
        order.truncate(before);
    }
}

/// Finds the von Baeyer descriptor of a ring system and every numbering
/// that gives it: the main ring as large as possible, then the main bridge
/// as large as possible, then the main ring divided as evenly as possible,
/// then the secondary bridgehead locants as low as possible.
fn von_baeyer_numberings(adjacency: &Adjacency) -> Option<(String, Vec<Vec<usize>>)> {
    let mut options: Vec<(Vec<usize>, Vec<usize>)> = Vec::new();
    for cycle in longest_cycles(adjacency) {
        for bridge in main_bridges(adjacency, &cycle) {
            options.push((cycle.clone(), bridge));
        }
    }
    let largest = options.iter().map(|(_, b)| b.len()).max()?;
    options.retain(|(_, b)| b.len() == largest);
    let even = options.iter().filter_map(|(c, b)| segments(c, b)).map(|s| s.1).max()?;
    options.retain(|(c, b)| segments(c, b).map(|s| s.1) == Some(even));

    let mut best: Option<((Vec<usize>, Vec<(usize, usize)>), String)> = None;
    let mut kept: BTreeSet<Vec<usize>> = BTreeSet::new();
    for (cycle, bridge) in &options {
        let n = cycle.len();
        let (Some(&h0), Some(&h1)) = (bridge.first(), bridge.last()) else { continue };
        let Some((long, short)) = segments(cycle, bridge) else { continue };
        for (first, second) in [(h0, h1), (h1, h0)] {
            for step in [1, n - 1] {
                if cycle_distance(cycle, first, second, step) != Some(long + 1) {
                    continue;
                }
                let Some(start) = cycle.iter().position(|&x| x == first) else { continue };
                let mut order: Vec<usize> = (0..n).map(|k| cycle[(start + k * step) % n]).collect();
                let mut interior = bridge[1..bridge.len() - 1].to_vec();
                if bridge[0] != first {
                    interior.reverse();
                }
                order.extend(interior);

                let mut used: BTreeSet<(usize, usize)> = (0..n).map(|i| edge(cycle[i], cycle[(i + 1) % n])).collect();
                used.extend(bridge.windows(2).map(|w| edge(w[0], w[1])));
                let mut complete = Vec::new();
                place_secondary(adjacency, &mut order, &mut used, &mut Vec::new(), &mut complete);

                for (numbering, mut secondary) in complete {
                    if numbering.len() != adjacency.len() {
                        continue;
                    }
                    secondary.sort_by(|x, y| y.0.cmp(&x.0).then((x.1, x.2).cmp(&(y.1, y.2))));
                    let mut superscripts: Vec<usize> = secondary.iter().flat_map(|s| [s.1, s.2]).collect();
                    superscripts.sort_unstable();
                    let key = (superscripts, secondary.iter().map(|s| (s.1, s.2)).collect::<Vec<_>>());
                    let mut descriptor = format!("{long}.{short}.{}", largest - 2);
                    for (size, lo, hi) in &secondary {
                        descriptor.push_str(&format!(".{size}^{{{lo},{hi}}}"));
                    }
                    let rank = match &best {
                        Some((current, _)) => key.cmp(current),
                        None => Ordering::Less,
                    };
                    match rank {
                        Ordering::Greater => continue,
                        Ordering::Less => {
                            best = Some((key, descriptor));
                            kept.clear();
                        }
                        Ordering::Equal => {}
                    }
                    kept.insert(numbering);
                }
            }
        }
    }
    let (_, descriptor) = best?;
    Some((descriptor, kept.into_iter().collect()))
}

/// A connected set of rings sharing atoms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RingSystem {
    pub rings: Vec<Ring>,
    pub atoms: BTreeSet<usize>,
    /// Units the system is named through: the system itself when it forms
    /// one unit, otherwise each ring on its own.
    pub units: Vec<RingUnit>,
}

/// Ring facts derived once per molecule content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RingAnalysis {
    pub rings: Vec<Ring>,
    pub systems: Vec<RingSystem>,
    pub ring_atoms: BTreeSet<usize>,
}

impl RingAnalysis {
    pub fn new(molecule: &Molecule) -> Self {
        let rings = molecule.rings().to_vec();
        let ring_atoms = molecule.ring_atoms();

        // Group rings that share atoms.
        let mut system_of: Vec<usize> = (0..rings.len()).collect();
        fn find(parent: &mut Vec<usize>, x: usize) -> usize {
            let mut root = x;
            while parent[root] != root {
                root = parent[root];
            }
            parent[x] = root;
            root
        }
        for i in 0..rings.len() {
            for j in (i + 1)..rings.len() {
                if rings[i].atoms().iter().any(|a| rings[j].contains(*a)) {
                    let (ri, rj) = (find(&mut system_of, i), find(&mut system_of, j));
                    if ri != rj {
                        system_of[ri.max(rj)] = ri.min(rj);
                    }
                }
            }
        }
        let mut grouped: BTreeMap<usize, Vec<Ring>> = BTreeMap::new();
        for (i, ring) in rings.iter().enumerate() {
            let root = find(&mut system_of, i);
            grouped.entry(root).or_default().push(ring.clone());
        }

        let systems = grouped
            .into_values()
            .map(|members| {
                let atoms: BTreeSet<usize> = members.iter().flat_map(|r| r.atoms().iter().copied()).collect();
                let joined = match members.as_slice() {
                    [single] => Some(RingUnit::mono(single)),
                    [a, b] => RingUnit::union(a, b).or_else(|| RingUnit::polycyclic(&members)),
                    _ => RingUnit::polycyclic(&members),
                };
                let units = match joined {
                    Some(unit) => vec![unit],
                    None => members.iter().map(RingUnit::mono).collect(),
                };
                RingSystem { rings: members, atoms, units }
            })
            .collect();

        Self { rings, systems, ring_atoms }
    }
}

/// Content-keyed cache of ring analyses, passed explicitly to naming calls.
#[derive(Debug, Default)]
pub struct RingMemo {
    entries: BTreeMap<u64, Arc<RingAnalysis>>,
    hits: usize,
    misses: usize,
}

impl RingMemo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn analyze(&mut self, molecule: &Molecule) -> Arc<RingAnalysis> {
        let key = molecule.content_key();
        if let Some(analysis) = self.entries.get(&key) {
            self.hits += 1;
            trace!("ring memo hit for {key:016x}");
            return analysis.clone();
        }
        self.misses += 1;
        let analysis = Arc::new(RingAnalysis::new(molecule));
        self.entries.insert(key, analysis.clone());
        analysis
    }

    pub fn hits(&self) -> usize {
        self.hits
    }

    pub fn misses(&self) -> usize {
        self.misses
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_smiles;

    fn single_unit(smiles: &str) -> RingUnit {
        let molecule = parse_smiles(smiles).unwrap();
        let analysis = RingAnalysis::new(&molecule);
        assert_eq!(analysis.systems.len(), 1, "{smiles}");
        assert_eq!(analysis.systems[0].units.len(), 1, "{smiles}");
        analysis.systems[0].units[0].clone()
    }

    #[test]
    fn test_memo_is_content_keyed() {
        let mut memo = RingMemo::new();
        let a = parse_smiles("C1CCCCC1").unwrap();
        let b = parse_smiles("C1CCCCC1").unwrap();
        let c = parse_smiles("C1CCCC1").unwrap();
        memo.analyze(&a);
        memo.analyze(&b);
        memo.analyze(&c);
        assert_eq!((memo.hits(), memo.misses(), memo.len()), (1, 2, 2));
    }

    #[test]
    fn test_fused_union() {
        let unit = single_unit("c1ccc2ccccc2c1");
        assert!(unit.is_fused());
        let traversals = unit.fused_traversals();
        assert_eq!(traversals.len(), 4);
        let labels: Vec<&str> = traversals[0].labels.iter().map(|s| s.as_str()).collect();
        assert_eq!(labels, vec!["1", "2", "3", "4", "4a", "5", "6", "7", "8", "8a"]);
    }

    #[test]
    fn test_bridged_union() {
        // bicyclo[2.2.1]heptane
        let unit = single_unit("C1CC2CCC1C2");
        let UnitShape::Bicyclic { bridges, .. } = &unit.shape else { panic!("not bicyclic") };
        let mut lens: Vec<usize> = bridges.iter().map(|b| b.len()).collect();
        lens.sort();
        assert_eq!(lens, vec![1, 2, 2]);
        for traversal in unit.von_baeyer_traversals() {
            assert_eq!(traversal.order.len(), 7);
            let order = &traversal.order;
            // Atoms 1 and 4 are the bridgeheads; atom 7 bonds to both.
            let molecule = parse_smiles("C1CC2CCC1C2").unwrap();
            assert!(molecule.bond(order[6], order[0]).is_some());
            assert!(molecule.bond(order[6], order[3]).is_some());
        }
    }

    #[test]
    fn test_spiro_union() {
        let unit = single_unit("C1CCC2(CC1)CCC2");
        assert!(matches!(unit.shape, UnitShape::Spiro { .. }));
        let traversals = unit.spiro_traversals();
        assert_eq!(traversals.len(), 4);
        for t in traversals {
            // The smaller (four-membered) ring is numbered first.
            assert_eq!(t.order.len(), 9);
            assert_eq!(t.order[3], 3);
        }
    }

    #[test]
    fn test_polycyclic_union() {
        let unit = single_unit("C1C2CC3CC1CC(C2)C3");
        let UnitShape::Polycyclic { descriptor, .. } = &unit.shape else { panic!("not polycyclic") };
        assert_eq!(descriptor, "3.3.1.1^{3,7}");
        let molecule = parse_smiles("C1C2CC3CC1CC(C2)C3").unwrap();
        for traversal in unit.polycyclic_traversals() {
            let order = &traversal.order;
            assert_eq!(order.len(), 10);
            // The main bridge (atom 9) joins bridgeheads 1 and 5; the secondary bridge joins 3 and 7.
            assert!(molecule.bond(order[8], order[0]).is_some());
            assert!(molecule.bond(order[8], order[4]).is_some());
            assert!(molecule.bond(order[9], order[2]).is_some());
            assert!(molecule.bond(order[9], order[6]).is_some());
        }
    }

    #[test]
    fn test_spiro_assemblies_are_split() {
        let molecule = parse_smiles("C1CCC2(CC1)CCC1(CC2)CCC1").unwrap();
        let analysis = RingAnalysis::new(&molecule);
        assert_eq!(analysis.systems.len(), 1);
        assert_eq!(analysis.systems[0].units.len(), 3);
        assert!(analysis.systems[0].units.iter().all(|u| !u.is_union()));
    }
}
