use crate::{multiplier, numeral_root, Bond, Element, GroupKind, Molecule, RingUnit, Traversal, UnitShape};
use lazy_static::lazy_static;
use std::collections::{BTreeMap, BTreeSet};
use tracing::*;

lazy_static! {
    /// Aromatic monocycles keyed by (size, heteroatom pattern in lowest numbering).
    static ref AROMATIC_MONOCYCLES: BTreeMap<(usize, &'static str), &'static str> = [
        ((6, ""), "benzene"),
        ((6, "N1"), "pyridine"),
        ((6, "N1N2"), "pyridazine"),
        ((6, "N1N3"), "pyrimidine"),
        ((6, "N1N4"), "pyrazine"),
        ((6, "N1N3N5"), "1,3,5-triazine"),
        ((6, "N1N2N4"), "1,2,4-triazine"),
        ((5, "O1"), "furan"),
        ((5, "S1"), "thiophene"),
        ((5, "Se1"), "selenophene"),
        ((5, "N1"), "pyrrole"),
        ((5, "N1N2"), "pyrazole"),
        ((5, "N1N3"), "imidazole"),
        ((5, "O1N2"), "1,2-oxazole"),
        ((5, "O1N3"), "1,3-oxazole"),
        ((5, "S1N2"), "1,2-thiazole"),
        ((5, "S1N3"), "1,3-thiazole"),
        ((5, "N1N2N3"), "1,2,3-triazole"),
        ((5, "N1N2N4"), "1,2,4-triazole"),
        ((5, "N1N2N3N4"), "tetrazole"),
        ((5, "O1N3N4"), "1,3,4-oxadiazole"),
        ((5, "S1N3N4"), "1,3,4-thiadiazole"),
    ]
    .into_iter()
    .collect();

    /// Saturated monocycles with retained names.
    static ref SATURATED_MONOCYCLES: BTreeMap<(usize, &'static str), &'static str> = [
        ((3, "O1"), "oxirane"),
        ((3, "N1"), "aziridine"),
        ((3, "S1"), "thiirane"),
        ((4, "O1"), "oxetane"),
        ((4, "N1"), "azetidine"),
        ((4, "S1"), "thietane"),
        ((5, "O1"), "oxolane"),
        ((5, "S1"), "thiolane"),
        ((5, "N1"), "pyrrolidine"),
        ((5, "O1O3"), "1,3-dioxolane"),
        ((5, "N1N2"), "pyrazolidine"),
        ((5, "N1N3"), "imidazolidine"),
        ((6, "O1"), "oxane"),
        ((6, "S1"), "thiane"),
        ((6, "N1"), "piperidine"),
        ((6, "N1N4"), "piperazine"),
        ((6, "O1N4"), "morpholine"),
        ((6, "S1N4"), "thiomorpholine"),
        ((6, "O1O3"), "1,3-dioxane"),
        ((6, "O1O4"), "1,4-dioxane"),
    ]
    .into_iter()
    .collect();

    /// Aromatic ortho-fused bicycles keyed by (size of the ring numbered
    /// first, size of the other ring, heteroatom pattern).
    static ref FUSED_BICYCLES: BTreeMap<(usize, usize, &'static str), &'static str> = [
        ((6, 6, ""), "naphthalene"),
        ((6, 6, "N1"), "quinoline"),
        ((6, 6, "N2"), "isoquinoline"),
        ((6, 6, "N1N2"), "cinnoline"),
        ((6, 6, "N1N3"), "quinazoline"),
        ((6, 6, "N1N4"), "quinoxaline"),
        ((6, 6, "N2N3"), "phthalazine"),
        ((5, 6, "N1"), "indole"),
        ((5, 6, "N2"), "isoindole"),
        ((5, 6, "N1N2"), "indazole"),
        ((5, 6, "N1N3"), "benzimidazole"),
        ((5, 6, "O1"), "1-benzofuran"),
        ((5, 6, "O2"), "2-benzofuran"),
        ((5, 6, "S1"), "1-benzothiophene"),
        ((5, 6, "O1N2"), "1,2-benzoxazole"),
        ((5, 6, "O1N3"), "1,3-benzoxazole"),
        ((5, 6, "S1N3"), "1,3-benzothiazole"),
    ]
    .into_iter()
    .collect();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RingBaseKind {
    /// A retained name that already spells out its heteroatoms.
    Retained,
    /// "cyclo" plus the alkane root, with replacement prefixes.
    Cyclo,
    VonBaeyer,
    Spiro,
}

/// The base name of a ring unit together with the numberings it allows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RingBase {
    pub kind: RingBaseKind,
    /// The full retained name, or the systematic root without its
    /// saturation ending ("cyclohex", "bicyclo[2.2.1]hept").
    pub name: String,
    pub aromatic: bool,
    pub traversals: Vec<Traversal>,
    /// Ring bonds cited as ene/yne. Aromatic units without a retained name
    /// are cited through one Kekulé structure.
    pub unsaturation: Vec<(usize, usize, Bond)>,
}

impl RingBase {
    pub fn is_retained(&self) -> bool {
        self.kind == RingBaseKind::Retained
    }

    pub fn is_benzene(&self) -> bool {
        self.is_retained() && self.name == "benzene"
    }

    pub fn hetero_in_name(&self) -> bool {
        self.is_retained()
    }
}

/// Retained benzene forms for a single principal group ("benzoic acid", "phenol").
pub fn retained_benzene_stem(kind: GroupKind) -> Option<&'static str> {
    use GroupKind::*;
    Some(match kind {
        CarboxylicAcid | Anhydride => "benzoic",
        Ester | Carboxylate => "benzoate",
        AcidHalide => "benzoyl",
        Amide => "benzamide",
        Nitrile => "benzonitrile",
        Aldehyde => "benzaldehyde",
        Alcohol => "phenol",
        _ => return None,
    })
}

/// Heteroatom locants, plain and in seniority order, for one numbering.
fn hetero_key(molecule: &Molecule, order: &[usize]) -> (Vec<usize>, Vec<usize>) {
    let mut plain = Vec::new();
    let mut senior = Vec::new();
    for (i, &atom) in order.iter().enumerate() {
        let element = molecule.element(atom);
        if !element.is_carbon() {
            plain.push(i + 1);
            senior.push((element.hetero_seniority(), i + 1));
        }
    }
    senior.sort();
    (plain, senior.into_iter().map(|(_, p)| p).collect())
}

/// The heteroatoms of a numbering written as symbol plus label ("S1N3").
pub fn hetero_pattern(molecule: &Molecule, traversal: &Traversal) -> String {
    traversal
        .order
        .iter()
        .zip(&traversal.labels)
        .filter(|(&atom, _)| !molecule.element(atom).is_carbon())
        .map(|(&atom, label)| format!("{}{}", molecule.element(atom).symbol(), label))
        .collect()
}

fn needs_double_bond(molecule: &Molecule, atom: usize) -> bool {
    let a = molecule.atom(atom);
    if a.charge != 0 {
        return false;
    }
    match a.element {
        Element::C => true,
        Element::N | Element::P => a.hydrogens == 0 && molecule.heavy_neighbors(atom).len() == 2,
        _ => false,
    }
}

fn kekulize(atoms: &[usize], bonds: &BTreeSet<(usize, usize)>, matched: &mut BTreeMap<usize, usize>) -> bool {
    let Some(&atom) = atoms.iter().find(|a| !matched.contains_key(a)) else {
        return true;
    };
    for &partner in atoms {
        if partner == atom || matched.contains_key(&partner) {
            continue;
        }
        if !bonds.contains(&(atom.min(partner), atom.max(partner))) {
            continue;
        }
        matched.insert(atom, partner);
        matched.insert(partner, atom);
        if kekulize(atoms, bonds, matched) {
            return true;
        }
        matched.remove(&atom);
        matched.remove(&partner);
    }
    false
}

/// One Kekulé structure of an aromatic unit, as its double bonds.
fn kekule_bonds(molecule: &Molecule, unit: &RingUnit) -> Vec<(usize, usize, Bond)> {
    let bonds = unit.bonds();
    let atoms: Vec<usize> = unit
        .atoms
        .iter()
        .copied()
        .filter(|&a| needs_double_bond(molecule, a))
        .collect();
    let mut matched = BTreeMap::new();
    if !kekulize(&atoms, &bonds, &mut matched) {
        debug!("no Kekulé structure for ring unit {:?}", unit.atoms);
        return Vec::new();
    }
    matched
        .into_iter()
        .filter(|(a, b)| a < b)
        .map(|(a, b)| (a, b, Bond::Double))
        .collect()
}

fn fused_retained(molecule: &Molecule, unit: &RingUnit) -> Option<(&'static str, Vec<Traversal>)> {
    let mut found: Option<&'static str> = None;
    let mut kept = Vec::new();
    for traversal in unit.fused_traversals() {
        let Some(start) = traversal.order.first() else { continue };
        let Some(start_ring) = unit.rings.iter().find(|r| r.contains(*start)) else {
            continue;
        };
        let other = unit.len() + 2 - start_ring.len();
        let pattern = hetero_pattern(molecule, &traversal);
        if let Some(&name) = FUSED_BICYCLES.get(&(start_ring.len(), other, pattern.as_str())) {
            if found.map_or(true, |f| f == name) {
                found = Some(name);
                kept.push(traversal);
            }
        }
    }
    found.map(|name| (name, kept))
}

/// Names a ring unit and lists the numberings its name allows.
pub fn ring_base(molecule: &Molecule, unit: &RingUnit) -> RingBase {
    let aromatic = unit.atoms.iter().all(|&a| molecule.atom(a).aromatic);
    let ring_unsaturation: Vec<(usize, usize, Bond)> = unit
        .bonds()
        .into_iter()
        .filter_map(|(a, b)| match molecule.bond(a, b) {
            Some(bond @ (Bond::Double | Bond::Triple)) => Some((a, b, bond)),
            _ => None,
        })
        .collect();
    let saturated = ring_unsaturation.is_empty() && unit.atoms.iter().all(|&a| !molecule.atom(a).aromatic);
    let systematic_unsaturation = || {
        if aromatic {
            kekule_bonds(molecule, unit)
        } else {
            ring_unsaturation.clone()
        }
    };

    match &unit.shape {
        UnitShape::Mono => {
            let traversals = unit.rotations();
            let pattern = traversals
                .iter()
                .min_by_key(|t| hetero_key(molecule, &t.order))
                .map(|t| hetero_pattern(molecule, t))
                .unwrap_or_default();
            let table = if aromatic {
                Some(&*AROMATIC_MONOCYCLES)
            } else if saturated {
                Some(&*SATURATED_MONOCYCLES)
            } else {
                None
            };
            if let Some(name) = table.and_then(|t| t.get(&(unit.len(), pattern.as_str()))) {
                return RingBase {
                    kind: RingBaseKind::Retained,
                    name: name.to_string(),
                    aromatic,
                    traversals,
                    unsaturation: Vec::new(),
                };
            }
            RingBase {
                kind: RingBaseKind::Cyclo,
                name: format!("cyclo{}", numeral_root(unit.len())),
                aromatic,
                traversals,
                unsaturation: systematic_unsaturation(),
            }
        }
        UnitShape::Bicyclic { bridges, .. } => {
            if aromatic && bridges[2].is_empty() {
                if let Some((name, traversals)) = fused_retained(molecule, unit) {
                    return RingBase {
                        kind: RingBaseKind::Retained,
                        name: name.to_string(),
                        aromatic,
                        traversals,
                        unsaturation: Vec::new(),
                    };
                }
            }
            let mut lengths: Vec<usize> = bridges.iter().map(Vec::len).collect();
            lengths.sort_by(|a, b| b.cmp(a));
            RingBase {
                kind: RingBaseKind::VonBaeyer,
                name: format!(
                    "bicyclo[{}.{}.{}]{}",
                    lengths[0],
                    lengths[1],
                    lengths[2],
                    numeral_root(unit.len())
                ),
                aromatic,
                traversals: unit.von_baeyer_traversals(),
                unsaturation: systematic_unsaturation(),
            }
        }
        UnitShape::Polycyclic { descriptor, .. } => {
            let count = match unit.rings.len() {
                2 => "bi".to_string(),
                n => multiplier(n),
            };
            RingBase {
                kind: RingBaseKind::VonBaeyer,
                name: format!("{count}cyclo[{descriptor}]{}", numeral_root(unit.len())),
                aromatic,
                traversals: unit.polycyclic_traversals(),
                unsaturation: systematic_unsaturation(),
            }
        }
        UnitShape::Spiro { .. } => {
            let mut sizes: Vec<usize> = unit.rings.iter().map(|r| r.len() - 1).collect();
            sizes.sort();
            RingBase {
                kind: RingBaseKind::Spiro,
                name: format!(
                    "spiro[{}]{}",
                    sizes.iter().map(|s| s.to_string()).collect::<Vec<_>>().join("."),
                    numeral_root(unit.len())
                ),
                aromatic,
                traversals: unit.spiro_traversals(),
                unsaturation: systematic_unsaturation(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{parse_smiles, RingAnalysis};

    fn base(smiles: &str) -> RingBase {
        let molecule = parse_smiles(smiles).unwrap();
        let analysis = RingAnalysis::new(&molecule);
        ring_base(&molecule, &analysis.systems[0].units[0])
    }

    #[test]
    fn test_retained_monocycles() {
        let cases = [
            ("c1ccccc1", "benzene"),
            ("c1ccncc1", "pyridine"),
            ("c1cscn1", "1,3-thiazole"),
            ("c1ccsc1", "thiophene"),
            ("c1cc[nH]c1", "pyrrole"),
            ("c1cnc[nH]1", "imidazole"),
            ("C1CCNCC1", "piperidine"),
            ("C1COCCN1", "morpholine"),
            ("C1CCOC1", "oxolane"),
            ("C1CO1", "oxirane"),
            ("C1COCCO1", "1,4-dioxane"),
        ];
        for (smiles, expected) in cases {
            let named = base(smiles);
            assert_eq!(named.kind, RingBaseKind::Retained, "{smiles}");
            assert_eq!(named.name, expected, "{smiles}");
        }
    }

    #[test]
    fn test_systematic_monocycles() {
        let cyclohexane = base("C1CCCCC1");
        assert_eq!(cyclohexane.kind, RingBaseKind::Cyclo);
        assert_eq!(cyclohexane.name, "cyclohex");
        assert!(cyclohexane.unsaturation.is_empty());
        assert_eq!(cyclohexane.traversals.len(), 12);

        let cyclohexene = base("C1=CCCCC1");
        assert_eq!(cyclohexene.unsaturation, vec![(0, 1, Bond::Double)]);

        let oxepane = base("C1CCCOCC1");
        assert_eq!(oxepane.kind, RingBaseKind::Cyclo);
        assert_eq!(oxepane.name, "cyclohept");
    }

    #[test]
    fn test_bicycles() {
        assert_eq!(base("c1ccc2ccccc2c1").name, "naphthalene");
        assert_eq!(base("c1ccc2ncccc2c1").name, "quinoline");
        assert_eq!(base("c1ccc2cnccc2c1").name, "isoquinoline");
        assert_eq!(base("C1CC2CCC1C2").name, "bicyclo[2.2.1]hept");
        assert_eq!(base("C1CCC2CCCCC2C1").name, "bicyclo[4.4.0]dec");
        assert_eq!(base("C1CCC2(CC1)CCC2").name, "spiro[3.5]non");
    }

    #[test]
    fn test_polycyclic_systems() {
        let cases = [
            ("C1C2CC3CC1CC(C2)C3", "tricyclo[3.3.1.1^{3,7}]dec"),
            ("C12C3C4C1C5C2C3C45", "pentacyclo[4.2.0.0^{2,5}.0^{3,8}.0^{4,7}]oct"),
            ("C1CCC2C(C1)CCC1C2CCC2CCCC12", "tetracyclo[8.7.0.0^{2,7}.0^{11,15}]heptadec"),
            ("c1ccc2cc3ccccc3cc2c1", "tricyclo[8.4.0.0^{3,8}]tetradec"),
            ("c1ccc2c(c1)ccc1ccccc12", "tricyclo[8.4.0.0^{2,7}]tetradec"),
        ];
        for (smiles, expected) in cases {
            let named = base(smiles);
            assert_eq!(named.kind, RingBaseKind::VonBaeyer, "{smiles}");
            assert_eq!(named.name, expected, "{smiles}");
            assert!(!named.traversals.is_empty(), "{smiles}");
        }
        // Seven double bonds in one Kekulé structure of anthracene.
        assert_eq!(base("c1ccc2cc3ccccc3cc2c1").unsaturation.len(), 7);
    }

    #[test]
    fn test_indole_numbers_the_five_ring_first() {
        let molecule = parse_smiles("c1ccc2[nH]ccc2c1").unwrap();
        let analysis = RingAnalysis::new(&molecule);
        let indole = ring_base(&molecule, &analysis.systems[0].units[0]);
        assert_eq!(indole.name, "indole");
        assert!(!indole.traversals.is_empty());
        for traversal in &indole.traversals {
            assert_eq!(molecule.element(traversal.order[0]), Element::N);
            assert_eq!(traversal.labels[3], "3a");
        }
    }

    #[test]
    fn test_thiazole_numbers_sulfur_first() {
        let molecule = parse_smiles("c1cscn1").unwrap();
        let analysis = RingAnalysis::new(&molecule);
        let thiazole = ring_base(&molecule, &analysis.systems[0].units[0]);
        assert_eq!(thiazole.name, "1,3-thiazole");
        assert!(!thiazole.traversals.is_empty());
        for traversal in &thiazole.traversals {
            assert_eq!(molecule.element(traversal.order[0]), Element::S);
            assert_eq!(molecule.element(traversal.order[2]), Element::N);
        }
    }

    #[test]
    fn test_unretained_aromatic_ring_is_kekulized() {
        assert_eq!(base("c1ccc2nccnc2c1").name, "quinoxaline");
        let pteridine = base("c1cnc2cncnc2n1");
        assert_eq!(pteridine.kind, RingBaseKind::VonBaeyer);
        assert_eq!(pteridine.unsaturation.len(), 5);
    }
}
