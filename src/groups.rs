use crate::{Bond, Element, Molecule};
use std::collections::BTreeSet;
use tracing::*;

/// Characteristic group families, declared from most to least senior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GroupKind {
    CarboxylicAcid,
    Carboxylate,
    SulfonicAcid,
    PhosphonicAcid,
    Anhydride,
    Ester,
    AcidHalide,
    Amide,
    Sulfonamide,
    Nitrile,
    Aldehyde,
    Ketone,
    Sulfone,
    Sulfoxide,
    Nitro,
    Alcohol,
    Thiol,
    Isocyanate,
    Isothiocyanate,
    Cyanate,
    Thiocyanate,
    Amine,
    Ether,
    Sulfide,
}

/// Whether a suffix is attached to an acyclic chain or to a ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuffixStyle {
    Chain,
    Ring,
}

/// A principal-group suffix: the multiplied stem, an optional separate word,
/// and whether the group can only sit at a chain end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Suffix {
    pub stem: &'static str,
    pub word: Option<&'static str>,
    pub terminal: bool,
}

impl Suffix {
    const fn new(stem: &'static str, word: Option<&'static str>, terminal: bool) -> Self {
        Self { stem, word, terminal }
    }
}

impl GroupKind {
    pub fn rank(&self) -> u8 {
        use GroupKind::*;
        match self {
            CarboxylicAcid | Carboxylate | SulfonicAcid | PhosphonicAcid => 6,
            Anhydride | Ester | AcidHalide | Amide | Sulfonamide => 5,
            Nitrile | Aldehyde | Ketone | Sulfone | Sulfoxide | Nitro => 4,
            Alcohol | Thiol => 3,
            Isocyanate | Isothiocyanate | Cyanate | Thiocyanate => 2,
            Amine | Ether | Sulfide => 1,
        }
    }

    pub fn canonical_name(&self) -> &'static str {
        use GroupKind::*;
        match self {
            CarboxylicAcid => "carboxylic acid",
            Carboxylate => "carboxylate",
            SulfonicAcid => "sulfonic acid",
            PhosphonicAcid => "phosphonic acid",
            Anhydride => "anhydride",
            Ester => "ester",
            AcidHalide => "acid halide",
            Amide => "amide",
            Sulfonamide => "sulfonamide",
            Nitrile => "nitrile",
            Aldehyde => "aldehyde",
            Ketone => "ketone",
            Sulfone => "sulfone",
            Sulfoxide => "sulfoxide",
            Nitro => "nitro",
            Alcohol => "alcohol",
            Thiol => "thiol",
            Isocyanate => "isocyanate",
            Isothiocyanate => "isothiocyanate",
            Cyanate => "cyanate",
            Thiocyanate => "thiocyanate",
            Amine => "amine",
            Ether => "ether",
            Sulfide => "sulfide",
        }
    }

    /// The suffix used when this family is principal, or `None` for prefix-only families.
    pub fn suffix(&self, style: SuffixStyle) -> Option<Suffix> {
        use GroupKind::*;
        use SuffixStyle::*;
        Some(match (self, style) {
            (CarboxylicAcid, Chain) => Suffix::new("oic", Some("acid"), true),
            (CarboxylicAcid, Ring) => Suffix::new("carboxylic", Some("acid"), false),
            (Carboxylate, Chain) => Suffix::new("oate", None, true),
            (Carboxylate, Ring) => Suffix::new("carboxylate", None, false),
            (SulfonicAcid, _) => Suffix::new("sulfonic", Some("acid"), false),
            (PhosphonicAcid, _) => Suffix::new("phosphonic", Some("acid"), false),
            (Anhydride, Chain) => Suffix::new("oic", Some("anhydride"), true),
            (Anhydride, Ring) => Suffix::new("carboxylic", Some("anhydride"), false),
            (Ester, Chain) => Suffix::new("oate", None, true),
            (Ester, Ring) => Suffix::new("carboxylate", None, false),
            (AcidHalide, Chain) => Suffix::new("oyl", None, true),
            (AcidHalide, Ring) => Suffix::new("carbonyl", None, false),
            (Amide, Chain) => Suffix::new("amide", None, true),
            (Amide, Ring) => Suffix::new("carboxamide", None, false),
            (Sulfonamide, _) => Suffix::new("sulfonamide", None, false),
            (Nitrile, Chain) => Suffix::new("nitrile", None, true),
            (Nitrile, Ring) => Suffix::new("carbonitrile", None, false),
            (Aldehyde, Chain) => Suffix::new("al", None, true),
            (Aldehyde, Ring) => Suffix::new("carbaldehyde", None, false),
            (Ketone, _) => Suffix::new("one", None, false),
            (Alcohol, _) => Suffix::new("ol", None, false),
            (Thiol, _) => Suffix::new("thiol", None, false),
            _ => return None,
        })
    }

    pub fn has_suffix(&self) -> bool {
        self.suffix(SuffixStyle::Chain).is_some()
    }

    /// Families whose own carbon is counted in a chain parent but sits
    /// outside a ring parent ("-oic acid" against "-carboxylic acid").
    pub fn carbon_in_group(&self) -> bool {
        use GroupKind::*;
        matches!(
            self,
            CarboxylicAcid | Carboxylate | Anhydride | Ester | AcidHalide | Amide | Nitrile | Aldehyde
        )
    }

    /// Carbon-containing families whose carbon leaves the chain when they are
    /// only cited as prefixes (carboxy, cyano, carbamoyl).
    pub fn carbon_leaves_chain_as_prefix(&self) -> bool {
        self.carbon_in_group() && *self != GroupKind::Aldehyde
    }

    pub fn prefix(&self) -> &'static str {
        use GroupKind::*;
        match self {
            CarboxylicAcid => "carboxy",
            Carboxylate => "carboxylato",
            SulfonicAcid => "sulfo",
            PhosphonicAcid => "phosphono",
            Anhydride => "carbonyl",
            Ester => "carbonyl",
            AcidHalide => "carbonyl",
            Amide => "carbamoyl",
            Sulfonamide => "sulfamoyl",
            Nitrile => "cyano",
            Aldehyde => "formyl",
            Ketone => "oxo",
            Sulfone => "sulfonyl",
            Sulfoxide => "sulfinyl",
            Nitro => "nitro",
            Alcohol => "hydroxy",
            Thiol => "sulfanyl",
            Isocyanate => "isocyanato",
            Isothiocyanate => "isothiocyanato",
            Cyanate => "cyanato",
            Thiocyanate => "thiocyanato",
            Amine => "amino",
            Ether => "oxy",
            Sulfide => "sulfanyl",
        }
    }
}

/// One detected characteristic group. `atoms` holds the group's own atoms;
/// the anchor is the carbon carrying the group (for carbonyl-type families,
/// the group's own carbon).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionalGroup {
    pub kind: GroupKind,
    pub atoms: BTreeSet<usize>,
    pub anchor: usize,
    pub attachments: BTreeSet<usize>,
    pub rank: u8,
    /// The ester alkyl carbon, or the second acyl carbon of an anhydride.
    pub partner: Option<usize>,
    /// The bridging oxygen of an ester or anhydride.
    pub bridge: Option<usize>,
    pub halogen: Option<Element>,
    /// The nitrogen of an amide or sulfonamide, which may carry N-substituents.
    pub nitrogen: Option<usize>,
}

impl FunctionalGroup {
    pub(crate) fn new(molecule: &Molecule, kind: GroupKind, atoms: BTreeSet<usize>, anchor: usize) -> Self {
        let mut group = Self {
            kind,
            atoms,
            anchor,
            attachments: BTreeSet::new(),
            rank: kind.rank(),
            partner: None,
            bridge: None,
            halogen: None,
            nitrogen: None,
        };
        group.attachments = group
            .atoms
            .iter()
            .flat_map(|&a| molecule.heavy_neighbors(a))
            .filter(|n| !group.atoms.contains(n))
            .collect();
        group
    }

    pub fn name(&self) -> &'static str {
        self.kind.canonical_name()
    }

    pub fn contains(&self, atom: usize) -> bool {
        self.atoms.contains(&atom)
    }
}

fn neighbors_by(molecule: &Molecule, atom: usize, element: Element, bond: Bond) -> Vec<usize> {
    molecule
        .heavy_neighbors(atom)
        .into_iter()
        .filter(|&n| molecule.element(n) == element && molecule.bond(atom, n) == Some(bond))
        .collect()
}

fn terminal(molecule: &Molecule, atom: usize) -> bool {
    molecule.heavy_neighbors(atom).len() == 1
}

fn carbon_neighbors(molecule: &Molecule, atom: usize) -> Vec<usize> {
    molecule
        .heavy_neighbors(atom)
        .into_iter()
        .filter(|&n| molecule.element(n).is_carbon())
        .collect()
}

/// Scans a molecule for every characteristic group. Each atom belongs to at
/// most one group; more senior patterns are matched first.
pub fn detect_functional_groups(molecule: &Molecule) -> Vec<FunctionalGroup> {
    let mut claimed = BTreeSet::new();
    let mut groups = Vec::new();

    detect_carbonyls(molecule, &mut claimed, &mut groups);
    detect_heteroacids(molecule, &mut claimed, &mut groups);
    detect_nitrogen_groups(molecule, &mut claimed, &mut groups);
    detect_hydroxyls(molecule, &mut claimed, &mut groups);
    detect_bridges(molecule, &mut claimed, &mut groups);

    groups.sort_by(|a, b| a.kind.cmp(&b.kind).then(a.anchor.cmp(&b.anchor)));
    debug!(
        "detected groups: {:?}",
        groups.iter().map(|g| (g.name(), g.anchor)).collect::<Vec<_>>()
    );
    groups
}

fn detect_carbonyls(molecule: &Molecule, claimed: &mut BTreeSet<usize>, groups: &mut Vec<FunctionalGroup>) {
    for c in 0..molecule.atom_count() {
        if !molecule.element(c).is_carbon() || claimed.contains(&c) {
            continue;
        }
        let oxo = neighbors_by(molecule, c, Element::O, Bond::Double)
            .into_iter()
            .find(|&o| terminal(molecule, o) && !claimed.contains(&o));
        let Some(oxo) = oxo else { continue };

        // Carbonyls inside a ring, lactones and lactams included, are ring ketones.
        if molecule.is_ring_atom(c) {
            claimed.insert(oxo);
            groups.push(FunctionalGroup::new(molecule, GroupKind::Ketone, [oxo].into(), c));
            continue;
        }

        let others: Vec<usize> = molecule
            .heavy_neighbors(c)
            .into_iter()
            .filter(|&n| n != oxo)
            .collect();

        // Anhydride: C(=O)-O-C(=O)
        let anhydride = others.iter().copied().find_map(|o| {
            if molecule.element(o) != Element::O || molecule.bond(c, o) != Some(Bond::Single) || claimed.contains(&o) {
                return None;
            }
            let across: Vec<usize> = molecule.heavy_neighbors(o).into_iter().filter(|&n| n != c).collect();
            if across.len() != 1 || molecule.is_ring_atom(across[0]) || claimed.contains(&across[0]) {
                return None;
            }
            let other = across[0];
            let other_oxo = neighbors_by(molecule, other, Element::O, Bond::Double)
                .into_iter()
                .find(|&x| terminal(molecule, x))?;
            Some((o, other, other_oxo))
        });
        if let Some((bridge, other, other_oxo)) = anhydride {
            let atoms: BTreeSet<usize> = [c, oxo, bridge, other, other_oxo].into();
            claimed.extend(atoms.iter().copied());
            let mut group = FunctionalGroup::new(molecule, GroupKind::Anhydride, atoms, c);
            group.partner = Some(other);
            group.bridge = Some(bridge);
            groups.push(group);
            continue;
        }

        let single_o: Vec<usize> = others
            .iter()
            .copied()
            .filter(|&n| molecule.element(n) == Element::O && molecule.bond(c, n) == Some(Bond::Single))
            .collect();
        let hydroxyl = single_o
            .iter()
            .copied()
            .find(|&o| terminal(molecule, o) && !claimed.contains(&o));
        if let Some(oh) = hydroxyl {
            let atoms: BTreeSet<usize> = [c, oxo, oh].into();
            claimed.extend(atoms.iter().copied());
            // A deprotonated acid, C(=O)[O-], is named as its anion.
            let kind = if molecule.atom(oh).charge < 0 {
                GroupKind::Carboxylate
            } else {
                GroupKind::CarboxylicAcid
            };
            groups.push(FunctionalGroup::new(molecule, kind, atoms, c));
            continue;
        }

        let ester = single_o.iter().copied().find_map(|o| {
            let across: Vec<usize> = molecule.heavy_neighbors(o).into_iter().filter(|&n| n != c).collect();
            match across.as_slice() {
                [r] if molecule.element(*r).is_carbon() && !claimed.contains(&o) => Some((o, *r)),
                _ => None,
            }
        });
        if let Some((bridge, alkyl)) = ester {
            let atoms: BTreeSet<usize> = [c, oxo, bridge].into();
            claimed.extend(atoms.iter().copied());
            let mut group = FunctionalGroup::new(molecule, GroupKind::Ester, atoms, c);
            group.partner = Some(alkyl);
            group.bridge = Some(bridge);
            groups.push(group);
            continue;
        }

        let halogen = others
            .iter()
            .copied()
            .find(|&n| molecule.element(n).is_halogen() && !claimed.contains(&n));
        if let Some(x) = halogen {
            let atoms: BTreeSet<usize> = [c, oxo, x].into();
            claimed.extend(atoms.iter().copied());
            let mut group = FunctionalGroup::new(molecule, GroupKind::AcidHalide, atoms, c);
            group.halogen = Some(molecule.element(x));
            groups.push(group);
            continue;
        }

        let nitrogen = others.iter().copied().find(|&n| {
            molecule.element(n) == Element::N
                && molecule.bond(c, n) == Some(Bond::Single)
                && !molecule.is_ring_atom(n)
                && !claimed.contains(&n)
        });
        if let Some(n) = nitrogen {
            let atoms: BTreeSet<usize> = [c, oxo, n].into();
            claimed.extend(atoms.iter().copied());
            let mut group = FunctionalGroup::new(molecule, GroupKind::Amide, atoms, c);
            group.nitrogen = Some(n);
            groups.push(group);
            continue;
        }

        let carbons = carbon_neighbors(molecule, c);
        let heteros = others.len() - carbons.len();
        if carbons.len() >= 2 {
            claimed.insert(oxo);
            groups.push(FunctionalGroup::new(molecule, GroupKind::Ketone, [oxo].into(), c));
        } else if heteros == 0 && molecule.total_hydrogens(c) >= 1 {
            let atoms: BTreeSet<usize> = [c, oxo].into();
            claimed.extend(atoms.iter().copied());
            groups.push(FunctionalGroup::new(molecule, GroupKind::Aldehyde, atoms, c));
        }
    }

    // Nitriles
    for c in 0..molecule.atom_count() {
        if !molecule.element(c).is_carbon() || claimed.contains(&c) || molecule.is_ring_atom(c) {
            continue;
        }
        let nitrogen = neighbors_by(molecule, c, Element::N, Bond::Triple)
            .into_iter()
            .find(|&n| terminal(molecule, n));
        let Some(n) = nitrogen else { continue };
        let rest: Vec<usize> = molecule.heavy_neighbors(c).into_iter().filter(|&x| x != n).collect();
        // O-C#N and S-C#N are cyanates, not nitriles.
        if rest.iter().any(|&x| matches!(molecule.element(x), Element::O | Element::S)) {
            continue;
        }
        let atoms: BTreeSet<usize> = [c, n].into();
        claimed.extend(atoms.iter().copied());
        groups.push(FunctionalGroup::new(molecule, GroupKind::Nitrile, atoms, c));
    }
}

/// The single carbon bonded to a heteroatom centre, if any.
fn carbon_anchor(molecule: &Molecule, centre: usize, group_atoms: &BTreeSet<usize>) -> Option<usize> {
    molecule
        .heavy_neighbors(centre)
        .into_iter()
        .find(|n| !group_atoms.contains(n) && molecule.element(*n).is_carbon())
}

fn detect_heteroacids(molecule: &Molecule, claimed: &mut BTreeSet<usize>, groups: &mut Vec<FunctionalGroup>) {
    for centre in 0..molecule.atom_count() {
        let element = molecule.element(centre);
        if !matches!(element, Element::S | Element::P) || claimed.contains(&centre) || molecule.is_ring_atom(centre) {
            continue;
        }
        let oxo: Vec<usize> = neighbors_by(molecule, centre, Element::O, Bond::Double)
            .into_iter()
            .filter(|&o| terminal(molecule, o) && !claimed.contains(&o))
            .collect();
        let hydroxy: Vec<usize> = neighbors_by(molecule, centre, Element::O, Bond::Single)
            .into_iter()
            .filter(|&o| terminal(molecule, o) && !claimed.contains(&o))
            .collect();
        let amino: Vec<usize> = neighbors_by(molecule, centre, Element::N, Bond::Single)
            .into_iter()
            .filter(|&n| !claimed.contains(&n) && !molecule.is_ring_atom(n))
            .collect();
        let carbons = carbon_neighbors(molecule, centre);

        let (kind, atoms, nitrogen) = match element {
            Element::S if oxo.len() == 2 && !hydroxy.is_empty() => {
                let mut atoms: BTreeSet<usize> = [centre, oxo[0], oxo[1], hydroxy[0]].into();
                atoms.extend(hydroxy.iter().skip(1).copied());
                (GroupKind::SulfonicAcid, atoms, None)
            }
            Element::S if oxo.len() == 2 && !amino.is_empty() && carbons.len() == 1 => (
                GroupKind::Sulfonamide,
                [centre, oxo[0], oxo[1], amino[0]].into(),
                Some(amino[0]),
            ),
            Element::S if oxo.len() == 2 && carbons.len() == 2 => {
                (GroupKind::Sulfone, [centre, oxo[0], oxo[1]].into(), None)
            }
            Element::S if oxo.len() == 1 && carbons.len() == 2 => {
                (GroupKind::Sulfoxide, [centre, oxo[0]].into(), None)
            }
            Element::P if oxo.len() == 1 && hydroxy.len() == 2 => {
                (GroupKind::PhosphonicAcid, [centre, oxo[0], hydroxy[0], hydroxy[1]].into(), None)
            }
            _ => continue,
        };
        let Some(anchor) = carbon_anchor(molecule, centre, &atoms) else {
            continue;
        };
        claimed.extend(atoms.iter().copied());
        let mut group = FunctionalGroup::new(molecule, kind, atoms, anchor);
        group.nitrogen = nitrogen;
        groups.push(group);
    }
}

fn detect_nitrogen_groups(molecule: &Molecule, claimed: &mut BTreeSet<usize>, groups: &mut Vec<FunctionalGroup>) {
    for n in 0..molecule.atom_count() {
        if claimed.contains(&n) || molecule.is_ring_atom(n) {
            continue;
        }
        match molecule.element(n) {
            Element::N => {
                let oxygens: Vec<usize> = molecule
                    .heavy_neighbors(n)
                    .into_iter()
                    .filter(|&o| molecule.element(o) == Element::O && terminal(molecule, o))
                    .collect();
                if oxygens.len() == 2 {
                    let atoms: BTreeSet<usize> = [n, oxygens[0], oxygens[1]].into();
                    if let Some(anchor) = carbon_anchor(molecule, n, &atoms) {
                        claimed.extend(atoms.iter().copied());
                        groups.push(FunctionalGroup::new(molecule, GroupKind::Nitro, atoms, anchor));
                    }
                    continue;
                }
                // N=C=O and N=C=S
                let cumulated = neighbors_by(molecule, n, Element::C, Bond::Double)
                    .into_iter()
                    .find_map(|c| {
                        let end = molecule.heavy_neighbors(c).into_iter().find(|&x| {
                            x != n
                                && matches!(molecule.element(x), Element::O | Element::S)
                                && molecule.bond(c, x) == Some(Bond::Double)
                                && terminal(molecule, x)
                        })?;
                        Some((c, end))
                    });
                if let Some((c, end)) = cumulated {
                    let atoms: BTreeSet<usize> = [n, c, end].into();
                    if let Some(anchor) = carbon_anchor(molecule, n, &atoms) {
                        let kind = if molecule.element(end) == Element::O {
                            GroupKind::Isocyanate
                        } else {
                            GroupKind::Isothiocyanate
                        };
                        claimed.extend(atoms.iter().copied());
                        groups.push(FunctionalGroup::new(molecule, kind, atoms, anchor));
                    }
                }
            }
            Element::O | Element::S => {
                // O-C#N and S-C#N
                let cyano = molecule.heavy_neighbors(n).into_iter().find_map(|c| {
                    if !molecule.element(c).is_carbon() || claimed.contains(&c) {
                        return None;
                    }
                    let nitrogen = neighbors_by(molecule, c, Element::N, Bond::Triple)
                        .into_iter()
                        .find(|&x| terminal(molecule, x))?;
                    (molecule.heavy_neighbors(c).len() == 2).then_some((c, nitrogen))
                });
                if let Some((c, nitrogen)) = cyano {
                    let atoms: BTreeSet<usize> = [n, c, nitrogen].into();
                    if let Some(anchor) = carbon_anchor(molecule, n, &atoms) {
                        let kind = if molecule.element(n) == Element::O {
                            GroupKind::Cyanate
                        } else {
                            GroupKind::Thiocyanate
                        };
                        claimed.extend(atoms.iter().copied());
                        groups.push(FunctionalGroup::new(molecule, kind, atoms, anchor));
                    }
                }
            }
            _ => {}
        }
    }
}

fn detect_hydroxyls(molecule: &Molecule, claimed: &mut BTreeSet<usize>, groups: &mut Vec<FunctionalGroup>) {
    for x in 0..molecule.atom_count() {
        let kind = match molecule.element(x) {
            Element::O => GroupKind::Alcohol,
            Element::S => GroupKind::Thiol,
            _ => continue,
        };
        if claimed.contains(&x) || !terminal(molecule, x) || molecule.total_hydrogens(x) == 0 {
            continue;
        }
        let Some(&carbon) = molecule.heavy_neighbors(x).first() else { continue };
        if !molecule.element(carbon).is_carbon() || molecule.bond(x, carbon) != Some(Bond::Single) {
            continue;
        }
        claimed.insert(x);
        groups.push(FunctionalGroup::new(molecule, kind, [x].into(), carbon));
    }
}

fn detect_bridges(molecule: &Molecule, claimed: &mut BTreeSet<usize>, groups: &mut Vec<FunctionalGroup>) {
    for x in 0..molecule.atom_count() {
        if claimed.contains(&x) || molecule.is_ring_atom(x) {
            continue;
        }
        let neighbors = molecule.heavy_neighbors(x);
        if neighbors.iter().any(|&n| molecule.bond(x, n) != Some(Bond::Single)) {
            continue;
        }
        let carbons = carbon_neighbors(molecule, x);
        let Some(&anchor) = carbons.first() else { continue };
        let kind = match molecule.element(x) {
            Element::N if molecule.atom(x).charge == 0 => GroupKind::Amine,
            Element::O if neighbors.len() == 2 => GroupKind::Ether,
            Element::S if neighbors.len() == 2 => GroupKind::Sulfide,
            _ => continue,
        };
        claimed.insert(x);
        groups.push(FunctionalGroup::new(molecule, kind, [x].into(), anchor));
    }
}

/// The principal family: the suffix-capable family with the highest
/// rank and seniority among `groups`.
pub fn principal_kind<'a>(groups: impl IntoIterator<Item = &'a FunctionalGroup>) -> Option<GroupKind> {
    groups
        .into_iter()
        .map(|g| g.kind)
        .filter(|k| k.has_suffix())
        .min()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_smiles;

    fn kinds(smiles: &str) -> Vec<GroupKind> {
        let molecule = parse_smiles(smiles).unwrap();
        detect_functional_groups(&molecule).into_iter().map(|g| g.kind).collect()
    }

    #[test]
    fn test_detect_groups() {
        use GroupKind::*;
        let cases: &[(&str, &[GroupKind])] = &[
            ("CCO", &[Alcohol]),
            ("CC(=O)O", &[CarboxylicAcid]),
            ("OCC(=O)O", &[CarboxylicAcid, Alcohol]),
            ("CC(=O)[O-]", &[Carboxylate]),
            ("OC(=O)CC(=O)[O-]", &[CarboxylicAcid, Carboxylate]),
            ("C[NH3+]", &[]),
            ("CC(=O)OC", &[Ester]),
            ("CC(=O)OC(=O)C", &[Anhydride]),
            ("CC(=O)Cl", &[AcidHalide]),
            ("CC(=O)N", &[Amide]),
            ("CC#N", &[Nitrile]),
            ("CC=O", &[Aldehyde]),
            ("CC(=O)C", &[Ketone]),
            ("O=C1CCCCC1", &[Ketone]),
            ("O=C1CCCO1", &[Ketone]),
            ("CS(=O)(=O)O", &[SulfonicAcid]),
            ("CS(=O)(=O)N", &[Sulfonamide]),
            ("CS(=O)(=O)C", &[Sulfone]),
            ("CS(=O)C", &[Sulfoxide]),
            ("CP(=O)(O)O", &[PhosphonicAcid]),
            ("C[N+](=O)[O-]", &[Nitro]),
            ("CS", &[Thiol]),
            ("CN=C=O", &[Isocyanate]),
            ("CN=C=S", &[Isothiocyanate]),
            ("COC#N", &[Cyanate]),
            ("CSC#N", &[Thiocyanate]),
            ("CN", &[Amine]),
            ("COC", &[Ether]),
            ("CSC", &[Sulfide]),
            ("CCCl", &[]),
            ("CCCC", &[]),
        ];
        for (smiles, expected) in cases {
            assert_eq!(kinds(smiles), expected.to_vec(), "{smiles}");
        }
    }

    #[test]
    fn test_ring_atoms_are_not_amines_or_ethers() {
        assert_eq!(kinds("C1CCNCC1"), vec![]);
        assert_eq!(kinds("C1CCOCC1"), vec![]);
    }

    #[test]
    fn test_group_records() {
        let molecule = parse_smiles("CCOC(=O)C").unwrap();
        let groups = detect_functional_groups(&molecule);
        assert_eq!(groups.len(), 1);
        let ester = &groups[0];
        assert_eq!(ester.anchor, 3);
        assert_eq!(ester.partner, Some(1));
        assert_eq!(ester.bridge, Some(2));
        assert_eq!(ester.atoms, [2, 3, 4].into());
        assert_eq!(ester.attachments, [1, 5].into());
        assert_eq!(ester.rank, 5);
    }

    #[test]
    fn test_principal_kind() {
        let molecule = parse_smiles("NCC(O)CC(=O)O").unwrap();
        let groups = detect_functional_groups(&molecule);
        assert_eq!(principal_kind(&groups), Some(GroupKind::CarboxylicAcid));
        let molecule = parse_smiles("COCCN").unwrap();
        assert_eq!(principal_kind(&detect_functional_groups(&molecule)), None);
    }

    #[test]
    fn test_suffix_table() {
        let acid = GroupKind::CarboxylicAcid.suffix(SuffixStyle::Chain).unwrap();
        assert_eq!((acid.stem, acid.word, acid.terminal), ("oic", Some("acid"), true));
        let ring = GroupKind::CarboxylicAcid.suffix(SuffixStyle::Ring).unwrap();
        assert_eq!(ring.stem, "carboxylic");
        assert!(GroupKind::Ether.suffix(SuffixStyle::Chain).is_none());
        assert!(GroupKind::Nitrile > GroupKind::Amide);
        assert!(GroupKind::Alcohol < GroupKind::Amine);
    }
}
