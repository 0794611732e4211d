use crate::{
    alpha_key, compound_multiplier, enclose, molecular_formula, multiplier, reachable, Bond, Context, Element,
    FunctionalGroup, GroupKind, Locant, Mode, NamedParent, NamingError, ParentKind, Valence,
};
use std::collections::{BTreeMap, BTreeSet};
use tracing::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SubstituentCategory {
    Alkyl,
    Halo,
    Functional,
    Aryl,
    Ring,
}

/// A prefix cited on a parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substituent {
    pub locant: Locant,
    /// The locant as printed ("2", "4a", "N").
    pub label: String,
    /// The parent atom the substituent hangs from.
    pub attachment: usize,
    /// The first atom of the substituent.
    pub atom: usize,
    pub category: SubstituentCategory,
    pub size: usize,
    pub name: String,
    /// Compound names are enclosed and multiplied with bis/tris.
    pub compound: bool,
}

/// A named branch and the atoms it covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch {
    pub atoms: BTreeSet<usize>,
    pub name: String,
    pub compound: bool,
    pub category: SubstituentCategory,
}

impl Branch {
    fn simple(atoms: BTreeSet<usize>, name: &str, category: SubstituentCategory) -> Self {
        Self {
            atoms,
            name: name.to_string(),
            compound: false,
            category,
        }
    }

    fn functional(atoms: BTreeSet<usize>, name: String, compound: bool) -> Self {
        Self {
            atoms,
            name,
            compound,
            category: SubstituentCategory::Functional,
        }
    }

    fn from_parent(atoms: BTreeSet<usize>, named: NamedParent) -> Self {
        let category = match named.parent {
            ParentKind::Chain => SubstituentCategory::Alkyl,
            ParentKind::Ring { aromatic: true } => SubstituentCategory::Aryl,
            ParentKind::Ring { aromatic: false } => SubstituentCategory::Ring,
        };
        Self {
            atoms,
            name: named.name,
            compound: named.compound,
            category,
        }
    }
}

const CONTRACTED_ALKOXY: [&str; 5] = ["methyl", "ethyl", "propyl", "butyl", "phenyl"];

/// "methyl" becomes "methoxy"; other names take "oxy" and are enclosed.
/// A heteroatom-rooted child with its own prefixes is bracketed first,
/// "(trimethylsilyl)oxy".
fn alkoxy(atoms: BTreeSet<usize>, child: &Branch) -> Branch {
    if CONTRACTED_ALKOXY.iter().any(|c| child.name.ends_with(c)) {
        let stem = &child.name[..child.name.len() - 2];
        return Branch::functional(atoms, format!("{stem}oxy"), child.compound);
    }
    let name = if child.compound && child.category == SubstituentCategory::Functional {
        enclose(&child.name)
    } else {
        child.name.clone()
    };
    Branch::functional(atoms, format!("{name}oxy"), true)
}

/// Cites the branches on a heteroatom: "dimethyl", "ethyl(methyl)".
fn cite_children(children: &[Branch]) -> String {
    let mut grouped: BTreeMap<(String, String), (bool, usize)> = BTreeMap::new();
    for child in children {
        grouped
            .entry((alpha_key(&child.name), child.name.clone()))
            .or_insert((child.compound, 0))
            .1 += 1;
    }
    grouped
        .into_iter()
        .enumerate()
        .map(|(i, ((_, name), (compound, count)))| match (compound, i) {
            (true, _) => format!("{}{}", compound_multiplier(count), enclose(&name)),
            (false, 0) => format!("{}{}", multiplier(count), name),
            (false, _) => enclose(&format!("{}{}", multiplier(count), name)),
        })
        .collect()
}

impl Context<'_> {
    /// Names the branch entered from parent atom `from` at `start`. Atoms in
    /// `visited` belong to enclosing structures and are never re-entered.
    pub(crate) fn name_branch(&self, from: usize, start: usize, visited: BTreeSet<usize>, depth: usize) -> Branch {
        let molecule = self.molecule;
        let atoms = reachable(molecule, start, |a| !visited.contains(&a));
        let element = molecule.element(start);

        if let Some(prefix) = element.halo_prefix() {
            return Branch::simple(atoms, prefix, SubstituentCategory::Halo);
        }
        if let Some(group) = self.group_containing(start) {
            if let Some(branch) = self.name_group_branch(group, from, start, &atoms, &visited, depth) {
                return branch;
            }
        }
        if element.is_carbon() {
            return self.name_carbon_branch(from, start, atoms, visited, depth);
        }
        if molecule.is_ring_atom(start) {
            let valence = Valence::from_bond(molecule.bond(from, start).unwrap_or(Bond::Single));
            let mode = Mode::Substituent {
                attachment: start,
                valence,
            };
            match self.name_region(&atoms, &visited, mode, depth + 1) {
                Ok(named) => return Branch::from_parent(atoms, named),
                Err(err) => debug!("ring heteroatom {start} named as a plain heteroatom: {err}"),
            }
        }
        self.name_hetero_root(from, start, atoms, visited, depth)
    }

    fn formula_branch(&self, start: usize, atoms: BTreeSet<usize>, err: NamingError) -> Branch {
        warn!("{err}; citing the branch at atom {start} by its formula");
        Branch {
            name: format!("{}yl", molecular_formula(self.molecule, &atoms)),
            atoms,
            compound: true,
            category: SubstituentCategory::Alkyl,
        }
    }

    fn name_carbon_branch(
        &self,
        from: usize,
        start: usize,
        atoms: BTreeSet<usize>,
        visited: BTreeSet<usize>,
        depth: usize,
    ) -> Branch {
        let molecule = self.molecule;
        let bond = molecule.bond(from, start).unwrap_or(Bond::Single);
        let oxo = if bond == Bond::Single && !molecule.is_ring_atom(start) {
            molecule.heavy_neighbors(start).into_iter().find(|&o| {
                atoms.contains(&o)
                    && molecule.element(o) == Element::O
                    && molecule.bond(start, o) == Some(Bond::Double)
                    && molecule.heavy_neighbors(o).len() == 1
            })
        } else {
            None
        };

        let result = match oxo {
            Some(oxo) => {
                let mut inner = visited.clone();
                inner.insert(oxo);
                let rest: Vec<usize> = molecule
                    .heavy_neighbors(start)
                    .into_iter()
                    .filter(|n| !inner.contains(n))
                    .collect();
                if let [ring] = rest.as_slice() {
                    if molecule.is_ring_atom(*ring) {
                        let mut acyl = inner.clone();
                        acyl.insert(start);
                        let region = reachable(molecule, *ring, |a| !acyl.contains(&a));
                        let mode = Mode::Substituent {
                            attachment: *ring,
                            valence: Valence::Carbonyl,
                        };
                        match self.name_region(&region, &acyl, mode, depth + 1) {
                            Ok(named) => return Branch::from_parent(atoms, named),
                            Err(err) => debug!("ring acyl at {start} named as a chain: {err}"),
                        }
                    }
                }
                let mut region = atoms.clone();
                region.remove(&oxo);
                let mode = Mode::Substituent {
                    attachment: start,
                    valence: Valence::Oyl,
                };
                self.name_region(&region, &inner, mode, depth + 1)
            }
            None => {
                let mode = Mode::Substituent {
                    attachment: start,
                    valence: Valence::from_bond(bond),
                };
                self.name_region(&atoms, &visited, mode, depth + 1)
            }
        };
        match result {
            Ok(named) => Branch::from_parent(atoms, named),
            Err(err) => self.formula_branch(start, atoms, err),
        }
    }

    /// Names every unvisited neighbour of `centre`, claiming atoms as it goes.
    fn name_children(&self, centre: usize, inner: &mut BTreeSet<usize>, depth: usize) -> Vec<Branch> {
        inner.insert(centre);
        let mut children = Vec::new();
        for next in self.molecule.heavy_neighbors(centre) {
            if inner.contains(&next) {
                continue;
            }
            let child = self.name_branch(centre, next, inner.clone(), depth);
            inner.extend(child.atoms.iter().copied());
            children.push(child);
        }
        children
    }

    /// Prefix names for branches that start inside a detected group.
    fn name_group_branch(
        &self,
        group: &FunctionalGroup,
        from: usize,
        start: usize,
        atoms: &BTreeSet<usize>,
        visited: &BTreeSet<usize>,
        depth: usize,
    ) -> Option<Branch> {
        use GroupKind::*;
        let molecule = self.molecule;
        let element = molecule.element(start);
        // Entering through the group's own bridge or nitrogen names the acyl side instead.
        let inward = Some(from) == group.bridge || Some(from) == group.nitrogen;
        let at_anchor = start == group.anchor && !inward;
        let plain = |name: &str| Some(Branch::functional(atoms.clone(), name.to_string(), false));

        match group.kind {
            CarboxylicAcid if at_anchor => plain("carboxy"),
            Carboxylate if at_anchor => plain("carboxylato"),
            Nitrile if at_anchor => plain("cyano"),
            Aldehyde if at_anchor => plain("formyl"),
            AcidHalide if at_anchor => {
                let halo = group.halogen.and_then(|e| e.halo_prefix()).unwrap_or("halo");
                Some(Branch::functional(atoms.clone(), format!("{halo}carbonyl"), true))
            }
            Amide | Sulfonamide if at_anchor || (element == Element::S && !inward) => {
                let mut inner = visited.clone();
                inner.extend(group.atoms.iter().copied());
                let children = match group.nitrogen {
                    Some(nitrogen) => self.name_children(nitrogen, &mut inner, depth),
                    None => Vec::new(),
                };
                let stem = if group.kind == Amide { "carbamoyl" } else { "sulfamoyl" };
                if children.is_empty() {
                    plain(stem)
                } else {
                    let name = format!("{}{stem}", cite_children(&children));
                    Some(Branch::functional(atoms.clone(), name, true))
                }
            }
            Ester if at_anchor => {
                let bridge = group.bridge?;
                let mut inner = visited.clone();
                inner.extend(group.atoms.iter().copied().filter(|&a| a != bridge));
                let side = reachable(molecule, bridge, |a| !inner.contains(&a));
                let alkoxy = self.name_hetero_root(start, bridge, side, inner, depth);
                Some(Branch::functional(atoms.clone(), format!("{}carbonyl", alkoxy.name), true))
            }
            Anhydride if at_anchor || (Some(start) == group.partner && !inward) => {
                let bridge = group.bridge?;
                let oxo = group
                    .atoms
                    .iter()
                    .copied()
                    .find(|&a| a != bridge && molecule.bond(start, a) == Some(Bond::Double))?;
                let mut inner = visited.clone();
                inner.extend([start, oxo]);
                let side = reachable(molecule, bridge, |a| !inner.contains(&a));
                let acyloxy = self.name_hetero_root(start, bridge, side, inner, depth);
                let name = format!("{}carbonyl", enclose(&acyloxy.name));
                Some(Branch::functional(atoms.clone(), name, true))
            }
            Ketone | Aldehyde if element == Element::O => plain("oxo"),
            SulfonicAcid if element == Element::S => plain("sulfo"),
            PhosphonicAcid if element == Element::P => plain("phosphono"),
            Nitro if element == Element::N => plain("nitro"),
            Isocyanate if element == Element::N => plain("isocyanato"),
            Isothiocyanate if element == Element::N => plain("isothiocyanato"),
            Cyanate if element == Element::O => plain("cyanato"),
            Thiocyanate if element == Element::S => plain("thiocyanato"),
            _ => None,
        }
    }

    /// Names a branch that starts on a heteroatom from the atom itself and
    /// whatever hangs off it.
    pub(crate) fn name_hetero_root(
        &self,
        from: usize,
        centre: usize,
        atoms: BTreeSet<usize>,
        visited: BTreeSet<usize>,
        depth: usize,
    ) -> Branch {
        let molecule = self.molecule;
        let element = molecule.element(centre);
        let bond = molecule.bond(from, centre).unwrap_or(Bond::Single);

        let mut inner = visited;
        inner.insert(centre);
        let oxo: Vec<usize> = molecule
            .heavy_neighbors(centre)
            .into_iter()
            .filter(|&o| {
                !inner.contains(&o)
                    && molecule.element(o) == Element::O
                    && molecule.bond(centre, o) == Some(Bond::Double)
                    && molecule.heavy_neighbors(o).len() == 1
            })
            .collect();
        inner.extend(oxo.iter().copied());
        let children = self.name_children(centre, &mut inner, depth);
        let cited = cite_children(&children);

        let name = match element {
            Element::O => match (children.first(), bond) {
                (Some(child), _) => return alkoxy(atoms, child),
                (None, Bond::Double) => "oxo".to_string(),
                (None, _) if molecule.atom(centre).charge < 0 => "oxido".to_string(),
                (None, _) => "hydroxy".to_string(),
            },
            Element::S if bond == Bond::Double && children.is_empty() => "sulfanylidene".to_string(),
            Element::S => {
                let stem = match oxo.len() {
                    0 => "sulfanyl",
                    1 => "sulfinyl",
                    _ => "sulfonyl",
                };
                format!("{cited}{stem}")
            }
            Element::Se => format!("{cited}selanyl"),
            Element::N if oxo.len() >= 2 => "nitro".to_string(),
            Element::N if oxo.len() == 1 => "nitroso".to_string(),
            Element::N if bond == Bond::Single && molecule.atom(centre).charge > 0 => format!("{cited}azaniumyl"),
            Element::N if bond == Bond::Triple => "nitrilo".to_string(),
            Element::N if bond == Bond::Double => format!("{cited}imino"),
            Element::N => format!("{cited}amino"),
            Element::P if oxo.is_empty() => format!("{cited}phosphanyl"),
            Element::P => format!("{cited}phosphoryl"),
            Element::Si => format!("{cited}silyl"),
            Element::B => format!("{cited}boranyl"),
            other => match other.metallo_prefix() {
                Some(prefix) => format!("{cited}{prefix}"),
                None => format!("{cited}{}yl", other.name()),
            },
        };
        Branch::functional(atoms, name, !children.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{parse_smiles, NamingOptions, RingMemo};

    /// Names the branch of `smiles` entered from atom 0 at atom 1.
    fn branch(smiles: &str) -> Branch {
        let molecule = parse_smiles(smiles).unwrap();
        let options = NamingOptions::default();
        let mut memo = RingMemo::new();
        let context = Context::new(&molecule, &options, &mut memo);
        context.name_branch(0, 1, [0].into(), 0)
    }

    #[test]
    fn test_alkyl_branches() {
        let cases = [
            ("CC", "methyl", false),
            ("CCC", "ethyl", false),
            ("CC(C)C", "propan-2-yl", true),
            ("CCC(C)C", "2-methylpropyl", true),
            ("CC=C", "ethenyl", false),
            ("CCC=C", "prop-2-en-1-yl", true),
            ("C=C", "methylidene", false),
            ("CC(=O)C", "ethanoyl", false),
        ];
        for (smiles, name, compound) in cases {
            let named = branch(smiles);
            assert_eq!(named.name, name, "{smiles}");
            assert_eq!(named.compound, compound, "{smiles}");
            assert_eq!(named.category, SubstituentCategory::Alkyl, "{smiles}");
        }
    }

    #[test]
    fn test_ring_branches() {
        let cases = [
            ("CC1CCCCC1", "cyclohexyl", SubstituentCategory::Ring),
            ("Cc1ccccc1", "phenyl", SubstituentCategory::Aryl),
            ("Cc1cccnc1", "pyridin-3-yl", SubstituentCategory::Aryl),
            ("Cc1ccc2ccccc2c1", "naphthalen-2-yl", SubstituentCategory::Aryl),
            ("CC(=O)c1ccccc1", "benzoyl", SubstituentCategory::Aryl),
            ("CC(=O)C1CCCCC1", "cyclohexanecarbonyl", SubstituentCategory::Ring),
            ("CN1CCCCC1", "piperidin-1-yl", SubstituentCategory::Ring),
        ];
        for (smiles, name, category) in cases {
            let named = branch(smiles);
            assert_eq!(named.name, name, "{smiles}");
            assert_eq!(named.category, category, "{smiles}");
        }
    }

    #[test]
    fn test_heteroatom_branches() {
        let cases = [
            ("CO", "hydroxy"),
            ("COC", "methoxy"),
            ("COCC", "ethoxy"),
            ("COc1ccccc1", "phenoxy"),
            ("COC(C)C", "propan-2-yloxy"),
            ("COC(C)=O", "ethanoyloxy"),
            ("COCCOC", "2-methoxyethoxy"),
            ("CO[Si](C)(C)C", "(trimethylsilyl)oxy"),
            ("CON", "aminooxy"),
            ("CONC", "(methylamino)oxy"),
            ("CN", "amino"),
            ("CN(C)C", "dimethylamino"),
            ("CN(C)CC", "ethyl(methyl)amino"),
            ("C[NH3+]", "azaniumyl"),
            ("C[N+](C)(C)C", "trimethylazaniumyl"),
            ("C[Li]", "lithio"),
            ("CSC", "methylsulfanyl"),
            ("CS(=O)(=O)C", "methylsulfonyl"),
            ("CS(=O)C", "methylsulfinyl"),
            ("CS(=O)S(=O)(=O)C", "(methylsulfonyl)sulfinyl"),
            ("CCl", "chloro"),
            ("C[Si](C)(C)C", "trimethylsilyl"),
        ];
        for (smiles, name) in cases {
            assert_eq!(branch(smiles).name, name, "{smiles}");
        }
    }

    #[test]
    fn test_group_branches() {
        let cases = [
            ("CC(=O)O", "carboxy"),
            ("CC(=O)[O-]", "carboxylato"),
            ("CC#N", "cyano"),
            ("CC=O", "formyl"),
            ("CC(N)=O", "carbamoyl"),
            ("CC(=O)NC", "methylcarbamoyl"),
            ("CC(=O)OC", "methoxycarbonyl"),
            ("CC(=O)Cl", "chlorocarbonyl"),
            ("CS(=O)(=O)O", "sulfo"),
            ("C[N+](=O)[O-]", "nitro"),
            ("CN=C=O", "isocyanato"),
            ("COC#N", "cyanato"),
            ("CSC#N", "thiocyanato"),
            ("CN=C=S", "isothiocyanato"),
        ];
        for (smiles, name) in cases {
            let named = branch(smiles);
            assert_eq!(named.name, name, "{smiles}");
            assert_eq!(named.category, SubstituentCategory::Functional, "{smiles}");
        }
    }

    #[test]
    fn test_children_are_alphabetical() {
        let children = vec![
            Branch::simple(BTreeSet::new(), "methyl", SubstituentCategory::Alkyl),
            Branch::simple(BTreeSet::new(), "ethyl", SubstituentCategory::Alkyl),
            Branch::simple(BTreeSet::new(), "methyl", SubstituentCategory::Alkyl),
        ];
        assert_eq!(cite_children(&children), "ethyl(dimethyl)");
    }
}
