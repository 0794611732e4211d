use crate::{
    alpha_key, assemble_name, assign_locants, bond_locant, compound_multiplier, detect_functional_groups, enclose,
    generate_candidates, molecular_formula, multiplier, numeral_root, principal_kind, reachable,
    retained_benzene_stem, select_parent, Bond, CandidateQuery, Element, FunctionalGroup, GroupKind, Locant,
    Molecule, NameParts, NamedBranch, NamingError, NamingOptions, NumberingResult, ParentFeatures, RingAnalysis,
    RingBaseKind, RingMemo, RuleSettings, Scored, Stem, Substituent, SuffixStyle, SuffixText,
};
use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::*;

/// How a substituent is bonded to the structure it hangs from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Valence {
    Yl,
    Ylidene,
    Ylidyne,
    /// An acyl chain whose attachment carbon carries the =O ("ethanoyl").
    Oyl,
    /// A ring reached through an exocyclic C(=O) ("benzoyl", "pyridine-3-carbonyl").
    Carbonyl,
}

impl Valence {
    pub fn from_bond(bond: Bond) -> Self {
        match bond {
            Bond::Double => Valence::Ylidene,
            Bond::Triple => Valence::Ylidyne,
            _ => Valence::Yl,
        }
    }

    pub fn ending(&self) -> &'static str {
        match self {
            Valence::Yl => "yl",
            Valence::Ylidene => "ylidene",
            Valence::Ylidyne => "ylidyne",
            Valence::Oyl => "oyl",
            Valence::Carbonyl => "carbonyl",
        }
    }
}

/// Whether a region is named as the whole parent or as a substituent
/// attached through one atom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Parent,
    Substituent { attachment: usize, valence: Valence },
}

impl Mode {
    pub fn attachment(&self) -> Option<usize> {
        match self {
            Mode::Parent => None,
            Mode::Substituent { attachment, .. } => Some(*attachment),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentKind {
    Chain,
    Ring { aromatic: bool },
}

/// A named parent with the numbering and substituents behind its name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedParent {
    pub name: String,
    pub numbering: NumberingResult,
    pub substituents: Vec<Substituent>,
    pub parent: ParentKind,
    /// Anchors of the principal groups expressed by the suffix.
    pub carried: Vec<usize>,
    /// True when the name must be enclosed when cited as a prefix.
    pub compound: bool,
    pub parts: NameParts,
}

/// Per-molecule naming state shared by every recursive call.
pub struct Context<'a> {
    pub(crate) molecule: &'a Molecule,
    pub(crate) options: &'a NamingOptions,
    pub(crate) rings: Arc<RingAnalysis>,
    pub(crate) groups: Vec<FunctionalGroup>,
}

impl<'a> Context<'a> {
    pub fn new(molecule: &'a Molecule, options: &'a NamingOptions, memo: &mut RingMemo) -> Self {
        Self {
            molecule,
            options,
            rings: memo.analyze(molecule),
            groups: detect_functional_groups(molecule),
        }
    }

    fn with_groups(&self, groups: Vec<FunctionalGroup>) -> Self {
        Self {
            molecule: self.molecule,
            options: self.options,
            rings: self.rings.clone(),
            groups,
        }
    }

    pub fn groups(&self) -> &[FunctionalGroup] {
        &self.groups
    }

    pub(crate) fn group_containing(&self, atom: usize) -> Option<&FunctionalGroup> {
        self.groups.iter().find(|g| g.contains(atom))
    }

    /// Runs candidate generation and the selection rules over a region.
    /// Returns the winner with the principal groups it was scored against.
    pub(crate) fn choose_parent(
        &self,
        region: &BTreeSet<usize>,
        mode: Mode,
    ) -> Result<(Scored, Vec<FunctionalGroup>), NamingError> {
        let attachment = mode.attachment();
        let (principal, principal_groups) = match mode {
            Mode::Parent => {
                let in_region: Vec<&FunctionalGroup> = self
                    .groups
                    .iter()
                    .filter(|g| region.contains(&g.anchor) && g.atoms.iter().all(|a| region.contains(a)))
                    .collect();
                let kind = principal_kind(in_region.iter().copied());
                let groups: Vec<FunctionalGroup> = in_region
                    .into_iter()
                    .filter(|g| Some(g.kind) == kind)
                    .cloned()
                    .collect();
                (kind, groups)
            }
            Mode::Substituent { .. } => (None, Vec::new()),
        };
        let required: BTreeSet<usize> = match attachment {
            Some(atom) => [atom].into(),
            None => principal_groups.iter().map(|g| g.anchor).collect(),
        };

        let query = CandidateQuery {
            molecule: self.molecule,
            rings: &self.rings,
            groups: &self.groups,
            principal,
            region,
            required: &required,
            attachment,
            options: self.options,
        };
        let scored: Vec<Scored> = generate_candidates(&query)
            .into_iter()
            .map(|candidate| {
                let features = ParentFeatures::new(self.molecule, &candidate, &principal_groups, attachment, region);
                Scored::new(candidate, features, &self.groups, region)
            })
            .collect();
        let settings = RuleSettings {
            ring_chain: self.options.ring_chain_rule,
            has_principal: principal.is_some(),
        };
        let chosen = select_parent(scored, &settings)?;
        debug!(
            "parent {:?} ({} atoms) for {:?}",
            chosen.candidate.atoms,
            chosen.candidate.len(),
            mode
        );
        Ok((chosen, principal_groups))
    }

    /// Names `region`, whose surroundings are `visited`, either as the
    /// parent or as a substituent. Branches recurse back through here.
    pub(crate) fn name_region(
        &self,
        region: &BTreeSet<usize>,
        visited: &BTreeSet<usize>,
        mode: Mode,
        depth: usize,
    ) -> Result<NamedParent, NamingError> {
        if depth > self.options.max_substituent_depth {
            return Err(NamingError::DepthExceeded(self.options.max_substituent_depth));
        }
        let (chosen, principal_groups) = self.choose_parent(region, mode)?;

        let mut claimed = visited.clone();
        claimed.extend(chosen.candidate.atom_set.iter().copied());
        claimed.extend(chosen.features.consumed.iter().copied());

        let roots = chosen
            .features
            .nitrogen_branches
            .iter()
            .map(|root| (root, true))
            .chain(chosen.features.branches.iter().map(|root| (root, false)));
        let mut branches = Vec::new();
        for (root, on_nitrogen) in roots {
            if claimed.contains(&root.start) {
                continue;
            }
            let branch = self.name_branch(root.parent, root.start, claimed.clone(), depth);
            claimed.extend(branch.atoms.iter().copied());
            branches.push((root, on_nitrogen, branch));
        }

        let named: Vec<NamedBranch> = branches
            .iter()
            .filter(|(_, on_nitrogen, _)| !on_nitrogen)
            .map(|(root, _, branch)| NamedBranch {
                parent: root.parent,
                name: branch.name.clone(),
                size: branch.atoms.len(),
            })
            .collect();
        let numbering = assign_locants(&chosen.candidate, &chosen.features, &chosen.best, &named)
            .ok_or(NamingError::NoParentFound)?;

        let substituents = branches
            .into_iter()
            .map(|(root, on_nitrogen, branch)| {
                let (locant, label) = if on_nitrogen {
                    (Locant::Nitrogen, "N".to_string())
                } else {
                    (
                        Locant::Position(numbering.position(root.parent).unwrap_or_default()),
                        numbering.label(root.parent),
                    )
                };
                Substituent {
                    locant,
                    label,
                    attachment: root.parent,
                    atom: root.start,
                    category: branch.category,
                    size: branch.atoms.len(),
                    name: branch.name,
                    compound: branch.compound,
                }
            })
            .collect();

        Ok(self.compose(&chosen, numbering, substituents, &principal_groups, mode))
    }

    fn compose(
        &self,
        chosen: &Scored,
        numbering: NumberingResult,
        substituents: Vec<Substituent>,
        principal_groups: &[FunctionalGroup],
        mode: Mode,
    ) -> NamedParent {
        let candidate = &chosen.candidate;
        let features = &chosen.features;
        let base = candidate.ring_base();
        let size = candidate.len();
        let pos = |atom: usize| numbering.position(atom).unwrap_or(usize::MAX);

        let carried: Vec<&FunctionalGroup> = features.carried.iter().map(|&i| &principal_groups[i]).collect();
        let kind = carried.first().map(|g| g.kind);

        let mut unsaturation: Vec<(usize, Bond)> = features
            .unsaturation
            .iter()
            .map(|&(a, b, bond)| (bond_locant(pos(a), pos(b), size, candidate.is_monocycle()), bond))
            .collect();
        unsaturation.sort();
        let unsaturation: Vec<(String, Bond)> = unsaturation
            .into_iter()
            .map(|(locant, bond)| (numbering.label_at(locant), bond))
            .collect();

        let hetero_in_name = base.map_or(false, |b| b.hetero_in_name());
        let mut hetero: Vec<(usize, String, Element)> = if hetero_in_name {
            Vec::new()
        } else {
            features
                .hetero
                .iter()
                .map(|&(a, e)| (pos(a), numbering.label(a), e))
                .collect()
        };
        hetero.sort();
        let hetero: Vec<(String, Element)> = hetero.into_iter().map(|(_, l, e)| (l, e)).collect();

        let mut principal_positions: Vec<usize> = features.principal.iter().map(|&a| pos(a)).collect();
        principal_positions.sort_unstable();
        let principal_labels: Vec<String> = principal_positions.iter().map(|&p| numbering.label_at(p)).collect();

        let positional = substituents
            .iter()
            .filter(|s| matches!(s.locant, Locant::Position(_)))
            .count();
        let cited = features.principal.len() + positional;

        let (mut show_prefix, mut show_hetero, mut show_unsat, mut show_principal) = (true, true, true, true);
        if self.options.omit_unambiguous_locants {
            if size == 1 {
                (show_prefix, show_hetero, show_unsat, show_principal) = (false, false, false, false);
            }
            if candidate.is_chain() && size == 2 {
                show_unsat = false;
                if cited + hetero.len() == 1 {
                    (show_prefix, show_hetero, show_principal) = (false, false, false);
                }
            }
            if candidate.is_monocycle() && candidate.heteroatoms == 0 && cited + unsaturation.len() == 1 {
                (show_prefix, show_hetero, show_unsat, show_principal) = (false, false, false, false);
            }
            if candidate.is_monocycle() && hetero.len() == 1 && cited + unsaturation.len() == 0 {
                show_hetero = false;
            }
        }

        let systematic = |root: String| Stem::Systematic {
            root,
            unsaturation: unsaturation.clone(),
            show_locants: show_unsat,
        };
        let parent_stem = match base {
            None => systematic(numeral_root(size)),
            Some(b) if b.is_retained() => Stem::Retained(b.name.clone()),
            Some(b) => systematic(b.name.clone()),
        };
        let ending = |text: &str, labels: Vec<String>, show: bool| SuffixText {
            stem: text.to_string(),
            count: 1,
            labels,
            show_locants: show,
        };

        let (stem, suffix, trailing_word) = match mode {
            Mode::Parent => match kind {
                None => (parent_stem, None, None),
                Some(kind) => {
                    let retained = base
                        .filter(|b| b.is_benzene() && carried.len() == 1)
                        .and_then(|_| retained_benzene_stem(kind));
                    let style = if candidate.is_ring() { SuffixStyle::Ring } else { SuffixStyle::Chain };
                    let word = |suffix_word: Option<&str>| -> Option<String> {
                        if kind == GroupKind::AcidHalide {
                            halide_words(self.molecule, &carried)
                        } else {
                            suffix_word.map(str::to_string)
                        }
                    };
                    match (retained, kind.suffix(style)) {
                        (Some(name), suffix) => {
                            (Stem::Retained(name.to_string()), None, word(suffix.and_then(|s| s.word)))
                        }
                        (None, Some(suffix)) => {
                            let text = SuffixText {
                                stem: suffix.stem.to_string(),
                                count: carried.len(),
                                labels: principal_labels,
                                show_locants: show_principal && !(candidate.is_chain() && suffix.terminal),
                            };
                            (parent_stem, Some(text), word(suffix.word))
                        }
                        (None, None) => (parent_stem, None, None),
                    }
                }
            },
            Mode::Substituent { attachment, valence } => {
                let at_one = numbering.position(attachment) == Some(1);
                let label = vec![numbering.label(attachment)];
                let saturated = unsaturation.is_empty();
                match (base, valence) {
                    (None, Valence::Oyl | Valence::Carbonyl) => {
                        (parent_stem, Some(ending("oyl", Vec::new(), false)), None)
                    }
                    (None, _) if saturated && at_one => (
                        Stem::Root(numeral_root(size)),
                        Some(ending(valence.ending(), Vec::new(), false)),
                        None,
                    ),
                    (None, _) => (parent_stem, Some(ending(valence.ending(), label, show_principal)), None),
                    (Some(b), Valence::Oyl | Valence::Carbonyl) if b.is_benzene() => {
                        (Stem::Retained("benzoyl".to_string()), None, None)
                    }
                    (Some(b), Valence::Oyl | Valence::Carbonyl) => {
                        let stem = match b.kind {
                            RingBaseKind::Retained => Stem::Retained(b.name.clone()),
                            _ => parent_stem,
                        };
                        (stem, Some(ending("carbonyl", label, show_principal)), None)
                    }
                    (Some(b), Valence::Yl) if b.is_benzene() => (Stem::Retained("phenyl".to_string()), None, None),
                    (Some(b), _)
                        if b.kind == RingBaseKind::Cyclo && candidate.heteroatoms == 0 && saturated && at_one =>
                    {
                        (
                            Stem::Root(b.name.clone()),
                            Some(ending(valence.ending(), Vec::new(), false)),
                            None,
                        )
                    }
                    (Some(_), _) => (parent_stem, Some(ending(valence.ending(), label, show_principal)), None),
                }
            }
        };

        let parts = NameParts {
            leading_words: Vec::new(),
            prefixes: substituents.clone(),
            show_prefix_locants: show_prefix,
            hetero,
            show_hetero_locants: show_hetero,
            stem,
            suffix,
            trailing_word,
        };
        let name = assemble_name(&parts);
        trace!("composed {name}");
        NamedParent {
            compound: !substituents.is_empty() || name.contains(|c: char| c.is_ascii_digit()),
            name,
            numbering,
            substituents,
            parent: match base {
                None => ParentKind::Chain,
                Some(_) => ParentKind::Ring {
                    aromatic: candidate.aromatic,
                },
            },
            carried: carried.iter().map(|g| g.anchor).collect(),
            parts,
        }
    }

    /// Names one connected component.
    pub fn name_component(&self, component: &BTreeSet<usize>) -> Result<NamedParent, NamingError> {
        let in_component = self.groups.iter().filter(|g| component.contains(&g.anchor));
        match principal_kind(in_component) {
            Some(GroupKind::Anhydride) => self.name_anhydride(component),
            Some(GroupKind::Ester) => self.name_esters(component),
            _ => self.name_region(component, &BTreeSet::new(), Mode::Parent, 0),
        }
    }

    /// Esters are named "alkyl alkanoate": the alkyl sides are cut off,
    /// the acid side is named as the parent, and the alkyl names lead.
    fn name_esters(&self, component: &BTreeSet<usize>) -> Result<NamedParent, NamingError> {
        struct Side {
            anchor: usize,
            bridge: usize,
            partner: usize,
            atoms: BTreeSet<usize>,
        }

        let mut sides = Vec::new();
        let mut excluded = BTreeSet::new();
        for group in self
            .groups
            .iter()
            .filter(|g| g.kind == GroupKind::Ester && component.contains(&g.anchor))
        {
            let (Some(partner), Some(bridge)) = (group.partner, group.bridge) else {
                continue;
            };
            if excluded.contains(&group.anchor) || excluded.contains(&partner) {
                continue;
            }
            let atoms = reachable(self.molecule, partner, |a| {
                a != bridge && component.contains(&a) && !excluded.contains(&a)
            });
            if atoms.contains(&group.anchor) {
                continue;
            }
            excluded.extend(atoms.iter().copied());
            sides.push(Side {
                anchor: group.anchor,
                bridge,
                partner,
                atoms,
            });
        }

        let region = |excluded: &BTreeSet<usize>| -> BTreeSet<usize> { component.difference(excluded).copied().collect() };
        let mut named = self.name_region(&region(&excluded), &excluded, Mode::Parent, 0)?;
        if sides.iter().any(|s| !named.carried.contains(&s.anchor)) {
            // Esters the parent does not carry keep their alkyl side as an alkoxycarbonyl prefix.
            for side in sides.iter().filter(|s| !named.carried.contains(&s.anchor)) {
                for atom in &side.atoms {
                    excluded.remove(atom);
                }
            }
            sides.retain(|s| named.carried.contains(&s.anchor));
            named = self.name_region(&region(&excluded), &excluded, Mode::Parent, 0)?;
            sides.retain(|s| named.carried.contains(&s.anchor));
        }

        let mut words: BTreeMap<(String, String), (bool, usize)> = BTreeMap::new();
        for side in &sides {
            let visited: BTreeSet<usize> = component.difference(&side.atoms).copied().collect();
            let branch = self.name_branch(side.bridge, side.partner, visited, 0);
            words
                .entry((alpha_key(&branch.name), branch.name))
                .or_insert((branch.compound, 0))
                .1 += 1;
        }
        named.parts.leading_words = words
            .into_iter()
            .map(|((_, name), (compound, count))| match (compound, count) {
                (true, n) if n > 1 => format!("{}{}", compound_multiplier(n), enclose(&name)),
                (_, n) => format!("{}{}", multiplier(n), name),
            })
            .collect();
        named.name = assemble_name(&named.parts);
        Ok(named)
    }

    /// Anhydrides are named from the acids on either side of the bridging
    /// oxygen: "ethanoic anhydride", "ethanoic propanoic anhydride".
    fn name_anhydride(&self, component: &BTreeSet<usize>) -> Result<NamedParent, NamingError> {
        let molecule = self.molecule;
        let group = self
            .groups
            .iter()
            .find(|g| g.kind == GroupKind::Anhydride && component.contains(&g.anchor))
            .ok_or(NamingError::NoParentFound)?;
        let (Some(partner), Some(bridge)) = (group.partner, group.bridge) else {
            return Err(NamingError::NoParentFound);
        };

        let mut acids = Vec::new();
        for carbon in [group.anchor, partner] {
            let oxo = group
                .atoms
                .iter()
                .copied()
                .find(|&a| a != bridge && molecule.bond(carbon, a) == Some(Bond::Double))
                .ok_or(NamingError::NoParentFound)?;
            let mut region = reachable(molecule, carbon, |a| a != bridge && component.contains(&a));
            region.insert(bridge);
            let visited: BTreeSet<usize> = component.difference(&region).copied().collect();

            let acid = FunctionalGroup::new(
                molecule,
                GroupKind::CarboxylicAcid,
                [carbon, oxo, bridge].into(),
                carbon,
            );
            let mut groups: Vec<FunctionalGroup> = self
                .groups
                .iter()
                .filter(|g| g.anchor != group.anchor || g.kind != GroupKind::Anhydride)
                .cloned()
                .collect();
            groups.push(acid);
            acids.push(self.with_groups(groups).name_region(&region, &visited, Mode::Parent, 0)?);
        }

        let mut stems: Vec<String> = acids
            .iter()
            .map(|a| a.name.strip_suffix(" acid").unwrap_or(&a.name).to_string())
            .collect();
        stems.sort_by_key(|s| alpha_key(s));
        stems.dedup();

        let mut acids = acids.into_iter();
        let mut named = acids.next().ok_or(NamingError::NoParentFound)?;
        for other in acids {
            named.substituents.extend(other.substituents);
        }
        named.name = format!("{} anhydride", stems.join(" "));
        named.compound = true;
        Ok(named)
    }
}

fn halide_words(molecule: &Molecule, carried: &[&FunctionalGroup]) -> Option<String> {
    let mut counts: BTreeMap<&'static str, usize> = BTreeMap::new();
    for halide in carried.iter().filter_map(|g| g.halogen).filter_map(|e| e.halide_name()) {
        *counts.entry(halide).or_default() += 1;
    }
    if counts.is_empty() {
        warn!("acid halide without a halogen in {} groups", carried.len());
        let atoms: BTreeSet<usize> = carried.iter().flat_map(|g| g.atoms.iter().copied()).collect();
        return Some(molecular_formula(molecule, &atoms));
    }
    Some(
        counts
            .into_iter()
            .map(|(name, count)| format!("{}{}", multiplier(count), name))
            .collect::<Vec<_>>()
            .join(" "),
    )
}

fn largest_component(molecule: &Molecule) -> Option<BTreeSet<usize>> {
    molecule
        .components()
        .into_iter()
        .min_by_key(|c| (Reverse(c.len()), c.first().copied()))
}

/// Selects and names the parent of the molecule's largest component.
pub fn select_and_name_parent(molecule: &Molecule) -> Result<NamedParent, NamingError> {
    select_and_name_parent_with(molecule, &NamingOptions::default(), &mut RingMemo::new())
}

pub fn select_and_name_parent_with(
    molecule: &Molecule,
    options: &NamingOptions,
    memo: &mut RingMemo,
) -> Result<NamedParent, NamingError> {
    let component = largest_component(molecule).ok_or(NamingError::EmptyInput)?;
    let context = Context::new(molecule, options, memo);
    let named = context.name_component(&component)?;
    info!("named {} atoms as {}", component.len(), named.name);
    Ok(named)
}

/// Names a lone ion the way a salt cites it ("sodium", "chloride", "azanium").
fn ion_name(molecule: &Molecule, component: &BTreeSet<usize>) -> Option<String> {
    if component.len() != 1 {
        return None;
    }
    let atom = molecule.atom(*component.first()?);
    match (atom.element, atom.charge) {
        (element, charge) if charge > 0 && element.is_metal() => Some(element.name().to_string()),
        (element, -1) if element.is_halogen() => element.halide_name().map(str::to_string),
        (Element::N, 1) if atom.hydrogens == 4 => Some("azanium".to_string()),
        (Element::O, -1) if atom.hydrogens == 1 => Some("hydroxide".to_string()),
        _ => None,
    }
}

/// Names every component, joined by spaces in input order. A lone ion is
/// cited by its ion name, and a component without any parent candidate is
/// written as its formula.
pub fn name_molecule(molecule: &Molecule, options: &NamingOptions, memo: &mut RingMemo) -> Result<String, NamingError> {
    if molecule.is_empty() {
        return Err(NamingError::EmptyInput);
    }
    let context = Context::new(molecule, options, memo);
    let mut names = Vec::new();
    for component in molecule.components() {
        if let Some(ion) = ion_name(molecule, &component) {
            names.push(ion);
            continue;
        }
        match context.name_component(&component) {
            Ok(named) => names.push(named.name),
            Err(NamingError::NoParentFound) => {
                debug!("no parent in component {:?}, using its formula", component);
                names.push(molecular_formula(molecule, &component));
            }
            Err(err) => return Err(err),
        }
    }
    Ok(names.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{parse_smiles, RingChainRule};

    fn name(smiles: &str) -> String {
        let molecule = parse_smiles(smiles).unwrap();
        name_molecule(&molecule, &NamingOptions::default(), &mut RingMemo::new()).unwrap()
    }

    fn check(cases: &[(&str, &str)]) {
        for (smiles, expected) in cases {
            assert_eq!(name(smiles), *expected, "{smiles}");
        }
    }

    #[test]
    fn test_alkanes() {
        let expected = [
            "methane", "ethane", "propane", "butane", "pentane", "hexane", "heptane", "octane", "nonane", "decane",
            "undecane", "dodecane", "tridecane", "tetradecane", "pentadecane", "hexadecane", "heptadecane",
            "octadecane", "nonadecane", "icosane",
        ];
        for (i, expected) in expected.iter().enumerate() {
            let smiles = "C".repeat(i + 1);
            assert_eq!(name(&smiles), *expected, "{smiles}");
        }
    }

    #[test]
    fn test_branched_alkanes() {
        check(&[
            ("CC(C)C", "2-methylpropane"),
            ("CC(C)CC", "2-methylbutane"),
            ("CC(C)(C)C", "2,2-dimethylpropane"),
            ("CC(C)C(C)C", "2,3-dimethylbutane"),
            ("CCC(CC)CC(C)CC", "3-ethyl-5-methylheptane"),
            ("CCC(CC)CC(C)C", "4-ethyl-2-methylhexane"),
            ("CCC(C)C(C)(C)C", "2,2,3-trimethylpentane"),
            ("CCCC(C(C)C)CCC", "4-(propan-2-yl)heptane"),
        ]);
    }

    #[test]
    fn test_unsaturated_chains() {
        check(&[
            ("C=C", "ethene"),
            ("C#C", "ethyne"),
            ("C=CC", "prop-1-ene"),
            ("CC=CC", "but-2-ene"),
            ("C=CC=C", "buta-1,3-diene"),
            ("C=CC#C", "but-1-en-3-yne"),
            ("ClC=C", "chloroethene"),
        ]);
    }

    #[test]
    fn test_principal_groups_on_chains() {
        check(&[
            ("CCO", "ethanol"),
            ("CC(=O)O", "ethanoic acid"),
            ("OCC(=O)O", "2-hydroxyethanoic acid"),
            ("CC(C)(C)O", "2-methylpropan-2-ol"),
            ("CCCO", "propan-1-ol"),
            ("OCCO", "ethane-1,2-diol"),
            ("CC(=O)C", "propan-2-one"),
            ("CC=O", "ethanal"),
            ("CC#N", "ethanenitrile"),
            ("CC(N)=O", "ethanamide"),
            ("CC(=O)Cl", "ethanoyl chloride"),
            ("CS", "methanethiol"),
            ("OC(=O)CC(=O)O", "propanedioic acid"),
            ("CC(=O)CC(=O)O", "3-oxobutanoic acid"),
            ("NCC(=O)O", "2-aminoethanoic acid"),
            ("C=CCO", "prop-2-en-1-ol"),
        ]);
    }

    #[test]
    fn test_ethers_and_halides() {
        check(&[
            ("COC", "methoxymethane"),
            ("CCOC", "methoxyethane"),
            ("CCOCC", "ethoxyethane"),
            ("CC(O)COC", "1-methoxypropan-2-ol"),
            ("COC(C)CC", "2-methoxybutane"),
            ("ClCCl", "dichloromethane"),
            ("ClC(Cl)(Cl)Cl", "tetrachloromethane"),
            ("CCBr", "bromoethane"),
            ("CCN", "aminoethane"),
            ("CN(C)C", "(dimethylamino)methane"),
        ]);
    }

    #[test]
    fn test_sulfur_and_oxygen_bridges() {
        check(&[
            ("CCCS(=O)S(=O)(=O)CC", "1-[(ethylsulfonyl)sulfinyl]propane"),
            ("CCCSCC", "1-(ethylsulfanyl)propane"),
            ("COCCOCCC", "1-(2-methoxyethoxy)propane"),
        ]);
    }

    #[test]
    fn test_esters_and_anhydrides() {
        check(&[
            ("CC(=O)OC", "methyl ethanoate"),
            ("CCC(=O)OCC", "ethyl propanoate"),
            ("CCOC(=O)C(=O)OCC", "diethyl ethanedioate"),
            ("CC(=O)OC(=O)C", "ethanoic anhydride"),
            ("CC(=O)OC(=O)CC", "ethanoic propanoic anhydride"),
            ("CC(=O)OC1=CC=CC=C1", "phenyl ethanoate"),
        ]);
    }

    #[test]
    fn test_amide_nitrogen_substituents() {
        check(&[("CC(=O)NC", "N-methylethanamide"), ("CC(=O)N(C)C", "N,N-dimethylethanamide")]);
    }

    #[test]
    fn test_rings() {
        check(&[
            ("C1CCCCC1", "cyclohexane"),
            ("CC1CCCCC1", "methylcyclohexane"),
            ("CC1CCCC(C)C1", "1,3-dimethylcyclohexane"),
            ("C1=CCCCC1", "cyclohexene"),
            ("OC1CCCCC1", "cyclohexanol"),
            ("O=C1CCCCC1", "cyclohexanone"),
            ("c1ccccc1", "benzene"),
            ("Cc1ccccc1", "methylbenzene"),
            ("Oc1ccccc1", "phenol"),
            ("OC(=O)c1ccccc1", "benzoic acid"),
            ("Clc1ccc(cc1)C(=O)O", "4-chlorobenzoic acid"),
            ("c1ccncc1", "pyridine"),
            ("Cc1ccncc1", "4-methylpyridine"),
            ("c1ccc2ccccc2c1", "naphthalene"),
            ("C1CCOC1", "oxolane"),
            ("C1CCCOCC1", "oxacycloheptane"),
            ("C1CCCSCC1", "thiacycloheptane"),
            ("CC1CCCOCC1", "4-methyl-1-oxacycloheptane"),
            ("O=C1CCCO1", "oxolan-2-one"),
            ("C1CC2CCC1C2", "bicyclo[2.2.1]heptane"),
            ("C1CCC2(CC1)CCC2", "spiro[3.5]nonane"),
            ("OC(=O)C1CCCCC1", "cyclohexanecarboxylic acid"),
        ]);
    }

    #[test]
    fn test_polycyclic_parents() {
        check(&[
            ("C1C2CC3CC1CC(C2)C3", "tricyclo[3.3.1.1^{3,7}]decane"),
            ("CC12CC3CC(CC(C3)C1)C2", "1-methyltricyclo[3.3.1.1^{3,7}]decane"),
            ("C12C3C4C1C5C2C3C45", "pentacyclo[4.2.0.0^{2,5}.0^{3,8}.0^{4,7}]octane"),
            ("C1CCC2C(C1)CCC1C2CCC2CCCC12", "tetracyclo[8.7.0.0^{2,7}.0^{11,15}]heptadecane"),
        ]);
        let anthracene = name("c1ccc2cc3ccccc3cc2c1");
        assert!(anthracene.starts_with("tricyclo[8.4.0.0^{3,8}]tetradeca-"), "{anthracene}");
        assert!(anthracene.ends_with("-heptaene"), "{anthracene}");
        for smiles in ["c1ccc2cc3ccccc3cc2c1", "C1C2CC3CC1CC(C2)C3", "C1CCC2C(C1)CCC1C2CCC2CCCC12"] {
            let named = name(smiles);
            for chain_word in ["butyl", "propyl", "ethyl", "benzene"] {
                assert!(!named.contains(chain_word), "{smiles}: {named}");
            }
        }
    }

    #[test]
    fn test_ring_and_chain_substituents() {
        check(&[
            ("CCCCCCCC1CCCCC1", "1-cyclohexylheptane"),
            ("OCCC1CCCCC1", "(2-hydroxyethyl)cyclohexane"),
            ("c1ccccc1CCO", "(2-hydroxyethyl)benzene"),
            ("CC(=O)c1ccccc1", "ethanoylbenzene"),
            ("C=CC1CCCCC1", "ethenylcyclohexane"),
            ("CC(=O)CC(=O)c1ccccc1", "(3-oxobutanoyl)benzene"),
            ("OC1CCCCC1CCCCCCC", "2-heptylcyclohexan-1-ol"),
            ("c1ccccc1Cc1ccccc1", "(phenylmethyl)benzene"),
        ]);
    }

    #[test]
    fn test_ring_chain_rule_option() {
        let molecule = parse_smiles("OCCC1CCCCC1").unwrap();
        let cases = [
            (RingChainRule::FunctionalGroupAware, "(2-hydroxyethyl)cyclohexane"),
            (RingChainRule::PrincipalGroupsFirst, "2-cyclohexylethan-1-ol"),
            (RingChainRule::AtomCount, "(2-hydroxyethyl)cyclohexane"),
        ];
        for (rule, expected) in cases {
            let options = NamingOptions::default().with_ring_chain_rule(rule);
            let named = name_molecule(&molecule, &options, &mut RingMemo::new()).unwrap();
            assert_eq!(named, expected, "{rule:?}");
        }
    }

    #[test]
    fn test_keep_locants_option() {
        let molecule = parse_smiles("CCO").unwrap();
        let options = NamingOptions::default().with_omit_unambiguous_locants(false);
        assert_eq!(name_molecule(&molecule, &options, &mut RingMemo::new()).unwrap(), "ethan-1-ol");
    }

    #[test]
    fn test_parent_and_numbering() {
        let molecule = parse_smiles("CC1CCCCC1").unwrap();
        let named = select_and_name_parent(&molecule).unwrap();
        assert_eq!(named.name, "methylcyclohexane");
        assert_eq!(named.substituents.len(), 1);
        assert_eq!(named.substituents[0].locant, Locant::Position(1));
        assert_eq!(named.substituents[0].name, "methyl");
        assert_eq!(named.parent, ParentKind::Ring { aromatic: false });
    }

    #[test]
    fn test_lowest_locants_are_chosen() {
        let cases = ["CCC(C)CC(C)(C)C", "CC(O)CC(C)C", "CC=CC(C)C", "OCC(Cl)C(C)CC", "Cc1cc(Cl)ccc1"];
        for smiles in cases {
            let molecule = parse_smiles(smiles).unwrap();
            let options = NamingOptions::default();
            let mut memo = RingMemo::new();
            let context = Context::new(&molecule, &options, &mut memo);
            let region: BTreeSet<usize> = (0..molecule.atom_count()).collect();
            let (chosen, _) = context.choose_parent(&region, Mode::Parent).unwrap();
            for traversal in chosen.candidate.traversals() {
                assert!(
                    chosen.priority <= chosen.features.priority(&chosen.candidate, &traversal),
                    "{smiles}: {:?}",
                    traversal.order
                );
            }
            let named = context.name_component(&region).unwrap();
            assert_eq!(named.numbering.priority, chosen.priority, "{smiles}");
        }
    }

    #[test]
    fn test_deterministic() {
        for smiles in ["CCC(CC)CC(C)CC", "Clc1ccc(cc1)C(=O)O", "CC(C)(C)O", "C1CC2CCC1C2"] {
            let first = name(smiles);
            for _ in 0..5 {
                assert_eq!(name(smiles), first, "{smiles}");
            }
        }
    }

    #[test]
    fn test_nested_substituents_terminate() {
        check(&[
            ("CC(C)c1ccc2ccccc2c1", "2-(propan-2-yl)naphthalene"),
            ("CCCCC(CC)C1CCC2(CC1)CCC2", "7-(heptan-3-yl)spiro[3.5]nonane"),
        ]);
        let molecule = parse_smiles("CCCC(C(C)C)CCC").unwrap();
        let options = NamingOptions::default().with_max_substituent_depth(0);
        let named = name_molecule(&molecule, &options, &mut RingMemo::new()).unwrap();
        assert_eq!(named, "4-(C3H7yl)heptane");
    }

    #[test]
    fn test_depth_limit_on_parent() {
        let molecule = parse_smiles("CCC").unwrap();
        let options = NamingOptions::default().with_max_substituent_depth(0);
        let named = select_and_name_parent_with(&molecule, &options, &mut RingMemo::new()).unwrap();
        assert_eq!(named.name, "propane");
    }

    #[test]
    fn test_components_and_empty_input() {
        assert_eq!(name("CCO.O"), "ethanol H2O");
        let empty = Molecule::new();
        assert_eq!(select_and_name_parent(&empty), Err(NamingError::EmptyInput));
        assert_eq!(
            name_molecule(&empty, &NamingOptions::default(), &mut RingMemo::new()),
            Err(NamingError::EmptyInput)
        );
        let water = parse_smiles("O").unwrap();
        assert_eq!(select_and_name_parent(&water), Err(NamingError::NoParentFound));
    }

    #[test]
    fn test_salts_and_charged_groups() {
        check(&[
            ("CC(=O)[O-]", "ethanoate"),
            ("CC(=O)[O-].[Na+]", "ethanoate sodium"),
            ("CC(=O)[O-].[NH4+]", "ethanoate azanium"),
            ("[Na+].[O-]C(=O)CCC", "sodium butanoate"),
            ("[K+].[O-]C(=O)c1ccccc1", "potassium benzoate"),
            ("[Li+].[O-]C(=O)C1CCCCC1", "lithium cyclohexanecarboxylate"),
            ("OCC(=O)[O-]", "2-hydroxyethanoate"),
            ("[Na+].[Cl-]", "sodium chloride"),
            ("[Ca+2].[Cl-].[Cl-]", "calcium chloride chloride"),
            ("[NH4+].[Cl-]", "azanium chloride"),
            ("[Na+].[OH-]", "sodium hydroxide"),
            ("C[NH3+]", "azaniumylmethane"),
            ("CC[N+](C)(C)C.[Br-]", "(trimethylazaniumyl)ethane bromide"),
        ]);
        assert_eq!(name("CC(=O)O.O"), "ethanoic acid H2O");
    }

    #[test]
    fn test_ring_memo_is_reused() {
        let molecule = parse_smiles("CC1CCCCC1").unwrap();
        let options = NamingOptions::default();
        let mut memo = RingMemo::new();
        let first = select_and_name_parent_with(&molecule, &options, &mut memo).unwrap();
        let second = select_and_name_parent_with(&molecule, &options, &mut memo).unwrap();
        assert_eq!(first, second);
        assert_eq!((memo.hits(), memo.misses()), (1, 1));
    }
}
