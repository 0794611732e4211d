use crate::{Candidate, FunctionalGroup, NamingError, ParentFeatures, PriorityLocants, RingChainRule, Traversal};
use std::collections::BTreeSet;
use tracing::*;

/// A candidate with its features and its best numberings, ready for the
/// selection rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scored {
    pub candidate: Candidate,
    pub features: ParentFeatures,
    pub priority: PriorityLocants,
    /// Every traversal reaching `priority`.
    pub best: Vec<Traversal>,
    /// Groups whose anchor, atoms or attachments touch the candidate.
    pub direct_groups: usize,
}

impl Scored {
    pub fn new(
        candidate: Candidate,
        features: ParentFeatures,
        groups: &[FunctionalGroup],
        region: &BTreeSet<usize>,
    ) -> Self {
        let scored: Vec<(PriorityLocants, Traversal)> = candidate
            .traversals()
            .into_iter()
            .map(|t| (features.priority(&candidate, &t), t))
            .collect();
        let priority = scored.iter().map(|(p, _)| p).min().cloned().unwrap_or_default();
        let best = scored
            .into_iter()
            .filter(|(p, _)| *p == priority)
            .map(|(_, t)| t)
            .collect();
        let direct_groups = groups
            .iter()
            .filter(|g| region.contains(&g.anchor))
            .filter(|g| {
                candidate.contains(g.anchor)
                    || g.atoms.iter().any(|&a| candidate.contains(a))
                    || g.attachments.iter().any(|&a| candidate.contains(a))
            })
            .count();
        Self {
            candidate,
            features,
            priority,
            best,
            direct_groups,
        }
    }

    pub fn carried(&self) -> usize {
        self.features.carried.len()
    }

    fn size_key(&self) -> (usize, usize) {
        (self.carried(), self.candidate.len())
    }

    fn substituent_sum(&self) -> usize {
        self.priority.0.last().map_or(0, |c| c.iter().sum())
    }

    fn lowest_order(&self) -> Vec<usize> {
        self.best.iter().map(|t| t.order.clone()).min().unwrap_or_default()
    }
}

/// Settings the rules read besides the candidates themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleSettings {
    pub ring_chain: RingChainRule,
    pub has_principal: bool,
}

/// Parent selection rules, applied in declaration order. Each rule keeps
/// the candidates that tie for best under it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    RingVsChain,
    FunctionalGroups,
    DirectAttachment,
    PriorityLocants,
    Heuristics,
}

fn keep_best<K: Ord>(candidates: Vec<Scored>, key: impl Fn(&Scored) -> K) -> Vec<Scored> {
    let Some(best) = candidates.iter().map(&key).min() else {
        return candidates;
    };
    candidates.into_iter().filter(|c| key(c) == best).collect()
}

impl Rule {
    pub const PIPELINE: [Rule; 5] = [
        Rule::RingVsChain,
        Rule::FunctionalGroups,
        Rule::DirectAttachment,
        Rule::PriorityLocants,
        Rule::Heuristics,
    ];

    pub fn apply(self, candidates: Vec<Scored>, settings: &RuleSettings) -> Vec<Scored> {
        match self {
            Rule::RingVsChain => ring_vs_chain(candidates, settings.ring_chain),
            Rule::FunctionalGroups if settings.has_principal => {
                keep_best(candidates, |c| std::cmp::Reverse(c.carried()))
            }
            Rule::FunctionalGroups => {
                if candidates.iter().any(|c| c.candidate.heteroatoms == 0) {
                    candidates.into_iter().filter(|c| c.candidate.heteroatoms == 0).collect()
                } else {
                    candidates
                }
            }
            Rule::DirectAttachment => keep_best(candidates, |c| std::cmp::Reverse(c.direct_groups)),
            Rule::PriorityLocants => keep_best(candidates, |c| c.priority.clone()),
            Rule::Heuristics => {
                let candidates = keep_best(candidates, |c| std::cmp::Reverse(c.candidate.heteroatoms));
                let candidates = keep_best(candidates, |c| c.features.branches.len());
                let candidates = keep_best(candidates, Scored::substituent_sum);
                let mut candidates = keep_best(candidates, Scored::lowest_order);
                if candidates.len() > 1 {
                    warn!("{}", NamingError::UnresolvedTie(candidates.len()));
                    candidates.truncate(1);
                }
                candidates
            }
        }
    }
}

fn ring_vs_chain(candidates: Vec<Scored>, rule: RingChainRule) -> Vec<Scored> {
    let best_ring = candidates
        .iter()
        .filter(|c| c.candidate.is_ring())
        .map(Scored::size_key)
        .max();
    let best_chain = candidates
        .iter()
        .filter(|c| c.candidate.is_chain())
        .map(Scored::size_key)
        .max();
    let longest = |ring: bool| {
        candidates
            .iter()
            .filter(|c| c.candidate.is_ring() == ring)
            .map(|c| c.candidate.len())
            .max()
    };
    let rings_win = match (best_ring, best_chain) {
        (None, _) => return candidates,
        (Some(_), None) => true,
        (Some(ring), Some(chain)) => match rule {
            RingChainRule::AtomCount => longest(true) >= longest(false),
            RingChainRule::FunctionalGroupAware => longest(true) >= longest(false) || ring.0 > chain.0,
            RingChainRule::PrincipalGroupsFirst => match ring.0.cmp(&chain.0) {
                std::cmp::Ordering::Equal => ring.1 >= chain.1,
                order => order.is_gt(),
            },
        },
    };
    debug!("ring against chain: {}", if rings_win { "ring" } else { "chain" });
    if rings_win {
        let rings: Vec<Scored> = candidates.into_iter().filter(|c| c.candidate.is_ring()).collect();
        keep_best(rings, |c| std::cmp::Reverse(c.size_key()))
    } else {
        candidates.into_iter().filter(|c| c.candidate.is_chain()).collect()
    }
}

/// Runs the rule pipeline and returns the single surviving candidate.
pub fn select_parent(candidates: Vec<Scored>, settings: &RuleSettings) -> Result<Scored, NamingError> {
    let mut remaining = candidates;
    for rule in Rule::PIPELINE {
        if remaining.len() <= 1 {
            break;
        }
        remaining = rule.apply(remaining, settings);
        debug!("{rule:?}: {} candidates remain", remaining.len());
    }
    remaining.into_iter().next().ok_or(NamingError::NoParentFound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{detect_functional_groups, generate_candidates, parse_smiles, principal_kind, CandidateQuery};
    use crate::{NamingOptions, RingAnalysis};

    fn select(smiles: &str, rule: RingChainRule) -> Scored {
        let molecule = parse_smiles(smiles).unwrap();
        let rings = RingAnalysis::new(&molecule);
        let groups = detect_functional_groups(&molecule);
        let principal = principal_kind(&groups);
        let principal_groups: Vec<FunctionalGroup> =
            groups.iter().filter(|g| Some(g.kind) == principal).cloned().collect();
        let region: BTreeSet<usize> = (0..molecule.atom_count()).collect();
        let required: BTreeSet<usize> = principal_groups.iter().map(|g| g.anchor).collect();
        let options = NamingOptions::default().with_ring_chain_rule(rule);
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
        let scored = generate_candidates(&query)
            .into_iter()
            .map(|c| {
                let features = ParentFeatures::new(&molecule, &c, &principal_groups, None, &region);
                Scored::new(c, features, &groups, &region)
            })
            .collect();
        let settings = RuleSettings {
            ring_chain: rule,
            has_principal: principal.is_some(),
        };
        select_parent(scored, &settings).unwrap()
    }

    #[test]
    fn test_ring_beats_shorter_chain() {
        let chosen = select("CCC1CCCCC1", RingChainRule::FunctionalGroupAware);
        assert!(chosen.candidate.is_ring());
        let chosen = select("CCCCCCCCC1CCC1", RingChainRule::AtomCount);
        assert!(chosen.candidate.is_chain());
    }

    #[test]
    fn test_ring_against_chain_rules() {
        // The hydroxyl sits on a two-atom chain next to a six-membered ring.
        let cases = [
            ("OCCC1CCCCC1", RingChainRule::FunctionalGroupAware, true),
            ("OCCC1CCCCC1", RingChainRule::PrincipalGroupsFirst, false),
            ("OCCC1CCCCC1", RingChainRule::AtomCount, true),
            ("OCCc1ccccc1", RingChainRule::FunctionalGroupAware, true),
            // A longer chain loses to a ring that carries the hydroxyl.
            ("OC1CCCCC1CCCCCCC", RingChainRule::FunctionalGroupAware, true),
            ("OC1CCCCC1CCCCCCC", RingChainRule::PrincipalGroupsFirst, true),
            ("OC1CCCCC1CCCCCCC", RingChainRule::AtomCount, false),
            ("CCCCCCCC1CCCCC1", RingChainRule::FunctionalGroupAware, false),
        ];
        for (smiles, rule, ring) in cases {
            assert_eq!(select(smiles, rule).candidate.is_ring(), ring, "{smiles} {rule:?}");
        }
    }

    #[test]
    fn test_more_substituents_lose_ties() {
        // 2-methylpropane has three equivalent chains; one survives.
        let chosen = select("CC(C)C", RingChainRule::FunctionalGroupAware);
        assert_eq!(chosen.candidate.atoms, vec![0, 1, 2]);
        assert_eq!(chosen.priority, PriorityLocants(vec![vec![], vec![], vec![], vec![2]]));
    }

    #[test]
    fn test_all_carbon_parent_without_principal_group() {
        let chosen = select("CCOCC", RingChainRule::FunctionalGroupAware);
        assert_eq!(chosen.candidate.heteroatoms, 0);
    }
}
