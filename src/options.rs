/// How a ring competes with an acyclic chain for the parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RingChainRule {
    /// The ring wins when it has at least as many atoms as the longest
    /// chain, or when it carries more principal groups than any chain.
    #[default]
    FunctionalGroupAware,
    /// The side carrying more principal groups wins; on equal counts the
    /// ring wins unless the chain has more atoms.
    PrincipalGroupsFirst,
    /// The ring wins when it has at least as many atoms as the chain.
    AtomCount,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamingOptions {
    pub ring_chain_rule: RingChainRule,
    pub max_substituent_depth: usize,
    pub omit_unambiguous_locants: bool,
    pub hetero_chains: bool,
}

impl Default for NamingOptions {
    fn default() -> Self {
        Self {
            ring_chain_rule: RingChainRule::default(),
            max_substituent_depth: 24,
            omit_unambiguous_locants: true,
            hetero_chains: true,
        }
    }
}

impl NamingOptions {
    pub fn with_ring_chain_rule(mut self, rule: RingChainRule) -> Self {
        self.ring_chain_rule = rule;
        self
    }

    pub fn with_max_substituent_depth(mut self, depth: usize) -> Self {
        self.max_substituent_depth = depth;
        self
    }

    pub fn with_omit_unambiguous_locants(mut self, omit: bool) -> Self {
        self.omit_unambiguous_locants = omit;
        self
    }

    pub fn with_hetero_chains(mut self, enabled: bool) -> Self {
        self.hetero_chains = enabled;
        self
    }
}
