//! Role registry: which agents may negotiate with whom.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::ledger::AgentId;

/// Role an agent can hold in the cohort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Negotiates over the engine catalog.
    EngineNegotiator,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EngineNegotiator => write!(f, "engine_negotiator"),
        }
    }
}

/// Directory of agents by role.
#[derive(Debug, Clone, Default)]
pub struct RoleRegistry {
    entries: HashMap<Role, BTreeSet<AgentId>>,
}

impl RoleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a role with no holders yet.
    pub fn add_role(&mut self, role: Role) {
        self.entries.entry(role).or_default();
    }

    /// Give `agent` the role, declaring the role if needed.
    pub fn attach_role(&mut self, role: Role, agent: impl Into<AgentId>) {
        self.entries.entry(role).or_default().insert(agent.into());
    }

    /// Every holder of `role` except `requester`, sorted.
    pub fn peers_with_role(&self, requester: &str, role: Role) -> Vec<AgentId> {
        self.entries
            .get(&role)
            .map(|holders| {
                holders
                    .iter()
                    .filter(|agent| agent.as_str() != requester)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn holders(&self, role: Role) -> usize {
        self.entries.get(&role).map_or(0, BTreeSet::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_role() {
        let mut registry = RoleRegistry::new();
        assert!(registry.peers_with_role("", Role::EngineNegotiator).is_empty());
        registry.add_role(Role::EngineNegotiator);
        assert_eq!(registry.holders(Role::EngineNegotiator), 0);
        assert!(registry.peers_with_role("", Role::EngineNegotiator).is_empty());
    }

    #[test]
    fn test_peers_exclude_requester() {
        let mut registry = RoleRegistry::new();
        registry.attach_role(Role::EngineNegotiator, "AgentSmith");
        registry.attach_role(Role::EngineNegotiator, "AgentPamela");
        registry.attach_role(Role::EngineNegotiator, "AgentPamela");

        assert_eq!(
            registry.peers_with_role("", Role::EngineNegotiator),
            vec!["AgentPamela".to_string(), "AgentSmith".to_string()]
        );
        assert_eq!(
            registry.peers_with_role("AgentSmith", Role::EngineNegotiator),
            vec!["AgentPamela".to_string()]
        );
    }
}
