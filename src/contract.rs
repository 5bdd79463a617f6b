//! Per-question contracts: binding symbolic roles to concrete bodies/houses.
//!
//! A contract is built fresh for each question from the question category
//! (which house rules the quesited, who the examiner is...) and discarded
//! after aggregation. The engine only reads it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::body::Planet;
use crate::role::Role;

/// What a role resolves to for one specific question.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binding {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Planet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub house: Option<u8>,
}

/// Role-to-significator bindings for one question.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contract {
    bindings: BTreeMap<Role, Binding>,
}

impl Contract {
    /// An empty contract: every role stays symbolic.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a role to a concrete body. Chainable for test setup.
    pub fn bind(mut self, role: Role, body: Planet) -> Self {
        self.bindings.entry(role).or_default().body = Some(body);
        self
    }

    /// Bind a role to a house number. Chainable.
    pub fn bind_house(mut self, role: Role, house: u8) -> Self {
        self.bindings.entry(role).or_default().house = Some(house);
        self
    }

    /// Binding for a role, if any.
    pub fn binding(&self, role: Role) -> Option<&Binding> {
        self.bindings.get(&role)
    }

    /// Body a role resolves to.
    ///
    /// The Moon and the examiner resolve by convention (the examiner is the
    /// Sun) even without an explicit binding.
    pub fn body_of(&self, role: Role) -> Option<Planet> {
        if let Some(binding) = self.bindings.get(&role) {
            if binding.body.is_some() {
                return binding.body;
            }
        }
        match role {
            Role::Moon => Some(Planet::Moon),
            Role::Examiner => Some(Planet::Sun),
            _ => None,
        }
    }

    /// Whether the role can carry weight: self-binding, or bound here.
    pub fn is_bound(&self, role: Role) -> bool {
        !role.needs_binding()
            || self
                .bindings
                .get(&role)
                .is_some_and(|b| b.body.is_some() || b.house.is_some())
    }

    /// Reverse lookup: the first role (in role order) bound to this body.
    pub fn role_of_body(&self, body: Planet) -> Option<Role> {
        if body == Planet::Moon {
            return Some(Role::Moon);
        }
        self.bindings
            .iter()
            .find(|(_, binding)| binding.body == Some(body))
            .map(|(role, _)| *role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::role::{EXAMINER, L1, LQ, MOON};

    #[test]
    fn empty_contract_binds_nothing_symbolic() {
        let contract = Contract::new();
        assert!(!contract.is_bound(L1));
        assert!(!contract.is_bound(LQ));
        assert_eq!(contract.body_of(L1), None);
    }

    #[test]
    fn moon_and_examiner_resolve_by_convention() {
        let contract = Contract::new();
        assert_eq!(contract.body_of(MOON), Some(Planet::Moon));
        assert_eq!(contract.body_of(EXAMINER), Some(Planet::Sun));
        assert!(contract.is_bound(MOON));
        assert!(contract.is_bound(EXAMINER));
    }

    #[test]
    fn bound_body_and_house_are_retrievable() {
        let contract = Contract::new()
            .bind(L1, Planet::Mars)
            .bind_house(Role::Lord(10), 10);
        assert_eq!(contract.body_of(L1), Some(Planet::Mars));
        assert!(contract.is_bound(Role::Lord(10)));
        assert_eq!(
            contract.binding(Role::Lord(10)).unwrap().house,
            Some(10)
        );
    }

    #[test]
    fn reverse_lookup_finds_the_bound_role() {
        let contract = Contract::new()
            .bind(L1, Planet::Mars)
            .bind(LQ, Planet::Venus);
        assert_eq!(contract.role_of_body(Planet::Venus), Some(LQ));
        assert_eq!(contract.role_of_body(Planet::Moon), Some(MOON));
        assert_eq!(contract.role_of_body(Planet::Saturn), None);
    }

    #[test]
    fn contract_round_trips() {
        let contract = Contract::new()
            .bind(L1, Planet::Mars)
            .bind_house(LQ, 7)
            .bind(LQ, Planet::Venus);
        let json = serde_json::to_string(&contract).unwrap();
        let back: Contract = serde_json::from_str(&json).unwrap();
        assert_eq!(back, contract);
    }
}
