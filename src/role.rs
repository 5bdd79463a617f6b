//! Symbolic roles: question-specific placeholders for significators.
//!
//! A role never participates in scoring directly; it must be resolved through
//! a [`Contract`](crate::contract::Contract) before dispatch. Roles serialize
//! as their stable lowercase labels (`l1`, `lq`, `examiner`, `moon`), which
//! are also the building blocks of synthesized token identifiers.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Symbolic placeholder for a question-specific significator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Role {
    /// Ruler of the given house (1..=12). `Lord(1)` is the querent's
    /// significator, `Lord(7)` the seventh-house significator, and so on.
    Lord(u8),
    /// Significator of the thing asked about, wherever its house falls.
    Quesited,
    /// The examiner/authority figure, conventionally the Sun.
    Examiner,
    /// The Moon as co-significator of the querent.
    Moon,
}

/// Querent's significator (ruler of the first house).
pub const L1: Role = Role::Lord(1);
/// Seventh-house significator.
pub const L7: Role = Role::Lord(7);
/// Tenth-house significator.
pub const L10: Role = Role::Lord(10);
/// Quesited significator.
pub const LQ: Role = Role::Quesited;
/// The Moon.
pub const MOON: Role = Role::Moon;
/// The examiner (Sun by convention).
pub const EXAMINER: Role = Role::Examiner;

impl Role {
    /// Stable lowercase label used for serialization and synthesized tokens.
    pub fn label(self) -> String {
        match self {
            Role::Lord(house) => format!("l{house}"),
            Role::Quesited => "lq".to_string(),
            Role::Examiner => "examiner".to_string(),
            Role::Moon => "moon".to_string(),
        }
    }

    /// Parse a role from its label. Case-insensitive; returns `None` for
    /// unknown labels or house numbers outside 1..=12.
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim().to_lowercase();
        match label.as_str() {
            "lq" => Some(Role::Quesited),
            "examiner" => Some(Role::Examiner),
            "moon" => Some(Role::Moon),
            other => {
                let house: u8 = other.strip_prefix('l')?.parse().ok()?;
                (1..=12).contains(&house).then_some(Role::Lord(house))
            }
        }
    }

    /// House number this role is the lord of, if it names one directly.
    pub fn house(self) -> Option<u8> {
        match self {
            Role::Lord(house) => Some(house),
            _ => None,
        }
    }

    /// Whether this role needs a contract binding before it can carry weight.
    ///
    /// The Moon is a concrete body in its own right and the examiner is the
    /// Sun by convention; every other role stands for an as-yet-unknown ruler
    /// and stays symbolic until bound.
    pub fn needs_binding(self) -> bool {
        !matches!(self, Role::Moon | Role::Examiner)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.label())
    }
}

impl Serialize for Role {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.label())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Role::from_label(&label)
            .ok_or_else(|| D::Error::custom(format!("unknown role label '{label}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_round_trip() {
        for role in [L1, L7, L10, Role::Lord(12), LQ, EXAMINER, MOON] {
            assert_eq!(Role::from_label(&role.label()), Some(role));
        }
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(Role::from_label("L10"), Some(L10));
        assert_eq!(Role::from_label("Moon"), Some(MOON));
        assert_eq!(Role::from_label("LQ"), Some(LQ));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert_eq!(Role::from_label("l0"), None);
        assert_eq!(Role::from_label("l13"), None);
        assert_eq!(Role::from_label("ascendant"), None);
        assert_eq!(Role::from_label(""), None);
    }

    #[test]
    fn l1_does_not_match_l10() {
        // Labels are whole tokens, not prefixes.
        assert_ne!(Role::from_label("l10"), Some(L1));
        assert_ne!(L1.label(), L10.label());
    }

    #[test]
    fn serde_uses_label_form() {
        let json = serde_json::to_string(&L10).unwrap();
        assert_eq!(json, "\"l10\"");
        let back: Role = serde_json::from_str(&json).unwrap();
        assert_eq!(back, L10);
    }

    #[test]
    fn moon_and_examiner_are_self_binding() {
        assert!(!MOON.needs_binding());
        assert!(!EXAMINER.needs_binding());
        assert!(L1.needs_binding());
        assert!(LQ.needs_binding());
    }
}
