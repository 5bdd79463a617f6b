//! Celestial vocabulary: the seven traditional bodies and the Ptolemaic aspects.
//!
//! These are the concrete values that symbolic roles resolve to. The engine
//! never computes positions; bodies arrive pre-identified from the chart
//! interpretation layer.

use serde::{Deserialize, Serialize};

/// One of the seven traditional bodies used in horary judgment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Planet {
    Sun,
    Moon,
    Mercury,
    Venus,
    Mars,
    Jupiter,
    Saturn,
}

impl Planet {
    /// Capitalized English name, as used in rationale sentences.
    pub fn name(self) -> &'static str {
        match self {
            Planet::Sun => "Sun",
            Planet::Moon => "Moon",
            Planet::Mercury => "Mercury",
            Planet::Venus => "Venus",
            Planet::Mars => "Mars",
            Planet::Jupiter => "Jupiter",
            Planet::Saturn => "Saturn",
        }
    }
}

impl std::fmt::Display for Planet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Geometric relation between two bodies.
///
/// Ordered by aspect angle (0, 60, 90, 120, 180 degrees); the lowercase label
/// is the stable form used inside synthesized token identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AspectKind {
    Conjunction,
    Sextile,
    Square,
    Trine,
    Opposition,
}

impl AspectKind {
    /// Stable lowercase label (`"trine"`, `"square"`, ...).
    pub fn label(self) -> &'static str {
        match self {
            AspectKind::Conjunction => "conjunction",
            AspectKind::Sextile => "sextile",
            AspectKind::Square => "square",
            AspectKind::Trine => "trine",
            AspectKind::Opposition => "opposition",
        }
    }

    /// All aspect kinds, in angle order.
    pub const ALL: [AspectKind; 5] = [
        AspectKind::Conjunction,
        AspectKind::Sextile,
        AspectKind::Square,
        AspectKind::Trine,
        AspectKind::Opposition,
    ];
}

impl std::fmt::Display for AspectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn planet_display_is_capitalized() {
        assert_eq!(Planet::Mars.to_string(), "Mars");
        assert_eq!(Planet::Sun.to_string(), "Sun");
    }

    #[test]
    fn aspect_labels_are_lowercase() {
        for aspect in AspectKind::ALL {
            let label = aspect.label();
            assert_eq!(label, label.to_lowercase());
        }
    }

    #[test]
    fn planet_serde_uses_lowercase() {
        let json = serde_json::to_string(&Planet::Jupiter).unwrap();
        assert_eq!(json, "\"jupiter\"");
        let back: Planet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Planet::Jupiter);
    }
}
