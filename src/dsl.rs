//! Chart-configuration DSL: immutable structural descriptions of testimonies.
//!
//! The chart interpretation layer observes configurations (aspects,
//! translations, receptions, dignities...) and describes them as
//! [`Primitive`] values, parameterized by concrete bodies or symbolic roles.
//! Primitives are a closed tagged-variant set so the dispatcher can match
//! them exhaustively, compare by structural equality for round-trip
//! persistence, and serialize losslessly with a `shape` tag.

use serde::{Deserialize, Serialize};

use crate::body::{AspectKind, Planet};
use crate::role::Role;

// ---------------------------------------------------------------------------
// Actors
// ---------------------------------------------------------------------------

/// A participant in a primitive: a concrete body or a symbolic role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Actor {
    Body(Planet),
    Role(Role),
}

impl Actor {
    /// The symbolic role, if this actor is one.
    pub fn role(&self) -> Option<Role> {
        match self {
            Actor::Role(role) => Some(*role),
            Actor::Body(_) => None,
        }
    }

    /// The concrete body, if this actor is one.
    pub fn body(&self) -> Option<Planet> {
        match self {
            Actor::Body(body) => Some(*body),
            Actor::Role(_) => None,
        }
    }
}

impl From<Planet> for Actor {
    fn from(body: Planet) -> Self {
        Actor::Body(body)
    }
}

impl From<Role> for Actor {
    fn from(role: Role) -> Self {
        Actor::Role(role)
    }
}

impl std::fmt::Display for Actor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Actor::Body(body) => write!(f, "{body}"),
            Actor::Role(role) => write!(f, "{role}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Qualifiers
// ---------------------------------------------------------------------------

/// How one body receives another into its dignities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReceptionKind {
    Domicile,
    Exaltation,
    Triplicity,
    Term,
    Face,
    /// Each body sits in a dignity of the other.
    Mutual,
}

/// Named essential-dignity classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DignityClass {
    Domicile,
    Exaltation,
    Detriment,
    Fall,
    Peregrine,
}

/// Essential dignity assessment: a raw score or a named classification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DignityAssessment {
    Score(i32),
    Class(DignityClass),
}

/// Accidental condition of a body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccidentalCondition {
    Retrograde,
    Combust,
    UnderBeams,
    Cazimi,
    Stationary,
}

// ---------------------------------------------------------------------------
// Primitives
// ---------------------------------------------------------------------------

/// One observed chart configuration, described structurally.
///
/// Primitives are immutable values constructed by the caller and passed into
/// the core in a fixed order; the core never mutates them. Two primitives
/// with identical fields are equal, which is what the persistence round-trip
/// tests rely on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum Primitive {
    /// Geometric aspect between two participants.
    Aspect {
        a: Actor,
        b: Actor,
        relation: AspectKind,
        applying: bool,
    },
    /// A third body carries light from one significator to the other.
    Translation {
        translator: Actor,
        from: Actor,
        to: Actor,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        relation: Option<AspectKind>,
        #[serde(default)]
        with_reception: bool,
    },
    /// A slower body collects the light of both significators.
    Collection {
        collector: Actor,
        a: Actor,
        b: Actor,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        relation: Option<AspectKind>,
        #[serde(default)]
        applying: bool,
    },
    /// A third body perfects an aspect first, blocking the main perfection.
    Prohibition {
        prohibitor: Actor,
        significator: Actor,
        relation: AspectKind,
    },
    /// A significator turns retrograde before perfecting.
    Refranation {
        refrainer: Actor,
        significator: Actor,
    },
    /// A faster body outruns the perfection.
    Frustration {
        frustrator: Actor,
        a: Actor,
        b: Actor,
    },
    /// A body cuts the light between the significators.
    Abscission {
        abscissor: Actor,
        a: Actor,
        b: Actor,
    },
    /// One participant receives the other into its dignities.
    Reception {
        receiver: Actor,
        received: Actor,
        kind: ReceptionKind,
    },
    /// Essential dignity state of a participant.
    Essential {
        actor: Actor,
        assessment: DignityAssessment,
    },
    /// Accidental condition of a participant.
    Accidental {
        actor: Actor,
        condition: AccidentalCondition,
    },
    /// The Moon makes no further applying aspect before leaving its sign.
    MoonVoidOfCourse {
        active: bool,
        #[serde(default)]
        note: String,
    },
    /// Placement of a participant in a house.
    HousePlacement { actor: Actor, house: u8 },
    /// Declares a role's importance multiplier for the current question.
    RoleImportance { role: Role, factor: f64 },
}

/// Uniform access to a primitive's participants.
///
/// Every variant reports its actor fields directly; the dispatcher collects
/// involved roles without shape-specific code.
pub trait Participants {
    fn participants(&self) -> Vec<Actor>;

    /// Symbolic roles among the participants, in field order.
    fn roles(&self) -> Vec<Role> {
        self.participants()
            .iter()
            .filter_map(Actor::role)
            .collect()
    }
}

impl Participants for Primitive {
    fn participants(&self) -> Vec<Actor> {
        match self {
            Primitive::Aspect { a, b, .. } => vec![*a, *b],
            Primitive::Translation {
                translator,
                from,
                to,
                ..
            } => vec![*translator, *from, *to],
            Primitive::Collection { collector, a, b, .. } => vec![*collector, *a, *b],
            Primitive::Prohibition {
                prohibitor,
                significator,
                ..
            } => vec![*prohibitor, *significator],
            Primitive::Refranation {
                refrainer,
                significator,
            } => vec![*refrainer, *significator],
            Primitive::Frustration { frustrator, a, b } => vec![*frustrator, *a, *b],
            Primitive::Abscission { abscissor, a, b } => vec![*abscissor, *a, *b],
            Primitive::Reception {
                receiver, received, ..
            } => vec![*receiver, *received],
            Primitive::Essential { actor, .. } => vec![*actor],
            Primitive::Accidental { actor, .. } => vec![*actor],
            Primitive::MoonVoidOfCourse { .. } => Vec::new(),
            Primitive::HousePlacement { actor, .. } => vec![*actor],
            Primitive::RoleImportance { role, .. } => vec![Actor::Role(*role)],
        }
    }
}

// ---------------------------------------------------------------------------
// Constructors
// ---------------------------------------------------------------------------

/// Applying aspect between two participants.
pub fn aspect(a: impl Into<Actor>, b: impl Into<Actor>, relation: AspectKind) -> Primitive {
    Primitive::Aspect {
        a: a.into(),
        b: b.into(),
        relation,
        applying: true,
    }
}

/// Translation of light, aspect unspecified.
pub fn translation(
    translator: impl Into<Actor>,
    from: impl Into<Actor>,
    to: impl Into<Actor>,
) -> Primitive {
    Primitive::Translation {
        translator: translator.into(),
        from: from.into(),
        to: to.into(),
        relation: None,
        with_reception: false,
    }
}

/// Translation of light with the perfecting aspect and reception spelled out.
pub fn translation_via(
    translator: impl Into<Actor>,
    from: impl Into<Actor>,
    to: impl Into<Actor>,
    relation: AspectKind,
    with_reception: bool,
) -> Primitive {
    Primitive::Translation {
        translator: translator.into(),
        from: from.into(),
        to: to.into(),
        relation: Some(relation),
        with_reception,
    }
}

/// Collection of light.
pub fn collection(
    collector: impl Into<Actor>,
    a: impl Into<Actor>,
    b: impl Into<Actor>,
    relation: AspectKind,
    applying: bool,
) -> Primitive {
    Primitive::Collection {
        collector: collector.into(),
        a: a.into(),
        b: b.into(),
        relation: Some(relation),
        applying,
    }
}

/// Prohibition of the main perfection.
pub fn prohibition(
    prohibitor: impl Into<Actor>,
    significator: impl Into<Actor>,
    relation: AspectKind,
) -> Primitive {
    Primitive::Prohibition {
        prohibitor: prohibitor.into(),
        significator: significator.into(),
        relation,
    }
}

/// Refranation by a significator.
pub fn refranation(refrainer: impl Into<Actor>, significator: impl Into<Actor>) -> Primitive {
    Primitive::Refranation {
        refrainer: refrainer.into(),
        significator: significator.into(),
    }
}

/// Frustration of the perfection.
pub fn frustration(
    frustrator: impl Into<Actor>,
    a: impl Into<Actor>,
    b: impl Into<Actor>,
) -> Primitive {
    Primitive::Frustration {
        frustrator: frustrator.into(),
        a: a.into(),
        b: b.into(),
    }
}

/// Abscission of light.
pub fn abscission(
    abscissor: impl Into<Actor>,
    a: impl Into<Actor>,
    b: impl Into<Actor>,
) -> Primitive {
    Primitive::Abscission {
        abscissor: abscissor.into(),
        a: a.into(),
        b: b.into(),
    }
}

/// Reception of one participant by another.
pub fn reception(
    receiver: impl Into<Actor>,
    received: impl Into<Actor>,
    kind: ReceptionKind,
) -> Primitive {
    Primitive::Reception {
        receiver: receiver.into(),
        received: received.into(),
        kind,
    }
}

/// Essential dignity by raw score.
pub fn essential(actor: impl Into<Actor>, score: i32) -> Primitive {
    Primitive::Essential {
        actor: actor.into(),
        assessment: DignityAssessment::Score(score),
    }
}

/// Essential dignity by named classification.
pub fn essential_class(actor: impl Into<Actor>, class: DignityClass) -> Primitive {
    Primitive::Essential {
        actor: actor.into(),
        assessment: DignityAssessment::Class(class),
    }
}

/// Accidental condition.
pub fn accidental(actor: impl Into<Actor>, condition: AccidentalCondition) -> Primitive {
    Primitive::Accidental {
        actor: actor.into(),
        condition,
    }
}

/// Moon void-of-course observation.
pub fn moon_voc(active: bool, note: impl Into<String>) -> Primitive {
    Primitive::MoonVoidOfCourse {
        active,
        note: note.into(),
    }
}

/// House placement.
pub fn house(actor: impl Into<Actor>, house: u8) -> Primitive {
    Primitive::HousePlacement {
        actor: actor.into(),
        house,
    }
}

/// Role-importance declaration for the role-weighted aggregator.
pub fn role_importance(role: Role, factor: f64) -> Primitive {
    Primitive::RoleImportance { role, factor }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::role::{L1, LQ, MOON};

    #[test]
    fn structural_equality() {
        let a = aspect(Planet::Sun, Planet::Moon, AspectKind::Trine);
        let b = aspect(Planet::Sun, Planet::Moon, AspectKind::Trine);
        assert_eq!(a, b);
        assert_ne!(a, aspect(Planet::Sun, Planet::Moon, AspectKind::Square));
    }

    #[test]
    fn participants_cover_every_actor_field() {
        let p = translation_via(Planet::Mercury, L1, LQ, AspectKind::Sextile, true);
        assert_eq!(
            p.participants(),
            vec![
                Actor::Body(Planet::Mercury),
                Actor::Role(L1),
                Actor::Role(LQ)
            ]
        );
        assert_eq!(p.roles(), vec![L1, LQ]);
    }

    #[test]
    fn roles_skips_concrete_bodies() {
        let p = aspect(MOON, Planet::Sun, AspectKind::Trine);
        assert_eq!(p.roles(), vec![MOON]);
    }

    #[test]
    fn shape_tag_distinguishes_variants() {
        let p = refranation(Planet::Mars, L1);
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["shape"], "refranation");
    }

    #[test]
    fn role_importance_is_not_an_observation() {
        let p = role_importance(L1, 1.2);
        assert_eq!(p.roles(), vec![L1]);
        match p {
            Primitive::RoleImportance { factor, .. } => assert_eq!(factor, 1.2),
            other => panic!("unexpected shape: {other:?}"),
        }
    }
}
