//! Dispatch resolver: from DSL primitives to ledger-ready testimony seeds.
//!
//! `dispatch` substitutes symbolic roles through the question's contract,
//! matches the primitive against the fixed table of known configurations,
//! and falls back to synthesizing a role-aspect token for novel role pairs.
//! It is total: unrecognized or unmatched primitives yield `None`, never an
//! error, so callers may pass heterogeneous streams through unchanged.

use serde::{Deserialize, Serialize};

use crate::body::{AspectKind, Planet};
use crate::contract::Contract;
use crate::dsl::{
    AccidentalCondition, Actor, DignityAssessment, DignityClass, Participants, Primitive,
    ReceptionKind,
};
use crate::role::Role;
use crate::token::{Token, TokenKey};

/// Reception metadata carried into the ledger for rationale rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceptionNote {
    pub receiver: Planet,
    pub received: Planet,
    pub kind: ReceptionKind,
}

/// One resolved testimony seed, ready for the aggregator.
#[derive(Debug, Clone, PartialEq)]
pub struct Dispatch {
    pub token: Token,
    /// House the testimony is anchored to, when the token names one.
    pub house: Option<u8>,
    /// Dispatch-level scaling factor (distinct from role importance).
    pub factor: f64,
    /// Participants as supplied, roles unsubstituted.
    pub participants: Vec<Actor>,
    /// Applying/separating flag, for aspect-bearing shapes.
    pub applying: Option<bool>,
    /// Reception metadata, when both participants resolve to bodies.
    pub reception: Option<ReceptionNote>,
}

impl Dispatch {
    fn token(token: impl Into<Token>, participants: Vec<Actor>) -> Self {
        Dispatch {
            token: token.into(),
            house: None,
            factor: 1.0,
            participants,
            applying: None,
            reception: None,
        }
    }

    fn at_house(mut self, house: u8) -> Self {
        self.house = Some(house);
        self
    }

    fn applying(mut self, applying: bool) -> Self {
        self.applying = Some(applying);
        self
    }

    fn with_reception(mut self, note: Option<ReceptionNote>) -> Self {
        self.reception = note;
        self
    }
}

/// Does this actor stand for the given role under the contract?
///
/// True when the actor is the role itself, or a concrete body the contract
/// (or convention: Moon, examiner-Sun) resolves that role to. This is what
/// makes dispatch insensitive to which field carries the role information.
fn plays(actor: Actor, role: Role, contract: &Contract) -> bool {
    match actor {
        Actor::Role(r) => r == role,
        Actor::Body(b) => contract.body_of(role) == Some(b),
    }
}

/// Resolve an actor to a concrete body, if the contract allows.
fn body_of(actor: Actor, contract: &Contract) -> Option<Planet> {
    match actor {
        Actor::Body(b) => Some(b),
        Actor::Role(r) => contract.body_of(r),
    }
}

/// Match a primitive to zero-or-one testimony seed.
///
/// Unrecognized primitives dispatch to nothing; this is not an error.
pub fn dispatch(primitive: &Primitive, contract: &Contract) -> Option<Dispatch> {
    match primitive {
        Primitive::Aspect {
            a,
            b,
            relation,
            applying,
        } => dispatch_aspect(*a, *b, *relation, *applying, contract)
            .map(|d| d.applying(*applying)),

        Primitive::Translation { .. } => Some(Dispatch::token(
            TokenKey::PerfectionTranslationOfLight,
            primitive.participants(),
        )),

        Primitive::Collection { applying, .. } => Some(
            Dispatch::token(
                TokenKey::PerfectionCollectionOfLight,
                primitive.participants(),
            )
            .applying(*applying),
        ),

        Primitive::Prohibition { .. } => Some(Dispatch::token(
            TokenKey::Prohibition,
            primitive.participants(),
        )),

        Primitive::Refranation { .. } => Some(Dispatch::token(
            TokenKey::Refranation,
            primitive.participants(),
        )),

        Primitive::Frustration { .. } => Some(Dispatch::token(
            TokenKey::Frustration,
            primitive.participants(),
        )),

        Primitive::Abscission { .. } => Some(Dispatch::token(
            TokenKey::Abscission,
            primitive.participants(),
        )),

        Primitive::Reception {
            receiver,
            received,
            kind,
        } => dispatch_reception(*receiver, *received, *kind, contract),

        Primitive::Essential { actor, assessment } => {
            dispatch_essential(*actor, *assessment, contract)
        }

        Primitive::Accidental { actor, condition } => match condition {
            AccidentalCondition::Retrograde => Some(Dispatch::token(
                TokenKey::AccidentalRetrograde,
                vec![*actor],
            )),
            _ => None,
        },

        Primitive::MoonVoidOfCourse { active, .. } => active.then(|| {
            Dispatch::token(TokenKey::MoonVoidOfCourse, Vec::new())
        }),

        // Carry no judgment weight of their own.
        Primitive::HousePlacement { .. } | Primitive::RoleImportance { .. } => None,
    }
}

fn dispatch_aspect(
    a: Actor,
    b: Actor,
    relation: AspectKind,
    applying: bool,
    contract: &Contract,
) -> Option<Dispatch> {
    use AspectKind::{Opposition, Sextile, Square, Trine};

    // Canonical Moon testimonies require an applying aspect.
    if applying {
        let moon_first = plays(a, Role::Moon, contract);
        let moon_second = plays(b, Role::Moon, contract);
        if moon_first || moon_second {
            let other = if moon_first { b } else { a };
            let key = if plays(other, Role::Examiner, contract) {
                match relation {
                    Trine => Some(TokenKey::MoonApplyingTrineExaminerSun),
                    Sextile => Some(TokenKey::MoonApplyingSextileExaminerSun),
                    Square => Some(TokenKey::MoonApplyingSquareExaminerSun),
                    Opposition => Some(TokenKey::MoonApplyingOppositionExaminerSun),
                    _ => None,
                }
            } else if plays(other, Role::Lord(1), contract) {
                match relation {
                    Sextile => Some(TokenKey::MoonApplyingSextileL1),
                    Opposition => Some(TokenKey::MoonApplyingOppositionL1),
                    _ => None,
                }
            } else if plays(other, Role::Lord(7), contract) {
                match relation {
                    Sextile => Some(TokenKey::MoonApplyingSextileL7),
                    Opposition => Some(TokenKey::MoonApplyingOppositionL7),
                    _ => None,
                }
            } else {
                None
            };
            if let Some(key) = key {
                return Some(Dispatch::token(key, vec![a, b]));
            }
        }
    }

    // Novel role pairs enter the ledger through a synthesized token.
    if applying {
        if let (Actor::Role(ra), Actor::Role(rb)) = (a, b) {
            return Some(Dispatch::token(
                Token::Synthesized {
                    a: ra,
                    b: rb,
                    aspect: relation,
                },
                vec![a, b],
            ));
        }
    }

    None
}

fn dispatch_reception(
    receiver: Actor,
    received: Actor,
    kind: ReceptionKind,
    contract: &Contract,
) -> Option<Dispatch> {
    let note = match (body_of(receiver, contract), body_of(received, contract)) {
        (Some(r), Some(d)) => Some(ReceptionNote {
            receiver: r,
            received: d,
            kind,
        }),
        _ => None,
    };

    if plays(receiver, Role::Lord(10), contract) {
        return Some(
            Dispatch::token(TokenKey::L10Fortunate, vec![receiver, received])
                .at_house(10)
                .with_reception(note),
        );
    }
    if kind == ReceptionKind::Mutual {
        return Some(
            Dispatch::token(TokenKey::MutualReception, vec![receiver, received])
                .with_reception(note),
        );
    }
    None
}

fn dispatch_essential(
    actor: Actor,
    assessment: DignityAssessment,
    contract: &Contract,
) -> Option<Dispatch> {
    match assessment {
        DignityAssessment::Class(DignityClass::Detriment) => Some(Dispatch::token(
            TokenKey::EssentialDetriment,
            vec![actor],
        )),
        DignityAssessment::Class(_) => None,
        DignityAssessment::Score(score) => {
            // Condition tokens exist for the lords of houses 2, 5, 7, 8 and,
            // on the fortunate side only, 10. Dignity at or below zero counts
            // as debility.
            for house_number in [2u8, 5, 7, 8, 10] {
                if !plays(actor, Role::Lord(house_number), contract) {
                    continue;
                }
                let key = match (house_number, score > 0) {
                    (2, true) => Some(TokenKey::L2Fortunate),
                    (2, false) => Some(TokenKey::L2MalificDebility),
                    (5, true) => Some(TokenKey::L5Fortunate),
                    (5, false) => Some(TokenKey::L5MalificDebility),
                    (7, true) => Some(TokenKey::L7Fortunate),
                    (7, false) => Some(TokenKey::L7MalificDebility),
                    (8, true) => Some(TokenKey::L8Fortunate),
                    (8, false) => Some(TokenKey::L8MalificDebility),
                    (10, true) => Some(TokenKey::L10Fortunate),
                    _ => None,
                }?;
                return Some(
                    Dispatch::token(key, vec![actor]).at_house(house_number),
                );
            }
            None
        }
    }
}
