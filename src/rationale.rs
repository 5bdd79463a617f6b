//! Rationale renderer: project a ledger into ordered human-readable lines.
//!
//! Rendering never alters scoring. Each entry produces one numeric line in
//! ledger order; mutual-reception entries additionally produce the
//! "A receives B" / "B receives A" sentence pair.

use crate::aggregate::LedgerEntry;
use crate::dsl::ReceptionKind;
use crate::token::Polarity;

/// Render one line per ledger entry, preserving ledger order.
///
/// Numeric lines read `"<token> (+1.0)"` or `"<token> (-1.0)"`; magnitudes
/// keep their stored precision without trailing-zero padding.
pub fn build_rationale(ledger: &[LedgerEntry]) -> Vec<String> {
    let mut lines = Vec::with_capacity(ledger.len());
    for entry in ledger {
        let sign = match entry.polarity {
            Polarity::Positive => '+',
            Polarity::Negative => '-',
        };
        lines.push(format!(
            "{} ({}{})",
            entry.identifier(),
            sign,
            format_magnitude(entry.weight)
        ));

        if let Some(note) = &entry.reception {
            if note.kind == ReceptionKind::Mutual {
                lines.push(format!("{} receives {}", note.receiver, note.received));
                lines.push(format!("{} receives {}", note.received, note.receiver));
            }
        }
    }
    lines
}

/// Format a non-negative magnitude: whole values keep a single `.0`, everything
/// else prints at its natural precision.
fn format_magnitude(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}
