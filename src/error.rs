//! Rich diagnostic error types for the almuten engine.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]` derives,
//! providing error codes and help text. Configuration defects (a catalog token
//! with no polarity, a rule id with no stored weight) fail loudly at the first
//! lookup rather than substituting a default, since silent defaulting would
//! corrupt scores undetectably.

use miette::Diagnostic;
use thiserror::Error;

/// Top-level error type for the almuten engine.
///
/// Each variant wraps a subsystem-specific error, preserving the full
/// diagnostic chain (error codes, help text) through to the user.
#[derive(Debug, Error, Diagnostic)]
pub enum AlmutenError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Rule(#[from] RuleError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Engine(#[from] EngineError),
}

// ---------------------------------------------------------------------------
// Catalog errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum CatalogError {
    #[error("no polarity entry for catalog token '{token}'")]
    #[diagnostic(
        code(almuten::catalog::missing_polarity),
        help(
            "Every catalog token must appear in the polarity table. \
             This is a configuration defect in the catalog data, not a \
             runtime condition — add the token to the polarity table."
        )
    )]
    MissingPolarity { token: String },

    #[error("no rule id mapped for catalog token '{token}'")]
    #[diagnostic(
        code(almuten::catalog::missing_rule),
        help(
            "The token cannot be scored without a rule id to look its weight \
             up under. Add the token to the token-to-rule table."
        )
    )]
    MissingRule { token: String },

    #[error(
        "polarity/weight sign disagreement for token '{token}': catalog says {polarity}, rule {rule} stores {weight}"
    )]
    #[diagnostic(
        code(almuten::catalog::sign_mismatch),
        help(
            "The catalog polarity and the sign of the stored rule weight must \
             agree by convention. One of the two tables is wrong — fix the \
             data; the engine will not reconcile them silently."
        )
    )]
    SignMismatch {
        token: String,
        polarity: String,
        rule: String,
        weight: f64,
    },
}

// ---------------------------------------------------------------------------
// Rule store errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum RuleError {
    #[error("no stored weight for rule id '{id}'")]
    #[diagnostic(
        code(almuten::rule::unknown_id),
        help(
            "The rule weight store has no entry under this identifier. \
             Check the token-to-rule table for a stale id, or add the rule \
             to the store."
        )
    )]
    UnknownRule { id: String },
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to parse judge configuration: {message}")]
    #[diagnostic(
        code(almuten::config::parse),
        help("Check the TOML syntax and field names against JudgeConfig.")
    )]
    Parse { message: String },

    #[error("failed to read configuration file {path}: {source}")]
    #[diagnostic(
        code(almuten::config::io),
        help("Ensure the file exists and is readable.")
    )]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("unknown role label '{label}' in role_importance")]
    #[diagnostic(
        code(almuten::config::unknown_role),
        help(
            "Role labels are 'l1' through 'l12', 'lq', 'examiner', and 'moon' \
             (case-insensitive). Fix the key in the [aggregator.role_importance] \
             table."
        )
    )]
    UnknownRole { label: String },

    #[error("role importance for '{label}' must be finite and non-negative, got {value}")]
    #[diagnostic(
        code(almuten::config::bad_importance),
        help("Importance factors multiply testimony weights; use a finite value >= 0.")
    )]
    BadImportance { label: String, value: f64 },
}

// ---------------------------------------------------------------------------
// Engine errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum EngineError {
    #[error("catalog/store verification failed at startup")]
    #[diagnostic(
        code(almuten::engine::tables_inconsistent),
        help(
            "The token catalog and rule weight store disagree. See the inner \
             error for the offending token. The engine refuses to start with \
             inconsistent tables."
        )
    )]
    TablesInconsistent {
        #[source]
        source: Box<AlmutenError>,
    },
}

/// Convenience alias for functions returning almuten results.
pub type AlmutenResult<T> = std::result::Result<T, AlmutenError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_error_converts_to_almuten_error() {
        let err = CatalogError::MissingPolarity {
            token: "l10_fortunate".into(),
        };
        let almuten: AlmutenError = err.into();
        assert!(matches!(
            almuten,
            AlmutenError::Catalog(CatalogError::MissingPolarity { .. })
        ));
    }

    #[test]
    fn rule_error_converts_to_almuten_error() {
        let err = RuleError::UnknownRule { id: "Z9".into() };
        let almuten: AlmutenError = err.into();
        assert!(matches!(
            almuten,
            AlmutenError::Rule(RuleError::UnknownRule { .. })
        ));
    }

    #[test]
    fn engine_error_carries_catalog_source() {
        let inner: AlmutenError = CatalogError::SignMismatch {
            token: "essential_detriment".into(),
            polarity: "negative".into(),
            rule: "MOD2".into(),
            weight: 1.0,
        }
        .into();
        let err = EngineError::TablesInconsistent {
            source: Box::new(inner),
        };
        let msg = format!("{err}");
        assert!(msg.contains("verification failed"));
    }

    #[test]
    fn error_display_messages_are_descriptive() {
        let err = CatalogError::SignMismatch {
            token: "l7_fortunate".into(),
            polarity: "positive".into(),
            rule: "LC2".into(),
            weight: -1.0,
        };
        let msg = format!("{err}");
        assert!(msg.contains("l7_fortunate"));
        assert!(msg.contains("LC2"));
    }
}
