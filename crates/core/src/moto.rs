//! Moto domain constants, the `tipo` enumeration and its validation rule.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use validator::ValidationError;

// ---------------------------------------------------------------------------
// Field limits
// ---------------------------------------------------------------------------

// Typed `u64` to plug straight into `validator`'s `length` rule.

/// Maximum length of `modelo`, in characters.
pub const MAX_MODELO_LEN: u64 = 50;

/// Maximum length of `marca`, in characters.
pub const MAX_MARCA_LEN: u64 = 40;

/// Maximum number of entries in `extras`.
pub const MAX_EXTRAS: u64 = 20;

// ---------------------------------------------------------------------------
// Tipo
// ---------------------------------------------------------------------------

/// Closed set of motorcycle types. Serialized as the lowercase literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MotoTipo {
    Scooter,
    Cross,
    Naked,
    Cruiser,
    Enduro,
    Deportiva,
    Custom,
}

impl MotoTipo {
    pub const ALL: [MotoTipo; 7] = [
        MotoTipo::Scooter,
        MotoTipo::Cross,
        MotoTipo::Naked,
        MotoTipo::Cruiser,
        MotoTipo::Enduro,
        MotoTipo::Deportiva,
        MotoTipo::Custom,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MotoTipo::Scooter => "scooter",
            MotoTipo::Cross => "cross",
            MotoTipo::Naked => "naked",
            MotoTipo::Cruiser => "cruiser",
            MotoTipo::Enduro => "enduro",
            MotoTipo::Deportiva => "deportiva",
            MotoTipo::Custom => "custom",
        }
    }
}

impl fmt::Display for MotoTipo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not one of the [`MotoTipo`] literals.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown moto tipo '{0}'")]
pub struct UnknownTipo(pub String);

impl FromStr for MotoTipo {
    type Err = UnknownTipo;

    /// Exact, case-sensitive match on the lowercase literal.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MotoTipo::ALL
            .into_iter()
            .find(|tipo| tipo.as_str() == s)
            .ok_or_else(|| UnknownTipo(s.to_string()))
    }
}

impl TryFrom<String> for MotoTipo {
    type Error = UnknownTipo;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// `validator` rule for the `tipo` field: non-blank and a known literal.
pub fn validate_tipo(value: &str) -> Result<(), ValidationError> {
    crate::validation::validate_not_blank(value)?;
    if value.parse::<MotoTipo>().is_err() {
        let allowed: Vec<&str> = MotoTipo::ALL.iter().map(|t| t.as_str()).collect();
        return Err(ValidationError::new("tipo").with_message(
            format!("must be one of: {}", allowed.join(", ")).into(),
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
