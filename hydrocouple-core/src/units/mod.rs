//! Physical units of water cycle variables.
//!
//! Components declare the unit of each variable they consume, and datasets record the
//! unit of each variable they hold. The two rarely use the same spelling
//! (`kg m-2 s-1` versus `kg/m2/s`), so comparisons go through dimensional analysis
//! rather than string equality.
//!
//! ```
//! use hydrocouple_core::units::Unit;
//!
//! let declared = Unit::parse("kg m-2 s-1").unwrap();
//! let supplied = Unit::parse("kg / (m^2 s)").unwrap();
//! assert!(declared.equals(&supplied));
//!
//! let daily = Unit::parse("kg m-2 d-1").unwrap();
//! assert!(declared.is_compatible(&daily));
//! assert!(!declared.equals(&daily));
//! ```
//!
//! - [`dimension`]: Physical dimension types (M, L, T, Θ, N)
//! - [`registry`]: Known units with conversion factors
//! - [`parser`]: Unit string parsing

pub mod dimension;
pub mod parser;
pub mod registry;

pub use dimension::Dimension;
pub use parser::{ParseError, ParsedUnit};
pub use registry::{UnitInfo, UnitRegistry, UNIT_REGISTRY};

use is_close::is_close;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::warn;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConversionError {
    #[error("cannot convert from '{from}' to '{to}': incompatible dimensions ({from_dimension} vs {to_dimension})")]
    IncompatibleDimensions {
        from: String,
        to: String,
        from_dimension: Dimension,
        to_dimension: Dimension,
    },
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// A parsed unit.
///
/// Two units compare equal with `==` when their parsed forms are identical, which
/// makes `kg/m2/s` and `kg m-2 s-1` equal but `W m-2` and `J m-2 s-1` different.
/// [`Unit::equals`] is the physical comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Unit {
    original: String,
    parsed: ParsedUnit,
}

impl Unit {
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        Ok(Self {
            original: input.to_string(),
            parsed: ParsedUnit::parse(input)?,
        })
    }

    pub fn original(&self) -> &str {
        &self.original
    }

    pub fn normalized(&self) -> String {
        self.parsed.normalized()
    }

    pub fn dimension(&self) -> Result<Dimension, ParseError> {
        self.parsed.dimension()
    }

    /// Whether both units measure the same physical dimension.
    pub fn is_compatible(&self, other: &Self) -> bool {
        match (self.dimension(), other.dimension()) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
    }

    /// Multiplier converting a value in `self` to a value in `other`.
    pub fn conversion_factor(&self, other: &Self) -> Result<f64, ConversionError> {
        let from_dimension = self.dimension()?;
        let to_dimension = other.dimension()?;
        if from_dimension != to_dimension {
            return Err(ConversionError::IncompatibleDimensions {
                from: self.original.clone(),
                to: other.original.clone(),
                from_dimension,
                to_dimension,
            });
        }
        Ok(self.parsed.to_si_factor()? / other.parsed.to_si_factor()?)
    }

    /// Whether both units denote the same physical unit.
    ///
    /// The dimensions must match, the conversion factor must be one and both units
    /// must share the same origin (`K` is not `degC`).
    pub fn equals(&self, other: &Self) -> bool {
        match self.conversion_factor(other) {
            Ok(factor) => {
                is_close!(factor, 1.0)
                    && is_close!(self.parsed.to_si_offset(), other.parsed.to_si_offset())
            }
            Err(_) => false,
        }
    }
}

impl PartialEq for Unit {
    fn eq(&self, other: &Self) -> bool {
        self.parsed == other.parsed
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.original)
    }
}

/// Physically-aware comparison of two unit strings.
///
/// Falls back to whitespace-normalised string equality when either string cannot be
/// understood by the registry.
pub fn units_equal(a: &str, b: &str) -> bool {
    let parsed = Unit::parse(a).and_then(|ua| {
        let ub = Unit::parse(b)?;
        ua.dimension()?;
        ub.dimension()?;
        Ok((ua, ub))
    });
    match parsed {
        Ok((ua, ub)) => ua.equals(&ub),
        Err(error) => {
            warn!(
                unit_a = a,
                unit_b = b,
                %error,
                "falling back to string comparison of units"
            );
            let normalise = |s: &str| s.split_whitespace().collect::<Vec<_>>().join(" ");
            normalise(a) == normalise(b)
        }
    }
}
