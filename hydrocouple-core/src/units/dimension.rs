//! Physical dimensions for unit validation.
//!
//! Dimensions are integer exponents of the SI base quantities that appear in
//! terrestrial water cycle variables:
//! - Mass (M)
//! - Length (L)
//! - Time (T)
//! - Temperature (Θ)
//! - Amount of substance (N)
//!
//! Derived quantities (water flux, pressure, energy flux) are combinations of these.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Div, Mul};

/// The physical dimension of a quantity.
///
/// For example a water mass flux (`kg m-2 s-1`) has mass = 1, length = -2, time = -1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Dimension {
    pub mass: i8,
    pub length: i8,
    pub time: i8,
    pub temperature: i8,
    pub amount: i8,
}

impl Dimension {
    #[must_use]
    pub const fn new(mass: i8, length: i8, time: i8, temperature: i8, amount: i8) -> Self {
        Self {
            mass,
            length,
            time,
            temperature,
            amount,
        }
    }

    pub const DIMENSIONLESS: Self = Self::new(0, 0, 0, 0, 0);
    pub const MASS: Self = Self::new(1, 0, 0, 0, 0);
    pub const LENGTH: Self = Self::new(0, 1, 0, 0, 0);
    pub const TIME: Self = Self::new(0, 0, 1, 0, 0);
    pub const TEMPERATURE: Self = Self::new(0, 0, 0, 1, 0);
    pub const AMOUNT: Self = Self::new(0, 0, 0, 0, 1);

    /// Force (M L T⁻²).
    pub const FORCE: Self = Self::new(1, 1, -2, 0, 0);
    /// Energy (M L² T⁻²).
    pub const ENERGY: Self = Self::new(1, 2, -2, 0, 0);
    /// Power (M L² T⁻³).
    pub const POWER: Self = Self::new(1, 2, -3, 0, 0);
    /// Pressure (M L⁻¹ T⁻²).
    pub const PRESSURE: Self = Self::new(1, -1, -2, 0, 0);
    /// Water mass flux per unit area (M L⁻² T⁻¹), e.g. `kg m-2 s-1`.
    pub const MASS_FLUX: Self = Self::new(1, -2, -1, 0, 0);

    #[must_use]
    pub const fn is_dimensionless(&self) -> bool {
        self.mass == 0
            && self.length == 0
            && self.time == 0
            && self.temperature == 0
            && self.amount == 0
    }

    /// Raises this dimension to an integer power.
    #[must_use]
    pub const fn powi(&self, exp: i8) -> Self {
        Self::new(
            self.mass * exp,
            self.length * exp,
            self.time * exp,
            self.temperature * exp,
            self.amount * exp,
        )
    }
}

impl Mul for Dimension {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        Self::new(
            self.mass + rhs.mass,
            self.length + rhs.length,
            self.time + rhs.time,
            self.temperature + rhs.temperature,
            self.amount + rhs.amount,
        )
    }
}

impl Div for Dimension {
    type Output = Self;

    fn div(self, rhs: Self) -> Self::Output {
        self * rhs.powi(-1)
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_dimensionless() {
            return write!(f, "dimensionless");
        }

        let parts: Vec<String> = [
            (self.mass, "M"),
            (self.length, "L"),
            (self.time, "T"),
            (self.temperature, "Θ"),
            (self.amount, "N"),
        ]
        .into_iter()
        .filter(|(exp, _)| *exp != 0)
        .map(|(exp, sym)| match exp {
            1 => sym.to_string(),
            _ => format!("{sym}^{exp}"),
        })
        .collect();

        write!(f, "{}", parts.join(" "))
    }
}
