//! Registry of units used by water cycle variables.
//!
//! Each entry stores the dimension of the unit, the factor converting a value in that
//! unit to SI base units, and an offset for units with a shifted origin (`degC`).
//! Symbols may carry an SI prefix (`mm`, `kPa`, `MJ`).

use super::dimension::Dimension;
use std::collections::HashMap;
use std::sync::LazyLock;

pub const SECONDS_PER_MINUTE: f64 = 60.0;
pub const SECONDS_PER_HOUR: f64 = 3600.0;
pub const SECONDS_PER_DAY: f64 = 86400.0;

/// Information about a known unit.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitInfo {
    pub dimension: Dimension,
    /// Multiplier converting a value in this unit to SI base units.
    pub to_si_factor: f64,
    /// Offset added after scaling, non-zero only for shifted temperature scales.
    pub to_si_offset: f64,
}

impl UnitInfo {
    const fn scaled(dimension: Dimension, to_si_factor: f64) -> Self {
        Self {
            dimension,
            to_si_factor,
            to_si_offset: 0.0,
        }
    }
}

/// SI prefixes accepted in front of prefixable symbols, longest first.
const SI_PREFIXES: &[(&str, f64)] = &[
    ("da", 1e1),
    ("G", 1e9),
    ("M", 1e6),
    ("k", 1e3),
    ("h", 1e2),
    ("d", 1e-1),
    ("c", 1e-2),
    ("m", 1e-3),
    ("u", 1e-6),
    ("n", 1e-9),
];

/// The global unit registry.
pub static UNIT_REGISTRY: LazyLock<UnitRegistry> = LazyLock::new(UnitRegistry::new);

#[derive(Debug)]
pub struct UnitRegistry {
    units: HashMap<&'static str, UnitInfo>,
    aliases: HashMap<&'static str, &'static str>,
    /// Symbols that may be combined with an SI prefix.
    prefixable: Vec<&'static str>,
}

impl Default for UnitRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl UnitRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            units: HashMap::new(),
            aliases: HashMap::new(),
            prefixable: vec![],
        };
        registry.register_base_units();
        registry.register_time_units();
        registry.register_derived_units();
        registry
    }

    /// Looks up a symbol, resolving aliases and SI prefixes.
    pub fn lookup(&self, symbol: &str) -> Option<UnitInfo> {
        let canonical = self.aliases.get(symbol).copied().unwrap_or(symbol);
        if let Some(info) = self.units.get(canonical) {
            return Some(info.clone());
        }

        SI_PREFIXES.iter().find_map(|(prefix, factor)| {
            let base = symbol.strip_prefix(prefix)?;
            if !self.prefixable.contains(&base) {
                return None;
            }
            let info = self.units.get(base)?;
            Some(UnitInfo::scaled(info.dimension, info.to_si_factor * factor))
        })
    }

    fn insert(&mut self, symbol: &'static str, info: UnitInfo, prefixable: bool) {
        self.units.insert(symbol, info);
        if prefixable {
            self.prefixable.push(symbol);
        }
    }

    fn register_base_units(&mut self) {
        self.insert("kg", UnitInfo::scaled(Dimension::MASS, 1.0), false);
        self.insert("g", UnitInfo::scaled(Dimension::MASS, 1e-3), true);
        self.insert("t", UnitInfo::scaled(Dimension::MASS, 1e3), false);
        self.insert("m", UnitInfo::scaled(Dimension::LENGTH, 1.0), true);
        self.insert("s", UnitInfo::scaled(Dimension::TIME, 1.0), false);
        self.insert("K", UnitInfo::scaled(Dimension::TEMPERATURE, 1.0), false);
        self.insert(
            "degC",
            UnitInfo {
                dimension: Dimension::TEMPERATURE,
                to_si_factor: 1.0,
                to_si_offset: 273.15,
            },
            false,
        );
        self.insert("mol", UnitInfo::scaled(Dimension::AMOUNT, 1.0), true);
        self.insert("1", UnitInfo::scaled(Dimension::DIMENSIONLESS, 1.0), false);

        self.aliases.insert("dimensionless", "1");
        self.aliases.insert("celsius", "degC");
        self.aliases.insert("degrees_Celsius", "degC");
        self.aliases.insert("kelvin", "K");
        self.aliases.insert("metre", "m");
        self.aliases.insert("meter", "m");
    }

    fn register_time_units(&mut self) {
        self.insert(
            "min",
            UnitInfo::scaled(Dimension::TIME, SECONDS_PER_MINUTE),
            false,
        );
        self.insert("h", UnitInfo::scaled(Dimension::TIME, SECONDS_PER_HOUR), false);
        self.insert("d", UnitInfo::scaled(Dimension::TIME, SECONDS_PER_DAY), false);

        for alias in ["sec", "second", "seconds"] {
            self.aliases.insert(alias, "s");
        }
        for alias in ["minute", "minutes"] {
            self.aliases.insert(alias, "min");
        }
        for alias in ["hr", "hour", "hours"] {
            self.aliases.insert(alias, "h");
        }
        for alias in ["day", "days"] {
            self.aliases.insert(alias, "d");
        }
    }

    fn register_derived_units(&mut self) {
        self.insert("N", UnitInfo::scaled(Dimension::FORCE, 1.0), true);
        self.insert("J", UnitInfo::scaled(Dimension::ENERGY, 1.0), true);
        self.insert("W", UnitInfo::scaled(Dimension::POWER, 1.0), true);
        self.insert("Pa", UnitInfo::scaled(Dimension::PRESSURE, 1.0), true);
        self.insert("L", UnitInfo::scaled(Dimension::LENGTH.powi(3), 1e-3), false);
        self.aliases.insert("litre", "L");
    }
}
