// pf-core/src/measure.rs

use core::fmt;

use uom::si::f64::{MassRate as UomMassRate, Pressure as UomPressure};

use crate::error::{PfError, PfResult};

/// Floating point type used throughout system
pub type Real = f64;

/// Absolute/relative tolerance pair for comparing reported quantities.
#[derive(Clone, Copy, Debug)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-12,
            rel: 1e-9,
        }
    }
}

impl Tolerances {
    /// Looser tolerance for reported (metered/allocated) flows, which are
    /// rounded by the reporting system.
    pub fn reported() -> Self {
        Self {
            abs: 1e-6,
            rel: 1e-6,
        }
    }
}

pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    diff <= tol.abs || diff <= tol.rel * a.abs().max(b.abs())
}

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, PfError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(PfError::NonFinite { what, value: v })
    }
}

// Canonical typed quantities (SI, f64) used when a consumer checks node invariants.
pub type MassRate = UomMassRate;
pub type Pressure = UomPressure;

#[inline]
pub fn kgps(v: f64) -> MassRate {
    use uom::si::mass_rate::kilogram_per_second;
    MassRate::new::<kilogram_per_second>(v)
}

#[inline]
pub fn pa(v: f64) -> Pressure {
    use uom::si::pressure::pascal;
    Pressure::new::<pascal>(v)
}

/// Opaque measured value as exchanged in documents: a number plus the
/// unit-of-measure symbol it was reported in.
#[derive(Debug, Clone, PartialEq)]
pub struct Measure {
    pub value: Real,
    pub uom: String,
}

impl Measure {
    pub fn new(value: Real, uom: impl Into<String>) -> PfResult<Self> {
        let uom = uom.into();
        if uom.trim().is_empty() {
            return Err(PfError::InvalidArg {
                what: "measure needs a unit of measure",
            });
        }
        Ok(Self {
            value: ensure_finite(value, "measure value")?,
            uom,
        })
    }

    /// Interpret as a mass rate, if the unit is one of the common mass-rate symbols.
    pub fn as_mass_rate(&self) -> Option<MassRate> {
        let per_second = match self.uom.as_str() {
            "kg/s" => 1.0,
            "kg/min" => 1.0 / 60.0,
            "kg/h" => 1.0 / 3_600.0,
            "kg/d" => 1.0 / 86_400.0,
            "t/h" => 1_000.0 / 3_600.0,
            "t/d" => 1_000.0 / 86_400.0,
            _ => return None,
        };
        Some(kgps(self.value * per_second))
    }

    /// Interpret as a pressure, if the unit is one of the common pressure symbols.
    pub fn as_pressure(&self) -> Option<Pressure> {
        let pascals = match self.uom.as_str() {
            "Pa" => 1.0,
            "kPa" => 1e3,
            "MPa" => 1e6,
            "bar" => 1e5,
            "psi" => 6_894.757_293_168,
            _ => return None,
        };
        Some(pa(self.value * pascals))
    }
}

impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.uom)
    }
}
