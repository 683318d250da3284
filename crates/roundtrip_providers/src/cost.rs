use std::{
    cmp::Ordering,
    fmt::Display,
    iter::Sum,
    ops::{Add, AddAssign},
};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Travel cost between two locations, in seconds or meters depending on the
/// provider's metric.
///
/// `Unreachable` means no feasible path exists. It orders after every finite
/// cost and absorbs any addition, so a sum over a path that crosses an
/// unreachable edge stays unreachable.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub enum Cost {
    Finite(f64),
    Unreachable,
}

impl Cost {
    pub const ZERO: Cost = Cost::Finite(0.0);

    /// Wraps an upstream value. Routing libraries report "no path" as an
    /// infinite value, which becomes `Unreachable`, as do NaN and negative
    /// values.
    pub fn new(value: f64) -> Self {
        if value.is_finite() && value >= 0.0 {
            Cost::Finite(value)
        } else {
            Cost::Unreachable
        }
    }

    pub fn is_unreachable(&self) -> bool {
        matches!(self, Cost::Unreachable)
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            Cost::Finite(value) => Some(*value),
            Cost::Unreachable => None,
        }
    }

    pub fn value_or(&self, unreachable: f64) -> f64 {
        self.value().unwrap_or(unreachable)
    }

    /// Total order: finite costs by `f64::total_cmp`, then `Unreachable`.
    pub fn total_cmp(&self, other: &Cost) -> Ordering {
        match (self, other) {
            (Cost::Finite(a), Cost::Finite(b)) => a.total_cmp(b),
            (Cost::Finite(_), Cost::Unreachable) => Ordering::Less,
            (Cost::Unreachable, Cost::Finite(_)) => Ordering::Greater,
            (Cost::Unreachable, Cost::Unreachable) => Ordering::Equal,
        }
    }
}

impl Default for Cost {
    fn default() -> Self {
        Cost::ZERO
    }
}

impl Add for Cost {
    type Output = Cost;

    fn add(self, rhs: Cost) -> Self::Output {
        match (self, rhs) {
            (Cost::Finite(a), Cost::Finite(b)) => Cost::Finite(a + b),
            _ => Cost::Unreachable,
        }
    }
}

impl AddAssign for Cost {
    fn add_assign(&mut self, rhs: Cost) {
        *self = *self + rhs;
    }
}

impl Sum for Cost {
    fn sum<I: Iterator<Item = Cost>>(iter: I) -> Self {
        iter.fold(Cost::ZERO, Add::add)
    }
}

impl Display for Cost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Cost::Finite(value) => write!(f, "{value:.1}"),
            Cost::Unreachable => write!(f, "unreachable"),
        }
    }
}

// Unreachable is written as `null`, JSON has no infinity.
impl Serialize for Cost {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Cost {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<f64>::deserialize(deserializer)?;
        Ok(value.map_or(Cost::Unreachable, Cost::new))
    }
}
