//! Fixed-point math utilities for deterministic scoring.
//!
//! Every score the engine produces is computed in fixed-point so that two
//! hosts evaluating the same snapshot reach the same decision bit for bit.
//! Arithmetic on the scoring path saturates instead of overflowing, which
//! keeps every intermediate value finite.

use serde::{Deserialize, Serialize};

/// Fixed-point number type for all scoring math.
///
/// Uses 32 bits for integer part and 32 bits for fractional part.
/// Range: approximately -2,147,483,648 to 2,147,483,647
/// Precision: approximately 0.00000000023
pub type Fixed = fixed::types::I32F32;

const FRAC_BITS: u32 = 32;

/// Build a fixed-point constant from an integer fraction `num / den`.
///
/// Usable in `const` position, unlike `Fixed::from_num`. Rounds to the
/// nearest representable value, matching `Fixed::from_str`.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub const fn ratio(num: i64, den: i64) -> Fixed {
    let (num, den) = if den < 0 {
        (-((num as i128) << FRAC_BITS), -(den as i128))
    } else {
        ((num as i128) << FRAC_BITS, den as i128)
    };
    let rounded = if num >= 0 {
        (num + den / 2) / den
    } else {
        (num - den / 2) / den
    };
    Fixed::from_bits(rounded as i64)
}

/// Divide `num` by `den`, saturating instead of faulting.
///
/// A zero denominator yields the sentinel `Fixed::MAX` (or `Fixed::MIN` for
/// a negative numerator), so comparisons against the result stay defined.
#[must_use]
pub fn saturating_ratio(num: Fixed, den: Fixed) -> Fixed {
    if den == Fixed::ZERO {
        if num < Fixed::ZERO {
            Fixed::MIN
        } else {
            Fixed::MAX
        }
    } else {
        num.saturating_div(den)
    }
}

/// Fixed-point 2D vector, used for capital positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Vec2Fixed {
    /// X coordinate.
    #[serde(with = "fixed_serde")]
    pub x: Fixed,
    /// Y coordinate.
    #[serde(with = "fixed_serde")]
    pub y: Fixed,
}

impl Vec2Fixed {
    /// Create a new fixed-point vector.
    #[must_use]
    pub const fn new(x: Fixed, y: Fixed) -> Self {
        Self { x, y }
    }

    /// Zero vector.
    pub const ZERO: Self = Self {
        x: Fixed::ZERO,
        y: Fixed::ZERO,
    };

    /// Squared distance, saturating on very distant points.
    #[must_use]
    pub fn distance_squared(self, other: Self) -> Fixed {
        let dx = self.x.saturating_sub(other.x);
        let dy = self.y.saturating_sub(other.y);
        dx.saturating_mul(dx).saturating_add(dy.saturating_mul(dy))
    }

    /// Euclidean distance.
    #[must_use]
    pub fn distance(self, other: Self) -> Fixed {
        fixed_sqrt(self.distance_squared(other))
    }
}

/// Computes the square root of a fixed-point number using binary search.
#[must_use]
pub fn fixed_sqrt(value: Fixed) -> Fixed {
    if value <= Fixed::ZERO {
        return Fixed::ZERO;
    }

    let mut low = Fixed::ZERO;
    let mut high = if value > Fixed::ONE { value } else { Fixed::ONE };

    // 64 halvings reach the last fractional bit for any representable input.
    for _ in 0..64 {
        let mid = low + (high - low) / 2;
        if mid == low {
            break;
        }

        if mid.saturating_mul(mid) <= value {
            low = mid;
        } else {
            high = mid;
        }
    }

    low
}

/// Serde support for fixed-point numbers.
///
/// Human-readable formats (RON, JSON) carry the decimal value, so parameter
/// files read `military_weight: 0.5` or `military_weight: "0.5"`. Binary
/// formats carry the raw bit representation (i64) to preserve exact
/// precision across snapshot handoff.
pub mod fixed_serde {
    use std::fmt;

    use serde::de::{self, Visitor};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::Fixed;

    /// Serialize a fixed-point number.
    pub fn serialize<S>(value: &Fixed, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if serializer.is_human_readable() {
            serializer.collect_str(value)
        } else {
            value.to_bits().serialize(serializer)
        }
    }

    /// Deserialize a fixed-point number.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Fixed, D::Error>
    where
        D: Deserializer<'de>,
    {
        if deserializer.is_human_readable() {
            deserializer.deserialize_any(DecimalVisitor)
        } else {
            let bits = i64::deserialize(deserializer)?;
            Ok(Fixed::from_bits(bits))
        }
    }

    struct DecimalVisitor;

    impl<'de> Visitor<'de> for DecimalVisitor {
        type Value = Fixed;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a decimal number or a decimal string")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Fixed, E> {
            Fixed::from_str(v.trim()).map_err(E::custom)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Fixed, E> {
            Fixed::checked_from_num(v).ok_or_else(|| E::custom(format!("{v} is out of range")))
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Fixed, E> {
            Fixed::checked_from_num(v).ok_or_else(|| E::custom(format!("{v} is out of range")))
        }

        // Floats only appear at the load boundary; the conversion itself is exact
        // up to the fractional precision and identical on every platform.
        fn visit_f64<E: de::Error>(self, v: f64) -> Result<Fixed, E> {
            Fixed::checked_from_num(v).ok_or_else(|| E::custom(format!("{v} is out of range")))
        }
    }
}

/// Serde support for `Option<Fixed>`.
///
/// Same representation as [`fixed_serde`], with `None` kept as a serialized
/// `None` value.
pub mod option_fixed_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::Fixed;

    #[derive(Serialize, Deserialize)]
    #[serde(transparent)]
    struct Repr(#[serde(with = "super::fixed_serde")] Fixed);

    /// Serialize an optional fixed-point number.
    pub fn serialize<S>(value: &Option<Fixed>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        value.map(Repr).serialize(serializer)
    }

    /// Deserialize an optional fixed-point number.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Fixed>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let opt = Option::<Repr>::deserialize(deserializer)?;
        Ok(opt.map(|repr| repr.0))
    }
}
