// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.
#![allow(clippy::as_conversions, clippy::float_cmp)]

use core::cmp::Ordering;
use core::fmt::{self, Debug, Formatter};
use core::str::FromStr;

use serde::ser::Serializer;
use serde::Serialize;

const F64_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0; // 2^53

/// Numeric payload of a [`crate::Value`].
///
/// Integers are kept exact; anything with a fraction or exponent is a float.
#[derive(Clone, Copy)]
pub enum Number {
    UInt(u64),
    Int(i64),
    Float(f64),
}

impl Number {
    fn to_f64_lossy(self) -> f64 {
        match self {
            Number::UInt(v) => v as f64,
            Number::Int(v) => v as f64,
            Number::Float(f) => f,
        }
    }

    pub fn is_integer(&self) -> bool {
        match self {
            Number::UInt(_) | Number::Int(_) => true,
            Number::Float(f) => f.is_finite() && f.fract() == 0.0,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match *self {
            Number::UInt(v) => Some(v),
            Number::Int(v) => u64::try_from(v).ok(),
            Number::Float(f) => {
                if f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f <= F64_SAFE_INTEGER {
                    Some(f as u64)
                } else {
                    None
                }
            }
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Number::UInt(v) => i64::try_from(v).ok(),
            Number::Int(v) => Some(v),
            Number::Float(f) => {
                if f.is_finite() && f.fract() == 0.0 && f.abs() <= F64_SAFE_INTEGER {
                    Some(f as i64)
                } else {
                    None
                }
            }
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Number::Float(f) if f.is_finite() => Some(f),
            Number::Float(_) => None,
            Number::UInt(v) if v as f64 <= F64_SAFE_INTEGER => Some(v as f64),
            Number::Int(v) if (v as f64).abs() <= F64_SAFE_INTEGER => Some(v as f64),
            _ => None,
        }
    }
}

impl Debug for Number {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Number::UInt(v) => write!(f, "{v}"),
            Number::Int(v) => write!(f, "{v}"),
            // Integral floats are written without a fractional part.
            Number::Float(v) if self.is_integer() && v.abs() <= F64_SAFE_INTEGER => {
                write!(f, "{}", *v as i64)
            }
            Number::Float(v) => write!(f, "{v}"),
        }
    }
}

impl Serialize for Number {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match *self {
            Number::UInt(v) => serializer.serialize_u64(v),
            Number::Int(v) => serializer.serialize_i64(v),
            Number::Float(_) => match self.as_i64() {
                Some(i) => serializer.serialize_i64(i),
                None => serializer.serialize_f64(self.to_f64_lossy()),
            },
        }
    }
}

impl From<u64> for Number {
    fn from(value: u64) -> Self {
        Number::UInt(value)
    }
}

impl From<usize> for Number {
    fn from(value: usize) -> Self {
        Number::UInt(value as u64)
    }
}

impl From<i64> for Number {
    fn from(value: i64) -> Self {
        if value >= 0 {
            Number::UInt(value as u64)
        } else {
            Number::Int(value)
        }
    }
}

impl From<f64> for Number {
    fn from(value: f64) -> Self {
        Number::Float(value)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct ParseNumberError;

impl fmt::Display for ParseNumberError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("invalid number")
    }
}

impl FromStr for Number {
    type Err = ParseNumberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ParseNumberError);
        }

        let is_integer_literal = !trimmed.contains(['.', 'e', 'E']);
        if is_integer_literal {
            if let Ok(v) = trimmed.parse::<u64>() {
                return Ok(Number::UInt(v));
            }
            if let Ok(v) = trimmed.parse::<i64>() {
                return Ok(Number::Int(v));
            }
        }

        trimmed
            .parse::<f64>()
            .map(Number::Float)
            .map_err(|_| ParseNumberError)
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Number::Float(_), _) | (_, Number::Float(_)) => {
                let (a, b) = (self.to_f64_lossy(), other.to_f64_lossy());
                !a.is_nan() && a == b
            }
            _ => self.as_i64() == other.as_i64() && self.as_u64() == other.as_u64(),
        }
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self.as_i64(), other.as_i64()) {
            (Some(a), Some(b)) if self.is_integer() && other.is_integer() => Some(a.cmp(&b)),
            _ => self.to_f64_lossy().partial_cmp(&other.to_f64_lossy()),
        }
    }
}
