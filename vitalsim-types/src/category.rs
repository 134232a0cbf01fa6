//! Reading categories and the value ranges they imply.

use core::fmt;
use core::ops::RangeInclusive;
use core::str::FromStr;

/// Classification of a blood pressure reading.
///
/// Each level owns the inclusive ranges its systolic and diastolic
/// values are drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "UPPERCASE"))]
pub enum BloodPressureLevel {
    /// Systolic 90-120, diastolic 60-80.
    Normal,
    /// Systolic 130-200, diastolic 90-150.
    High,
    /// Systolic 50-80, diastolic 30-50.
    Low,
}

impl BloodPressureLevel {
    /// All levels, in declaration order.
    pub const ALL: [BloodPressureLevel; 3] = [Self::Normal, Self::High, Self::Low];

    /// Inclusive systolic range for this level.
    pub const fn systolic_range(self) -> RangeInclusive<u16> {
        match self {
            Self::Normal => 90..=120,
            Self::High => 130..=200,
            Self::Low => 50..=80,
        }
    }

    /// Inclusive diastolic range for this level.
    pub const fn diastolic_range(self) -> RangeInclusive<u16> {
        match self {
            Self::Normal => 60..=80,
            Self::High => 90..=150,
            Self::Low => 30..=50,
        }
    }

    /// The wire name of this level.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "NORMAL",
            Self::High => "HIGH",
            Self::Low => "LOW",
        }
    }
}

impl fmt::Display for BloodPressureLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BloodPressureLevel {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "NORMAL" => Ok(Self::Normal),
            "HIGH" => Ok(Self::High),
            "LOW" => Ok(Self::Low),
            _ => Err(ParseCategoryError::new("blood pressure level", s)),
        }
    }
}

/// Classification of a heart rate reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "UPPERCASE"))]
pub enum RateType {
    /// Heart rate 200-220.
    Normal,
    /// Heart rate 450-490.
    High,
}

impl RateType {
    /// All rate types, in declaration order.
    pub const ALL: [RateType; 2] = [Self::Normal, Self::High];

    /// Inclusive heart rate range for this rate type.
    pub const fn heart_rate_range(self) -> RangeInclusive<u16> {
        match self {
            Self::Normal => 200..=220,
            Self::High => 450..=490,
        }
    }

    /// The wire name of this rate type.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "NORMAL",
            Self::High => "HIGH",
        }
    }
}

impl fmt::Display for RateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RateType {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "NORMAL" => Ok(Self::Normal),
            "HIGH" => Ok(Self::High),
            _ => Err(ParseCategoryError::new("rate type", s)),
        }
    }
}

/// Error returned when a category name cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseCategoryError {
    kind: &'static str,
    input: String,
}

impl ParseCategoryError {
    fn new(kind: &'static str, input: &str) -> Self {
        Self {
            kind,
            input: input.to_string(),
        }
    }

    /// The rejected input.
    pub fn input(&self) -> &str {
        &self.input
    }
}

impl fmt::Display for ParseCategoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {}: {:?}", self.kind, self.input)
    }
}

impl std::error::Error for ParseCategoryError {}
