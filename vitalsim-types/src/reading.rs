//! Reading records emitted by the producers.

use core::fmt;

use crate::{BloodPressureLevel, RateType};

/// A single blood pressure reading.
///
/// Serialized field names match what downstream analytics expect:
/// `Systolic`, `Diastolic` and `BloodPressureLevel`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BloodPressureReading {
    /// Systolic pressure in mmHg.
    #[cfg_attr(feature = "serde", serde(rename = "Systolic"))]
    pub systolic: u16,

    /// Diastolic pressure in mmHg.
    #[cfg_attr(feature = "serde", serde(rename = "Diastolic"))]
    pub diastolic: u16,

    /// Level the values were drawn for.
    #[cfg_attr(feature = "serde", serde(rename = "BloodPressureLevel"))]
    pub level: BloodPressureLevel,
}

impl BloodPressureReading {
    /// Create a reading. No range check is performed; see [`is_consistent`](Self::is_consistent).
    pub const fn new(systolic: u16, diastolic: u16, level: BloodPressureLevel) -> Self {
        Self {
            systolic,
            diastolic,
            level,
        }
    }

    /// Whether both values lie inside the ranges of `level`.
    pub fn is_consistent(&self) -> bool {
        self.level.systolic_range().contains(&self.systolic)
            && self.level.diastolic_range().contains(&self.diastolic)
    }
}

/// A single heart rate reading.
///
/// Serialized as `{"heartRate": .., "rateType": ..}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HeartRateReading {
    /// Beats per minute.
    #[cfg_attr(feature = "serde", serde(rename = "heartRate"))]
    pub heart_rate: u16,

    /// Rate type the value was drawn for.
    #[cfg_attr(feature = "serde", serde(rename = "rateType"))]
    pub rate_type: RateType,
}

impl HeartRateReading {
    /// Create a reading. No range check is performed.
    pub const fn new(heart_rate: u16, rate_type: RateType) -> Self {
        Self {
            heart_rate,
            rate_type,
        }
    }

    /// Whether the heart rate lies inside the range of `rate_type`.
    pub fn is_consistent(&self) -> bool {
        self.rate_type.heart_rate_range().contains(&self.heart_rate)
    }
}

/// Which producer a reading belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum ReadingKind {
    BloodPressure,
    HeartRate,
}

impl ReadingKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BloodPressure => "blood-pressure",
            Self::HeartRate => "heart-rate",
        }
    }
}

impl fmt::Display for ReadingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Either kind of reading.
///
/// Serializes exactly like the wrapped record, with no tag, so a
/// `Reading` on the wire is indistinguishable from the inner type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum Reading {
    BloodPressure(BloodPressureReading),
    HeartRate(HeartRateReading),
}

impl Reading {
    /// The producer kind this reading belongs to.
    pub const fn kind(&self) -> ReadingKind {
        match self {
            Self::BloodPressure(_) => ReadingKind::BloodPressure,
            Self::HeartRate(_) => ReadingKind::HeartRate,
        }
    }

    /// The wire name of the reading's category.
    pub const fn category(&self) -> &'static str {
        match self {
            Self::BloodPressure(r) => r.level.as_str(),
            Self::HeartRate(r) => r.rate_type.as_str(),
        }
    }

    pub fn is_consistent(&self) -> bool {
        match self {
            Self::BloodPressure(r) => r.is_consistent(),
            Self::HeartRate(r) => r.is_consistent(),
        }
    }
}

impl From<BloodPressureReading> for Reading {
    fn from(reading: BloodPressureReading) -> Self {
        Self::BloodPressure(reading)
    }
}

impl From<HeartRateReading> for Reading {
    fn from(reading: HeartRateReading) -> Self {
        Self::HeartRate(reading)
    }
}
