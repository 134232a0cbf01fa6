//! Reading generators.
//!
//! A generator turns one uniform draw in `[0, 1)` into a category, then
//! draws the numeric fields from that category's inclusive ranges. The two
//! steps are exposed separately so callers can pin the category draw.

use std::fmt::Debug;

use rand::Rng;
use serde::{Deserialize, Serialize};
use vitalsim_types::{
    BloodPressureLevel, BloodPressureReading, HeartRateReading, RateType, Reading, ReadingKind,
};

use crate::ProducerError;

/// A source of synthetic readings.
pub trait Generator: Send + Sync + Debug + 'static {
    /// Category type selected by [`classify`](Self::classify).
    type Category: Copy + Debug + Send + 'static;

    /// The record type emitted to the sink.
    type Record: Serialize + Copy + Debug + Send + Into<Reading> + 'static;

    /// Which producer this generator drives.
    fn kind(&self) -> ReadingKind;

    /// Producer name, e.g. `"blood-pressure"`.
    fn name(&self) -> &'static str {
        self.kind().as_str()
    }

    /// Map a uniform draw in `[0, 1)` to a category.
    fn classify(&self, r: f64) -> Self::Category;

    /// Draw a record for a given category.
    fn reading_for<R: Rng>(&self, category: Self::Category, rng: &mut R) -> Self::Record;

    /// The category carried by `reading`, or `None` if it belongs to
    /// another producer.
    fn category_of(&self, reading: &Reading) -> Option<Self::Category>;

    /// Draw a category, then a record for it.
    fn generate<R: Rng>(&self, rng: &mut R) -> Self::Record {
        let r: f64 = rng.random();
        let category = self.classify(r);
        self.reading_for(category, rng)
    }
}

/// Probability cut-offs for blood pressure levels.
///
/// A draw below `low` is LOW, above `high` is HIGH, anything in between
/// (inclusive at both ends) is NORMAL.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BloodPressureThresholds {
    pub low: f64,
    pub high: f64,
}

impl BloodPressureThresholds {
    pub fn validate(&self) -> Result<(), ProducerError> {
        if !(0.0..=1.0).contains(&self.low) || !(0.0..=1.0).contains(&self.high) {
            return Err(ProducerError::Config(format!(
                "blood pressure thresholds must lie in [0, 1], got low={} high={}",
                self.low, self.high
            )));
        }
        if self.low > self.high {
            return Err(ProducerError::Config(format!(
                "low threshold {} exceeds high threshold {}",
                self.low, self.high
            )));
        }
        Ok(())
    }
}

impl Default for BloodPressureThresholds {
    fn default() -> Self {
        Self {
            low: 0.005,
            high: 0.995,
        }
    }
}

/// Probability cut-off for HIGH heart rate readings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeartRateThresholds {
    pub high: f64,
}

impl HeartRateThresholds {
    pub fn validate(&self) -> Result<(), ProducerError> {
        if !(0.0..=1.0).contains(&self.high) {
            return Err(ProducerError::Config(format!(
                "heart rate threshold must lie in [0, 1], got {}",
                self.high
            )));
        }
        Ok(())
    }
}

impl Default for HeartRateThresholds {
    fn default() -> Self {
        Self { high: 0.01 }
    }
}

/// Generates [`BloodPressureReading`]s.
///
/// # Example
///
/// ```rust
/// use rand::{rngs::StdRng, SeedableRng};
/// use vitalsim_sdk::{BloodPressureGenerator, BloodPressureLevel, Generator};
///
/// let generator = BloodPressureGenerator::new();
/// assert_eq!(generator.classify(0.003), BloodPressureLevel::Low);
///
/// let mut rng = StdRng::seed_from_u64(7);
/// let reading = generator.generate(&mut rng);
/// assert!(reading.is_consistent());
/// ```
#[derive(Debug, Clone, Default)]
pub struct BloodPressureGenerator {
    thresholds: BloodPressureThresholds,
}

impl BloodPressureGenerator {
    /// Generator with the default 0.5% LOW / 0.5% HIGH split.
    pub fn new() -> Self {
        Self::default()
    }

    /// Generator with custom thresholds.
    pub fn with_thresholds(thresholds: BloodPressureThresholds) -> Result<Self, ProducerError> {
        thresholds.validate()?;
        Ok(Self { thresholds })
    }

    pub fn thresholds(&self) -> BloodPressureThresholds {
        self.thresholds
    }
}

impl Generator for BloodPressureGenerator {
    type Category = BloodPressureLevel;
    type Record = BloodPressureReading;

    fn kind(&self) -> ReadingKind {
        ReadingKind::BloodPressure
    }

    fn classify(&self, r: f64) -> BloodPressureLevel {
        if r < self.thresholds.low {
            BloodPressureLevel::Low
        } else if r > self.thresholds.high {
            BloodPressureLevel::High
        } else {
            BloodPressureLevel::Normal
        }
    }

    fn reading_for<R: Rng>(&self, level: BloodPressureLevel, rng: &mut R) -> BloodPressureReading {
        let systolic = rng.random_range(level.systolic_range());
        let diastolic = rng.random_range(level.diastolic_range());
        BloodPressureReading::new(systolic, diastolic, level)
    }

    fn category_of(&self, reading: &Reading) -> Option<BloodPressureLevel> {
        match reading {
            Reading::BloodPressure(r) => Some(r.level),
            Reading::HeartRate(_) => None,
        }
    }
}

/// Generates [`HeartRateReading`]s.
#[derive(Debug, Clone, Default)]
pub struct HeartRateGenerator {
    thresholds: HeartRateThresholds,
}

impl HeartRateGenerator {
    /// Generator with the default 1% HIGH split.
    pub fn new() -> Self {
        Self::default()
    }

    /// Generator with a custom HIGH threshold.
    pub fn with_thresholds(thresholds: HeartRateThresholds) -> Result<Self, ProducerError> {
        thresholds.validate()?;
        Ok(Self { thresholds })
    }

    pub fn thresholds(&self) -> HeartRateThresholds {
        self.thresholds
    }
}

impl Generator for HeartRateGenerator {
    type Category = RateType;
    type Record = HeartRateReading;

    fn kind(&self) -> ReadingKind {
        ReadingKind::HeartRate
    }

    fn classify(&self, r: f64) -> RateType {
        if r < self.thresholds.high {
            RateType::High
        } else {
            RateType::Normal
        }
    }

    fn reading_for<R: Rng>(&self, rate_type: RateType, rng: &mut R) -> HeartRateReading {
        let heart_rate = rng.random_range(rate_type.heart_rate_range());
        HeartRateReading::new(heart_rate, rate_type)
    }

    fn category_of(&self, reading: &Reading) -> Option<RateType> {
        match reading {
            Reading::HeartRate(r) => Some(r.rate_type),
            Reading::BloodPressure(_) => None,
        }
    }
}
