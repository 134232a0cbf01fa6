//! # vitalsim-types
//!
//! Record types for synthetic vital-sign readings. This crate defines the
//! wire shape of every record a vitalsim producer emits, together with the
//! value ranges each category is allowed to take.
//!
//! ## Design Goals
//!
//! - **Zero required dependencies**: Core types work without any serialization framework
//! - **Optional serialization**: Enable the `serde` feature for JSON output
//! - **Ranges live with categories**: A category knows its own inclusive bounds,
//!   so generators and validators can never disagree
//!
//! ## Features
//!
//! - `serde`: JSON/etc. serialization via serde, using the field names
//!   downstream consumers expect (`Systolic`, `heartRate`, ...)
//!
//! ## Example
//!
//! ```rust
//! use vitalsim_types::{BloodPressureLevel, BloodPressureReading};
//!
//! let reading = BloodPressureReading::new(110, 70, BloodPressureLevel::Normal);
//! assert!(reading.is_consistent());
//!
//! assert_eq!(BloodPressureLevel::Low.systolic_range(), 50..=80);
//! ```

mod category;
mod reading;

pub use category::*;
pub use reading::*;
