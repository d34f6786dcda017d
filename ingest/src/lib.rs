//! Reads raw trajectory input and turns it into validated, typed samples. Nothing here knows
//! about playback.

#[macro_use]
extern crate anyhow;
#[macro_use]
extern crate log;

mod error;
mod raw;
mod time;
mod validate;

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

pub use error::{Problem, SampleIssue, ValidationError};
pub use raw::{load_csv, load_json, RawSample, RawTrajectory};
pub use time::{from_epoch_millis, millis_between, parse_time};
pub use validate::{validate, ValidTrajectory, DEFAULT_COLOR};

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TrajectoryID(pub String);

impl TrajectoryID {
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TrajectoryID {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TrajectoryID {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Longitude first, always.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LonLat {
    pub lng: f64,
    pub lat: f64,
}

impl LonLat {
    pub fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }
}

impl fmt::Display for LonLat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lng, self.lat)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sample {
    pub time: NaiveDateTime,
    pub coords: LonLat,
}

impl Sample {
    pub fn new(time: NaiveDateTime, coords: LonLat) -> Self {
        Self { time, coords }
    }
}
