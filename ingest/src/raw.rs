use std::collections::BTreeMap;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

/// One trajectory as a caller or a form hands it over. Nothing is checked yet; fields are loose
/// so that validation can report every bad sample instead of the first serde failure.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawTrajectory {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub data: Vec<RawSample>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSample {
    /// A time string or Unix epoch milliseconds
    #[serde(default)]
    pub time: Value,
    /// `[longitude, latitude]`
    #[serde(default)]
    pub coords: Value,
}

impl RawTrajectory {
    pub fn new<S: Into<String>>(id: S, name: S, data: Vec<RawSample>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            color: None,
            data,
        }
    }

    pub fn with_color<S: Into<String>>(mut self, color: S) -> Self {
        self.color = Some(color.into());
        self
    }
}

impl RawSample {
    pub fn new(time: &str, lng: f64, lat: f64) -> Self {
        Self {
            time: Value::String(time.to_string()),
            coords: Value::Array(vec![number(lng), number(lat)]),
        }
    }

    pub fn at_epoch_millis(millis: i64, lng: f64, lat: f64) -> Self {
        Self {
            time: Value::from(millis),
            coords: Value::Array(vec![number(lng), number(lat)]),
        }
    }
}

// JSON can't hold NaN or infinity; those stay strings and fail validation later.
fn number(x: f64) -> Value {
    match Number::from_f64(x) {
        Some(n) => Value::Number(n),
        None => Value::String(x.to_string()),
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    Many(Vec<RawTrajectory>),
    One(RawTrajectory),
}

/// Reads either a single trajectory object or an array of them.
pub fn load_json<R: std::io::Read>(reader: R) -> Result<Vec<RawTrajectory>> {
    let parsed: OneOrMany =
        serde_json::from_reader(reader).context("Trajectory JSON doesn't match the format")?;
    Ok(match parsed {
        OneOrMany::Many(list) => list,
        OneOrMany::One(x) => vec![x],
    })
}

/// One row per sample, grouped into trajectories by id. Samples keep file order; trajectories
/// come out sorted by id.
pub fn load_csv<R: std::io::Read>(reader: R) -> Result<Vec<RawTrajectory>> {
    let mut per_id: BTreeMap<String, RawTrajectory> = BTreeMap::new();
    for (row, rec) in csv::Reader::from_reader(reader).deserialize().enumerate() {
        let rec: Record = rec.with_context(|| format!("Bad CSV row {}", row + 1))?;
        let trajectory = per_id
            .entry(rec.id.clone())
            .or_insert_with(|| RawTrajectory {
                id: rec.id.clone(),
                name: String::new(),
                color: None,
                data: Vec::new(),
            });
        // The first row that bothers to fill these in wins
        if trajectory.name.is_empty() {
            if let Some(name) = rec.name.filter(|x| !x.is_empty()) {
                trajectory.name = name;
            }
        }
        if trajectory.color.is_none() {
            trajectory.color = rec.color.filter(|x| !x.is_empty());
        }
        trajectory.data.push(RawSample {
            time: if rec.time.trim().is_empty() {
                Value::Null
            } else {
                Value::String(rec.time)
            },
            coords: Value::Array(vec![cell(rec.lng), cell(rec.lat)]),
        });
    }
    if per_id.is_empty() {
        warn!("CSV input had no rows");
    }
    Ok(per_id.into_values().collect())
}

fn cell(raw: String) -> Value {
    match raw.trim().parse::<f64>().ok().and_then(Number::from_f64) {
        Some(n) => Value::Number(n),
        None => Value::String(raw),
    }
}

#[derive(Deserialize)]
struct Record {
    id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    color: Option<String>,
    time: String,
    lng: String,
    lat: String,
}
