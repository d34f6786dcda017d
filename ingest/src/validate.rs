use chrono::NaiveDateTime;
use serde_json::Value;

use crate::{
    from_epoch_millis, parse_time, LonLat, Problem, RawSample, RawTrajectory, Sample, SampleIssue,
    TrajectoryID, ValidationError,
};

pub const DEFAULT_COLOR: &str = "#FF5722";

/// Everything checked, nothing sorted yet. Samples are in input order.
#[derive(Clone, Debug, PartialEq)]
pub struct ValidTrajectory {
    pub id: TrajectoryID,
    pub name: String,
    pub color: String,
    pub samples: Vec<Sample>,
}

/// Checks every sample and reports all of the bad ones at once. `default_color` fills in a
/// missing color.
pub fn validate(
    raw: &RawTrajectory,
    default_color: &str,
) -> Result<ValidTrajectory, ValidationError> {
    if raw.data.is_empty() {
        return Err(ValidationError::Empty {
            id: raw.id.clone(),
        });
    }

    let mut samples = Vec::with_capacity(raw.data.len());
    let mut issues = Vec::new();
    for (index, sample) in raw.data.iter().enumerate() {
        if let Some(sample) = check_sample(index, sample, &mut issues) {
            samples.push(sample);
        }
    }
    if !issues.is_empty() {
        return Err(ValidationError::MalformedSamples {
            id: raw.id.clone(),
            issues,
        });
    }

    let color = match raw.color {
        Some(ref color) if !color.is_empty() => {
            if !is_hex_color(color) {
                return Err(ValidationError::InvalidColor {
                    id: raw.id.clone(),
                    color: color.clone(),
                });
            }
            color.clone()
        }
        _ => default_color.to_string(),
    };

    Ok(ValidTrajectory {
        id: TrajectoryID(raw.id.clone()),
        name: raw.name.clone(),
        color,
        samples,
    })
}

fn check_sample(index: usize, raw: &RawSample, issues: &mut Vec<SampleIssue>) -> Option<Sample> {
    let before = issues.len();
    let mut report = |problem| issues.push(SampleIssue { index, problem });

    let time = match check_time(&raw.time) {
        Ok(t) => Some(t),
        Err(problem) => {
            report(problem);
            None
        }
    };

    let coords = match raw.coords {
        Value::Null => {
            report(Problem::MissingCoords);
            None
        }
        Value::Array(ref pair) => {
            if pair.len() != 2 {
                report(Problem::WrongArity(pair.len()));
                None
            } else {
                let lng = pair[0].as_f64();
                let lat = pair[1].as_f64();
                if lng.is_none() {
                    report(Problem::NonNumeric(0));
                }
                if lat.is_none() {
                    report(Problem::NonNumeric(1));
                }
                match (lng, lat) {
                    (Some(lng), Some(lat)) => Some(LonLat::new(lng, lat)),
                    _ => None,
                }
            }
        }
        _ => {
            report(Problem::CoordsNotArray);
            None
        }
    };

    if issues.len() != before {
        return None;
    }
    Some(Sample::new(time?, coords?))
}

fn check_time(raw: &Value) -> Result<NaiveDateTime, Problem> {
    match raw {
        Value::Null => Err(Problem::MissingTime),
        Value::String(s) if s.trim().is_empty() => Err(Problem::MissingTime),
        Value::String(s) => parse_time(s).map_err(|_| Problem::BadTime(s.clone())),
        Value::Number(n) => {
            let millis = match n.as_i64() {
                Some(x) => Some(x),
                // Epoch milliseconds written with a fraction
                None => n.as_f64().map(|x| x.round() as i64),
            };
            millis
                .and_then(from_epoch_millis)
                .ok_or_else(|| Problem::BadTime(n.to_string()))
        }
        other => Err(Problem::BadTime(other.to_string())),
    }
}

fn is_hex_color(color: &str) -> bool {
    color.len() == 7
        && color.starts_with('#')
        && color[1..].chars().all(|c| c.is_ascii_hexdigit())
}
