use std::fmt;

/// The only error the engine raises. It always comes out of validation, before anything is
/// stored.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("trajectory {id:?} has no samples")]
    Empty { id: String },

    #[error("trajectory {id:?} has color {color:?}, expected #RRGGBB")]
    InvalidColor { id: String, color: String },

    #[error(
        "trajectory {id:?} has {} malformed sample(s): {}",
        .issues.len(),
        describe(.issues)
    )]
    MalformedSamples { id: String, issues: Vec<SampleIssue> },
}

impl ValidationError {
    pub fn trajectory_id(&self) -> &str {
        match self {
            ValidationError::Empty { id }
            | ValidationError::InvalidColor { id, .. }
            | ValidationError::MalformedSamples { id, .. } => id,
        }
    }

    /// Indices of every offending sample, ascending and deduplicated.
    pub fn sample_indices(&self) -> Vec<usize> {
        match self {
            ValidationError::MalformedSamples { issues, .. } => {
                let mut indices: Vec<usize> = issues.iter().map(|x| x.index).collect();
                indices.dedup();
                indices
            }
            _ => Vec::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SampleIssue {
    pub index: usize,
    pub problem: Problem,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Problem {
    MissingTime,
    BadTime(String),
    MissingCoords,
    CoordsNotArray,
    WrongArity(usize),
    /// Which axis, 0 for longitude and 1 for latitude
    NonNumeric(usize),
}

impl fmt::Display for SampleIssue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.problem {
            Problem::MissingTime => write!(f, "#{} is missing time", self.index),
            Problem::BadTime(raw) => write!(f, "#{} has unparseable time {}", self.index, raw),
            Problem::MissingCoords => write!(f, "#{} is missing coords", self.index),
            Problem::CoordsNotArray => write!(f, "#{} coords aren't an array", self.index),
            Problem::WrongArity(n) => {
                write!(f, "#{} has {} coordinates instead of 2", self.index, n)
            }
            Problem::NonNumeric(axis) => {
                let axis = if *axis == 0 { "longitude" } else { "latitude" };
                write!(f, "#{} has a non-numeric {}", self.index, axis)
            }
        }
    }
}

fn describe(issues: &[SampleIssue]) -> String {
    issues
        .iter()
        .map(|x| x.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_lists_every_issue() {
        let err = ValidationError::MalformedSamples {
            id: "bus".to_string(),
            issues: vec![
                SampleIssue {
                    index: 1,
                    problem: Problem::MissingTime,
                },
                SampleIssue {
                    index: 1,
                    problem: Problem::WrongArity(3),
                },
                SampleIssue {
                    index: 4,
                    problem: Problem::NonNumeric(1),
                },
            ],
        };
        assert_eq!(
            err.to_string(),
            "trajectory \"bus\" has 3 malformed sample(s): #1 is missing time, \
             #1 has 3 coordinates instead of 2, #4 has a non-numeric latitude"
        );
        assert_eq!(err.sample_indices(), vec![1, 4]);
        assert_eq!(err.trajectory_id(), "bus");
    }
}
