use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use geojson::FeatureCollection;

use ingest::{RawTrajectory, TrajectoryID, ValidationError, DEFAULT_COLOR};

use crate::Trajectory;

/// Owns every loaded trajectory, keyed by id.
pub struct TrajectoryStore {
    trajectories: BTreeMap<TrajectoryID, Trajectory>,
    default_color: String,
}

impl TrajectoryStore {
    pub fn new() -> Self {
        Self::with_default_color(DEFAULT_COLOR)
    }

    pub fn with_default_color(color: &str) -> Self {
        Self {
            trajectories: BTreeMap::new(),
            default_color: color.to_string(),
        }
    }

    /// Validates, sorts, and stores. On failure nothing changes. An existing trajectory with the
    /// same id is replaced.
    pub fn add(&mut self, raw: &RawTrajectory) -> Result<&Trajectory, ValidationError> {
        let trajectory = Trajectory::from_raw(raw, &self.default_color)?;
        let id = trajectory.id.clone();
        self.insert(trajectory);
        Ok(&self.trajectories[&id])
    }

    /// Returns whatever had the same id before.
    pub fn insert(&mut self, trajectory: Trajectory) -> Option<Trajectory> {
        let id = trajectory.id.clone();
        let prev = self.trajectories.insert(id.clone(), trajectory);
        if prev.is_some() {
            info!("Replaced trajectory {}", id);
        }
        prev
    }

    pub fn remove(&mut self, id: &TrajectoryID) -> Option<Trajectory> {
        self.trajectories.remove(id)
    }

    /// False if there's no such trajectory
    pub fn set_visible(&mut self, id: &TrajectoryID, visible: bool) -> bool {
        match self.trajectories.get_mut(id) {
            Some(trajectory) => {
                trajectory.visible = visible;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, id: &TrajectoryID) -> Option<&Trajectory> {
        self.trajectories.get(id)
    }

    /// In id order
    pub fn list(&self) -> impl Iterator<Item = &Trajectory> {
        self.trajectories.values()
    }

    pub fn len(&self) -> usize {
        self.trajectories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trajectories.is_empty()
    }

    pub fn clear(&mut self) {
        self.trajectories.clear();
    }

    /// Earliest first sample and latest last sample over everything, hidden trajectories
    /// included.
    pub fn time_span(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        let mut span: Option<(NaiveDateTime, NaiveDateTime)> = None;
        for trajectory in self.trajectories.values() {
            let (t1, t2) = (trajectory.start_time(), trajectory.end_time());
            span = Some(match span {
                Some((start, end)) => (start.min(t1), end.max(t2)),
                None => (t1, t2),
            });
        }
        span
    }

    pub fn to_feature_collection(&self) -> FeatureCollection {
        FeatureCollection {
            bbox: None,
            features: self.trajectories.values().map(|t| t.to_geojson()).collect(),
            foreign_members: None,
        }
    }
}

impl Default for TrajectoryStore {
    fn default() -> Self {
        Self::new()
    }
}
