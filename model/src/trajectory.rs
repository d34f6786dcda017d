use chrono::NaiveDateTime;
use geojson::feature::Id;
use geojson::{Feature, Geometry, JsonObject};

use ingest::{
    millis_between, LonLat, RawTrajectory, Sample, TrajectoryID, ValidTrajectory, ValidationError,
};

#[derive(Clone, Debug, PartialEq)]
pub struct Trajectory {
    pub id: TrajectoryID,
    pub name: String,
    pub color: String,
    pub visible: bool,
    // Sorted by time and never empty. Equal times keep their input order.
    samples: Vec<Sample>,
}

impl Trajectory {
    pub fn new(valid: ValidTrajectory) -> Result<Self, ValidationError> {
        let ValidTrajectory {
            id,
            name,
            color,
            mut samples,
        } = valid;
        if samples.is_empty() {
            return Err(ValidationError::Empty { id: id.0 });
        }
        // Stable, so duplicate timestamps stay in the order they arrived
        samples.sort_by_key(|s| s.time);
        Ok(Self {
            id,
            name,
            color,
            visible: true,
            samples,
        })
    }

    pub fn from_raw(raw: &RawTrajectory, default_color: &str) -> Result<Self, ValidationError> {
        Self::new(ingest::validate(raw, default_color)?)
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn first(&self) -> &Sample {
        &self.samples[0]
    }

    pub fn last(&self) -> &Sample {
        &self.samples[self.samples.len() - 1]
    }

    pub fn start_time(&self) -> NaiveDateTime {
        self.first().time
    }

    pub fn end_time(&self) -> NaiveDateTime {
        self.last().time
    }

    /// None if the trajectory hasn't started yet at this time. After the last sample, the
    /// position freezes there.
    pub fn position_at(&self, time: NaiveDateTime) -> Option<LonLat> {
        if self.samples.len() == 1 {
            return Some(self.samples[0].coords);
        }
        if time < self.start_time() {
            return None;
        }
        if time > self.end_time() {
            return Some(self.last().coords);
        }

        // The first sample at or after this time
        let idx = self.samples.partition_point(|s| s.time < time);
        let b = &self.samples[idx];
        if b.time == time {
            return Some(b.coords);
        }
        // idx > 0, because time >= start_time and the first sample didn't match exactly
        let a = &self.samples[idx - 1];
        Some(lerp(a, b, time))
    }

    /// The whole path, for drawing the line behind a marker. A trajectory that never moves
    /// becomes a point.
    pub fn to_geojson(&self) -> Feature {
        let mut pts: Vec<Vec<f64>> = Vec::new();
        for sample in &self.samples {
            let pt = vec![sample.coords.lng, sample.coords.lat];
            if pts.last() != Some(&pt) {
                pts.push(pt);
            }
        }
        let value = if pts.len() == 1 {
            geojson::Value::Point(pts.remove(0))
        } else {
            geojson::Value::LineString(pts)
        };

        let mut properties = JsonObject::new();
        properties.insert("id".to_string(), self.id.0.clone().into());
        properties.insert("name".to_string(), self.name.clone().into());
        properties.insert("color".to_string(), self.color.clone().into());
        properties.insert(
            "start_time".to_string(),
            self.start_time().to_string().into(),
        );
        properties.insert("end_time".to_string(), self.end_time().to_string().into());

        Feature {
            bbox: None,
            geometry: Some(Geometry::new(value)),
            id: Some(Id::String(self.id.0.clone())),
            properties: Some(properties),
            foreign_members: None,
        }
    }
}

fn lerp(a: &Sample, b: &Sample, time: NaiveDateTime) -> LonLat {
    let span = millis_between(a.time, b.time);
    if span <= 0.0 {
        return a.coords;
    }
    let pct = millis_between(a.time, time) / span;
    LonLat::new(
        a.coords.lng + (b.coords.lng - a.coords.lng) * pct,
        a.coords.lat + (b.coords.lat - a.coords.lat) * pct,
    )
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDate};
    use ingest::RawSample;

    use super::*;

    fn t0() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 17)
            .unwrap()
            .and_hms_opt(15, 0, 0)
            .unwrap()
    }

    fn at(ms: i64) -> NaiveDateTime {
        t0() + Duration::milliseconds(ms)
    }

    fn build(id: &str, pts: Vec<(i64, f64, f64)>) -> Trajectory {
        let samples = pts
            .into_iter()
            .map(|(ms, lng, lat)| Sample::new(at(ms), LonLat::new(lng, lat)))
            .collect();
        Trajectory::new(ValidTrajectory {
            id: TrajectoryID::from(id),
            name: id.to_string(),
            color: "#FF5722".to_string(),
            samples,
        })
        .unwrap()
    }

    #[test]
    fn sorted_on_ingest() {
        let traj = build(
            "x",
            vec![(2000, 2.0, 0.0), (0, 0.0, 0.0), (1000, 1.0, 0.0), (1000, 9.0, 9.0)],
        );
        let times: Vec<NaiveDateTime> = traj.samples().iter().map(|s| s.time).collect();
        assert_eq!(times, vec![at(0), at(1000), at(1000), at(2000)]);
        // Ties keep input order
        assert_eq!(traj.samples()[1].coords, LonLat::new(1.0, 0.0));
        assert_eq!(traj.samples()[2].coords, LonLat::new(9.0, 9.0));
        assert_eq!(traj.start_time(), at(0));
        assert_eq!(traj.end_time(), at(2000));
    }

    #[test]
    fn interpolates_each_axis() {
        let traj = build(
            "a",
            vec![(0, 0.0, 0.0), (1000, 10.0, 0.0), (2000, 10.0, 10.0)],
        );
        assert_eq!(traj.position_at(at(500)), Some(LonLat::new(5.0, 0.0)));
        assert_eq!(traj.position_at(at(1500)), Some(LonLat::new(10.0, 5.0)));
        assert_eq!(traj.position_at(at(250)), Some(LonLat::new(2.5, 0.0)));
    }

    #[test]
    fn exact_at_sample_boundaries() {
        let traj = build(
            "a",
            vec![(0, 0.3, 0.7), (1000, 10.1, 0.2), (2000, 10.9, 10.4)],
        );
        for s in traj.samples() {
            assert_eq!(traj.position_at(s.time), Some(s.coords));
        }
        // Approaching a boundary from either side converges on it
        let before = traj.position_at(at(999)).unwrap();
        let after = traj.position_at(at(1001)).unwrap();
        assert!((before.lng - 10.1).abs() < 0.02);
        assert!((after.lng - 10.1).abs() < 0.02);
    }

    #[test]
    fn outside_the_time_range() {
        let traj = build("a", vec![(1000, 1.0, 1.0), (2000, 2.0, 2.0)]);
        assert_eq!(traj.position_at(at(999)), None);
        assert_eq!(traj.position_at(at(5000)), Some(LonLat::new(2.0, 2.0)));
    }

    #[test]
    fn single_sample_is_pinned() {
        let traj = build("a", vec![(1000, 3.0, 4.0)]);
        assert_eq!(traj.position_at(at(0)), Some(LonLat::new(3.0, 4.0)));
        assert_eq!(traj.position_at(at(1000)), Some(LonLat::new(3.0, 4.0)));
        assert_eq!(traj.position_at(at(9000)), Some(LonLat::new(3.0, 4.0)));
    }

    #[test]
    fn duplicate_timestamps() {
        let traj = build(
            "a",
            vec![(0, 0.0, 0.0), (1000, 1.0, 1.0), (1000, 5.0, 5.0), (2000, 6.0, 6.0)],
        );
        assert_eq!(traj.position_at(at(1000)), Some(LonLat::new(1.0, 1.0)));
        // Past the pair, interpolation continues from the later duplicate
        assert_eq!(traj.position_at(at(1500)), Some(LonLat::new(5.5, 5.5)));

        let all_same = build("b", vec![(1000, 1.0, 1.0), (1000, 2.0, 2.0)]);
        assert_eq!(all_same.position_at(at(1000)), Some(LonLat::new(1.0, 1.0)));
        assert_eq!(all_same.position_at(at(1001)), Some(LonLat::new(2.0, 2.0)));
    }

    #[test]
    fn sub_millisecond_precision() {
        let traj = build("a", vec![(0, 0.0, 0.0), (1, 1.0, 0.0)]);
        let pos = traj
            .position_at(t0() + Duration::microseconds(250))
            .unwrap();
        assert!((pos.lng - 0.25).abs() < 1e-9);
    }

    #[test]
    fn from_raw_rejects_empty() {
        let raw = RawTrajectory::new("e", "", Vec::new());
        assert!(Trajectory::from_raw(&raw, "#FF5722").is_err());

        let raw = RawTrajectory::new(
            "ok",
            "",
            vec![RawSample::new("2025/01/17 15:00:01", 1.0, 2.0)],
        );
        let traj = Trajectory::from_raw(&raw, "#FF5722").unwrap();
        assert!(traj.visible);
    }

    #[test]
    fn geojson() {
        let traj = build(
            "a",
            vec![(0, 0.0, 0.0), (500, 0.0, 0.0), (1000, 10.0, 0.0)],
        );
        let feature = traj.to_geojson();
        assert_eq!(feature.id, Some(Id::String("a".to_string())));
        match feature.geometry.unwrap().value {
            geojson::Value::LineString(pts) => {
                assert_eq!(pts, vec![vec![0.0, 0.0], vec![10.0, 0.0]]);
            }
            other => panic!("unexpected {:?}", other),
        }
        let props = feature.properties.unwrap();
        assert_eq!(props["color"], "#FF5722");

        let parked = build("p", vec![(0, 1.0, 2.0), (1000, 1.0, 2.0)]);
        assert!(matches!(
            parked.to_geojson().geometry.unwrap().value,
            geojson::Value::Point(_)
        ));
    }
}
