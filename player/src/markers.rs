use std::collections::BTreeMap;

use ingest::{LonLat, TrajectoryID};

use crate::{MarkerUpdate, Observer, PlayState, TimeUpdate};

/// Remembers the latest state of everything the player reports, the way a map layer would hold
/// onto its markers between frames.
#[derive(Default)]
pub struct MarkerLayer {
    markers: BTreeMap<TrajectoryID, MarkerUpdate>,
    time: Option<TimeUpdate>,
    play_state: Option<PlayState>,
    frames: usize,
}

impl MarkerLayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only markers that should be drawn right now
    pub fn visible(&self) -> impl Iterator<Item = (&TrajectoryID, LonLat)> {
        self.markers
            .iter()
            .filter_map(|(id, m)| m.coordinate.map(|pt| (id, pt)))
    }

    pub fn get(&self, id: &TrajectoryID) -> Option<&MarkerUpdate> {
        self.markers.get(id)
    }

    pub fn time(&self) -> Option<&TimeUpdate> {
        self.time.as_ref()
    }

    pub fn play_state(&self) -> Option<PlayState> {
        self.play_state
    }

    pub fn frames(&self) -> usize {
        self.frames
    }
}

impl Observer for MarkerLayer {
    fn on_frame(&mut self, markers: &[MarkerUpdate]) {
        // A frame lists every loaded trajectory, so anything missing was removed
        self.markers = markers
            .iter()
            .map(|m| (m.id.clone(), m.clone()))
            .collect();
        self.frames += 1;
    }

    fn on_time_update(&mut self, update: &TimeUpdate) {
        self.time = Some(update.clone());
    }

    fn on_play_state_change(&mut self, state: &PlayState) {
        self.play_state = Some(*state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_only_the_latest_frame() {
        let mut layer = MarkerLayer::new();
        layer.on_frame(&[
            MarkerUpdate {
                id: "a".into(),
                coordinate: Some(LonLat::new(1.0, 2.0)),
                visible: true,
            },
            MarkerUpdate {
                id: "b".into(),
                coordinate: None,
                visible: false,
            },
        ]);
        assert_eq!(layer.visible().count(), 1);

        layer.on_frame(&[MarkerUpdate {
            id: "b".into(),
            coordinate: Some(LonLat::new(3.0, 4.0)),
            visible: true,
        }]);
        assert!(layer.get(&"a".into()).is_none());
        assert_eq!(
            layer.visible().collect::<Vec<_>>(),
            vec![(&TrajectoryID::from("b"), LonLat::new(3.0, 4.0))]
        );
        assert_eq!(layer.frames(), 2);
    }
}
