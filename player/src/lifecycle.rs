//! Loading, unloading, and hiding trajectories while a player is running.

use ingest::{RawTrajectory, TrajectoryID, ValidationError};
use model::Trajectory;

use crate::timeline::PlaybackState;
use crate::{Player, Scheduler};

impl<S: Scheduler> Player<S> {
    /// On failure nothing changes and nobody is notified. A trajectory with the same id is
    /// replaced.
    pub fn add_trajectory(&mut self, raw: &RawTrajectory) -> Result<(), ValidationError> {
        self.store.add(raw)?;
        self.on_composition_change();
        Ok(())
    }

    /// All or nothing: if any input is invalid, none of them are added.
    pub fn add_trajectories(&mut self, raws: &[RawTrajectory]) -> Result<(), ValidationError> {
        let default_color = self.config.default_color.clone();
        let mut valid = Vec::new();
        for raw in raws {
            valid.push(Trajectory::from_raw(raw, &default_color)?);
        }
        if valid.is_empty() {
            return Ok(());
        }
        info!("Adding {} trajectories", valid.len());
        for trajectory in valid {
            self.store.insert(trajectory);
        }
        self.on_composition_change();
        Ok(())
    }

    /// False if there was no such trajectory
    pub fn remove_trajectory(&mut self, id: &TrajectoryID) -> bool {
        if self.store.remove(id).is_none() {
            return false;
        }
        self.on_composition_change();
        true
    }

    /// Hidden trajectories still count towards the time span; only their marker goes away.
    pub fn set_visible(&mut self, id: &TrajectoryID, visible: bool) -> bool {
        if !self.store.set_visible(id, visible) {
            warn!("No trajectory {} to show or hide", id);
            return false;
        }
        self.render();
        true
    }

    pub fn clear(&mut self) {
        if self.store.is_empty() {
            return;
        }
        self.store.clear();
        self.on_composition_change();
    }

    // The span may have moved. Keep the clock inside it, so playback carries on from the same
    // moment when possible.
    fn on_composition_change(&mut self) {
        self.span = self.store.time_span();
        match self.span {
            None => {
                self.current_time = None;
                if self.state != PlaybackState::Idle {
                    self.state = PlaybackState::Idle;
                    self.stop_loop();
                    self.render();
                    self.notify_time();
                    self.notify_play_state();
                    return;
                }
            }
            Some((start, end)) => {
                self.current_time = Some(match self.current_time {
                    Some(t) => t.clamp(start, end),
                    None => start,
                });
            }
        }
        self.render();
        self.notify_time();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use ingest::RawSample;

    use crate::{Callbacks, PlayerConfig, TimeUpdate};

    use super::*;

    fn raw(id: &str, times: &[&str]) -> RawTrajectory {
        RawTrajectory::new(
            id,
            id,
            times
                .iter()
                .enumerate()
                .map(|(i, t)| RawSample::new(t, i as f64, 0.0))
                .collect(),
        )
    }

    #[test]
    fn invalid_batch_adds_nothing() {
        let mut player = Player::new(PlayerConfig::default());
        let updates = Rc::new(RefCell::new(0));
        let count = updates.clone();
        player.set_callbacks(
            Callbacks::new().on_time_update(move |_: &TimeUpdate| *count.borrow_mut() += 1),
        );

        let good = raw("good", &["2025-01-17 15:00:00", "2025-01-17 15:00:10"]);
        let bad = raw("bad", &["2025-01-17 15:00:00", "yesterday"]);
        let err = player.add_trajectories(&[good.clone(), bad]).unwrap_err();
        assert_eq!(err.trajectory_id(), "bad");
        assert!(player.store().is_empty());
        assert_eq!(*updates.borrow(), 0);

        player.add_trajectories(&[good]).unwrap();
        assert_eq!(player.store().len(), 1);
        assert_eq!(*updates.borrow(), 1);
    }

    #[test]
    fn clock_stays_inside_a_changing_span() {
        let mut player = Player::new(PlayerConfig::default());
        player
            .add_trajectory(&raw("a", &["2025-01-17 15:00:00", "2025-01-17 15:01:00"]))
            .unwrap();
        player.seek_to_progress(0.5);
        let mid = player.current_time();

        // Widening the span leaves the clock alone
        player
            .add_trajectory(&raw("b", &["2025-01-17 14:00:00", "2025-01-17 16:00:00"]))
            .unwrap();
        assert_eq!(player.current_time(), mid);

        // Shrinking past it pulls the clock in
        player
            .add_trajectory(&raw("b", &["2025-01-17 15:00:40", "2025-01-17 15:00:50"]))
            .unwrap();
        assert!(player.remove_trajectory(&"a".into()));
        assert_eq!(player.current_time(), player.start_time());
        assert!(!player.remove_trajectory(&"a".into()));

        player.clear();
        assert_eq!(player.current_time(), None);
        assert_eq!(player.start_time(), None);
    }

    #[test]
    fn unknown_visibility_toggle() {
        let mut player = Player::new(PlayerConfig::default());
        assert!(!player.set_visible(&"nope".into(), false));
    }
}
