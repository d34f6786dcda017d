//! Pushes playback changes out to whoever draws them. Delivery is synchronous and ordered: for
//! one operation, a frame comes before the time update, which comes before a play state change.

use std::cell::RefCell;
use std::rc::Rc;

use chrono::NaiveDateTime;
use serde::Serialize;

use ingest::{LonLat, TrajectoryID};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TimeUpdate {
    pub current_time: Option<NaiveDateTime>,
    pub start_time: Option<NaiveDateTime>,
    pub end_time: Option<NaiveDateTime>,
    /// In [0, 1]. 0 whenever the span is empty or unknown.
    pub progress: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct PlayState {
    pub is_playing: bool,
    pub is_paused: bool,
}

/// Where one trajectory's marker should be. `coordinate` is None when the marker should be
/// hidden, either because the trajectory is hidden or because it hasn't started yet.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MarkerUpdate {
    pub id: TrajectoryID,
    pub coordinate: Option<LonLat>,
    pub visible: bool,
}

pub trait Observer {
    fn on_frame(&mut self, _markers: &[MarkerUpdate]) {}
    fn on_time_update(&mut self, _update: &TimeUpdate) {}
    fn on_play_state_change(&mut self, _state: &PlayState) {}
}

/// Lets the caller keep a handle on an observer after handing it to the player.
impl<T: Observer> Observer for Rc<RefCell<T>> {
    fn on_frame(&mut self, markers: &[MarkerUpdate]) {
        self.borrow_mut().on_frame(markers);
    }

    fn on_time_update(&mut self, update: &TimeUpdate) {
        self.borrow_mut().on_time_update(update);
    }

    fn on_play_state_change(&mut self, state: &PlayState) {
        self.borrow_mut().on_play_state_change(state);
    }
}

/// Plain closures, for callers that don't want to define a type.
#[derive(Default)]
pub struct Callbacks {
    on_frame: Option<Box<dyn FnMut(&[MarkerUpdate])>>,
    on_time_update: Option<Box<dyn FnMut(&TimeUpdate)>>,
    on_play_state_change: Option<Box<dyn FnMut(&PlayState)>>,
}

impl Callbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_frame<F: FnMut(&[MarkerUpdate]) + 'static>(mut self, f: F) -> Self {
        self.on_frame = Some(Box::new(f));
        self
    }

    pub fn on_time_update<F: FnMut(&TimeUpdate) + 'static>(mut self, f: F) -> Self {
        self.on_time_update = Some(Box::new(f));
        self
    }

    pub fn on_play_state_change<F: FnMut(&PlayState) + 'static>(mut self, f: F) -> Self {
        self.on_play_state_change = Some(Box::new(f));
        self
    }
}

impl Observer for Callbacks {
    fn on_frame(&mut self, markers: &[MarkerUpdate]) {
        if let Some(ref mut f) = self.on_frame {
            f(markers);
        }
    }

    fn on_time_update(&mut self, update: &TimeUpdate) {
        if let Some(ref mut f) = self.on_time_update {
            f(update);
        }
    }

    fn on_play_state_change(&mut self, state: &PlayState) {
        if let Some(ref mut f) = self.on_play_state_change {
            f(state);
        }
    }
}

#[derive(Default)]
pub struct Notifier {
    observers: Vec<Box<dyn Observer>>,
}

impl Notifier {
    /// Replaces everybody registered before.
    pub fn replace(&mut self, observers: Vec<Box<dyn Observer>>) {
        self.observers = observers;
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    pub fn frame(&mut self, markers: &[MarkerUpdate]) {
        for observer in &mut self.observers {
            observer.on_frame(markers);
        }
    }

    pub fn time_update(&mut self, update: &TimeUpdate) {
        for observer in &mut self.observers {
            observer.on_time_update(update);
        }
    }

    pub fn play_state(&mut self, state: &PlayState) {
        for observer in &mut self.observers {
            observer.on_play_state_change(state);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn callbacks_only_fire_what_was_set() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut notifier = Notifier::default();
        let log = seen.clone();
        notifier.replace(vec![Box::new(Callbacks::new().on_play_state_change(
            move |state: &PlayState| log.borrow_mut().push(state.is_playing),
        ))]);

        notifier.time_update(&TimeUpdate {
            current_time: None,
            start_time: None,
            end_time: None,
            progress: 0.0,
        });
        notifier.play_state(&PlayState {
            is_playing: true,
            is_paused: false,
        });
        assert_eq!(*seen.borrow(), vec![true]);
    }

    #[test]
    fn replace_does_not_accumulate() {
        let count = Rc::new(RefCell::new(0));
        let mut notifier = Notifier::default();
        for _ in 0..3 {
            let count = count.clone();
            notifier.replace(vec![Box::new(
                Callbacks::new().on_frame(move |_: &[MarkerUpdate]| *count.borrow_mut() += 1),
            )]);
        }
        assert_eq!(notifier.len(), 1);
        notifier.frame(&[]);
        assert_eq!(*count.borrow(), 1);
    }
}
