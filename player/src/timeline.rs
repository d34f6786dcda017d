use std::time::Duration;

use chrono::NaiveDateTime;

use ingest::millis_between;
use model::TrajectoryStore;

use crate::config::is_valid_speed;
use crate::{
    MarkerUpdate, Notifier, Observer, PlayState, PlayerConfig, Scheduler, Tick, TickQueue,
    TimeUpdate,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackState {
    /// Nothing loaded, freshly reset, or played through to the end
    Idle,
    Playing,
    Paused,
}

/// Owns the trajectories and a virtual clock over them, and moves the clock forward one step per
/// tick while playing.
pub struct Player<S: Scheduler = TickQueue> {
    pub(crate) config: PlayerConfig,
    pub(crate) store: TrajectoryStore,
    pub(crate) scheduler: S,
    pub(crate) notifier: Notifier,

    // Both None exactly when the store is empty
    pub(crate) current_time: Option<NaiveDateTime>,
    pub(crate) span: Option<(NaiveDateTime, NaiveDateTime)>,
    speed: f64,
    pub(crate) state: PlaybackState,
    // Bumped whenever the step loop starts or stops. A tick from an older generation is stale.
    generation: u64,
}

impl Player<TickQueue> {
    pub fn new(config: PlayerConfig) -> Self {
        Self::with_scheduler(config, TickQueue::new())
    }

    /// Lets `elapsed` of real time pass on the queue's clock, stepping for every tick that comes
    /// due along the way. Returns how many ticks fired, stale ones included.
    pub fn advance(&mut self, elapsed: Duration) -> usize {
        let until = self.scheduler.now() + elapsed;
        let mut fired = 0;
        while let Some(tick) = self.scheduler.pop_due(until) {
            self.step(tick);
            fired += 1;
        }
        self.scheduler.advance_to(until);
        fired
    }

    /// Keeps firing ticks until nothing is scheduled, which happens once playback reaches the end
    /// or something stops it.
    pub fn run_until_stopped(&mut self) -> usize {
        let mut fired = 0;
        while let Some(deadline) = self.scheduler.next_deadline() {
            let elapsed = deadline.saturating_sub(self.scheduler.now());
            fired += self.advance(elapsed);
        }
        fired
    }
}

impl<S: Scheduler> Player<S> {
    pub fn with_scheduler(config: PlayerConfig, scheduler: S) -> Self {
        let speed = if is_valid_speed(config.default_speed) {
            config.default_speed
        } else {
            warn!("Ignoring default speed {}", config.default_speed);
            1.0
        };
        Self {
            store: TrajectoryStore::with_default_color(&config.default_color),
            config,
            scheduler,
            notifier: Notifier::default(),

            current_time: None,
            span: None,
            speed,
            state: PlaybackState::Idle,
            generation: 0,
        }
    }

    /// Replaces every observer registered before.
    pub fn set_observers(&mut self, observers: Vec<Box<dyn Observer>>) {
        self.notifier.replace(observers);
    }

    pub fn set_callbacks(&mut self, callbacks: crate::Callbacks) {
        self.set_observers(vec![Box::new(callbacks)]);
    }

    pub fn play(&mut self) {
        if self.state == PlaybackState::Playing {
            return;
        }
        let end = match self.span {
            Some((_, end)) => end,
            None => {
                debug!("Nothing loaded, ignoring play");
                return;
            }
        };
        // Starting again after reaching the end
        if self.current_time.map_or(true, |t| t >= end) {
            self.reset();
        }

        self.state = PlaybackState::Playing;
        self.start_loop();
        self.notify_play_state();
    }

    pub fn pause(&mut self) {
        if self.state != PlaybackState::Playing {
            return;
        }
        self.state = PlaybackState::Paused;
        self.stop_loop();
        self.notify_play_state();
    }

    pub fn toggle(&mut self) {
        if self.state == PlaybackState::Playing {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Back to the start, not playing, every marker on its first sample. The play state is only
    /// announced if it changed.
    pub fn reset(&mut self) {
        let was_idle = self.state == PlaybackState::Idle;
        self.state = PlaybackState::Idle;
        self.stop_loop();
        self.current_time = self.span.map(|(start, _)| start);

        let frame: Vec<MarkerUpdate> = self
            .store
            .list()
            .map(|t| {
                let coordinate = if t.visible {
                    Some(t.first().coords)
                } else {
                    None
                };
                MarkerUpdate {
                    id: t.id.clone(),
                    coordinate,
                    visible: coordinate.is_some(),
                }
            })
            .collect();
        self.notifier.frame(&frame);
        self.notify_time();
        if !was_idle {
            self.notify_play_state();
        }
    }

    /// Jumps anywhere, even outside the loaded span; callers clamp if they care. If playing, the
    /// step loop restarts from the new time without observers seeing a pause.
    pub fn seek_to(&mut self, time: NaiveDateTime) {
        if self.span.is_none() {
            return;
        }
        let was_playing = self.state == PlaybackState::Playing;
        if was_playing {
            self.stop_loop();
        }

        self.current_time = Some(time);
        self.render();
        self.notify_time();

        if was_playing {
            self.start_loop();
        }
    }

    /// `progress` is clamped to [0, 1].
    pub fn seek_to_progress(&mut self, progress: f64) {
        let (start, end) = match self.span {
            Some(span) => span,
            None => return,
        };
        if progress.is_nan() {
            warn!("Ignoring seek to NaN progress");
            return;
        }
        let progress = progress.clamp(0.0, 1.0);
        let offset = scale(end - start, progress);
        self.seek_to(start + offset);
    }

    /// Moves by `delta`, staying inside the loaded span.
    pub fn seek_relative(&mut self, delta: chrono::Duration) {
        let (start, end) = match self.span {
            Some(span) => span,
            None => return,
        };
        let current = self.current_time.unwrap_or(start);
        // Past the representable range means past the span
        let target = match current.checked_add_signed(delta) {
            Some(t) => t.clamp(start, end),
            None if delta < chrono::Duration::zero() => start,
            None => end,
        };
        self.seek_to(target);
    }

    pub fn seek_forwards(&mut self) {
        self.seek_relative(self.config.seek_step());
    }

    pub fn seek_backwards(&mut self) {
        self.seek_relative(-self.config.seek_step());
    }

    /// Takes effect on the very next step.
    pub fn set_play_speed(&mut self, speed: f64) {
        if !is_valid_speed(speed) {
            warn!("Ignoring play speed {}", speed);
            return;
        }
        self.speed = speed;
        if self.state == PlaybackState::Playing {
            self.stop_loop();
            self.start_loop();
        }
    }

    /// The next configured speed above the current one, if any
    pub fn speed_up(&mut self) {
        let next = self
            .config
            .speed_options
            .iter()
            .copied()
            .find(|x| *x > self.speed);
        if let Some(speed) = next {
            self.set_play_speed(speed);
        }
    }

    pub fn slow_down(&mut self) {
        let prev = self
            .config
            .speed_options
            .iter()
            .copied()
            .rev()
            .find(|x| *x < self.speed);
        if let Some(speed) = prev {
            self.set_play_speed(speed);
        }
    }

    /// Called by whatever drives the scheduler. Stale ticks do nothing.
    pub fn step(&mut self, tick: Tick) {
        if tick.generation != self.generation || self.state != PlaybackState::Playing {
            debug!("Ignoring stale tick {}", tick.generation);
            return;
        }
        let (current, end) = match (self.current_time, self.span) {
            (Some(current), Some((_, end))) => (current, end),
            _ => return,
        };

        let next = match current.checked_add_signed(self.step_delta()) {
            Some(next) if next < end => next,
            _ => {
                self.finish(end);
                return;
            }
        };

        self.current_time = Some(next);
        self.render();
        self.notify_time();
        self.scheduler.schedule(
            self.config.tick_interval(),
            Tick {
                generation: self.generation,
            },
        );
    }

    fn finish(&mut self, end: NaiveDateTime) {
        self.current_time = Some(end);
        self.state = PlaybackState::Idle;
        self.stop_loop();
        self.render();
        self.notify_time();
        self.notify_play_state();
        info!("Playback reached the end at {}", end);
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    pub fn is_paused(&self) -> bool {
        self.state == PlaybackState::Paused
    }

    pub fn play_state(&self) -> PlayState {
        PlayState {
            is_playing: self.is_playing(),
            is_paused: self.is_paused(),
        }
    }

    pub fn current_time(&self) -> Option<NaiveDateTime> {
        self.current_time
    }

    pub fn start_time(&self) -> Option<NaiveDateTime> {
        self.span.map(|(start, _)| start)
    }

    pub fn end_time(&self) -> Option<NaiveDateTime> {
        self.span.map(|(_, end)| end)
    }

    pub fn play_speed(&self) -> f64 {
        self.speed
    }

    pub fn progress(&self) -> f64 {
        match (self.current_time, self.span) {
            (Some(current), Some((start, end))) if end > start => {
                (millis_between(start, current) / millis_between(start, end)).clamp(0.0, 1.0)
            }
            _ => 0.0,
        }
    }

    pub fn time_update(&self) -> TimeUpdate {
        TimeUpdate {
            current_time: self.current_time,
            start_time: self.start_time(),
            end_time: self.end_time(),
            progress: self.progress(),
        }
    }

    /// How long playing the whole span takes in real time at the current speed.
    pub fn playback_duration(&self) -> Option<chrono::Duration> {
        self.span
            .map(|(start, end)| scale(end - start, 1.0 / self.speed))
    }

    /// Virtual time covered by one step at the current speed
    pub fn step_delta(&self) -> chrono::Duration {
        let micros = (self.config.base_step_ms * 1000.0 * self.speed).round() as i64;
        // Always make progress, no matter how slow
        chrono::Duration::microseconds(micros.max(1))
    }

    pub fn store(&self) -> &TrajectoryStore {
        &self.store
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    /// Where every trajectory's marker belongs right now. Hidden trajectories aren't
    /// interpolated.
    pub fn markers(&self) -> Vec<MarkerUpdate> {
        self.store
            .list()
            .map(|t| {
                let coordinate = match self.current_time {
                    Some(time) if t.visible => t.position_at(time),
                    _ => None,
                };
                MarkerUpdate {
                    id: t.id.clone(),
                    coordinate,
                    visible: coordinate.is_some(),
                }
            })
            .collect()
    }

    pub(crate) fn render(&mut self) {
        let frame = self.markers();
        self.notifier.frame(&frame);
    }

    pub(crate) fn notify_time(&mut self) {
        let update = self.time_update();
        self.notifier.time_update(&update);
    }

    pub(crate) fn notify_play_state(&mut self) {
        let state = self.play_state();
        self.notifier.play_state(&state);
    }

    fn start_loop(&mut self) {
        self.generation += 1;
        self.scheduler.schedule(
            self.config.tick_interval(),
            Tick {
                generation: self.generation,
            },
        );
    }

    pub(crate) fn stop_loop(&mut self) {
        self.generation += 1;
        self.scheduler.cancel_all();
    }
}

fn scale(duration: chrono::Duration, factor: f64) -> chrono::Duration {
    match duration.num_microseconds() {
        Some(us) => chrono::Duration::microseconds((us as f64 * factor).round() as i64),
        None => chrono::Duration::milliseconds((duration.num_milliseconds() as f64 * factor) as i64),
    }
}
