//! Replays timestamped GPS trajectories on a shared virtual clock.

#[macro_use]
extern crate anyhow;
#[macro_use]
extern crate log;

mod config;
mod labels;
mod lifecycle;
mod markers;
mod notify;
pub mod realtime;
mod scheduler;
mod timeline;

pub use self::config::{is_valid_speed, PlayerConfig};
pub use self::labels::{clock_label, date_time_label, duration_label, speed_label};
pub use self::markers::MarkerLayer;
pub use self::notify::{Callbacks, MarkerUpdate, Notifier, Observer, PlayState, TimeUpdate};
pub use self::scheduler::{Scheduler, Tick, TickQueue};
pub use self::timeline::{PlaybackState, Player};
