#[macro_use]
extern crate log;

mod store;
mod trajectory;

pub use self::store::TrajectoryStore;
pub use self::trajectory::Trajectory;
