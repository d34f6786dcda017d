use std::time::Instant;

use crate::{Player, TickQueue};

/// Plays against the wall clock, blocking until playback stops. Returns how many ticks fired.
pub fn run(player: &mut Player<TickQueue>) -> usize {
    let started = Instant::now();
    let offset = player.scheduler().now();
    let mut fired = 0;
    while let Some(deadline) = player.scheduler().next_deadline() {
        let elapsed = started.elapsed() + offset;
        if deadline > elapsed {
            std::thread::sleep(deadline - elapsed);
        }
        let now = started.elapsed() + offset;
        let behind = now.saturating_sub(player.scheduler().now());
        fired += player.advance(behind);
    }
    fired
}
