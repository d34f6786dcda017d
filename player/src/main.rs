#[macro_use]
extern crate anyhow;
#[macro_use]
extern crate log;

use std::cell::RefCell;
use std::rc::Rc;

use anyhow::{Context, Result};
use structopt::StructOpt;

use ingest::RawTrajectory;
use player::realtime;
use player::{
    clock_label, date_time_label, duration_label, speed_label, MarkerLayer, MarkerUpdate,
    Observer, PlayState, Player, PlayerConfig, TimeUpdate,
};

#[derive(StructOpt)]
#[structopt(name = "replay", about = "Replays GPS trajectories on a shared clock")]
struct Args {
    /// A JSON file with one trajectory or an array of them
    #[structopt(long)]
    input: Option<String>,
    /// A CSV file with columns id,name,color,time,lng,lat
    #[structopt(long)]
    csv: Option<String>,
    /// Player settings as JSON. Anything missing keeps its default.
    #[structopt(long)]
    config: Option<String>,
    #[structopt(long)]
    speed: Option<f64>,
    /// Start from this fraction of the way through, from 0 to 1
    #[structopt(long)]
    seek_progress: Option<f64>,
    /// Actually wait between steps, instead of running as fast as possible
    #[structopt(long)]
    realtime: bool,
    /// Write every trajectory's path here as GeoJSON
    #[structopt(long)]
    export_geojson: Option<String>,
    /// Only log every Nth step
    #[structopt(long, default_value = "10")]
    log_every: usize,
}

impl Args {
    fn load_trajectories(&self) -> Result<Vec<RawTrajectory>> {
        let mut raws = Vec::new();
        if let Some(ref path) = self.input {
            let file = fs_err::File::open(path)?;
            raws.extend(ingest::load_json(file).with_context(|| format!("loading {}", path))?);
        }
        if let Some(ref path) = self.csv {
            let file = fs_err::File::open(path)?;
            raws.extend(ingest::load_csv(file).with_context(|| format!("loading {}", path))?);
        }
        if self.input.is_none() && self.csv.is_none() {
            info!("No input given, using the built-in sample trajectories");
            raws = ingest::load_json(include_str!("../assets/sample_trajectories.json").as_bytes())?;
        }
        Ok(raws)
    }
}

// Logs what a UI would show
struct FrameLogger {
    every: usize,
    steps: usize,
    last_frame: Vec<MarkerUpdate>,
}

impl Observer for FrameLogger {
    fn on_frame(&mut self, markers: &[MarkerUpdate]) {
        self.last_frame = markers.to_vec();
    }

    fn on_time_update(&mut self, update: &TimeUpdate) {
        self.steps += 1;
        if self.every == 0 || self.steps % self.every != 0 {
            return;
        }
        let shown: Vec<String> = self
            .last_frame
            .iter()
            .filter_map(|m| m.coordinate.map(|pt| format!("{} {}", m.id, pt)))
            .collect();
        info!(
            "{} ({:.1}%): {}",
            clock_label(update.current_time),
            update.progress * 100.0,
            shown.join(", ")
        );
    }

    fn on_play_state_change(&mut self, state: &PlayState) {
        info!(
            "Playing: {}, paused: {}",
            state.is_playing, state.is_paused
        );
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::from_args();
    let config = match args.config {
        Some(ref path) => PlayerConfig::load(path)?,
        None => PlayerConfig::default(),
    };
    let raws = args.load_trajectories()?;

    let mut player = Player::new(config);
    player.add_trajectories(&raws)?;
    if player.store().is_empty() {
        bail!("No trajectories to replay");
    }

    if let Some(ref path) = args.export_geojson {
        let fc = player.store().to_feature_collection();
        fs_err::write(path, serde_json::to_string_pretty(&fc)?)?;
        info!("Wrote {} paths to {}", player.store().len(), path);
    }

    let layer = Rc::new(RefCell::new(MarkerLayer::new()));
    player.set_observers(vec![
        Box::new(FrameLogger {
            every: args.log_every,
            steps: 0,
            last_frame: Vec::new(),
        }),
        Box::new(layer.clone()),
    ]);

    if let Some(speed) = args.speed {
        player.set_play_speed(speed);
    }
    if let Some(progress) = args.seek_progress {
        player.seek_to_progress(progress);
    }
    info!(
        "Replaying {} trajectories from {} to {} at {}, about {} of real time",
        player.store().len(),
        date_time_label(player.start_time()),
        date_time_label(player.end_time()),
        speed_label(player.play_speed()),
        duration_label(player.playback_duration())
    );

    player.play();
    let ticks = if args.realtime {
        realtime::run(&mut player)
    } else {
        player.run_until_stopped()
    };

    let layer = layer.borrow();
    println!(
        "Finished after {} ticks at {}",
        ticks,
        date_time_label(player.current_time())
    );
    for (id, pt) in layer.visible() {
        println!("  {}: {}", id, pt);
    }
    Ok(())
}
