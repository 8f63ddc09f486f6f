//! Runs a level without a window and logs where everything ends up.
//!
//! Usage: `headless [level.txt] [settings.json] [ticks]`

use simulation::{PlayerInput, SimulationConfig, SimulationError, World};
use std::env;
use std::fs;
use std::process::ExitCode;

const DEMO_LEVEL: &str = "\
..............................
..............................
.P........E.........E.........
.....DDDD..........SSSS.......
..............................
GGGGGGGGGGGG..GGGGGGGGGGGGGGGG
SSSSSSSSSSSSWWSSSSSSSSSSSSSSSS
";

fn read(path: &str) -> Result<String, SimulationError> {
    fs::read_to_string(path).map_err(|err| SimulationError::Config(format!("{}: {}", path, err)))
}

fn run() -> Result<(), SimulationError> {
    let args: Vec<String> = env::args().skip(1).collect();
    let map = match args.first() {
        Some(path) => read(path)?,
        None => DEMO_LEVEL.to_string(),
    };
    let config = match args.get(1) {
        Some(path) => SimulationConfig::from_json_str(&read(path)?)?,
        None => SimulationConfig::default(),
    };
    let ticks: u64 = match args.get(2) {
        Some(raw) => raw
            .parse()
            .map_err(|_| SimulationError::Config(format!("bad tick count {:?}", raw)))?,
        None => u64::from(config.ticks_per_second) * 5,
    };

    let mut world = World::load(&map, config)?;
    let input = PlayerInput {
        horizontal: 1.0,
        jump_pressed: false,
    };
    for _ in 0..ticks {
        let frame = world.tick(input)?;
        if frame.tick % u64::from(config.ticks_per_second) == 0 {
            log::info!(
                "tick {}: player at ({:.1}, {:.1}), {} enemies alive",
                frame.tick,
                frame.player.x,
                frame.player.y,
                frame.enemies.len()
            );
        }
    }
    world.shutdown();
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{}", err);
            ExitCode::FAILURE
        }
    }
}
