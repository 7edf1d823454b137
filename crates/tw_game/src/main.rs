//! Sample platformer built on the level framework, run headlessly.
//!
//! The binary loads the framework config, the level manifest and an input
//! replay from an asset directory, then drives a [`Director`] over a
//! [`HeadlessHost`] with a fixed-timestep loop until the replay runs out:
//!
//!   1. feed the next replay frame into the input state
//!   2. `while should_step()` -- advance the host clock and update the level
//!   3. render the frame into the host's frame record
//!
//! Usage: `tw_game [ASSET_DIR] [REPLAY_FILE]`.

mod collision;
mod controller;
mod enemy;
mod player;
mod replay;
#[cfg(test)]
mod testing;

use std::path::{Path, PathBuf};

use replay::{load_replay_from_path, ReplayDriver, ReplaySequence};
use tw_core::statemachine::load_state_file;
use tw_core::{InputState, StateMachine, TimeState};
use tw_level::{
    load_config_from_path, load_level_definitions, Director, HeadlessHost, LevelPhase,
    TypeRegistry,
};

const ASSET_ROOT: &str = "assets";
const CONFIG_FILE: &str = "config.json";
const LEVELS_FILE: &str = "levels.json";
const REPLAY_FILE: &str = "replay.json";
const PLAYER_STATES_FILE: &str = "states/player.json";

/// Where a headless run ended up.
#[derive(Debug, Clone, PartialEq)]
struct RunSummary {
    frames: usize,
    steps: u64,
    level: Option<u32>,
    phase: Option<LevelPhase>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let asset_root = PathBuf::from(args.next().unwrap_or_else(|| ASSET_ROOT.to_string()));
    let replay_path = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| asset_root.join(REPLAY_FILE));

    let replay = match load_replay_from_path(&replay_path) {
        Ok(replay) => replay,
        Err(e) => {
            log::error!("{e}");
            std::process::exit(1);
        }
    };

    match run(&asset_root, &replay) {
        Ok(summary) => log::info!(
            "Replay finished after {} frames ({} steps): level {:?}, phase {:?}",
            summary.frames,
            summary.steps,
            summary.level,
            summary.phase
        ),
        Err(e) => {
            log::error!("{e}");
            std::process::exit(1);
        }
    }
}

/// Framework builtins plus the game's sprite types.
fn game_registry(asset_root: &Path) -> TypeRegistry {
    let mut registry = TypeRegistry::with_builtins();
    let states_path = asset_root.join(PLAYER_STATES_FILE);
    let player_states = match load_state_file(&states_path) {
        Ok(machine) => machine,
        Err(e) => {
            log::warn!("{e}; using built-in player states");
            StateMachine::new(player::default_states())
        }
    };
    player::register(&mut registry, player_states);
    enemy::register(&mut registry);
    registry
}

fn run(asset_root: &Path, replay: &ReplaySequence) -> Result<RunSummary, String> {
    let config = load_config_from_path(&asset_root.join(CONFIG_FILE))?;
    let levels = load_level_definitions(&asset_root.join(LEVELS_FILE))?;
    log::info!(
        "Loaded {} levels; view {}x{}, detail {:?}",
        levels.len(),
        config.view_width,
        config.view_height,
        config.detail
    );

    let mut host =
        HeadlessHost::new(config.view_width, config.view_height).with_asset_root(asset_root);
    let mut director = Director::new(config, game_registry(asset_root), levels);
    director.continue_game(&mut host).map_err(|e| e.to_string())?;

    let mut time = TimeState::new();
    time.fixed_dt = f64::from(replay.fixed_dt);
    let mut input = InputState::new();
    let mut driver = ReplayDriver::new(replay);
    let mut frames = 0;

    while driver.feed(&mut input) {
        time.begin_frame_with(time.fixed_dt);
        while time.should_step() {
            host.now_ms = time.now_ms();
            director
                .update(&mut host, &input, time.fixed_dt as f32)
                .map_err(|e| e.to_string())?;
            // Edges belong to the first step that sees them.
            input.end_frame();
        }
        host.begin_frame();
        director.render(&mut host);
        time.end_frame();
        frames += 1;

        if frames % 60 == 0 {
            if let Some(player) = director.level().and_then(|l| l.world.player()) {
                log::debug!(
                    "frame {}: player at ({:.1}, {:.1})",
                    frames,
                    player.position.x,
                    player.position.y
                );
            }
        }
    }

    Ok(RunSummary {
        frames,
        steps: time.fixed_step_count,
        level: director.current_index(),
        phase: director.phase(),
    })
}
