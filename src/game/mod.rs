pub mod collision;
pub mod config;
pub mod geometry;
pub mod level;
pub mod player;
pub mod snapshot;
pub mod traffic;

use rand::rngs::SmallRng;
use rand::SeedableRng;
use serde::Serialize;

use crate::engine::clock::{FrameCounter, SessionTimer};
use crate::engine::input::Command;
use crate::engine::storage::ScoreStore;
use collision::{Hazard, HazardSampler};
use config::GameConfig;
use level::{LevelWindow, ObjectKind};
use player::{MoveDirection, MoveOutcome, Player, StepEvent};
use snapshot::{DebugFlags, LaneSnapshot, ObjectSnapshot, PlayerSnapshot, Snapshot};
use traffic::TrafficSim;

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameState {
    Menu,
    Playing,
    Paused,
    GameOver,
}

/// One game session: the level window, the player, moving traffic and the score, driven
/// by `tick` once per rendered frame.
pub struct Game {
    config: GameConfig,
    state: GameState,
    score: u32,
    high_score: u32,
    level: LevelWindow,
    player: Player,
    traffic: TrafficSim,
    hazards: HazardSampler,
    timer: SessionTimer,
    frames: FrameCounter,
    debug: DebugFlags,
    last_hazard: Option<Hazard>,
    store: Box<dyn ScoreStore>,
    rng: SmallRng,
}

impl Game {
    pub fn new(config: GameConfig, store: Box<dyn ScoreStore>, seed: u64) -> Self {
        let mut rng = SmallRng::seed_from_u64(seed);
        let level = LevelWindow::initialize(&config, &mut rng);
        let high_score = load_high_score(store.as_ref());

        Game {
            traffic: TrafficSim::new(&config),
            hazards: HazardSampler::new(&config),
            config,
            state: GameState::Menu,
            score: 0,
            high_score,
            level,
            player: Player::new(Default::default()),
            timer: SessionTimer::default(),
            frames: FrameCounter::default(),
            debug: DebugFlags::default(),
            last_hazard: None,
            store,
            rng,
        }
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    pub fn game_time(&self) -> u32 {
        self.timer.seconds()
    }

    pub fn last_hazard(&self) -> Option<Hazard> {
        self.last_hazard
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn level(&self) -> &LevelWindow {
        &self.level
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn traffic(&self) -> &TrafficSim {
        &self.traffic
    }

    pub fn debug(&self) -> DebugFlags {
        self.debug
    }

    pub fn toggle_grid(&mut self) {
        self.debug.grid = !self.debug.grid;
    }

    pub fn toggle_axes(&mut self) {
        self.debug.axes = !self.debug.axes;
    }

    pub fn toggle_free_camera(&mut self) {
        self.debug.free_camera = !self.debug.free_camera;
    }

    pub fn set_god_mode(&mut self, enabled: bool) {
        self.debug.god_mode = enabled;
        log::info!("god mode {}", if enabled { "on" } else { "off" });
    }

    pub fn handle_command(&mut self, command: Command) {
        match (self.state, command) {
            (GameState::Menu, Command::Confirm) => self.start(),
            (GameState::Menu, Command::Left) => self.player.model = self.player.model.previous(),
            (GameState::Menu, Command::Right) => self.player.model = self.player.model.next(),
            (GameState::Playing, Command::Forward) => self.move_player(MoveDirection::Forward),
            (GameState::Playing, Command::Left) => self.move_player(MoveDirection::Left),
            (GameState::Playing, Command::Right) => self.move_player(MoveDirection::Right),
            (GameState::Playing, Command::Pause) => self.pause(),
            (GameState::Paused, Command::Pause | Command::Confirm) => self.resume(),
            (GameState::GameOver, Command::Confirm) => self.restart(),
            (_, Command::Restart) => self.restart(),
            (_, Command::Escape) => self.return_to_menu(),
            _ => {}
        }
    }

    pub fn start(&mut self) {
        if self.state == GameState::Menu {
            self.begin_session();
        }
    }

    pub fn restart(&mut self) {
        if self.state != GameState::Menu {
            self.begin_session();
        }
    }

    pub fn pause(&mut self) {
        if self.state == GameState::Playing {
            self.timer.stop();
            self.state = GameState::Paused;
            log::info!("paused at {}s", self.timer.seconds());
        }
    }

    pub fn resume(&mut self) {
        if self.state == GameState::Paused {
            self.timer.resume();
            self.state = GameState::Playing;
            log::info!("resumed");
        }
    }

    pub fn return_to_menu(&mut self) {
        if self.state == GameState::Menu {
            return;
        }
        self.timer.stop();
        self.frames.reset();
        self.state = GameState::Menu;
        log::info!("back to menu");
    }

    fn begin_session(&mut self) {
        self.level = LevelWindow::initialize(&self.config, &mut self.rng);
        self.player.reset();
        self.traffic.reset();
        self.hazards.reset();
        self.frames.reset();
        self.score = 0;
        self.last_hazard = None;
        self.high_score = load_high_score(self.store.as_ref());
        self.timer.start();
        self.state = GameState::Playing;
        log::info!("session started, high score {}", self.high_score);
    }

    fn end_session(&mut self, hazard: Hazard) {
        self.timer.stop();
        self.frames.reset();
        self.last_hazard = Some(hazard);
        if self.score > self.high_score {
            self.high_score = self.score;
            match self.store.save(self.score) {
                Ok(()) => log::info!("new high score {}", self.score),
                Err(e) => log::warn!("could not persist high score {}: {}", self.score, e),
            }
        }
        self.state = GameState::GameOver;
        log::info!(
            "game over ({:?}) with score {} after {}s",
            hazard,
            self.score,
            self.timer.seconds()
        );
    }

    fn move_player(&mut self, direction: MoveDirection) {
        let outcome = self.player.request_move(direction, &self.config, &self.level);
        if outcome == MoveOutcome::Moving && direction == MoveDirection::Forward {
            self.level.add_lane_ahead(&self.config, &mut self.rng);
            self.score += 1;
        }
    }

    pub fn tick(&mut self, dt: f32) {
        if self.state != GameState::Playing {
            return;
        }
        let dt = dt.clamp(0.0, self.config.max_frame_dt);
        self.frames.record(dt);
        self.timer.advance(dt);
        self.traffic.advance(&self.config, &mut self.level, dt);

        if let Some(StepEvent::MoveFinished(MoveDirection::Forward)) =
            self.player.update(dt, &self.config, &self.level)
        {
            self.level.remove_lane_behind();
        }

        let hazard = self
            .hazards
            .sample(dt, &self.config, &self.level, &self.player, self.debug.god_mode);
        if let Some(hazard) = hazard {
            self.end_session(hazard);
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        let bob = self.traffic.bob_offset(&self.config);
        let lanes = self
            .level
            .lanes()
            .map(|lane| LaneSnapshot {
                id: lane.id,
                lane_type: lane.lane_type,
                y_index: lane.y_index,
                objects: lane
                    .objects
                    .iter()
                    .enumerate()
                    .map(|(index, object)| ObjectSnapshot {
                        kind: object.kind,
                        x_index: object.x_index,
                        x: self.traffic.visual_x(lane.id, index).unwrap_or(object.world_x),
                        committed_x: object.world_x,
                        z: if object.kind == ObjectKind::Log { bob } else { 0.0 },
                        direction: object.direction,
                        color: object.color,
                    })
                    .collect(),
            })
            .collect();

        let player = &self.player;
        Snapshot {
            state: self.state,
            score: self.score,
            high_score: self.high_score,
            game_time: self.timer.seconds(),
            fps: self.frames.fps(),
            last_hazard: self.last_hazard,
            player: PlayerSnapshot {
                x: player.position.x,
                y: player.position.y,
                z: player.position.z,
                model: player.model,
                is_moving: player.is_moving,
                is_bouncing: player.is_bouncing,
                animation_progress: player.animation_progress,
                bounce_direction: player.bounce_direction,
                is_on_log: player.is_on_log(),
            },
            lanes,
            debug: self.debug,
        }
    }
}

fn load_high_score(store: &dyn ScoreStore) -> u32 {
    match store.load() {
        Ok(score) => score,
        Err(e) => {
            log::warn!("high score unavailable, assuming 0: {}", e);
            0
        }
    }
}
