use nalgebra::{Point2, Vector2, Vector3};
use serde::Serialize;

use crate::game::collision;
use crate::game::config::GameConfig;
use crate::game::level::{LaneId, LevelWindow};

#[derive(Serialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CharacterModel {
    #[default]
    Frog,
    Chicken,
    Penguin,
    Robot,
}

impl CharacterModel {
    pub const ALL: [CharacterModel; 4] = [
        CharacterModel::Frog,
        CharacterModel::Chicken,
        CharacterModel::Penguin,
        CharacterModel::Robot,
    ];

    fn index(self) -> usize {
        Self::ALL.iter().position(|m| *m == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn previous(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveDirection {
    Forward,
    Left,
    Right,
}

impl MoveDirection {
    fn offset(self) -> (i32, i32) {
        match self {
            MoveDirection::Forward => (0, 1),
            MoveDirection::Left => (-1, 0),
            MoveDirection::Right => (1, 0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    Ignored,
    Moving,
    Bouncing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepEvent {
    MoveFinished(MoveDirection),
    BounceFinished,
}

/// Lookup handle to the log being ridden. The log itself stays owned by its lane.
#[derive(Serialize, Debug, Clone, Copy, PartialEq)]
pub struct LogBinding {
    pub lane_id: LaneId,
    pub index: usize,
    pub last_x: f32,
}

#[derive(Debug, Clone)]
pub struct Player {
    /// `z` is hop height only and never reaches collision or scoring.
    pub position: Vector3<f32>,
    pub model: CharacterModel,
    pub is_moving: bool,
    pub is_bouncing: bool,
    pub animation_progress: f32,
    pub start_position: Vector3<f32>,
    pub target_position: Vector3<f32>,
    pub bounce_direction: Option<MoveDirection>,
    pub current_log: Option<LogBinding>,
    move_direction: Option<MoveDirection>,
}

impl Player {
    pub fn new(model: CharacterModel) -> Self {
        Player {
            position: Vector3::zeros(),
            model,
            is_moving: false,
            is_bouncing: false,
            animation_progress: 0.0,
            start_position: Vector3::zeros(),
            target_position: Vector3::zeros(),
            bounce_direction: None,
            current_log: None,
            move_direction: None,
        }
    }

    pub fn reset(&mut self) {
        *self = Player::new(self.model);
    }

    pub fn is_busy(&self) -> bool {
        self.is_moving || self.is_bouncing
    }

    pub fn is_on_log(&self) -> bool {
        self.current_log.is_some()
    }

    pub fn ground_position(&self) -> Point2<f32> {
        Point2::new(self.position.x, self.position.y)
    }

    pub fn row(&self, config: &GameConfig) -> i32 {
        config.row_of(self.position.y)
    }

    /// Starts a move or a bounce. Busy players and moves past the field edge are ignored
    /// without touching any state.
    pub fn request_move(
        &mut self,
        direction: MoveDirection,
        config: &GameConfig,
        level: &LevelWindow,
    ) -> MoveOutcome {
        if self.is_busy() {
            return MoveOutcome::Ignored;
        }
        let (dx, dy) = direction.offset();
        let column = config.column_of(self.position.x) + dx;
        let row = self.row(config) + dy;
        if column < config.min_tile_index || column > config.max_tile_index {
            return MoveOutcome::Ignored;
        }
        if level.lane_at(row).is_none() {
            log::debug!("no lane at row {}, ignoring move", row);
            return MoveOutcome::Ignored;
        }

        self.current_log = None;
        self.position.z = 0.0;
        self.start_position = self.position;
        self.animation_progress = 0.0;

        let target = Point2::new(column as f32 * config.tile_size, row as f32 * config.tile_size);
        if collision::is_blocked(config, level, target) {
            self.is_bouncing = true;
            self.bounce_direction = Some(direction);
            self.target_position = self.position;
            return MoveOutcome::Bouncing;
        }

        self.is_moving = true;
        self.move_direction = Some(direction);
        self.target_position = Vector3::new(target.x, target.y, 0.0);
        MoveOutcome::Moving
    }

    pub fn update(
        &mut self,
        dt: f32,
        config: &GameConfig,
        level: &LevelWindow,
    ) -> Option<StepEvent> {
        if self.is_moving {
            self.animation_progress =
                (self.animation_progress + dt / config.move_duration).min(1.0);
            let t = self.animation_progress;
            self.position = self.start_position.lerp(&self.target_position, t);
            self.position.z = (t * std::f32::consts::PI).sin() * config.hop_height;

            if t >= 1.0 {
                self.position = self.target_position;
                self.is_moving = false;
                let direction = self.move_direction.take().unwrap_or(MoveDirection::Forward);
                self.land(config, level);
                return Some(StepEvent::MoveFinished(direction));
            }
            return None;
        }

        if self.is_bouncing {
            self.animation_progress =
                (self.animation_progress + dt / config.bounce_duration).min(1.0);
            let t = self.animation_progress;
            let (dx, dy) = self.bounce_direction.map_or((0, 0), MoveDirection::offset);
            let reach = config.bounce_distance * config.tile_size * 4.0 * t * (1.0 - t);
            let lateral = Vector2::new(dx as f32, dy as f32) * reach;
            self.position = self.start_position + Vector3::new(lateral.x, lateral.y, 0.0);
            self.position.z = (t * std::f32::consts::PI).sin() * config.hop_height * 0.5;

            if t >= 1.0 {
                self.position = self.start_position;
                self.is_bouncing = false;
                self.bounce_direction = None;
                self.land(config, level);
                return Some(StepEvent::BounceFinished);
            }
            return None;
        }

        if self.current_log.is_some() {
            self.ride(config, level);
        }
        None
    }

    fn land(&mut self, config: &GameConfig, level: &LevelWindow) {
        self.current_log = collision::find_supporting_log(config, level, self.ground_position())
            .map(|(lane_id, index, last_x)| LogBinding { lane_id, index, last_x });
    }

    /// Follows the committed position of the bound log. A log that wrapped, vanished or
    /// carried the player past the field edge drops the player into the water.
    fn ride(&mut self, config: &GameConfig, level: &LevelWindow) {
        let Some(binding) = self.current_log.as_mut() else {
            return;
        };
        let Some(log) = level.object(binding.lane_id, binding.index) else {
            log::debug!("ridden log {}:{} no longer exists", binding.lane_id, binding.index);
            self.current_log = None;
            return;
        };

        let half_width = config.lane_width() / 2.0;
        let delta = log.world_x - binding.last_x;
        if delta.abs() > half_width {
            self.current_log = None;
            return;
        }
        binding.last_x = log.world_x;
        self.position.x += delta;
        if self.position.x.abs() > half_width {
            self.current_log = None;
        }
    }
}
