use serde::Serialize;

use crate::game::collision::Hazard;
use crate::game::level::{LaneId, LaneType, ObjectKind};
use crate::game::player::{CharacterModel, MoveDirection};
use crate::game::GameState;

/// Operator toggles. Only `god_mode` reaches the simulation; the rest are for the camera
/// and overlays.
#[derive(Serialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DebugFlags {
    pub grid: bool,
    pub axes: bool,
    pub free_camera: bool,
    pub god_mode: bool,
}

#[derive(Serialize, Clone, Debug)]
pub struct PlayerSnapshot {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub model: CharacterModel,
    pub is_moving: bool,
    pub is_bouncing: bool,
    pub animation_progress: f32,
    pub bounce_direction: Option<MoveDirection>,
    pub is_on_log: bool,
}

#[derive(Serialize, Clone, Debug)]
pub struct ObjectSnapshot {
    pub kind: ObjectKind,
    pub x_index: i32,
    pub x: f32,
    pub committed_x: f32,
    pub z: f32,
    pub direction: f32,
    pub color: Option<(f32, f32, f32)>,
}

#[derive(Serialize, Clone, Debug)]
pub struct LaneSnapshot {
    pub id: LaneId,
    pub lane_type: LaneType,
    pub y_index: i32,
    pub objects: Vec<ObjectSnapshot>,
}

#[derive(Serialize, Clone, Debug)]
pub struct Snapshot {
    pub state: GameState,
    pub score: u32,
    pub high_score: u32,
    pub game_time: u32,
    pub fps: u32,
    pub last_hazard: Option<Hazard>,
    pub player: PlayerSnapshot,
    pub lanes: Vec<LaneSnapshot>,
    pub debug: DebugFlags,
}
