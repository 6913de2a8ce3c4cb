use nalgebra::Point2;
use serde::Serialize;

use crate::engine::clock::Accumulator;
use crate::game::config::{Footprint, GameConfig};
use crate::game::geometry::Aabb;
use crate::game::level::{LaneId, LaneObject, LaneType, LevelWindow, ObjectKind};
use crate::game::player::Player;

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Hazard {
    Car,
    Drowned,
}

fn footprint_of(config: &GameConfig, kind: ObjectKind) -> Footprint {
    match kind {
        ObjectKind::Tree => config.tree_footprint,
        ObjectKind::Car => config.car_footprint,
        ObjectKind::Log => config.log_footprint,
    }
}

pub fn player_box(config: &GameConfig, center: Point2<f32>) -> Aabb {
    Aabb::from_center(center, config.player_footprint)
}

pub fn object_box(config: &GameConfig, object: &LaneObject, y_index: i32) -> Aabb {
    let center = Point2::new(object.world_x, y_index as f32 * config.tile_size);
    Aabb::from_center(center, footprint_of(config, object.kind))
}

fn neighbour_rows(row: i32) -> impl Iterator<Item = i32> {
    row - 1..=row + 1
}

pub fn is_blocked(config: &GameConfig, level: &LevelWindow, target: Point2<f32>) -> bool {
    let subject = player_box(config, target);
    neighbour_rows(config.row_of(target.y))
        .filter_map(|row| level.lane_at(row))
        .filter(|lane| lane.lane_type == LaneType::Grass)
        .any(|lane| {
            lane.objects
                .iter()
                .filter(|o| o.kind == ObjectKind::Tree)
                .any(|tree| subject.intersects(&object_box(config, tree, lane.y_index)))
        })
}

/// First log in the player's own row that covers at least `mount_threshold` of the
/// player's footprint. Returns the lane id, object index and committed x of that log.
pub fn find_supporting_log(
    config: &GameConfig,
    level: &LevelWindow,
    center: Point2<f32>,
) -> Option<(LaneId, usize, f32)> {
    let lane = level.lane_at(config.row_of(center.y))?;
    if lane.lane_type != LaneType::Water {
        return None;
    }
    let subject = player_box(config, center);
    lane.objects
        .iter()
        .enumerate()
        .filter(|(_, o)| o.kind == ObjectKind::Log)
        .find(|(_, log)| {
            subject.overlap_ratio(&object_box(config, log, lane.y_index)) >= config.mount_threshold
        })
        .map(|(index, log)| (lane.id, index, log.world_x))
}

/// Fatal conditions for a stationary player. God mode suppresses all of them.
pub fn check_hazards(
    config: &GameConfig,
    level: &LevelWindow,
    player: &Player,
    god_mode: bool,
) -> Option<Hazard> {
    if god_mode {
        return None;
    }
    let center = player.ground_position();
    let row = config.row_of(center.y);
    let subject = player_box(config, center);

    let hit = neighbour_rows(row)
        .filter_map(|r| level.lane_at(r))
        .filter(|lane| lane.lane_type == LaneType::Road)
        .any(|lane| {
            lane.objects
                .iter()
                .filter(|o| o.kind == ObjectKind::Car)
                .any(|car| subject.intersects(&object_box(config, car, lane.y_index)))
        });
    if hit {
        return Some(Hazard::Car);
    }

    match level.lane_at(row) {
        Some(lane) if lane.lane_type == LaneType::Water && !player.is_on_log() => {
            Some(Hazard::Drowned)
        }
        _ => None,
    }
}

/// Runs the hazard check on a fixed interval of accumulated frame time, skipping samples
/// while the player is mid-move or mid-bounce.
pub struct HazardSampler {
    timer: Accumulator,
}

impl HazardSampler {
    pub fn new(config: &GameConfig) -> Self {
        HazardSampler { timer: Accumulator::new(config.hazard_interval) }
    }

    pub fn reset(&mut self) {
        self.timer.reset();
    }

    pub fn sample(
        &mut self,
        dt: f32,
        config: &GameConfig,
        level: &LevelWindow,
        player: &Player,
        god_mode: bool,
    ) -> Option<Hazard> {
        if self.timer.tick(dt) == 0 || player.is_busy() {
            return None;
        }
        check_hazards(config, level, player, god_mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::level::Lane;
    use crate::game::player::{CharacterModel, LogBinding};

    fn object(kind: ObjectKind, x_index: i32, world_x: f32, speed: f32) -> LaneObject {
        LaneObject { x_index, kind, world_x, speed, direction: 1.0, color: None }
    }

    fn car(world_x: f32) -> LaneObject {
        object(ObjectKind::Car, 0, world_x, 3.0)
    }

    fn log(world_x: f32) -> LaneObject {
        object(ObjectKind::Log, 0, world_x, 1.5)
    }

    fn tree(x_index: i32) -> LaneObject {
        object(ObjectKind::Tree, x_index, x_index as f32, 0.0)
    }

    fn lane(id: LaneId, y_index: i32, lane_type: LaneType, objects: Vec<LaneObject>) -> Lane {
        Lane { id, lane_type, y_index, objects }
    }

    #[test]
    fn tree_blocks_its_own_cell_only() {
        let config = GameConfig::default();
        let level = LevelWindow::from_lanes(vec![lane(0, 0, LaneType::Grass, vec![tree(2)])]);
        assert!(is_blocked(&config, &level, Point2::new(2.0, 0.0)));
        assert!(!is_blocked(&config, &level, Point2::new(1.0, 0.0)));
        assert!(!is_blocked(&config, &level, Point2::new(3.0, 0.0)));
    }

    #[test]
    fn car_overlap_is_fatal() {
        let config = GameConfig::default();
        let level = LevelWindow::from_lanes(vec![lane(0, 0, LaneType::Road, vec![car(0.5)])]);
        let player = Player::new(CharacterModel::Frog);
        assert_eq!(check_hazards(&config, &level, &player, false), Some(Hazard::Car));
    }

    #[test]
    fn distant_car_is_harmless() {
        let config = GameConfig::default();
        let level = LevelWindow::from_lanes(vec![lane(0, 0, LaneType::Road, vec![car(5.0)])]);
        let player = Player::new(CharacterModel::Frog);
        assert_eq!(check_hazards(&config, &level, &player, false), None);
    }

    #[test]
    fn god_mode_suppresses_every_hazard() {
        let config = GameConfig::default();
        let road = LevelWindow::from_lanes(vec![lane(0, 0, LaneType::Road, vec![car(0.0)])]);
        let water = LevelWindow::from_lanes(vec![lane(0, 0, LaneType::Water, vec![])]);
        let player = Player::new(CharacterModel::Frog);
        assert_eq!(check_hazards(&config, &road, &player, true), None);
        assert_eq!(check_hazards(&config, &water, &player, true), None);
    }

    #[test]
    fn open_water_drowns() {
        let config = GameConfig::default();
        let level = LevelWindow::from_lanes(vec![lane(0, 0, LaneType::Water, vec![])]);
        let player = Player::new(CharacterModel::Frog);
        assert_eq!(check_hazards(&config, &level, &player, false), Some(Hazard::Drowned));
    }

    #[test]
    fn mounted_player_stays_dry() {
        let config = GameConfig::default();
        let level = LevelWindow::from_lanes(vec![lane(3, 0, LaneType::Water, vec![log(0.0)])]);
        let mut player = Player::new(CharacterModel::Frog);
        player.current_log = Some(LogBinding { lane_id: 3, index: 0, last_x: 0.0 });
        assert_eq!(check_hazards(&config, &level, &player, false), None);

        player.current_log = None;
        assert_eq!(check_hazards(&config, &level, &player, false), Some(Hazard::Drowned));
    }

    #[test]
    fn mount_threshold_is_inclusive() {
        let config = GameConfig::default();
        let level = LevelWindow::from_lanes(vec![lane(4, 0, LaneType::Water, vec![log(0.0)])]);
        // Player box spans 0.625..1.375, log spans -1..1: exactly half the footprint.
        let edge = find_supporting_log(&config, &level, Point2::new(1.0, 0.0));
        assert_eq!(edge, Some((4, 0, 0.0)));
        assert_eq!(find_supporting_log(&config, &level, Point2::new(1.125, 0.0)), None);
    }

    #[test]
    fn logs_only_support_on_water() {
        let config = GameConfig::default();
        let level = LevelWindow::from_lanes(vec![lane(0, 0, LaneType::Grass, vec![])]);
        assert_eq!(find_supporting_log(&config, &level, Point2::new(0.0, 0.0)), None);
    }

    #[test]
    fn sampler_waits_for_interval() {
        let config = GameConfig { hazard_interval: 0.125, ..GameConfig::default() };
        let level = LevelWindow::from_lanes(vec![lane(0, 0, LaneType::Water, vec![])]);
        let player = Player::new(CharacterModel::Frog);
        let mut sampler = HazardSampler::new(&config);
        assert_eq!(sampler.sample(0.0625, &config, &level, &player, false), None);
        let hazard = sampler.sample(0.0625, &config, &level, &player, false);
        assert_eq!(hazard, Some(Hazard::Drowned));
    }
}
