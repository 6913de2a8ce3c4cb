use std::collections::VecDeque;

use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use serde::Serialize;

use crate::game::config::GameConfig;

pub type LaneId = u64;

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LaneType {
    Grass,
    Road,
    Water,
}

impl LaneType {
    pub const ALL: [LaneType; 3] = [LaneType::Grass, LaneType::Road, LaneType::Water];
}

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Tree,
    Log,
    Car,
}

const CAR_COLORS: [(f32, f32, f32); 8] = [
    (0.9, 0.2, 0.2),
    (0.2, 0.5, 0.9),
    (0.2, 0.8, 0.3),
    (0.95, 0.8, 0.2),
    (0.9, 0.4, 0.1),
    (0.7, 0.2, 0.8),
    (0.1, 0.8, 0.8),
    (0.95, 0.95, 0.95),
];

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct LaneObject {
    pub x_index: i32,
    pub kind: ObjectKind,
    pub world_x: f32,
    pub speed: f32,
    pub direction: f32,
    pub color: Option<(f32, f32, f32)>,
}

impl LaneObject {
    fn tree(x_index: i32, tile_size: f32) -> Self {
        LaneObject {
            x_index,
            kind: ObjectKind::Tree,
            world_x: x_index as f32 * tile_size,
            speed: 0.0,
            direction: 1.0,
            color: None,
        }
    }

    pub fn velocity(&self) -> f32 {
        self.speed * self.direction
    }

    pub fn is_moving(&self) -> bool {
        self.kind != ObjectKind::Tree
    }
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct Lane {
    pub id: LaneId,
    pub lane_type: LaneType,
    pub y_index: i32,
    pub objects: Vec<LaneObject>,
}

#[derive(Serialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunCounts {
    pub grass: u32,
    pub road: u32,
    pub water: u32,
}

impl RunCounts {
    pub fn get(&self, lane_type: LaneType) -> u32 {
        match lane_type {
            LaneType::Grass => self.grass,
            LaneType::Road => self.road,
            LaneType::Water => self.water,
        }
    }

    /// Counts after appending one lane of `lane_type`: that run grows, the others reset.
    pub fn after(&self, lane_type: LaneType) -> RunCounts {
        let mut next = RunCounts::default();
        match lane_type {
            LaneType::Grass => next.grass = self.grass + 1,
            LaneType::Road => next.road = self.road + 1,
            LaneType::Water => next.water = self.water + 1,
        }
        next
    }
}

fn cap(config: &GameConfig, lane_type: LaneType) -> u32 {
    match lane_type {
        LaneType::Grass => config.grass_cap,
        LaneType::Road => config.road_cap,
        LaneType::Water => config.water_cap,
    }
}

fn weight(config: &GameConfig, lane_type: LaneType) -> f64 {
    match lane_type {
        LaneType::Grass => config.grass_weight,
        LaneType::Road => config.road_weight,
        LaneType::Water => config.water_weight,
    }
}

pub fn pick_lane_type<R: Rng + ?Sized>(
    config: &GameConfig,
    counts: &RunCounts,
    rng: &mut R,
) -> LaneType {
    let eligible: Vec<LaneType> = LaneType::ALL
        .into_iter()
        .filter(|t| counts.get(*t) < cap(config, *t) && weight(config, *t) > 0.0)
        .collect();

    match WeightedIndex::new(eligible.iter().map(|t| weight(config, *t))) {
        Ok(dist) => eligible[dist.sample(rng)],
        Err(_) => LaneType::Grass,
    }
}

/// Builds the lane at `y_index`. The lane id counter and run counts go in and come back
/// out updated; all randomness comes from `rng`.
pub fn generate_lane<R: Rng + ?Sized>(
    config: &GameConfig,
    y_index: i32,
    next_id: LaneId,
    counts: RunCounts,
    rng: &mut R,
) -> (Lane, LaneId, RunCounts) {
    let lane_type = pick_lane_type(config, &counts, rng);
    let objects = populate(config, lane_type, rng);
    let lane = Lane { id: next_id, lane_type, y_index, objects };
    (lane, next_id + 1, counts.after(lane_type))
}

/// The spawn row is always grass with nothing but trees, and its centre is kept clear.
pub fn generate_spawn_lane<R: Rng + ?Sized>(
    config: &GameConfig,
    next_id: LaneId,
    rng: &mut R,
) -> (Lane, LaneId) {
    let lane = Lane {
        id: next_id,
        lane_type: LaneType::Grass,
        y_index: 0,
        objects: populate_grass(config, rng),
    };
    (lane, next_id + 1)
}

fn populate<R: Rng + ?Sized>(
    config: &GameConfig,
    lane_type: LaneType,
    rng: &mut R,
) -> Vec<LaneObject> {
    match lane_type {
        LaneType::Grass => populate_grass(config, rng),
        LaneType::Water => populate_water(config, rng),
        LaneType::Road => populate_road(config, rng),
    }
}

fn populate_grass<R: Rng + ?Sized>(config: &GameConfig, rng: &mut R) -> Vec<LaneObject> {
    let mut trees = Vec::new();
    for x in config.min_tile_index..=config.max_tile_index {
        let distance = x.abs();
        let chance = if distance <= config.safe_clear_half_width {
            continue;
        } else if distance <= config.safe_zone_half_width {
            config.safe_zone_tree_chance
        } else {
            config.tree_density
        };
        if rng.gen_bool(chance.clamp(0.0, 1.0)) {
            trees.push(LaneObject::tree(x, config.tile_size));
        }
    }
    trees
}

fn random_direction<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    if rng.gen_bool(0.5) { 1.0 } else { -1.0 }
}

fn populate_water<R: Rng + ?Sized>(config: &GameConfig, rng: &mut R) -> Vec<LaneObject> {
    let direction = random_direction(rng);
    let mut logs = Vec::new();
    let mut x = config.min_tile_index;
    while x <= config.max_tile_index {
        if rng.gen_bool(config.log_chance.clamp(0.0, 1.0)) {
            logs.push(LaneObject {
                x_index: x,
                kind: ObjectKind::Log,
                world_x: x as f32 * config.tile_size,
                speed: config.log_speed,
                direction,
                color: None,
            });
        }
        x += config.log_slot_spacing;
    }
    logs
}

fn populate_road<R: Rng + ?Sized>(config: &GameConfig, rng: &mut R) -> Vec<LaneObject> {
    let direction = random_direction(rng);
    let count = rng.gen_range(config.min_cars..=config.max_cars);
    let width = config.lane_width();
    let spacing = width / count as f32;

    (0..count)
        .map(|i| {
            let world_x = -width / 2.0 + (i as f32 + 0.5) * spacing;
            let color = CAR_COLORS[rng.gen_range(0..CAR_COLORS.len())];
            LaneObject {
                x_index: config.column_of(world_x),
                kind: ObjectKind::Car,
                world_x,
                speed: config.car_speed,
                direction,
                color: Some(color),
            }
        })
        .collect()
}

/// The sliding set of active lanes, ordered by `y_index` with no gaps.
#[derive(Clone, Debug)]
pub struct LevelWindow {
    lanes: VecDeque<Lane>,
    next_id: LaneId,
    counts: RunCounts,
}

impl LevelWindow {
    pub fn initialize<R: Rng + ?Sized>(config: &GameConfig, rng: &mut R) -> Self {
        let (spawn, mut next_id) = generate_spawn_lane(config, 0, rng);

        // Rows behind spawn are grown downward so the grass run through spawn respects the cap
        // on both sides.
        let mut behind = Vec::with_capacity(config.lanes_behind as usize);
        let mut counts = RunCounts::default().after(LaneType::Grass);
        for y in (-config.lanes_behind..0).rev() {
            let (lane, id, next_counts) = generate_lane(config, y, next_id, counts, rng);
            behind.push(lane);
            next_id = id;
            counts = next_counts;
        }
        let grass_behind =
            behind.iter().take_while(|l| l.lane_type == LaneType::Grass).count() as u32;

        let mut lanes: VecDeque<Lane> = behind.into_iter().rev().collect();
        lanes.push_back(spawn);

        let mut window = LevelWindow {
            lanes,
            next_id,
            counts: RunCounts { grass: 1 + grass_behind, road: 0, water: 0 },
        };
        for _ in 0..config.lanes_ahead {
            window.add_lane_ahead(config, rng);
        }
        window
    }

    pub fn from_lanes(lanes: impl IntoIterator<Item = Lane>) -> Self {
        let mut lanes: Vec<Lane> = lanes.into_iter().collect();
        lanes.sort_by_key(|l| l.y_index);
        let next_id = lanes.iter().map(|l| l.id + 1).max().unwrap_or(0);
        let counts = lanes
            .iter()
            .fold(RunCounts::default(), |counts, lane| counts.after(lane.lane_type));
        LevelWindow { lanes: lanes.into(), next_id, counts }
    }

    pub fn add_lane_ahead<R: Rng + ?Sized>(&mut self, config: &GameConfig, rng: &mut R) -> i32 {
        let y_index = self.frontier().map_or(0, |y| y + 1);
        let (lane, next_id, counts) =
            generate_lane(config, y_index, self.next_id, self.counts, rng);
        self.lanes.push_back(lane);
        self.next_id = next_id;
        self.counts = counts;
        y_index
    }

    pub fn remove_lane_behind(&mut self) -> Option<Lane> {
        self.lanes.pop_front()
    }

    pub fn len(&self) -> usize {
        self.lanes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lanes.is_empty()
    }

    pub fn lanes(&self) -> impl Iterator<Item = &Lane> {
        self.lanes.iter()
    }

    pub fn frontier(&self) -> Option<i32> {
        self.lanes.back().map(|l| l.y_index)
    }

    pub fn rear(&self) -> Option<i32> {
        self.lanes.front().map(|l| l.y_index)
    }

    pub fn counts(&self) -> RunCounts {
        self.counts
    }

    pub fn lane_at(&self, y_index: i32) -> Option<&Lane> {
        self.lanes.iter().find(|l| l.y_index == y_index)
    }

    pub fn lane_by_id(&self, id: LaneId) -> Option<&Lane> {
        self.lanes.iter().find(|l| l.id == id)
    }

    pub fn object(&self, lane_id: LaneId, index: usize) -> Option<&LaneObject> {
        self.lane_by_id(lane_id).and_then(|l| l.objects.get(index))
    }

    /// Commits a simulated position. Updates aimed at evicted lanes or missing objects are
    /// dropped.
    pub fn commit_object_position(
        &mut self,
        lane_id: LaneId,
        index: usize,
        world_x: f32,
    ) -> bool {
        let object = self
            .lanes
            .iter_mut()
            .find(|l| l.id == lane_id)
            .and_then(|l| l.objects.get_mut(index));
        match object {
            Some(object) => {
                object.world_x = world_x;
                true
            }
            None => {
                log::debug!("dropping position update for lane {} object {}", lane_id, index);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn longest_runs(lanes: &[&Lane]) -> RunCounts {
        let mut best = RunCounts::default();
        let mut current = RunCounts::default();
        for lane in lanes {
            current = current.after(lane.lane_type);
            best.grass = best.grass.max(current.grass);
            best.road = best.road.max(current.road);
            best.water = best.water.max(current.water);
        }
        best
    }

    #[test]
    fn runs_never_exceed_caps() {
        let config = GameConfig::default();
        for seed in 0..20 {
            let mut rng = SmallRng::seed_from_u64(seed);
            let mut window = LevelWindow::initialize(&config, &mut rng);
            let mut all: Vec<Lane> = window.lanes().cloned().collect();
            for _ in 0..500 {
                window.add_lane_ahead(&config, &mut rng);
                window.remove_lane_behind();
                all.push(window.lanes().last().cloned().unwrap());
            }
            let refs: Vec<&Lane> = all.iter().collect();
            let runs = longest_runs(&refs);
            assert!(runs.grass <= 4, "seed {seed}: grass run {}", runs.grass);
            assert!(runs.road <= 8, "seed {seed}: road run {}", runs.road);
            assert!(runs.water <= 6, "seed {seed}: water run {}", runs.water);
        }
    }

    #[test]
    fn zero_weight_types_are_never_picked() {
        let config = GameConfig { road_weight: 0.0, ..GameConfig::default() };
        let counts = RunCounts { grass: config.grass_cap, road: 0, water: 0 };
        let mut rng = SmallRng::seed_from_u64(8);
        for _ in 0..200 {
            assert_eq!(pick_lane_type(&config, &counts, &mut rng), LaneType::Water);
        }
    }

    #[test]
    fn two_type_configs_respect_caps() {
        let config = GameConfig { water_weight: 0.0, ..GameConfig::default() };
        assert!(config.validate().is_ok());
        let mut rng = SmallRng::seed_from_u64(4);
        let mut window = LevelWindow::initialize(&config, &mut rng);
        let mut all: Vec<Lane> = window.lanes().cloned().collect();
        for _ in 0..300 {
            window.add_lane_ahead(&config, &mut rng);
            window.remove_lane_behind();
            all.push(window.lanes().last().cloned().unwrap());
        }
        let refs: Vec<&Lane> = all.iter().collect();
        let runs = longest_runs(&refs);
        assert!(runs.grass <= config.grass_cap, "grass run {}", runs.grass);
        assert!(runs.road <= config.road_cap, "road run {}", runs.road);
        assert_eq!(runs.water, 0);
    }

    #[test]
    fn exhausted_caps_force_grass() {
        let config =
            GameConfig { grass_cap: 1, road_cap: 1, water_cap: 1, ..GameConfig::default() };
        let counts = RunCounts { grass: 1, road: 1, water: 1 };
        let mut rng = SmallRng::seed_from_u64(3);
        assert_eq!(pick_lane_type(&config, &counts, &mut rng), LaneType::Grass);
    }

    #[test]
    fn capped_type_is_never_picked() {
        let config = GameConfig::default();
        let counts = RunCounts { grass: 4, road: 0, water: 0 };
        let mut rng = SmallRng::seed_from_u64(11);
        for _ in 0..200 {
            assert_ne!(pick_lane_type(&config, &counts, &mut rng), LaneType::Grass);
        }
    }

    #[test]
    fn spawn_lane_is_grass_with_clear_centre() {
        let config = GameConfig::default();
        for seed in 0..50 {
            let mut rng = SmallRng::seed_from_u64(seed);
            let window = LevelWindow::initialize(&config, &mut rng);
            let spawn = window.lane_at(0).unwrap();
            assert_eq!(spawn.lane_type, LaneType::Grass);
            assert!(spawn.objects.iter().all(|o| o.kind == ObjectKind::Tree));
            assert!(spawn.objects.iter().all(|o| o.x_index.abs() > config.safe_clear_half_width));
        }
    }

    #[test]
    fn objects_match_their_lane_type() {
        let config = GameConfig::default();
        let mut rng = SmallRng::seed_from_u64(7);
        let mut counts = RunCounts::default();
        for y in 1..400 {
            let (lane, _, next) = generate_lane(&config, y, y as u64, counts, &mut rng);
            counts = next;
            for object in &lane.objects {
                let expected = match lane.lane_type {
                    LaneType::Grass => ObjectKind::Tree,
                    LaneType::Road => ObjectKind::Car,
                    LaneType::Water => ObjectKind::Log,
                };
                assert_eq!(object.kind, expected);
            }
        }
    }

    #[test]
    fn moving_lanes_share_direction_and_speed() {
        let config = GameConfig::default();
        let mut rng = SmallRng::seed_from_u64(21);
        let mut counts = RunCounts::default();
        for y in 1..200 {
            let (lane, _, next) = generate_lane(&config, y, 0, counts, &mut rng);
            counts = next;
            match lane.lane_type {
                LaneType::Road => {
                    let n = lane.objects.len() as u32;
                    assert!((config.min_cars..=config.max_cars).contains(&n));
                    assert!(lane.objects.iter().all(|o| o.color.is_some()));
                    assert!(lane.objects.iter().all(|o| o.speed == config.car_speed));
                }
                LaneType::Water => {
                    assert!(lane.objects.iter().all(|o| o.speed == config.log_speed));
                    let slot = |o: &LaneObject| o.x_index - config.min_tile_index;
                    assert!(lane.objects.iter().all(|o| slot(o) % config.log_slot_spacing == 0));
                }
                LaneType::Grass => assert!(lane.objects.iter().all(|o| o.speed == 0.0)),
            }
            if let Some(first) = lane.objects.first() {
                assert!(lane.objects.iter().all(|o| o.direction == first.direction));
            }
        }
    }

    #[test]
    fn cars_are_evenly_spaced() {
        let config = GameConfig { min_cars: 2, max_cars: 2, ..GameConfig::default() };
        let mut rng = SmallRng::seed_from_u64(5);
        let cars = populate_road(&config, &mut rng);
        assert_eq!(cars.len(), 2);
        assert_eq!(cars[0].world_x, -4.25);
        assert_eq!(cars[1].world_x, 4.25);
    }

    #[test]
    fn window_is_contiguous_with_unique_ids() {
        let config = GameConfig::default();
        let mut rng = SmallRng::seed_from_u64(99);
        let mut window = LevelWindow::initialize(&config, &mut rng);
        assert_eq!(window.len(), config.window_size());
        assert_eq!(window.rear(), Some(-config.lanes_behind));
        assert_eq!(window.frontier(), Some(config.lanes_ahead));

        for _ in 0..50 {
            window.add_lane_ahead(&config, &mut rng);
            window.remove_lane_behind();
            assert_eq!(window.len(), config.window_size());
        }
        let rows: Vec<i32> = window.lanes().map(|l| l.y_index).collect();
        assert!(rows.windows(2).all(|w| w[1] == w[0] + 1));
        let mut ids: Vec<LaneId> = window.lanes().map(|l| l.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), window.len());
    }

    #[test]
    fn same_seed_same_level() {
        let config = GameConfig::default();
        let a = LevelWindow::initialize(&config, &mut SmallRng::seed_from_u64(42));
        let b = LevelWindow::initialize(&config, &mut SmallRng::seed_from_u64(42));
        assert!(a.lanes().zip(b.lanes()).all(|(x, y)| x == y));
    }

    #[test]
    fn commit_to_missing_lane_is_dropped() {
        let config = GameConfig::default();
        let mut rng = SmallRng::seed_from_u64(1);
        let mut window = LevelWindow::initialize(&config, &mut rng);
        let evicted = window.remove_lane_behind().unwrap();
        assert!(!window.commit_object_position(evicted.id, 0, 3.0));

        let spawn_id = window.lane_at(0).unwrap().id;
        assert!(!window.commit_object_position(spawn_id, 10_000, 3.0));
    }
}
