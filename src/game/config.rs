use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config is not valid json: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct Footprint {
    pub length: f32,
    pub width: f32,
}

impl Footprint {
    pub const fn new(length: f32, width: f32) -> Self {
        Footprint { length, width }
    }
}

/// Every tunable of the engine. Missing fields in `/assets/config.json` take the defaults.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(default)]
pub struct GameConfig {
    pub tile_size: f32,
    pub min_tile_index: i32,
    pub max_tile_index: i32,
    pub wrap_buffer: f32,
    pub lanes_behind: i32,
    pub lanes_ahead: i32,

    pub grass_cap: u32,
    pub road_cap: u32,
    pub water_cap: u32,
    pub grass_weight: f64,
    pub road_weight: f64,
    pub water_weight: f64,

    pub safe_zone_half_width: i32,
    pub safe_clear_half_width: i32,
    pub safe_zone_tree_chance: f64,
    pub tree_density: f64,
    pub log_slot_spacing: i32,
    pub log_chance: f64,
    pub log_speed: f32,
    pub car_speed: f32,
    pub min_cars: u32,
    pub max_cars: u32,

    pub move_duration: f32,
    pub bounce_duration: f32,
    pub hop_height: f32,
    pub bounce_distance: f32,
    pub bob_period: f32,
    pub bob_amplitude: f32,

    pub player_footprint: Footprint,
    pub tree_footprint: Footprint,
    pub car_footprint: Footprint,
    pub log_footprint: Footprint,

    pub commit_interval: f32,
    pub hazard_interval: f32,
    pub mount_threshold: f32,
    pub max_frame_dt: f32,

    pub storage_key: String,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            tile_size: 1.0,
            min_tile_index: -8,
            max_tile_index: 8,
            wrap_buffer: 2.0,
            lanes_behind: 5,
            lanes_ahead: 20,

            grass_cap: 4,
            road_cap: 8,
            water_cap: 6,
            grass_weight: 0.40,
            road_weight: 0.35,
            water_weight: 0.25,

            safe_zone_half_width: 3,
            safe_clear_half_width: 1,
            safe_zone_tree_chance: 0.5,
            tree_density: 0.7,
            log_slot_spacing: 3,
            log_chance: 0.7,
            log_speed: 1.5,
            car_speed: 3.0,
            min_cars: 1,
            max_cars: 3,

            move_duration: 0.2,
            bounce_duration: 0.2,
            hop_height: 0.5,
            bounce_distance: 0.25,
            bob_period: 2.0,
            bob_amplitude: 0.05,

            player_footprint: Footprint::new(0.75, 0.75),
            tree_footprint: Footprint::new(0.75, 0.75),
            car_footprint: Footprint::new(1.5, 0.75),
            log_footprint: Footprint::new(2.0, 0.875),

            commit_interval: 0.1,
            hazard_interval: 0.1,
            mount_threshold: 0.5,
            max_frame_dt: 0.05,

            storage_key: "froggy-road-high-score".to_string(),
        }
    }
}

impl GameConfig {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tile_size <= 0.0 {
            return Err(ConfigError::Invalid("tile_size must be positive".into()));
        }
        if self.min_tile_index > 0 || self.max_tile_index < 0 {
            return Err(ConfigError::Invalid(format!(
                "tile range {}..={} must contain the spawn column",
                self.min_tile_index, self.max_tile_index
            )));
        }
        if self.lanes_behind < 0 || self.lanes_ahead < 1 {
            return Err(ConfigError::Invalid("lane window must extend ahead of spawn".into()));
        }
        if self.min_cars == 0 || self.min_cars > self.max_cars {
            return Err(ConfigError::Invalid(format!(
                "car count range {}..={} is empty",
                self.min_cars, self.max_cars
            )));
        }
        if self.log_slot_spacing < 1 {
            return Err(ConfigError::Invalid("log_slot_spacing must be at least 1".into()));
        }
        if self.grass_cap == 0 {
            return Err(ConfigError::Invalid("grass_cap must be at least 1".into()));
        }
        let lane_types = [
            (self.grass_weight, self.grass_cap),
            (self.road_weight, self.road_cap),
            (self.water_weight, self.water_cap),
        ];
        if lane_types.iter().any(|(w, _)| *w < 0.0) {
            return Err(ConfigError::Invalid("lane weights must be non-negative".into()));
        }
        // A capped run needs another type to hand over to
        if lane_types.iter().filter(|(w, cap)| *w > 0.0 && *cap > 0).count() < 2 {
            return Err(ConfigError::Invalid(
                "at least two lane types need a positive weight and cap".into(),
            ));
        }
        let timings = [
            self.move_duration,
            self.bounce_duration,
            self.commit_interval,
            self.hazard_interval,
            self.bob_period,
            self.max_frame_dt,
        ];
        if timings.iter().any(|t| *t <= 0.0) {
            return Err(ConfigError::Invalid("durations and intervals must be positive".into()));
        }
        Ok(())
    }

    pub fn lane_width(&self) -> f32 {
        (self.max_tile_index - self.min_tile_index + 1) as f32 * self.tile_size
    }

    pub fn wrap_bound(&self) -> f32 {
        self.lane_width() / 2.0 + self.wrap_buffer
    }

    pub fn window_size(&self) -> usize {
        (self.lanes_behind + self.lanes_ahead + 1) as usize
    }

    pub fn row_of(&self, y: f32) -> i32 {
        (y / self.tile_size).round() as i32
    }

    pub fn column_of(&self, x: f32) -> i32 {
        (x / self.tile_size).round() as i32
    }
}
