use std::collections::HashMap;

use crate::engine::clock::Accumulator;
use crate::game::config::GameConfig;
use crate::game::level::{LaneId, LevelWindow};

/// Exact wraparound: leaving one side re-enters at the opposite bound.
pub fn wrap_position(x: f32, bound: f32) -> f32 {
    if x > bound {
        -bound
    } else if x < -bound {
        bound
    } else {
        x
    }
}

/// Moves cars and logs every frame and commits their positions to the level at a throttled
/// cadence. Between commits the visual positions run ahead of the committed ones.
pub struct TrafficSim {
    visual: HashMap<LaneId, Vec<f32>>,
    commit_timer: Accumulator,
    clock: f32,
}

impl TrafficSim {
    pub fn new(config: &GameConfig) -> Self {
        TrafficSim {
            visual: HashMap::new(),
            commit_timer: Accumulator::new(config.commit_interval),
            clock: 0.0,
        }
    }

    pub fn reset(&mut self) {
        self.visual.clear();
        self.commit_timer.reset();
        self.clock = 0.0;
    }

    pub fn advance(&mut self, config: &GameConfig, level: &mut LevelWindow, dt: f32) {
        self.clock += dt;
        let bound = config.wrap_bound();

        self.visual.retain(|id, _| level.lane_by_id(*id).is_some());
        for lane in level.lanes() {
            if !lane.objects.iter().any(|o| o.is_moving()) {
                continue;
            }
            let positions = self
                .visual
                .entry(lane.id)
                .or_insert_with(|| lane.objects.iter().map(|o| o.world_x).collect());
            for (x, object) in positions.iter_mut().zip(&lane.objects) {
                *x = wrap_position(*x + object.velocity() * dt, bound);
            }
        }

        if self.commit_timer.tick(dt) > 0 {
            for (lane_id, positions) in &self.visual {
                for (index, x) in positions.iter().enumerate() {
                    level.commit_object_position(*lane_id, index, *x);
                }
            }
        }
    }

    pub fn visual_x(&self, lane_id: LaneId, index: usize) -> Option<f32> {
        self.visual.get(&lane_id).and_then(|p| p.get(index)).copied()
    }

    pub fn bob_offset(&self, config: &GameConfig) -> f32 {
        (2.0 * std::f32::consts::PI * self.clock / config.bob_period).sin() * config.bob_amplitude
    }
}
