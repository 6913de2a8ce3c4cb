/// Accumulate-and-drain counter that turns variable frame deltas into a fixed cadence.
#[derive(Clone, Copy, Debug)]
pub struct Accumulator {
    interval: f32,
    acc: f32,
}

impl Accumulator {
    pub fn new(interval: f32) -> Self {
        Accumulator { interval, acc: 0.0 }
    }

    pub fn tick(&mut self, dt: f32) -> u32 {
        if self.interval <= 0.0 {
            return 0;
        }
        self.acc += dt.max(0.0);
        let mut drained = 0;
        while self.acc >= self.interval {
            self.acc -= self.interval;
            drained += 1;
        }
        drained
    }

    pub fn reset(&mut self) {
        self.acc = 0.0;
    }
}

/// Elapsed play time. Only advances while running, so paused spans are never counted.
#[derive(Clone, Copy, Debug, Default)]
pub struct SessionTimer {
    elapsed: f64,
    running: bool,
}

impl SessionTimer {
    pub fn start(&mut self) {
        self.elapsed = 0.0;
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn resume(&mut self) {
        self.running = true;
    }

    pub fn advance(&mut self, dt: f32) {
        if self.running {
            self.elapsed += dt.max(0.0) as f64;
        }
    }

    pub fn seconds(&self) -> u32 {
        self.elapsed.floor() as u32
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct FrameCounter {
    frames: u32,
    window: f32,
    fps: u32,
}

impl FrameCounter {
    pub fn record(&mut self, dt: f32) {
        self.frames += 1;
        self.window += dt.max(0.0);
        if self.window >= 1.0 {
            self.fps = (self.frames as f32 / self.window).round() as u32;
            self.frames = 0;
            self.window = 0.0;
        }
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    pub fn reset(&mut self) {
        *self = FrameCounter::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulator_drains_whole_intervals() {
        let mut acc = Accumulator::new(0.125);
        assert_eq!(acc.tick(0.0625), 0);
        assert_eq!(acc.tick(0.0625), 1);
        assert_eq!(acc.tick(0.375), 3);
        acc.reset();
        assert_eq!(acc.tick(0.0625), 0);
    }

    #[test]
    fn accumulator_is_frame_rate_independent() {
        let mut fast = Accumulator::new(0.125);
        let mut slow = Accumulator::new(0.125);
        let fast_total: u32 = (0..64).map(|_| fast.tick(1.0 / 64.0)).sum();
        let slow_total: u32 = (0..4).map(|_| slow.tick(0.25)).sum();
        assert_eq!(fast_total, 8);
        assert_eq!(slow_total, 8);
    }

    #[test]
    fn timer_excludes_stopped_time() {
        let mut timer = SessionTimer::default();
        timer.start();
        timer.advance(1.5);
        timer.stop();
        timer.advance(10.0);
        timer.resume();
        timer.advance(0.75);
        assert_eq!(timer.seconds(), 2);
    }

    #[test]
    fn frame_counter_reports_after_a_second() {
        let mut counter = FrameCounter::default();
        for _ in 0..32 {
            counter.record(1.0 / 32.0);
        }
        assert_eq!(counter.fps(), 32);
        counter.reset();
        assert_eq!(counter.fps(), 0);
    }
}
