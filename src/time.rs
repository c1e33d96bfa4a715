//! Clock for the fps readout and section reveal timing
//!
//! `now_seconds` reads `performance.now()` in the browser and a process-start
//! `Instant` natively, so reveal elapsed times and `FpsCounter` ticks share
//! one time base on both platforms.

#[cfg(target_arch = "wasm32")]
pub fn now_seconds() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now() / 1000.0)
        .unwrap_or(0.0)
}

#[cfg(not(target_arch = "wasm32"))]
pub fn now_seconds() -> f64 {
    use std::sync::OnceLock;
    use std::time::Instant;

    static START: OnceLock<Instant> = OnceLock::new();
    START.get_or_init(Instant::now).elapsed().as_secs_f64()
}

/// Frames-per-second over a sliding window of recent ticks
#[derive(Debug, Default)]
pub struct FpsCounter {
    ticks: std::collections::VecDeque<f64>,
}

impl FpsCounter {
    const WINDOW: usize = 60;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn tick(&mut self) {
        self.tick_at(now_seconds());
    }

    /// Record a tick at `now` seconds
    pub fn tick_at(&mut self, now: f64) {
        self.ticks.push_back(now);
        if self.ticks.len() > Self::WINDOW {
            self.ticks.pop_front();
        }
    }

    pub fn fps(&self) -> f64 {
        let (Some(first), Some(last)) = (self.ticks.front(), self.ticks.back()) else {
            return 0.0;
        };
        let elapsed = last - first;
        if elapsed <= 0.0 {
            return 0.0;
        }
        (self.ticks.len() as f64 - 1.0) / elapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fps_counter() {
        let mut fps = FpsCounter::new();
        assert_eq!(fps.fps(), 0.0);
        fps.tick_at(1.0);
        assert_eq!(fps.fps(), 0.0);
        for i in 1..=100 {
            fps.tick_at(1.0 + i as f64 / 50.0);
        }
        assert!((fps.fps() - 50.0).abs() < 1e-6);
    }
}
