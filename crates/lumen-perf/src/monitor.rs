//! Rolling-window frame rate sampling

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Sampling window, history size and hysteresis band
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorSettings {
    /// Wall time per FPS sample in milliseconds
    pub window_ms: f64,
    /// Maximum number of FPS samples retained
    pub history_capacity: usize,
    /// Average FPS below which quality should drop
    pub reduce_below_fps: f32,
    /// Samples required before a reduction may be requested
    pub reduce_min_samples: usize,
    /// Average FPS above which quality may rise
    pub increase_above_fps: f32,
    /// Samples required before an increase may be requested
    pub increase_min_samples: usize,
    /// Clear history after a tier change so the new tier is measured fresh
    pub reset_history_on_transition: bool,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            window_ms: 1000.0,
            history_capacity: 60,
            reduce_below_fps: 30.0,
            reduce_min_samples: 10,
            increase_above_fps: 55.0,
            increase_min_samples: 30,
            reset_history_on_transition: true,
        }
    }
}

/// Counts frames per window and keeps a rolling history of FPS samples.
///
/// Reduction needs fewer samples than increase and the FPS thresholds are
/// far apart; together they form the hysteresis band that keeps the tier
/// from flapping.
pub struct FrameRateMonitor {
    settings: MonitorSettings,
    frame_count: u32,
    /// Start of the current sampling window; `None` until the first frame
    window_start: Option<f64>,
    history: VecDeque<f32>,
    current_fps: f32,
    average_fps: f32,
}

impl Default for FrameRateMonitor {
    fn default() -> Self {
        Self::new(MonitorSettings::default())
    }
}

impl FrameRateMonitor {
    pub fn new(settings: MonitorSettings) -> Self {
        let capacity = settings.history_capacity.max(1);
        Self {
            settings: MonitorSettings {
                history_capacity: capacity,
                ..settings
            },
            frame_count: 0,
            window_start: None,
            history: VecDeque::with_capacity(capacity),
            current_fps: 0.0,
            average_fps: 0.0,
        }
    }

    pub fn settings(&self) -> &MonitorSettings {
        &self.settings
    }

    /// Record one rendered frame at `now_ms`. Returns the new sample when a
    /// window closes. The first call only establishes the time baseline.
    pub fn update(&mut self, now_ms: f64) -> Option<f32> {
        let Some(start) = self.window_start else {
            self.window_start = Some(now_ms);
            return None;
        };

        self.frame_count += 1;
        let elapsed = now_ms - start;
        if elapsed > self.settings.window_ms {
            let fps = (self.frame_count as f64 * 1000.0 / elapsed) as f32;
            self.push_sample(fps);
            self.frame_count = 0;
            self.window_start = Some(now_ms);
            return Some(fps);
        }
        None
    }

    /// Append an FPS sample directly, bypassing the frame counter
    pub fn push_sample(&mut self, fps: f32) {
        if self.history.len() == self.settings.history_capacity {
            self.history.pop_front();
        }
        self.history.push_back(fps);
        self.current_fps = fps;
        self.average_fps = self.history.iter().sum::<f32>() / self.history.len() as f32;
    }

    pub fn should_reduce_quality(&self) -> bool {
        self.average_fps < self.settings.reduce_below_fps
            && self.history.len() >= self.settings.reduce_min_samples
    }

    pub fn should_increase_quality(&self) -> bool {
        self.average_fps > self.settings.increase_above_fps
            && self.history.len() >= self.settings.increase_min_samples
    }

    /// Most recent sample
    pub fn current_fps(&self) -> f32 {
        self.current_fps
    }

    /// Mean of the retained samples
    pub fn average_fps(&self) -> f32 {
        self.average_fps
    }

    pub fn sample_count(&self) -> usize {
        self.history.len()
    }

    /// Drop the history but keep the running window
    pub fn clear_history(&mut self) {
        self.history.clear();
        self.average_fps = 0.0;
    }

    /// Forget everything, including the time baseline
    pub fn reset(&mut self) {
        self.clear_history();
        self.current_fps = 0.0;
        self.frame_count = 0;
        self.window_start = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steady_twenty_fps_is_measured() {
        let mut monitor = FrameRateMonitor::default();
        let mut samples = Vec::new();
        for frame in 0..=200 {
            if let Some(fps) = monitor.update(frame as f64 * 50.0) {
                samples.push(fps);
            }
        }
        assert!(!samples.is_empty());
        for fps in samples {
            assert!((fps - 20.0).abs() < 0.5, "fps = {fps}");
        }
        assert!((monitor.average_fps() - 20.0).abs() < 0.5);
    }

    #[test]
    fn window_must_be_exceeded() {
        let mut monitor = FrameRateMonitor::default();
        monitor.update(0.0);
        assert_eq!(monitor.update(1000.0), None);
        assert!(monitor.update(1001.0).is_some());
    }

    #[test]
    fn history_is_bounded() {
        let mut monitor = FrameRateMonitor::default();
        for i in 0..100 {
            monitor.push_sample(i as f32);
        }
        assert_eq!(monitor.sample_count(), 60);
        // Oldest 40 dropped: mean of 40..=99
        assert!((monitor.average_fps() - 69.5).abs() < 1e-3);
    }

    #[test]
    fn reduce_needs_ten_low_samples() {
        let mut monitor = FrameRateMonitor::default();
        for _ in 0..9 {
            monitor.push_sample(20.0);
        }
        assert!(!monitor.should_reduce_quality());
        monitor.push_sample(20.0);
        assert!(monitor.should_reduce_quality());
    }

    #[test]
    fn one_healthy_sample_in_ten_blocks_reduction() {
        let mut monitor = FrameRateMonitor::default();
        for _ in 0..9 {
            monitor.push_sample(28.0);
        }
        monitor.push_sample(60.0);
        assert!(!monitor.should_reduce_quality());
    }

    #[test]
    fn increase_needs_thirty_high_samples() {
        let mut monitor = FrameRateMonitor::default();
        for _ in 0..29 {
            monitor.push_sample(60.0);
        }
        assert!(!monitor.should_increase_quality());
        monitor.push_sample(60.0);
        assert!(monitor.should_increase_quality());
    }

    #[test]
    fn fps_inside_the_band_requests_nothing() {
        let mut monitor = FrameRateMonitor::default();
        for _ in 0..60 {
            monitor.push_sample(45.0);
        }
        assert!(!monitor.should_reduce_quality());
        assert!(!monitor.should_increase_quality());
    }

    #[test]
    fn reset_forgets_baseline() {
        let mut monitor = FrameRateMonitor::default();
        monitor.update(0.0);
        monitor.push_sample(10.0);
        monitor.reset();
        assert_eq!(monitor.sample_count(), 0);
        // First update after reset is a baseline again
        assert_eq!(monitor.update(5000.0), None);
    }
}
