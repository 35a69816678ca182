//! Hysteresis-driven tier demotion and promotion

use crate::config::{performance_config, PerformanceConfig};
use crate::monitor::FrameRateMonitor;
use crate::tier::Tier;

/// Callback invoked with each newly published config
pub type ConfigCallback = Box<dyn FnMut(&PerformanceConfig)>;

/// Handle returned by `on_config_change`, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// A completed tier transition
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TierChange {
    pub from: Tier,
    pub to: Tier,
    /// Average FPS that triggered the change (0 for forced changes)
    pub average_fps: f32,
}

/// Owns the frame rate monitor and the active config.
///
/// At most one tier step happens per `update`/`evaluate` call.
pub struct AdaptiveQualityManager {
    monitor: FrameRateMonitor,
    config: PerformanceConfig,
    callbacks: Vec<(SubscriptionId, ConfigCallback)>,
    next_subscription: u64,
    /// Clear FPS history after a transition so the new tier is measured fresh
    reset_history_on_transition: bool,
    /// Pinned managers never change tier on their own
    pinned: bool,
    transitions: u64,
    suppressed_demotions: u64,
    suppressed_promotions: u64,
}

impl AdaptiveQualityManager {
    pub fn new(initial: Tier, monitor: FrameRateMonitor) -> Self {
        let reset_history_on_transition = monitor.settings().reset_history_on_transition;
        Self {
            monitor,
            config: performance_config(initial),
            callbacks: Vec::new(),
            next_subscription: 1,
            reset_history_on_transition,
            pinned: false,
            transitions: 0,
            suppressed_demotions: 0,
            suppressed_promotions: 0,
        }
    }

    pub fn with_history_reset(mut self, reset: bool) -> Self {
        self.reset_history_on_transition = reset;
        self
    }

    /// Feed one frame timestamp, then decide on a transition
    pub fn update(&mut self, now_ms: f64) -> Option<TierChange> {
        self.monitor.update(now_ms);
        self.evaluate()
    }

    /// Decide on a transition from the monitor's current state
    pub fn evaluate(&mut self) -> Option<TierChange> {
        if self.pinned {
            return None;
        }

        let tier = self.config.tier;
        if self.monitor.should_reduce_quality() {
            match tier.demoted() {
                Some(next) => return Some(self.transition(next)),
                None => {
                    self.suppressed_demotions += 1;
                    log::debug!(
                        "Demotion suppressed: already at {tier} ({:.1} fps)",
                        self.monitor.average_fps()
                    );
                }
            }
        } else if self.monitor.should_increase_quality() {
            match tier.promoted() {
                Some(next) => return Some(self.transition(next)),
                None => {
                    self.suppressed_promotions += 1;
                    log::trace!("Promotion suppressed: already at {tier}");
                }
            }
        }
        None
    }

    /// Jump to `tier` immediately (host override). Publishes if it differs.
    pub fn force_tier(&mut self, tier: Tier) -> Option<TierChange> {
        if tier == self.config.tier {
            return None;
        }
        let change = TierChange {
            from: self.config.tier,
            to: tier,
            average_fps: 0.0,
        };
        log::info!("Quality forced {} -> {}", change.from, change.to);
        self.publish(tier);
        Some(change)
    }

    fn transition(&mut self, next: Tier) -> TierChange {
        let change = TierChange {
            from: self.config.tier,
            to: next,
            average_fps: self.monitor.average_fps(),
        };
        log::info!(
            "Quality {} -> {} (average {:.1} fps over {} samples)",
            change.from,
            change.to,
            change.average_fps,
            self.monitor.sample_count()
        );
        self.publish(next);
        if self.reset_history_on_transition {
            self.monitor.clear_history();
        }
        change
    }

    fn publish(&mut self, tier: Tier) {
        self.config = performance_config(tier);
        self.transitions += 1;
        let config = self.config;
        for (_, callback) in self.callbacks.iter_mut() {
            callback(&config);
        }
    }

    /// Subscribe to config changes
    pub fn on_config_change(&mut self, callback: ConfigCallback) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.callbacks.push((id, callback));
        id
    }

    /// Remove a subscription. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.callbacks.len();
        self.callbacks.retain(|(sub, _)| *sub != id);
        self.callbacks.len() != before
    }

    /// Stop or resume automatic transitions
    pub fn set_pinned(&mut self, pinned: bool) {
        self.pinned = pinned;
    }

    pub fn is_pinned(&self) -> bool {
        self.pinned
    }

    pub fn config(&self) -> PerformanceConfig {
        self.config
    }

    pub fn tier(&self) -> Tier {
        self.config.tier
    }

    pub fn monitor(&self) -> &FrameRateMonitor {
        &self.monitor
    }

    pub fn monitor_mut(&mut self) -> &mut FrameRateMonitor {
        &mut self.monitor
    }

    pub fn transitions(&self) -> u64 {
        self.transitions
    }

    pub fn suppressed_demotions(&self) -> u64 {
        self.suppressed_demotions
    }

    pub fn suppressed_promotions(&self) -> u64 {
        self.suppressed_promotions
    }
}
