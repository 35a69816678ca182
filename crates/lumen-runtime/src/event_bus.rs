//! Event bus for broadcasting subsystem events

/// A simple event queue that the subsystem pushes to and hosts drain
pub struct EventBus<E> {
    events: Vec<E>,
}

impl<E> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> EventBus<E> {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Push an event onto the bus
    pub fn push(&mut self, event: E) {
        self.events.push(event);
    }

    /// Drain all events from the bus, returning them
    pub fn drain(&mut self) -> Vec<E> {
        std::mem::take(&mut self.events)
    }

    /// Check if there are pending events
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Number of pending events
    pub fn len(&self) -> usize {
        self.events.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::SubsystemEvent;
    use lumen_perf::Tier;

    #[test]
    fn test_push_and_drain() {
        let mut bus = EventBus::new();
        assert!(bus.is_empty());

        bus.push(SubsystemEvent::CapabilityFallback);
        bus.push(SubsystemEvent::ParticlesReallocated {
            count: 800,
            tier: Tier::Low,
        });

        assert_eq!(bus.len(), 2);
        let events = bus.drain();
        assert_eq!(events[0], SubsystemEvent::CapabilityFallback);
        assert!(bus.is_empty());
    }

    #[test]
    fn test_events_serialize_with_type_tag() {
        let json = serde_json::to_string(&SubsystemEvent::TierChanged {
            from: Tier::High,
            to: Tier::Medium,
            average_fps: 24.0,
        })
        .unwrap();
        assert!(json.contains("\"type\":\"tier_changed\""));
        assert!(json.contains("\"to\":\"medium\""));
    }
}
