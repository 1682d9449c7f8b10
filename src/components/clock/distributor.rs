//! Two-phase clock distribution.
//!
//! The simulation is synchronous and single-threaded: one distributor emits
//! an alternating LOW/HIGH marker to every registered subscriber, one marker
//! per simulation step, in registration order. That ordering is load-bearing:
//! the CPU core must drive the address onto the shared bus before the memory
//! chips sample it in the same phase, so the CPU is always registered first.

/// One half of the two-phase clock. Components compute and drive buses on
/// the LOW (falling) phase and commit clocked register state on HIGH.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockPhase {
    Low,
    High,
}

type SubscriberFn<S> = Box<dyn FnMut(&mut S, ClockPhase)>;

/// Ordered clock fan-out over a shared system state.
///
/// Subscribers are plain callables invoked with exclusive access to the
/// state; there is no completion tracking, so a subscriber that never
/// returns stalls the whole simulation by design.
pub struct ClockDistributor<S> {
    subscribers: Vec<(String, SubscriberFn<S>)>,
    tick_count: u64,
}

impl<S> ClockDistributor<S> {
    pub fn new() -> Self {
        ClockDistributor {
            subscribers: Vec::new(),
            tick_count: 0,
        }
    }

    /// Register a subscriber. Invocation order within a phase is the order
    /// of registration, deterministically.
    pub fn subscribe<F>(&mut self, name: &str, handler: F)
    where
        F: FnMut(&mut S, ClockPhase) + 'static,
    {
        self.subscribers.push((name.to_string(), Box::new(handler)));
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Number of full clock ticks (LOW+HIGH pairs) delivered so far.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Deliver one phase marker to every subscriber, in order.
    pub fn broadcast(&mut self, state: &mut S, phase: ClockPhase) {
        if phase == ClockPhase::Low {
            self.tick_count += 1;
        }
        for (_, handler) in self.subscribers.iter_mut() {
            handler(state, phase);
        }
    }
}

impl<S> Default for ClockDistributor<S> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscribers_run_in_registration_order() {
        let mut clk: ClockDistributor<Vec<&'static str>> = ClockDistributor::new();
        clk.subscribe("first", |log, phase| {
            if phase == ClockPhase::Low {
                log.push("first");
            }
        });
        clk.subscribe("second", |log, phase| {
            if phase == ClockPhase::Low {
                log.push("second");
            }
        });

        let mut log = Vec::new();
        clk.broadcast(&mut log, ClockPhase::Low);
        clk.broadcast(&mut log, ClockPhase::High);
        clk.broadcast(&mut log, ClockPhase::Low);
        assert_eq!(log, vec!["first", "second", "first", "second"]);
    }

    #[test]
    fn test_all_see_low_before_any_sees_high() {
        let mut clk: ClockDistributor<Vec<(usize, ClockPhase)>> = ClockDistributor::new();
        for i in 0..3 {
            clk.subscribe("sub", move |log, phase| log.push((i, phase)));
        }
        let mut log = Vec::new();
        clk.broadcast(&mut log, ClockPhase::Low);
        clk.broadcast(&mut log, ClockPhase::High);
        assert_eq!(
            log,
            vec![
                (0, ClockPhase::Low),
                (1, ClockPhase::Low),
                (2, ClockPhase::Low),
                (0, ClockPhase::High),
                (1, ClockPhase::High),
                (2, ClockPhase::High),
            ]
        );
    }

    #[test]
    fn test_tick_count_advances_on_low() {
        let mut clk: ClockDistributor<()> = ClockDistributor::new();
        clk.broadcast(&mut (), ClockPhase::Low);
        clk.broadcast(&mut (), ClockPhase::High);
        clk.broadcast(&mut (), ClockPhase::Low);
        assert_eq!(clk.tick_count(), 2);
    }
}
