use std::time::Duration;

use crate::syntax::ast::Command;

/// A command released by a timer tick or a click, tagged with the line that
/// registered it.
#[derive(Debug, Clone)]
pub struct Callback {
    pub line: usize,
    pub action: Command,
}

// ─── Timers ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct Timer {
    id: u64,
    period: Duration,
    next_due: Duration,
    callback: Callback,
}

/// Repeating timers driven by an explicit run clock. Nothing fires on its
/// own: the owner advances the clock and runs what comes back.
#[derive(Debug, Clone, Default)]
pub struct TimerRegistry {
    timers: Vec<Timer>,
    next_id: u64,
    clock: Duration,
}

impl TimerRegistry {
    /// Register a timer whose first tick is one `period` from now.
    pub fn register(&mut self, period: Duration, line: usize, action: Command) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.timers.push(Timer {
            id,
            period,
            next_due: self.clock + period,
            callback: Callback { line, action },
        });
        id
    }

    /// Move the clock forward by `dt` and return every tick that fell due, in
    /// due-time order with ties broken by registration order. A timer overdue
    /// by several periods ticks once per elapsed period.
    pub fn advance(&mut self, dt: Duration) -> Vec<Callback> {
        let target = self.clock + dt;
        let mut fired = Vec::new();

        loop {
            let next = self.timers
                .iter_mut()
                .filter(|t| t.next_due <= target)
                .min_by_key(|t| (t.next_due, t.id));
            let Some(timer) = next else { break };
            fired.push(timer.callback.clone());
            timer.next_due += timer.period;
        }

        self.clock = target;
        fired
    }

    /// Time elapsed since the last `clear`.
    pub fn clock(&self) -> Duration { self.clock }

    pub fn len(&self) -> usize { self.timers.len() }
    pub fn is_empty(&self) -> bool { self.timers.is_empty() }

    /// Cancel every timer and rewind the clock.
    pub fn clear(&mut self) {
        self.timers.clear();
        self.clock = Duration::ZERO;
    }
}

// ─── Clicks ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct ClickRegistry {
    listeners: Vec<Callback>,
}

impl ClickRegistry {
    pub fn register(&mut self, line: usize, action: Command) {
        self.listeners.push(Callback { line, action });
    }

    /// Registration order.
    pub fn listeners(&self) -> &[Callback] {
        &self.listeners
    }

    pub fn len(&self) -> usize { self.listeners.len() }
    pub fn is_empty(&self) -> bool { self.listeners.is_empty() }

    pub fn clear(&mut self) {
        self.listeners.clear();
    }
}
