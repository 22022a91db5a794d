pub mod color;
pub mod entity;
pub mod eval;
pub mod input;
pub mod interpreter;
pub mod scheduler;
pub mod store;

use std::rc::Rc;
use std::time::Duration;

use crate::host::{Asset, AssetProvider, Diagnostic, DrawingSurface};
use crate::syntax::ast::Script;
use color::Color;
use entity::Entity;
use interpreter::Interpreter;
use store::{EntityStore, VariableStore};

// ─── Configuration ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeConfig {
    /// Active color at the start of every run.
    pub default_color: String,
    /// Variables a click writes its coordinates into.
    pub pointer_x: String,
    pub pointer_y: String,
    /// Fixed RNG seed; `None` seeds from entropy.
    pub seed: Option<u64>,
    /// Shortest timer period; shorter periods are raised to it.
    pub min_timer_period: Duration,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            default_color: "#000000".to_string(),
            pointer_x: "mouseX".to_string(),
            pointer_y: "mouseY".to_string(),
            seed: None,
            min_timer_period: Duration::from_millis(4),
        }
    }
}

// ─── Events ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    KeyDown(String),
    KeyUp(String),
    /// Surface-relative logical coordinates.
    Click { x: f64, y: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Constructed, `setup` not yet called.
    Ready,
    Running,
    Stopped,
}

// ─── Runtime ─────────────────────────────────────────────────────────────────

/// Runs one parsed script. The single owner of all run state: timer ticks and
/// clicks reach it as calls, never as callbacks.
///
/// Lifecycle:
///   1. `Runtime::new(script)` — `Ready`; nothing has executed.
///   2. `setup()` — clears every store, runs the setup statements in source
///      order and moves to `Running`. Calling it again restarts the run.
///   3. Per frame: `advance(dt)` fires due timers, `update()` runs the
///      key-guarded statements, `draw(surface)` paints. `frame` does all three.
///   4. `stop()` — cancels timers and listeners and clears all state.
///      Idempotent; `setup()` may start a new run afterwards.
///
/// No call returns an error: failures go to the diagnostic buffer drained by
/// `take_diagnostics()`.
pub struct Runtime {
    script: Script,
    interp: Interpreter,
    phase: Phase,
    generation: u64,
}

impl Runtime {
    pub fn new(script: Script) -> Self {
        Self::with_config(script, RuntimeConfig::default())
    }

    pub fn with_config(script: Script, config: RuntimeConfig) -> Self {
        Self { script, interp: Interpreter::new(config), phase: Phase::Ready, generation: 0 }
    }

    pub fn with_assets(mut self, assets: Rc<dyn AssetProvider>) -> Self {
        self.interp.set_assets(assets);
        self
    }

    pub fn set_assets(&mut self, assets: Rc<dyn AssetProvider>) {
        self.interp.set_assets(assets);
    }

    /// Replace the script. The current run, if any, is stopped.
    pub fn load(&mut self, script: Script) {
        self.stop();
        self.script = script;
    }

    // ─── Lifecycle ───────────────────────────────────────────────────────────

    pub fn setup(&mut self) {
        self.interp.reset();
        self.generation += 1;
        self.phase = Phase::Running;
        log::debug!(
            target: "jcscript",
            "setup: run {} ({} statements, {} per-frame)",
            self.generation,
            self.script.statements.len(),
            self.script.per_frame_statements().count(),
        );

        self.interp.begin_setup();
        for stmt in self.script.setup_statements() {
            self.interp.run(&stmt.command, stmt.line);
        }
        self.interp.end_setup();
    }

    pub fn update(&mut self) {
        if self.phase != Phase::Running { return; }
        for stmt in self.script.per_frame_statements() {
            self.interp.run(&stmt.command, stmt.line);
        }
    }

    pub fn draw(&mut self, surface: &mut dyn DrawingSurface) {
        if self.phase != Phase::Running { return; }
        self.interp.draw(surface);
    }

    /// Advance the run clock and fire every timer tick that fell due.
    pub fn advance(&mut self, dt: Duration) {
        if self.phase != Phase::Running { return; }
        self.interp.age_overlay();
        for tick in self.interp.timers.advance(dt) {
            self.interp.run(&tick.action, tick.line);
        }
    }

    pub fn dispatch(&mut self, event: HostEvent) {
        match event {
            HostEvent::KeyDown(key) => self.interp.input.key_down(&key),
            HostEvent::KeyUp(key) => self.interp.input.key_up(&key),
            HostEvent::Click { x, y } => {
                if self.phase != Phase::Running { return; }
                let (px, py) = (self.interp.config.pointer_x.clone(), self.interp.config.pointer_y.clone());
                self.interp.variables.set(px, x);
                self.interp.variables.set(py, y);
                let listeners = self.interp.clicks.listeners().to_vec();
                for listener in listeners {
                    self.interp.run(&listener.action, listener.line);
                }
            }
        }
    }

    /// `advance` + `update` + `draw`.
    pub fn frame(&mut self, dt: Duration, surface: &mut dyn DrawingSurface) {
        self.advance(dt);
        self.update();
        self.draw(surface);
    }

    /// Paint the first frame of the script without leaving it running.
    pub fn preview(&mut self, surface: &mut dyn DrawingSurface) {
        self.setup();
        self.draw(surface);
        self.stop();
    }

    pub fn stop(&mut self) {
        if self.phase == Phase::Running {
            log::debug!(target: "jcscript", "stop: run {}", self.generation);
        }
        self.interp.reset();
        if self.phase != Phase::Ready {
            self.phase = Phase::Stopped;
        }
    }

    // ─── Accessors ───────────────────────────────────────────────────────────

    pub fn phase(&self) -> Phase { self.phase }
    pub fn is_running(&self) -> bool { self.phase == Phase::Running }

    /// Incremented by every `setup()`.
    pub fn generation(&self) -> u64 { self.generation }

    pub fn script(&self) -> &Script { &self.script }

    pub fn entity(&self, name: &str) -> Option<&Entity> { self.interp.entities.get(name) }
    pub fn entities(&self) -> &EntityStore { &self.interp.entities }

    pub fn variable(&self, name: &str) -> Option<f64> { self.interp.variables.get(name) }
    pub fn variables(&self) -> &VariableStore { &self.interp.variables }

    pub fn is_key_down(&self, key: &str) -> bool { self.interp.input.is_down(key) }
    pub fn pressed_keys(&self) -> impl Iterator<Item = &str> { self.interp.input.pressed() }

    pub fn active_color(&self) -> &Color { &self.interp.active_color }
    pub fn background(&self) -> Option<&Color> { self.interp.background.as_ref() }

    pub fn timer_count(&self) -> usize { self.interp.timers.len() }
    pub fn listener_count(&self) -> usize { self.interp.clicks.len() }
    pub fn clock(&self) -> Duration { self.interp.timers.clock() }

    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> { self.interp.diagnostics.take() }

    /// Sounds queued by `play sound` since the last call.
    pub fn take_sounds(&mut self) -> Vec<Asset> { self.interp.take_sounds() }
}
