//! Command executor. Owns every piece of run state and applies one `Command`
//! at a time; the `Runtime` decides when and how often.

use std::rc::Rc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{ErrorCode, RuntimeError};
use crate::host::{
    Asset, AssetKind, AssetLibrary, AssetProvider, Diagnostic, DiagnosticSink, Diagnostics,
    DrawList, DrawingSurface, Level,
};
use crate::runtime::RuntimeConfig;
use crate::runtime::color::Color;
use crate::runtime::entity::{Entity, PropertyError};
use crate::runtime::eval::Evaluator;
use crate::runtime::input::InputState;
use crate::runtime::scheduler::{ClickRegistry, TimerRegistry};
use crate::runtime::store::{EntityStore, VariableStore};
use crate::syntax::ast::{Command, Expr, ExprSource, LetValue, Point, PropertyAssign, PropertyValue, RandomRange};

// ─── Interpreter ─────────────────────────────────────────────────────────────

pub struct Interpreter {
    pub(crate) config: RuntimeConfig,
    pub(crate) entities: EntityStore,
    pub(crate) variables: VariableStore,
    pub(crate) timers: TimerRegistry,
    pub(crate) clicks: ClickRegistry,
    pub(crate) input: InputState,
    pub(crate) diagnostics: Diagnostics,
    pub(crate) active_color: Color,
    pub(crate) background: Option<Color>,
    /// Primitives drawn during setup, repainted every frame.
    backdrop: DrawList,
    /// Primitives drawn after setup, painted by the next `draw` only.
    overlay: DrawList,
    /// Overlay of the previous clock step. Anything older is dropped undrawn,
    /// so a host that skips `draw` never accumulates primitives.
    carried: DrawList,
    sounds: Vec<Asset>,
    assets: Rc<dyn AssetProvider>,
    rng: StdRng,
    in_setup: bool,
}

impl Interpreter {
    pub fn new(config: RuntimeConfig) -> Self {
        let rng = make_rng(config.seed);
        let active_color = Color::resolve(&config.default_color);
        Self {
            config,
            entities: EntityStore::default(),
            variables: VariableStore::default(),
            timers: TimerRegistry::default(),
            clicks: ClickRegistry::default(),
            input: InputState::default(),
            diagnostics: Diagnostics::default(),
            active_color,
            background: None,
            backdrop: DrawList::new(),
            overlay: DrawList::new(),
            carried: DrawList::new(),
            sounds: Vec::new(),
            assets: Rc::new(AssetLibrary::new()),
            rng,
            in_setup: false,
        }
    }

    pub fn set_assets(&mut self, assets: Rc<dyn AssetProvider>) {
        self.assets = assets;
    }

    /// Discard all run state. Diagnostics are kept until the host drains them.
    pub fn reset(&mut self) {
        self.entities.clear();
        self.variables.clear();
        self.timers.clear();
        self.clicks.clear();
        self.input.clear();
        self.backdrop.clear();
        self.overlay.clear();
        self.carried.clear();
        self.sounds.clear();
        self.background = None;
        self.active_color = Color::resolve(&self.config.default_color);
        self.rng = make_rng(self.config.seed);
    }

    pub fn begin_setup(&mut self) { self.in_setup = true; }
    pub fn end_setup(&mut self) { self.in_setup = false; }

    pub fn take_sounds(&mut self) -> Vec<Asset> {
        std::mem::take(&mut self.sounds)
    }

    /// Run one command, reporting a failure instead of returning it.
    pub fn run(&mut self, command: &Command, line: usize) {
        if let Err(err) = self.exec(command, line) {
            self.diagnostics.report(err.into());
        }
    }

    // ─── Drawing ─────────────────────────────────────────────────────────────

    pub fn draw(&mut self, surface: &mut dyn DrawingSurface) {
        if let Some(bg) = &self.background {
            surface.fill_background(bg);
        }
        self.backdrop.replay(surface);
        self.carried.replay(surface);
        self.overlay.replay(surface);
        self.carried.clear();
        self.overlay.clear();
        for (_, entity) in self.entities.iter() {
            entity.draw(surface);
        }
    }

    /// Start a new clock step: the current overlay becomes the carried one
    /// and whatever was carried before is discarded.
    pub fn age_overlay(&mut self) {
        self.carried = std::mem::take(&mut self.overlay);
    }

    fn primitives(&mut self) -> &mut DrawList {
        if self.in_setup { &mut self.backdrop } else { &mut self.overlay }
    }

    // ─── Commands ────────────────────────────────────────────────────────────

    /// Execute one command. `Ok(Some(n))` when the command produces a value
    /// (`random from A to B`).
    pub fn exec(&mut self, command: &Command, line: usize) -> Result<Option<f64>, RuntimeError> {
        log::trace!(target: "jcscript", "line {line}: {}", command.tag());

        match command {
            Command::Say(text) => {
                self.diagnostics.report(Diagnostic {
                    level: Level::Info,
                    message: text.clone(),
                    line: Some(line),
                    code: None,
                });
            }

            Command::SetColor(token) => self.active_color = Color::resolve(token),

            Command::Background(token) => self.background = Some(Color::resolve(token)),

            Command::DrawCircle { center, radius } => {
                let (cx, cy) = self.eval_point(center, line);
                let radius = self.eval(radius, line);
                let color = self.active_color.clone();
                self.primitives().fill_circle(cx, cy, radius, &color);
            }

            Command::DrawLine { from, to, width } => {
                let (x1, y1) = self.eval_point(from, line);
                let (x2, y2) = self.eval_point(to, line);
                let width = self.eval(width, line);
                let color = self.active_color.clone();
                self.primitives().stroke_line(x1, y1, x2, y2, width, &color);
            }

            Command::PlaySound(path) => {
                let asset = self.lookup_asset(path, "sound", AssetKind::Audio, line)?;
                log::debug!(target: "jcscript", "queue sound `{}`", asset.name);
                self.sounds.push(asset);
            }

            Command::Let { name, value } => self.exec_let(name, value, line)?,

            Command::Assign { name, value } => {
                if !self.variables.contains(name) {
                    return Err(RuntimeError::unknown_variable(line, name));
                }
                let n = self.eval_source(value, line);
                self.variables.update(name, n);
            }

            Command::SetProperty(assign) => self.exec_property(assign, line)?,

            Command::Add { name, amount } => {
                let current = self.variables.get(name)
                    .ok_or_else(|| RuntimeError::unknown_variable(line, name))?;
                self.variables.update(name, current + amount);
            }

            Command::Random(range) => return Ok(Some(self.roll(*range))),

            Command::Rotate { entity, degrees } => {
                let target = self.entities.get_mut(entity)
                    .ok_or_else(|| RuntimeError::unknown_entity(line, entity))?;
                if target.rotate(*degrees).is_err() {
                    return Err(RuntimeError::new(
                        ErrorCode::T001,
                        line,
                        format!("Cannot rotate {} \"{entity}\": only boxes rotate", target.kind_name()),
                    ));
                }
            }

            Command::OnClick(action) => {
                self.clicks.register(line, (**action).clone());
                log::debug!(target: "jcscript", "line {line}: click listener registered");
            }

            Command::Every { seconds, action } => {
                let period = Duration::try_from_secs_f64(*seconds)
                    .ok()
                    .filter(|p| !p.is_zero())
                    .ok_or_else(|| RuntimeError::new(
                        ErrorCode::T003,
                        line,
                        format!("Timer period must be a positive number of seconds, got {seconds}"),
                    ))?
                    .max(self.config.min_timer_period);
                let id = self.timers.register(period, line, (**action).clone());
                log::debug!(target: "jcscript", "line {line}: timer {id} every {period:?}");
            }

            Command::KeyGuard { key, action } => {
                if self.input.is_down(key) {
                    return self.exec(action, line);
                }
            }
        }

        Ok(None)
    }

    fn exec_let(&mut self, name: &str, value: &LetValue, line: usize) -> Result<(), RuntimeError> {
        match value {
            LetValue::Spawn { x, y, w, h } => {
                let (x, y) = (self.eval(x, line), self.eval(y, line));
                let (w, h) = (self.eval(w, line), self.eval(h, line));
                let entity = Entity::spawn(x, y, w, h, self.active_color.clone());
                self.declare(name, entity);
            }
            LetValue::Image { path, at, w, h } => {
                let asset = self.lookup_asset(path, "image", AssetKind::Image, line)?;
                let (x, y) = self.eval_point(at, line);
                let (w, h) = (self.eval(w, line), self.eval(h, line));
                self.declare(name, Entity::Image { x, y, w, h, asset });
            }
            LetValue::Text { text, at, size, color, font } => {
                let (x, y) = self.eval_point(at, line);
                let size = self.eval(size, line);
                self.declare(name, Entity::Text {
                    x,
                    y,
                    text: text.clone(),
                    size,
                    color: Color::resolve(color),
                    font: font.clone(),
                });
            }
            LetValue::Random(range) => {
                let n = self.roll(*range);
                self.variables.set(name, n);
            }
            LetValue::Number(expr) => {
                let n = self.eval(expr, line);
                self.variables.set(name, n);
            }
        }
        Ok(())
    }

    fn exec_property(&mut self, assign: &PropertyAssign, line: usize) -> Result<(), RuntimeError> {
        let PropertyAssign { entity, property, value } = assign;
        if !self.entities.contains(entity) {
            return Err(RuntimeError::unknown_entity(line, entity));
        }

        let (result, shown) = match value {
            PropertyValue::Number(src) => {
                let n = self.eval_source(src, line);
                (self.entity_mut(entity, line)?.set_number(property, n), src.text.as_str())
            }
            PropertyValue::Color(token) => {
                (self.entity_mut(entity, line)?.set_color(Color::resolve(token)), token.as_str())
            }
            PropertyValue::Text(text) => {
                (self.entity_mut(entity, line)?.set_text(text.clone()), text.as_str())
            }
            PropertyValue::Unknown(_) => (Err(PropertyError::Unknown), ""),
        };

        match result {
            Ok(()) => Ok(()),
            Err(PropertyError::Unsupported) => Err(RuntimeError::new(
                ErrorCode::T001,
                line,
                format!("Invalid value for {entity}.{property}: {shown}"),
            )),
            Err(PropertyError::Unknown) => Err(RuntimeError::new(
                ErrorCode::T002,
                line,
                format!("Unknown property \"{property}\" for entity \"{entity}\""),
            )),
        }
    }

    // ─── Helpers ─────────────────────────────────────────────────────────────

    fn declare(&mut self, name: &str, entity: Entity) {
        if self.entities.insert(name, entity) {
            log::debug!(target: "jcscript", "entity `{name}` redeclared");
        }
    }

    fn entity_mut(&mut self, name: &str, line: usize) -> Result<&mut Entity, RuntimeError> {
        self.entities.get_mut(name).ok_or_else(|| RuntimeError::unknown_entity(line, name))
    }

    fn eval(&mut self, expr: &Expr, line: usize) -> f64 {
        Evaluator::new(&self.entities, &self.variables).eval(expr, line, &mut self.diagnostics)
    }

    fn eval_source(&mut self, src: &ExprSource, line: usize) -> f64 {
        Evaluator::new(&self.entities, &self.variables).eval_source(src, line, &mut self.diagnostics)
    }

    fn eval_point(&mut self, point: &Point, line: usize) -> (f64, f64) {
        (self.eval(&point.x, line), self.eval(&point.y, line))
    }

    /// Inclusive integer range; reversed bounds are swapped.
    fn roll(&mut self, range: RandomRange) -> f64 {
        let (lo, hi) = if range.min <= range.max { (range.min, range.max) } else { (range.max, range.min) };
        self.rng.gen_range(lo..=hi) as f64
    }

    /// Resolve `"<base>.<suffix>"` (an optional leading `assets/` is ignored)
    /// to a registered asset of the expected kind.
    fn lookup_asset(&self, path: &str, suffix: &str, kind: AssetKind, line: usize) -> Result<Asset, RuntimeError> {
        let ext = format!(".{suffix}");
        let stripped = path.strip_suffix(ext.as_str());
        let base = stripped.unwrap_or(path);
        let base = base.strip_prefix("assets/").unwrap_or(base);
        let noun = if kind == AssetKind::Image { "Image" } else { "Sound" };

        if stripped.is_none() {
            return Err(RuntimeError::new(
                ErrorCode::R003,
                line,
                format!("{noun} path must end with {ext} extension. Use \"{base}{ext}\" instead of \"{path}\""),
            ));
        }

        match self.assets.find(base) {
            Some(asset) if asset.kind() == kind => Ok(asset),
            _ => Err(RuntimeError::new(
                ErrorCode::R004,
                line,
                format!("{noun} \"{base}{ext}\" not found in asset panel. Upload it first."),
            )),
        }
    }
}

fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}
