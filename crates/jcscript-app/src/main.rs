mod audio;
mod config;
mod keys;
mod surface;

use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::{Duration, Instant};

use eframe::egui::{self, Color32, RichText};
use jcscript_lang::{
    compile, AssetLibrary, Diagnostic, DrawList, Entity, HostEvent, Level, Runtime, RuntimeConfig,
    Script,
};

use audio::SoundPlayer;
use config::{AppConfig, CONFIG_FILE};
use keys::script_key_name;
use surface::{EguiSurface, TextureCache};

const SAMPLE_SCRIPT: &str = r#"// arrow keys move the box, click to score
make background #87ceeb
let score = 0
make it #ff6600
let player = spawn 380 280 40 40
let label = text "Click the sky!" at (20,40) size 24 colour black font "Arial"

if key "ArrowUp" down then player.y = player.y - 4
if key "ArrowDown" down then player.y = player.y + 4
if key "ArrowLeft" down then player.x = player.x - 4
if key "ArrowRight" down then player.x = player.x + 4

every 1 seconds then rotate player by 15 degrees
on click add score 1
on click draw circle at (mouseX, mouseY) radius 6
"#;

/// Where `save` writes when the config names no script file.
const DEFAULT_SCRIPT_FILE: &str = "script.jcs";

/// Longest step the run clock takes in one frame.
const MAX_FRAME_STEP: Duration = Duration::from_millis(100);

fn main() -> eframe::Result {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::load_or_default(CONFIG_FILE);
    log::info!("canvas {}×{}, assets in {}", config.canvas_width, config.canvas_height, config.assets_dir.display());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1400.0, 800.0]),
        ..Default::default()
    };
    eframe::run_native(
        "JcScript",
        options,
        Box::new(move |cc| Ok(Box::new(App::new(config, &cc.egui_ctx)))),
    )
}

// ─── App state ───────────────────────────────────────────────────────────────

#[derive(PartialEq)]
enum Tab { Canvas, Console, State, Script, Assets, Help }

struct App {
    config: AppConfig,
    source: String,
    runtime: Runtime,
    library: AssetLibrary,
    textures: TextureCache,
    sounds: SoundPlayer,
    console: Vec<Diagnostic>,
    /// Still frame shown while no run is active.
    preview: DrawList,
    tab: Tab,
    last_tick: Instant,
}

impl App {
    fn new(config: AppConfig, ctx: &egui::Context) -> Self {
        let source = config.script.as_ref()
            .and_then(|path| match std::fs::read_to_string(path) {
                Ok(text) => Some(text),
                Err(err) => {
                    log::warn!("could not read {}: {err}", path.display());
                    None
                }
            })
            .unwrap_or_else(|| SAMPLE_SCRIPT.to_string());

        let runtime_config = RuntimeConfig { seed: config.seed, ..RuntimeConfig::default() };
        let mut app = Self {
            runtime: Runtime::with_config(compile(&source), runtime_config),
            source,
            config,
            library: AssetLibrary::new(),
            textures: TextureCache::new(),
            sounds: SoundPlayer::new(),
            console: Vec::new(),
            preview: DrawList::new(),
            tab: Tab::Canvas,
            last_tick: Instant::now(),
        };
        app.reload_assets(ctx);
        app.refresh_preview();
        app
    }

    // ─── Run control ─────────────────────────────────────────────────────────

    fn run(&mut self) {
        let script = compile(&self.source);
        self.report_unrecognized(&script);
        self.runtime.load(script);
        self.runtime.setup();
        self.last_tick = Instant::now();
        self.drain();
        log::info!("run {} started", self.runtime.generation());
    }

    fn stop(&mut self) {
        self.runtime.stop();
        self.drain();
        self.refresh_preview();
    }

    /// Re-run setup against the current source and keep the first frame.
    /// Preview diagnostics and sounds are dropped.
    fn refresh_preview(&mut self) {
        if self.runtime.is_running() { return; }
        self.runtime.load(compile(&self.source));
        self.preview.clear();
        let preview = &mut self.preview;
        let runtime = &mut self.runtime;
        if panic::catch_unwind(AssertUnwindSafe(|| runtime.preview(preview))).is_err() {
            log::error!("preview panicked");
            self.runtime.stop();
        }
        self.runtime.take_diagnostics();
        self.runtime.take_sounds();
    }

    fn script_path(&self) -> PathBuf {
        self.config.script.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_SCRIPT_FILE))
    }

    /// Write the editor text back to the configured script file.
    fn save(&mut self) {
        let path = self.script_path();
        match save_script(&path, &self.source) {
            Ok(()) => {
                log::info!("saved {}", path.display());
                self.console.push(Diagnostic::new(Level::Info, format!("Saved {}", path.display())));
            }
            Err(err) => {
                log::error!("could not save {}: {err}", path.display());
                self.console.push(Diagnostic::new(Level::Error, format!("Could not save {}: {err}", path.display())));
            }
        }
    }

    fn reload_assets(&mut self, ctx: &egui::Context) {
        let mut library = AssetLibrary::new();
        match library.load_dir(&self.config.assets_dir) {
            Ok(n) => log::info!("loaded {n} assets from {}", self.config.assets_dir.display()),
            Err(err) => log::warn!("assets {}: {err}", self.config.assets_dir.display()),
        }
        self.textures.rebuild(&library, ctx);
        self.runtime.set_assets(Rc::new(library.clone()));
        self.library = library;
    }

    fn report_unrecognized(&mut self, script: &Script) {
        if !self.config.warn_unrecognized { return; }
        for miss in &script.unrecognized {
            self.console.push(Diagnostic {
                level: Level::Warn,
                message: format!("not recognized: {}", miss.text),
                line: Some(miss.line),
                code: Some(miss.reason.code),
            });
        }
    }

    /// Move diagnostics into the console and play queued sounds.
    fn drain(&mut self) {
        self.console.extend(self.runtime.take_diagnostics());
        for sound in self.runtime.take_sounds() {
            self.sounds.play(&sound);
        }
    }

    /// A panic escaping the runtime ends the run, like an explicit stop.
    fn guard(&mut self, what: &str, f: impl FnOnce(&mut Runtime)) {
        let runtime = &mut self.runtime;
        if panic::catch_unwind(AssertUnwindSafe(|| f(runtime))).is_err() {
            log::error!("{what} panicked; stopping the run");
            self.console.push(Diagnostic::new(Level::Error, format!("Runtime failure during {what}; run stopped")));
            self.stop();
        }
    }

    // ─── Input ───────────────────────────────────────────────────────────────

    /// Key releases always reach the runtime; presses only while no widget
    /// has focus, so typing in the editor does not steer the game.
    fn forward_keys(&mut self, ctx: &egui::Context) {
        let typing = ctx.memory(|m| m.focused().is_some());
        let events: Vec<HostEvent> = ctx.input(|i| {
            i.events.iter().filter_map(|e| match e {
                egui::Event::Key { key, pressed: false, .. } => Some(HostEvent::KeyUp(script_key_name(*key))),
                egui::Event::Key { key, pressed: true, repeat: false, .. } if !typing => {
                    Some(HostEvent::KeyDown(script_key_name(*key)))
                }
                _ => None,
            }).collect()
        });
        for event in events {
            self.runtime.dispatch(event);
        }
    }
}

// ─── UI ──────────────────────────────────────────────────────────────────────

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.textures.poll(ctx);
        self.forward_keys(ctx);

        // ── Step the run ─────────────────────────────────────────────────────
        if self.runtime.is_running() {
            let now = Instant::now();
            let dt = now.duration_since(self.last_tick).min(MAX_FRAME_STEP);
            self.last_tick = now;

            self.guard("update", |rt| {
                rt.advance(dt);
                rt.update();
            });
            self.drain();
            ctx.request_repaint();
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.columns(2, |cols| {
                // ── Left: editor ─────────────────────────────────────────────
                cols[0].vertical(|ui| {
                    ui.label("Script");
                    let response = ui.add(
                        egui::TextEdit::multiline(&mut self.source)
                            .font(egui::TextStyle::Monospace)
                            .desired_width(f32::INFINITY)
                            .desired_rows(44),
                    );
                    if response.changed() {
                        self.refresh_preview();
                    }
                });

                // ── Right: output ────────────────────────────────────────────
                cols[1].vertical(|ui| {
                    self.show_status(ui);
                    ui.separator();

                    ui.horizontal(|ui| {
                        let errors = self.console.iter().filter(|d| d.level == Level::Error).count();
                        let console_label = if errors == 0 {
                            "Console".to_string()
                        } else {
                            format!("Console ({errors})")
                        };
                        ui.selectable_value(&mut self.tab, Tab::Canvas, "Canvas");
                        ui.selectable_value(&mut self.tab, Tab::Console, console_label);
                        ui.selectable_value(&mut self.tab, Tab::State, "State");
                        ui.selectable_value(&mut self.tab, Tab::Script, "Script");
                        ui.selectable_value(&mut self.tab, Tab::Assets, "Assets");
                        ui.selectable_value(&mut self.tab, Tab::Help, "Help");
                    });

                    ui.separator();

                    match self.tab {
                        Tab::Canvas => self.show_canvas(ui),
                        Tab::Console => { egui::ScrollArea::vertical().stick_to_bottom(true).show(ui, |ui| self.show_console(ui)); }
                        Tab::State   => { egui::ScrollArea::vertical().show(ui, |ui| self.show_state(ui)); }
                        Tab::Script  => { egui::ScrollArea::vertical().show(ui, |ui| self.show_script(ui)); }
                        Tab::Assets  => { egui::ScrollArea::vertical().show(ui, |ui| self.show_assets(ui)); }
                        Tab::Help    => { egui::ScrollArea::vertical().show(ui, show_help); }
                    }
                });
            });
        });
    }
}

impl App {
    fn show_status(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            if self.runtime.is_running() {
                let clock = self.runtime.clock().as_secs_f64();
                ui.label(RichText::new(format!("▶  running  {clock:.1}s")).color(Color32::from_rgb(80, 200, 80)));
            } else {
                ui.label(RichText::new("■  stopped").color(Color32::GRAY));
            }
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("clear console").clicked() {
                    self.console.clear();
                }
                if ui.button("save").clicked() {
                    self.save();
                }
                if self.runtime.is_running() {
                    if ui.button("stop").clicked() {
                        self.stop();
                    }
                } else if ui.button("run").clicked() {
                    self.run();
                }
            });
        });
    }

    fn show_canvas(&mut self, ui: &mut egui::Ui) {
        let (cw, ch) = (self.config.canvas_width.max(1.0), self.config.canvas_height.max(1.0));
        let avail = ui.available_size();
        let scale = (avail.x / cw).min(avail.y / ch).max(0.05);

        let (rect, response) = ui.allocate_exact_size(egui::vec2(cw * scale, ch * scale), egui::Sense::click());
        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 0.0, Color32::WHITE);

        let mut surface = EguiSurface::new(&painter, rect, scale, &self.textures);
        if self.runtime.is_running() {
            let runtime = &mut self.runtime;
            if panic::catch_unwind(AssertUnwindSafe(|| runtime.draw(&mut surface))).is_err() {
                log::error!("draw panicked; stopping the run");
                self.console.push(Diagnostic::new(Level::Error, "Runtime failure during draw; run stopped"));
                self.stop();
            }
        } else {
            self.preview.replay(&mut surface);
        }

        if response.clicked() && self.runtime.is_running() {
            if let Some(pos) = response.interact_pointer_pos() {
                let local = (pos - rect.min) / scale;
                let (x, y) = (local.x as f64, local.y as f64);
                self.guard("click", |rt| rt.dispatch(HostEvent::Click { x, y }));
                self.drain();
            }
        }
    }

    fn show_console(&self, ui: &mut egui::Ui) {
        if self.console.is_empty() {
            ui.label(RichText::new("Nothing logged.").color(Color32::GRAY));
            return;
        }
        for entry in &self.console {
            let color = match entry.level {
                Level::Info  => Color32::from_rgb(210, 210, 210),
                Level::Warn  => Color32::from_rgb(220, 180, 60),
                Level::Error => Color32::from_rgb(220, 80, 80),
            };
            ui.label(RichText::new(entry.to_string()).monospace().color(color));
        }
    }

    fn show_state(&self, ui: &mut egui::Ui) {
        let entities = self.runtime.entities();
        if entities.is_empty() {
            ui.label(RichText::new("No entities.").color(Color32::GRAY));
        } else {
            egui::Grid::new("entities_grid")
                .striped(true)
                .min_col_width(60.0)
                .show(ui, |ui| {
                    for header in ["name", "kind", "x", "y", "w", "h", "detail"] {
                        ui.label(RichText::new(header).strong());
                    }
                    ui.end_row();

                    for (name, entity) in entities.iter() {
                        ui.label(RichText::new(name).monospace());
                        ui.label(RichText::new(entity.kind_name()).monospace().color(Color32::from_rgb(180, 140, 255)));
                        for prop in ["x", "y", "w", "h"] {
                            let cell = entity.number(prop).map(|v| format!("{v:.1}")).unwrap_or_else(|_| "–".into());
                            ui.label(RichText::new(cell).monospace());
                        }
                        let detail = match entity {
                            Entity::Box { color, rotation, .. } => format!("{color}  {rotation:.0}°"),
                            Entity::Image { .. } => entity.asset_label().unwrap_or_default(),
                            Entity::Text { text, color, .. } => format!("{text:?}  {color}"),
                        };
                        ui.label(RichText::new(detail).monospace().color(Color32::from_rgb(210, 210, 170)));
                        ui.end_row();
                    }
                });
        }

        ui.add_space(12.0);

        let variables = self.runtime.variables().sorted();
        if variables.is_empty() {
            ui.label(RichText::new("No variables.").color(Color32::GRAY));
            return;
        }
        egui::Grid::new("variables_grid")
            .striped(true)
            .min_col_width(80.0)
            .show(ui, |ui| {
                ui.label(RichText::new("variable").strong());
                ui.label(RichText::new("value").strong());
                ui.end_row();
                for (name, value) in variables {
                    ui.label(RichText::new(name).monospace());
                    ui.label(RichText::new(format!("{value}")).monospace().color(Color32::from_rgb(180, 255, 180)));
                    ui.end_row();
                }
            });

        let keys: Vec<&str> = self.runtime.pressed_keys().collect();
        if !keys.is_empty() {
            ui.add_space(12.0);
            ui.label(RichText::new(format!("keys: {keys:?}")).monospace().color(Color32::GRAY));
        }
    }

    fn show_script(&self, ui: &mut egui::Ui) {
        let script = compile(&self.source);
        egui::Grid::new("script_grid")
            .striped(true)
            .min_col_width(40.0)
            .show(ui, |ui| {
                ui.label(RichText::new("line").strong());
                ui.label(RichText::new("command").strong());
                ui.label(RichText::new("runs").strong());
                ui.end_row();

                for stmt in &script.statements {
                    ui.label(RichText::new(stmt.line.to_string()).monospace().color(Color32::GRAY));
                    ui.label(RichText::new(stmt.command.tag()).monospace().color(Color32::from_rgb(100, 180, 255)));
                    ui.label(RichText::new(if stmt.per_frame { "every frame" } else { "setup" }).monospace());
                    ui.end_row();
                }
                for miss in &script.unrecognized {
                    ui.label(RichText::new(miss.line.to_string()).monospace().color(Color32::GRAY));
                    ui.label(RichText::new("ignored").monospace().color(Color32::from_rgb(220, 180, 60)));
                    ui.label(RichText::new(&miss.text).monospace().color(Color32::GRAY));
                    ui.end_row();
                }
            });
    }

    fn show_assets(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label(RichText::new(self.config.assets_dir.display().to_string()).monospace());
            if ui.button("reload").clicked() {
                let ctx = ui.ctx().clone();
                self.reload_assets(&ctx);
                self.refresh_preview();
            }
        });
        ui.separator();

        if self.library.is_empty() {
            ui.label(RichText::new("No assets. Drop .png/.jpg/.gif/.webp or .wav/.mp3/.ogg files in the assets directory.").color(Color32::GRAY));
            return;
        }
        egui::Grid::new("assets_grid")
            .striped(true)
            .min_col_width(80.0)
            .show(ui, |ui| {
                ui.label(RichText::new("use as").strong());
                ui.label(RichText::new("type").strong());
                ui.label(RichText::new("size").strong());
                ui.end_row();
                for asset in self.library.iter() {
                    let reference = match asset.kind() {
                        jcscript_lang::AssetKind::Image => format!("\"{}.image\"", asset.name),
                        jcscript_lang::AssetKind::Audio => format!("\"{}.sound\"", asset.name),
                        jcscript_lang::AssetKind::Other => asset.name.clone(),
                    };
                    ui.label(RichText::new(reference).monospace());
                    ui.label(RichText::new(&asset.mime).monospace().color(Color32::GRAY));
                    ui.label(RichText::new(format!("{} B", asset.data.len())).monospace().color(Color32::GRAY));
                    ui.end_row();
                }
            });
    }
}

/// Write `source` to `path`, creating missing parent directories.
fn save_script(path: &Path, source: &str) -> std::io::Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    std::fs::write(path, source)
}

// ─── Help ────────────────────────────────────────────────────────────────────

const REFERENCE: &[(&str, &str)] = &[
    ("say \"Hello\"",                                       "print a message to the console"),
    ("make it <color>",                                      "colour for boxes and shapes declared after it"),
    ("make background <color>",                              "fill the canvas every frame"),
    ("draw circle at (x,y) radius N",                        "filled circle"),
    ("draw line from (x1,y1) to (x2,y2) width N",            "stroked line"),
    ("play sound \"pop.sound\"",                             "play an uploaded sound"),
    ("let box = spawn x y w h",                              "box in the current colour"),
    ("let ufo = image \"ufo.image\" at (x,y) size w h",      "uploaded image"),
    ("let t = text \"Hi\" at (x,y) size N colour c font \"f\"", "text label"),
    ("let n = <expr>",                                       "number variable"),
    ("let roll = random from 1 to 6",                        "whole number in the range, ends included"),
    ("n = <expr>",                                           "update a variable"),
    ("add n 1",                                              "add to a variable"),
    ("box.x = box.x + 5",                                    "set x, y, w, h, colour or text"),
    ("rotate box by 15 degrees",                             "turn a box about its centre"),
    ("on click <command>",                                   "run on every canvas click (mouseX, mouseY)"),
    ("every 2 seconds then <command>",                       "run repeatedly"),
    ("if key \"ArrowUp\" down then <command>",               "run every frame while the key is held"),
];

fn show_help(ui: &mut egui::Ui) {
    egui::Grid::new("help_grid")
        .striped(true)
        .min_col_width(120.0)
        .show(ui, |ui| {
            for (form, meaning) in REFERENCE {
                ui.label(RichText::new(*form).monospace().color(Color32::from_rgb(100, 180, 255)));
                ui.label(*meaning);
                ui.end_row();
            }
        });
    ui.add_space(8.0);
    ui.label(RichText::new("Expressions: + - * / and parentheses over numbers, variables and entity.x/y/w/h. \
        Lines starting with // are comments.").color(Color32::GRAY));
}
