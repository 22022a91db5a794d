//! Collaborator seams between the interpreter core and whatever hosts it:
//! diagnostics out, assets in, pixels out.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::error::{ErrorCode, RuntimeError};
use crate::runtime::color::Color;

// ─── Diagnostics ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub level: Level,
    pub message: String,
    pub line: Option<usize>,
    pub code: Option<ErrorCode>,
}

impl Diagnostic {
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self { level, message: message.into(), line: None, code: None }
    }
}

impl From<RuntimeError> for Diagnostic {
    fn from(err: RuntimeError) -> Self {
        Self { level: Level::Error, message: err.message, line: Some(err.line), code: Some(err.code) }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.code, self.line) {
            (Some(code), Some(line)) => write!(f, "[{code}] line {line}: {}", self.message),
            (None, Some(line))       => write!(f, "line {line}: {}", self.message),
            _                        => f.write_str(&self.message),
        }
    }
}

pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: Diagnostic);

    fn info(&mut self, message: impl Into<String>) where Self: Sized {
        self.report(Diagnostic::new(Level::Info, message));
    }

    fn warn(&mut self, message: impl Into<String>) where Self: Sized {
        self.report(Diagnostic::new(Level::Warn, message));
    }

    fn error(&mut self, message: impl Into<String>) where Self: Sized {
        self.report(Diagnostic::new(Level::Error, message));
    }
}

/// Buffers diagnostics until the host drains them, forwarding each one to the
/// `log` facade as it arrives.
#[derive(Debug, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn take(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.entries)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize { self.entries.len() }
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }
}

impl DiagnosticSink for Diagnostics {
    fn report(&mut self, diagnostic: Diagnostic) {
        match diagnostic.level {
            Level::Info  => log::info!(target: "jcscript", "{diagnostic}"),
            Level::Warn  => log::warn!(target: "jcscript", "{diagnostic}"),
            Level::Error => log::error!(target: "jcscript", "{diagnostic}"),
        }
        self.entries.push(diagnostic);
    }
}

// ─── Assets ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Image,
    Audio,
    Other,
}

/// A named blob registered by the host. `name` is the base name scripts refer
/// to (`ufo` for `"ufo.image"`).
#[derive(Debug, Clone, PartialEq)]
pub struct Asset {
    pub name: String,
    pub mime: String,
    pub data: Arc<[u8]>,
}

impl Asset {
    pub fn new(name: impl Into<String>, mime: impl Into<String>, data: impl Into<Arc<[u8]>>) -> Self {
        Self { name: name.into(), mime: mime.into(), data: data.into() }
    }

    pub fn kind(&self) -> AssetKind {
        if self.mime.starts_with("image/") {
            AssetKind::Image
        } else if self.mime.starts_with("audio/") {
            AssetKind::Audio
        } else {
            AssetKind::Other
        }
    }
}

pub trait AssetProvider {
    fn find(&self, name: &str) -> Option<Asset>;
}

/// In-memory asset registry, insertion ordered for stable listing.
#[derive(Debug, Clone, Default)]
pub struct AssetLibrary {
    assets: IndexMap<String, Asset>,
}

impl AssetLibrary {
    pub fn new() -> Self { Self::default() }

    /// Register (or replace) an asset under its base name.
    pub fn insert(&mut self, asset: Asset) {
        self.assets.insert(asset.name.clone(), asset);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Asset> {
        self.assets.values()
    }

    pub fn len(&self) -> usize { self.assets.len() }
    pub fn is_empty(&self) -> bool { self.assets.is_empty() }

    /// Load every recognized image or audio file in `dir`. The base name is
    /// the file stem and the MIME type comes from the extension; other files
    /// are skipped. Returns the number of assets loaded.
    pub fn load_dir(&mut self, dir: &Path) -> std::io::Result<usize> {
        let mut paths: Vec<_> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file())
            .collect();
        paths.sort();

        let mut loaded = 0;
        for path in paths {
            let Some(mime) = path.extension().and_then(|e| e.to_str()).and_then(mime_for_extension) else {
                continue;
            };
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else { continue };
            let data = std::fs::read(&path)?;
            log::debug!(target: "jcscript", "asset `{stem}` ({mime}, {} bytes)", data.len());
            self.insert(Asset::new(stem, mime, data));
            loaded += 1;
        }
        Ok(loaded)
    }
}

impl AssetProvider for AssetLibrary {
    fn find(&self, name: &str) -> Option<Asset> {
        self.assets.get(name).cloned()
    }
}

pub fn mime_for_extension(ext: &str) -> Option<&'static str> {
    Some(match ext.to_ascii_lowercase().as_str() {
        "png"          => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif"          => "image/gif",
        "webp"         => "image/webp",
        "wav"          => "audio/wav",
        "mp3"          => "audio/mpeg",
        "ogg"          => "audio/ogg",
        "flac"         => "audio/flac",
        _ => return None,
    })
}

// ─── Drawing ─────────────────────────────────────────────────────────────────

/// Where a run's pixels go. Coordinates are logical canvas units with the
/// origin at the top-left; rotation is in degrees about the rect's center.
pub trait DrawingSurface {
    fn fill_background(&mut self, color: &Color);
    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, rotation: f64, color: &Color);
    fn fill_circle(&mut self, cx: f64, cy: f64, radius: f64, color: &Color);
    fn stroke_line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, width: f64, color: &Color);

    /// Whether `asset` has been decoded and can be blitted this frame.
    fn bitmap_ready(&self, _asset: &Asset) -> bool { true }

    fn blit_image(&mut self, asset: &Asset, x: f64, y: f64, w: f64, h: f64);
    fn fill_text(&mut self, text: &str, x: f64, y: f64, size: f64, font: &str, color: &Color);
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Background { color: Color },
    Rect { x: f64, y: f64, w: f64, h: f64, rotation: f64, color: Color },
    Circle { cx: f64, cy: f64, radius: f64, color: Color },
    Line { x1: f64, y1: f64, x2: f64, y2: f64, width: f64, color: Color },
    Image { asset: String, x: f64, y: f64, w: f64, h: f64 },
    Text { text: String, x: f64, y: f64, size: f64, font: String, color: Color },
}

/// A surface that records what was drawn. Used by tests and by hosts that
/// want a still frame they can repaint later.
#[derive(Debug, Clone, Default)]
pub struct DrawList {
    pub commands: Vec<DrawCommand>,
    images: Vec<Asset>,
    pending: HashSet<String>,
}

impl DrawList {
    pub fn new() -> Self { Self::default() }

    /// Report `name` as not yet decoded; images using it are skipped.
    pub fn mark_pending(&mut self, name: impl Into<String>) {
        self.pending.insert(name.into());
    }

    pub fn clear(&mut self) {
        self.commands.clear();
        self.images.clear();
    }

    /// Paint the recorded commands onto another surface, in order.
    pub fn replay(&self, surface: &mut dyn DrawingSurface) {
        for cmd in &self.commands {
            match cmd {
                DrawCommand::Background { color } => surface.fill_background(color),
                DrawCommand::Rect { x, y, w, h, rotation, color } =>
                    surface.fill_rect(*x, *y, *w, *h, *rotation, color),
                DrawCommand::Circle { cx, cy, radius, color } =>
                    surface.fill_circle(*cx, *cy, *radius, color),
                DrawCommand::Line { x1, y1, x2, y2, width, color } =>
                    surface.stroke_line(*x1, *y1, *x2, *y2, *width, color),
                DrawCommand::Image { asset, x, y, w, h } => {
                    if let Some(asset) = self.images.iter().find(|a| &a.name == asset) {
                        if surface.bitmap_ready(asset) {
                            surface.blit_image(asset, *x, *y, *w, *h);
                        }
                    }
                }
                DrawCommand::Text { text, x, y, size, font, color } =>
                    surface.fill_text(text, *x, *y, *size, font, color),
            }
        }
    }
}

impl DrawingSurface for DrawList {
    fn fill_background(&mut self, color: &Color) {
        self.commands.push(DrawCommand::Background { color: color.clone() });
    }

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, rotation: f64, color: &Color) {
        self.commands.push(DrawCommand::Rect { x, y, w, h, rotation, color: color.clone() });
    }

    fn fill_circle(&mut self, cx: f64, cy: f64, radius: f64, color: &Color) {
        self.commands.push(DrawCommand::Circle { cx, cy, radius, color: color.clone() });
    }

    fn stroke_line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, width: f64, color: &Color) {
        self.commands.push(DrawCommand::Line { x1, y1, x2, y2, width, color: color.clone() });
    }

    fn bitmap_ready(&self, asset: &Asset) -> bool {
        !self.pending.contains(&asset.name)
    }

    fn blit_image(&mut self, asset: &Asset, x: f64, y: f64, w: f64, h: f64) {
        if !self.images.iter().any(|a| a.name == asset.name) {
            self.images.push(asset.clone());
        }
        self.commands.push(DrawCommand::Image { asset: asset.name.clone(), x, y, w, h });
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64, size: f64, font: &str, color: &Color) {
        self.commands.push(DrawCommand::Text {
            text: text.to_string(), x, y, size, font: font.to_string(), color: color.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn asset_kind_from_mime() {
        assert_eq!(Asset::new("a", "image/png", vec![0u8]).kind(), AssetKind::Image);
        assert_eq!(Asset::new("a", "audio/wav", vec![0u8]).kind(), AssetKind::Audio);
        assert_eq!(Asset::new("a", "text/plain", vec![0u8]).kind(), AssetKind::Other);
    }

    #[test]
    fn library_find_and_replace() {
        let mut lib = AssetLibrary::new();
        lib.insert(Asset::new("ufo", "image/png", vec![1u8]));
        lib.insert(Asset::new("pop", "audio/wav", vec![2u8]));
        lib.insert(Asset::new("ufo", "image/gif", vec![3u8]));
        assert_eq!(lib.len(), 2);
        assert_eq!(lib.find("ufo").map(|a| a.mime), Some("image/gif".to_string()));
        assert_eq!(lib.iter().next().map(|a| a.name.as_str()), Some("ufo"));
        assert!(lib.find("nope").is_none());
    }

    #[test]
    fn mime_table() {
        assert_eq!(mime_for_extension("PNG"), Some("image/png"));
        assert_eq!(mime_for_extension("mp3"), Some("audio/mpeg"));
        assert_eq!(mime_for_extension("txt"), None);
    }

    #[test]
    fn load_dir_skips_unknown_files() {
        let dir = std::env::temp_dir().join(format!("jcscript-assets-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("ufo.png"), [0u8, 1, 2]).unwrap();
        std::fs::write(dir.join("pop.wav"), [3u8]).unwrap();
        std::fs::write(dir.join("notes.txt"), b"hi").unwrap();

        let mut lib = AssetLibrary::new();
        let loaded = lib.load_dir(&dir).unwrap();
        std::fs::remove_dir_all(&dir).unwrap();

        assert_eq!(loaded, 2);
        assert_eq!(lib.find("ufo").unwrap().kind(), AssetKind::Image);
        assert_eq!(lib.find("pop").unwrap().kind(), AssetKind::Audio);
        assert!(lib.find("notes").is_none());
    }

    #[test]
    fn diagnostics_buffer_and_drain() {
        let mut sink = Diagnostics::default();
        sink.info("hello");
        sink.error("boom");
        assert_eq!(sink.len(), 2);
        let drained = sink.take();
        assert_eq!(drained[1].level, Level::Error);
        assert!(sink.is_empty());
    }

    #[test]
    fn runtime_error_becomes_positioned_diagnostic() {
        let d: Diagnostic = RuntimeError::unknown_entity(3, "ufo").into();
        assert_eq!(d.to_string(), "[R001] line 3: Entity \"ufo\" not found");
    }

    #[test]
    fn draw_list_replays_in_order() {
        let mut rec = DrawList::new();
        rec.fill_background(&Color::resolve("white"));
        rec.fill_circle(1.0, 2.0, 3.0, &Color::default());
        rec.blit_image(&Asset::new("ufo", "image/png", vec![0u8]), 0.0, 0.0, 5.0, 5.0);

        let mut copy = DrawList::new();
        rec.replay(&mut copy);
        assert_eq!(copy.commands, rec.commands);
    }

    #[test]
    fn pending_bitmaps_are_not_ready() {
        let mut rec = DrawList::new();
        rec.mark_pending("ufo");
        assert!(!rec.bitmap_ready(&Asset::new("ufo", "image/png", vec![0u8])));
        assert!(rec.bitmap_ready(&Asset::new("cat", "image/png", vec![0u8])));
    }
}
