use std::collections::{HashMap, HashSet};
use std::sync::mpsc::{self, Receiver, Sender};

use eframe::egui::{self, Color32, ColorImage, FontFamily, FontId, Pos2, Rect, Stroke, TextureHandle};
use jcscript_lang::{Asset, AssetKind, AssetLibrary, Color, DrawingSurface};

// ─── Texture cache ───────────────────────────────────────────────────────────

struct Decoded {
    name: String,
    image: Result<ColorImage, String>,
}

/// Image assets decoded off the UI thread. A bitmap counts as ready only once
/// its texture has been uploaded.
pub struct TextureCache {
    textures: HashMap<String, TextureHandle>,
    pending: HashSet<String>,
    tx: Sender<Decoded>,
    rx: Receiver<Decoded>,
}

impl TextureCache {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { textures: HashMap::new(), pending: HashSet::new(), tx, rx }
    }

    /// Forget every texture and start decoding all images in `library`.
    pub fn rebuild(&mut self, library: &AssetLibrary, ctx: &egui::Context) {
        self.textures.clear();
        self.pending.clear();
        for asset in library.iter().filter(|a| a.kind() == AssetKind::Image) {
            self.request(asset, ctx);
        }
    }

    pub fn request(&mut self, asset: &Asset, ctx: &egui::Context) {
        if self.textures.contains_key(&asset.name) || !self.pending.insert(asset.name.clone()) {
            return;
        }
        let tx = self.tx.clone();
        let ctx = ctx.clone();
        let name = asset.name.clone();
        let data = asset.data.clone();
        std::thread::spawn(move || {
            let image = image::load_from_memory(&data)
                .map(|img| {
                    let rgba = img.to_rgba8();
                    let size = [rgba.width() as usize, rgba.height() as usize];
                    ColorImage::from_rgba_unmultiplied(size, rgba.as_raw())
                })
                .map_err(|e| e.to_string());
            if tx.send(Decoded { name, image }).is_ok() {
                ctx.request_repaint();
            }
        });
    }

    /// Upload whatever the decoder threads have finished.
    pub fn poll(&mut self, ctx: &egui::Context) {
        while let Ok(Decoded { name, image }) = self.rx.try_recv() {
            if !self.pending.remove(&name) {
                continue; // superseded by a rebuild
            }
            match image {
                Ok(img) => {
                    let handle = ctx.load_texture(&name, img, egui::TextureOptions::LINEAR);
                    log::debug!("texture `{name}` ready");
                    self.textures.insert(name, handle);
                }
                Err(err) => log::warn!("failed to decode image `{name}`: {err}"),
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&TextureHandle> {
        self.textures.get(name)
    }
}

// ─── Surface ─────────────────────────────────────────────────────────────────

/// Paints into an egui canvas rect. Script coordinates are logical canvas
/// units; `scale` maps them to points.
pub struct EguiSurface<'a> {
    painter: &'a egui::Painter,
    rect: Rect,
    scale: f32,
    textures: &'a TextureCache,
}

impl<'a> EguiSurface<'a> {
    pub fn new(painter: &'a egui::Painter, rect: Rect, scale: f32, textures: &'a TextureCache) -> Self {
        Self { painter, rect, scale, textures }
    }

    fn pos(&self, x: f64, y: f64) -> Pos2 {
        self.rect.min + egui::vec2(x as f32, y as f32) * self.scale
    }

    fn len(&self, v: f64) -> f32 {
        v as f32 * self.scale
    }
}

pub fn color32(color: &Color) -> Option<Color32> {
    color.to_rgba().map(|[r, g, b, a]| Color32::from_rgba_unmultiplied(r, g, b, a))
}

fn font_family(font: &str) -> FontFamily {
    match font.to_ascii_lowercase().as_str() {
        "monospace" | "mono" | "courier" | "courier new" | "consolas" => FontFamily::Monospace,
        _ => FontFamily::Proportional,
    }
}

impl DrawingSurface for EguiSurface<'_> {
    fn fill_background(&mut self, color: &Color) {
        let Some(c) = color32(color) else { return };
        self.painter.rect_filled(self.rect, 0.0, c);
    }

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, rotation: f64, color: &Color) {
        let Some(c) = color32(color) else { return };
        if rotation == 0.0 {
            let r = Rect::from_min_size(self.pos(x, y), egui::vec2(self.len(w), self.len(h)));
            self.painter.rect_filled(r, 0.0, c);
            return;
        }
        // rotate about the center; positive degrees turn clockwise on screen
        let (cx, cy) = (x + w / 2.0, y + h / 2.0);
        let (sin, cos) = rotation.to_radians().sin_cos();
        let corners = [(-w / 2.0, -h / 2.0), (w / 2.0, -h / 2.0), (w / 2.0, h / 2.0), (-w / 2.0, h / 2.0)];
        let points = corners
            .iter()
            .map(|(dx, dy)| self.pos(cx + dx * cos - dy * sin, cy + dx * sin + dy * cos))
            .collect();
        self.painter.add(egui::Shape::convex_polygon(points, c, Stroke::NONE));
    }

    fn fill_circle(&mut self, cx: f64, cy: f64, radius: f64, color: &Color) {
        let Some(c) = color32(color) else { return };
        self.painter.circle_filled(self.pos(cx, cy), self.len(radius), c);
    }

    fn stroke_line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, width: f64, color: &Color) {
        let Some(c) = color32(color) else { return };
        self.painter.line_segment([self.pos(x1, y1), self.pos(x2, y2)], Stroke::new(self.len(width), c));
    }

    fn bitmap_ready(&self, asset: &Asset) -> bool {
        self.textures.get(&asset.name).is_some()
    }

    fn blit_image(&mut self, asset: &Asset, x: f64, y: f64, w: f64, h: f64) {
        let Some(tex) = self.textures.get(&asset.name) else { return };
        let r = Rect::from_min_size(self.pos(x, y), egui::vec2(self.len(w), self.len(h)));
        let uv = Rect::from_min_max(Pos2::ZERO, egui::pos2(1.0, 1.0));
        self.painter.image(tex.id(), r, uv, Color32::WHITE);
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64, size: f64, font: &str, color: &Color) {
        let Some(c) = color32(color) else { return };
        // (x, y) is the baseline start, as on an HTML canvas
        self.painter.text(
            self.pos(x, y),
            egui::Align2::LEFT_BOTTOM,
            text,
            FontId::new(self.len(size).max(1.0), font_family(font)),
            c,
        );
    }
}
