use crate::host::{Asset, DrawingSurface};
use crate::runtime::color::Color;

/// A named drawable object.
#[derive(Debug, Clone, PartialEq)]
pub enum Entity {
    Box {
        x: f64,
        y: f64,
        w: f64,
        h: f64,
        color: Color,
        /// Degrees, cumulative.
        rotation: f64,
    },
    Image {
        x: f64,
        y: f64,
        w: f64,
        h: f64,
        asset: Asset,
    },
    Text {
        x: f64,
        y: f64,
        text: String,
        size: f64,
        color: Color,
        font: String,
    },
}

/// Why a property access was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyError {
    /// A known property this kind of entity does not carry (`label.w`).
    Unsupported,
    /// Not a property of any entity.
    Unknown,
}

/// Numeric properties an expression may read.
pub fn is_numeric_property(prop: &str) -> bool {
    matches!(prop, "x" | "y" | "w" | "h")
}

impl Entity {
    pub fn spawn(x: f64, y: f64, w: f64, h: f64, color: Color) -> Self {
        Self::Box { x, y, w, h, color, rotation: 0.0 }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Box { .. }   => "box",
            Self::Image { .. } => "image",
            Self::Text { .. }  => "text",
        }
    }

    /// `ufo.image` for an image built from asset `ufo`.
    pub fn asset_label(&self) -> Option<String> {
        match self {
            Self::Image { asset, .. } => Some(format!("{}.image", asset.name)),
            _ => None,
        }
    }

    pub fn position(&self) -> (f64, f64) {
        match self {
            Self::Box { x, y, .. } | Self::Image { x, y, .. } | Self::Text { x, y, .. } => (*x, *y),
        }
    }

    fn slot(&mut self, prop: &str) -> Result<&mut f64, PropertyError> {
        match (self, prop) {
            (Self::Box { x, .. } | Self::Image { x, .. } | Self::Text { x, .. }, "x") => Ok(x),
            (Self::Box { y, .. } | Self::Image { y, .. } | Self::Text { y, .. }, "y") => Ok(y),
            (Self::Box { w, .. } | Self::Image { w, .. }, "w") => Ok(w),
            (Self::Box { h, .. } | Self::Image { h, .. }, "h") => Ok(h),
            (_, p) if is_numeric_property(p) => Err(PropertyError::Unsupported),
            _ => Err(PropertyError::Unknown),
        }
    }

    /// Read `x`, `y`, `w` or `h`.
    pub fn number(&self, prop: &str) -> Result<f64, PropertyError> {
        match (self, prop) {
            (Self::Box { x, .. } | Self::Image { x, .. } | Self::Text { x, .. }, "x") => Ok(*x),
            (Self::Box { y, .. } | Self::Image { y, .. } | Self::Text { y, .. }, "y") => Ok(*y),
            (Self::Box { w, .. } | Self::Image { w, .. }, "w") => Ok(*w),
            (Self::Box { h, .. } | Self::Image { h, .. }, "h") => Ok(*h),
            (_, p) if is_numeric_property(p) => Err(PropertyError::Unsupported),
            _ => Err(PropertyError::Unknown),
        }
    }

    pub fn set_number(&mut self, prop: &str, value: f64) -> Result<(), PropertyError> {
        *self.slot(prop)? = value;
        Ok(())
    }

    pub fn set_color(&mut self, value: Color) -> Result<(), PropertyError> {
        match self {
            Self::Box { color, .. } | Self::Text { color, .. } => { *color = value; Ok(()) }
            Self::Image { .. } => Err(PropertyError::Unsupported),
        }
    }

    pub fn set_text(&mut self, value: String) -> Result<(), PropertyError> {
        match self {
            Self::Text { text, .. } => { *text = value; Ok(()) }
            _ => Err(PropertyError::Unsupported),
        }
    }

    /// Only boxes rotate.
    pub fn rotate(&mut self, degrees: f64) -> Result<f64, PropertyError> {
        match self {
            Self::Box { rotation, .. } => { *rotation += degrees; Ok(*rotation) }
            _ => Err(PropertyError::Unsupported),
        }
    }

    pub fn draw(&self, surface: &mut dyn DrawingSurface) {
        match self {
            Self::Box { x, y, w, h, color, rotation } => {
                surface.fill_rect(*x, *y, *w, *h, *rotation, color);
            }
            Self::Image { x, y, w, h, asset } => {
                if surface.bitmap_ready(asset) {
                    surface.blit_image(asset, *x, *y, *w, *h);
                }
            }
            Self::Text { x, y, text, size, color, font } => {
                surface.fill_text(text, *x, *y, *size, font, color);
            }
        }
    }
}
