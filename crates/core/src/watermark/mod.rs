//! Text and image watermarks for rasterized PDF pages.
//!
//! The pipeline per page is: prepare the overlay (rendered text or scaled
//! image with opacity applied), compute a [`PlacementPlan`] with
//! [`layout::layout`], then blend the overlay onto the page with
//! [`compositor::composite`].

pub mod compositor;
pub mod layout;
pub mod stamper;
pub mod text;

pub use compositor::{composite, OverlayDraw};
pub use layout::{layout, scale_to_fit, Dimensions, Placement, PlacementPlan};
pub use stamper::WatermarkStamper;
pub use text::{GlyphPainter, TextPainter};

use crate::error::{PdfToolError, Result};
use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::warn;

/// Largest accepted text watermark font size, in points.
pub const MAX_FONT_SIZE: u32 = 1000;

/// Kind of watermark content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WatermarkKind {
    Text,
    Image,
}

impl FromStr for WatermarkKind {
    type Err = PdfToolError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(WatermarkKind::Text),
            "image" => Ok(WatermarkKind::Image),
            other => Err(PdfToolError::InvalidParameter {
                name: "type".to_string(),
                message: format!("unknown watermark type '{}'", other),
            }),
        }
    }
}

/// Where the watermark goes on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WatermarkPosition {
    #[default]
    Center,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    Tile,
}

impl FromStr for WatermarkPosition {
    type Err = PdfToolError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "center" => Ok(WatermarkPosition::Center),
            "top-left" => Ok(WatermarkPosition::TopLeft),
            "top-right" => Ok(WatermarkPosition::TopRight),
            "bottom-left" => Ok(WatermarkPosition::BottomLeft),
            "bottom-right" => Ok(WatermarkPosition::BottomRight),
            "tile" => Ok(WatermarkPosition::Tile),
            other => Err(PdfToolError::InvalidParameter {
                name: "position".to_string(),
                message: format!("unknown watermark position '{}'", other),
            }),
        }
    }
}

/// RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };

    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#RRGGBB` or `#RGB`.
    pub fn from_hex(hex: &str) -> Result<Self> {
        let invalid = || PdfToolError::InvalidParameter {
            name: "color".to_string(),
            message: format!("expected #RGB or #RRGGBB, got '{}'", hex),
        };
        let digits = hex.strip_prefix('#').ok_or_else(invalid)?;
        if !digits.is_ascii() {
            return Err(invalid());
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid());
        match digits.len() {
            3 => Ok(Self::new(
                channel(&digits[0..1])? * 17,
                channel(&digits[1..2])? * 17,
                channel(&digits[2..3])? * 17,
            )),
            6 => Ok(Self::new(
                channel(&digits[0..2])?,
                channel(&digits[2..4])?,
                channel(&digits[4..6])?,
            )),
            _ => Err(invalid()),
        }
    }

    /// Parse a hex color, falling back to black when it is malformed.
    pub fn from_hex_or_black(hex: &str) -> Self {
        Self::from_hex(hex).unwrap_or_else(|_| {
            warn!(color = hex, "Unparsable watermark color, using black");
            Self::BLACK
        })
    }
}

/// Watermark content with the data each kind requires.
#[derive(Debug, Clone)]
pub enum WatermarkContent {
    Text {
        content: String,
        /// Requested size in points; scaled to raster pixels when painting.
        font_size: u32,
        color: Rgb,
    },
    Image {
        source: RgbaImage,
    },
}

/// Validated watermark configuration.
#[derive(Debug, Clone)]
pub struct WatermarkSpec {
    pub content: WatermarkContent,
    pub position: WatermarkPosition,
    pub opacity: f32,
}

impl WatermarkSpec {
    /// Text watermark.
    pub fn text(
        content: impl Into<String>,
        font_size: u32,
        color: Rgb,
        position: WatermarkPosition,
        opacity: f32,
    ) -> Result<Self> {
        let content = content.into();
        if content.is_empty() {
            return Err(PdfToolError::MissingParameter(
                "text is required for text watermark".to_string(),
            ));
        }
        if font_size == 0 || font_size > MAX_FONT_SIZE {
            return Err(PdfToolError::InvalidParameter {
                name: "fontSize".to_string(),
                message: format!("font size must be between 1 and {}", MAX_FONT_SIZE),
            });
        }
        Ok(Self {
            content: WatermarkContent::Text {
                content,
                font_size,
                color,
            },
            position,
            opacity: validate_opacity(opacity)?,
        })
    }

    /// Image watermark from an already decoded raster.
    pub fn image(source: RgbaImage, position: WatermarkPosition, opacity: f32) -> Result<Self> {
        if source.width() == 0 || source.height() == 0 {
            return Err(PdfToolError::InvalidParameter {
                name: "image".to_string(),
                message: "watermark image has no pixels".to_string(),
            });
        }
        Ok(Self {
            content: WatermarkContent::Image { source },
            position,
            opacity: validate_opacity(opacity)?,
        })
    }

    pub fn kind(&self) -> WatermarkKind {
        match self.content {
            WatermarkContent::Text { .. } => WatermarkKind::Text,
            WatermarkContent::Image { .. } => WatermarkKind::Image,
        }
    }
}

fn validate_opacity(opacity: f32) -> Result<f32> {
    if !(0.0..=1.0).contains(&opacity) {
        return Err(PdfToolError::InvalidParameter {
            name: "opacity".to_string(),
            message: "Opacity must be between 0 and 1".to_string(),
        });
    }
    Ok(opacity)
}

/// Raw watermark request parameters, as a form or JSON body would carry them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatermarkOptions {
    #[serde(rename = "type")]
    pub kind: WatermarkKind,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub position: WatermarkPosition,
    #[serde(default = "default_opacity")]
    pub opacity: f32,
    #[serde(default = "default_font_size")]
    pub font_size: u32,
    #[serde(default = "default_color")]
    pub color: String,
}

fn default_opacity() -> f32 {
    0.5
}

fn default_font_size() -> u32 {
    40
}

fn default_color() -> String {
    "#000000".to_string()
}

impl WatermarkOptions {
    /// Options with the documented defaults for the given kind.
    pub fn new(kind: WatermarkKind) -> Self {
        Self {
            kind,
            text: None,
            position: WatermarkPosition::default(),
            opacity: default_opacity(),
            font_size: default_font_size(),
            color: default_color(),
        }
    }

    /// Validate the options and, for image watermarks, decode `image`.
    pub fn into_spec(self, image: Option<&[u8]>) -> Result<WatermarkSpec> {
        match self.kind {
            WatermarkKind::Text => {
                let text = self
                    .text
                    .filter(|t| !t.is_empty())
                    .ok_or_else(|| {
                        PdfToolError::MissingParameter(
                            "text is required for text watermark".to_string(),
                        )
                    })?;
                WatermarkSpec::text(
                    text,
                    self.font_size,
                    Rgb::from_hex_or_black(&self.color),
                    self.position,
                    self.opacity,
                )
            }
            WatermarkKind::Image => {
                let bytes = image.filter(|b| !b.is_empty()).ok_or_else(|| {
                    PdfToolError::MissingParameter(
                        "image is required for image watermark".to_string(),
                    )
                })?;
                let source = image::load_from_memory(bytes)
                    .map_err(|e| PdfToolError::InvalidParameter {
                        name: "image".to_string(),
                        message: format!("cannot decode watermark image: {}", e),
                    })?
                    .into_rgba8();
                WatermarkSpec::image(source, self.position, self.opacity)
            }
        }
    }
}
