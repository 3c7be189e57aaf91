//! Utility functions for drawing: color conversion and font registration.

use crate::color::Rgb;
use anyhow::{Result, anyhow};
use plotters::prelude::*;
use plotters::style::FontStyle;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Font registered for the bitmap path; `ab_glyph` doesn't discover OS fonts.
static FONT: OnceLock<PathBuf> = OnceLock::new();

#[inline]
pub fn to_rgb_color(c: Rgb) -> RGBColor {
    RGBColor(c.0, c.1, c.2)
}

/// Filled style of a mark color at the given opacity.
pub fn mark_style(c: Rgb, opacity: f64) -> ShapeStyle {
    to_rgb_color(c).mix(opacity.clamp(0.0, 1.0)).filled()
}

/// Register a TrueType font as "sans-serif" for PNG/GIF output.
///
/// Only the first registration takes effect; later calls with another file are ignored.
pub fn register_font_file(path: &Path) -> Result<()> {
    if let Some(existing) = FONT.get() {
        if existing != path {
            log::warn!(
                "font {} already registered, ignoring {}",
                existing.display(),
                path.display()
            );
        }
        return Ok(());
    }
    let bytes = std::fs::read(path)
        .map_err(|e| anyhow!("cannot read font {}: {}", path.display(), e))?;
    // plotters keeps a 'static reference for the process lifetime.
    let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
    plotters::style::register_font("sans-serif", FontStyle::Normal, bytes)
        .map_err(|_| anyhow!("{} is not a usable TrueType font", path.display()))?;
    let _ = FONT.set(path.to_path_buf());
    log::info!("registered font {}", path.display());
    Ok(())
}

/// Bitmap text needs a registered font.
pub fn require_font() -> Result<()> {
    if FONT.get().is_none() {
        return Err(anyhow!(
            "PNG and GIF output need a TrueType font; pass one with --font"
        ));
    }
    Ok(())
}
