//! Visualization: draw chart frames to **SVG**, **PNG** or animated **GIF**.
//!
//! - Marks are drawn first, axes and titles on top
//! - Bottom axis under the plot, left axis beside it, 6 px ticks
//! - x title centered 40 px below the plot, y title rotated 40 px left of it
//! - SVG needs no font; bitmap output needs [`util::register_font_file`]

pub mod util;

use crate::axis::{AxisModel, Orientation};
use crate::render::Frame;
use anyhow::{Result, anyhow};

use plotters::backend::DrawingBackend;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::{FontFamily, FontTransform};

use plotters_bitmap::BitMapBackend;
use plotters_svg::SVGBackend;

use std::path::{Path, PathBuf};

pub use util::register_font_file;
use util::{mark_style, require_font};

const TICK_SIZE: i32 = 6;
const TICK_PADDING: i32 = 3;
const TICK_FONT_PX: u32 = 10;
const TITLE_FONT_PX: u32 = 14;
const TITLE_OFFSET: f64 = 40.0;

/// Draw one frame onto any Plotters backend.
pub fn draw_frame<DB>(root: &DrawingArea<DB, Shift>, frame: &Frame) -> Result<()>
where
    DB: DrawingBackend,
{
    root.fill(&WHITE).map_err(|e| anyhow!("{:?}", e))?;

    let (ox, oy) = (frame.margin.left, frame.margin.top);
    let at = |x: f64, y: f64| ((ox + x).round() as i32, (oy + y).round() as i32);

    for m in &frame.marks {
        root.draw(&Circle::new(
            at(m.state.x, m.state.y),
            m.radius.round() as i32,
            mark_style(m.color, m.state.opacity),
        ))
        .map_err(|e| anyhow!("{:?}", e))?;
    }

    let plot_w = frame.width as f64 - frame.margin.left - frame.margin.right;
    let plot_h = frame.height as f64 - frame.margin.top - frame.margin.bottom;

    if let Some(axis) = &frame.x_axis {
        draw_axis(root, axis, at(0.0, plot_h))?;
        let title = TextStyle::from((FontFamily::SansSerif, TITLE_FONT_PX))
            .pos(Pos::new(HPos::Center, VPos::Bottom));
        root.draw(&Text::new(
            axis.title.as_str(),
            at(plot_w / 2.0, plot_h + TITLE_OFFSET),
            title,
        ))
        .map_err(|e| anyhow!("{:?}", e))?;
    }
    if let Some(axis) = &frame.y_axis {
        draw_axis(root, axis, at(0.0, 0.0))?;
        let font = (FontFamily::SansSerif, TITLE_FONT_PX)
            .into_font()
            .transform(FontTransform::Rotate270);
        let title = TextStyle::from(font).pos(Pos::new(HPos::Center, VPos::Bottom));
        root.draw(&Text::new(
            axis.title.as_str(),
            at(-TITLE_OFFSET, plot_h / 2.0),
            title,
        ))
        .map_err(|e| anyhow!("{:?}", e))?;
    }
    Ok(())
}

/// Domain line with outer ticks, tick marks and labels. `origin` is where the
/// axis group sits on the surface.
fn draw_axis<DB>(root: &DrawingArea<DB, Shift>, axis: &AxisModel, origin: (i32, i32)) -> Result<()>
where
    DB: DrawingBackend,
{
    let (x0, y0) = origin;
    let (r0, r1) = (axis.range.0.round() as i32, axis.range.1.round() as i32);
    let stroke = BLACK.stroke_width(1);
    let label_font = TextStyle::from((FontFamily::SansSerif, TICK_FONT_PX));

    match axis.orientation {
        Orientation::Bottom => {
            let domain = vec![
                (x0 + r0, y0 + TICK_SIZE),
                (x0 + r0, y0),
                (x0 + r1, y0),
                (x0 + r1, y0 + TICK_SIZE),
            ];
            root.draw(&PathElement::new(domain, stroke))
                .map_err(|e| anyhow!("{:?}", e))?;
            let style = label_font.pos(Pos::new(HPos::Center, VPos::Top));
            for t in &axis.ticks {
                let x = x0 + t.position.round() as i32;
                root.draw(&PathElement::new(vec![(x, y0), (x, y0 + TICK_SIZE)], stroke))
                    .map_err(|e| anyhow!("{:?}", e))?;
                root.draw(&Text::new(
                    t.label.as_str(),
                    (x, y0 + TICK_SIZE + TICK_PADDING),
                    style.clone(),
                ))
                .map_err(|e| anyhow!("{:?}", e))?;
            }
        }
        Orientation::Left => {
            let domain = vec![
                (x0 - TICK_SIZE, y0 + r0),
                (x0, y0 + r0),
                (x0, y0 + r1),
                (x0 - TICK_SIZE, y0 + r1),
            ];
            root.draw(&PathElement::new(domain, stroke))
                .map_err(|e| anyhow!("{:?}", e))?;
            let style = label_font.pos(Pos::new(HPos::Right, VPos::Center));
            for t in &axis.ticks {
                let y = y0 + t.position.round() as i32;
                root.draw(&PathElement::new(vec![(x0 - TICK_SIZE, y), (x0, y)], stroke))
                    .map_err(|e| anyhow!("{:?}", e))?;
                root.draw(&Text::new(
                    t.label.as_str(),
                    (x0 - TICK_SIZE - TICK_PADDING, y),
                    style.clone(),
                ))
                .map_err(|e| anyhow!("{:?}", e))?;
            }
        }
    }
    Ok(())
}

/// Write a frame to `.svg`, or to a bitmap format inferred from the extension.
pub fn save_frame<P: AsRef<Path>>(frame: &Frame, out_path: P) -> Result<()> {
    let out_path = out_path.as_ref();
    let size = (frame.width, frame.height);
    if out_path.extension().and_then(|s| s.to_str()) == Some("svg") {
        let root = SVGBackend::new(out_path, size).into_drawing_area();
        draw_frame(&root, frame)?;
        root.present().map_err(|e| anyhow!("{:?}", e))?;
    } else {
        require_font()?;
        let root = BitMapBackend::new(out_path, size).into_drawing_area();
        draw_frame(&root, frame)?;
        root.present().map_err(|e| anyhow!("{:?}", e))?;
    }
    Ok(())
}

/// Render a frame to an SVG document in memory.
pub fn frame_to_svg(frame: &Frame) -> Result<String> {
    let mut buf = String::new();
    {
        let root = SVGBackend::with_string(&mut buf, (frame.width, frame.height)).into_drawing_area();
        draw_frame(&root, frame)?;
        root.present().map_err(|e| anyhow!("{:?}", e))?;
    }
    Ok(buf)
}

/// Write one numbered SVG per frame (`frame_00000.svg`, …) into `dir`.
pub fn write_svg_frames<P: AsRef<Path>>(frames: &[Frame], dir: P) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir)?;
    let mut out = Vec::with_capacity(frames.len());
    for (i, frame) in frames.iter().enumerate() {
        let path = dir.join(format!("frame_{i:05}.svg"));
        save_frame(frame, &path)?;
        out.push(path);
    }
    Ok(out)
}

/// Write all frames as one animated GIF, `frame_delay_ms` apart.
pub fn write_gif<P: AsRef<Path>>(frames: &[Frame], out_path: P, frame_delay_ms: u32) -> Result<()> {
    let first = frames.first().ok_or_else(|| anyhow!("no frames to animate"))?;
    require_font()?;
    let root = BitMapBackend::gif(out_path.as_ref(), (first.width, first.height), frame_delay_ms)
        .map_err(|e| anyhow!("{:?}", e))?
        .into_drawing_area();
    for frame in frames {
        draw_frame(&root, frame)?;
        root.present().map_err(|e| anyhow!("{:?}", e))?;
    }
    Ok(())
}
