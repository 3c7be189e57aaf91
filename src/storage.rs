use crate::render::Frame;
use anyhow::Result;
use csv::WriterBuilder;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Save the marks of a frame as CSV with header (plot coordinates).
pub fn save_marks_csv<P: AsRef<Path>>(frame: &Frame, path: P) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_path(path)?;
    wtr.serialize(("id", "district", "state", "color", "x", "y", "radius", "opacity"))?;
    for m in &frame.marks {
        wtr.serialize((
            m.id.0,
            &m.label,
            &m.group,
            m.color.hex(),
            m.state.x,
            m.state.y,
            m.radius,
            m.state.opacity,
        ))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Save the whole frame (axes included) as pretty JSON.
pub fn save_frame_json<P: AsRef<Path>>(frame: &Frame, path: P) -> Result<()> {
    let mut f = File::create(path)?;
    let s = serde_json::to_string_pretty(frame)?;
    f.write_all(s.as_bytes())?;
    Ok(())
}
