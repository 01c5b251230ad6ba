//! Compositor keyframe script (After Effects ExtendScript).
//!
//! The script builds one composition with a camera-control null (zoom, bearing and pitch
//! sliders) and one null per waypoint (`wp_<id>`) and pin (`pin_<id>`), then keys every frame
//! record at its exact capture time.

use std::fmt::Write as _;

use crate::encode::ffmpeg::ensure_parent_dir;
use crate::export::record::FrameRecord;
use crate::foundation::core::{Fps, Resolution};
use crate::foundation::error::{MaptrailError, MaptrailResult};
use crate::project::model::{Pin, Waypoint};

/// Default download name of the generated script.
pub const SCRIPT_FILE_NAME: &str = "import_map_ae.jsx";

/// Everything the script generator reads.
#[derive(Clone, Copy, Debug)]
pub struct ScriptInput<'a> {
    /// Composition size.
    pub resolution: Resolution,
    /// Composition frame rate.
    pub fps: Fps,
    /// Waypoints to create trackers for, in project order.
    pub waypoints: &'a [Waypoint],
    /// Pins to create trackers for, in project order.
    pub pins: &'a [Pin],
    /// Records of the last export.
    pub records: &'a [FrameRecord],
}

/// Escape `s` for use inside a double-quoted script string literal.
pub fn escape_string_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            c if c.is_control() => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out
}

fn num(v: f64, what: &str) -> MaptrailResult<f64> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(MaptrailError::encoding(format!(
            "{what} is not finite; cannot write keyframe"
        )))
    }
}

/// Generate the keyframe script.
///
/// Timestamps are written with Rust's shortest round-trip float formatting, so every key time
/// equals the record's `time` bit for bit once parsed back.
pub fn keyframe_script(input: &ScriptInput<'_>) -> MaptrailResult<String> {
    let Some(last) = input.records.last() else {
        return Err(MaptrailError::encoding(
            "no frame records; run an export first",
        ));
    };
    let duration = num(last.time, "record time")? + 1.0;
    let fps = input.fps.as_f64();

    let mut s = String::new();
    s.push_str("(function() {\n");
    s.push_str("    app.beginUndoGroup(\"Import Map Data\");\n");
    let _ = writeln!(
        s,
        "    var comp = app.project.items.addComp(\"Map Animation\", {}, {}, 1, {duration}, {fps});",
        input.resolution.width, input.resolution.height
    );
    s.push_str("    if (!comp) {\n        alert(\"Failed to create composition.\");\n        return;\n    }\n");
    s.push_str("    var camNull = comp.layers.addNull();\n");
    s.push_str("    camNull.name = \"Map Camera Control\";\n");
    for (var, name) in [("sZoom", "Map Zoom"), ("sBear", "Map Bearing"), ("sPitch", "Map Pitch")] {
        let _ = writeln!(
            s,
            "    var {var} = camNull.Effects.addProperty(\"ADBE Slider Control\");\n    {var}.name = \"{name}\";"
        );
    }

    s.push_str("\n    var wpNulls = {};\n");
    for (i, wp) in input.waypoints.iter().enumerate() {
        let id = wp.id;
        let _ = writeln!(s, "    var wp_{id} = comp.layers.addNull();");
        let _ = writeln!(s, "    wp_{id}.name = \"Tracker WP {}\";", i + 1);
        let _ = writeln!(s, "    wp_{id}.label = 10;");
        let _ = writeln!(s, "    wpNulls[{id}] = wp_{id};");
    }

    s.push_str("\n    var pinNulls = {};\n");
    for pin in input.pins {
        let id = pin.id;
        let _ = writeln!(s, "    var pin_{id} = comp.layers.addNull();");
        let _ = writeln!(
            s,
            "    pin_{id}.name = \"Pin {}\";",
            escape_string_literal(&pin.text)
        );
        let _ = writeln!(s, "    pin_{id}.label = 9;");
        let _ = writeln!(s, "    pinNulls[{id}] = pin_{id};");
    }

    s.push_str("\n    try {\n");
    for rec in input.records {
        let t = num(rec.time, "record time")?;
        let _ = writeln!(
            s,
            "        sZoom.property(\"Slider\").setValueAtTime({t}, {});",
            num(rec.camera.zoom, "zoom")?
        );
        let _ = writeln!(
            s,
            "        sBear.property(\"Slider\").setValueAtTime({t}, {});",
            num(rec.camera.bearing, "bearing")?
        );
        let _ = writeln!(
            s,
            "        sPitch.property(\"Slider\").setValueAtTime({t}, {});",
            num(rec.camera.pitch, "pitch")?
        );
        for wp in &rec.waypoints {
            let _ = writeln!(
                s,
                "        if (wpNulls[{id}]) {{ wpNulls[{id}].transform.position.setValueAtTime({t}, [{}, {}]); }}",
                num(wp.x, "waypoint x")?,
                num(wp.y, "waypoint y")?,
                id = wp.id
            );
        }
        for pin in &rec.pins {
            let _ = writeln!(
                s,
                "        if (pinNulls[{id}]) {{ pinNulls[{id}].transform.position.setValueAtTime({t}, [{}, {}]); }}",
                num(pin.x, "pin x")?,
                num(pin.y, "pin y")?,
                id = pin.id
            );
        }
    }
    s.push_str("    } catch (e) {\n");
    s.push_str(
        "        alert(\"Error setting keyframes on line \" + e.line.toString() + \": \" + e.toString());\n",
    );
    s.push_str("    }\n\n");
    s.push_str("    app.endUndoGroup();\n");
    s.push_str("    alert(\"Map Data Imported!\");\n");
    s.push_str("})();\n");

    tracing::debug!(
        records = input.records.len(),
        bytes = s.len(),
        "generated keyframe script"
    );
    Ok(s)
}

/// Generate the script and write it to `path`.
pub fn write_keyframe_script(input: &ScriptInput<'_>, path: &std::path::Path) -> MaptrailResult<()> {
    use anyhow::Context as _;
    let script = keyframe_script(input)?;
    ensure_parent_dir(path)?;
    std::fs::write(path, script)
        .with_context(|| format!("write keyframe script '{}'", path.display()))?;
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/encode/script.rs"]
mod tests;
