use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use anyhow::Context as _;

use crate::foundation::error::{MaptrailError, MaptrailResult};
use crate::project::model::Project;

impl Project {
    /// Parse and validate a project from a JSON reader.
    ///
    /// Nothing is returned unless the whole document parses and validates, so callers can swap the
    /// result in without risking a half-applied load.
    pub fn from_reader<R: std::io::Read>(r: R) -> MaptrailResult<Self> {
        let project: Project = serde_json::from_reader(r)
            .map_err(|e| MaptrailError::parse(format!("parse project JSON: {e}")))?;
        project
            .validate()
            .map_err(|e| MaptrailError::parse(format!("invalid project: {e}")))?;
        Ok(project)
    }

    /// Parse and validate a project from a JSON string.
    pub fn from_json_str(s: &str) -> MaptrailResult<Self> {
        Self::from_reader(s.as_bytes())
    }

    /// Parse and validate a project file on disk.
    #[tracing::instrument]
    pub fn from_path(path: &Path) -> MaptrailResult<Self> {
        let f = File::open(path).map_err(|e| {
            MaptrailError::parse(format!("open project JSON '{}': {e}", path.display()))
        })?;
        let project = Self::from_reader(BufReader::new(f))?;
        tracing::info!(
            waypoints = project.waypoints.len(),
            pins = project.pins.len(),
            path_points = project.custom_path.len(),
            "loaded project"
        );
        Ok(project)
    }

    /// Write the project as pretty-printed JSON.
    pub fn to_writer<W: Write>(&self, w: W) -> MaptrailResult<()> {
        serde_json::to_writer_pretty(w, self).context("serialize project JSON")?;
        Ok(())
    }

    /// Serialize the project to a pretty-printed JSON string.
    pub fn to_json_string(&self) -> MaptrailResult<String> {
        Ok(serde_json::to_string_pretty(self).context("serialize project JSON")?)
    }

    /// Write the project to `path`, creating parent directories as needed.
    pub fn save_to_path(&self, path: &Path) -> MaptrailResult<()> {
        crate::encode::ffmpeg::ensure_parent_dir(path)?;
        let f = File::create(path)
            .with_context(|| format!("create project file '{}'", path.display()))?;
        let mut w = BufWriter::new(f);
        self.to_writer(&mut w)?;
        w.flush()
            .with_context(|| format!("flush project file '{}'", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/project/file.rs"]
mod tests;
