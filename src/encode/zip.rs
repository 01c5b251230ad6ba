use std::fs::File;
use std::io::{BufWriter, Cursor, Write as _};
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::encode::ffmpeg::ensure_parent_dir;
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{MaptrailError, MaptrailResult};
use crate::render::frame::FrameRGBA;

/// Archive member name for frame `idx`.
pub fn frame_file_name(idx: FrameIndex) -> String {
    format!("frame_{:05}.png", idx.0)
}

enum Archive {
    File(ZipWriter<BufWriter<File>>),
    Memory(ZipWriter<Cursor<Vec<u8>>>),
}

impl Archive {
    fn add(&mut self, name: String, bytes: &[u8]) -> zip::result::ZipResult<()> {
        // PNG is already compressed.
        let opts = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
        match self {
            Self::File(w) => {
                w.start_file(name, opts)?;
                w.write_all(bytes)?;
            }
            Self::Memory(w) => {
                w.start_file(name, opts)?;
                w.write_all(bytes)?;
            }
        }
        Ok(())
    }
}

/// Sink packaging every frame as `frame_NNNNN.png` in a zip archive.
///
/// Writes to a file or keeps the archive in memory. A file left unfinished by an error or an
/// abort is removed.
pub struct ZipSink {
    out_path: Option<PathBuf>,
    archive: Option<Archive>,
    cfg: Option<SinkConfig>,
    last_idx: Option<FrameIndex>,
    bytes: Option<Vec<u8>>,
    entries: u64,
}

impl ZipSink {
    /// Sink writing the archive to `out_path`.
    pub fn to_path(out_path: impl Into<PathBuf>) -> Self {
        Self::with_target(Some(out_path.into()))
    }

    /// Sink keeping the archive in memory; see [`ZipSink::bytes`].
    pub fn in_memory() -> Self {
        Self::with_target(None)
    }

    fn with_target(out_path: Option<PathBuf>) -> Self {
        Self {
            out_path,
            archive: None,
            cfg: None,
            last_idx: None,
            bytes: None,
            entries: 0,
        }
    }

    /// Finished in-memory archive.
    pub fn bytes(&self) -> Option<&[u8]> {
        self.bytes.as_deref()
    }

    /// Output path, for file-backed sinks.
    pub fn out_path(&self) -> Option<&Path> {
        self.out_path.as_deref()
    }

    /// Frames stored since the last `begin`.
    pub fn entries(&self) -> u64 {
        self.entries
    }

    fn fail(&mut self, err: MaptrailError) -> MaptrailError {
        self.discard_partial();
        err
    }

    fn discard_partial(&mut self) {
        if self.archive.take().is_some()
            && let Some(path) = self.out_path.as_ref()
        {
            if let Err(e) = std::fs::remove_file(path) {
                tracing::warn!(path = %path.display(), error = %e, "failed to remove partial archive");
            }
        }
        self.cfg = None;
    }

    fn write_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> MaptrailResult<()> {
        let cfg = self
            .cfg
            .ok_or_else(|| MaptrailError::encoding("zip sink not started"))?;
        if let Some(last) = self.last_idx
            && idx.0 <= last.0
        {
            return Err(MaptrailError::encoding(
                "zip sink received out-of-order frame index",
            ));
        }
        self.last_idx = Some(idx);

        if frame.width != cfg.width || frame.height != cfg.height {
            return Err(MaptrailError::encoding(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, cfg.width, cfg.height
            )));
        }

        let png = frame
            .to_png_bytes()
            .map_err(|e| MaptrailError::encoding(e.to_string()))?;
        let archive = self
            .archive
            .as_mut()
            .ok_or_else(|| MaptrailError::encoding("zip sink is already finalized"))?;
        archive
            .add(frame_file_name(idx), &png)
            .map_err(|e| MaptrailError::encoding(format!("add frame {} to zip: {e}", idx.0)))?;
        self.entries += 1;
        Ok(())
    }
}

impl FrameSink for ZipSink {
    fn begin(&mut self, cfg: SinkConfig) -> MaptrailResult<()> {
        if cfg.width == 0 || cfg.height == 0 {
            return Err(MaptrailError::encoding(
                "zip sink width/height must be non-zero",
            ));
        }
        self.discard_partial();

        let archive = match self.out_path.as_ref() {
            Some(path) => {
                ensure_parent_dir(path)?;
                let file = File::create(path)
                    .with_context(|| format!("create archive '{}'", path.display()))?;
                Archive::File(ZipWriter::new(BufWriter::new(file)))
            }
            None => Archive::Memory(ZipWriter::new(Cursor::new(Vec::new()))),
        };

        self.archive = Some(archive);
        self.cfg = Some(cfg);
        self.last_idx = None;
        self.bytes = None;
        self.entries = 0;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> MaptrailResult<()> {
        self.write_frame(idx, frame).map_err(|e| self.fail(e))
    }

    fn end(&mut self) -> MaptrailResult<()> {
        let archive = self
            .archive
            .take()
            .ok_or_else(|| MaptrailError::encoding("zip sink not started"))?;
        self.cfg = None;

        let finished: zip::result::ZipResult<Option<Vec<u8>>> = match archive {
            Archive::File(w) => w.finish().and_then(|mut out| {
                out.flush()?;
                Ok(None)
            }),
            Archive::Memory(w) => w.finish().map(|cur| Some(cur.into_inner())),
        };

        match finished {
            Ok(bytes) => {
                self.bytes = bytes;
                tracing::info!(frames = self.entries, "zip archive finished");
                Ok(())
            }
            Err(e) => {
                if let Some(path) = self.out_path.as_ref() {
                    let _ = std::fs::remove_file(path);
                }
                Err(MaptrailError::encoding(format!("finish zip archive: {e}")))
            }
        }
    }

    fn abort(&mut self) {
        self.discard_partial();
        self.entries = 0;
        self.bytes = None;
    }
}

impl Drop for ZipSink {
    fn drop(&mut self) {
        self.discard_partial();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/zip.rs"]
mod tests;
