use std::io::Cursor;

use anyhow::Context as _;

use crate::foundation::core::Resolution;
use crate::foundation::error::{MaptrailError, MaptrailResult};
use crate::foundation::math::unpremultiply_rgba8_in_place;

/// A captured frame as RGBA8 pixels.
///
/// Frames coming out of the built-in renderer are premultiplied; the flag makes this explicit at
/// API boundaries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Fully transparent frame.
    pub fn transparent(resolution: Resolution) -> Self {
        Self {
            width: resolution.width,
            height: resolution.height,
            data: vec![0; resolution.rgba_len()],
            premultiplied: true,
        }
    }

    /// Frame dimensions.
    pub fn resolution(&self) -> Resolution {
        Resolution {
            width: self.width,
            height: self.height,
        }
    }

    /// Check that `data` holds exactly `width * height` pixels.
    pub fn validate(&self) -> MaptrailResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(MaptrailError::renderer("frame has zero width/height"));
        }
        if self.data.len() != self.resolution().rgba_len() {
            return Err(MaptrailError::renderer(format!(
                "frame data is {} bytes, expected {} for {}x{}",
                self.data.len(),
                self.resolution().rgba_len(),
                self.width,
                self.height
            )));
        }
        Ok(())
    }

    /// Straight-alpha copy as an `image` buffer.
    pub fn to_straight_image(&self) -> MaptrailResult<image::RgbaImage> {
        self.validate()?;
        let mut data = self.data.clone();
        if self.premultiplied {
            unpremultiply_rgba8_in_place(&mut data);
        }
        image::RgbaImage::from_raw(self.width, self.height, data)
            .ok_or_else(|| MaptrailError::renderer("frame buffer does not match its dimensions"))
    }

    /// Build a frame from a straight-alpha `image` buffer.
    pub fn from_straight_image(img: image::RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            data: img.into_raw(),
            premultiplied: false,
        }
    }

    /// Encode as a PNG file.
    pub fn to_png_bytes(&self) -> MaptrailResult<Vec<u8>> {
        let img = self.to_straight_image()?;
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png)
            .context("encode frame as PNG")?;
        Ok(out.into_inner())
    }
}

/// Rasterize a parsed SVG tree into a premultiplied frame of `width`x`height`.
pub(crate) fn rasterize_svg(tree: &usvg::Tree, width: u32, height: u32) -> MaptrailResult<FrameRGBA> {
    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| MaptrailError::renderer("failed to allocate svg pixmap"))?;

    let sx = (width as f32) / tree.size().width();
    let sy = (height as f32) / tree.size().height();
    let xform = resvg::tiny_skia::Transform::from_scale(sx, sy);

    resvg::render(tree, xform, &mut pixmap.as_mut());
    Ok(FrameRGBA {
        width,
        height,
        data: pixmap.data().to_vec(),
        premultiplied: true,
    })
}

/// Shared SVG parser with a loaded font database.
#[derive(Clone)]
pub struct SvgRasterizer {
    fontdb: std::sync::Arc<usvg::fontdb::Database>,
}

impl SvgRasterizer {
    /// Parser backed by the system fonts.
    pub fn with_system_fonts() -> Self {
        let mut db = usvg::fontdb::Database::new();
        db.load_system_fonts();
        Self {
            fontdb: std::sync::Arc::new(db),
        }
    }

    /// Parser without any fonts; labels are skipped.
    pub fn without_fonts() -> Self {
        Self {
            fontdb: std::sync::Arc::new(usvg::fontdb::Database::new()),
        }
    }

    /// Parse an SVG document.
    pub fn parse(&self, svg: &str) -> MaptrailResult<usvg::Tree> {
        let opts = usvg::Options {
            fontdb: self.fontdb.clone(),
            ..Default::default()
        };
        usvg::Tree::from_str(svg, &opts)
            .map_err(|e| MaptrailError::renderer(format!("parse svg: {e}")))
    }

    /// Parse and rasterize an SVG document at its intrinsic size.
    pub fn rasterize(&self, svg: &str) -> MaptrailResult<FrameRGBA> {
        let tree = self.parse(svg)?;
        let size = tree.size();
        let w = size.width().ceil().max(1.0) as u32;
        let h = size.height().ceil().max(1.0) as u32;
        rasterize_svg(&tree, w, h)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/frame.rs"]
mod tests;
