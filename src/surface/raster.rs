//! Raster source surface

use std::fmt;
use std::path::Path;
use visioncortex::ColorImage;

use crate::error::{ConversionError, ConversionErrorKind, ConversionResult};

/// RGBA pixels the engines read their input from
#[derive(Clone)]
pub struct RasterSurface {
    pixels: Vec<u8>,
    width: usize,
    height: usize,
}

impl RasterSurface {
    /// Wrap raw RGBA8 pixels, row-major
    pub fn from_rgba(width: usize, height: usize, pixels: Vec<u8>) -> ConversionResult<Self> {
        let expected = width * height * 4;
        if pixels.len() != expected {
            return Err(ConversionError::configuration(format!(
                "Raster of {}x{} needs {} bytes, got {}",
                width,
                height,
                expected,
                pixels.len()
            )));
        }

        Ok(Self {
            pixels,
            width,
            height,
        })
    }

    /// Decode an image file in any format the `image` crate understands
    pub fn open(path: &Path) -> ConversionResult<Self> {
        let decoded = image::open(path).map_err(|e| {
            ConversionError::conversion(ConversionErrorKind::ImageDecode {
                message: e.to_string(),
                path: Some(path.to_path_buf()),
            })
        })?;
        let rgba = decoded.to_rgba8();
        let (width, height) = (rgba.width() as usize, rgba.height() as usize);

        Self::from_rgba(width, height, rgba.into_raw())
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Copy of the pixels in the engine's image type
    pub fn to_color_image(&self) -> ColorImage {
        ColorImage {
            pixels: self.pixels.clone(),
            width: self.width,
            height: self.height,
        }
    }
}

impl fmt::Debug for RasterSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RasterSurface")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}
