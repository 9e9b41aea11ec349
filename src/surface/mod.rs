//! Host surfaces: raster sources and vector outputs looked up by id

pub mod raster;
pub mod svg;

pub use raster::RasterSurface;
pub use svg::{export_filename, SvgDocument, SvgPath, GENERATOR_COMMENT};

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;
use std::rc::Rc;
use tracing::debug;
use visioncortex::{Color, CompoundPath};

use crate::error::{ConversionError, ConversionErrorKind, ConversionResult};

/// Shared handle onto an [`SvgDocument`]
#[derive(Debug, Clone, Default)]
pub struct VectorSurface {
    document: Rc<RefCell<SvgDocument>>,
}

impl VectorSurface {
    pub fn new(id: impl Into<String>, width: usize, height: usize) -> Self {
        Self {
            document: Rc::new(RefCell::new(SvgDocument::new(id, width, height))),
        }
    }

    pub fn prepend_path(&self, path: &CompoundPath, color: &Color, precision: Option<u32>) {
        self.prepend(SvgPath::from_compound(path, color, precision));
    }

    pub fn prepend(&self, path: SvgPath) {
        self.document.borrow_mut().prepend(path);
    }

    pub fn clear(&self) {
        self.document.borrow_mut().clear();
    }

    pub fn set_size(&self, width: usize, height: usize) {
        self.document.borrow_mut().set_size(width, height);
    }

    pub fn len(&self) -> usize {
        self.document.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.document.borrow().is_empty()
    }

    /// The bare `<svg>` element
    pub fn markup(&self) -> String {
        self.document.borrow().to_string()
    }

    pub fn export_document(&self) -> String {
        self.document.borrow().export_document()
    }

    pub fn snapshot(&self) -> SvgDocument {
        self.document.borrow().clone()
    }

    /// Write the exported document to `path`, creating missing parent directories
    pub fn save(&self, path: &Path) -> ConversionResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                ConversionError::conversion_with_source(
                    ConversionErrorKind::io(
                        "Cannot create output directory".to_string(),
                        Some(parent.to_path_buf()),
                    ),
                    e.into(),
                )
            })?;
        }

        std::fs::write(path, self.export_document()).map_err(|e| {
            ConversionError::conversion_with_source(
                ConversionErrorKind::export(e.to_string(), path.to_path_buf()),
                e.into(),
            )
        })?;

        debug!(path = %path.display(), paths = self.len(), "document exported");
        Ok(())
    }
}

#[derive(Debug, Default)]
struct SurfaceRegistry {
    rasters: HashMap<String, RasterSurface>,
    vectors: HashMap<String, VectorSurface>,
}

/// Registry of the host's surfaces, cheap to clone
#[derive(Debug, Clone, Default)]
pub struct Surfaces {
    registry: Rc<RefCell<SurfaceRegistry>>,
}

impl Surfaces {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load (or replace) the raster behind `id`
    pub fn load_raster(&self, id: impl Into<String>, raster: RasterSurface) {
        self.registry
            .borrow_mut()
            .rasters
            .insert(id.into(), raster);
    }

    /// Get the vector surface behind `id`, creating it when missing, and size it
    pub fn attach_vector(&self, id: &str, width: usize, height: usize) -> VectorSurface {
        let mut registry = self.registry.borrow_mut();
        let surface = registry
            .vectors
            .entry(id.to_string())
            .or_insert_with(|| VectorSurface::new(id, width, height))
            .clone();
        surface.set_size(width, height);
        surface
    }

    pub fn raster(&self, id: &str) -> Option<RasterSurface> {
        self.registry.borrow().rasters.get(id).cloned()
    }

    pub fn has_raster(&self, id: &str) -> bool {
        self.registry.borrow().rasters.contains_key(id)
    }

    pub fn vector(&self, id: &str) -> Option<VectorSurface> {
        self.registry.borrow().vectors.get(id).cloned()
    }
}
