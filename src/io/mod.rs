//! Mesh file I/O.
//!
//! | Format | Extension | Load | Save |
//! |--------|-----------|------|------|
//! | Wavefront OBJ | `.obj` | ✓ | ✓ |
//! | STL | `.stl` | ✓ | ✓ (binary) |
//!
//! [`load`] and [`save`] pick the format from the file extension:
//!
//! ```no_run
//! use seamweld::io::{load, save};
//!
//! let mesh = load("open_seam.obj").unwrap();
//! save(&mesh, "open_seam.stl").unwrap();
//! ```

pub mod obj;
pub mod stl;

use std::path::Path;

use crate::error::{MeshError, Result};
use crate::mesh::DynamicMesh;

/// Supported mesh file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Wavefront OBJ format.
    Obj,
    /// STL (stereolithography) format.
    Stl,
}

impl Format {
    /// Detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Format> {
        match ext.to_lowercase().as_str() {
            "obj" => Some(Format::Obj),
            "stl" => Some(Format::Stl),
            _ => None,
        }
    }

    /// Detect format from file path.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Format> {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Format::from_extension)
    }
}

fn detect(path: &Path) -> Result<Format> {
    Format::from_path(path).ok_or_else(|| MeshError::UnsupportedFormat {
        extension: path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("(none)")
            .to_string(),
    })
}

/// Load a mesh from a file with automatic format detection.
pub fn load<P: AsRef<Path>>(path: P) -> Result<DynamicMesh> {
    let path = path.as_ref();
    match detect(path)? {
        Format::Obj => obj::load(path),
        Format::Stl => stl::load(path),
    }
}

/// Save a mesh to a file with automatic format detection.
pub fn save<P: AsRef<Path>>(mesh: &DynamicMesh, path: P) -> Result<()> {
    let path = path.as_ref();
    match detect(path)? {
        Format::Obj => obj::save(mesh, path),
        Format::Stl => stl::save(mesh, path),
    }
}
