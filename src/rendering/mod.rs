//! Rendering: display list, geometry, title text and the rasterizer

pub mod layout;
pub mod paint;
pub mod raster;
pub mod text;

use sha2::{Digest, Sha256};

/// An encoded raster of the composition
#[derive(Debug, Clone)]
pub struct Screenshot {
    pub width: u32,
    pub height: u32,
    pub png_data: Vec<u8>,
}

impl Screenshot {
    pub fn empty(width: u32, height: u32) -> Self {
        Self { width, height, png_data: Vec::new() }
    }

    /// Hex SHA-256 of the PNG bytes, stable for identical renders
    pub fn digest(&self) -> String {
        hex::encode(Sha256::digest(&self.png_data))
    }
}
