use std::collections::HashMap;
use std::error::Error;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use super::types::{Block, SOLID_BLOCK_COUNT};

/// Linear display color, one channel per component in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    #[inline]
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }
}

/// Display colors for the solid block types. Consumed by the renderer only;
/// the meshing core never looks at colors.
#[derive(Clone, Debug, PartialEq)]
pub struct BlockPalette {
    colors: [Rgb; SOLID_BLOCK_COUNT],
}

impl Default for BlockPalette {
    fn default() -> Self {
        Self {
            colors: [
                Rgb::new(0.0, 1.0, 0.0),
                Rgb::new(130.0 / 255.0, 108.0 / 255.0, 47.0 / 255.0),
                Rgb::new(0.4, 0.4, 0.4),
                Rgb::new(1.0, 1.0, 1.0),
            ],
        }
    }
}

impl BlockPalette {
    /// Color for a solid block type.
    ///
    /// # Panics
    /// Panics when asked for `Air`; air cells are never drawn.
    #[inline]
    pub fn color(&self, block: Block) -> Rgb {
        assert!(block.is_solid(), "air has no display color");
        self.colors[block.code() as usize]
    }

    pub fn from_toml_str(toml_str: &str) -> Result<Self, Box<dyn Error>> {
        let cfg: PaletteConfig = toml::from_str(toml_str)?;
        let mut palette = BlockPalette::default();
        for (key, rgb) in &cfg.colors {
            let block = Block::SOLID
                .into_iter()
                .find(|b| b.name() == key)
                .ok_or_else(|| format!("palette names unknown block type {key:?}"))?;
            palette.colors[block.code() as usize] = Rgb::new(rgb[0], rgb[1], rgb[2]);
        }
        Ok(palette)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, Box<dyn Error>> {
        let s = fs::read_to_string(path)?;
        Self::from_toml_str(&s)
    }
}

#[derive(Deserialize)]
struct PaletteConfig {
    #[serde(default)]
    colors: HashMap<String, [f32; 3]>,
}
