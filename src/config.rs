use std::error::Error;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use karst_world::GenParams;

/// Engine constants, fixed for the lifetime of a run. Loaded from TOML with
/// per-field defaults, so a partial file only overrides what it names.
#[derive(Clone, Debug, Deserialize)]
pub struct EngineConfig {
    /// Chunk side length in blocks; must be a power of two.
    #[serde(default = "default_chunk_dim")]
    pub chunk_dim: usize,
    /// Maximum resident chunk count (pool capacity).
    #[serde(default = "default_pool_capacity")]
    pub pool_capacity: usize,
    /// Horizontal streaming radius, in chunks.
    #[serde(default = "default_radius_xz")]
    pub radius_xz: i32,
    /// Vertical streaming radius, in chunks.
    #[serde(default = "default_radius_y")]
    pub radius_y: i32,
    #[serde(default = "default_seed")]
    pub seed: i32,
    /// Optional palette file; the built-in palette applies when absent or
    /// unreadable.
    #[serde(default)]
    pub palette: Option<String>,
    #[serde(default)]
    pub r#gen: GenParams,
}

fn default_chunk_dim() -> usize {
    16
}
fn default_pool_capacity() -> usize {
    2048
}
fn default_radius_xz() -> i32 {
    8
}
fn default_radius_y() -> i32 {
    2
}
fn default_seed() -> i32 {
    0x7b44_7dc7_u32 as i32
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            chunk_dim: default_chunk_dim(),
            pool_capacity: default_pool_capacity(),
            radius_xz: default_radius_xz(),
            radius_y: default_radius_y(),
            seed: default_seed(),
            palette: None,
            r#gen: GenParams::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, Box<dyn Error>> {
        let s = fs::read_to_string(path)?;
        Ok(toml::from_str(&s)?)
    }
}
