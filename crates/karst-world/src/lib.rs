//! Chunk coordinates and terrain height generation.
#![forbid(unsafe_code)]

use fastnoise_lite::{FastNoiseLite, NoiseType};
use serde::Deserialize;

use karst_blocks::Block;

/// Position of a chunk on the chunk grid. Each chunk occupies a `D x D x D`
/// region of world space at offset `(cx*D, cy*D, cz*D)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ChunkCoord {
    pub cx: i32,
    pub cy: i32,
    pub cz: i32,
}

impl ChunkCoord {
    #[inline]
    pub const fn new(cx: i32, cy: i32, cz: i32) -> Self {
        Self { cx, cy, cz }
    }

    #[inline]
    pub fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self {
            cx: self.cx + dx,
            cy: self.cy + dy,
            cz: self.cz + dz,
        }
    }

    /// Chunk containing the given world-space block position.
    #[inline]
    pub fn of_world(wx: i32, wy: i32, wz: i32, dim: usize) -> Self {
        let d = dim as i32;
        Self {
            cx: wx.div_euclid(d),
            cy: wy.div_euclid(d),
            cz: wz.div_euclid(d),
        }
    }
}

impl From<(i32, i32, i32)> for ChunkCoord {
    fn from(value: (i32, i32, i32)) -> Self {
        Self::new(value.0, value.1, value.2)
    }
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum WorldGenMode {
    Normal,
    /// Uniform stone slab of the given thickness; deterministic and cheap,
    /// used by tests and benches.
    Flat { thickness: i32 },
}

#[derive(Clone, Debug, Deserialize)]
pub struct GenParams {
    /// Amplitude per octave, coarsest first. Heights come out as
    /// `dim * sum(w_k * n_k)` with each `n_k` normalized to `[0, 1]`.
    #[serde(default = "default_octave_weights")]
    pub octave_weights: [f32; 4],
    /// Horizontal wavelength of the coarsest octave, in blocks. Each finer
    /// octave halves it.
    #[serde(default = "default_base_scale")]
    pub base_scale: f32,
    /// Dirt layers under the surface block before stone takes over.
    #[serde(default = "default_dirt_depth")]
    pub dirt_depth: i32,
    /// Columns whose surface reaches this height get snow instead of grass.
    #[serde(default = "default_snow_line")]
    pub snow_line: i32,
}

fn default_octave_weights() -> [f32; 4] {
    [6.0, 3.0, 1.5, 0.75]
}
fn default_base_scale() -> f32 {
    128.0
}
fn default_dirt_depth() -> i32 {
    3
}
fn default_snow_line() -> i32 {
    44
}

impl Default for GenParams {
    fn default() -> Self {
        Self {
            octave_weights: default_octave_weights(),
            base_scale: default_base_scale(),
            dirt_depth: default_dirt_depth(),
            snow_line: default_snow_line(),
        }
    }
}

pub struct World {
    pub chunk_dim: usize,
    pub seed: i32,
    pub mode: WorldGenMode,
    params: GenParams,
    noise: FastNoiseLite,
}

impl World {
    pub fn new(chunk_dim: usize, seed: i32, mode: WorldGenMode, params: GenParams) -> Self {
        assert!(
            chunk_dim.is_power_of_two(),
            "chunk dimension must be a power of two, got {chunk_dim}"
        );
        let mut noise = FastNoiseLite::with_seed(seed);
        noise.set_noise_type(Some(NoiseType::Perlin));
        noise.set_frequency(Some(1.0));
        Self {
            chunk_dim,
            seed,
            mode,
            params,
            noise,
        }
    }

    /// Terrain surface height for a world-space column: the first y with air
    /// above it. Columns are solid for `0 <= y < height`.
    pub fn height_at(&self, wx: i32, wz: i32) -> i32 {
        match self.mode {
            WorldGenMode::Flat { thickness } => thickness,
            WorldGenMode::Normal => {
                let mut h = 0.0f32;
                let mut scale = self.params.base_scale;
                for w in self.params.octave_weights {
                    let n = self.noise.get_noise_2d(wx as f32 / scale, wz as f32 / scale);
                    h += w * (n + 1.0) * 0.5;
                    scale *= 0.5;
                }
                (self.chunk_dim as f32 * h) as i32
            }
        }
    }

    /// Label for a solid cell at world height `wy` in a column whose surface
    /// height is `height`: snow or grass on top, dirt beneath, stone below.
    pub fn layer_block(&self, wy: i32, height: i32) -> Block {
        match self.mode {
            WorldGenMode::Flat { .. } => Block::Stone,
            WorldGenMode::Normal => {
                let top = height - 1;
                if wy == top {
                    if height >= self.params.snow_line {
                        Block::Snow
                    } else {
                        Block::Grass
                    }
                } else if wy >= top - self.params.dirt_depth {
                    Block::Dirt
                } else {
                    Block::Stone
                }
            }
        }
    }
}
