//! Chunk block storage and the fixed-capacity chunk pool.
#![forbid(unsafe_code)]

pub mod pool;

pub use pool::{PoolExhausted, SlotId, SlotPool};

use karst_blocks::Block;
use karst_world::{ChunkCoord, World};

/// Dense cube of block labels, `dim` cells on a side, row-major with index
/// `y*dim*dim + z*dim + x`. `nblocks` tracks the live non-air count
/// incrementally; the extractor consumes it as its cell budget.
#[derive(Clone, Debug)]
pub struct ChunkBuf {
    pub coord: ChunkCoord,
    pub dim: usize,
    pub blocks: Vec<Block>,
    pub nblocks: u32,
    /// Set by any edit; an unloaded chunk with this flag is retained in
    /// memory instead of being returned to the pool.
    pub changed: bool,
}

impl ChunkBuf {
    pub fn new(dim: usize) -> Self {
        Self {
            coord: ChunkCoord::default(),
            dim,
            blocks: vec![Block::Air; dim * dim * dim],
            nblocks: 0,
            changed: false,
        }
    }

    /// Re-initialize this buffer for a fresh chunk at `coord`: all air, no
    /// edits. Keeps the backing allocation.
    pub fn reset(&mut self, coord: ChunkCoord) {
        self.coord = coord;
        self.blocks.fill(Block::Air);
        self.nblocks = 0;
        self.changed = false;
    }

    #[inline]
    pub fn idx(&self, x: usize, y: usize, z: usize) -> usize {
        (y * self.dim + z) * self.dim + x
    }

    #[inline]
    pub fn get_local(&self, x: usize, y: usize, z: usize) -> Block {
        self.blocks[self.idx(x, y, z)]
    }

    /// Write one cell, keeping `nblocks` consistent and marking the chunk
    /// changed. Returns the previous label.
    pub fn set_local(&mut self, x: usize, y: usize, z: usize, b: Block) -> Block {
        let i = self.idx(x, y, z);
        let prev = self.blocks[i];
        if prev == b {
            return prev;
        }
        if prev.is_air() {
            self.nblocks += 1;
        } else if b.is_air() {
            self.nblocks -= 1;
        }
        self.blocks[i] = b;
        self.changed = true;
        prev
    }

    /// World-space offset of this chunk's origin cell.
    #[inline]
    pub fn base(&self) -> (i32, i32, i32) {
        let d = self.dim as i32;
        (self.coord.cx * d, self.coord.cy * d, self.coord.cz * d)
    }

    #[inline]
    pub fn contains_world(&self, wx: i32, wy: i32, wz: i32) -> bool {
        let (bx, by, bz) = self.base();
        let d = self.dim as i32;
        wx >= bx && wx < bx + d && wy >= by && wy < by + d && wz >= bz && wz < bz + d
    }

    #[inline]
    pub fn get_world(&self, wx: i32, wy: i32, wz: i32) -> Option<Block> {
        if !self.contains_world(wx, wy, wz) {
            return None;
        }
        let (bx, by, bz) = self.base();
        Some(self.get_local(
            (wx - bx) as usize,
            (wy - by) as usize,
            (wz - bz) as usize,
        ))
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nblocks == 0
    }
}

/// Fill `buf` with terrain for the chunk at `coord`. Columns are solid up to
/// the generator's surface height, layered by depth.
pub fn generate_into(world: &World, buf: &mut ChunkBuf, coord: ChunkCoord) {
    buf.reset(coord);
    let dim = buf.dim;
    let (bx, by, bz) = buf.base();
    for z in 0..dim {
        for x in 0..dim {
            let h = world.height_at(bx + x as i32, bz + z as i32);
            let top = (h - by).clamp(0, dim as i32) as usize;
            for y in 0..top {
                let i = buf.idx(x, y, z);
                buf.blocks[i] = world.layer_block(by + y as i32, h);
                buf.nblocks += 1;
            }
        }
    }
    buf.changed = false;
}

pub fn generate_chunk_buffer(world: &World, coord: ChunkCoord) -> ChunkBuf {
    let mut buf = ChunkBuf::new(world.chunk_dim);
    generate_into(world, &mut buf, coord);
    buf
}

#[cfg(test)]
mod tests {
    use super::*;
    use karst_world::{GenParams, WorldGenMode};

    #[test]
    fn set_local_tracks_nblocks_and_changed() {
        let mut buf = ChunkBuf::new(4);
        assert_eq!(buf.set_local(1, 2, 3, Block::Stone), Block::Air);
        assert_eq!(buf.nblocks, 1);
        assert!(buf.changed);
        // overwriting with another solid type keeps the count
        assert_eq!(buf.set_local(1, 2, 3, Block::Dirt), Block::Stone);
        assert_eq!(buf.nblocks, 1);
        assert_eq!(buf.set_local(1, 2, 3, Block::Air), Block::Dirt);
        assert_eq!(buf.nblocks, 0);
    }

    #[test]
    fn generation_fills_flat_slab() {
        let world = World::new(8, 3, WorldGenMode::Flat { thickness: 2 }, GenParams::default());
        let buf = generate_chunk_buffer(&world, ChunkCoord::new(1, 0, -2));
        assert_eq!(buf.nblocks, 8 * 8 * 2);
        assert!(!buf.changed);
        assert_eq!(buf.get_local(0, 0, 0), Block::Stone);
        assert_eq!(buf.get_local(0, 2, 0), Block::Air);
        // a chunk a level up is all air
        let above = generate_chunk_buffer(&world, ChunkCoord::new(1, 1, -2));
        assert!(above.is_empty());
    }

    #[test]
    fn world_coords_map_back_to_local_cells() {
        let world = World::new(8, 3, WorldGenMode::Flat { thickness: 8 }, GenParams::default());
        let buf = generate_chunk_buffer(&world, ChunkCoord::new(-1, 0, 0));
        assert_eq!(buf.base(), (-8, 0, 0));
        assert_eq!(buf.get_world(-8, 0, 0), Some(Block::Stone));
        assert_eq!(buf.get_world(-9, 0, 0), None);
        assert_eq!(buf.get_world(-1, 7, 7), Some(buf.get_local(7, 7, 7)));
        assert_eq!(buf.get_world(0, 0, 0), None);
    }
}
