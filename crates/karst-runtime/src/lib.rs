//! Chunk residency, rebuild scheduling, and streaming (single-threaded,
//! frame-driven).
#![forbid(unsafe_code)]

use hashbrown::HashSet;

use karst_blocks::{Block, types::SOLID_BLOCK_COUNT};
use karst_chunk::{ChunkBuf, PoolExhausted, SlotId, SlotPool, generate_into};
use karst_mesh_cpu::{MeshBuild, build_chunk_greedy_cpu};
use karst_world::{ChunkCoord, World};

/// A resident chunk: its block grid plus one mesh per block type it
/// currently holds. A `None` mesh slot is the torn-down state; rebuild
/// fills slots for types with ranges and clears the rest.
pub struct ChunkEntry {
    pub buf: ChunkBuf,
    /// Render eligibility, written by frustum culling outside the core.
    pub render: bool,
    meshes: [Option<MeshBuild>; SOLID_BLOCK_COUNT],
}

impl ChunkEntry {
    fn empty(dim: usize) -> Self {
        Self {
            buf: ChunkBuf::new(dim),
            render: false,
            meshes: std::array::from_fn(|_| None),
        }
    }

    /// Release every per-type mesh. This is the only teardown path; nothing
    /// else drops a mesh slot.
    pub fn clear_meshes(&mut self) {
        for m in &mut self.meshes {
            *m = None;
        }
    }

    #[inline]
    pub fn mesh(&self, block: Block) -> Option<&MeshBuild> {
        self.meshes[block.code() as usize].as_ref()
    }

    /// Per-type meshes present after the last rebuild, for upload/draw.
    pub fn meshes(&self) -> impl Iterator<Item = (Block, &MeshBuild)> {
        Block::SOLID
            .into_iter()
            .filter_map(|b| self.mesh(b).map(|m| (b, m)))
    }
}

/// Per-frame streaming outcome.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StreamStats {
    pub loaded: usize,
    pub unloaded: usize,
    /// Loads refused because the pool was exhausted; streaming retries
    /// these coordinates next frame.
    pub skipped: usize,
}

/// Owns chunk membership: which chunks are visible, which edited chunks are
/// retained while out of range, and which chunks await remeshing. Slot
/// lifetime belongs to the pool; a slot referenced here is always live.
pub struct ChunkManager {
    dim: usize,
    pool: SlotPool<ChunkEntry>,
    visible: Vec<SlotId>,
    unloaded: Vec<SlotId>,
    rebuild_stack: Vec<SlotId>,
}

impl ChunkManager {
    pub fn new(capacity: usize, dim: usize) -> Self {
        Self {
            dim,
            pool: SlotPool::new(capacity, || ChunkEntry::empty(dim)),
            visible: Vec::new(),
            unloaded: Vec::new(),
            rebuild_stack: Vec::new(),
        }
    }

    #[inline]
    pub fn chunk_dim(&self) -> usize {
        self.dim
    }

    #[inline]
    pub fn chunk(&self, slot: SlotId) -> &ChunkEntry {
        self.pool.get(slot)
    }

    #[inline]
    pub fn chunk_mut(&mut self, slot: SlotId) -> &mut ChunkEntry {
        self.pool.get_mut(slot)
    }

    pub fn visible_count(&self) -> usize {
        self.visible.len()
    }

    pub fn unloaded_count(&self) -> usize {
        self.unloaded.len()
    }

    pub fn allocated_chunks(&self) -> usize {
        self.pool.allocated()
    }

    pub fn pool_capacity(&self) -> usize {
        self.pool.capacity()
    }

    pub fn visible_chunks(&self) -> impl Iterator<Item = &ChunkEntry> {
        self.visible.iter().map(|&s| self.pool.get(s))
    }

    pub fn find_visible(&self, coord: ChunkCoord) -> Option<SlotId> {
        self.visible
            .iter()
            .copied()
            .find(|&s| self.pool.get(s).buf.coord == coord)
    }

    /// Claim a pool slot for a fresh all-air chunk at `coord` and make it
    /// visible. Fails when the pool is exhausted; the caller skips the load
    /// and retries on a later frame.
    pub fn add_chunk(&mut self, coord: ChunkCoord) -> Result<SlotId, PoolExhausted> {
        let slot = self.pool.allocate()?;
        let entry = self.pool.get_mut(slot);
        entry.buf.reset(coord);
        entry.render = true;
        entry.clear_meshes();
        self.visible.push(slot);
        Ok(slot)
    }

    /// Bring the chunk at `coord` into the visible set: revive it from the
    /// unloaded-retained set when its edits are still held, otherwise
    /// generate it fresh. Either way the chunk ends up scheduled for
    /// rebuild (a revived chunk lost its meshes at unload).
    pub fn load_chunk(&mut self, world: &World, coord: ChunkCoord) -> Result<SlotId, PoolExhausted> {
        if let Some(i) = self
            .unloaded
            .iter()
            .rposition(|&s| self.pool.get(s).buf.coord == coord)
        {
            let slot = self.unloaded.remove(i);
            self.pool.get_mut(slot).render = true;
            self.visible.push(slot);
            self.push_chunk_for_rebuild(slot);
            log::debug!(target: "stream", "revived chunk ({}, {}, {}) with retained edits", coord.cx, coord.cy, coord.cz);
            return Ok(slot);
        }
        let slot = self.add_chunk(coord)?;
        generate_into(world, &mut self.pool.get_mut(slot).buf, coord);
        self.push_chunk_for_rebuild(slot);
        Ok(slot)
    }

    /// Remove the chunk at `visible[index]`. Meshes are torn down either
    /// way; the slot goes back to the pool unless the chunk carries edits,
    /// in which case it moves to the unloaded-retained set.
    pub fn unload_chunk(&mut self, index: usize) {
        let slot = self.visible.remove(index);
        let entry = self.pool.get_mut(slot);
        entry.clear_meshes();
        entry.render = false;
        let coord = entry.buf.coord;
        if entry.buf.changed {
            self.unloaded.push(slot);
            log::debug!(target: "stream", "retained edited chunk ({}, {}, {})", coord.cx, coord.cy, coord.cz);
        } else {
            self.pool.release(slot);
            log::debug!(target: "stream", "freed chunk ({}, {}, {})", coord.cx, coord.cy, coord.cz);
        }
    }

    pub fn push_chunk_for_rebuild(&mut self, slot: SlotId) {
        self.rebuild_stack.push(slot);
    }

    #[inline]
    pub fn has_pending_rebuilds(&self) -> bool {
        !self.rebuild_stack.is_empty()
    }

    /// Pop the most recently pushed dirty chunk (LIFO, so the chunk the
    /// player just touched remeshes first). Callers must check
    /// [`has_pending_rebuilds`](Self::has_pending_rebuilds) first.
    pub fn pop_chunk_for_rebuild(&mut self) -> SlotId {
        self.rebuild_stack
            .pop()
            .expect("pop_chunk_for_rebuild on an empty rebuild stack")
    }

    /// Regenerate a chunk's per-type meshes from its block grid. Types that
    /// produced no ranges this time have their meshes dropped; an empty
    /// chunk drops everything.
    pub fn rebuild_chunk(&mut self, slot: SlotId) {
        let entry = self.pool.get_mut(slot);
        if entry.buf.is_empty() {
            entry.clear_meshes();
            return;
        }
        let mut cpu = build_chunk_greedy_cpu(&entry.buf);
        for block in Block::SOLID {
            entry.meshes[block.code() as usize] = cpu.parts.remove(&block);
        }
    }

    /// Drain up to `max` pending rebuilds. Returns how many ran.
    pub fn process_rebuilds(&mut self, max: usize) -> usize {
        let mut done = 0;
        while done < max && self.has_pending_rebuilds() {
            let slot = self.pop_chunk_for_rebuild();
            self.rebuild_chunk(slot);
            done += 1;
        }
        done
    }

    /// One streaming pass for a camera sitting in chunk `center`: drop
    /// visible chunks outside the radius box (reverse index order, so the
    /// in-place removals stay sound), then load every in-range coordinate
    /// that is not yet resident. Pool exhaustion skips the remaining loads;
    /// the same coordinates are in range again next frame.
    pub fn stream_around(
        &mut self,
        world: &World,
        center: ChunkCoord,
        radius_xz: i32,
        radius_y: i32,
    ) -> StreamStats {
        let in_range = |c: ChunkCoord| {
            (c.cx - center.cx).abs() <= radius_xz
                && (c.cz - center.cz).abs() <= radius_xz
                && (c.cy - center.cy).abs() <= radius_y
        };

        let mut stats = StreamStats::default();

        for i in (0..self.visible.len()).rev() {
            let coord = self.pool.get(self.visible[i]).buf.coord;
            if !in_range(coord) {
                self.unload_chunk(i);
                stats.unloaded += 1;
            }
        }

        let resident: HashSet<ChunkCoord> = self
            .visible
            .iter()
            .map(|&s| self.pool.get(s).buf.coord)
            .collect();

        for dy in -radius_y..=radius_y {
            for dz in -radius_xz..=radius_xz {
                for dx in -radius_xz..=radius_xz {
                    let coord = center.offset(dx, dy, dz);
                    if resident.contains(&coord) {
                        continue;
                    }
                    match self.load_chunk(world, coord) {
                        Ok(_) => stats.loaded += 1,
                        Err(PoolExhausted) => stats.skipped += 1,
                    }
                }
            }
        }

        if stats.skipped > 0 {
            log::warn!(
                target: "stream",
                "chunk pool exhausted: {} loads deferred to a later frame",
                stats.skipped
            );
        }
        stats
    }

    // --- block edit API ---

    /// Solidity sampler over resident chunks, for raycast targeting.
    pub fn is_solid_at(&self, wx: i32, wy: i32, wz: i32) -> bool {
        let coord = ChunkCoord::of_world(wx, wy, wz, self.dim);
        self.find_visible(coord)
            .and_then(|s| self.pool.get(s).buf.get_world(wx, wy, wz))
            .is_some_and(|b| b.is_solid())
    }

    /// Clear the cell at a world position. Marks the chunk changed and
    /// schedules a rebuild. Returns false when there was nothing to remove.
    pub fn remove_block_at(&mut self, wx: i32, wy: i32, wz: i32) -> bool {
        let coord = ChunkCoord::of_world(wx, wy, wz, self.dim);
        let Some(slot) = self.find_visible(coord) else {
            return false;
        };
        let (lx, ly, lz) = self.local_of(wx, wy, wz);
        let entry = self.pool.get_mut(slot);
        if entry.buf.get_local(lx, ly, lz).is_air() {
            return false;
        }
        entry.buf.set_local(lx, ly, lz, Block::Air);
        self.push_chunk_for_rebuild(slot);
        log::info!(target: "edit", "removed block at ({wx}, {wy}, {wz})");
        true
    }

    /// Place `block` into an air cell at a world position, allocating the
    /// target chunk on demand when the position falls outside every
    /// resident chunk. Marks the chunk changed and schedules a rebuild.
    /// Returns `Ok(false)` when the cell was already occupied.
    pub fn place_block_at(
        &mut self,
        wx: i32,
        wy: i32,
        wz: i32,
        block: Block,
    ) -> Result<bool, PoolExhausted> {
        if block.is_air() {
            return Ok(false);
        }
        let coord = ChunkCoord::of_world(wx, wy, wz, self.dim);
        let slot = match self.find_visible(coord) {
            Some(s) => s,
            None => self.add_chunk(coord)?,
        };
        let (lx, ly, lz) = self.local_of(wx, wy, wz);
        let entry = self.pool.get_mut(slot);
        if !entry.buf.get_local(lx, ly, lz).is_air() {
            return Ok(false);
        }
        entry.buf.set_local(lx, ly, lz, block);
        self.push_chunk_for_rebuild(slot);
        log::info!(target: "edit", "placed {} at ({wx}, {wy}, {wz})", block.name());
        Ok(true)
    }

    #[inline]
    fn local_of(&self, wx: i32, wy: i32, wz: i32) -> (usize, usize, usize) {
        let d = self.dim as i32;
        (
            wx.rem_euclid(d) as usize,
            wy.rem_euclid(d) as usize,
            wz.rem_euclid(d) as usize,
        )
    }
}
