//! CPU greedy mesher: cuboid range extraction and per-type geometry.
#![forbid(unsafe_code)]

pub mod mesh_build;
pub mod range;

pub use mesh_build::{Face, MeshBuild};
pub use range::{Range3d, extract_ranges, sort_ranges_by_type};

use std::collections::HashMap;

use karst_blocks::Block;
use karst_chunk::ChunkBuf;
use karst_geom::{Aabb, Vec3};
use karst_world::ChunkCoord;

/// Meshing output for one chunk: one triangle-soup mesh per block type that
/// produced at least one range this build, in chunk-local coordinates, plus
/// the chunk's world-space bounding box.
pub struct ChunkMeshCPU {
    pub coord: ChunkCoord,
    pub bbox: Aabb,
    pub parts: HashMap<Block, MeshBuild>,
}

/// Mesh a chunk: extract greedy ranges, sort them by type, and expand each
/// maximal same-type run into one mesh. Types with no ranges are simply
/// absent from `parts`; the caller tears down whatever it held for them.
pub fn build_chunk_greedy_cpu(buf: &ChunkBuf) -> ChunkMeshCPU {
    let mut ranges = extract_ranges(&buf.blocks, buf.dim, buf.nblocks);
    sort_ranges_by_type(&mut ranges);

    let mut parts: HashMap<Block, MeshBuild> = HashMap::new();
    let mut start = 0;
    while start < ranges.len() {
        let block = ranges[start].block;
        let mut end = start;
        while end < ranges.len() && ranges[end].block == block {
            end += 1;
        }
        let mb = parts.entry(block).or_default();
        mb.reserve_ranges(end - start);
        for r in &ranges[start..end] {
            mb.add_box(
                Vec3::new(r.start_x as f32, r.start_y as f32, r.start_z as f32),
                Vec3::new(
                    (r.end_x + 1) as f32,
                    (r.end_y + 1) as f32,
                    (r.end_z + 1) as f32,
                ),
            );
        }
        start = end;
    }

    log::trace!(
        target: "mesh",
        "chunk ({},{},{}): {} ranges over {} cells into {} meshes",
        buf.coord.cx,
        buf.coord.cy,
        buf.coord.cz,
        ranges.len(),
        buf.nblocks,
        parts.len()
    );

    let (bx, by, bz) = buf.base();
    let min = Vec3::new(bx as f32, by as f32, bz as f32);
    let d = buf.dim as f32;
    ChunkMeshCPU {
        coord: buf.coord,
        bbox: Aabb::new(min, min + Vec3::new(d, d, d)),
        parts,
    }
}
