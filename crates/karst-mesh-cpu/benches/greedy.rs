use criterion::{Criterion, black_box, criterion_group, criterion_main};

use karst_blocks::Block;
use karst_chunk::generate_chunk_buffer;
use karst_mesh_cpu::{build_chunk_greedy_cpu, extract_ranges};
use karst_world::{ChunkCoord, GenParams, World, WorldGenMode};

fn bench_extract_terrain(c: &mut Criterion) {
    let mut group = c.benchmark_group("extract_ranges");
    let world = World::new(16, 0xC0FFEE_i32, WorldGenMode::Normal, GenParams::default());
    let buf = generate_chunk_buffer(&world, ChunkCoord::new(0, 1, 0));
    group.bench_function("terrain_16", |b| {
        b.iter(|| black_box(extract_ranges(&buf.blocks, buf.dim, buf.nblocks)))
    });

    // worst case for the greedy scan: no two adjacent cells share a type
    let dim = 16usize;
    let mut blocks = vec![Block::Air; dim * dim * dim];
    let mut n = 0u32;
    for y in 0..dim {
        for z in 0..dim {
            for x in 0..dim {
                if (x + y + z) % 2 == 0 {
                    blocks[(y * dim + z) * dim + x] = Block::Stone;
                    n += 1;
                }
            }
        }
    }
    group.bench_function("checkerboard_16", |b| {
        b.iter(|| black_box(extract_ranges(&blocks, dim, n)))
    });
    group.finish();
}

fn bench_build_chunk(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_chunk_greedy");
    let world = World::new(16, 1337, WorldGenMode::Normal, GenParams::default());
    let buf = generate_chunk_buffer(&world, ChunkCoord::new(0, 0, 0));
    group.bench_function("terrain_16", |b| {
        b.iter(|| black_box(build_chunk_greedy_cpu(&buf)))
    });
    group.finish();
}

criterion_group!(benches, bench_extract_terrain, bench_build_chunk);
criterion_main!(benches);
