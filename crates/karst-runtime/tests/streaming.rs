use karst_blocks::Block;
use karst_runtime::ChunkManager;
use karst_world::{ChunkCoord, GenParams, World, WorldGenMode};

const DIM: usize = 8;

fn flat_world(thickness: i32) -> World {
    World::new(
        DIM,
        901,
        WorldGenMode::Flat { thickness },
        GenParams::default(),
    )
}

fn drain_rebuilds(mgr: &mut ChunkManager) -> usize {
    mgr.process_rebuilds(usize::MAX)
}

#[test]
fn streaming_loads_the_radius_box() {
    let world = flat_world(DIM as i32);
    let mut mgr = ChunkManager::new(256, DIM);
    let stats = mgr.stream_around(&world, ChunkCoord::new(0, 0, 0), 2, 1);
    let expected = 5 * 5 * 3;
    assert_eq!(stats.loaded, expected);
    assert_eq!(stats.unloaded, 0);
    assert_eq!(stats.skipped, 0);
    assert_eq!(mgr.visible_count(), expected);
    // every load queued a rebuild
    assert!(mgr.has_pending_rebuilds());
    assert_eq!(drain_rebuilds(&mut mgr), expected);

    // ground-level chunks got stone meshes, sky chunks got none
    let ground = mgr.find_visible(ChunkCoord::new(0, 0, 0)).unwrap();
    assert!(mgr.chunk(ground).mesh(Block::Stone).is_some());
    let sky = mgr.find_visible(ChunkCoord::new(0, 1, 0)).unwrap();
    assert!(mgr.chunk(sky).meshes().next().is_none());
}

#[test]
fn moving_the_center_swaps_membership() {
    let world = flat_world(DIM as i32);
    let mut mgr = ChunkManager::new(256, DIM);
    mgr.stream_around(&world, ChunkCoord::new(0, 0, 0), 1, 0);
    drain_rebuilds(&mut mgr);
    let before = mgr.allocated_chunks();

    let stats = mgr.stream_around(&world, ChunkCoord::new(5, 0, 0), 1, 0);
    assert_eq!(stats.unloaded, 9);
    assert_eq!(stats.loaded, 9);
    assert_eq!(mgr.visible_count(), 9);
    // clean chunks went back to the pool rather than piling up
    assert_eq!(mgr.allocated_chunks(), before);
    assert_eq!(mgr.unloaded_count(), 0);
    assert!(mgr.find_visible(ChunkCoord::new(0, 0, 0)).is_none());
    assert!(mgr.find_visible(ChunkCoord::new(5, 0, 0)).is_some());
}

#[test]
fn edited_chunks_survive_streaming_out_and_back() {
    let world = flat_world(2);
    let mut mgr = ChunkManager::new(256, DIM);
    mgr.stream_around(&world, ChunkCoord::new(0, 0, 0), 1, 0);
    drain_rebuilds(&mut mgr);

    // carve one block out of the center chunk
    assert!(mgr.remove_block_at(3, 1, 3));
    drain_rebuilds(&mut mgr);
    let slot = mgr.find_visible(ChunkCoord::new(0, 0, 0)).unwrap();
    let expected_nblocks = mgr.chunk(slot).buf.nblocks;

    // stream far away: the edited chunk is retained, the rest are freed
    mgr.stream_around(&world, ChunkCoord::new(40, 0, 0), 1, 0);
    assert!(mgr.find_visible(ChunkCoord::new(0, 0, 0)).is_none());
    assert_eq!(mgr.unloaded_count(), 1);

    // come back: the retained chunk revives with its edit and a pending
    // rebuild (its meshes were torn down at unload)
    mgr.stream_around(&world, ChunkCoord::new(0, 0, 0), 1, 0);
    assert_eq!(mgr.unloaded_count(), 0);
    let slot = mgr.find_visible(ChunkCoord::new(0, 0, 0)).unwrap();
    assert_eq!(mgr.chunk(slot).buf.nblocks, expected_nblocks);
    assert!(!mgr.is_solid_at(3, 1, 3));
    assert!(mgr.has_pending_rebuilds());
    drain_rebuilds(&mut mgr);
    assert!(mgr.chunk(slot).mesh(Block::Stone).is_some());
}

#[test]
fn pool_exhaustion_defers_loads_until_capacity_returns() {
    let world = flat_world(2);
    let mut mgr = ChunkManager::new(4, DIM);
    let stats = mgr.stream_around(&world, ChunkCoord::new(0, 0, 0), 1, 0);
    assert_eq!(stats.loaded, 4);
    assert_eq!(stats.skipped, 5);
    assert_eq!(mgr.allocated_chunks(), 4);

    // nothing freed, so the retry still cannot finish the box
    let retry = mgr.stream_around(&world, ChunkCoord::new(0, 0, 0), 1, 0);
    assert_eq!(retry.loaded, 0);
    assert_eq!(retry.skipped, 5);

    // a smaller radius frees slots and the next pass uses them
    mgr.stream_around(&world, ChunkCoord::new(0, 0, 0), 0, 0);
    assert_eq!(mgr.visible_count(), 1);
    let after = mgr.stream_around(&world, ChunkCoord::new(0, 0, 0), 1, 0);
    assert_eq!(after.loaded, 3);
    assert_eq!(mgr.visible_count(), 4);
}

#[test]
fn place_and_remove_round_trip_through_rebuild() {
    let world = flat_world(2);
    let mut mgr = ChunkManager::new(64, DIM);
    mgr.stream_around(&world, ChunkCoord::new(0, 0, 0), 0, 0);
    drain_rebuilds(&mut mgr);

    let slot = mgr.find_visible(ChunkCoord::new(0, 0, 0)).unwrap();
    assert!(mgr.chunk(slot).mesh(Block::Snow).is_none());

    // placing snow on the slab creates a snow mesh on the next rebuild
    assert!(mgr.place_block_at(3, 2, 3, Block::Snow).unwrap());
    assert!(mgr.has_pending_rebuilds());
    drain_rebuilds(&mut mgr);
    let entry = mgr.chunk(slot);
    assert!(entry.mesh(Block::Snow).is_some());
    assert!(entry.buf.changed);

    // the cell is now occupied
    assert_eq!(mgr.place_block_at(3, 2, 3, Block::Grass), Ok(false));

    // removing it again releases the snow mesh on rebuild
    assert!(mgr.remove_block_at(3, 2, 3));
    drain_rebuilds(&mut mgr);
    assert!(mgr.chunk(slot).mesh(Block::Snow).is_none());
    assert!(mgr.chunk(slot).mesh(Block::Stone).is_some());
}

#[test]
fn placement_outside_resident_chunks_allocates_on_demand() {
    let world = flat_world(2);
    let mut mgr = ChunkManager::new(64, DIM);
    mgr.stream_around(&world, ChunkCoord::new(0, 0, 0), 0, 0);
    let before = mgr.visible_count();

    let wy = (DIM * 3) as i32; // well above the loaded chunk
    assert!(mgr.place_block_at(0, wy, 0, Block::Dirt).unwrap());
    assert_eq!(mgr.visible_count(), before + 1);
    let coord = ChunkCoord::new(0, 3, 0);
    let slot = mgr.find_visible(coord).unwrap();
    assert_eq!(mgr.chunk(slot).buf.nblocks, 1);
    assert!(mgr.chunk(slot).buf.changed);
}

#[test]
fn emptied_chunk_rebuild_tears_meshes_down() {
    let world = flat_world(1);
    let mut mgr = ChunkManager::new(64, DIM);
    mgr.stream_around(&world, ChunkCoord::new(0, 0, 0), 0, 0);
    drain_rebuilds(&mut mgr);
    let slot = mgr.find_visible(ChunkCoord::new(0, 0, 0)).unwrap();
    assert!(mgr.chunk(slot).mesh(Block::Stone).is_some());

    for z in 0..DIM as i32 {
        for x in 0..DIM as i32 {
            assert!(mgr.remove_block_at(x, 0, z));
        }
    }
    drain_rebuilds(&mut mgr);
    let entry = mgr.chunk(slot);
    assert!(entry.buf.is_empty());
    assert!(entry.meshes().next().is_none());
}

#[test]
#[should_panic(expected = "empty rebuild stack")]
fn popping_an_empty_rebuild_stack_is_a_bug() {
    let mut mgr = ChunkManager::new(4, DIM);
    let _ = mgr.pop_chunk_for_rebuild();
}
