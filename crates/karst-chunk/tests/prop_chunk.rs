use karst_blocks::Block;
use karst_chunk::{ChunkBuf, PoolExhausted, SlotPool};
use proptest::prelude::*;

fn dim() -> impl Strategy<Value = usize> {
    // powers of two keep the streaming math honest
    prop_oneof![Just(1usize), Just(2), Just(4), Just(8)]
}

fn block() -> impl Strategy<Value = Block> {
    (0u8..=4).prop_map(|c| Block::from_code(c).unwrap())
}

proptest! {
    // idx maps each (x,y,z) within bounds to a unique in-range index
    #[test]
    fn idx_is_unique_and_in_range(d in dim()) {
        let buf = ChunkBuf::new(d);
        let expect = d * d * d;
        let mut seen = vec![false; expect];
        for y in 0..d { for z in 0..d { for x in 0..d {
            let i = buf.idx(x, y, z);
            prop_assert!(i < expect);
            prop_assert!(!seen[i]);
            seen[i] = true;
        }}}
        prop_assert!(seen.into_iter().all(|b| b));
    }

    // nblocks always equals the number of non-air cells, whatever the edit
    // sequence was
    #[test]
    fn nblocks_matches_grid_after_edits(d in dim(), edits in prop::collection::vec((0usize..8, 0usize..8, 0usize..8, block()), 0..64)) {
        let mut buf = ChunkBuf::new(d);
        for (x, y, z, b) in edits {
            buf.set_local(x % d, y % d, z % d, b);
        }
        let actual = buf.blocks.iter().filter(|b| b.is_solid()).count();
        prop_assert_eq!(buf.nblocks as usize, actual);
    }

    // allocated + available == capacity after any interleaving that respects
    // capacity; exhaustion leaves the pool usable
    #[test]
    fn pool_conserves_slots(cap in 1usize..16, ops in prop::collection::vec(any::<bool>(), 0..64)) {
        let mut pool = SlotPool::new(cap, || 0u8);
        let mut live = Vec::new();
        for alloc in ops {
            if alloc {
                match pool.allocate() {
                    Ok(id) => live.push(id),
                    Err(PoolExhausted) => prop_assert_eq!(pool.available(), 0),
                }
            } else if let Some(id) = live.pop() {
                pool.release(id);
            }
            prop_assert_eq!(pool.allocated() + pool.available(), cap);
            prop_assert_eq!(pool.allocated(), live.len());
        }
    }
}
