use std::error::Error;
use std::fmt;

/// Handle to one slot in a [`SlotPool`]. Valid until released.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SlotId(u32);

impl SlotId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// The pool has no free slot (or no contiguous run of the requested length).
/// Recoverable: capacity frees up as chunks stream out, so callers skip the
/// request and retry on a later frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PoolExhausted;

impl fmt::Display for PoolExhausted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "chunk pool exhausted")
    }
}

impl Error for PoolExhausted {}

#[derive(Clone, Copy, Debug)]
enum SlotState {
    Live,
    Free { next: Option<u32> },
}

/// Fixed-capacity slab of pre-built `T` values with an index-linked free
/// list. Single allocate/release are O(1); `allocate_run` walks the free
/// list looking for physically adjacent slots.
///
/// Invariant: `allocated() + available() == capacity()` after every
/// operation, and a slot is never live and on the free list at once.
pub struct SlotPool<T> {
    slots: Vec<T>,
    state: Vec<SlotState>,
    free_head: Option<u32>,
    free_len: usize,
}

impl<T> SlotPool<T> {
    /// Build a pool of `capacity` slots, each initialized by `init`. The
    /// free list is threaded in ascending slot order so freshly built pools
    /// can satisfy contiguous runs.
    pub fn new(capacity: usize, mut init: impl FnMut() -> T) -> Self {
        assert!(capacity > 0 && capacity <= u32::MAX as usize);
        let slots = (0..capacity).map(|_| init()).collect();
        let state = (0..capacity)
            .map(|i| SlotState::Free {
                next: if i + 1 < capacity {
                    Some((i + 1) as u32)
                } else {
                    None
                },
            })
            .collect();
        Self {
            slots,
            state,
            free_head: Some(0),
            free_len: capacity,
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn available(&self) -> usize {
        self.free_len
    }

    #[inline]
    pub fn allocated(&self) -> usize {
        self.capacity() - self.free_len
    }

    pub fn allocate(&mut self) -> Result<SlotId, PoolExhausted> {
        let head = self.free_head.ok_or(PoolExhausted)?;
        self.free_head = match self.state[head as usize] {
            SlotState::Free { next } => next,
            SlotState::Live => unreachable!("live slot on free list"),
        };
        self.state[head as usize] = SlotState::Live;
        self.free_len -= 1;
        Ok(SlotId(head))
    }

    /// Claim `n` physically adjacent free slots, returning the first.
    /// Adjacency means consecutive indices in the backing array; free slots
    /// that are neighbors on the list but not in the array do not merge.
    pub fn allocate_run(&mut self, n: usize) -> Result<SlotId, PoolExhausted> {
        assert!(n > 0);
        // `prev` is the slot whose link gets rewritten when the run is
        // claimed; None means the run starts at the list head.
        let mut prev: Option<u32> = None;
        let mut start = self.free_head;
        let mut end = self.free_head;
        let mut found = usize::from(start.is_some());

        while found < n {
            let e = match end {
                Some(e) => e,
                None => return Err(PoolExhausted),
            };
            let next = match self.state[e as usize] {
                SlotState::Free { next } => next,
                SlotState::Live => unreachable!("live slot on free list"),
            };
            match next {
                Some(nx) if nx == e + 1 => {
                    found += 1;
                    end = Some(nx);
                }
                _ => {
                    prev = Some(e);
                    start = next;
                    end = next;
                    found = usize::from(next.is_some());
                }
            }
        }

        let s = start.ok_or(PoolExhausted)?;
        let e = end.ok_or(PoolExhausted)?;
        let after = match self.state[e as usize] {
            SlotState::Free { next } => next,
            SlotState::Live => unreachable!("live slot on free list"),
        };
        match prev {
            None => self.free_head = after,
            Some(p) => self.state[p as usize] = SlotState::Free { next: after },
        }
        for i in s..=e {
            self.state[i as usize] = SlotState::Live;
        }
        self.free_len -= n;
        Ok(SlotId(s))
    }

    pub fn release(&mut self, id: SlotId) {
        assert!(
            matches!(self.state[id.index()], SlotState::Live),
            "double free of pool slot {}",
            id.index()
        );
        self.state[id.index()] = SlotState::Free {
            next: self.free_head,
        };
        self.free_head = Some(id.0);
        self.free_len += 1;
    }

    /// Release a run claimed with [`allocate_run`]. Slots go back in reverse
    /// order so the rebuilt list keeps them adjacent for the next run.
    pub fn release_run(&mut self, id: SlotId, n: usize) {
        for i in (0..n).rev() {
            self.release(SlotId(id.0 + i as u32));
        }
    }

    #[inline]
    pub fn get(&self, id: SlotId) -> &T {
        debug_assert!(matches!(self.state[id.index()], SlotState::Live));
        &self.slots[id.index()]
    }

    #[inline]
    pub fn get_mut(&mut self, id: SlotId) -> &mut T {
        debug_assert!(matches!(self.state[id.index()], SlotState::Live));
        &mut self.slots[id.index()]
    }
}
