//! Collision-checked id allocation.
//!
//! # Invariants
//! - An allocated id never collides with an id reported in use, nor with an
//!   id already present in the collection the allocator was seeded from.
//! - Ids increase while the range above the highest seen id lasts. Once it
//!   is exhausted (an `i64::MAX` id was seen), allocation falls back to the
//!   lowest free id.
//! - `allocate` always terminates.

/// Id generator for one record collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdAllocator {
    /// `None` once no id above the highest seen one is left.
    next: Option<i64>,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self { next: Some(1) }
    }
}

impl IdAllocator {
    /// Starts above the highest existing id (and never below 1).
    pub fn after<I>(existing: I) -> Self
    where
        I: IntoIterator<Item = i64>,
    {
        let mut allocator = Self::default();
        for id in existing {
            allocator.observe(id);
        }
        allocator
    }

    /// Records an externally assigned id so it is never handed out.
    pub fn observe(&mut self, id: i64) {
        if let Some(next) = self.next {
            if id >= next {
                self.next = id.checked_add(1);
            }
        }
    }

    /// Returns an id for which `in_use` is false.
    pub fn allocate(&mut self, in_use: impl Fn(i64) -> bool) -> i64 {
        if let Some(start) = self.next {
            let mut candidate = start;
            loop {
                if !in_use(candidate) {
                    self.next = candidate.checked_add(1);
                    return candidate;
                }
                match candidate.checked_add(1) {
                    Some(following) => candidate = following,
                    None => break,
                }
            }
            self.next = None;
        }
        lowest_free(in_use)
    }
}

// A collection holds far fewer than 2^64 ids, so a free one exists.
fn lowest_free(in_use: impl Fn(i64) -> bool) -> i64 {
    let mut candidate = i64::MIN;
    while in_use(candidate) {
        candidate = candidate.wrapping_add(1);
    }
    candidate
}
