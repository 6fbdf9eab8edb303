//! Identifiers and simple allocators for core entities.

use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct ActorId(pub u32);

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct InstId(pub u32);

/// Monotonic allocator for ActorId and InstId.
#[derive(Default, Debug)]
pub struct IdAllocator {
    next_actor: u32,
    next_inst: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn alloc_actor(&mut self) -> ActorId {
        let id = ActorId(self.next_actor);
        self.next_actor = self.next_actor.wrapping_add(1);
        id
    }

    #[inline]
    pub fn alloc_inst(&mut self) -> InstId {
        let id = InstId(self.next_inst);
        self.next_inst = self.next_inst.wrapping_add(1);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_monotonic() {
        let mut alloc = IdAllocator::new();
        assert_eq!(alloc.alloc_actor(), ActorId(0));
        assert_eq!(alloc.alloc_actor(), ActorId(1));
        assert_eq!(alloc.alloc_inst(), InstId(0));
        assert_eq!(alloc.alloc_inst(), InstId(1));
    }
}
