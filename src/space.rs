//! Two equally-sized semi-spaces (component A, spec §4.A).
//!
//! Mirrors the teacher's `BumpPointerSpace::create`/`contains` shape and
//! `gc.c`'s `first_buffer`/`second_buffer`/`belongs_to`.

use crate::mmap::Mmap;

pub struct Space {
    map: Mmap,
}

impl Space {
    pub fn new(size: usize) -> Self {
        Self {
            map: Mmap::new(size),
        }
    }

    #[inline(always)]
    pub fn bottom(&self) -> *mut u8 {
        self.map.start()
    }

    #[inline(always)]
    pub fn end(&self) -> *mut u8 {
        self.map.end()
    }

    #[inline(always)]
    pub fn size(&self) -> usize {
        self.map.size()
    }

    /// Byte-distance membership test, per spec §3 "Semi-spaces".
    #[inline(always)]
    pub fn contains(&self, addr: *const u8) -> bool {
        let a = addr as usize;
        let base = self.bottom() as usize;
        a.wrapping_sub(base) < self.size()
    }
}

/// Owns both semi-spaces and tracks which one is currently `to`.
pub struct Spaces {
    pub to: Space,
    pub from: Space,
}

impl Spaces {
    pub fn new(size: usize) -> Self {
        Self {
            to: Space::new(size),
            from: Space::new(size),
        }
    }

    /// Swaps the `to`/`from` role assignment (spec §4.D `flip`).
    #[inline(always)]
    pub fn swap(&mut self) {
        std::mem::swap(&mut self.to, &mut self.from);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_respects_byte_range() {
        let space = Space::new(4096);
        assert!(space.contains(space.bottom()));
        assert!(!space.contains(space.end()));
        let outside = (space.bottom() as usize + 1_000_000) as *const u8;
        assert!(!space.contains(outside));
    }
}
