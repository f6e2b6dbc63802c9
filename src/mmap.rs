//! OS-backed memory for a semi-space buffer.
//!
//! Each semi-space is one anonymous mapping, sized once at [`Heap`](crate::heap::Heap)
//! construction and never grown (spec §1 non-goal: no dynamic heap growth).

use memmap2::MmapMut;

pub struct Mmap {
    map: MmapMut,
}

impl Mmap {
    pub fn new(size: usize) -> Self {
        let map = MmapMut::map_anon(size).expect("failed to map semi-space memory");
        Self { map }
    }

    #[inline(always)]
    pub fn start(&self) -> *mut u8 {
        self.map.as_ptr() as *mut u8
    }

    #[inline(always)]
    pub fn end(&self) -> *mut u8 {
        unsafe { self.start().add(self.map.len()) }
    }

    #[inline(always)]
    pub fn size(&self) -> usize {
        self.map.len()
    }
}
