//! Read/write barriers (component F, spec §4.F).
//!
//! Mirrors `gc.c`'s `gc_read_barrier`/`gc_write_barrier` exactly: the read
//! barrier is the only place a from-space pointer can still reach the
//! mutator, so it forwards on demand; the write barrier is accounting
//! only (see module docs on why that's sound for this design).

use crate::header::{read_field, write_field};
use crate::heap::Heap;

impl Heap {
    /// Ensures `obj.field[index]` points into to-space (or a singleton)
    /// before the mutator reads it, by forwarding it now if needed (spec
    /// §4.F, §6).
    pub fn read_barrier(&mut self, obj: *mut u8, field_index: usize) {
        let field = unsafe { read_field(obj, field_index) } as *mut u8;
        if self.spaces.from.contains(field) {
            let forwarded = self.forward(field);
            unsafe { write_field(obj, field_index, forwarded as usize) };
        }
        self.stats.record_read();
    }

    /// Accounting only: the mutator can never construct a from-space
    /// pointer from scratch once the read barrier is in place, and every
    /// root is re-forwarded at `flip`, so no write can introduce a stale
    /// cross-space reference for this single-mutator design (spec §4.F,
    /// §9). Kept as the extension point a future generational variant
    /// would need for a remembered set.
    pub fn write_barrier(&mut self, _obj: *mut u8, _field_index: usize, _value: *mut u8) {
        self.stats.record_write();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::{field_ptr, write_field};
    use crate::heap::HeapConfig;
    use crate::runtime::{singletons, ObjectHeader, Tag};

    fn small_heap() -> Heap {
        Heap::new(HeapConfig {
            space_size: 8192,
            max_roots: 16,
            trace: false,
        })
    }

    #[test]
    fn read_barrier_forwards_a_stale_from_space_field() {
        let mut heap = small_heap();
        let s = singletons();

        let child = heap.alloc(16);
        unsafe {
            ObjectHeader::write(child, ObjectHeader::for_fields(Tag::Cons, 1));
            write_field(child, 0, s.zero() as usize);
        }

        // Root the child, then flip: it gets evacuated and its old
        // from-space copy's first field becomes the forwarding pointer.
        let mut cell = child;
        let token = heap.push_root(&mut cell);
        heap.flip();
        heap.pop_root(token);

        // ...so re-create the scenario the read barrier actually guards:
        // a live object in to-space whose field still points at the
        // (now evacuated) child's old from-space address.
        let live = heap.alloc(16);
        unsafe {
            ObjectHeader::write(live, ObjectHeader::for_fields(Tag::Cons, 1));
            write_field(live, 0, child as usize); // `child` is now a stale from-space address
        }

        heap.read_barrier(live, 0);
        let seen = unsafe { *field_ptr(live, 0) } as *const u8;
        assert!(
            !heap.spaces.from.contains(seen),
            "read barrier must rewrite the field to a to-space address"
        );
        assert_eq!(seen, cell as *const u8);
    }

    #[test]
    fn write_barrier_only_counts() {
        let mut heap = small_heap();
        let before = heap.statistics().total_writes;
        heap.write_barrier(std::ptr::null_mut(), 0, std::ptr::null_mut());
        assert_eq!(heap.statistics().total_writes, before + 1);
    }
}
