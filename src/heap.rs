//! The `Heap` value: one semi-space Baker collector instance (components
//! D and E, spec §4.D/§4.E), following design note 9 — grouping the
//! Baker pointers, both buffers, the root stack, and the counters into a
//! single value instead of process-wide globals, the way the teacher's
//! `semispace.rs::SemiSpace` groups a collector's state into one struct.

use crate::diagnostics;
use crate::header::object_size_bytes;
use crate::roots::{Root, RootStack, RootToken};
use crate::runtime::{ObjectHeader, WORD_SIZE};
use crate::space::Spaces;
use crate::stats::Statistics;
use crate::util::{align_up, is_aligned};

/// Default semi-space size: 4 MiB, per spec §3/§6.
pub const DEFAULT_SPACE_SIZE: usize = 4 * 1024 * 1024;
/// Default root stack depth, per spec §4.G.
pub const DEFAULT_MAX_ROOTS: usize = 1024;

#[derive(Clone, Copy, Debug)]
pub struct HeapConfig {
    /// Size in bytes of *each* semi-space.
    pub space_size: usize,
    /// Maximum simultaneously-registered roots.
    pub max_roots: usize,
    /// Gate for the per-operation trace logging spec §6 calls out as an
    /// optional debug flag (mirrors the teacher's `VERBOSE` const and the
    /// original `STELLA_GC_DEBUG` macro).
    pub trace: bool,
}

impl Default for HeapConfig {
    fn default() -> Self {
        Self {
            space_size: DEFAULT_SPACE_SIZE,
            max_roots: DEFAULT_MAX_ROOTS,
            trace: false,
        }
    }
}

pub struct Heap {
    pub(crate) spaces: Spaces,
    /// All objects below `scan` are black (spec §3 "Baker pointers").
    pub(crate) scan: *mut u8,
    /// All objects in `[scan, next)` are grey.
    pub(crate) next: *mut u8,
    /// Allocation proceeds downward from `limit`; `[limit, end)` is white.
    pub(crate) limit: *mut u8,
    pub(crate) roots: RootStack,
    pub(crate) stats: Statistics,
    pub(crate) config: HeapConfig,
}

impl Heap {
    pub fn new(config: HeapConfig) -> Self {
        let spaces = Spaces::new(config.space_size);
        let bottom = spaces.to.bottom();
        let end = spaces.to.end();
        Self {
            spaces,
            scan: bottom,
            next: bottom,
            limit: end,
            roots: RootStack::new(config.max_roots),
            stats: Statistics::default(),
            config,
        }
    }

    #[inline]
    fn free_bytes(&self) -> usize {
        self.limit as usize - self.next as usize
    }

    fn trace(&self, msg: std::fmt::Arguments<'_>) {
        if self.config.trace {
            eprintln!("[gc] {}", msg);
        }
    }

    /// Reserves `size` bytes at `self.next`, failing fatally if that would
    /// cross `limit`. Caller is responsible for the actual copy and for
    /// advancing nothing else — `self.next` is advanced here.
    pub(crate) fn reserve_in_to_space(&mut self, size: usize) -> *mut u8 {
        let dst = self.next;
        let new_next = (self.next as usize).wrapping_add(size);
        if new_next > self.limit as usize {
            self.out_of_memory(size);
        }
        self.next = new_next as *mut u8;
        dst
    }

    /// Component D's per-allocation incremental work quantum: blacken the
    /// object at `scan`, skipping zero-field objects (no real work) until
    /// at least one word was copied or the grey region drains, matching
    /// `gc_alloc`'s `while (memory_copied == 0 && …)` loop (spec §4.D,
    /// §9).
    pub(crate) fn incremental_quantum(&mut self) {
        let mut words_copied = 0usize;
        while words_copied == 0 && self.scan != self.next {
            let obj = self.scan;
            let header = unsafe { ObjectHeader::at(obj) };
            words_copied = self.deep_forward(obj);
            self.scan = unsafe { self.scan.add(object_size_bytes(header)) };
        }
    }

    /// Drains all grey work into black, per spec §4.C `force_copy_all`.
    pub(crate) fn force_copy_all(&mut self) -> usize {
        let mut total = 0;
        while self.scan != self.next {
            let obj = self.scan;
            let header = unsafe { ObjectHeader::at(obj) };
            total += self.deep_forward(obj);
            self.scan = unsafe { self.scan.add(object_size_bytes(header)) };
        }
        total
    }

    /// Swaps space roles and forwards every root (spec §4.D `flip`).
    /// Precondition: `scan == next` (all grey work drained). Checked at
    /// runtime in every build, not just debug: violating it silently
    /// breaks the black/grey/white invariant spec §3 relies on, which is
    /// a collector bug, not a recoverable condition (spec §7).
    pub(crate) fn flip(&mut self) {
        assert_eq!(
            self.scan, self.next,
            "flip called with undrained grey region"
        );
        self.trace(format_args!("flipping"));

        self.spaces.swap();
        let bottom = self.spaces.to.bottom();
        self.next = bottom;
        self.scan = bottom;
        self.limit = self.spaces.to.end();
        self.stats.begin_cycle();

        let cells: Vec<*mut *mut u8> = self.roots.iter().collect();
        for cell in cells {
            unsafe {
                let value = *cell;
                let forwarded = self.forward(value);
                *cell = forwarded;
            }
        }
        self.stats.max_roots_depth = self.stats.max_roots_depth.max(self.roots.max_depth_seen());
    }

    /// Allocates `n` zeroed, word-aligned bytes in to-space (spec §4.E,
    /// §6). `n` is rounded up to a word multiple so the returned address
    /// always satisfies the alignment spec promises even when a caller
    /// asks for an odd byte count. May trigger an incremental quantum, a
    /// full grey drain, and a flip; fails fatally on OOM.
    pub fn alloc(&mut self, n: usize) -> *mut u8 {
        let n = align_up(n, WORD_SIZE);
        self.trace(format_args!("request for {} bytes", n));

        if self.scan != self.next {
            self.incremental_quantum();
        }

        if self.free_bytes() < n {
            self.trace(format_args!("free space exhausted, draining and flipping"));
            if self.scan != self.next {
                self.force_copy_all();
            }
            self.flip();
            if self.free_bytes() < n {
                self.out_of_memory(n);
            }
        }

        self.limit = (self.limit as usize - n) as *mut u8;
        debug_assert!(is_aligned(self.limit as usize, WORD_SIZE));
        unsafe { std::ptr::write_bytes(self.limit, 0, n) };
        self.stats.record_allocation(n);
        self.limit
    }

    /// Registers `cell` as a GC root. Fatal if the root stack is already
    /// at `max_roots` depth (spec §4.G, §7).
    pub fn push_root(&mut self, cell: *mut *mut u8) -> RootToken {
        self.roots.push(cell).unwrap_or_else(|_| {
            panic!(
                "root stack overflow: exceeded max depth of {}",
                self.config.max_roots
            )
        })
    }

    pub fn pop_root(&mut self, token: RootToken) {
        self.roots.pop(token);
    }

    /// RAII convenience: pushes `cell` now, pops it when the returned
    /// guard drops. Unlike a naive `&mut self`-borrowing guard, `Root`
    /// does not keep `self` borrowed, so further calls to `alloc`,
    /// `push_root`, etc. are allowed while a guard is held (see
    /// `roots::Root`'s module docs for why).
    pub fn root(&mut self, cell: *mut *mut u8) -> Root {
        let max_roots = self.config.max_roots;
        Root::new(&mut self.roots, cell)
            .unwrap_or_else(|_| panic!("root stack overflow: exceeded max depth of {}", max_roots))
    }

    pub fn statistics(&self) -> &Statistics {
        &self.stats
    }

    pub fn print_gc_state(&self) {
        diagnostics::print_gc_state(self);
    }

    pub fn print_gc_roots(&self) {
        diagnostics::print_gc_roots(self);
    }

    pub fn print_gc_alloc_stats(&self) {
        diagnostics::print_gc_alloc_stats(self);
    }

    /// Fatal out-of-memory path (spec §4.H, §7): print full state then
    /// terminate the process with a nonzero exit status. Never returns.
    pub(crate) fn out_of_memory(&self, requested: usize) -> ! {
        diagnostics::out_of_memory(self, requested)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::field_ptr;
    use crate::runtime::Tag;

    fn small_heap() -> Heap {
        Heap::new(HeapConfig {
            space_size: 4096,
            max_roots: 16,
            trace: false,
        })
    }

    unsafe fn write_header(obj: *mut u8, tag: Tag, field_count: u64) {
        ObjectHeader::write(obj, ObjectHeader::for_fields(tag, field_count));
    }

    #[test]
    fn invariant_pointer_ordering_holds_after_construction() {
        let heap = small_heap();
        let bottom = heap.spaces.to.bottom() as usize;
        let end = heap.spaces.to.end() as usize;
        assert!(bottom <= heap.scan as usize);
        assert!(heap.scan as usize <= heap.next as usize);
        assert!(heap.next as usize <= heap.limit as usize);
        assert!(heap.limit as usize <= end);
    }

    #[test]
    fn alloc_exactly_the_space_size_succeeds_once() {
        let mut heap = small_heap();
        let size = heap.spaces.to.size();
        // One big zero-field object: reserve a word for the forwarding
        // slot, so its storage is exactly `size` only when `size` is a
        // multiple of the object stride; use a plain byte budget instead.
        let ptr = heap.alloc(size);
        assert!(!ptr.is_null());
    }

    #[test]
    fn empty_heap_flip_on_second_full_allocation() {
        let mut heap = small_heap();
        let size = heap.spaces.to.size();
        let _first = heap.alloc(size);
        // Nothing is rooted, so the second allocation of the same size
        // triggers a flip that copies zero live bytes and succeeds.
        let second = heap.alloc(size);
        assert!(!second.is_null());
    }

    #[test]
    fn root_guard_allows_further_allocation_while_held() {
        let mut heap = small_heap();
        let singleton = crate::runtime::singletons();
        let obj = heap.alloc(16);
        unsafe {
            write_header(obj, Tag::Cons, 1);
            *field_ptr(obj, 0) = singleton.zero() as usize;
        }
        let mut cell = obj;

        let guard = heap.root(&mut cell);
        // The whole point of `Root` not borrowing `self`: these must
        // compile and run while `guard` is still alive.
        let _filler = heap.alloc(8);
        heap.flip();
        assert_ne!(cell, obj, "flip must have relocated the rooted object");

        drop(guard);
        assert!(heap.roots.is_empty());
    }

    #[test]
    fn forward_is_idempotent_on_from_space_pointers() {
        let mut heap = small_heap();
        let singleton = crate::runtime::singletons();
        // A freshly-allocated object is white; nothing has been evacuated
        // yet, so `scan == next` and `flip`'s precondition holds without
        // needing to exhaust to-space first.
        let obj = heap.alloc(16); // header + 1 field
        unsafe {
            write_header(obj, Tag::Cons, 1);
            *field_ptr(obj, 0) = singleton.zero() as usize;
        }
        let mut root_cell = obj;
        let token = heap.push_root(&mut root_cell);

        heap.flip();

        let forwarded_once = root_cell;
        assert_ne!(
            forwarded_once, obj,
            "flip must have moved the object into the new to-space"
        );
        let forwarded_again = heap.forward(forwarded_once);
        assert_eq!(
            forwarded_again, forwarded_once,
            "forward must be idempotent on an already-forwarded pointer"
        );

        heap.pop_root(token);
    }
}
