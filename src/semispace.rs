//! Evacuation engine (component C, spec §4.C): `shallow_copy`, `chase`,
//! `forward`, `deep_forward`. Ported line-for-line in control flow from
//! `examples/original_source/stella/gc.c`'s functions of the same names.

use crate::header::{field_ptr, object_size_bytes, object_size_words, read_field, write_field};
use crate::heap::Heap;
use crate::runtime::ObjectHeader;

impl Heap {
    /// True iff `obj`'s first field already points into to-space, i.e.
    /// `obj` (a from-space object) has already been evacuated. This reads
    /// the forwarding slot directly rather than a header bit — spec §3
    /// defines forwarded-ness exactly this way.
    #[inline]
    pub(crate) fn is_forwarded(&self, obj: *mut u8) -> bool {
        let slot = unsafe { read_field(obj, 0) } as *const u8;
        self.spaces.to.contains(slot)
    }

    /// Copies `obj`'s bytes to `next` and advances `next`, *without*
    /// touching `obj`'s forwarding slot. Used by both `shallow_copy`
    /// (which sets the forwarding pointer immediately) and `chase`
    /// (which defers it until after scanning the copy's fields).
    fn raw_copy(&mut self, obj: *mut u8) -> *mut u8 {
        let header = unsafe { ObjectHeader::at(obj) };
        let size = object_size_bytes(header);
        let dst = self.reserve_in_to_space(size);
        unsafe { std::ptr::copy_nonoverlapping(obj, dst, size) };
        self.stats.record_copy(size);
        dst
    }

    /// Places a byte-for-byte copy of `obj` at `next` and installs the
    /// forwarding pointer (spec §4.C `shallow_copy`).
    pub(crate) fn shallow_copy(&mut self, obj: *mut u8) -> *mut u8 {
        let dst = self.raw_copy(obj);
        unsafe { write_field(obj, 0, dst as usize) };
        dst
    }

    /// Copies one spine of the reachability graph contiguously (spec
    /// §4.C `chase`): repeatedly shallow-copies the current object,
    /// then continues with the *last* of its fields that still points
    /// into from-space and is not yet forwarded (spec §9: the chosen
    /// policy is arbitrary but must be deterministic; this crate picks
    /// the last qualifying field, matching the original). Returns the
    /// number of words copied.
    pub(crate) fn chase(&mut self, mut object: *mut u8) -> usize {
        let mut total_words = 0usize;

        loop {
            let header = unsafe { ObjectHeader::at(object) };
            let field_count = header.field_count() as usize;
            let forwarded = self.raw_copy(object);
            total_words += object_size_words(header);

            let mut next_object: *mut u8 = std::ptr::null_mut();
            for i in 0..field_count {
                let field = unsafe { read_field(forwarded, i) } as *mut u8;
                if self.spaces.from.contains(field) && !self.is_forwarded(field) {
                    next_object = field;
                }
            }

            unsafe { write_field(object, 0, forwarded as usize) };

            if next_object.is_null() {
                break;
            }
            object = next_object;
        }

        total_words
    }

    /// Moves `p` from from-space to to-space if needed and returns its
    /// to-space address; pointers already in to-space, singletons, and
    /// opaque non-pointers pass through unchanged (spec §4.C `forward`).
    /// Idempotent: a second call on the same from-space pointer returns
    /// the same to-space pointer without re-copying.
    pub fn forward(&mut self, p: *mut u8) -> *mut u8 {
        if !self.spaces.from.contains(p) {
            return p;
        }
        if !self.is_forwarded(p) {
            self.chase(p);
        }
        unsafe { read_field(p, 0) as *mut u8 }
    }

    /// Replaces every field of the grey object `o` with `forward(field)`,
    /// blackening it (spec §4.C `deep_forward`). Returns the number of
    /// words copied while doing so.
    pub(crate) fn deep_forward(&mut self, obj: *mut u8) -> usize {
        let header = unsafe { ObjectHeader::at(obj) };
        let field_count = header.field_count() as usize;
        let mut total_words = 0usize;

        for i in 0..field_count {
            let field = unsafe { read_field(obj, i) } as *mut u8;
            let before = self.next as usize;
            let new_field = self.forward(field);
            let after = self.next as usize;
            total_words += (after - before) / crate::runtime::WORD_SIZE;
            unsafe { write_field(obj, i, new_field as usize) };
        }

        total_words
    }

    /// Address of field `index` of `obj`, exposed so a driver can build
    /// and inspect object graphs (component B helper, not a Baker
    /// invariant by itself).
    ///
    /// # Safety
    /// Same requirements as [`field_ptr`].
    pub unsafe fn field_ptr(&self, obj: *mut u8, index: usize) -> *mut usize {
        field_ptr(obj, index)
    }
}
