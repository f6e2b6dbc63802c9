//! Allocation counters (component H, spec §4.H / §6 `print_gc_alloc_stats`).
//!
//! Styled after the teacher's `HeapStatistics` + `Display` impl.

#[derive(Default, Clone, Copy, Debug)]
pub struct Statistics {
    pub total_allocated_bytes: u64,
    pub total_allocated_objects: u64,
    pub max_allocated_bytes: u64,
    pub max_allocated_objects: u64,
    pub current_allocated_bytes: u64,
    pub current_allocated_objects: u64,
    pub total_reads: u64,
    pub total_writes: u64,
    pub gc_cycles: u64,
    pub max_roots_depth: usize,
}

impl Statistics {
    /// Called once per object copied into to-space (fresh allocation or
    /// evacuation), matching `gc.c`'s residency bookkeeping in
    /// `shallow_copy`/`chase`.
    pub(crate) fn record_copy(&mut self, bytes: usize) {
        self.current_allocated_objects += 1;
        self.current_allocated_bytes += bytes as u64;
        self.max_allocated_bytes = self.max_allocated_bytes.max(self.current_allocated_bytes);
        self.max_allocated_objects = self
            .max_allocated_objects
            .max(self.current_allocated_objects);
    }

    pub(crate) fn record_allocation(&mut self, bytes: usize) {
        self.total_allocated_bytes += bytes as u64;
        self.total_allocated_objects += 1;
        self.record_copy(bytes);
    }

    pub(crate) fn record_read(&mut self) {
        self.total_reads += 1;
    }

    pub(crate) fn record_write(&mut self) {
        self.total_writes += 1;
    }

    pub(crate) fn begin_cycle(&mut self) {
        self.current_allocated_bytes = 0;
        self.current_allocated_objects = 0;
        self.gc_cycles += 1;
    }
}

impl std::fmt::Display for Statistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "Total memory allocation: {} bytes ({} objects)",
            self.total_allocated_bytes, self.total_allocated_objects
        )?;
        writeln!(
            f,
            "Maximum residency:       {} bytes ({} objects)",
            self.max_allocated_bytes, self.max_allocated_objects
        )?;
        writeln!(
            f,
            "Total memory use:        {} reads and {} writes",
            self.total_reads, self.total_writes
        )?;
        writeln!(f, "GC cycles:               {}", self.gc_cycles)?;
        write!(f, "Max GC roots stack size: {} roots", self.max_roots_depth)
    }
}
