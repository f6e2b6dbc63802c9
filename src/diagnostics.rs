//! Diagnostics (component H, spec §4.H): state/root/heap pretty-printers
//! and the fatal OOM path. Mirrors `gc.c`'s `print_gc_state`,
//! `print_gc_roots`, `print_gc_alloc_stats`, and `out_of_memory_failure`.

use crate::header::object_size_bytes;
use crate::heap::Heap;
use crate::runtime::{singletons, ObjectHeader, WORD_SIZE};

fn describe(heap: &Heap, addr: *const u8) -> &'static str {
    if let Some(name) = singletons().describe(addr) {
        return name;
    }
    if heap.spaces.to.contains(addr) {
        "to-space"
    } else if heap.spaces.from.contains(addr) {
        "from-space"
    } else {
        "invalid"
    }
}

fn print_object(heap: &Heap, obj: *mut u8, prefix: &str) {
    let header = unsafe { ObjectHeader::at(obj) };
    let field_count = header.field_count();
    println!(
        "{}{:p}: object of {} fields with tag {}",
        prefix,
        obj,
        field_count,
        header.tag().name()
    );
    for i in 0..field_count as usize {
        let field = unsafe { crate::header::read_field(obj, i) } as *const u8;
        println!(
            "{}{:p}: field #{} = {:p} ({})",
            prefix,
            unsafe { (obj as *const usize).add(1 + i) },
            i,
            field,
            describe(heap, field)
        );
    }
}

fn print_to_space_object(heap: &Heap, obj: *mut u8) {
    print_object(heap, obj, "");
    let header = unsafe { ObjectHeader::at(obj) };
    for i in 0..header.field_count() as usize {
        let field = unsafe { crate::header::read_field(obj, i) } as *mut u8;
        if heap.spaces.from.contains(field) {
            print_object(heap, field, "|\t\t\t");
        }
    }
}

fn print_to_space(heap: &Heap) {
    println!("Objects not handled by GC:");
    let s = singletons();
    print_object(heap, s.zero(), "");
    print_object(heap, s.unit(), "");
    print_object(heap, s.empty(), "");
    print_object(heap, s.empty_tuple(), "");
    print_object(heap, s.stella_false(), "");
    print_object(heap, s.stella_true(), "");

    println!("to-space:");
    let mut current = heap.spaces.to.bottom();

    // [bottom, next): black + grey objects, walked by object size.
    while (current as usize) < heap.next as usize {
        let header = unsafe { ObjectHeader::at(current) };
        print_to_space_object(heap, current);
        current = unsafe { current.add(object_size_bytes(header)) };
    }

    // [next, limit): the free region, dumped word by word.
    while (current as usize) < heap.limit as usize {
        println!("{:p}: NOTHING", current);
        current = unsafe { current.add(WORD_SIZE) };
    }

    // [limit, end): white objects allocated since the last flip.
    while (current as usize) < heap.spaces.to.end() as usize {
        let header = unsafe { ObjectHeader::at(current) };
        print_to_space_object(heap, current);
        current = unsafe { current.add(object_size_bytes(header)) };
    }
}

fn print_state_variables(heap: &Heap) {
    println!("TO-SPACE:    {:p}", heap.spaces.to.bottom());
    println!("FROM-SPACE:  {:p}", heap.spaces.from.bottom());
    println!(
        "NEXT pointer:  {:p} (TO-SPACE + {})",
        heap.next,
        heap.next as usize - heap.spaces.to.bottom() as usize
    );
    println!("SCAN pointer:  {:p}", heap.scan);
    println!(
        "LIMIT pointer: {:p} (NEXT + {})",
        heap.limit,
        heap.limit as usize - heap.next as usize
    );
}

pub(crate) fn print_gc_roots(heap: &Heap) {
    print!("ROOTS: ");
    for cell in heap.roots.iter() {
        let value = unsafe { *cell };
        print!("{:p} ", value);
    }
    println!();
}

pub(crate) fn print_gc_state(heap: &Heap) {
    print_state_variables(heap);
    print_gc_roots(heap);
    print_to_space(heap);
}

pub(crate) fn print_gc_alloc_stats(heap: &Heap) {
    print!("{}", heap.stats);
    println!();
}

/// Prints the full diagnostic dump and terminates the process with a
/// nonzero exit status (spec §4.H, §7). Never returns.
pub(crate) fn out_of_memory(heap: &Heap, requested: usize) -> ! {
    eprintln!(
        "\n======  Failure: Out of memory (requested {} bytes)  =======\n",
        requested
    );
    print_state_variables(heap);
    print_gc_roots(heap);
    eprintln!("========================================");
    print_gc_alloc_stats(heap);
    std::process::exit(1)
}
