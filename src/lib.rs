//! An incremental copying garbage collector implementing Baker's
//! algorithm: a semi-space layout with a read barrier that lets mutator
//! progress interleave with evacuation, giving bounded pause times
//! without the mutator ever observing an object in the old space.
//!
//! The collector is single-threaded and cooperative — the mutator and
//! collector share one thread, and every Baker invariant is re-
//! established before any public method returns (see [`heap::Heap`]).

pub mod barrier;
pub mod diagnostics;
pub mod header;
pub mod heap;
pub mod mmap;
pub mod roots;
pub mod runtime;
pub mod semispace;
pub mod space;
pub mod stats;
mod util;

pub use heap::{Heap, HeapConfig};
pub use roots::{Root, RootStackOverflow, RootToken};
pub use runtime::{singletons, ObjectHeader, Singletons, Tag};
pub use stats::Statistics;
