//! `offalloc` is a fixed-capacity offset suballocator.
//!
//! It does not own or provide any memory itself. Instead it partitions an
//! abstract address range `[0, size)` into non-overlapping regions and hands
//! out their **offsets**, you decide what the offsets index into (a GPU
//! buffer, a memory-mapped file, an arena you allocated yourself). Allocation
//! and deallocation are worst-case O(1), independent of fragmentation, via a
//! two-level segregated-fit free list and a neighbor-threaded node graph that
//! enables immediate, constant-time coalescing.
//!
//! Start with [`Allocator::init`], hand out space with [`Allocator::allocate`],
//! and give it back with [`Allocator::free`].
//!
//! ```
//! use offalloc::Allocator;
//!
//! let mut allocator = Allocator::init(1024 * 1024, 128);
//!
//! let a = allocator.allocate(1337);
//! assert!(!a.is_failed());
//! assert_eq!(a.offset, 0);
//!
//! allocator.free(a);
//! assert_eq!(allocator.storage_report().total_free_space, 1024 * 1024);
//! ```
//!
//! This is a single-threaded data structure: [`Allocator`] has no internal
//! synchronization, matching its intended use as a piece of bookkeeping state
//! owned by one caller (or behind a lock the caller supplies) rather than a
//! general-purpose concurrent allocator.

#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]

extern crate alloc;

mod allocator;
mod bitfield;
#[cfg(feature = "counters")]
mod counters;
pub mod encoding;
mod node;

#[cfg(feature = "counters")]
pub use counters::Counters;
pub use allocator::{Allocation, Allocator, BinReport, StorageReport, StorageReportFull, NO_SPACE};
pub use node::NodeIndex;
