//! The region-descriptor [`Node`] type and its index.
//!
//! Every live node (free or in-use) is threaded into the address-ordered
//! neighbor chain; free nodes are additionally threaded into their bin's
//! free list. Both chains are plain index-based doubly-linked lists over the
//! node pool in [`Allocator`](crate::Allocator) -- there are no pointers here,
//! only indices, which is what lets the whole pool live in one contiguous
//! `Vec` and be trivially relocatable.

/// An index into the node pool, or [`UNUSED`] to mean "no such link."
#[cfg(not(feature = "small-node-index"))]
pub type NodeIndex = u32;

/// An index into the node pool, or [`UNUSED`] to mean "no such link."
///
/// Halves the size of [`Allocation::metadata`](crate::Allocation::metadata)
/// and every link field in [`Node`] relative to the default `u32`, at the
/// cost of capping `max_allocs` at 65536 (enforced by
/// [`Allocator::init`](crate::Allocator::init)).
#[cfg(feature = "small-node-index")]
pub type NodeIndex = u16;

/// Sentinel for "no node", an all-ones [`NodeIndex`]. Used for every link
/// field that may legitimately be absent (a node with no bin-list neighbor,
/// the end of the neighbor chain, an empty bin's head).
pub const UNUSED: NodeIndex = NodeIndex::MAX;

/// A region descriptor stored at a fixed slot in the node pool.
///
/// A node describes a contiguous span `[data_offset, data_offset +
/// data_size)` of the allocator's address space, and is threaded into two
/// independent doubly-linked lists:
/// - `bin_list_*`: this bin's free list, only meaningful while `!used`.
/// - `neighbor_*`: the address-ordered chain of *every* live node, used or
///   not, which is what makes coalescing on free O(1): the node's immediate
///   neighbors in address space are always a link away.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Node {
    pub data_offset: u32,
    pub data_size: u32,

    pub bin_list_prev: NodeIndex,
    pub bin_list_next: NodeIndex,

    pub neighbor_prev: NodeIndex,
    pub neighbor_next: NodeIndex,

    pub used: bool,
}

impl Node {
    /// A node with every link unset, zero offset/size, and `used = false`.
    /// Never observed by callers; exists purely as filler for unoccupied
    /// pool slots so the pool can be a plain `Vec<Node>` instead of a
    /// `Vec<MaybeUninit<Node>>`.
    pub const EMPTY: Self = Self {
        data_offset: 0,
        data_size: 0,
        bin_list_prev: UNUSED,
        bin_list_next: UNUSED,
        neighbor_prev: UNUSED,
        neighbor_next: UNUSED,
        used: false,
    };
}
