//! The allocator engine: composes the bin-index encoding, the two-level
//! bitmap and the node pool into `init`/`reset`/`allocate`/`free` and the two
//! read-only reports.

use alloc::vec;
use alloc::vec::Vec;

use crate::bitfield::{self, Bitmap};
use crate::encoding;
use crate::node::{Node, NodeIndex, UNUSED};

#[cfg(feature = "counters")]
use crate::counters::Counters;

/// Sentinel value returned in both fields of [`Allocation`] when
/// [`Allocator::allocate`] fails.
pub const NO_SPACE: u32 = u32::MAX;

/// The result of a successful or failed [`Allocator::allocate`] call.
///
/// On success, `offset` is where the caller should index into whatever
/// buffer it's suballocating, and `metadata` is an opaque handle to pass
/// back to [`Allocator::free`]. On failure both fields equal [`NO_SPACE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Allocation {
    /// Offset of the allocated region within `[0, size)`.
    pub offset: u32,
    /// Opaque node-pool handle; pass this back to [`Allocator::free`].
    pub metadata: NodeIndex,
}

impl Allocation {
    /// The sentinel allocation returned when [`Allocator::allocate`] fails.
    pub const FAILED: Self = Self { offset: NO_SPACE, metadata: UNUSED };

    /// Whether this allocation represents a failed [`Allocator::allocate`]
    /// call.
    #[inline]
    pub const fn is_failed(&self) -> bool {
        self.offset == NO_SPACE
    }
}

/// A snapshot of overall free-space statistics. See [`Allocator::storage_report`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageReport {
    /// Total bytes currently free, across every free region.
    pub total_free_space: u32,
    /// The nominal size of the largest occupied bin.
    ///
    /// This is a lower bound on the size of the actual largest free region
    /// (that region is at least this large, since it lives in this bin) and
    /// an exclusive upper bound on the *next* bin's nominal size.
    pub largest_free_region: u32,
}

/// Per-bin occupancy, one entry per bin. See [`Allocator::storage_report_full`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinReport {
    /// This bin's nominal size (i.e. `decode(bin_index)`).
    pub size: u32,
    /// Number of free regions currently filed in this bin.
    pub count: u32,
}

/// Per-bin occupancy across all 256 bins.
pub type StorageReportFull = [BinReport; encoding::BIN_COUNT];

/// A fixed-capacity offset suballocator.
///
/// See the [crate-level docs](crate) for an overview and a usage example.
/// `Allocator` owns only its own bookkeeping (the node pool); it has no
/// opinion about what the offsets it returns actually index into.
pub struct Allocator {
    size: u32,
    max_allocs: u32,
    free_storage: u32,

    bitmap: Bitmap,
    bin_indices: [NodeIndex; encoding::BIN_COUNT],

    nodes: Vec<Node>,
    free_nodes: Vec<NodeIndex>,
    /// Index of the top of the `free_nodes` stack. Negative means the pool
    /// is exhausted.
    free_offset: i64,

    #[cfg(feature = "counters")]
    counters: Counters,
}

impl Allocator {
    /// Create an allocator managing the address range `[0, size)`, with a
    /// node pool sized for at most `max_allocs` simultaneously-live regions
    /// (free + used).
    ///
    /// # Panics
    /// Panics if `max_allocs` is zero, or (with the `small-node-index`
    /// feature enabled) exceeds 65536.
    pub fn init(size: u32, max_allocs: u32) -> Self {
        assert!(max_allocs > 0, "max_allocs must be at least 1");
        #[cfg(feature = "small-node-index")]
        assert!(
            max_allocs as usize <= NodeIndex::MAX as usize,
            "max_allocs must fit in a 16-bit NodeIndex when `small-node-index` is enabled"
        );

        let mut allocator = Self {
            size,
            max_allocs,
            free_storage: 0,
            bitmap: Bitmap::EMPTY,
            bin_indices: [UNUSED; encoding::BIN_COUNT],
            nodes: vec![Node::EMPTY; max_allocs as usize],
            free_nodes: Vec::with_capacity(max_allocs as usize),
            free_offset: -1,
            #[cfg(feature = "counters")]
            counters: Counters::new(),
        };

        allocator.reset();
        allocator
    }

    /// Re-initialize to the single-free-region state: every previous
    /// allocation's metadata becomes invalid.
    pub fn reset(&mut self) {
        self.bitmap = Bitmap::EMPTY;
        self.bin_indices = [UNUSED; encoding::BIN_COUNT];
        self.free_storage = 0;

        self.free_nodes.clear();
        self.free_nodes.extend((0..self.max_allocs).rev().map(|i| i as NodeIndex));
        self.free_offset = self.max_allocs as i64 - 1;

        for node in self.nodes.iter_mut() {
            *node = Node::EMPTY;
        }

        #[cfg(feature = "counters")]
        {
            self.counters = Counters::new();
        }

        self.insert_node_into_bin(self.size, 0);
    }

    /// Release the node pool. Equivalent to dropping the allocator; exists
    /// to make the release point explicit at call sites that otherwise pair
    /// `init` with a long-lived allocator and never drop it by scope exit.
    pub fn terminate(self) {
        drop(self);
    }

    /// Allocate `size` bytes, returning an [`Allocation`] whose `offset` and
    /// `metadata` are both [`NO_SPACE`] on failure.
    ///
    /// Fails (without mutating any state) if the node pool is exhausted, or
    /// if no free region is large enough; both report identically in-band.
    pub fn allocate(&mut self, size: u32) -> Allocation {
        if self.free_offset < 0 {
            #[cfg(feature = "counters")]
            self.counters.account_failed_alloc();
            return Allocation::FAILED;
        }

        let min_bin = encoding::round_up(size);
        let bin = self.bitmap.find_at_or_after(min_bin);
        if bin == bitfield::NO_SPACE {
            #[cfg(feature = "counters")]
            self.counters.account_failed_alloc();
            return Allocation::FAILED;
        }

        let n = self.bin_indices[bin as usize];
        let total_size = self.nodes[n as usize].data_size;
        let offset = self.nodes[n as usize].data_offset;

        // Unlink `n` from the head of its bin's free list.
        let successor = self.nodes[n as usize].bin_list_next;
        self.bin_indices[bin as usize] = successor;
        if successor != UNUSED {
            self.nodes[successor as usize].bin_list_prev = UNUSED;
        }
        if self.bin_indices[bin as usize] == UNUSED {
            self.bitmap.clear(bin);
        }
        self.free_storage -= total_size;

        self.nodes[n as usize].data_size = size;
        self.nodes[n as usize].used = true;
        self.nodes[n as usize].bin_list_prev = UNUSED;
        self.nodes[n as usize].bin_list_next = UNUSED;

        let remainder = total_size - size;
        if remainder > 0 {
            let tail = self.insert_node_into_bin(remainder, offset + size);

            let old_next = self.nodes[n as usize].neighbor_next;
            self.nodes[tail as usize].neighbor_prev = n;
            self.nodes[tail as usize].neighbor_next = old_next;
            if old_next != UNUSED {
                self.nodes[old_next as usize].neighbor_prev = tail;
            }
            self.nodes[n as usize].neighbor_next = tail;
        }

        #[cfg(feature = "counters")]
        self.counters.account_alloc();

        Allocation { offset, metadata: n }
    }

    /// Release a region previously returned by [`Allocator::allocate`],
    /// coalescing with free neighbors in O(1).
    ///
    /// # Caller contract
    /// `alloc.metadata` must refer to a node that is currently allocated
    /// (i.e. the return value of an `allocate` call that hasn't already been
    /// freed). Violating this is a caller error; debug builds assert it,
    /// release builds trust the caller.
    pub fn free(&mut self, alloc: Allocation) {
        let n = alloc.metadata;
        debug_assert!(
            n != UNUSED && (n as usize) < self.nodes.len() && self.nodes[n as usize].used,
            "free called with stale metadata or a node that isn't currently allocated"
        );

        let mut offset = self.nodes[n as usize].data_offset;
        let mut size = self.nodes[n as usize].data_size;

        let prev = self.nodes[n as usize].neighbor_prev;
        if prev != UNUSED && !self.nodes[prev as usize].used {
            offset = self.nodes[prev as usize].data_offset;
            size += self.nodes[prev as usize].data_size;
            self.remove_node_from_bin(prev);
            self.nodes[n as usize].neighbor_prev = self.nodes[prev as usize].neighbor_prev;
        }

        let next = self.nodes[n as usize].neighbor_next;
        if next != UNUSED && !self.nodes[next as usize].used {
            size += self.nodes[next as usize].data_size;
            self.remove_node_from_bin(next);
            self.nodes[n as usize].neighbor_next = self.nodes[next as usize].neighbor_next;
        }

        let np = self.nodes[n as usize].neighbor_prev;
        let nn = self.nodes[n as usize].neighbor_next;

        // `n` itself is discarded as an entity; its slot goes straight back
        // to the pool rather than through `remove_node_from_bin` (it was
        // never filed in a bin - it was in use).
        self.free_offset += 1;
        self.free_nodes[self.free_offset as usize] = n;

        let combined = self.insert_node_into_bin(size, offset);

        self.nodes[combined as usize].neighbor_next = nn;
        if nn != UNUSED {
            self.nodes[nn as usize].neighbor_prev = combined;
        }
        self.nodes[combined as usize].neighbor_prev = np;
        if np != UNUSED {
            self.nodes[np as usize].neighbor_next = combined;
        }

        #[cfg(feature = "counters")]
        self.counters.account_free();
    }

    /// Total free space and the nominal size of the largest free region.
    ///
    /// O(1). `largest_free_region` is a lower bound on the true largest free
    /// region's size (it names the bin, not the exact region), and is zero
    /// only when `total_free_space` is also zero.
    pub fn storage_report(&self) -> StorageReport {
        let largest_free_region = match self.bitmap.highest_occupied_bin() {
            Some(bin) => encoding::decode(bin),
            None => 0,
        };

        StorageReport { total_free_space: self.free_storage, largest_free_region }
    }

    /// Per-bin occupancy: each bin's nominal size and how many free regions
    /// currently live in it.
    ///
    /// O(number of bins + number of free regions), since each bin's free
    /// list is walked to produce its count.
    pub fn storage_report_full(&self) -> StorageReportFull {
        core::array::from_fn(|i| {
            let mut count = 0u32;
            let mut cursor = self.bin_indices[i];
            while cursor != UNUSED {
                cursor = self.nodes[cursor as usize].bin_list_next;
                count += 1;
            }

            BinReport { size: encoding::decode(i as u8), count }
        })
    }

    /// File a new free region of `size` bytes at `offset` into its bin,
    /// returning the node index it was stored at. The caller is responsible
    /// for threading the returned node into the neighbor chain.
    ///
    /// # Precondition
    /// The node pool must not be exhausted (`free_offset >= 0`).
    fn insert_node_into_bin(&mut self, size: u32, offset: u32) -> NodeIndex {
        let bin = encoding::round_down(size);
        let old_head = self.bin_indices[bin as usize];

        if old_head == UNUSED {
            self.bitmap.set(bin);
        }

        debug_assert!(self.free_offset >= 0, "insert_node_into_bin: node pool exhausted");
        let n = self.free_nodes[self.free_offset as usize];
        self.free_offset -= 1;

        self.nodes[n as usize] = Node {
            data_offset: offset,
            data_size: size,
            bin_list_prev: UNUSED,
            bin_list_next: old_head,
            neighbor_prev: UNUSED,
            neighbor_next: UNUSED,
            used: false,
        };

        if old_head != UNUSED {
            self.nodes[old_head as usize].bin_list_prev = n;
        }

        self.bin_indices[bin as usize] = n;
        self.free_storage += size;

        n
    }

    /// Unlink a free node from its bin's free list and return its slot to
    /// the node pool. Does not touch the neighbor chain.
    fn remove_node_from_bin(&mut self, n: NodeIndex) {
        let node = self.nodes[n as usize];

        if node.bin_list_prev != UNUSED {
            self.nodes[node.bin_list_prev as usize].bin_list_next = node.bin_list_next;
            if node.bin_list_next != UNUSED {
                self.nodes[node.bin_list_next as usize].bin_list_prev = node.bin_list_prev;
            }
        } else {
            let bin = encoding::round_down(node.data_size);
            self.bin_indices[bin as usize] = node.bin_list_next;
            if node.bin_list_next != UNUSED {
                self.nodes[node.bin_list_next as usize].bin_list_prev = UNUSED;
            }
            if self.bin_indices[bin as usize] == UNUSED {
                self.bitmap.clear(bin);
            }
        }

        self.free_offset += 1;
        self.free_nodes[self.free_offset as usize] = n;
        self.free_storage -= node.data_size;
    }

    /// The statistics accumulated since the last [`Allocator::reset`],
    /// available when the `counters` feature is enabled.
    #[cfg(feature = "counters")]
    pub fn counters(&self) -> Counters {
        self.counters
    }
}

impl core::fmt::Debug for Allocator {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let report = self.storage_report();
        f.debug_struct("Allocator")
            .field("size", &self.size)
            .field("max_allocs", &self.max_allocs)
            .field("total_free_space", &report.total_free_space)
            .field("largest_free_region", &report.largest_free_region)
            .finish()
    }
}
