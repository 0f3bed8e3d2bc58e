//! Cumulative allocation statistics, enabled by the `counters` feature.
//!
//! These numbers never feed back into allocator behavior, they're purely
//! observational, additive on top of the allocator's required state, and free
//! (don't even exist) when the feature is off.

/// Cumulative statistics tracked by [`Allocator`](crate::Allocator) when the
/// `counters` feature is enabled.
///
/// # Example
///
/// ```
/// # #[cfg(feature = "counters")] {
/// use offalloc::Allocator;
///
/// let mut allocator = Allocator::init(4096, 16);
/// let a = allocator.allocate(64);
/// allocator.free(a);
///
/// let counters = allocator.counters();
/// assert_eq!(counters.allocation_count, 0);
/// assert_eq!(counters.total_allocation_count, 1);
/// assert_eq!(counters.free_count, 1);
/// # }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Counters {
    /// Number of currently live allocations.
    pub allocation_count: u32,
    /// Lifetime count of `allocate` calls that succeeded.
    pub total_allocation_count: u64,
    /// Lifetime count of successful `free` calls.
    pub free_count: u64,
    /// Lifetime count of `allocate` calls that returned [`NO_SPACE`](crate::NO_SPACE),
    /// for either reason an allocation can fail (node pool exhausted, or no bin fit).
    pub failed_allocation_count: u64,
}

impl Counters {
    pub(crate) const fn new() -> Self {
        Self {
            allocation_count: 0,
            total_allocation_count: 0,
            free_count: 0,
            failed_allocation_count: 0,
        }
    }

    #[inline]
    pub(crate) fn account_alloc(&mut self) {
        self.allocation_count += 1;
        self.total_allocation_count += 1;
    }

    #[inline]
    pub(crate) fn account_free(&mut self) {
        self.allocation_count -= 1;
        self.free_count += 1;
    }

    #[inline]
    pub(crate) fn account_failed_alloc(&mut self) {
        self.failed_allocation_count += 1;
    }
}
