//! Black-box property test: a long random sequence of allocate/free actions
//! should never hand out overlapping regions and should always return every
//! byte to the free pool once everything live is freed.

use offalloc::Allocator;

const SIZE: u32 = 1 << 20;
const MAX_ALLOCS: u32 = 4096;

#[test]
fn random_alloc_free_sequences_never_overlap() {
    let rng = fastrand::Rng::with_seed(0xC0FFEE);

    for _ in 0..50 {
        let mut allocator = Allocator::init(SIZE, MAX_ALLOCS);
        let mut live: Vec<(offalloc::Allocation, u32, u32)> = Vec::new();

        for _ in 0..2000 {
            if live.is_empty() || rng.bool() {
                let size = rng.u32(1..=65536);
                let a = allocator.allocate(size);
                if a.is_failed() {
                    continue;
                }

                assert!(a.offset + size <= SIZE, "allocation escapes the arena");
                for &(_, start, len) in &live {
                    let end = start + len;
                    let a_end = a.offset + size;
                    assert!(
                        a.offset >= end || a_end <= start,
                        "overlapping live allocations: [{start}, {end}) vs [{}, {a_end})",
                        a.offset
                    );
                }
                live.push((a, a.offset, size));
            } else {
                let index = rng.usize(..live.len());
                let (a, _, _) = live.remove(index);
                allocator.free(a);
            }

            let live_total: u32 = live.iter().map(|&(_, _, len)| len).sum();
            assert_eq!(allocator.storage_report().total_free_space, SIZE - live_total);
        }

        for (a, _, _) in live {
            allocator.free(a);
        }
        let report = allocator.storage_report();
        assert_eq!(report.total_free_space, SIZE);
        assert_eq!(report.largest_free_region, SIZE);
    }
}

#[test]
fn node_pool_exhaustion_reports_failure_not_panic() {
    // max_allocs=4 with many small allocations must eventually fail cleanly.
    let mut allocator = Allocator::init(1024, 4);
    let mut lived = 0;
    for _ in 0..10 {
        let a = allocator.allocate(1);
        if a.is_failed() {
            continue;
        }
        lived += 1;
    }
    assert!(lived <= 4);
}
