//! End-to-end scenarios exercising the full address range a single
//! allocator instance is expected to manage without running low on node
//! pool slots.

use offalloc::Allocator;

const SIZE: u32 = 256 * 1024 * 1024;
const MAX_ALLOCS: u32 = 131_072;

#[test]
fn single_allocation_round_trip() {
    let mut a = Allocator::init(SIZE, MAX_ALLOCS);

    let x = a.allocate(1337);
    assert!(!x.is_failed());
    assert_eq!(x.offset, 0);

    a.free(x);
    assert_eq!(a.storage_report().total_free_space, SIZE);
}

#[test]
fn sequential_allocations_tile_the_arena() {
    let mut a = Allocator::init(SIZE, MAX_ALLOCS);

    let zero = a.allocate(0);
    assert_eq!(zero.offset, 0);

    let one = a.allocate(1);
    assert_eq!(one.offset, 0);

    let small = a.allocate(123);
    assert_eq!(small.offset, 1);

    let mid = a.allocate(1234);
    assert_eq!(mid.offset, 124);

    a.free(zero);
    a.free(one);
    a.free(small);
    a.free(mid);

    let whole = a.allocate(SIZE);
    assert_eq!(whole.offset, 0);
}

#[test]
fn coalescing_reclaims_adjacent_free_neighbors() {
    let mut a = Allocator::init(SIZE, MAX_ALLOCS);

    const MIB: u32 = 1024 * 1024;
    let mut slots = [offalloc::Allocation::FAILED; 256];
    for (i, slot) in slots.iter_mut().enumerate() {
        let alloc = a.allocate(MIB);
        assert!(!alloc.is_failed());
        assert_eq!(alloc.offset, i as u32 * MIB);
        *slot = alloc;
    }

    let report = a.storage_report();
    assert_eq!(report.total_free_space, 0);
    assert_eq!(report.largest_free_region, 0);

    // Four non-adjacent slots.
    for &i in &[243usize, 5, 123, 95] {
        a.free(slots[i]);
    }
    // Four mutually-adjacent slots, coalescing into one 4 MiB region.
    for i in 151..155usize {
        a.free(slots[i]);
    }

    for &i in &[243usize, 5, 123, 95] {
        let alloc = a.allocate(MIB);
        assert!(!alloc.is_failed());
        slots[i] = alloc;
    }
    let four_mib = a.allocate(4 * MIB);
    assert!(!four_mib.is_failed());
    slots[151] = four_mib;

    for &i in &[243usize, 5, 123, 95] {
        a.free(slots[i]);
    }
    a.free(slots[151]);
    for i in (0..256).filter(|i| ![243, 5, 123, 95, 151].contains(i)) {
        a.free(slots[i]);
    }

    let report = a.storage_report();
    assert_eq!(report.total_free_space, SIZE);
    assert_eq!(report.largest_free_region, SIZE);

    let whole = a.allocate(SIZE);
    assert_eq!(whole.offset, 0);
}

#[test]
fn partial_frees_leave_a_fragmented_remainder() {
    let mut a = Allocator::init(SIZE, MAX_ALLOCS);

    let x = a.allocate(1024);
    let _y = a.allocate(3456);
    a.free(x);

    let c = a.allocate(2345);
    assert_eq!(c.offset, 4480);

    let d = a.allocate(456);
    assert_eq!(d.offset, 0);

    let e = a.allocate(512);
    assert_eq!(e.offset, 456);

    let report = a.storage_report();
    assert_eq!(report.total_free_space, SIZE - 3456 - 2345 - 456 - 512);
    assert!(report.largest_free_region < report.total_free_space);
}
