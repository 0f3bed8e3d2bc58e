#![no_main]

use libfuzzer_sys::fuzz_target;
use libfuzzer_sys::arbitrary::Arbitrary;

use offalloc::Allocator;

#[derive(Arbitrary, Debug)]
enum Action {
    Alloc { size: u16 },
    Free { index: u8 },
}
use Action::*;

const TOTAL_SIZE: u32 = 1 << 20;
const MAX_ALLOCS: u32 = 512;

fuzz_target!(|data: Vec<Action>| {
    let mut allocator = Allocator::init(TOTAL_SIZE, MAX_ALLOCS);
    let mut live: Vec<(offalloc::Allocation, u32, u32)> = Vec::new();

    for action in data {
        match action {
            Alloc { size } => {
                let size = size as u32;
                if size == 0 {
                    continue;
                }

                let a = allocator.allocate(size);
                if a.is_failed() {
                    continue;
                }

                assert!(a.offset + size <= TOTAL_SIZE, "allocation escapes the arena");
                for &(_, start, len) in &live {
                    let end = start + len;
                    let a_end = a.offset + size;
                    assert!(
                        a.offset >= end || a_end <= start,
                        "overlapping live allocations: [{start}, {end}) and [{}, {a_end})",
                        a.offset
                    );
                }

                live.push((a, a.offset, size));
            }
            Free { index } => {
                if live.is_empty() {
                    continue;
                }
                let index = index as usize % live.len();
                let (a, _, _) = live.remove(index);
                allocator.free(a);
            }
        }
    }

    let report = allocator.storage_report();
    let live_total: u32 = live.iter().map(|&(_, _, len)| len).sum();
    assert_eq!(report.total_free_space, TOTAL_SIZE - live_total);

    for (a, _, _) in live {
        allocator.free(a);
    }
    assert_eq!(allocator.storage_report().total_free_space, TOTAL_SIZE);
});
