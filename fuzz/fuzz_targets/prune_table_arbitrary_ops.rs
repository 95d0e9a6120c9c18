#![no_main]

use libfuzzer_sys::fuzz_target;
use memokit::ds::PruneTable;
use memokit::policy::prune::{PrunePolicy, PruneTrigger};

// Fuzz arbitrary operation sequences on PruneTable
//
// The first two bytes pick capacity and trigger; the rest are (op, key)
// pairs. Invariants are checked after every operation.
fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }

    let capacity = usize::from(data[0] % 32) + 1;
    let trigger = if data[1] % 2 == 0 {
        PruneTrigger::AtCapacity
    } else {
        PruneTrigger::AtOrAboveCapacity
    };
    let mut table: PruneTable<u8, u16> =
        PruneTable::with_policy(capacity, PrunePolicy::new(0.2, trigger));

    let mut idx = 2;
    while idx + 1 < data.len() {
        let op = data[idx] % 5;
        let key = data[idx + 1];

        match op {
            0 => {
                // Memoize step: prune first, then insert
                if !table.contains(&key) {
                    if table.needs_prune() {
                        let before = table.len();
                        let removed = table.prune();
                        assert_eq!(table.len(), before - removed);
                    }
                    assert!(table.insert(key, u16::from(key) * 2));
                }
                assert_eq!(table.get(&key), Some(&(u16::from(key) * 2)));
            }
            1 => {
                // Duplicate inserts never replace
                let existing = table.get(&key).copied();
                let inserted = table.insert(key, 0);
                assert_eq!(inserted, existing.is_none());
                if let Some(value) = existing {
                    assert_eq!(table.get(&key), Some(&value));
                }
            }
            2 => {
                // Drop oldest
                let oldest = table.peek_oldest().map(|(k, _)| *k);
                let removed = table.drop_oldest(usize::from(key % 4));
                if removed > 0 {
                    if let Some(k) = oldest {
                        assert!(!table.contains(&k));
                    }
                }
            }
            3 => {
                // Iteration order matches len
                assert_eq!(table.iter().count(), table.len());
            }
            4 => {
                table.clear();
                assert!(table.is_empty());
            }
            _ => unreachable!(),
        }

        table.check_invariants().unwrap();
        idx += 2;
    }
});
