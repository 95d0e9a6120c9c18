#![no_main]

use std::convert::Infallible;
use std::sync::Arc;

use libfuzzer_sys::fuzz_target;
use memokit::memo::MemoizingCache;
use memokit::registry::TransformRegistry;

// Fuzz MemoizingCache against a direct evaluation of the same transforms
//
// Every get must match the transform applied directly, whatever the cache
// did before.
fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    let mut transforms: TransformRegistry<u16, u16, Infallible> = TransformRegistry::new();
    transforms.register_transform("double", |k: &u16| -> Result<u16, Infallible> {
        Ok(k.wrapping_mul(2))
    });
    transforms.register_transform("square", |k: &u16| -> Result<u16, Infallible> {
        Ok(k.wrapping_mul(*k))
    });

    let capacity = usize::from(data[0] % 16) + 1;
    let mut cache = MemoizingCache::new(Arc::new(transforms), capacity);

    for chunk in data[1..].chunks(2) {
        let key = u16::from(chunk[0]);
        match chunk.get(1).map_or(0, |b| b % 4) {
            0 => assert_eq!(cache.get("double", &key).unwrap(), key.wrapping_mul(2)),
            1 => assert_eq!(cache.get("square", &key).unwrap(), key.wrapping_mul(key)),
            2 => assert!(cache.get("cube", &key).is_err()),
            3 => {
                cache.clear_cache("double");
            }
            _ => unreachable!(),
        }
        cache.check_invariants().unwrap();
        assert!(cache.cache_names().all(|name| name == "double" || name == "square"));
    }
});
