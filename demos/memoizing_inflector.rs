//! Maps wire header names to model field names through a memoizing inflector.
//!
//! Run with: `RUST_LOG=memokit=debug cargo run --example memoizing_inflector`

use std::sync::Arc;

use memokit::prelude::*;
use tracing_subscriber::EnvFilter;

const HEADERS: [&str; 8] = [
    "ContentType",
    "ContentLength",
    "UserAgent",
    "ETag",
    "ContentType",
    "CacheControl",
    "UserAgent",
    "XRequestId",
];

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Irregular names that the algorithm would get wrong.
    let precomputed = PreComputedInflector::new(Inflector)
        .with_snake([("ETag", "etag"), ("XRequestId", "x_request_id")])
        .mirrored();

    // Capacity 5 so the prune is visible with a handful of words.
    let inflector = MemoizingInflector::with_capacity(Arc::new(precomputed), 5);

    for header in HEADERS {
        let field = inflector.snake(header);
        let back = inflector.camel(&field);
        println!("{:<14} -> {:<16} -> {}", header, field, back);
    }

    println!();
    println!("memoized snake: {}", inflector.len("snake"));
    println!("memoized camel: {}", inflector.len("camel"));

    // Any named family of transforms works the same way.
    let mut transforms: TransformRegistry<String, usize, std::convert::Infallible> =
        TransformRegistry::new();
    transforms.register_transform("chars", |s: &String| -> Result<usize, std::convert::Infallible> {
        Ok(s.chars().count())
    });
    let mut cache = MemoizingCache::new(Arc::new(transforms), DEFAULT_CAPACITY);
    for header in HEADERS {
        let _ = cache.get("chars", header);
    }
    match cache.get("bytes", "ETag") {
        Ok(n) => println!("bytes: {}", n),
        Err(e) => println!("error: {}", e),
    }
    println!("distinct headers: {}", cache.len("chars"));
}
