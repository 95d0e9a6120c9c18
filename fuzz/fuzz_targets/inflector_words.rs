#![no_main]

use libfuzzer_sys::fuzz_target;
use memokit::inflector::{Inflect, Inflector};

// Fuzz the inflection algorithms with arbitrary UTF-8
//
// Neither conversion may panic, and both are idempotent on their own output
// for the shapes they produce.
fuzz_target!(|data: &[u8]| {
    let Ok(word) = std::str::from_utf8(data) else {
        return;
    };

    let snake = Inflector.snake(word);
    assert!(!snake.bytes().any(|b| b.is_ascii_uppercase()));

    let camel = Inflector.camel(word);
    assert!(!camel.contains(' '));
    assert!(!camel.contains('_'));
    assert!(!camel.contains('-'));
    assert_eq!(Inflector.camel(&camel), camel);
});
