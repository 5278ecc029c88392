pub mod timer;

pub use timer::Timer;

/// Returns `(compressed / original, percentage saved)`; both are 0 for an empty original.
pub fn compression_ratio(original_size: u64, compressed_size: u64) -> (f64, f64) {
    if original_size == 0 {
        return (0.0, 0.0);
    }

    let ratio = compressed_size as f64 / original_size as f64;
    (ratio, (1.0 - ratio) * 100.0)
}

#[test]
fn test_compression_ratio() {
    assert_eq!(compression_ratio(0, 10), (0.0, 0.0));
    assert_eq!(compression_ratio(200, 50), (0.25, 75.0));
    assert_eq!(compression_ratio(10, 20), (2.0, -100.0));
}
