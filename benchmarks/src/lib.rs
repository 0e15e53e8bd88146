//! Benchmark harness crate; the suites live in `benches/`.
