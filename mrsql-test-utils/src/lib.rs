use std::sync::Once;

use mrsql_plan::{Mapper, Reducer};

static TRACING: Once = Once::new();

/// Default filter when `RUST_LOG` is unset or unparsable: quiet, except for
/// the per-line skip warnings the reducers emit.
const DEFAULT_TEST_FILTER: &str = "warn";

/// Install a test-writer subscriber once per test binary.
///
/// Output goes through libtest's capture, so it only shows for failing tests
/// or under `--nocapture`.
pub fn init_tracing_for_tests() {
    TRACING.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_TEST_FILTER));
        // Another crate in the same binary may already own the global subscriber.
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_test_writer()
            .try_init();
    });
}

/// Feed `input` through a mapper and collect its output lines.
pub fn map_all(mapper: &mut dyn Mapper, input: &[&str]) -> Vec<String> {
    let mut out = Vec::new();
    for line in input {
        mapper.map_line(line, &mut out).expect("map line");
    }
    mapper.finish(&mut out).expect("finish mapper");
    into_lines(out)
}

/// Feed `input` through a reducer, finish it, and collect its output lines.
pub fn reduce_all(reducer: &mut dyn Reducer, input: &[&str]) -> Vec<String> {
    let mut out = Vec::new();
    for line in input {
        reducer.reduce_line(line, &mut out).expect("reduce line");
    }
    reducer.finish(&mut out).expect("finish reducer");
    into_lines(out)
}

/// Stable sort of `key<TAB>value` lines by key, standing in for the shuffle.
pub fn shuffle(mut lines: Vec<String>) -> Vec<String> {
    lines.sort_by(|a, b| key_of(a).cmp(key_of(b)));
    lines
}

fn key_of(line: &str) -> &str {
    line.split_once('\t').map_or(line, |(key, _)| key)
}

fn into_lines(buf: Vec<u8>) -> Vec<String> {
    String::from_utf8(buf)
        .expect("utf-8 output")
        .lines()
        .map(str::to_string)
        .collect()
}

/// With the `auto-init` feature, tracing is installed before any test runs.
#[cfg(feature = "auto-init")]
#[ctor::ctor]
fn install_tracing_at_startup() {
    init_tracing_for_tests();
}
