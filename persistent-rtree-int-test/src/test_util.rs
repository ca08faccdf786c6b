use log::{debug, info};
use persistent_rtree::{
    BoundingBox, Entry, Geometry, RTree, RTreeBuilder, RTreeConfig, SpatialResult, SplitterKind,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::backtrace::Backtrace;
use std::time::Instant;

/// Entry type used across the integration tests: a numbered rectangle.
pub type TestEntry = Entry<usize, BoundingBox>;

const DEFAULT_SEED: u64 = 0x5EED_1234;

/// Runs a test between a setup and a teardown step.
///
/// `after` runs even when `test` returns an error. Panics are caught so the
/// failure can be reported together with the context that produced it.
pub fn run_test<T, B, A>(before: B, test: T, after: A)
where
    T: Fn(TestContext) -> SpatialResult<()> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
    B: Fn() -> SpatialResult<TestContext> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
    A: Fn(TestContext) -> SpatialResult<()> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
{
    let start_time = Instant::now();

    let result = std::panic::catch_unwind(|| {
        let backtrace = Backtrace::capture();
        match before() {
            Ok(ctx) => match test(ctx.clone()) {
                Ok(_) => match after(ctx) {
                    Ok(_) => Ok(()),
                    Err(e) => Err((format!("After run failed: {:?}", e), backtrace.to_string())),
                },
                Err(e) => {
                    let _ = after(ctx);
                    Err((format!("Test failed: {:?}", e), backtrace.to_string()))
                }
            },
            Err(e) => Err((format!("Before run failed: {:?}", e), backtrace.to_string())),
        }
    });

    let elapsed = start_time.elapsed();

    let (error, backtrace) = match result {
        Ok(Ok(_)) => {
            debug!("test passed in {:?}", elapsed);
            return;
        }
        Ok(Err((e, bt))) => (e, bt),
        Err(panic_err) => {
            let err_msg = if let Some(s) = panic_err.downcast_ref::<&str>() {
                s.to_string()
            } else if let Some(s) = panic_err.downcast_ref::<String>() {
                s.clone()
            } else {
                "Unknown panic".to_string()
            };
            (format!("Panic: {}", err_msg), Backtrace::capture().to_string())
        }
    };

    eprintln!("\n==================== TEST FAILED ====================");
    eprintln!("Failed after {:?}", elapsed);
    eprintln!("Error: {}", error);
    if !backtrace.is_empty() && !backtrace.contains("disabled") {
        eprintln!("\nBacktrace:\n{}", backtrace);
    }
    eprintln!("=====================================================\n");

    panic!("Test failed: {}", error);
}

/// Configuration and random source shared by a single test.
#[derive(Clone)]
pub struct TestContext {
    config: RTreeConfig,
    seed: u64,
}

impl TestContext {
    pub fn new(config: RTreeConfig, seed: u64) -> Self {
        Self { config, seed }
    }

    pub fn config(&self) -> &RTreeConfig {
        &self.config
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// A fresh generator; every call replays the same sequence.
    pub fn rng(&self) -> StdRng {
        StdRng::seed_from_u64(self.seed)
    }

    pub fn empty_tree<V, G>(&self) -> RTree<V, G> {
        RTree::with_config(self.config.clone())
    }
}

pub fn create_test_context() -> SpatialResult<TestContext> {
    create_test_context_with(SplitterKind::Quadratic, 8)
}

pub fn create_test_context_with(
    splitter: SplitterKind,
    max_children: usize,
) -> SpatialResult<TestContext> {
    let config = RTreeBuilder::new()
        .max_children(max_children)
        .splitter(splitter)
        .build_config()?;
    Ok(TestContext::new(config, DEFAULT_SEED))
}

pub fn cleanup(ctx: TestContext) -> SpatialResult<()> {
    info!(
        "finished test with {} splitter, max_children={}, seed={:#x}",
        ctx.config().splitter(),
        ctx.config().max_children(),
        ctx.seed()
    );
    Ok(())
}

/// A rectangle with its lower corner in `[0, extent)` and sides below `max_side`.
pub fn random_rect(rng: &mut StdRng, extent: f64, max_side: f64) -> BoundingBox {
    let x = rng.gen::<f64>() * extent;
    let y = rng.gen::<f64>() * extent;
    let w = rng.gen::<f64>() * max_side;
    let h = rng.gen::<f64>() * max_side;
    BoundingBox::new(x, y, x + w, y + h)
}

/// `count` rectangles numbered `0..count`.
pub fn random_entries(rng: &mut StdRng, count: usize, extent: f64) -> SpatialResult<Vec<TestEntry>> {
    (0..count)
        .map(|i| Entry::new(i, random_rect(rng, extent, extent / 50.0)))
        .collect()
}

pub fn sorted_values<'a, I>(entries: I) -> Vec<usize>
where
    I: IntoIterator<Item = &'a TestEntry>,
{
    let mut values: Vec<usize> = entries.into_iter().map(|e| *e.value()).collect();
    values.sort_unstable();
    values
}

/// Values of the entries intersecting `rect`, found by a linear scan.
pub fn brute_force_intersecting(entries: &[TestEntry], rect: &BoundingBox) -> Vec<usize> {
    sorted_values(entries.iter().filter(|e| e.geometry().intersects(rect)))
}

/// Smallest distance from any entry to `query`, found by a linear scan.
pub fn brute_force_nearest_distance(entries: &[TestEntry], query: &BoundingBox) -> Option<f64> {
    entries
        .iter()
        .map(|e| e.geometry().distance(query))
        .min_by(f64::total_cmp)
}

/// Panics with the integrity report's findings if the tree is malformed.
pub fn assert_valid<V, G: Geometry>(tree: &RTree<V, G>) {
    let report = tree.check_integrity();
    assert!(
        report.is_valid,
        "tree of {} entries failed integrity check: {:?}",
        tree.size(),
        report.errors
    );
}
