use log::info;
use persistent_rtree::{BoundingBox, RTree, RTreeBuilder, SpatialResult};
use persistent_rtree_int_test::test_util::{create_test_context, random_entries, random_rect};

fn main() -> SpatialResult<()> {
    colog::init();
    info!("Starting stress test...");
    let ctx = create_test_context()?;
    let mut rng = ctx.rng();

    let count = 200_000;
    let entries = random_entries(&mut rng, count, 100_000.0)?;

    let start = std::time::Instant::now();
    let tree: RTree<usize, BoundingBox> = ctx.empty_tree().insert_all(entries.iter().cloned());
    info!("Inserted {} entries in {:?} ({})", count, start.elapsed(), tree);

    let start = std::time::Instant::now();
    let packed: RTree<usize, BoundingBox> = RTreeBuilder::new()
        .max_children(ctx.config().max_children())
        .bulk_load(entries.iter().cloned())?;
    info!("Bulk loaded {} entries in {:?} ({})", count, start.elapsed(), packed);

    let start = std::time::Instant::now();
    let mut hits = 0;
    for _ in 0..10_000 {
        let query = random_rect(&mut rng, 100_000.0, 1000.0);
        hits += tree.search_intersecting(&query).count();
    }
    info!("Ran 10000 searches in {:?}, {} hits", start.elapsed(), hits);

    let start = std::time::Instant::now();
    let mut found = 0;
    for _ in 0..10_000 {
        let query = random_rect(&mut rng, 100_000.0, 0.0);
        found += tree.nearest(&query, 10, None).count();
    }
    info!("Ran 10000 nearest queries in {:?}, {} results", start.elapsed(), found);

    let start = std::time::Instant::now();
    let shrunk = tree.delete_entries(entries.iter().step_by(2));
    info!("Deleted {} entries in {:?}", count - shrunk.size(), start.elapsed());

    let report = shrunk.check_integrity();
    info!(
        "Integrity: valid={}, nodes={}, entries={}, stats={:?}",
        report.is_valid,
        report.nodes_checked,
        report.entries_checked,
        shrunk.stats()
    );
    Ok(())
}
