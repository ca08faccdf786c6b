use persistent_rtree::{BoundingBox, RTree, RTreeBuilder, SplitterKind};
use persistent_rtree_int_test::test_util::{
    assert_valid, brute_force_intersecting, cleanup, create_test_context, create_test_context_with,
    random_entries, random_rect, run_test, sorted_values,
};

#[test]
fn test_bulk_load_matches_brute_force() {
    run_test(
        create_test_context,
        |ctx| {
            let mut rng = ctx.rng();
            let entries = random_entries(&mut rng, 2000, 1000.0)?;
            let tree: RTree<usize, BoundingBox> = RTreeBuilder::new()
                .max_children(ctx.config().max_children())
                .bulk_load(entries.clone())?;

            assert_eq!(tree.size(), entries.len());
            assert_valid(&tree);
            assert_eq!(sorted_values(tree.entries()), (0..entries.len()).collect::<Vec<_>>());

            for _ in 0..50 {
                let query = random_rect(&mut rng, 1000.0, 150.0);
                assert_eq!(
                    sorted_values(tree.search_intersecting(&query)),
                    brute_force_intersecting(&entries, &query)
                );
            }
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_bulk_loaded_tree_is_no_taller_than_inserted() {
    run_test(
        create_test_context,
        |ctx| {
            let entries = random_entries(&mut ctx.rng(), 1500, 800.0)?;
            let packed: RTree<usize, BoundingBox> = RTreeBuilder::new()
                .max_children(ctx.config().max_children())
                .loading_factor(1.0)
                .bulk_load(entries.clone())?;
            let inserted: RTree<usize, BoundingBox> = ctx.empty_tree().insert_all(entries);

            assert!(packed.height() <= inserted.height());
            assert!(packed.stats().average_leaf_fill() >= inserted.stats().average_leaf_fill());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_default_loading_factor_keeps_minimal_height() {
    for max_children in [10, 50] {
        run_test(
            || create_test_context_with(SplitterKind::Quadratic, max_children),
            |ctx| {
                let max = ctx.config().max_children();
                for n in [max, max + 1, max * max, max * max + 1] {
                    let entries = random_entries(&mut ctx.rng(), n, 1000.0)?;
                    let packed: RTree<usize, BoundingBox> =
                        RTreeBuilder::new().max_children(max).bulk_load(entries.clone())?;
                    let inserted: RTree<usize, BoundingBox> = ctx.empty_tree().insert_all(entries);

                    assert!(
                        packed.height() <= inserted.height(),
                        "max={} n={}: packed height {} inserted height {}",
                        max,
                        n,
                        packed.height(),
                        inserted.height()
                    );
                    assert_valid(&packed);
                }

                let one_node: RTree<usize, BoundingBox> = RTreeBuilder::new()
                    .max_children(max)
                    .bulk_load(random_entries(&mut ctx.rng(), max, 1000.0)?)?;
                assert_eq!(one_node.height(), 1);
                Ok(())
            },
            cleanup,
        );
    }
}

#[test]
fn test_bulk_loaded_tree_supports_updates() {
    run_test(
        create_test_context,
        |ctx| {
            let mut rng = ctx.rng();
            let entries = random_entries(&mut rng, 500, 300.0)?;
            let tree: RTree<usize, BoundingBox> = RTreeBuilder::new().bulk_load(entries.clone())?;

            let (kept, removed) = entries.split_at(entries.len() / 2);
            let shrunk = tree.delete_entries(removed);
            assert_eq!(shrunk.size(), kept.len());
            assert_valid(&shrunk);
            assert_eq!(sorted_values(shrunk.entries()), sorted_values(kept));

            let regrown = shrunk.insert_all(removed.iter().cloned());
            assert_eq!(regrown.size(), entries.len());
            assert_valid(&regrown);
            assert_eq!(sorted_values(regrown.entries()), sorted_values(&entries));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_bulk_load_empty_input() {
    let tree: RTree<usize, BoundingBox> = RTreeBuilder::new().bulk_load(Vec::new()).unwrap();
    assert!(tree.is_empty());
    assert_eq!(tree.height(), 0);
    assert!(tree.check_integrity().is_valid);
}
