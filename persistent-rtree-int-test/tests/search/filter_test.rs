use persistent_rtree::{
    BoundingBox, Circle, Entry, Geometry, NearFilter, PredicateFilter, RTree, SplitterKind,
};
use persistent_rtree_int_test::test_util::{
    brute_force_intersecting, cleanup, create_test_context, create_test_context_with,
    random_entries, random_rect, run_test, sorted_values,
};

#[test]
fn test_intersects_matches_brute_force() {
    for kind in SplitterKind::ALL {
        run_test(
            || create_test_context_with(kind, 8),
            |ctx| {
                let mut rng = ctx.rng();
                let entries = random_entries(&mut rng, 1000, 1000.0)?;
                let tree: RTree<usize, BoundingBox> = ctx.empty_tree().insert_all(entries.clone());

                for _ in 0..100 {
                    let query = random_rect(&mut rng, 1000.0, 200.0);
                    assert_eq!(
                        sorted_values(tree.search_intersecting(&query)),
                        brute_force_intersecting(&entries, &query),
                        "query {}",
                        query
                    );
                }
                Ok(())
            },
            cleanup,
        );
    }
}

#[test]
fn test_contained_and_distance_match_brute_force() {
    run_test(
        create_test_context,
        |ctx| {
            let mut rng = ctx.rng();
            let entries = random_entries(&mut rng, 800, 500.0)?;
            let tree: RTree<usize, BoundingBox> = ctx.empty_tree().insert_all(entries.clone());

            for _ in 0..50 {
                let query = random_rect(&mut rng, 500.0, 120.0);

                let expected = sorted_values(entries.iter().filter(|e| query.contains(&e.mbr())));
                assert_eq!(sorted_values(tree.search_contained(&query)), expected);

                let expected = sorted_values(
                    entries
                        .iter()
                        .filter(|e| e.geometry().distance(&query) <= 15.0),
                );
                assert_eq!(sorted_values(tree.search_within_distance(&query, 15.0)), expected);
            }
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_refinement_drops_bounding_box_false_positives() {
    run_test(
        create_test_context,
        |ctx| {
            let tree: RTree<&str, Circle> = ctx
                .empty_tree()
                .add("unit", Circle::new(0.0, 0.0, 1.0))?
                .add("far", Circle::new(10.0, 10.0, 1.0))?;

            // inside the unit circle's bounding square, outside the circle
            let corner = BoundingBox::new(0.8, 0.8, 1.0, 1.0);
            assert_eq!(tree.search_intersecting(&corner).count(), 0);

            let edge = BoundingBox::new(0.5, -0.1, 0.9, 0.1);
            let hits: Vec<&str> = tree.search_intersecting(&edge).map(|e| *e.value()).collect();
            assert_eq!(hits, vec!["unit"]);

            // the circle's edge is sqrt(2) - 1 away from (1, 1)
            let near = NearFilter::around_point(1.0, 1.0, 0.5);
            let hits: Vec<&str> = tree.search(near).map(|e| *e.value()).collect();
            assert_eq!(hits, vec!["unit"]);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_predicate_filter() {
    run_test(
        create_test_context,
        |ctx| {
            let entries = random_entries(&mut ctx.rng(), 400, 400.0)?;
            let tree: RTree<usize, BoundingBox> = ctx.empty_tree().insert_all(entries.clone());

            let left_of = |g: &dyn Geometry| g.mbr().min_x <= 100.0;
            let expected = sorted_values(entries.iter().filter(|e| left_of(e.geometry())));
            assert_eq!(sorted_values(tree.search(PredicateFilter::new(left_of))), expected);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_search_is_lazy_and_resumable() {
    run_test(
        create_test_context,
        |ctx| {
            let entries = random_entries(&mut ctx.rng(), 300, 100.0)?;
            let tree: RTree<usize, BoundingBox> = ctx.empty_tree().insert_all(entries.clone());
            let everything = BoundingBox::new(-1.0, -1.0, 200.0, 200.0);

            let mut search = tree.search_intersecting(&everything);
            let head: Vec<usize> = search.by_ref().take(10).map(|e| *e.value()).collect();
            let tail: Vec<usize> = search.map(|e| *e.value()).collect();
            assert_eq!(head.len(), 10);
            assert_eq!(head.len() + tail.len(), entries.len());

            // a newer version does not disturb a search over the old one
            let mut search = tree.entries();
            let first = search.next().map(|e| *e.value());
            let newer = tree.insert(Entry::new(1000, BoundingBox::new(0.0, 0.0, 1.0, 1.0))?);
            assert_eq!(search.count() + 1, entries.len());
            assert_eq!(newer.size(), entries.len() + 1);
            assert!(first.is_some());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_search_empty_tree() {
    let tree: RTree<usize, BoundingBox> = RTree::new();
    assert_eq!(tree.search_intersecting(&BoundingBox::new(0.0, 0.0, 1.0, 1.0)).count(), 0);
    assert_eq!(tree.nearest_iter(&BoundingBox::from_point(0.0, 0.0)).count(), 0);
}
