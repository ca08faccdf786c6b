use persistent_rtree::{BoundingBox, Geometry, RTree, SplitterKind};
use persistent_rtree_int_test::test_util::{
    brute_force_nearest_distance, cleanup, create_test_context, create_test_context_with,
    random_entries, random_rect, run_test,
};

#[test]
fn test_nearest_is_ordered_and_first_is_global_nearest() {
    for kind in SplitterKind::ALL {
        run_test(
            || create_test_context_with(kind, 6),
            |ctx| {
                let mut rng = ctx.rng();
                let entries = random_entries(&mut rng, 700, 1000.0)?;
                let tree: RTree<usize, BoundingBox> = ctx.empty_tree().insert_all(entries.clone());

                for _ in 0..50 {
                    let query = random_rect(&mut rng, 1000.0, 5.0);
                    let mut nearest = tree.nearest(&query, 20, None);

                    let mut distances = Vec::new();
                    while let Some((entry, distance)) = nearest.next_with_distance() {
                        assert_eq!(distance, entry.geometry().distance(&query));
                        distances.push(distance);
                    }

                    assert_eq!(distances.len(), 20);
                    assert!(distances.windows(2).all(|w| w[0] <= w[1]), "{:?}", distances);
                    assert_eq!(Some(distances[0]), brute_force_nearest_distance(&entries, &query));
                }
                Ok(())
            },
            cleanup,
        );
    }
}

#[test]
fn test_nearest_k_matches_sorted_brute_force() {
    run_test(
        create_test_context,
        |ctx| {
            let mut rng = ctx.rng();
            let entries = random_entries(&mut rng, 500, 300.0)?;
            let tree: RTree<usize, BoundingBox> = ctx.empty_tree().insert_all(entries.clone());

            for _ in 0..20 {
                let query = random_rect(&mut rng, 300.0, 0.0);
                let mut expected: Vec<f64> = entries.iter().map(|e| e.geometry().distance(&query)).collect();
                expected.sort_by(f64::total_cmp);
                expected.truncate(10);

                let mut found = Vec::new();
                let mut nearest = tree.nearest(&query, 10, None);
                while let Some((_, distance)) = nearest.next_with_distance() {
                    found.push(distance);
                }
                assert_eq!(found, expected);
            }
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_nearest_respects_max_distance() {
    run_test(
        create_test_context,
        |ctx| {
            let mut rng = ctx.rng();
            let entries = random_entries(&mut rng, 500, 300.0)?;
            let tree: RTree<usize, BoundingBox> = ctx.empty_tree().insert_all(entries.clone());
            let query = BoundingBox::from_point(150.0, 150.0);

            let within = entries.iter().filter(|e| e.geometry().distance(&query) <= 20.0).count();
            let found: Vec<_> = tree.nearest(&query, entries.len(), Some(20.0)).collect();
            assert_eq!(found.len(), within);
            assert!(found.iter().all(|e| e.geometry().distance(&query) <= 20.0));

            // k still caps the result when more entries are in range
            let capped = tree.nearest(&query, 3, Some(20.0)).count();
            assert_eq!(capped, within.min(3));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_nearest_iter_yields_every_entry() {
    run_test(
        create_test_context,
        |ctx| {
            let entries = random_entries(&mut ctx.rng(), 250, 100.0)?;
            let tree: RTree<usize, BoundingBox> = ctx.empty_tree().insert_all(entries.clone());

            let query = BoundingBox::from_point(-10.0, -10.0);
            let mut all = tree.nearest_iter(&query);
            let mut count = 0;
            let mut last = 0.0;
            while let Some((_, distance)) = all.next_with_distance() {
                assert!(distance >= last);
                last = distance;
                count += 1;
            }
            assert_eq!(count, entries.len());
            assert_eq!(tree.nearest(&query, 0, None).count(), 0);
            Ok(())
        },
        cleanup,
    )
}
