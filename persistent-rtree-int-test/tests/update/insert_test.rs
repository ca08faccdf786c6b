use persistent_rtree::{BoundingBox, Point, RTree, RTreeBuilder, SplitterKind};
use persistent_rtree_int_test::test_util::{
    assert_valid, cleanup, create_test_context, create_test_context_with, random_entries, run_test,
    sorted_values,
};

#[test]
fn test_five_points_split_once() {
    for kind in SplitterKind::ALL {
        run_test(
            || create_test_context_with(kind, 4),
            |ctx| {
                let mut tree: RTree<&str, Point> = ctx.empty_tree();
                let points = [("a", 0.0), ("b", 1.0), ("c", 2.0), ("d", 3.0), ("e", 10.0)];
                for (i, (name, c)) in points.iter().enumerate() {
                    tree = tree.add(*name, Point::new(*c, *c))?;
                    // the fifth insert overflows the root leaf
                    let expected_height = if i < 4 { 1 } else { 2 };
                    assert_eq!(tree.height(), expected_height);
                }

                assert_eq!(tree.size(), 5);
                assert_eq!(tree.stats().leaf_count, 2);
                assert_valid(&tree);

                let mut found: Vec<&str> = tree
                    .search_intersecting(&BoundingBox::new(0.0, 0.0, 3.0, 3.0))
                    .map(|e| *e.value())
                    .collect();
                found.sort_unstable();
                assert_eq!(found, vec!["a", "b", "c", "d"]);

                let nearest: Vec<&str> = tree
                    .nearest(&BoundingBox::from_point(0.0, 0.0), 1, None)
                    .map(|e| *e.value())
                    .collect();
                assert_eq!(nearest, vec!["a"]);
                Ok(())
            },
            cleanup,
        );
    }
}

#[test]
fn test_full_scan_returns_inserted_set() {
    for kind in SplitterKind::ALL {
        run_test(
            || create_test_context_with(kind, 6),
            |ctx| {
                let entries = random_entries(&mut ctx.rng(), 600, 1000.0)?;
                let tree: RTree<usize, BoundingBox> = ctx.empty_tree().insert_all(entries.clone());

                assert_eq!(tree.size(), entries.len());
                assert_eq!(sorted_values(tree.entries()), (0..entries.len()).collect::<Vec<_>>());
                assert_valid(&tree);
                Ok(())
            },
            cleanup,
        );
    }
}

#[test]
fn test_inserted_entry_found_by_intersects() {
    run_test(
        create_test_context,
        |ctx| {
            let entries = random_entries(&mut ctx.rng(), 300, 500.0)?;
            let tree: RTree<usize, BoundingBox> = ctx.empty_tree().insert_all(entries.clone());

            for entry in &entries {
                let found = tree
                    .search_intersecting(&entry.mbr())
                    .any(|e| e.value() == entry.value());
                assert!(found, "entry {} not found at {}", entry.value(), entry.mbr());
                assert!(tree.contains(entry));
            }
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_every_version_is_preserved() {
    run_test(
        create_test_context,
        |ctx| {
            let entries = random_entries(&mut ctx.rng(), 120, 100.0)?;
            let mut versions: Vec<RTree<usize, BoundingBox>> = vec![ctx.empty_tree()];
            for entry in &entries {
                let next = versions[versions.len() - 1].insert(entry.clone());
                versions.push(next);
            }

            for (i, version) in versions.iter().enumerate() {
                assert_eq!(version.size(), i);
                assert_eq!(sorted_values(version.entries()), (0..i).collect::<Vec<_>>());
            }
            assert_valid(&versions[versions.len() - 1]);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_mbr_covers_every_entry() {
    run_test(
        create_test_context,
        |ctx| {
            let entries = random_entries(&mut ctx.rng(), 200, 300.0)?;
            let tree: RTree<usize, BoundingBox> = ctx.empty_tree().insert_all(entries.clone());

            let mbr = tree.mbr().expect("non-empty tree has a bounding rectangle");
            let expected = BoundingBox::union_all(entries.iter().map(|e| e.mbr()));
            assert_eq!(Some(mbr), expected);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_builder_rejects_bad_configuration() {
    assert!(RTreeBuilder::new().max_children(3).create::<usize, Point>().is_err());
    assert!(RTreeBuilder::new()
        .max_children(8)
        .min_children(5)
        .create::<usize, Point>()
        .is_err());
    assert!(RTreeBuilder::new().splitter_name("greene").create::<usize, Point>().is_err());
    assert!(RTreeBuilder::new()
        .splitter_name("linear")
        .create::<usize, Point>()
        .is_ok());
}
