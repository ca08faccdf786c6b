use persistent_rtree::{BoundingBox, Entry, Point, RTree, SplitterKind};
use persistent_rtree_int_test::test_util::{
    assert_valid, cleanup, create_test_context, create_test_context_with, random_entries, run_test,
    sorted_values,
};
use rand::seq::SliceRandom;
use std::sync::Arc;

#[test]
fn test_delete_shrinks_by_one_and_removes_entry() {
    for kind in SplitterKind::ALL {
        run_test(
            || create_test_context_with(kind, 5),
            |ctx| {
                let entries = random_entries(&mut ctx.rng(), 250, 400.0)?;
                let tree: RTree<usize, BoundingBox> = ctx.empty_tree().insert_all(entries.clone());

                for entry in entries.iter().step_by(7) {
                    let next = tree.delete(entry);
                    assert_eq!(next.size(), tree.size() - 1);
                    assert!(!next.contains(entry));
                    assert!(next.search_intersecting(&entry.mbr()).all(|e| e.value() != entry.value()));
                    assert_valid(&next);

                    // the source version still holds it
                    assert!(tree.contains(entry));
                }
                Ok(())
            },
            cleanup,
        );
    }
}

#[test]
fn test_delete_absent_entry_is_noop() {
    run_test(
        create_test_context,
        |ctx| {
            let entries = random_entries(&mut ctx.rng(), 50, 100.0)?;
            let tree: RTree<usize, BoundingBox> = ctx.empty_tree().insert_all(entries.clone());

            // same rectangle, different value
            let absent = Entry::new(9999, *entries[3].geometry())?;
            let same = tree.delete(&absent);
            assert_eq!(same.size(), tree.size());
            assert!(Arc::ptr_eq(same.root().unwrap(), tree.root().unwrap()));

            let outside = Entry::new(0, BoundingBox::new(-50.0, -50.0, -40.0, -40.0))?;
            assert_eq!(tree.delete(&outside).size(), tree.size());

            let empty: RTree<usize, BoundingBox> = ctx.empty_tree();
            assert!(empty.delete(&outside).is_empty());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_delete_in_random_order_until_empty() {
    for kind in SplitterKind::ALL {
        run_test(
            || create_test_context_with(kind, 4),
            |ctx| {
                let mut rng = ctx.rng();
                let mut entries = random_entries(&mut rng, 200, 200.0)?;
                let mut tree: RTree<usize, BoundingBox> = ctx.empty_tree().insert_all(entries.clone());
                entries.shuffle(&mut rng);

                for (removed, entry) in entries.iter().enumerate() {
                    tree = tree.delete(entry);
                    assert_eq!(tree.size(), entries.len() - removed - 1);
                    if removed % 10 == 0 {
                        assert_valid(&tree);
                        let left = sorted_values(&entries[removed + 1..]);
                        assert_eq!(sorted_values(tree.entries()), left);
                    }
                }

                assert!(tree.is_empty());
                assert!(tree.root().is_none());
                assert_eq!(tree.height(), 0);
                Ok(())
            },
            cleanup,
        );
    }
}

#[test]
fn test_delete_all_and_delete_entries() {
    run_test(
        create_test_context,
        |ctx| {
            let duplicate = Entry::new(7, Point::new(1.0, 1.0))?;
            let others: Vec<Entry<usize, Point>> = (0..20)
                .map(|i| Entry::new(i + 100, Point::new(i as f64, 5.0)))
                .collect::<Result<_, _>>()?;

            let tree: RTree<usize, Point> = ctx
                .empty_tree()
                .insert_all(others.clone())
                .insert(duplicate.clone())
                .insert(duplicate.clone())
                .insert(duplicate.clone());
            assert_eq!(tree.size(), 23);

            // delete removes one occurrence at a time
            assert_eq!(tree.delete(&duplicate).size(), 22);
            assert!(tree.delete(&duplicate).contains(&duplicate));

            let without = tree.delete_all(&duplicate);
            assert_eq!(without.size(), 20);
            assert!(!without.contains(&duplicate));
            assert_valid(&without);

            let only_duplicates = tree.delete_entries(&others);
            assert_eq!(only_duplicates.size(), 3);
            assert!(only_duplicates.entries().all(|e| e == &duplicate));
            assert_valid(&only_duplicates);
            Ok(())
        },
        cleanup,
    )
}
