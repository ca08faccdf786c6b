//! Insert, delete and bulk-load integration tests.
//!
//! Every test checks the tree's contents against the entry set it was
//! built from, and the tree's structure with the integrity checker.

mod bulk_load_test;
mod delete_test;
mod insert_test;
