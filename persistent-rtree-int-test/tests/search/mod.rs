//! Search integration tests, compared against brute-force scans.

mod filter_test;
mod nearest_test;
