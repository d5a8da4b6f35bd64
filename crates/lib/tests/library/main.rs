//! End-to-end tests of deplint-lib against deployment trees on disk.

mod compose_tests;
mod tree_tests;
