//! Property-based tests for the ConnTree core library

mod command_tests;
mod drop_tests;
mod feed_tests;
mod lifecycle_tests;
mod snapshot_tests;
mod translator_tests;
