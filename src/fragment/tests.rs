//! Unit tests for the fragment protocol layer.
//!
//! Tests are split into focused submodules to keep each file short and easy
//! to navigate.

mod splitter_tests;
