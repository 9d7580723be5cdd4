//! Integration tests

mod lifecycle_test;
mod property_test;
mod sizing_test;
