pub mod end_to_end_tests;
pub mod endpoint_tests;
