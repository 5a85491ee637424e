mod loader_tests;
mod options_tests;
