//! End-to-end tests running real builds through the shell.

mod common;

mod build_tests;
mod run_tests;
