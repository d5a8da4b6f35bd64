mod all_tests;
mod common;
mod compose_tests;
mod config_tests;
mod deployment_tests;
