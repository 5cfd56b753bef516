#![cfg(test)]

pub mod common;
pub mod plugin_config_tests;
pub mod renderer_tests;
