pub mod benchmarks;
pub mod command;
pub mod config;
pub mod managers;
pub mod path_utils;
pub mod system_info;
