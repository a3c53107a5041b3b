pub mod config;
pub mod logging;

pub mod cleanup;
pub mod engine;
pub mod fetch;
pub mod fs_util;
pub mod job;
pub mod merge;
pub mod merge_list;
pub mod playlist;
pub mod registry;
pub mod session;
