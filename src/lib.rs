pub mod error;

pub mod memory;

pub mod engine;
pub mod trace;

pub mod config;
pub mod report;
