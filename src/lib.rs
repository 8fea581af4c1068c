pub mod codec;
pub mod collision;
pub mod common;
pub mod config;
pub mod convert;
pub mod dedup;
pub mod error;
pub mod export;
pub mod grid;
pub mod image;
pub mod palette;
pub mod persist;
