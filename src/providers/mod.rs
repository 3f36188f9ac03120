//! Result fetcher implementations

pub mod spaceserp;

pub use spaceserp::SpaceSerpProvider;
