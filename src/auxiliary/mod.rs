//! Helper items shared across the crate.

pub(crate) mod cache;
pub(crate) mod misc;
