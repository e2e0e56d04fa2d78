//! The release pipeline, one module per stage, in run order.

pub mod version;
pub mod notes;
pub mod patch;
pub mod build;
pub mod package;
pub mod feed;
pub mod publish;
