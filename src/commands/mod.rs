pub mod bump_version;
pub mod notes;
pub mod release;
