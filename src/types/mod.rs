pub mod context;
pub mod notes;
pub mod version;

pub use context::ReleaseContext;
pub use notes::ReleaseNotes;
pub use version::{BuildNumber, MarketingVersion};
