//! Bundle Release - release automation for macOS application bundles
//!
//! This library bumps the marketing version and build number of an Xcode
//! project, builds it, packages the `.app` into a disk image, regenerates the
//! update feed and publishes everything to the hosting service.
//!
//! # Examples
//!
//! ## Computing the next version
//!
//! ```
//! use bundle_release::types::version::{BuildNumber, MarketingVersion};
//!
//! let current: MarketingVersion = "2.1.4".parse().unwrap();
//! assert_eq!(current.next_patch().unwrap().to_string(), "2.1.5");
//!
//! let build: BuildNumber = "87".parse().unwrap();
//! assert_eq!(build.next().unwrap().to_string(), "88");
//! ```
//!
//! ## Rendering release notes
//!
//! ```
//! use bundle_release::types::notes::ReleaseNotes;
//!
//! let notes = ReleaseNotes::new(vec!["Fix crash on launch".to_string()]);
//! assert_eq!(notes.to_markup(), "<ul>\n<li>Fix crash on launch</li>\n</ul>");
//! ```

pub mod commands;
pub mod config;
pub mod error;
pub mod stages;
pub mod types;
pub mod utils;

pub use commands::bump_version;
pub use commands::release;
pub use config::ReleaseConfig;
pub use error::ReleaseError;
pub use types::context::ReleaseContext;

pub type Result<T> = anyhow::Result<T>;
