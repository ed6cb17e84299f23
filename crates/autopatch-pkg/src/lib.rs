//! autopatch-pkg: Package manager abstraction
//!
//! Provides the `PackageManager` trait, the apt and yum adapters, host
//! distribution detection and the pending-update classifier.

pub mod apt;
pub mod classify;
pub mod distro;
pub mod error;
pub mod traits;
pub mod types;
pub mod yum;

pub use apt::AptManager;
pub use classify::{ClassifiedUpdates, FORBIDDEN_KEYWORDS, LineShape};
pub use distro::HostDistro;
pub use error::PackageError;
pub use traits::PackageManager;
pub use types::{DistroFamily, ExitStatus, PackageListing};
pub use yum::YumManager;
