//! On-disk resolution cache
//!
//! Everything lives under a single cache root:
//!
//! | Path | Contents |
//! |------|----------|
//! | `locks/<key>` | JSON list of package identifiers resolved for one requirement set |
//! | `cache/<artifact>` | Artifacts downloaded by the package manager |
//! | `install/<package>/` | One isolated install directory per package |
//!
//! Lock keys are derived from the sorted requirement set, so the same
//! requirements in any order hit the same lock. Nothing here is ever
//! updated in place or deleted.

pub mod layout;
pub mod lockfile;

pub use layout::CacheLayout;
pub use lockfile::{lock_key, read_lock, write_lock};
