//! Campaign analytics engine.
//!
//! Rows exported from the campaign-monitoring sheet are folded into an
//! immutable [`Snapshot`] by [`aggregate`], and a [`SnapshotCache`] keeps the
//! latest snapshot available while a background [`RefreshLoop`] re-fetches
//! the source.
pub mod aggregate;
pub mod cache;
pub mod config;
pub mod error;
pub mod loader;
pub mod output;
pub mod reports;
pub mod rollup;
pub mod timeslot;
pub mod types;
pub mod util;

pub use aggregate::aggregate;
pub use cache::{CacheStatus, RefreshLoop, RefreshLoopHandle, SnapshotCache};
pub use config::DashboardConfig;
pub use error::{ConfigError, ExportError, FetchError};
pub use loader::{RowFetcher, SourceFetcher};
pub use types::{EntityRollup, Row, Snapshot};
