//! Block audit: named areas, actor attribution and the background audit log.

pub mod area;
pub mod area_file;
pub mod attribution;
pub mod auditor;
pub mod entry;
pub mod logger;
pub mod registry;

use std::time::{SystemTime, UNIX_EPOCH};

pub use area::Area;
pub use area_file::{AreaDocument, AreaFileError, LoadedAreas};
pub use attribution::{AttributionKind, BlockAction};
pub use auditor::{BlockAuditor, PendingAudit};
pub use entry::AuditEntry;
pub use logger::{AuditLogger, LogHandle, LogPaths};
pub use registry::AreaRegistry;

/// Wall-clock milliseconds since the Unix epoch.
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
