//! Background worker for every disk write: audit log appends and area-file
//! saves.
//!
//! Tasks run strictly in submission order on one thread, which keeps the JSONL
//! and text logs line-aligned. Submitting never blocks: a full queue drops the
//! task with a warning.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, SyncSender, TrySendError};
use std::thread::{self, JoinHandle};

use tracing::{debug, info, warn};

use crate::area_file::AreaDocument;
use crate::auditor::PendingAudit;
use crate::entry::AuditEntry;

pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// Where the worker writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogPaths {
    pub area_file: PathBuf,
    pub jsonl_log: PathBuf,
    pub text_log: PathBuf,
}

impl LogPaths {
    pub fn in_dir(dir: &Path, area_file: &str, jsonl_log: &str, text_log: &str) -> Self {
        Self {
            area_file: dir.join(area_file),
            jsonl_log: dir.join(jsonl_log),
            text_log: dir.join(text_log),
        }
    }
}

/// Work items for the log worker.
pub enum LogTask {
    /// Score the captured candidates, then append one entry per area.
    Resolve(PendingAudit),
    EnsureLogFiles,
    SaveAreas(AreaDocument),
    /// Acknowledged once every earlier task has run.
    Flush(mpsc::Sender<()>),
    Shutdown,
}

impl LogTask {
    fn label(&self) -> &'static str {
        match self {
            LogTask::Resolve(_) => "resolve",
            LogTask::EnsureLogFiles => "ensure-log-files",
            LogTask::SaveAreas(_) => "save-areas",
            LogTask::Flush(_) => "flush",
            LogTask::Shutdown => "shutdown",
        }
    }
}

// ─── Handle ──────────────────────────────────────────────────────────────────

/// Cheap, cloneable submitter for the log worker.
#[derive(Clone)]
pub struct LogHandle {
    tx: SyncSender<LogTask>,
}

impl LogHandle {
    /// A handle with no worker behind it; every submission is discarded.
    pub fn detached() -> Self {
        let (handle, _rx) = Self::channel(1);
        handle
    }

    pub(crate) fn channel(capacity: usize) -> (Self, Receiver<LogTask>) {
        let (tx, rx) = mpsc::sync_channel(capacity.max(1));
        (Self { tx }, rx)
    }

    /// Queue a task without blocking. Returns false if it was dropped.
    pub fn submit(&self, task: LogTask) -> bool {
        match self.tx.try_send(task) {
            Ok(()) => true,
            Err(TrySendError::Full(task)) => {
                warn!("Audit log queue full, dropping {} task", task.label());
                false
            }
            Err(TrySendError::Disconnected(task)) => {
                debug!("No audit log worker, dropping {} task", task.label());
                false
            }
        }
    }

    pub fn resolve(&self, pending: PendingAudit) -> bool {
        self.submit(LogTask::Resolve(pending))
    }

    pub fn ensure_log_files(&self) -> bool {
        self.submit(LogTask::EnsureLogFiles)
    }

    pub fn save_areas(&self, doc: AreaDocument) -> bool {
        self.submit(LogTask::SaveAreas(doc))
    }

    /// Block until every task submitted before this call has run.
    /// Returns false when there is no live worker.
    pub fn flush(&self) -> bool {
        let (ack_tx, ack_rx) = mpsc::channel();
        if self.tx.send(LogTask::Flush(ack_tx)).is_err() {
            return false;
        }
        ack_rx.recv().is_ok()
    }
}

// ─── Worker ──────────────────────────────────────────────────────────────────

/// Owns the worker thread. Dropping it drains the queue and joins the thread.
pub struct AuditLogger {
    handle: LogHandle,
    paths: LogPaths,
    thread: Option<JoinHandle<()>>,
}

impl AuditLogger {
    pub fn spawn(paths: LogPaths, queue_capacity: usize) -> io::Result<Self> {
        let (handle, rx) = LogHandle::channel(queue_capacity);
        let worker_paths = paths.clone();
        let thread = thread::Builder::new()
            .name("hlog-audit-log".into())
            .spawn(move || run(worker_paths, rx))?;
        info!(
            "Audit log worker started (queue capacity {})",
            queue_capacity.max(1)
        );
        Ok(Self {
            handle,
            paths,
            thread: Some(thread),
        })
    }

    pub fn handle(&self) -> LogHandle {
        self.handle.clone()
    }

    pub fn paths(&self) -> &LogPaths {
        &self.paths
    }

    /// Run everything already queued, then stop the worker.
    pub fn shutdown(&mut self) {
        let Some(thread) = self.thread.take() else {
            return;
        };
        // Blocking send: the worker is draining, so this only waits for room.
        if self.handle.tx.send(LogTask::Shutdown).is_err() {
            debug!("Audit log worker already gone");
        }
        if thread.join().is_err() {
            warn!("Audit log worker panicked");
        }
    }
}

impl Drop for AuditLogger {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run(paths: LogPaths, rx: Receiver<LogTask>) {
    for task in rx {
        match task {
            LogTask::Resolve(pending) => {
                for entry in pending.resolve() {
                    append_entry(&paths, &entry);
                }
            }
            LogTask::EnsureLogFiles => ensure_log_files(&paths),
            LogTask::SaveAreas(doc) => {
                if let Err(e) = doc.save(&paths.area_file) {
                    warn!(
                        "Failed to save audit areas to {}: {e}",
                        paths.area_file.display()
                    );
                }
            }
            LogTask::Flush(ack) => {
                let _ = ack.send(());
            }
            LogTask::Shutdown => break,
        }
    }
    debug!("Audit log worker stopped");
}

fn append_entry(paths: &LogPaths, entry: &AuditEntry) {
    append_line(&paths.jsonl_log, &entry.to_json_line());
    append_line(&paths.text_log, &entry.text_line());
}

fn append_line(path: &Path, line: &str) {
    let result = create_parent(path).and_then(|()| {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "{line}")
    });
    if let Err(e) = result {
        warn!("Failed to append audit log {}: {e}", path.display());
    }
}

fn ensure_log_files(paths: &LogPaths) {
    for path in [&paths.jsonl_log, &paths.text_log] {
        let result = create_parent(path).and_then(|()| {
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map(drop)
        });
        if let Err(e) = result {
            warn!("Failed to create audit log {}: {e}", path.display());
        }
    }
}

fn create_parent(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => fs::create_dir_all(dir),
        _ => Ok(()),
    }
}
