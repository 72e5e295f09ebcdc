//! Structured observability hooks for memory and workflow lifecycle events.
//!
//! Emission functions for key events: compaction, export/import, workflow
//! start/finish and agent-to-agent messages. Workflow spans come from
//! `#[instrument]` on `Coordinator::orchestrate`.
//!
//! Events are emitted at `info!` level (filter with `RUST_LOG`).
//! For JSON output, initialise tracing with `init_tracing(true, ..)`.

use std::path::Path;

use tracing::{info, warn};

use crate::memory::retention::CompactionEvent;

/// Emit event: a compaction pass finished.
pub fn emit_compaction_finished(event: &CompactionEvent) {
    info!(
        event = "memory.compacted",
        entries_removed = event.entries_removed,
        before_size = event.before_size,
        after_size = event.after_size,
        reduction_percent = event.reduction_percent,
    );
}

/// Emit event: the bank was written to disk.
pub fn emit_memory_exported(path: &Path, entries: usize) {
    info!(event = "memory.exported", path = %path.display(), entries = entries);
}

/// Emit event: the bank was loaded from disk.
pub fn emit_memory_imported(path: &Path, entries: usize, merge: bool) {
    info!(
        event = "memory.imported",
        path = %path.display(),
        entries = entries,
        merge = merge,
    );
}

/// Emit event: export or import failed (warning level).
pub fn emit_persistence_error(operation: &str, path: &Path, error: &dyn std::fmt::Display) {
    warn!(
        event = "memory.persistence_error",
        operation = %operation,
        path = %path.display(),
        error = %error,
    );
}

/// Emit event: a coordinator workflow began.
pub fn emit_workflow_started(session_id: &str, location: &str, workflow_type: &str) {
    info!(
        event = "workflow.started",
        session_id = %session_id,
        location = %location,
        workflow_type = %workflow_type,
    );
}

/// Emit event: a coordinator workflow ended.
pub fn emit_workflow_finished(session_id: &str, status: &str, stages: usize, messages: usize) {
    info!(
        event = "workflow.finished",
        session_id = %session_id,
        status = %status,
        stages = stages,
        messages = messages,
    );
}

/// Emit event: an agent-to-agent message was queued.
pub fn emit_agent_message(sender: &str, receiver: &str, message_type: &str) {
    info!(
        event = "workflow.a2a_message",
        sender = %sender,
        receiver = %receiver,
        message_type = %message_type,
    );
}
