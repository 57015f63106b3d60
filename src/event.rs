//! Wire shapes that cross the external (source-cluster) / internal
//! (destination-cluster) boundary, and the event view the traversal inspects.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::ids::{EventId, RunId};

/// Wire tag identifying the encoding of a [`ExternalDataBlob`] / [`InternalDataBlob`]
/// payload. Only [`ENCODING_COLUMNAR_BINARY`] is currently recognized; anything
/// else must be rejected with `RereplicatorError::Encoding` at the boundary.
pub const ENCODING_COLUMNAR_BINARY: i32 = 1;

/// A history batch as handed back by the source-cluster RPC. Opaque to the
/// traversal except for the two event types it cares about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalDataBlob {
	pub encoding_type: i32,
	pub data: Vec<u8>,
}

/// The same batch, in the shape the destination-cluster applier expects.
/// Structurally identical to [`ExternalDataBlob`] but kept as a distinct type
/// so a value's origin is visible at every call site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InternalDataBlob {
	pub encoding_type: i32,
	pub data: Vec<u8>,
}

/// Per-cluster `(version, last_event_id)` vector. Opaque to traversal, just
/// forwarded with every apply request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplicationInfoEntry {
	pub version: i64,
	pub last_event_id: EventId,
}

pub type ExternalReplicationInfo = HashMap<String, ReplicationInfoEntry>;
pub type InternalReplicationInfo = HashMap<String, ReplicationInfoEntry>;

/// The two event types the traversal depends on; everything else is opaque.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventType {
	/// Always the first event of a run. `continued_from_run_id` is set when
	/// this run was spawned by a `ContinuedAsNew` on a prior run.
	WorkflowExecutionStarted { continued_from_run_id: Option<RunId> },
	/// Always the last event of a run when it transitions into a fresh run.
	WorkflowExecutionContinuedAsNew { new_execution_run_id: RunId },
	/// Any other event type, opaque to the re-replicator. Carries the raw
	/// wire type so round-tripping through a codec preserves it.
	Other(i32),
}

/// An ordered record within a run, identified by `(RunId, EventId)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEvent {
	pub event_id: EventId,
	pub event_type: EventType,
}

impl HistoryEvent {
	pub fn continued_as_new_run_id(&self) -> Option<RunId> {
		match &self.event_type {
			EventType::WorkflowExecutionContinuedAsNew { new_execution_run_id } => {
				Some(*new_execution_run_id)
			}
			_ => None,
		}
	}

	pub fn continued_from_run_id(&self) -> Option<RunId> {
		match &self.event_type {
			EventType::WorkflowExecutionStarted { continued_from_run_id } => *continued_from_run_id,
			_ => None,
		}
	}
}
