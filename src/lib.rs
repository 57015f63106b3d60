//! Client-side re-replication of cross-cluster workflow execution histories.
//!
//! When the passive side of a workflow detects that one or more history
//! events it needs are missing, it invokes [`Rereplicator::send_multi_workflow_history`]
//! to pull those events from the active cluster and re-apply them locally.
//! The hard part is the multi-run traversal: converting a pair of
//! `(run_id, event_id)` endpoints into an ordered series of paginated
//! history fetches and re-application requests, correctly handling the
//! `ContinuedAsNew` chain that links successive workflow runs.
//!
//! This crate does not implement its collaborators (domain cache,
//! source-cluster history RPC, destination-cluster apply RPC, event codec —
//! see [`collaborators`]); the host process wires in concrete backends.
//! Logging, metrics, cluster-membership discovery, and retry policy are
//! likewise the caller's responsibility.

pub mod codec;
pub mod collaborators;
pub mod driver;
pub mod error;
pub mod event;
pub mod fetcher;
pub mod ids;
pub mod range;
pub mod sender;

pub use collaborators::{
	ApplyRequest, DestinationApplyClient, DomainCache, DomainMetadata, EventCodec,
	GetHistoryRequest, GetHistoryResponse, SourceHistoryClient,
};
pub use driver::{Rereplicator, RereplicatorConfig};
pub use error::{BoxError, RereplicatorError, RereplicatorResult};
pub use event::{
	ENCODING_COLUMNAR_BINARY, EventType, ExternalDataBlob, ExternalReplicationInfo, HistoryEvent,
	InternalDataBlob, InternalReplicationInfo, ReplicationInfoEntry,
};
pub use fetcher::HistoryFetcher;
pub use ids::{DomainId, DomainName, EventId, RunId, WorkflowId};
pub use sender::SingleRunSender;
