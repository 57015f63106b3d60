//! Interfaces the re-replicator consumes but does not implement (spec §6).
//! The host process wires in concrete backends (gRPC client, domain cache,
//! event codec); this crate only depends on these trait boundaries.

use async_trait::async_trait;

use crate::{
	event::{ExternalDataBlob, ExternalReplicationInfo, HistoryEvent, InternalDataBlob},
	ids::{DomainId, DomainName, EventId, RunId, WorkflowId},
};

/// `domainID -> domainName` resolution, backed by a cache in front of the
/// metadata store. Opaque beyond the name: the source-cluster RPC schema
/// keys on name, everything else in this crate keys on [`DomainId`].
#[async_trait]
pub trait DomainCache: Send + Sync {
	type Error: std::error::Error + Send + Sync + 'static;

	async fn get_domain(&self, domain_id: &DomainId) -> Result<DomainMetadata, Self::Error>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainMetadata {
	pub name: DomainName,
}

/// One page of the half-open `[first_event_id, next_event_id)` interval.
#[derive(Debug, Clone)]
pub struct GetHistoryRequest {
	pub domain_name: DomainName,
	pub workflow_id: WorkflowId,
	pub run_id: RunId,
	pub branch_token: Option<Vec<u8>>,
	pub first_event_id: EventId,
	pub next_event_id: EventId,
	pub maximum_page_size: i32,
	pub next_page_token: Option<Vec<u8>>,
}

#[derive(Debug, Clone)]
pub struct GetHistoryResponse {
	/// Echoed back by the caller on the next page request for this run.
	pub branch_token: Vec<u8>,
	pub history_batches: Vec<ExternalDataBlob>,
	/// Empty/`None` signals end-of-stream.
	pub next_page_token: Option<Vec<u8>>,
	pub replication_info: ExternalReplicationInfo,
	pub event_store_version: i32,
}

/// Direct call-through to the source cluster's raw-history RPC.
#[async_trait]
pub trait SourceHistoryClient: Send + Sync {
	type Error: std::error::Error + Send + Sync + 'static;

	async fn get_workflow_execution_raw_history(
		&self,
		req: GetHistoryRequest,
	) -> Result<GetHistoryResponse, Self::Error>;
}

#[derive(Debug, Clone)]
pub struct ApplyRequest {
	pub domain_id: DomainId,
	pub workflow_id: WorkflowId,
	pub run_id: RunId,
	pub history: InternalDataBlob,
	pub replication_info: crate::event::InternalReplicationInfo,
	pub event_store_version: i32,
	/// At most the first batch (the `Started` event) of the successor run,
	/// attached only to the last request emitted for a run that ends in
	/// `ContinuedAsNew`.
	pub new_run_history: Option<InternalDataBlob>,
	pub new_run_event_store_version: Option<i32>,
}

/// Idempotent on `(domain_id, workflow_id, run_id, history.events)`.
#[async_trait]
pub trait DestinationApplyClient: Send + Sync {
	type Error: std::error::Error + Send + Sync + 'static;

	async fn replicate_raw_events(&self, req: ApplyRequest) -> Result<(), Self::Error>;
}

/// Pure, stateless conversion between the external and internal blob
/// representations, and the means to peek inside a batch.
pub trait EventCodec: Send + Sync {
	type Error: std::error::Error + Send + Sync + 'static;

	fn deserialize_batch_events(
		&self,
		blob: &InternalDataBlob,
	) -> Result<Vec<HistoryEvent>, Self::Error>;

	fn serialize_batch_events(
		&self,
		events: &[HistoryEvent],
		encoding_type: i32,
	) -> Result<InternalDataBlob, Self::Error>;
}
