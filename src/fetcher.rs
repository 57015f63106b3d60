//! History fetcher (spec §4.2): paginated fetch of raw history for a single
//! `(run_id, [first_event_id, next_event_id))` range, carrying branch-token
//! and page-token state across calls.

use std::sync::Arc;

use crate::{
	collaborators::{DomainCache, GetHistoryRequest, GetHistoryResponse, SourceHistoryClient},
	error::{RereplicatorError, RereplicatorResult},
	ids::{DomainId, EventId, RunId, WorkflowId},
};

/// A direct call-through to the source-cluster RPC: resolves `domain_id ->
/// domain_name` via the domain cache, then forwards every other field
/// unchanged. Failure of either collaborator surfaces verbatim.
pub struct HistoryFetcher<D, S> {
	domain_cache: Arc<D>,
	source_client: Arc<S>,
}

impl<D, S> HistoryFetcher<D, S>
where
	D: DomainCache,
	S: SourceHistoryClient,
{
	pub fn new(domain_cache: Arc<D>, source_client: Arc<S>) -> Self {
		HistoryFetcher { domain_cache, source_client }
	}

	#[tracing::instrument(skip(self), fields(%run_id, %first_event_id, %next_event_id))]
	pub async fn fetch_page(
		&self,
		domain_id: &DomainId,
		workflow_id: &WorkflowId,
		run_id: &RunId,
		branch_token: Option<Vec<u8>>,
		first_event_id: EventId,
		next_event_id: EventId,
		page_token: Option<Vec<u8>>,
		page_size: i32,
	) -> RereplicatorResult<GetHistoryResponse> {
		let domain = self
			.domain_cache
			.get_domain(domain_id)
			.await
			.map_err(|_| RereplicatorError::DomainNotFound(*domain_id))?;

		tracing::debug!(domain_name = %domain.name, "fetching history page");

		let req = GetHistoryRequest {
			domain_name: domain.name,
			workflow_id: workflow_id.clone(),
			run_id: *run_id,
			branch_token,
			first_event_id,
			next_event_id,
			maximum_page_size: page_size,
			next_page_token: page_token,
		};

		self.source_client
			.get_workflow_execution_raw_history(req)
			.await
			.map_err(|err| RereplicatorError::Fetch(Box::new(err)))
	}

	/// The "peek at one event" idiom (spec §9): always `[FirstEventID,
	/// EndEventID)` with page size 1, regardless of the caller's configured
	/// page size, so the two call sites that need exactly one event can
	/// never accidentally widen the fetch.
	#[tracing::instrument(skip(self), fields(%run_id))]
	pub async fn fetch_first_event(
		&self,
		domain_id: &DomainId,
		workflow_id: &WorkflowId,
		run_id: &RunId,
	) -> RereplicatorResult<GetHistoryResponse> {
		self.fetch_page(
			domain_id,
			workflow_id,
			run_id,
			None,
			EventId::FIRST,
			EventId::END,
			None,
			1,
		)
		.await
	}
}
