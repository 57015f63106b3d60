//! Single-run sender (spec §4.3): drives fetch-then-apply for one run
//! end-to-end, detects `ContinuedAsNew` at the tail, attaches the first
//! batch of the next run when required, and returns the next run's id.

use std::sync::Arc;

use crate::{
	collaborators::{
		ApplyRequest, DestinationApplyClient, DomainCache, EventCodec, SourceHistoryClient,
	},
	error::{RereplicatorError, RereplicatorResult},
	event::{HistoryEvent, InternalDataBlob, InternalReplicationInfo},
	codec,
	fetcher::HistoryFetcher,
	ids::{DomainId, EventId, RunId, WorkflowId},
	range,
};

/// Builds an apply request with `new_run_history = None`; the single-run
/// sender patches that in as needed (spec §4.5).
pub fn build_raw_request(
	domain_id: DomainId,
	workflow_id: WorkflowId,
	run_id: RunId,
	history: InternalDataBlob,
	event_store_version: i32,
	replication_info: InternalReplicationInfo,
) -> ApplyRequest {
	ApplyRequest {
		domain_id,
		workflow_id,
		run_id,
		history,
		replication_info,
		event_store_version,
		new_run_history: None,
		new_run_event_store_version: None,
	}
}

/// Forwards to the destination applier RPC, tolerating a nil request as a
/// no-op (spec §4.5, §7).
pub async fn send_raw_request<A>(
	apply_client: &A,
	request: Option<ApplyRequest>,
) -> RereplicatorResult<()>
where
	A: DestinationApplyClient,
{
	let Some(request) = request else {
		return Ok(());
	};

	apply_client
		.replicate_raw_events(request)
		.await
		.map_err(|err| RereplicatorError::Apply(Box::new(err)))
}

/// An apply request held one iteration behind the fetch loop, along with the
/// last event of the batch it carries, so the sender can decorate the final
/// request of the run without re-parsing history (spec §4.3's "one-step
/// lag").
struct PendingRequest {
	request: ApplyRequest,
	last_event: HistoryEvent,
}

pub struct SingleRunSender<D, S, A, C> {
	fetcher: HistoryFetcher<D, S>,
	apply_client: Arc<A>,
	codec: Arc<C>,
	page_size: i32,
}

impl<D, S, A, C> SingleRunSender<D, S, A, C>
where
	D: DomainCache,
	S: SourceHistoryClient,
	A: DestinationApplyClient,
	C: EventCodec,
{
	pub fn new(fetcher: HistoryFetcher<D, S>, apply_client: Arc<A>, codec: Arc<C>, page_size: i32) -> Self {
		SingleRunSender { fetcher, apply_client, codec, page_size }
	}

	/// Iteratively pages through the history of one run and applies each
	/// batch to the destination cluster. Returns the successor run's id if
	/// the run ended in `ContinuedAsNew`.
	#[tracing::instrument(skip(self), fields(%run_id, %first_event_id, %next_event_id))]
	pub async fn send_single_workflow_history(
		&self,
		domain_id: &DomainId,
		workflow_id: &WorkflowId,
		run_id: &RunId,
		first_event_id: EventId,
		next_event_id: EventId,
	) -> RereplicatorResult<Option<RunId>> {
		let mut branch_token: Option<Vec<u8>> = None;
		let mut page_token: Option<Vec<u8>> = None;
		let mut pending: Option<PendingRequest> = None;

		loop {
			let page = self
				.fetcher
				.fetch_page(
					domain_id,
					workflow_id,
					run_id,
					branch_token.clone(),
					first_event_id,
					next_event_id,
					page_token.clone(),
					self.page_size,
				)
				.await?;

			branch_token = Some(page.branch_token);

			for batch in page.history_batches {
				let internal: InternalDataBlob = batch.try_into()?;
				let events = codec::deserialize_batch(self.codec.as_ref(), &internal)?;
				let Some(last_event) = events.into_iter().last() else {
					continue;
				};

				// Send the request held from the previous iteration first.
				if let Some(prev) = pending.take() {
					self.send_pending(prev).await?;
				}

				let request = build_raw_request(
					*domain_id,
					workflow_id.clone(),
					*run_id,
					internal,
					page.event_store_version,
					codec::external_replication_info_to_internal(page.replication_info.clone()),
				);

				pending = Some(PendingRequest { request, last_event });
			}

			match page.next_page_token {
				Some(token) if !token.is_empty() => page_token = Some(token),
				_ => break,
			}
		}

		let Some(mut last) = pending else {
			return Ok(None);
		};

		let next_run_id = range::extract_next_run_id(std::slice::from_ref(&last.last_event));

		if let Some(next_run_id) = next_run_id {
			let first_page = self
				.fetcher
				.fetch_first_event(domain_id, workflow_id, &next_run_id)
				.await?;

			let Some(first_batch) = first_page.history_batches.into_iter().next() else {
				return Err(RereplicatorError::CorruptHistory(format!(
					"expected a first batch for run {next_run_id}, got none"
				)));
			};

			let internal_first: InternalDataBlob = first_batch.try_into()?;
			let first_events = codec::deserialize_batch(self.codec.as_ref(), &internal_first)?;
			range::ensure_started(&first_events)?;

			last.request.new_run_history = Some(internal_first);
			last.request.new_run_event_store_version = Some(first_page.event_store_version);

			tracing::debug!(%next_run_id, "attaching first batch of continued run");
		}

		self.send_pending(last).await?;

		Ok(next_run_id)
	}

	async fn send_pending(&self, pending: PendingRequest) -> RereplicatorResult<()> {
		send_raw_request(self.apply_client.as_ref(), Some(pending.request)).await
	}
}
