//! Multi-run driver (spec §4.4) and the `Rereplicator` entry point (spec §2).
//! Walks the `ContinuedAsNew` chain from `begin_run_id` to `end_run_id`,
//! invoking the single-run sender for each run with the correct per-run
//! event bounds, and re-anchors backward through `get_prev_run_id` when the
//! chain breaks before reaching `end_run_id`.

use std::{collections::HashSet, sync::Arc};

use crate::{
	codec,
	collaborators::{DestinationApplyClient, DomainCache, EventCodec, SourceHistoryClient},
	error::{RereplicatorError, RereplicatorResult},
	event::InternalDataBlob,
	fetcher::HistoryFetcher,
	ids::{DomainId, EventId, RunId, WorkflowId},
	range,
	sender::SingleRunSender,
};

/// Construction-time knobs. Resolves the Open Question in spec §9: the
/// driver's primary termination predicate is always "stop when the current
/// run has already been processed" (see [`Rereplicator::send_multi_workflow_history`]);
/// `max_backward_walk_iterations` is an independent, optional circuit
/// breaker on top of that.
#[derive(Debug, Clone, Copy)]
pub struct RereplicatorConfig {
	/// Page size used for every paginated fetch except the "peek at one
	/// event" call sites, which always use page size 1 regardless of this
	/// value.
	pub page_size: i32,
	/// If set, abort with `RereplicatorError::CorruptHistory` once the
	/// number of backward re-anchors in a single call exceeds this.
	pub max_backward_walk_iterations: Option<usize>,
}

impl Default for RereplicatorConfig {
	fn default() -> Self {
		RereplicatorConfig { page_size: 100, max_backward_walk_iterations: None }
	}
}

/// The single coordinating object. Constructed once with handles to its
/// collaborators and reused across invocations; holds no mutable
/// per-call state, so concurrent calls on unrelated workflows are safe
/// (spec §5).
pub struct Rereplicator<D, S, A, C> {
	domain_cache: Arc<D>,
	source_client: Arc<S>,
	apply_client: Arc<A>,
	codec: Arc<C>,
	config: RereplicatorConfig,
}

impl<D, S, A, C> Clone for Rereplicator<D, S, A, C> {
	fn clone(&self) -> Self {
		Rereplicator {
			domain_cache: self.domain_cache.clone(),
			source_client: self.source_client.clone(),
			apply_client: self.apply_client.clone(),
			codec: self.codec.clone(),
			config: self.config,
		}
	}
}

impl<D, S, A, C> Rereplicator<D, S, A, C>
where
	D: DomainCache,
	S: SourceHistoryClient,
	A: DestinationApplyClient,
	C: EventCodec,
{
	pub fn new(
		domain_cache: Arc<D>,
		source_client: Arc<S>,
		apply_client: Arc<A>,
		codec: Arc<C>,
		config: RereplicatorConfig,
	) -> Self {
		Rereplicator { domain_cache, source_client, apply_client, codec, config }
	}

	fn sender(&self) -> SingleRunSender<D, S, A, C> {
		let fetcher = HistoryFetcher::new(self.domain_cache.clone(), self.source_client.clone());
		SingleRunSender::new(fetcher, self.apply_client.clone(), self.codec.clone(), self.config.page_size)
	}

	fn fetcher(&self) -> HistoryFetcher<D, S> {
		HistoryFetcher::new(self.domain_cache.clone(), self.source_client.clone())
	}

	/// Sends a span of history, delimited by `(domain_id, workflow_id,
	/// begin_run_id, begin_event_id, end_run_id, end_event_id)` (spec §2).
	#[tracing::instrument(skip(self), fields(%begin_run_id, %begin_event_id, %end_run_id, %end_event_id))]
	pub async fn send_multi_workflow_history(
		&self,
		domain_id: &DomainId,
		workflow_id: &WorkflowId,
		begin_run_id: RunId,
		begin_event_id: EventId,
		end_run_id: RunId,
		end_event_id: EventId,
	) -> RereplicatorResult<()> {
		let sender = self.sender();
		let mut current_run_id = begin_run_id;
		let mut seen: HashSet<RunId> = HashSet::new();
		let mut backward_walks = 0usize;

		loop {
			// Explicit termination predicate resolving spec §9's open
			// question: once a run has already been processed, stop rather
			// than risk looping between a forward walk and a backward
			// re-anchor that keep handing each other the same run.
			if !seen.insert(current_run_id) {
				tracing::debug!(run_id = %current_run_id, "run already processed, stopping");
				return Ok(());
			}

			let (first_event_id, next_event_id) = range::event_id_range(
				&current_run_id,
				&begin_run_id,
				begin_event_id,
				&end_run_id,
				end_event_id,
			);

			let next_run_id = sender
				.send_single_workflow_history(
					domain_id,
					workflow_id,
					&current_run_id,
					first_event_id,
					next_event_id,
				)
				.await?;

			if current_run_id == end_run_id {
				return Ok(());
			}

			current_run_id = match next_run_id {
				Some(next_run_id) => next_run_id,
				None => {
					backward_walks += 1;
					if let Some(max) = self.config.max_backward_walk_iterations {
						if backward_walks > max {
							return Err(RereplicatorError::CorruptHistory(format!(
								"exceeded {max} backward re-anchor iterations without reaching run {end_run_id}"
							)));
						}
					}

					tracing::debug!(
						%current_run_id,
						%end_run_id,
						"chain broke before reaching end run, re-anchoring backward"
					);

					match self.get_prev_run_id(domain_id, workflow_id, &end_run_id).await? {
						Some(prev_run_id) => prev_run_id,
						None => return Ok(()),
					}
				}
			};
		}
	}

	/// Fetches the first batch only (page size 1, first event only) of
	/// `run_id` and reads `Started.continued_from_run_id`.
	#[tracing::instrument(skip(self), fields(%run_id))]
	async fn get_prev_run_id(
		&self,
		domain_id: &DomainId,
		workflow_id: &WorkflowId,
		run_id: &RunId,
	) -> RereplicatorResult<Option<RunId>> {
		let page = self.fetcher().fetch_first_event(domain_id, workflow_id, run_id).await?;

		let Some(first_batch) = page.history_batches.into_iter().next() else {
			return Ok(None);
		};

		let internal: InternalDataBlob = first_batch.try_into()?;
		let events = codec::deserialize_batch(self.codec.as_ref(), &internal)?;

		range::extract_prev_run_id(&events)
	}
}
