//! Range & ID utilities (spec §4.4, §4.5): deriving the per-run
//! `(first_event_id, next_event_id)` bounds from the overall span endpoints,
//! and extracting the `ContinuedAsNew` successor / `Started.ContinuedFrom`
//! predecessor from a batch's boundary events.

use crate::{
	error::{RereplicatorError, RereplicatorResult},
	event::{EventType, HistoryEvent},
	ids::{EventId, RunId},
};

/// Derives `(first_event_id, next_event_id)` for `current_run_id` given the
/// overall span endpoints, per the table in spec §4.4.
pub fn event_id_range(
	current_run_id: &RunId,
	begin_run_id: &RunId,
	begin_event_id: EventId,
	end_run_id: &RunId,
	end_event_id: EventId,
) -> (EventId, EventId) {
	if begin_run_id == end_run_id {
		debug_assert_eq!(current_run_id, begin_run_id);
		return (begin_event_id, end_event_id);
	}

	if current_run_id == begin_run_id {
		(begin_event_id, EventId::END)
	} else if current_run_id == end_run_id {
		(EventId::FIRST, end_event_id)
	} else {
		(EventId::FIRST, EventId::END)
	}
}

/// Inspects a batch's last event; if it is `ContinuedAsNew`, returns the
/// successor run's id.
pub fn extract_next_run_id(events: &[HistoryEvent]) -> Option<RunId> {
	events.last().and_then(|event| event.continued_as_new_run_id())
}

/// Inspects a batch's first event; if it is `Started` with a
/// `ContinuedFromRunId`, returns the predecessor run's id. The caller
/// already fetched exactly the first event of the run (spec §4.4's
/// "peek at one event" idiom), so an empty or non-`Started` batch is a
/// structural violation.
pub fn extract_prev_run_id(events: &[HistoryEvent]) -> RereplicatorResult<Option<RunId>> {
	let first = ensure_started(events)?;

	Ok(first.continued_from_run_id())
}

/// Validates invariant 3 of spec §3 ("a `Started` event, if present, has
/// `event_id = FirstEventID`") for a batch that is supposed to be the first
/// batch of a run, and returns that event.
pub fn ensure_started(events: &[HistoryEvent]) -> RereplicatorResult<&HistoryEvent> {
	let Some(first) = events.first() else {
		return Err(RereplicatorError::CorruptHistory(
			"expected the first batch of a run, got an empty batch".to_string(),
		));
	};

	if !matches!(first.event_type, EventType::WorkflowExecutionStarted { .. }) {
		return Err(RereplicatorError::CorruptHistory(format!(
			"expected first event of run to be WorkflowExecutionStarted, got event_id {}",
			first.event_id
		)));
	}

	if first.event_id != EventId::FIRST {
		return Err(RereplicatorError::CorruptHistory(format!(
			"expected first event of run to have event_id {}, got {}",
			EventId::FIRST,
			first.event_id
		)));
	}

	Ok(first)
}
