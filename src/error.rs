//! Crate-wide error taxonomy. No error is recovered locally by the
//! re-replicator: the first failure aborts the call and is returned verbatim
//! to the caller (spec §7). Already-applied batches are left in place, the
//! destination applier being idempotent on `(run_id, event_id)`.

use crate::ids::DomainId;

/// A collaborator failure, boxed so this crate never needs to know the
/// concrete transport (gRPC, HTTP, in-process) behind a trait object.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub type RereplicatorResult<T> = Result<T, RereplicatorError>;

#[derive(thiserror::Error, Debug)]
pub enum RereplicatorError {
	/// Domain cache miss. Fatal to the call.
	#[error("domain not found: {0}")]
	DomainNotFound(DomainId),

	/// Source-cluster history RPC failure (network, remote unavailable,
	/// not-found). Fatal to the call; the caller may retry the whole span.
	#[error("source history fetch failed: {0}")]
	Fetch(#[source] BoxError),

	/// Destination-cluster apply RPC failure. Fatal to the call.
	#[error("destination apply failed: {0}")]
	Apply(#[source] BoxError),

	/// Blob deserialization failure or unknown encoding tag. Fatal to the
	/// call.
	#[error("encoding error: {0}")]
	Encoding(#[source] BoxError),

	/// Structural violation during traversal, e.g. the "first batch" of the
	/// next run did not contain a `Started` event. Indicates an upstream bug.
	#[error("corrupt history: {0}")]
	CorruptHistory(String),
}

impl RereplicatorError {
	/// Build an `Encoding` error from an ad-hoc message. `std` provides
	/// `From<String> for Box<dyn Error + Send + Sync>`, so this needs no
	/// intermediate error type.
	pub fn encoding(msg: impl Into<String>) -> Self {
		RereplicatorError::Encoding(msg.into().into())
	}
}
