//! Blob codec adapter (spec §4.1). Pure, stateless conversions between the
//! external (public-API) and internal (history-applier) wire shapes, plus
//! the one deserialize path the traversal needs to inspect individual
//! events.

use crate::{
	collaborators::EventCodec,
	error::{RereplicatorError, RereplicatorResult},
	event::{
		ENCODING_COLUMNAR_BINARY, ExternalDataBlob, ExternalReplicationInfo, HistoryEvent,
		InternalDataBlob, InternalReplicationInfo,
	},
};

impl TryFrom<ExternalDataBlob> for InternalDataBlob {
	type Error = RereplicatorError;

	fn try_from(blob: ExternalDataBlob) -> Result<Self, Self::Error> {
		if blob.encoding_type != ENCODING_COLUMNAR_BINARY {
			return Err(RereplicatorError::encoding(format!(
				"unrecognized encoding type {}",
				blob.encoding_type
			)));
		}

		Ok(InternalDataBlob {
			encoding_type: blob.encoding_type,
			data: blob.data,
		})
	}
}

impl TryFrom<InternalDataBlob> for ExternalDataBlob {
	type Error = RereplicatorError;

	fn try_from(blob: InternalDataBlob) -> Result<Self, Self::Error> {
		if blob.encoding_type != ENCODING_COLUMNAR_BINARY {
			return Err(RereplicatorError::encoding(format!(
				"unrecognized encoding type {}",
				blob.encoding_type
			)));
		}

		Ok(ExternalDataBlob {
			encoding_type: blob.encoding_type,
			data: blob.data,
		})
	}
}

/// Identity on keys and scalar fields; kept as a named conversion (rather
/// than sharing one type across the boundary) so call sites document which
/// cluster a replication-info value came from.
pub fn external_replication_info_to_internal(
	info: ExternalReplicationInfo,
) -> InternalReplicationInfo {
	info
}

/// Deserialize an internal blob into its ordered events, via the injected
/// codec. Used only to read `Started.continued_from_run_id` and
/// `ContinuedAsNew.new_execution_run_id`.
pub fn deserialize_batch<C>(codec: &C, blob: &InternalDataBlob) -> RereplicatorResult<Vec<HistoryEvent>>
where
	C: EventCodec,
{
	codec
		.deserialize_batch_events(blob)
		.map_err(|err| RereplicatorError::Encoding(Box::new(err)))
}
