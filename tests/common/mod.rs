//! In-memory fakes of the four collaborator traits, scripted per test. No
//! mocking framework is in the corpus this crate is grounded on, so these
//! are hand-written, the same shape as the teacher's in-process `TestCtx`
//! driver.

use std::{
	collections::HashMap,
	sync::{Arc, Mutex},
};

use history_rereplicator::{
	ApplyRequest, DestinationApplyClient, DomainCache, DomainMetadata, DomainName, DomainId,
	EventCodec, ExternalDataBlob, ExternalReplicationInfo, GetHistoryRequest, GetHistoryResponse,
	HistoryEvent, InternalDataBlob, RunId, SourceHistoryClient, ENCODING_COLUMNAR_BINARY,
};

#[derive(Debug, thiserror::Error)]
pub enum FakeError {
	#[error("fake: not found")]
	NotFound,
	#[error("fake: bad page token")]
	BadToken,
	#[error("fake: encoding")]
	Encoding,
}

/// Builds an [`ExternalDataBlob`] batch out of events, JSON-encoded (the
/// wire format doesn't matter to the traversal, only the encoding tag does).
pub fn blob(events: &[HistoryEvent]) -> ExternalDataBlob {
	ExternalDataBlob {
		encoding_type: ENCODING_COLUMNAR_BINARY,
		data: serde_json::to_vec(events).expect("events serialize"),
	}
}

#[derive(Clone)]
pub struct ScriptedPage {
	pub branch_token: Vec<u8>,
	pub batches: Vec<ExternalDataBlob>,
	pub replication_info: ExternalReplicationInfo,
	pub event_store_version: i32,
}

impl ScriptedPage {
	pub fn new(batches: Vec<ExternalDataBlob>) -> Self {
		ScriptedPage {
			branch_token: b"branch".to_vec(),
			batches,
			replication_info: ExternalReplicationInfo::new(),
			event_store_version: 1,
		}
	}
}

/// Pages are looked up by an explicit token (page index), not consumed off a
/// queue, so the same run can be fetched independently more than once (e.g.
/// the full traversal of a run plus a later "peek at one event" call).
#[derive(Default)]
pub struct FakeSourceHistoryClient {
	runs: HashMap<RunId, Vec<ScriptedPage>>,
	calls: Mutex<Vec<GetHistoryRequest>>,
}

impl FakeSourceHistoryClient {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_run(mut self, run_id: RunId, pages: Vec<ScriptedPage>) -> Self {
		self.runs.insert(run_id, pages);
		self
	}

	pub fn calls(&self) -> Vec<GetHistoryRequest> {
		self.calls.lock().unwrap().clone()
	}
}

#[async_trait::async_trait]
impl SourceHistoryClient for FakeSourceHistoryClient {
	type Error = FakeError;

	async fn get_workflow_execution_raw_history(
		&self,
		req: GetHistoryRequest,
	) -> Result<GetHistoryResponse, Self::Error> {
		self.calls.lock().unwrap().push(req.clone());

		let pages = self.runs.get(&req.run_id).ok_or(FakeError::NotFound)?;

		let idx = match req.next_page_token.as_deref() {
			None => 0,
			Some(tok) => std::str::from_utf8(tok)
				.ok()
				.and_then(|s| s.parse::<usize>().ok())
				.ok_or(FakeError::BadToken)?,
		};

		let page = pages.get(idx).ok_or(FakeError::NotFound)?;

		let batches = if req.maximum_page_size == 1 {
			page.batches.iter().take(1).cloned().collect()
		} else {
			page.batches.clone()
		};

		let next_page_token = if idx + 1 < pages.len() {
			Some((idx + 1).to_string().into_bytes())
		} else {
			None
		};

		Ok(GetHistoryResponse {
			branch_token: page.branch_token.clone(),
			history_batches: batches,
			next_page_token,
			replication_info: page.replication_info.clone(),
			event_store_version: page.event_store_version,
		})
	}
}

#[derive(Default)]
pub struct FakeDomainCache {
	domains: HashMap<DomainId, DomainName>,
}

impl FakeDomainCache {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_domain(mut self, domain_id: DomainId, name: impl Into<String>) -> Self {
		self.domains.insert(domain_id, DomainName(name.into()));
		self
	}
}

#[async_trait::async_trait]
impl DomainCache for FakeDomainCache {
	type Error = FakeError;

	async fn get_domain(&self, domain_id: &DomainId) -> Result<DomainMetadata, Self::Error> {
		self.domains
			.get(domain_id)
			.cloned()
			.map(|name| DomainMetadata { name })
			.ok_or(FakeError::NotFound)
	}
}

#[derive(Default)]
pub struct FakeDestinationApplyClient {
	applied: Mutex<Vec<ApplyRequest>>,
}

impl FakeDestinationApplyClient {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn applied(&self) -> Vec<ApplyRequest> {
		self.applied.lock().unwrap().clone()
	}
}

#[async_trait::async_trait]
impl DestinationApplyClient for FakeDestinationApplyClient {
	type Error = FakeError;

	async fn replicate_raw_events(&self, req: ApplyRequest) -> Result<(), Self::Error> {
		self.applied.lock().unwrap().push(req);
		Ok(())
	}
}

pub struct FakeCodec;

impl EventCodec for FakeCodec {
	type Error = FakeError;

	fn deserialize_batch_events(
		&self,
		blob: &InternalDataBlob,
	) -> Result<Vec<HistoryEvent>, Self::Error> {
		if blob.encoding_type != ENCODING_COLUMNAR_BINARY {
			return Err(FakeError::Encoding);
		}

		serde_json::from_slice(&blob.data).map_err(|_| FakeError::Encoding)
	}

	fn serialize_batch_events(
		&self,
		events: &[HistoryEvent],
		encoding_type: i32,
	) -> Result<InternalDataBlob, Self::Error> {
		let data = serde_json::to_vec(events).map_err(|_| FakeError::Encoding)?;
		Ok(InternalDataBlob { encoding_type, data })
	}
}

pub type TestRereplicator = history_rereplicator::Rereplicator<
	FakeDomainCache,
	FakeSourceHistoryClient,
	FakeDestinationApplyClient,
	FakeCodec,
>;

pub fn new_rereplicator(
	domain_cache: FakeDomainCache,
	source_client: FakeSourceHistoryClient,
	apply_client: FakeDestinationApplyClient,
	config: history_rereplicator::RereplicatorConfig,
) -> (TestRereplicator, Arc<FakeSourceHistoryClient>, Arc<FakeDestinationApplyClient>) {
	let source_client = Arc::new(source_client);
	let apply_client = Arc::new(apply_client);
	let rereplicator = history_rereplicator::Rereplicator::new(
		Arc::new(domain_cache),
		source_client.clone(),
		apply_client.clone(),
		Arc::new(FakeCodec),
		config,
	);
	(rereplicator, source_client, apply_client)
}
