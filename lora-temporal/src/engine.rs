//! BitemporalEngine: central orchestrator implementing IBitemporalStore.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use lora_core::config::TemporalConfig;
use lora_core::errors::LoraResult;
use lora_core::models::{
    fingerprint, AuditEntry, AuditEntryId, IdempotencyRecord, Interval, MutationOutcome,
    MutationRequest, ObjectKind, Operation, QueryContext, QueryRequest, QueryResponse, QueryTarget,
    RangeView, Registration, SearchFilter, View,
};
use lora_core::traits::{actor_resolver_from_config, ActorResolver, Clock, IBitemporalStore, SystemClock};
use lora_core::LoraConfig;
use lora_storage::codec::to_storage_precision;
use lora_storage::StorageEngine;

use crate::audit;
use crate::idempotency::{self, IdempotencyClaim};
use crate::query::{self, SearchResults};
use crate::registration::{self, PendingRegistration};

/// A mutation that has passed the prepare phase and awaits commit.
#[derive(Debug, Clone)]
pub struct PreparedMutation {
    pub pending: PendingRegistration,
    claim: Option<IdempotencyClaim>,
}

/// The fields that identify a request for replay comparison. Actor and
/// token are compared separately.
#[derive(Serialize)]
struct RequestFingerprint<'a> {
    object_type: ObjectKind,
    operation: &'a Operation,
    effective_time: Option<DateTime<Utc>>,
}

/// The bitemporal store.
///
/// Holds the storage engine (writer for commits, read pool for prepare and
/// queries), the clock that supplies "now", and the actor resolver.
pub struct BitemporalEngine {
    storage: Arc<StorageEngine>,
    clock: Arc<dyn Clock>,
    actors: Box<dyn ActorResolver>,
    config: TemporalConfig,
}

impl BitemporalEngine {
    pub fn new(storage: Arc<StorageEngine>, config: TemporalConfig) -> Self {
        Self {
            storage,
            clock: Arc::new(SystemClock),
            actors: actor_resolver_from_config(&config),
            config,
        }
    }

    /// Open storage and engine from one configuration.
    pub fn open(config: &LoraConfig) -> LoraResult<Self> {
        let storage = StorageEngine::open_with_config(&config.storage)?;
        Ok(Self::new(Arc::new(storage), config.temporal.clone()))
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_actor_resolver(mut self, actors: Box<dyn ActorResolver>) -> Self {
        self.actors = actors;
        self
    }

    pub fn storage(&self) -> &Arc<StorageEngine> {
        &self.storage
    }

    fn now(&self) -> DateTime<Utc> {
        to_storage_precision(self.clock.now())
    }

    fn pin(&self, context: &QueryContext) -> (DateTime<Utc>, DateTime<Utc>) {
        let (registration_time, validity_time) = context.pin(self.now());
        (
            to_storage_precision(registration_time),
            to_storage_precision(validity_time),
        )
    }

    // ── Mutations ───────────────────────────────────────────────────────────

    /// Prepare phase on a read snapshot. Nothing is written.
    pub async fn prepare(&self, request: &MutationRequest) -> LoraResult<PreparedMutation> {
        let actor = self.actors.resolve(request.actor)?;
        let claim = self.claim_for(request, actor)?;
        let pending = self.prepare_pending(request, actor).await?;
        Ok(PreparedMutation { pending, claim })
    }

    /// Commit phase. Fails with `ConcurrentModification` if the head the
    /// mutation was prepared against is no longer open.
    pub async fn commit(&self, prepared: PreparedMutation) -> LoraResult<MutationOutcome> {
        let recorded_at = self.now();
        let PreparedMutation { pending, claim } = prepared;
        self.storage
            .with_writer(move |conn| registration::commit(conn, &pending, claim, recorded_at))
            .await
    }

    async fn prepare_pending(&self, request: &MutationRequest, actor: Uuid) -> LoraResult<PendingRegistration> {
        let effective_time = to_storage_precision(request.effective_time.unwrap_or_else(|| self.clock.now()));
        let object_type = request.object_type;
        let operation = request.operation.clone();
        let max_changes = self.config.max_changes_per_mutation;
        self.storage
            .with_reader(move |conn| {
                registration::prepare(conn, object_type, actor, &operation, effective_time, max_changes)
            })
            .await
    }

    fn claim_for(&self, request: &MutationRequest, actor: Uuid) -> LoraResult<Option<IdempotencyClaim>> {
        let Some(token) = request.idempotency_token else {
            return Ok(None);
        };
        let fingerprint = fingerprint(&RequestFingerprint {
            object_type: request.object_type,
            operation: &request.operation,
            effective_time: request.effective_time,
        })?;
        Ok(Some(IdempotencyClaim {
            token,
            actor,
            fingerprint,
        }))
    }

    // ── Queries beyond the store trait ─────────────────────────────────────

    pub async fn exists(&self, uuid: Uuid, registration_time: Option<DateTime<Utc>>) -> LoraResult<bool> {
        let registration_time = registration_time.map(to_storage_precision);
        self.storage
            .with_reader(move |conn| query::exists(conn, uuid, registration_time))
            .await
    }

    pub async fn get_range(
        &self,
        uuid: Uuid,
        registration_time: Option<DateTime<Utc>>,
        validity: Interval,
    ) -> LoraResult<Option<RangeView>> {
        let registration_time = to_storage_precision(registration_time.unwrap_or_else(|| self.clock.now()));
        self.storage
            .with_reader(move |conn| query::get_range(conn, uuid, registration_time, &validity))
            .await
    }

    pub async fn registrations(&self, uuid: Uuid) -> LoraResult<Vec<Registration>> {
        self.storage
            .with_reader(move |conn| query::registrations(conn, uuid))
            .await
    }

    // ── Audit & idempotency ledgers ────────────────────────────────────────

    pub async fn audit_by_actor(&self, actor: Uuid) -> LoraResult<Vec<AuditEntry>> {
        self.storage
            .with_reader(move |conn| audit::by_actor(conn, actor))
            .await
    }

    pub async fn audit_in_range(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> LoraResult<Vec<AuditEntry>> {
        self.storage
            .with_reader(move |conn| audit::in_range(conn, from, to))
            .await
    }

    /// Import an audit row from a system without structured registrations.
    pub async fn record_legacy_audit(
        &self,
        object_uuid: Uuid,
        actor: Uuid,
        recorded_at: DateTime<Utc>,
    ) -> LoraResult<AuditEntryId> {
        self.storage
            .with_writer(move |conn| audit::record_legacy(conn, object_uuid, actor, recorded_at))
            .await
    }

    pub async fn get_by_token(&self, token: Uuid) -> LoraResult<Option<IdempotencyRecord>> {
        self.storage
            .with_reader(move |conn| idempotency::get_by_token(conn, token))
            .await
    }
}

impl IBitemporalStore for BitemporalEngine {
    type Search = SearchResults;

    async fn mutate(&self, request: MutationRequest) -> LoraResult<MutationOutcome> {
        let actor = self.actors.resolve(request.actor)?;
        let claim = self.claim_for(&request, actor)?;
        idempotency::execute_once(&self.storage, claim, |claim| async move {
            let pending = self.prepare_pending(&request, actor).await?;
            self.commit(PreparedMutation { pending, claim }).await
        })
        .await
    }

    async fn get_current(&self, object_uuid: Uuid) -> LoraResult<Option<View>> {
        let validity_time = self.now();
        self.storage
            .with_reader(move |conn| query::get_current(conn, object_uuid, validity_time))
            .await
    }

    async fn get_at(&self, object_uuid: Uuid, context: &QueryContext) -> LoraResult<Option<View>> {
        let (registration_time, validity_time) = self.pin(context);
        debug!(object = %object_uuid, %registration_time, %validity_time, "get_at");
        self.storage
            .with_reader(move |conn| query::get_at(conn, object_uuid, registration_time, validity_time))
            .await
    }

    async fn search(&self, filter: &SearchFilter, context: &QueryContext) -> LoraResult<Self::Search> {
        let (registration_time, validity_time) = self.pin(context);
        let probe = filter.clone();
        let candidates = self
            .storage
            .with_reader(move |conn| query::search_candidates(conn, &probe, registration_time))
            .await?;
        debug!(candidates = candidates.len(), %registration_time, "search");
        Ok(SearchResults::new(
            Arc::clone(&self.storage),
            candidates,
            validity_time,
            filter.clone(),
        ))
    }

    async fn query(&self, request: QueryRequest) -> LoraResult<QueryResponse<Self::Search>> {
        match request.target {
            QueryTarget::Object(uuid) => Ok(QueryResponse::Single(self.get_at(uuid, &request.context).await?)),
            QueryTarget::Search(filter) => Ok(QueryResponse::Many(self.search(&filter, &request.context).await?)),
        }
    }

    async fn history(&self, object_uuid: Uuid) -> LoraResult<Vec<AuditEntry>> {
        self.storage
            .with_reader(move |conn| audit::history(conn, object_uuid))
            .await
    }

    async fn is_reachable(&self) -> bool {
        self.storage.is_reachable()
    }
}
