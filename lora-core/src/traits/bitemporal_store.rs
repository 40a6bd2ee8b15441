//! IBitemporalStore: the surface the presentation layer talks to.

use uuid::Uuid;

use crate::errors::LoraResult;
use crate::models::{
    AuditEntry, MutationOutcome, MutationRequest, QueryContext, QueryRequest, QueryResponse,
    SearchFilter, View,
};

/// Bitemporal object store.
///
/// Mutations are idempotent per token and atomic; reads are snapshot
/// consistent. `Search` yields views lazily and is finite.
#[allow(async_fn_in_trait)]
pub trait IBitemporalStore: Send + Sync {
    type Search: Iterator<Item = LoraResult<View>>;

    async fn mutate(&self, request: MutationRequest) -> LoraResult<MutationOutcome>;

    async fn get_current(&self, object_uuid: Uuid) -> LoraResult<Option<View>>;
    async fn get_at(&self, object_uuid: Uuid, context: &QueryContext) -> LoraResult<Option<View>>;
    async fn search(&self, filter: &SearchFilter, context: &QueryContext) -> LoraResult<Self::Search>;
    async fn query(&self, request: QueryRequest) -> LoraResult<QueryResponse<Self::Search>>;

    async fn history(&self, object_uuid: Uuid) -> LoraResult<Vec<AuditEntry>>;

    /// Liveness: can the durable store be reached.
    async fn is_reachable(&self) -> bool;
}
