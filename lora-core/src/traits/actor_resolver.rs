//! Actor resolution. Authentication happens upstream; this only decides which
//! actor UUID a mutation is attributed to.

use uuid::Uuid;

use crate::config::TemporalConfig;
use crate::errors::{LoraError, LoraResult};

pub trait ActorResolver: Send + Sync {
    fn resolve(&self, presented: Option<Uuid>) -> LoraResult<Uuid>;
}

/// Uses the caller's actor and rejects requests without one.
#[derive(Debug, Default, Clone, Copy)]
pub struct PresentedActor;

impl ActorResolver for PresentedActor {
    fn resolve(&self, presented: Option<Uuid>) -> LoraResult<Uuid> {
        presented.ok_or_else(|| LoraError::ValidationError("mutation carries no actor".to_string()))
    }
}

/// Falls back to a configured system actor when the caller supplies none.
#[derive(Debug, Clone, Copy)]
pub struct SystemActorFallback {
    pub system_actor: Uuid,
}

impl ActorResolver for SystemActorFallback {
    fn resolve(&self, presented: Option<Uuid>) -> LoraResult<Uuid> {
        Ok(presented.unwrap_or(self.system_actor))
    }
}

/// Build the resolver `temporal.system_actor` asks for.
pub fn actor_resolver_from_config(config: &TemporalConfig) -> Box<dyn ActorResolver> {
    match config.system_actor {
        Some(system_actor) => Box::new(SystemActorFallback { system_actor }),
        None => Box::new(PresentedActor),
    }
}
