mod actor_resolver;
mod bitemporal_store;
mod clock;

pub use actor_resolver::{actor_resolver_from_config, ActorResolver, PresentedActor, SystemActorFallback};
pub use bitemporal_store::IBitemporalStore;
pub use clock::{Clock, ManualClock, SystemClock};
