mod audit_entry;
mod idempotency;
pub mod interval;
mod mutation;
mod object_kind;
mod query;
mod registration;
mod view;
mod virkning;

pub use audit_entry::{AuditEntry, AuditEntryId};
pub use idempotency::{fingerprint, IdempotencyRecord};
pub use interval::{Interval, TimeBound};
pub use mutation::{MutationOutcome, MutationRequest, Operation, VirkningChange};
pub use object_kind::{ObjectKind, ObjectSchema, StateField};
pub use query::{Predicate, QueryContext, QueryRequest, QueryResponse, QueryTarget, SearchFilter};
pub use registration::{Lifecycle, OperationKind, Registration, RegistrationId};
pub use view::{RangeView, View};
pub use virkning::{VirkningEntry, VirkningKind, VirkningValue};
