/// Temporal subsystem errors.
#[derive(Debug, thiserror::Error)]
pub enum TemporalError {
    #[error("invalid interval: [{from}, {to})")]
    InvalidInterval { from: String, to: String },

    #[error("overlapping virkning for {kind} field '{field}': {detail}")]
    OverlappingVirkning {
        kind: String,
        field: String,
        detail: String,
    },

    #[error("registration time must advance: open registration starts at {open_from}, got {requested}")]
    RegistrationTimeRegression { open_from: String, requested: String },

    #[error("invalid lifecycle transition: {from} → {to}")]
    InvalidLifecycleTransition { from: String, to: String },
}
