/// Durable-store errors.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("sqlite error: {message}")]
    SqliteError { message: String },

    #[error("migration v{version:03} failed: {reason}")]
    MigrationFailed { version: u32, reason: String },

    #[error("connection lock poisoned: {message}")]
    LockPoisoned { message: String },

    #[error("corrupt row in {table}: {message}")]
    CorruptRow { table: String, message: String },
}
