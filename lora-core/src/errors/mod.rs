mod lora_error;
mod storage_error;
mod temporal_error;

pub use lora_error::{codes, LoraError, LoraResult};
pub use storage_error::StorageError;
pub use temporal_error::TemporalError;
