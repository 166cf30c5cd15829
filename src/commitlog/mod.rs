mod in_memory;
mod storage;

pub use in_memory::InMemoryLog;
pub use storage::LogStorage;
pub use storage::LogStorageError;
