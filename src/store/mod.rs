mod kv_store;

pub use kv_store::KvStore;
pub use kv_store::KvStoreError;
