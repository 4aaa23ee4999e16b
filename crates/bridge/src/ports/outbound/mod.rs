pub mod storage_port;

pub use storage_port::{PersistenceError, StoragePort};
