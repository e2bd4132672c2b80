// Adapters layer: concrete implementations of the domain ports (record store, file storage).

pub mod memory;
pub mod storage;
