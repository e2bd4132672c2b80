pub mod deserializer;
pub mod engine;
pub mod exchange;
pub mod policy;
pub mod serializer;

pub use crate::domain::exchange::{Envelope, ExchangeResult};
pub use crate::domain::ports::{ConfigProvider, Pipeline, RecordStore, Storage};
pub use crate::utils::error::Result;
