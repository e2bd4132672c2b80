pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{memory::MemoryStore, storage::LocalStorage};
pub use config::CodecConfig;
pub use crate::core::{
    deserializer::{DeserializeOptions, Deserializer},
    engine::ExchangeEngine,
    exchange::DumpPipeline,
    policy::{TemporalFormats, ValuePolicy},
    serializer::Serializer,
};
pub use domain::model::{AnyRecord, Entity, Place, Ref, Tweet, User};
pub use domain::ports::{Detached, RecordStore};
pub use domain::projection::{FieldSelection, Node};
pub use domain::schema::EntityKind;
pub use domain::value::{FieldValue, Key};
pub use utils::error::{CodecError, Result};
