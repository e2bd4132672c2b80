// Domain layer: entity model, field descriptor tables and ports (storage collaborator interfaces).

pub mod exchange;
pub mod model;
pub mod ports;
pub mod projection;
pub mod schema;
pub mod value;
