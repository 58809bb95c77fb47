pub mod context;
pub mod response;
pub mod validate_entity;

pub use context::GatewayContext;
pub use response::{ApiResponse, ApiResult};
pub use validate_entity::{validate_entity_middleware, ValidatedEntity};
