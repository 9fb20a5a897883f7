//! HTTP inbound adapter exposing REST endpoints.

pub mod error;
pub mod health;
pub mod lookup;
pub mod lookup_dto;
pub mod state;

pub use error::ApiResult;
