//! HTTP handlers, one module per resource.

pub mod health;
pub mod proxy;
pub mod registry;
pub mod sessions;
