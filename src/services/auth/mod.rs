pub mod access_jwt;
pub mod factory;
pub mod keys;
pub mod scope;

pub use access_jwt::{AuthService, ProviderTrust};
pub use factory::build_auth_service;
