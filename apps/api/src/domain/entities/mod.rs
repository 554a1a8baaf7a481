pub mod identity_provider;
pub mod user;
