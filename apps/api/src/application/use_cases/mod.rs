pub mod federation_registry;
pub mod identity;
pub mod session;
pub mod token;
pub mod user;
