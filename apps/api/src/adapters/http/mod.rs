pub mod app_error_impl;
pub mod app_state;
pub mod exemptions;
pub mod json;
pub mod middleware;
pub mod principal;
pub mod routes;
