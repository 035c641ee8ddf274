pub mod assignment_service;
pub mod auth;
pub mod catalog_service;
pub mod scope_service;
pub mod transfer_service;
