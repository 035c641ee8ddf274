pub mod access;
pub mod asset;
pub mod auth;
pub mod hierarchy;
pub mod transfer;
