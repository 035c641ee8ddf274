pub mod assignments;
pub mod auth;
pub mod catalog;
pub mod roles;
pub mod scope;
pub mod transfers;
