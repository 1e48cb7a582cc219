//! Domain models owned by the storefront client.

pub mod user;

pub use user::User;
