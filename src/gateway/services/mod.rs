//! Application services for authenticated backend access.

mod authenticated;

pub use authenticated::AuthenticatedApi;
