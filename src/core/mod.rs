pub mod client;
pub mod scenario;

pub use client::ApiClient;
pub use scenario::{PetLifecycle, UserLifecycle};
