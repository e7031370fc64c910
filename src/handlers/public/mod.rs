// Public handlers: token acquisition, health and the service index.
pub mod auth;
pub mod system;
