pub mod client;
pub mod notifications;
