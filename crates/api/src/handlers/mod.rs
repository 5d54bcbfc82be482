pub mod auth;
pub mod jobs;
pub mod profile;
pub mod subscriptions;
