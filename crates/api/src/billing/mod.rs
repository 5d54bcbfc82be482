//! Payment provider clients.

pub mod stripe;
