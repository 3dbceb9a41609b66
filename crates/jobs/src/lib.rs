pub mod expiry;

pub use expiry::{ArmedExpiry, ExpiryEvent, ExpiryScheduler, MAX_EXPIRY};
