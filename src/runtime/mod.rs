pub mod engine;
pub mod listing;
pub mod poller;
pub mod staging;
