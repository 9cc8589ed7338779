pub mod api;
pub mod config;
pub mod dispatch;
pub mod observability;
pub mod partition;
pub mod roster;
pub mod storage;
