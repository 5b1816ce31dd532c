pub mod actor;
pub mod api;
pub mod cache;
pub mod cache_keys;
pub mod config;
pub mod db;
pub mod entry_service;
pub mod error;
pub mod leaderboard_service;
pub mod names;
pub mod ranking;
pub mod redis_cache;
pub mod redis_utils;
pub mod seed;

pub use actor::Actor;
pub use entry_service::EntryService;
pub use error::LeaderboardError;
pub use leaderboard_service::LeaderboardService;
