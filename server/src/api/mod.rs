pub mod entries;
pub mod error;
pub mod jwt;
pub mod leaderboards;
pub mod middleware;
pub mod server;

pub use server::{AppState, build_router, run_api_server};
