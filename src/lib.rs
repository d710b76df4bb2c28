pub mod api;
pub mod config;
pub mod http_client;
pub mod metrics;
pub mod normalize;
pub mod present;
pub mod provider;
pub mod schedule;
pub mod state;
pub mod team;
pub mod tween;
