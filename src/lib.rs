pub mod config;
pub mod controller;
pub mod error;
pub mod http_client;
pub mod identifiers;
pub mod pager;
pub mod player;
pub mod provider;
pub mod relay;
pub mod roster_fetch;
pub mod search;
pub mod selection;
pub mod state;
