pub mod config;
pub mod discovery;
pub mod display;
pub mod fetcher;
pub mod match_details;
pub mod match_scraper;
pub mod metrics;
pub mod squad_scraper;
pub mod squads;
pub mod store;
pub mod types;
pub mod urls;
pub mod utils;
