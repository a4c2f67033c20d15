pub mod activity;
pub mod bundle;
pub mod config;
pub mod report;
pub mod scoring;
