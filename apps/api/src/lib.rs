//! Job-posting aggregation and recommendation service: crawls Korean job
//! boards, normalizes and deduplicates the postings, and ranks them against
//! a user profile with a rule-based scorer and an optional LLM re-ranker.

pub mod aggregator;
pub mod config;
pub mod dedup;
pub mod errors;
pub mod keywords;
pub mod llm_client;
pub mod models;
pub mod routes;
pub mod scoring;
pub mod sources;
pub mod state;
