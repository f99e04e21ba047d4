//! Careerscope - Job-Market Statistics Service
//!
//! This crate implements an HTTP API that answers job-market statistics
//! queries over a relational employment dataset, fronted by a per-client
//! fixed-window rate limiter that needs no external storage.

pub mod config;
pub mod db;
pub mod error;
pub mod http;
pub mod ratelimit;
pub mod stats;
