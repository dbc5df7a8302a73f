// src/lib.rs

//! Subreddit crawler that labels sensitive-topic posts written by minors.

pub mod api;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
