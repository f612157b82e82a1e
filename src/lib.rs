// src/lib.rs

//! graphcrawl: address normalization and data assertions for entity datasets

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
