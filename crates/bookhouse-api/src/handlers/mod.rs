//! API request handlers

pub mod books;
pub mod browse;
pub mod stats;
