pub mod adapters;
pub mod answer;
pub mod config;
pub mod error;
pub mod extract;
pub mod web;
