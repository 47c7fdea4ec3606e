//! Entity, relationship, offense and region signals from news excerpts.

pub mod api;
pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod insights;
pub mod logging;
pub mod nlp;
