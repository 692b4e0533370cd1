pub mod adapters;
pub mod config;
pub mod error;
pub mod library;
pub mod translation;
pub mod web;
