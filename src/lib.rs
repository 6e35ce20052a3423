pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod health;
pub mod identity;
pub mod index;
pub mod service;
pub mod tme;
pub mod transform;
