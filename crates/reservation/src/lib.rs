pub mod abstract_trait;
pub mod config;
pub mod di;
pub mod domain;
pub mod handler;
pub mod kafka;
pub mod middleware;
pub mod model;
pub mod repository;
pub mod service;
pub mod state;
