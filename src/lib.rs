pub mod client;
pub mod codec;
pub mod config;
pub mod db;
pub mod dto;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod migration;
pub mod models;
pub mod normalize;
pub mod repository;
pub mod response;
pub mod routes;
pub mod services;
pub mod state;
