pub mod app;
pub mod artworks;
pub mod auth;
pub mod comments;
pub mod config;
pub mod db;
pub mod error;
pub mod gallery;
pub mod state;
pub mod users;
pub mod validation;
