// src/handlers/mod.rs

pub mod attempt;
pub mod auth;
pub mod favorite;
pub mod question;
pub mod quiz;
pub mod settings;
pub mod subject;
