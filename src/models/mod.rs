// src/models/mod.rs

pub mod attempt;
pub mod question;
pub mod quiz;
pub mod settings;
pub mod subject;
pub mod user;
