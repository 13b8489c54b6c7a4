//! Domain models, metrics services and gateway traits for crewdash

pub mod model;
pub mod repository;
pub mod service;
