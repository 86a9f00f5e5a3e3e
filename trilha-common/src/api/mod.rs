//! API types shared between the engine and the backend collaborator

pub mod types;
