//! Infrastructure layer: credential stores, sequence counters, clinical record
//! storage and Postgres wiring.

pub mod clinical;
pub mod credential_store;
pub mod db;
pub mod read_model;
pub mod sequence;
