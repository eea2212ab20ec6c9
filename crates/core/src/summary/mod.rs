//! Summary module - aggregate statistics and the read models they are built from.

mod summary_model;

pub use summary_model::*;
