//! # satstake-core
//! Foundation types, reward math, and admission rules for satstake.

pub mod clock;
pub mod constants;
pub mod error;
pub mod reward;
pub mod store;
pub mod traits;
pub mod types;
pub mod validation;
