//! End-to-end test suite for satstake.
//!
//! Integration tests drive the staking service and the HTTP router the way a
//! client would, with time controlled by a manual clock.

pub mod helpers;
