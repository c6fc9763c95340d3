//! Test doubles for hosts and unit tests.

pub mod manual_engine;

pub use manual_engine::ManualEngine;
