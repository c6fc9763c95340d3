pub mod audio_models;
pub mod config;
pub mod error;
pub mod history_entry;
pub mod state;
