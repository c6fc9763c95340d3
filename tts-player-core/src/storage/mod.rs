pub mod artifact;
pub mod history;
