pub mod encoder;
pub mod playback_delegate;
pub mod playback_engine;
pub mod speech_generator;
