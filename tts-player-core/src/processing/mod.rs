#[cfg(feature = "mp3")]
pub mod mp3_encoder;
pub mod output_mixer;
pub mod pcm_decoder;
pub mod wav_format;
