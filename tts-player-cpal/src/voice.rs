//! Device-independent part of the output callback.
//!
//! The audio thread pulls from the single active voice; when it runs dry the
//! voice is retired and its end callback is handed back to the caller, which
//! must invoke it after releasing the lock.

use parking_lot::Mutex;

use tts_player_core::traits::playback_engine::{EndedCallback, EngineHandle};

/// Pre-rendered, device-ready samples for one started handle.
pub struct ActiveVoice {
    pub handle: EngineHandle,
    samples: Vec<f32>,
    position: usize,
    on_ended: EndedCallback,
}

impl ActiveVoice {
    pub fn new(handle: EngineHandle, samples: Vec<f32>, on_ended: EndedCallback) -> Self {
        Self {
            handle,
            samples,
            position: 0,
            on_ended,
        }
    }

    fn remaining(&self) -> &[f32] {
        &self.samples[self.position.min(self.samples.len())..]
    }
}

/// Shared slot between the engine and its output callback.
pub type VoiceSlot = Mutex<Option<ActiveVoice>>;

/// Fill one device buffer from `slot`, padding with silence.
///
/// Returns the end callback of a voice that finished during this buffer.
pub fn fill_buffer<T>(slot: &VoiceSlot, data: &mut [T], convert: impl Fn(f32) -> T) -> Option<EndedCallback> {
    let mut guard = slot.lock();

    let mut written = 0;
    let mut finished = false;
    if let Some(voice) = guard.as_mut() {
        let remaining = voice.remaining();
        written = remaining.len().min(data.len());
        for (out, &sample) in data[..written].iter_mut().zip(remaining) {
            *out = convert(sample);
        }
        voice.position += written;
        finished = voice.position >= voice.samples.len();
    }

    for out in &mut data[written..] {
        *out = convert(0.0);
    }

    if finished {
        guard.take().map(|voice| voice.on_ended)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counting_voice(samples: Vec<f32>, fired: &Arc<AtomicUsize>) -> ActiveVoice {
        let counter = Arc::clone(fired);
        ActiveVoice::new(
            EngineHandle(1),
            samples,
            Box::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        )
    }

    #[test]
    fn empty_slot_outputs_silence() {
        let slot: VoiceSlot = Mutex::new(None);
        let mut data = [1.0f32; 4];

        assert!(fill_buffer(&slot, &mut data, |s| s).is_none());
        assert_eq!(data, [0.0; 4]);
    }

    #[test]
    fn voice_spans_buffers_then_ends_once() {
        let fired = Arc::new(AtomicUsize::new(0));
        let slot: VoiceSlot = Mutex::new(Some(counting_voice(vec![0.1, 0.2, 0.3, 0.4, 0.5], &fired)));

        let mut first = [0.0f32; 3];
        assert!(fill_buffer(&slot, &mut first, |s| s).is_none());
        assert_eq!(first, [0.1, 0.2, 0.3]);

        let mut second = [9.0f32; 3];
        let ended = fill_buffer(&slot, &mut second, |s| s).unwrap();
        assert_eq!(second, [0.4, 0.5, 0.0]);
        assert!(slot.lock().is_none());

        ended();
        assert_eq!(fired.load(Ordering::SeqCst), 1);

        let mut third = [9.0f32; 2];
        assert!(fill_buffer(&slot, &mut third, |s| s).is_none());
        assert_eq!(third, [0.0, 0.0]);
    }

    #[test]
    fn converts_to_device_format() {
        let fired = Arc::new(AtomicUsize::new(0));
        let slot: VoiceSlot = Mutex::new(Some(counting_voice(vec![0.5, -0.5], &fired)));
        let mut data = [0i16; 2];

        fill_buffer(&slot, &mut data, |s| (s * i16::MAX as f32) as i16);
        assert_eq!(data, [16383, -16383]);
    }

    #[test]
    fn removed_voice_never_fires() {
        let fired = Arc::new(AtomicUsize::new(0));
        let slot: VoiceSlot = Mutex::new(Some(counting_voice(vec![0.1], &fired)));

        slot.lock().take();
        let mut data = [0.0f32; 2];
        assert!(fill_buffer(&slot, &mut data, |s| s).is_none());
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }
}
