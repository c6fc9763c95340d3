/// Pure-math output preparation for device backends.
///
/// Converts the 24 kHz mono speech buffer to the device's native rate and
/// channel layout. All operations work on `&[f32]` buffers with no platform
/// dependencies.
#[derive(Debug, Clone)]
pub struct OutputMixer {
    pub target_sample_rate: f64,
    pub channels: u16,
}

impl OutputMixer {
    pub fn new(target_sample_rate: f64, channels: u16) -> Self {
        Self {
            target_sample_rate,
            channels: channels.max(1),
        }
    }

    /// Linear interpolation resampling for mono audio.
    ///
    /// Resamples from `source_sample_rate` to `self.target_sample_rate`.
    /// Returns input unchanged if rates match.
    pub fn resample(&self, samples: &[f32], source_sample_rate: f64) -> Vec<f32> {
        if (source_sample_rate - self.target_sample_rate).abs() < 0.01 || samples.is_empty() {
            return samples.to_vec();
        }

        let ratio = self.target_sample_rate / source_sample_rate;
        let output_count = (samples.len() as f64 * ratio) as usize;
        if output_count == 0 {
            return Vec::new();
        }

        let mut output = vec![0.0f32; output_count];
        for (i, sample) in output.iter_mut().enumerate() {
            let source_index = i as f64 / ratio;
            let index = source_index as usize;
            let fraction = (source_index - index as f64) as f32;

            if index + 1 < samples.len() {
                *sample = samples[index] * (1.0 - fraction) + samples[index + 1] * fraction;
            } else if index < samples.len() {
                *sample = samples[index];
            }
        }
        output
    }

    /// Duplicate each mono sample across all output channels, interleaved.
    pub fn fan_out(&self, mono: &[f32]) -> Vec<f32> {
        let channels = self.channels as usize;
        if channels == 1 {
            return mono.to_vec();
        }

        let mut interleaved = Vec::with_capacity(mono.len() * channels);
        for &sample in mono {
            interleaved.extend(std::iter::repeat(sample).take(channels));
        }
        interleaved
    }

    /// Render mono samples starting at `start_frame` into device-ready interleaved samples.
    pub fn render(&self, samples: &[f32], source_sample_rate: f64, start_frame: usize) -> Vec<f32> {
        let start = start_frame.min(samples.len());
        let resampled = self.resample(&samples[start..], source_sample_rate);
        self.fan_out(&resampled)
    }
}
