//! Frequency-domain audio analysis
//!
//! A small fixed-window analyser over the live microphone samples. Output
//! is the byte-scaled (0-255) magnitude spectrum platform audio analysers
//! report, so the fatigue baseline carries over unchanged.

use std::sync::Arc;

use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};

/// Decibel floor mapped to 0
const MIN_DB: f32 = -100.0;

/// Decibel ceiling mapped to 255
const MAX_DB: f32 = -30.0;

/// Sliding-window magnitude spectrum over the microphone feed
pub struct SpectrumAnalyser {
    fft: Arc<dyn Fft<f32>>,
    fft_size: usize,
    window: Vec<f32>,
    ring: Vec<f32>,
}

impl SpectrumAnalyser {
    /// Create an analyser with the given FFT window size
    ///
    /// `fft_size` must be a power of two (validated by config).
    #[must_use]
    pub fn new(fft_size: usize) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(fft_size);

        // Hann window
        #[allow(clippy::cast_precision_loss)]
        let window = (0..fft_size)
            .map(|i| {
                let phase = 2.0 * std::f32::consts::PI * i as f32 / fft_size as f32;
                0.5 * (1.0 - phase.cos())
            })
            .collect();

        Self {
            fft,
            fft_size,
            window,
            ring: vec![0.0; fft_size],
        }
    }

    /// Feed captured samples, keeping the newest `fft_size` of them
    pub fn push_samples(&mut self, samples: &[f32]) {
        if samples.len() >= self.fft_size {
            self.ring
                .copy_from_slice(&samples[samples.len() - self.fft_size..]);
        } else {
            self.ring.drain(..samples.len());
            self.ring.extend_from_slice(samples);
        }
    }

    /// Current byte-scaled magnitude spectrum, `fft_size / 2` bins
    #[must_use]
    pub fn frequency_data(&self) -> Vec<f32> {
        let mut buffer: Vec<Complex<f32>> = self
            .ring
            .iter()
            .zip(&self.window)
            .map(|(sample, coeff)| Complex::new(sample * coeff, 0.0))
            .collect();
        self.fft.process(&mut buffer);

        #[allow(clippy::cast_precision_loss)]
        let scale = self.fft_size as f32;
        buffer[..self.fft_size / 2]
            .iter()
            .map(|bin| {
                let magnitude = bin.norm() / scale;
                let db = if magnitude > 0.0 {
                    20.0 * magnitude.log10()
                } else {
                    MIN_DB
                };
                ((db - MIN_DB) / (MAX_DB - MIN_DB) * 255.0).clamp(0.0, 255.0)
            })
            .collect()
    }

    /// Number of frequency bins produced
    #[must_use]
    pub const fn bin_count(&self) -> usize {
        self.fft_size / 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(frequency: f32, sample_rate: f32, count: usize) -> Vec<f32> {
        (0..count)
            .map(|i| {
                #[allow(clippy::cast_precision_loss)]
                let t = i as f32 / sample_rate;
                (2.0 * std::f32::consts::PI * frequency * t).sin()
            })
            .collect()
    }

    #[test]
    fn silence_yields_zero_spectrum() {
        let mut analyser = SpectrumAnalyser::new(512);
        analyser.push_samples(&vec![0.0; 512]);
        let data = analyser.frequency_data();
        assert_eq!(data.len(), 256);
        assert!(data.iter().all(|&m| m == 0.0));
    }

    #[test]
    fn tone_concentrates_energy_near_its_bin() {
        let mut analyser = SpectrumAnalyser::new(512);
        // 1kHz at 16kHz sampling lands at bin 32
        analyser.push_samples(&sine(1000.0, 16000.0, 512));
        let data = analyser.frequency_data();

        let peak_bin = data
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
            .unwrap();
        assert!((30..=34).contains(&peak_bin), "peak at bin {peak_bin}");
        assert!(data[peak_bin] > data[128]);
    }

    #[test]
    fn output_stays_byte_scaled() {
        let mut analyser = SpectrumAnalyser::new(256);
        // Absurdly loud input still maps into the byte range
        analyser.push_samples(&vec![1000.0; 256]);
        let data = analyser.frequency_data();
        assert!(data.iter().all(|&m| (0.0..=255.0).contains(&m)));
    }

    #[test]
    fn short_pushes_slide_the_window() {
        let mut analyser = SpectrumAnalyser::new(256);
        analyser.push_samples(&vec![0.0; 256]);
        analyser.push_samples(&vec![0.5; 64]);
        // window now holds 192 zeros followed by the new samples
        let data = analyser.frequency_data();
        assert!(data.iter().any(|&m| m > 0.0));
    }
}
