//! One-sided amplitude spectra of regularly sampled profiles.
//!
//! Frequencies are in cycles per distance unit of the input spacing.
//! Converting a frequency `f` back to a wavelength uses `(1 / f) / 2`, so the
//! highest frequency maps to the sample spacing itself.

use num_complex::Complex;
use rustfft::FftPlanner;
use tracing::{debug, warn};

use crate::error::{GridProcessorError, Result};
use crate::transect::check_length_equality;

/// `n` evenly spaced values from `start` to `stop` inclusive.
pub fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n - 1) as f64;
            (0..n).map(|i| start + i as f64 * step).collect()
        }
    }
}

/// Frequency axis from 0 to `1 / (2 * sample_spacing)`, with `n` points or
/// `len / 2` when `n` is `None`.
pub fn frequency_axis(len: usize, sample_spacing: f64, n: Option<usize>) -> Vec<f64> {
    linspace(0.0, 1.0 / (2.0 * sample_spacing), n.unwrap_or(len / 2))
}

/// Wavelengths `(1 / f) / 2`; a zero frequency gives infinity.
pub fn wavelengths(frequencies: &[f64]) -> Vec<f64> {
    frequencies.iter().map(|&f| (1.0 / f) / 2.0).collect()
}

/// Magnitudes of the real-input DFT, `len / 2 + 1` bins.
pub fn amplitude_spectrum(values: &[f64]) -> Vec<f64> {
    if values.is_empty() {
        return Vec::new();
    }

    let mut buffer: Vec<Complex<f64>> = values.iter().map(|&v| Complex::new(v, 0.0)).collect();
    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(buffer.len());
    fft.process(&mut buffer);

    buffer
        .iter()
        .take(values.len() / 2 + 1)
        .map(|c| c.norm())
        .collect()
}

/// Scale DFT magnitudes by `1 / sqrt(len)`.
pub fn magnitude_metres(amplitudes: &[f64], len: usize) -> Vec<f64> {
    let scale = (len as f64).sqrt();
    amplitudes.iter().map(|a| a / scale).collect()
}

/// Convert wavelengths in pixels to map units.
pub fn wavelength_metres(pixel_size: f64, wavelengths: &[f64]) -> Vec<f64> {
    wavelengths.iter().map(|w| w * pixel_size).collect()
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Fail if the shortest wavelength, rounded to two decimals, is shorter
/// than the sample spacing.
pub fn check_nyquist(sample_spacing: f64, min_wavelength: f64) -> Result<()> {
    let spacing = round2(sample_spacing);
    let wavelength = round2(min_wavelength);
    if wavelength < spacing {
        warn!(spacing, wavelength, "Wavelength below sample spacing");
        return Err(GridProcessorError::BelowSampleSpacing {
            spacing: sample_spacing,
            wavelength: min_wavelength,
        });
    }
    Ok(())
}

/// Amplitude spectrum of a profile with the zero-frequency term removed.
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrum {
    pub frequencies: Vec<f64>,
    pub wavelengths: Vec<f64>,
    pub amplitudes: Vec<f64>,
}

impl Spectrum {
    /// Spectrum of `values` sampled every `sample_spacing` units.
    ///
    /// Needs at least four samples so that one non-zero frequency remains.
    pub fn from_transect(values: &[f64], sample_spacing: f64) -> Result<Self> {
        if !(sample_spacing.is_finite() && sample_spacing > 0.0) {
            return Err(GridProcessorError::invalid_input(format!(
                "sample spacing must be positive, got {}",
                sample_spacing
            )));
        }
        if values.len() < 4 {
            return Err(GridProcessorError::invalid_input(format!(
                "need at least 4 samples for a spectrum, got {}",
                values.len()
            )));
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(GridProcessorError::invalid_input(
                "profile contains non-finite values",
            ));
        }

        let half = values.len() / 2;
        let frequencies = frequency_axis(values.len(), sample_spacing, None)[1..].to_vec();
        let wavelengths = wavelengths(&frequencies);

        let min_wavelength = wavelengths.iter().copied().fold(f64::INFINITY, f64::min);
        check_nyquist(sample_spacing, min_wavelength)?;

        let amplitudes = amplitude_spectrum(values)[1..half].to_vec();
        check_length_equality(&amplitudes, &wavelengths)?;

        debug!(
            samples = values.len(),
            bins = amplitudes.len(),
            sample_spacing,
            "Computed spectrum"
        );

        Ok(Self {
            frequencies,
            wavelengths,
            amplitudes,
        })
    }

    pub fn len(&self) -> usize {
        self.amplitudes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.amplitudes.is_empty()
    }

    /// Wavelength of the strongest component.
    pub fn dominant_wavelength(&self) -> Option<f64> {
        self.amplitudes
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| self.wavelengths[i])
    }

    /// `(frequency, wavelength, amplitude)` rows.
    pub fn rows(&self) -> impl Iterator<Item = (f64, f64, f64)> + '_ {
        self.frequencies
            .iter()
            .zip(&self.wavelengths)
            .zip(&self.amplitudes)
            .map(|((&f, &w), &a)| (f, w, a))
    }
}
