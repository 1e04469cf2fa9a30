//! Window functions for spectral analysis
//!
//! Coefficients follow the symmetric (M-1 denominator) definitions.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::error::SinkError;

/// Shape parameter used for the Kaiser window
pub const KAISER_BETA: f64 = 6.76;

/// Window function types
///
/// Integer codes (see [`WindowType::code`]) follow the numbering used by
/// the usual radio toolkits, so hosts can pass plain integers through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowType {
    /// Hamming window: w[n] = 0.54 - 0.46*cos(2πn/(M-1))
    /// Sidelobe attenuation: ~53 dB
    Hamming,

    /// Hann window: w[n] = 0.5 - 0.5*cos(2πn/(M-1))
    /// Sidelobe attenuation: ~44 dB
    Hann,

    /// Blackman window: w[n] = 0.42 - 0.5*cos(2πn/(M-1)) + 0.08*cos(4πn/(M-1))
    /// Sidelobe attenuation: ~74 dB
    Blackman,

    /// Rectangular window (no windowing)
    Rectangular,

    /// Kaiser window with beta = [`KAISER_BETA`]
    Kaiser,

    /// 4-term Blackman-Harris, ~92 dB sidelobes
    BlackmanHarris,

    /// Triangular window with zero endpoints
    Bartlett,

    /// Flat-top window, accurate amplitude at the cost of resolution
    FlatTop,
}

impl WindowType {
    /// Integer code of this window type
    pub fn code(&self) -> i32 {
        match self {
            WindowType::Hamming => 0,
            WindowType::Hann => 1,
            WindowType::Blackman => 2,
            WindowType::Rectangular => 3,
            WindowType::Kaiser => 4,
            WindowType::BlackmanHarris => 5,
            WindowType::Bartlett => 6,
            WindowType::FlatTop => 7,
        }
    }
}

impl TryFrom<i32> for WindowType {
    type Error = SinkError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(WindowType::Hamming),
            1 => Ok(WindowType::Hann),
            2 => Ok(WindowType::Blackman),
            3 => Ok(WindowType::Rectangular),
            4 => Ok(WindowType::Kaiser),
            5 => Ok(WindowType::BlackmanHarris),
            6 => Ok(WindowType::Bartlett),
            7 => Ok(WindowType::FlatTop),
            other => Err(SinkError::UnknownWindow(other)),
        }
    }
}

/// Sum of cosines a0 - a1*cos(x) + a2*cos(2x) - a3*cos(3x) + ...
fn cosine_sum(coeffs: &[f64], length: usize) -> Vec<f64> {
    let denom = (length - 1) as f64;
    (0..length)
        .map(|n| {
            let x = 2.0 * PI * n as f64 / denom;
            coeffs
                .iter()
                .enumerate()
                .map(|(k, &a)| {
                    let sign = if k % 2 == 0 { 1.0 } else { -1.0 };
                    sign * a * (k as f64 * x).cos()
                })
                .sum()
        })
        .collect()
}

/// Zeroth-order modified Bessel function of the first kind (power series)
fn bessel_i0(x: f64) -> f64 {
    let half = x / 2.0;
    let mut term = 1.0;
    let mut sum = 1.0;
    for k in 1..50 {
        term *= (half / k as f64) * (half / k as f64);
        sum += term;
        if term < sum * 1e-16 {
            break;
        }
    }
    sum
}

/// Generate window coefficients
///
/// # Arguments
/// * `window_type` - Type of window function
/// * `length` - Number of samples (M)
///
/// # Returns
/// Vector of window coefficients w[n] for n = 0..M-1
pub fn generate_window(window_type: WindowType, length: usize) -> Vec<f64> {
    // The symmetric definitions divide by M-1
    if length <= 1 {
        return vec![1.0; length];
    }

    match window_type {
        WindowType::Hamming => cosine_sum(&[0.54, 0.46], length),
        WindowType::Hann => cosine_sum(&[0.5, 0.5], length),
        WindowType::Blackman => cosine_sum(&[0.42, 0.5, 0.08], length),
        WindowType::BlackmanHarris => cosine_sum(&[0.35875, 0.48829, 0.14128, 0.01168], length),
        WindowType::FlatTop => cosine_sum(
            &[0.21557895, 0.41663158, 0.277263158, 0.083578947, 0.006947368],
            length,
        ),
        WindowType::Rectangular => vec![1.0; length],
        WindowType::Bartlett => {
            let half = (length - 1) as f64 / 2.0;
            (0..length)
                .map(|n| 1.0 - ((n as f64 - half) / half).abs())
                .collect()
        }
        WindowType::Kaiser => {
            let denom = bessel_i0(KAISER_BETA);
            let m = (length - 1) as f64;
            (0..length)
                .map(|n| {
                    let r = 2.0 * n as f64 / m - 1.0;
                    bessel_i0(KAISER_BETA * (1.0 - r * r).max(0.0).sqrt()) / denom
                })
                .collect()
        }
    }
}
