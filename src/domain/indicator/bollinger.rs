//! Bollinger Bands.

use crate::domain::indicator::{latest, rolling_mean, rolling_std};

/// The three aligned bands.
#[derive(Debug, Clone, PartialEq)]
pub struct BollingerBands {
    pub upper: Vec<f64>,
    pub middle: Vec<f64>,
    pub lower: Vec<f64>,
}

/// Middle band is the SMA; upper and lower sit `num_std` sample standard
/// deviations away. NaN for the first `window - 1` points.
pub fn bollinger(closes: &[f64], window: usize, num_std: f64) -> BollingerBands {
    let middle = rolling_mean(closes, window);
    let std = rolling_std(closes, window);
    let upper = middle
        .iter()
        .zip(&std)
        .map(|(m, s)| m + num_std * s)
        .collect();
    let lower = middle
        .iter()
        .zip(&std)
        .map(|(m, s)| m - num_std * s)
        .collect();
    BollingerBands {
        upper,
        middle,
        lower,
    }
}

/// The latest point of each band.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BollingerPoint {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

/// Latest band values, the streaming call shape. NaN until warm-up completes.
pub fn bollinger_latest(closes: &[f64], window: usize, num_std: f64) -> BollingerPoint {
    let bands = bollinger(closes, window, num_std);
    BollingerPoint {
        upper: latest(&bands.upper),
        middle: latest(&bands.middle),
        lower: latest(&bands.lower),
    }
}
