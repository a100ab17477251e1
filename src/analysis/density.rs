use std::f64::consts::PI;

/// More values than this are needed before a density curve is drawn.
pub const MIN_KDE_VALUES: usize = 5;

/// Points along a density curve.
pub const KDE_CURVE_POINTS: usize = 100;

/// Gaussian kernel density estimate with Scott's bandwidth
/// (`sample std × n^(-1/5)`).
#[derive(Debug, Clone, PartialEq)]
pub struct GaussianKde {
    values: Vec<f64>,
    bandwidth: f64,
}

impl GaussianKde {
    /// `None` for fewer than two values or no spread.
    pub fn fit(values: &[f64]) -> Option<Self> {
        let n = values.len();
        if n < 2 {
            return None;
        }
        let mean = values.iter().sum::<f64>() / n as f64;
        let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
        let bandwidth = var.sqrt() * (n as f64).powf(-0.2);
        if !(bandwidth > 0.0 && bandwidth.is_finite()) {
            return None;
        }
        Some(GaussianKde {
            values: values.to_vec(),
            bandwidth,
        })
    }

    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    pub fn evaluate(&self, x: f64) -> f64 {
        let h = self.bandwidth;
        let norm = 1.0 / ((2.0 * PI).sqrt() * h * self.values.len() as f64);
        norm * self
            .values
            .iter()
            .map(|v| (-0.5 * ((x - v) / h).powi(2)).exp())
            .sum::<f64>()
    }

    /// `(x, density)` at `points` evenly spaced positions over `[low, high]`.
    pub fn curve(&self, low: f64, high: f64, points: usize) -> Vec<(f64, f64)> {
        match points {
            0 => Vec::new(),
            1 => vec![(low, self.evaluate(low))],
            _ => {
                let step = (high - low) / (points - 1) as f64;
                (0..points)
                    .map(|i| {
                        let x = if i == points - 1 { high } else { low + step * i as f64 };
                        (x, self.evaluate(x))
                    })
                    .collect()
            }
        }
    }
}

/// Density curve over the data span, or `None` when there are too few values
/// or no spread.
pub fn density_curve(values: &[f64]) -> Option<Vec<(f64, f64)>> {
    if values.len() <= MIN_KDE_VALUES {
        return None;
    }
    let kde = GaussianKde::fit(values)?;
    let low = values.iter().copied().fold(f64::INFINITY, f64::min);
    let high = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    Some(kde.curve(low, high, KDE_CURVE_POINTS))
}
