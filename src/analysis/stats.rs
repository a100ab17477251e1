use crate::config::OverlayToggles;

/// Fewest pairs for a correlation or a trend line.
pub const MIN_CORRELATION_PAIRS: usize = 3;

/// Descriptive statistics of one series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (n - 1); 0 for a single value.
    pub std_dev: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    pub q1: f64,
    pub q3: f64,
    pub iqr: f64,
    /// `std_dev / mean × 100`, absent when the mean is 0.
    pub coefficient_of_variation: Option<f64>,
}

impl Summary {
    pub fn of(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        let count = sorted.len();
        let mean = mean(&sorted);
        let std_dev = if count > 1 {
            (sum_sq_dev(&sorted, mean) / (count - 1) as f64).sqrt()
        } else {
            0.0
        };
        let q1 = quantile(&sorted, 0.25);
        let q3 = quantile(&sorted, 0.75);

        Some(Summary {
            count,
            mean,
            std_dev,
            median: quantile(&sorted, 0.5),
            min: sorted[0],
            max: sorted[count - 1],
            q1,
            q3,
            iqr: q3 - q1,
            coefficient_of_variation: (mean != 0.0).then(|| std_dev / mean * 100.0),
        })
    }

    /// Deviation of `value` from the mean in standard deviations, 0 when the
    /// spread is 0.
    pub fn z_score(&self, value: f64) -> f64 {
        if self.std_dev > 0.0 {
            (value - self.mean) / self.std_dev
        } else {
            0.0
        }
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn sum_sq_dev(values: &[f64], mean: f64) -> f64 {
    values.iter().map(|v| (v - mean).powi(2)).sum()
}

/// Linear-interpolated quantile of sorted values, `q` in `[0, 1]`.
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let idx = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = idx.floor() as usize;
    let hi = idx.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        let frac = idx - lo as f64;
        sorted[lo] * (1.0 - frac) + sorted[hi] * frac
    }
}

/// Share of `values` strictly below `value`, as a percentage.
pub fn percentile_rank(values: &[f64], value: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let below = values.iter().filter(|v| **v < value).count();
    below as f64 / values.len() as f64 * 100.0
}

/// Pearson correlation; `None` with fewer than three pairs or no spread.
pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    LinearFit::fit(xs, ys).filter(|fit| fit.has_y_spread).map(|fit| fit.r)
}

/// Least-squares line `y = slope × x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    pub r: f64,
    pub r_squared: f64,
    /// Standard error of the slope.
    pub std_err: f64,
    /// Two-sided p-value for `r`, Student's t with `pairs - 2` degrees of freedom.
    pub p_value: f64,
    pub pairs: usize,
    has_y_spread: bool,
}

impl LinearFit {
    /// `None` with fewer than three pairs, mismatched lengths, or constant x.
    pub fn fit(xs: &[f64], ys: &[f64]) -> Option<Self> {
        let n = xs.len();
        if n != ys.len() || n < MIN_CORRELATION_PAIRS {
            return None;
        }
        let mx = mean(xs);
        let my = mean(ys);
        let ssx = sum_sq_dev(xs, mx);
        let ssy = sum_sq_dev(ys, my);
        if ssx == 0.0 {
            return None;
        }
        let sxy: f64 = xs.iter().zip(ys).map(|(x, y)| (x - mx) * (y - my)).sum();

        let slope = sxy / ssx;
        let intercept = my - slope * mx;
        let r = if ssy == 0.0 {
            0.0
        } else {
            (sxy / (ssx * ssy).sqrt()).clamp(-1.0, 1.0)
        };
        let r_squared = r * r;
        let std_err = ((1.0 - r_squared) * ssy / ssx / (n - 2) as f64).max(0.0).sqrt();

        Some(LinearFit {
            slope,
            intercept,
            r,
            r_squared,
            std_err,
            p_value: correlation_p_value(r, n),
            pairs: n,
            has_y_spread: ssy != 0.0,
        })
    }

    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Two-sided p-value for `r` from Student's t with `n - 2` degrees of freedom.
fn correlation_p_value(r: f64, n: usize) -> f64 {
    if r.abs() >= 1.0 {
        return 0.0;
    }
    if n < MIN_CORRELATION_PAIRS {
        return 1.0;
    }
    let df = (n - 2) as f64;
    let t = r * (df / (1.0 - r * r)).sqrt();
    students_t_two_sided(t, df)
}

/// `P(|T| > |t|)` for `T ~ t(df)`, via the regularized incomplete beta
/// function `I_x(df/2, 1/2)` with `x = df / (df + t²)`.
pub fn students_t_two_sided(t: f64, df: f64) -> f64 {
    if !t.is_finite() {
        return 0.0;
    }
    incomplete_beta(df / 2.0, 0.5, df / (df + t * t)).clamp(0.0, 1.0)
}

/// Lanczos approximation (g = 7, n = 9).
fn ln_gamma(x: f64) -> f64 {
    const COEFFS: [f64; 9] = [
        0.999_999_999_999_809_93,
        676.520_368_121_885_1,
        -1_259.139_216_722_402_8,
        771.323_428_777_653_13,
        -176.615_029_162_140_59,
        12.507_343_278_686_905,
        -0.138_571_095_265_720_12,
        9.984_369_578_019_571_6e-6,
        1.505_632_735_149_311_6e-7,
    ];
    if x < 0.5 {
        let pi = std::f64::consts::PI;
        return (pi / (pi * x).sin()).ln() - ln_gamma(1.0 - x);
    }
    let x = x - 1.0;
    let t = x + 7.5;
    let series = COEFFS[1..]
        .iter()
        .enumerate()
        .fold(COEFFS[0], |acc, (i, c)| acc + c / (x + i as f64 + 1.0));
    0.5 * (2.0 * std::f64::consts::PI).ln() + (x + 0.5) * t.ln() - t + series.ln()
}

/// Regularized incomplete beta `I_x(a, b)`.
fn incomplete_beta(a: f64, b: f64, x: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    if x >= 1.0 {
        return 1.0;
    }
    let front = (ln_gamma(a + b) - ln_gamma(a) - ln_gamma(b) + a * x.ln() + b * (1.0 - x).ln()).exp();
    if x < (a + 1.0) / (a + b + 2.0) {
        front * beta_fraction(a, b, x) / a
    } else {
        1.0 - front * beta_fraction(b, a, 1.0 - x) / b
    }
}

/// Continued fraction for the incomplete beta (modified Lentz).
fn beta_fraction(a: f64, b: f64, x: f64) -> f64 {
    const TINY: f64 = 1e-30;
    const EPS: f64 = 1e-14;
    let guard = |v: f64| if v.abs() < TINY { TINY } else { v };

    let mut c = 1.0;
    let mut d = 1.0 / guard(1.0 - (a + b) * x / (a + 1.0));
    let mut h = d;
    for m in 1..300 {
        let m = m as f64;
        let m2 = 2.0 * m;
        let even = m * (b - m) * x / ((a - 1.0 + m2) * (a + m2));
        d = 1.0 / guard(1.0 + even * d);
        c = guard(1.0 + even / c);
        h *= d * c;

        let odd = -(a + m) * (a + b + m) * x / ((a + m2) * (a + 1.0 + m2));
        d = 1.0 / guard(1.0 + odd * d);
        c = guard(1.0 + odd / c);
        let step = d * c;
        h *= step;
        if (step - 1.0).abs() < EPS {
            break;
        }
    }
    h
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayKind {
    Median,
    Mean,
    LowerQuartile,
    UpperQuartile,
    MinusSigma,
    PlusSigma,
}

/// A reference line for the display collaborator to draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayLine {
    pub kind: OverlayKind,
    pub value: f64,
}

/// Reference lines for the enabled toggles. Needs at least two values; the
/// ±σ band uses the population standard deviation.
pub fn overlay_lines(values: &[f64], toggles: &OverlayToggles) -> Vec<OverlayLine> {
    if values.len() < 2 || !toggles.any() {
        return Vec::new();
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let m = mean(&sorted);
    let sigma = (sum_sq_dev(&sorted, m) / sorted.len() as f64).sqrt();

    let mut lines = Vec::new();
    let mut push = |kind, value| lines.push(OverlayLine { kind, value });
    if toggles.median {
        push(OverlayKind::Median, quantile(&sorted, 0.5));
    }
    if toggles.mean {
        push(OverlayKind::Mean, m);
    }
    if toggles.quartiles {
        push(OverlayKind::LowerQuartile, quantile(&sorted, 0.25));
        push(OverlayKind::UpperQuartile, quantile(&sorted, 0.75));
    }
    if toggles.std_dev {
        push(OverlayKind::MinusSigma, m - sigma);
        push(OverlayKind::PlusSigma, m + sigma);
    }
    lines
}
