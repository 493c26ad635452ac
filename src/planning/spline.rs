use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum SplineError {
    #[error("need at least 3 points to fit, got {0}")]
    TooFewPoints(usize),
    #[error("coordinate lengths differ: {xs} xs, {ys} ys")]
    LengthMismatch { xs: usize, ys: usize },
    #[error("x must be strictly increasing, but x[{index}] = {value} does not exceed its predecessor")]
    NotIncreasing { index: usize, value: f64 },
}

/// Natural cubic spline `y(x)` through points with strictly increasing `x`.
///
/// Outside the fitted range the curve continues along the tangent at the
/// nearest end.
#[derive(Debug, Clone)]
pub struct Spline {
    x: Vec<f64>,
    a: Vec<f64>,
    b: Vec<f64>,
    c: Vec<f64>,
    d: Vec<f64>,
}

impl Spline {
    pub fn fit(x: &[f64], y: &[f64]) -> Result<Self, SplineError> {
        if x.len() != y.len() {
            return Err(SplineError::LengthMismatch { xs: x.len(), ys: y.len() });
        }
        let n = x.len();
        if n < 3 {
            return Err(SplineError::TooFewPoints(n));
        }
        for i in 1..n {
            if !(x[i] > x[i - 1]) {
                return Err(SplineError::NotIncreasing { index: i, value: x[i] });
            }
        }

        let a = y.to_vec();
        let mut b = vec![0.0; n];
        let mut c = vec![0.0; n];
        let mut d = vec![0.0; n];

        let h: Vec<f64> = (0..n - 1).map(|i| x[i + 1] - x[i]).collect();

        // Tridiagonal system for the second-derivative coefficients
        let mut alpha = vec![0.0; n];
        for i in 1..n - 1 {
            alpha[i] = 3.0 / h[i] * (a[i + 1] - a[i]) - 3.0 / h[i - 1] * (a[i] - a[i - 1]);
        }

        let mut l = vec![1.0; n];
        let mut mu = vec![0.0; n];
        let mut z = vec![0.0; n];
        for i in 1..n - 1 {
            l[i] = 2.0 * (x[i + 1] - x[i - 1]) - h[i - 1] * mu[i - 1];
            mu[i] = h[i] / l[i];
            z[i] = (alpha[i] - h[i - 1] * z[i - 1]) / l[i];
        }

        for j in (0..n - 1).rev() {
            c[j] = z[j] - mu[j] * c[j + 1];
            b[j] = (a[j + 1] - a[j]) / h[j] - h[j] * (c[j + 1] + 2.0 * c[j]) / 3.0;
            d[j] = (c[j + 1] - c[j]) / (3.0 * h[j]);
        }

        // Slope at the right end, used for extrapolation
        let last = n - 2;
        b[n - 1] = b[last] + 2.0 * c[last] * h[last] + 3.0 * d[last] * h[last].powi(2);

        Ok(Self { x: x.to_vec(), a, b, c, d })
    }

    pub fn value(&self, t: f64) -> f64 {
        let n = self.x.len();
        if t <= self.x[0] {
            return self.a[0] + self.b[0] * (t - self.x[0]);
        }
        if t >= self.x[n - 1] {
            return self.a[n - 1] + self.b[n - 1] * (t - self.x[n - 1]);
        }

        let i = self.search_index(t);
        let dx = t - self.x[i];
        self.a[i] + self.b[i] * dx + self.c[i] * dx.powi(2) + self.d[i] * dx.powi(3)
    }

    fn search_index(&self, t: f64) -> usize {
        self.x
            .partition_point(|&x| x <= t)
            .saturating_sub(1)
            .min(self.x.len() - 2)
    }
}
