use nalgebra::{DMatrix, DVector};

// ---------------------------------------------------------------------------
// Piecewise-linear interpolation over sorted sample points
// ---------------------------------------------------------------------------

/// Piecewise-linear interpolator. Values outside the sampled range are
/// clamped to the first/last sample.
#[derive(Debug, Clone, Default)]
pub struct LinearInterpolator {
    points: Vec<(f64, f64)>, // sorted by x, unique x
}

impl LinearInterpolator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_points(xs: &[f64], ys: &[f64]) -> Self {
        let mut interp = Self::new();
        for (&x, &y) in xs.iter().zip(ys) {
            interp.add_point(x, y);
        }
        interp
    }

    /// Insert a sample, replacing any existing sample at the same x.
    pub fn add_point(&mut self, x: f64, y: f64) {
        match self.points.binary_search_by(|p| p.0.total_cmp(&x)) {
            Ok(i) => self.points[i].1 = y,
            Err(i) => self.points.insert(i, (x, y)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn x_points(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p.0)
    }

    pub fn first_x(&self) -> Option<f64> {
        self.points.first().map(|p| p.0)
    }

    /// Interpolated value at `x`; NaN when no samples exist.
    pub fn value(&self, x: f64) -> f64 {
        let (first, last) = match (self.points.first(), self.points.last()) {
            (Some(f), Some(l)) => (f, l),
            _ => return f64::NAN,
        };
        if x <= first.0 {
            return first.1;
        }
        if x >= last.0 {
            return last.1;
        }
        // first index with p.x > x; guaranteed 1..len by the guards above
        let hi = self.points.partition_point(|p| p.0 <= x);
        let (x0, y0) = self.points[hi - 1];
        let (x1, y1) = self.points[hi];
        if x == x0 {
            return y0;
        }
        y0 + (x - x0) / (x1 - x0) * (y1 - y0)
    }
}

// ---------------------------------------------------------------------------
// Polynomial interpolation matching values and derivatives
// ---------------------------------------------------------------------------

/// Polynomial interpolator prescribing the value and/or derivatives of a
/// polynomial at a set of points.
///
/// `PolyInterpolator::new(&[&[a, b], &[a, b], &[a]])` builds a degree-4
/// polynomial fixed by `p(a)`, `p(b)`, `p'(a)`, `p'(b)` and `p''(a)`. The
/// constraint matrix is inverted once, so the same interpolator can be
/// reused for any set of boundary values.
#[derive(Debug, Clone)]
pub struct PolyInterpolator {
    inverse: DMatrix<f64>,
}

impl PolyInterpolator {
    /// `points[k]` holds the x positions at which the k-th derivative is
    /// prescribed. Returns `None` if the constraints are not independent.
    pub fn new(points: &[&[f64]]) -> Option<Self> {
        let count: usize = points.iter().map(|p| p.len()).sum();
        if count == 0 {
            return None;
        }
        let mut matrix = DMatrix::<f64>::zeros(count, count);
        let mut row = 0;
        for (order, xs) in points.iter().enumerate() {
            for &x in xs.iter() {
                for j in order..count {
                    // d^order/dx^order of x^j = j!/(j-order)! * x^(j-order)
                    let factor: f64 = ((j - order + 1)..=j).map(|k| k as f64).product();
                    matrix[(row, j)] = factor * x.powi((j - order) as i32);
                }
                row += 1;
            }
        }
        let inverse = matrix.lu().try_inverse()?;
        Some(Self { inverse })
    }

    /// Number of constraints (= number of polynomial coefficients).
    pub fn len(&self) -> usize {
        self.inverse.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Polynomial coefficients (lowest order first) for the given constraint
    /// values, listed in the same order as the points passed to `new`.
    pub fn interpolator(&self, values: &[f64]) -> Vec<f64> {
        debug_assert_eq!(values.len(), self.len());
        let b = DVector::from_iterator(self.len(), values.iter().copied());
        (&self.inverse * b).iter().copied().collect()
    }

    pub fn interpolate(&self, x: f64, values: &[f64]) -> f64 {
        Self::eval(x, &self.interpolator(values))
    }

    /// Evaluate a polynomial given by its coefficients (lowest order first).
    pub fn eval(x: f64, coefficients: &[f64]) -> f64 {
        coefficients.iter().rev().fold(0.0, |acc, c| acc * x + c)
    }

    /// Evaluate the first derivative of a polynomial.
    pub fn eval_derivative(x: f64, coefficients: &[f64]) -> f64 {
        coefficients
            .iter()
            .enumerate()
            .skip(1)
            .rev()
            .fold(0.0, |acc, (i, c)| acc * x + i as f64 * c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn linear_interpolates_and_clamps() {
        let mut li = LinearInterpolator::new();
        li.add_point(2.0, 20.0);
        li.add_point(0.0, 0.0);
        li.add_point(1.0, 5.0);
        assert_relative_eq!(li.value(0.5), 2.5);
        assert_relative_eq!(li.value(1.5), 12.5);
        assert_relative_eq!(li.value(1.0), 5.0);
        assert_relative_eq!(li.value(-3.0), 0.0);
        assert_relative_eq!(li.value(9.0), 20.0);
    }

    #[test]
    fn linear_empty_is_nan() {
        assert!(LinearInterpolator::new().value(1.0).is_nan());
    }

    #[test]
    fn linear_replaces_duplicate_x() {
        let mut li = LinearInterpolator::new();
        li.add_point(1.0, 1.0);
        li.add_point(1.0, 3.0);
        assert_eq!(li.len(), 1);
        assert_relative_eq!(li.value(1.0), 3.0);
    }

    #[test]
    fn cubic_hermite_matches_constraints() {
        let poly = PolyInterpolator::new(&[&[1.0, 1.3], &[1.0, 1.3]]).unwrap();
        let c = poly.interpolator(&[0.2, 0.9, 1.5, -0.4]);
        assert_relative_eq!(PolyInterpolator::eval(1.0, &c), 0.2, epsilon = 1e-10);
        assert_relative_eq!(PolyInterpolator::eval(1.3, &c), 0.9, epsilon = 1e-10);
        assert_relative_eq!(PolyInterpolator::eval_derivative(1.0, &c), 1.5, epsilon = 1e-9);
        assert_relative_eq!(PolyInterpolator::eval_derivative(1.3, &c), -0.4, epsilon = 1e-9);
    }

    #[test]
    fn reproduces_exact_polynomial() {
        // p(x) = 1 + 2x - x^2 + 0.5x^3 + 0.25x^4
        let p = |x: f64| 1.0 + 2.0 * x - x * x + 0.5 * x.powi(3) + 0.25 * x.powi(4);
        let dp = |x: f64| 2.0 - 2.0 * x + 1.5 * x * x + x.powi(3);
        let ddp = |x: f64| -2.0 + 3.0 * x + 3.0 * x * x;
        let poly = PolyInterpolator::new(&[&[0.9, 1.5], &[0.9, 1.5], &[0.9]]).unwrap();
        let values = [p(0.9), p(1.5), dp(0.9), dp(1.5), ddp(0.9)];
        for x in [0.9, 1.0, 1.2, 1.5, 2.0] {
            assert_relative_eq!(poly.interpolate(x, &values), p(x), epsilon = 1e-9);
        }
    }

    #[test]
    fn duplicate_points_are_singular() {
        assert!(PolyInterpolator::new(&[&[1.0, 1.0]]).is_none());
    }
}
