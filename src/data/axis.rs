/// Round a plot axis limit outward to a "nice" value: the next multiple of
/// half the leading decade of `x`. Monotonic, and idempotent on its own
/// output.
pub fn max_value_with_padding(x: f64) -> f64 {
    if x == 0.0 || !x.is_finite() {
        return x;
    }
    let step = 10f64.powf(x.abs().log10().floor()) / 2.0;
    if x > 0.0 {
        (x / step - 1e-9).ceil() * step
    } else {
        -(x.abs() / step + 1e-9).floor() * step
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn rounds_up_to_half_decade() {
        assert_relative_eq!(max_value_with_padding(123.0), 150.0);
        assert_relative_eq!(max_value_with_padding(0.72), 0.75);
        assert_relative_eq!(max_value_with_padding(5.0), 5.0);
        assert_eq!(max_value_with_padding(0.0), 0.0);
    }

    #[test]
    fn negative_values_shrink_toward_zero() {
        assert_relative_eq!(max_value_with_padding(-123.0), -100.0);
    }

    #[test]
    fn idempotent_and_monotonic() {
        let mut prev = f64::NEG_INFINITY;
        for i in -200..=200 {
            let x = i as f64 * 3.7;
            let y = max_value_with_padding(x);
            assert_relative_eq!(max_value_with_padding(y), y, max_relative = 1e-12);
            assert!(y >= prev - 1e-9, "not monotonic at {}", x);
            prev = y;
        }
    }
}
