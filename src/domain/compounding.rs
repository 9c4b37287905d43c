//! Compounded yield math over monthly percentage returns.
//!
//! annualized = ((prod(1 + r_i / 100)) ^ (12 / n) - 1) * 100
//!
//! Both functions return `None` ("not computable") for an empty input, a
//! non-finite input, or a growth product that is zero or negative. A
//! fractional power of a non-positive base has no real value.

const MONTHS_PER_YEAR: f64 = 12.0;

/// Round to 2 decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn growth_product(monthly_returns: &[f64]) -> Option<f64> {
    if monthly_returns.is_empty() || monthly_returns.iter().any(|r| !r.is_finite()) {
        return None;
    }
    let product: f64 = monthly_returns.iter().map(|r| 1.0 + r / 100.0).product();
    if product > 0.0 && product.is_finite() {
        Some(product)
    } else {
        None
    }
}

/// Annualized compounded yield in percent, rounded to 2 decimals.
///
/// A 6-month series is extrapolated to a 12-month equivalent and a 24-month
/// series is compressed onto one year.
pub fn compounded_yield(monthly_returns: &[f64]) -> Option<f64> {
    let product = growth_product(monthly_returns)?;
    let exponent = MONTHS_PER_YEAR / monthly_returns.len() as f64;
    Some(round2((product.powf(exponent) - 1.0) * 100.0))
}

/// Total compounded return over the whole series in percent, not annualized.
pub fn cumulative_yield(monthly_returns: &[f64]) -> Option<f64> {
    let product = growth_product(monthly_returns)?;
    Some(round2((product - 1.0) * 100.0))
}
