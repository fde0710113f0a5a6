//! Proportional split of an amount across capacities

/// Split `amount` across `capacities`
///
/// If the amount covers the total capacity every capacity is drained. Otherwise
/// each take is proportional to its capacity and the takes sum to `amount`.
/// Non-positive capacities count as empty; a zero total yields all-zero takes.
///
/// The projection draws from one capacity at a time (the tax-free basis, the
/// untaxed bond pool) through [`draw`].
pub fn apportion(amount: f64, capacities: &[f64]) -> Vec<f64> {
    let usable: Vec<f64> = capacities.iter().map(|&c| c.max(0.0)).collect();
    let total: f64 = usable.iter().sum();

    if total <= 0.0 || amount <= 0.0 {
        return vec![0.0; capacities.len()];
    }
    if amount >= total {
        return usable;
    }

    let mut takes: Vec<f64> = usable.iter().map(|&c| amount * c / total).collect();

    // Push float residue into the largest take so the sum is exact
    let residue = amount - takes.iter().sum::<f64>();
    if let Some(largest) = takes
        .iter_mut()
        .max_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
    {
        *largest += residue;
    }

    takes
}

/// Portion of a single capacity covered by `amount` (`min(amount, capacity)` with guards)
pub fn draw(amount: f64, capacity: f64) -> f64 {
    apportion(amount, &[capacity])[0]
}

/// `numerator / denominator`, or 0 when the denominator is not positive
pub fn safe_fraction(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}
