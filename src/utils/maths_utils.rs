use argminmax::ArgMinMax;

pub fn get_max(vec: &[f64]) -> f64 {
    let max_index: usize = vec.argmax();
    vec[max_index]
}

pub fn get_min(vec: &[f64]) -> f64 {
    let min_index: usize = vec.argmin();
    vec[min_index]
}

pub fn get_min_max(vec: &[f64]) -> (f64, f64) {
    (get_min(vec), get_max(vec))
}

/// Distance of `value` from `anchor` as a fraction of `anchor`.
/// Caller guarantees `anchor` is positive.
#[inline]
pub fn relative_distance(value: f64, anchor: f64) -> f64 {
    (value - anchor).abs() / anchor
}

/// Signed distance of `price` from `reference`, in percent of `reference`.
pub fn pct_change(reference: f64, price: f64) -> f64 {
    (price - reference) / reference * 100.0
}
