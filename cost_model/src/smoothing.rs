/// Trailing moving average. Day `i` averages over the last `min(i + 1, window)`
/// values, so the window shrinks at the start of the series. A window of 0 or 1
/// returns the input unchanged.
pub fn trailing_mean(values: &[f64], window: usize) -> Vec<f64> {
    if window <= 1 {
        return values.to_vec();
    }

    (0..values.len())
        .map(|i| {
            let start = (i + 1).saturating_sub(window);
            let slice = &values[start..=i];
            slice.iter().sum::<f64>() / slice.len() as f64
        })
        .collect()
}
