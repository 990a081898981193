pub struct FilterHelper;

impl FilterHelper {
    /// Centered box filter used for the filtered-delay estimate.
    ///
    /// Window edges shrink near the trace boundaries so the output keeps the
    /// input length. A window of 0 or 1 returns the input unchanged.
    pub fn moving_average(input: &[f64], window: usize) -> Vec<f64> {
        if window <= 1 || input.len() < 2 {
            return input.to_vec();
        }
        let half = window / 2;
        let mut output = Vec::with_capacity(input.len());
        for i in 0..input.len() {
            let lo = i.saturating_sub(half);
            let hi = (i + half + 1).min(input.len());
            let sum: f64 = input[lo..hi].iter().sum();
            output.push(sum / (hi - lo) as f64);
        }
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn moving_average_keeps_length() {
        let smoothed = FilterHelper::moving_average(&[1.0, 2.0, 3.0, 4.0, 5.0], 3);
        assert_eq!(smoothed.len(), 5);
        assert_eq!(smoothed[2], 3.0);
    }

    #[test]
    fn moving_average_window_one_is_identity() {
        let input = [1.0, -1.0, 2.0];
        assert_eq!(FilterHelper::moving_average(&input, 1), input.to_vec());
    }

    #[test]
    fn moving_average_suppresses_single_spike() {
        let input = [0.0, 0.0, 9.0, 0.0, 0.0];
        let smoothed = FilterHelper::moving_average(&input, 3);
        assert!(smoothed[2] < input[2]);
        assert!(smoothed[1] > 0.0);
    }
}
