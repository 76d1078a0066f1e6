/// Noise-free sensor trace holding `value` for `count` samples
pub fn constant_signal(value: f32, count: usize) -> Vec<f32> {
    vec![value; count]
}

/// Trace that switches from `before` to `after` at sample `step_at`
pub fn step_signal(before: f32, after: f32, step_at: usize, count: usize) -> Vec<f32> {
    (0..count)
        .map(|i| if i < step_at { before } else { after })
        .collect()
}

/// Linear sweep from `start` to `end` inclusive, e.g. a gas sensor
/// resistance falling as concentration rises
pub fn sweep_signal(start: f32, end: f32, count: usize) -> Vec<f32> {
    match count {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (count - 1) as f32;
            (0..count).map(|i| start + step * i as f32).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_signal() {
        assert_eq!(step_signal(1.0, 2.0, 2, 4), vec![1.0, 1.0, 2.0, 2.0]);
        assert_eq!(step_signal(1.0, 2.0, 0, 2), vec![2.0, 2.0]);
    }

    #[test]
    fn test_sweep_signal_endpoints() {
        let sweep = sweep_signal(100.0, 0.0, 11);
        assert_eq!(sweep.len(), 11);
        assert_eq!(sweep[0], 100.0);
        assert!((sweep[10] - 0.0).abs() < 1e-4);
        assert!(sweep_signal(1.0, 2.0, 0).is_empty());
        assert_eq!(sweep_signal(1.0, 2.0, 1), vec![1.0]);
    }
}
