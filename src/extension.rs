/// Expected polymerase extension duration for a product of the given
/// length. Plain rule of three; typical polymerases run 15-60 s/kb.
pub fn estimate_seconds(amplicon_length: usize, seconds_per_kb: f64) -> f64 {
    seconds_per_kb * amplicon_length as f64 / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimate_seconds() {
        assert_eq!(estimate_seconds(1000, 30.0), 30.0);
        assert_eq!(estimate_seconds(500, 30.0), 15.0);
        assert_eq!(estimate_seconds(2500, 60.0), 150.0);
        assert_eq!(estimate_seconds(0, 30.0), 0.0);
    }
}
