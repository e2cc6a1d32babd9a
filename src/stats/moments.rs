//! Running central moments (mean, variance, skewness, kurtosis)
//!
//! Single-pass accumulation of the first four central moments, with a
//! parallel merge so independently built accumulators can be combined.

use crate::utils::error::StatsError;

/// Online accumulator for the first four central moments of a scalar stream
///
/// `m1` is the running mean; `m2`, `m3` and `m4` are the sums of the 2nd,
/// 3rd and 4th powers of deviations from it. Memory use is constant.
///
/// # Example
///
/// ```
/// use cohortstat::stats::MomentAccumulator;
///
/// let mut acc = MomentAccumulator::new();
/// for x in [1.0, 2.0, 3.0, 4.0, 5.0] {
///     acc.incorporate(x).unwrap();
/// }
///
/// assert_eq!(acc.count(), 5);
/// assert!((acc.mean() - 3.0).abs() < 1e-12);
/// assert!((acc.variance() - 2.5).abs() < 1e-12);
/// assert!((acc.kurtosis().unwrap() + 1.2).abs() < 1e-9);
/// ```
///
/// # Distributed Usage
///
/// ```
/// use cohortstat::stats::MomentAccumulator;
///
/// let left: MomentAccumulator = [1.0, 2.0, 3.0].into_iter().collect();
/// let right: MomentAccumulator = [4.0, 5.0, 6.0].into_iter().collect();
///
/// let both = left.merge(&right);
/// assert_eq!(both.count(), 6);
/// assert!((both.mean() - 3.5).abs() < 1e-12);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct MomentAccumulator {
    n: u64,
    m1: f64,
    m2: f64,
    m3: f64,
    m4: f64,
}

impl Default for MomentAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl MomentAccumulator {
    /// Create an empty accumulator
    pub const fn new() -> Self {
        Self {
            n: 0,
            m1: 0.0,
            m2: 0.0,
            m3: 0.0,
            m4: 0.0,
        }
    }

    /// Rebuild an accumulator from stored moments
    pub fn from_raw(n: u64, m1: f64, m2: f64, m3: f64, m4: f64) -> Self {
        if n == 0 {
            return Self::new();
        }
        Self { n, m1, m2, m3, m4 }
    }

    /// Add one value to the stream
    ///
    /// Non-finite values are rejected and leave the state untouched.
    pub fn incorporate(&mut self, x: f64) -> Result<(), StatsError> {
        if !x.is_finite() {
            return Err(StatsError::NonFinite(x));
        }

        let n1 = self.n as f64;
        self.n += 1;
        let n = self.n as f64;

        let delta = x - self.m1;
        let delta_n = delta / n;
        let delta_n2 = delta_n * delta_n;
        let term1 = delta * delta_n * n1;

        // Each line reads the previous values of the lower moments.
        self.m4 += term1 * delta_n2 * (n * n - 3.0 * n + 3.0) + 6.0 * delta_n2 * self.m2
            - 4.0 * delta_n * self.m3;
        self.m3 += term1 * delta_n * (n - 2.0) - 3.0 * delta_n * self.m2;
        self.m2 += term1;
        self.m1 += delta_n;

        Ok(())
    }

    /// Add every finite value of an iterator, returning how many were rejected
    pub fn extend_values<I: IntoIterator<Item = f64>>(&mut self, values: I) -> usize {
        values
            .into_iter()
            .filter(|&x| self.incorporate(x).is_err())
            .count()
    }

    /// Combine with another accumulator into the moments of both streams
    ///
    /// An empty operand is the identity.
    pub fn merge(&self, other: &Self) -> Self {
        if other.n == 0 {
            return self.clone();
        }
        if self.n == 0 {
            return other.clone();
        }

        let na = self.n as f64;
        let nb = other.n as f64;
        let total = self.n + other.n;
        let n = total as f64;

        let delta = other.m1 - self.m1;
        let delta2 = delta * delta;
        let delta3 = delta2 * delta;
        let delta4 = delta2 * delta2;

        let m1 = (na * self.m1 + nb * other.m1) / n;
        let m2 = self.m2 + other.m2 + delta2 * na * nb / n;
        let m3 = self.m3
            + other.m3
            + delta3 * na * nb * (na - nb) / (n * n)
            + 3.0 * delta * (na * other.m2 - nb * self.m2) / n;
        let m4 = self.m4
            + other.m4
            + delta4 * na * nb * (na * na - na * nb + nb * nb) / (n * n * n)
            + 6.0 * delta2 * (na * na * other.m2 + nb * nb * self.m2) / (n * n)
            + 4.0 * delta * (na * other.m3 - nb * self.m3) / n;

        Self {
            n: total,
            m1,
            m2,
            m3,
            m4,
        }
    }

    /// In-place form of [`merge`](Self::merge)
    pub fn merge_from(&mut self, other: &Self) {
        *self = self.merge(other);
    }

    /// Number of values incorporated
    pub fn count(&self) -> u64 {
        self.n
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Raw moments `(m1, m2, m3, m4)`
    pub fn raw_moments(&self) -> (f64, f64, f64, f64) {
        (self.m1, self.m2, self.m3, self.m4)
    }

    pub fn mean(&self) -> f64 {
        self.m1
    }

    /// Sample variance (n − 1 denominator); 0 for fewer than two values
    pub fn variance(&self) -> f64 {
        if self.n < 2 {
            0.0
        } else {
            self.m2 / (self.n - 1) as f64
        }
    }

    pub fn std(&self) -> f64 {
        self.variance().sqrt()
    }

    /// Standard error of the mean
    pub fn standard_error(&self) -> f64 {
        if self.n == 0 {
            0.0
        } else {
            self.std() / (self.n as f64).sqrt()
        }
    }

    /// Skewness `sqrt(n) * m3 / m2^1.5`
    pub fn skewness(&self) -> Result<f64, StatsError> {
        if self.m2 == 0.0 {
            return Err(StatsError::DegenerateDistribution);
        }
        Ok((self.n as f64).sqrt() * self.m3 / (self.m2 * self.m2.sqrt()))
    }

    /// Excess kurtosis `n * m4 / m2² − 3`
    pub fn kurtosis(&self) -> Result<f64, StatsError> {
        if self.m2 == 0.0 {
            return Err(StatsError::DegenerateDistribution);
        }
        Ok(self.n as f64 * self.m4 / (self.m2 * self.m2) - 3.0)
    }

    /// Distance of `x` from the mean in standard deviations
    pub fn z_score(&self, x: f64) -> Result<f64, StatsError> {
        let std = self.std();
        if std == 0.0 {
            return Err(StatsError::DegenerateDistribution);
        }
        Ok((x - self.m1) / std)
    }
}

impl FromIterator<f64> for MomentAccumulator {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        let mut acc = Self::new();
        acc.extend_values(iter);
        acc
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() <= tol * a.abs().max(b.abs()).max(1.0)
    }

    #[test]
    fn test_empty() {
        let acc = MomentAccumulator::new();

        assert!(acc.is_empty());
        assert_eq!(acc.mean(), 0.0);
        assert_eq!(acc.variance(), 0.0);
        assert_eq!(acc.raw_moments(), (0.0, 0.0, 0.0, 0.0));
        assert_eq!(acc.skewness(), Err(StatsError::DegenerateDistribution));
    }

    #[test]
    fn test_known_values() {
        let acc: MomentAccumulator = [1.0, 2.0, 3.0, 4.0, 5.0].into_iter().collect();

        assert_eq!(acc.count(), 5);
        assert!((acc.mean() - 3.0).abs() < 1e-6);
        assert!((acc.variance() - 2.5).abs() < 1e-6);
        assert!(acc.skewness().unwrap().abs() < 1e-6);
        assert!((acc.kurtosis().unwrap() + 1.2).abs() < 1e-6);
    }

    #[test]
    fn test_skewed_stream() {
        // Central moments of [1, 1, 1, 5]: mean 2, m2 = 12, m3 = 24, m4 = 84
        let acc: MomentAccumulator = [1.0, 1.0, 1.0, 5.0].into_iter().collect();
        let (m1, m2, m3, m4) = acc.raw_moments();

        assert!(close(m1, 2.0, 1e-12));
        assert!(close(m2, 12.0, 1e-12));
        assert!(close(m3, 24.0, 1e-12));
        assert!(close(m4, 84.0, 1e-12));
        assert!(acc.skewness().unwrap() > 0.0);
    }

    #[test]
    fn test_single_value_is_degenerate() {
        let mut acc = MomentAccumulator::new();
        acc.incorporate(42.0).unwrap();

        assert_eq!(acc.mean(), 42.0);
        assert_eq!(acc.variance(), 0.0);
        assert_eq!(acc.skewness(), Err(StatsError::DegenerateDistribution));
        assert_eq!(acc.kurtosis(), Err(StatsError::DegenerateDistribution));
        assert_eq!(acc.z_score(40.0), Err(StatsError::DegenerateDistribution));
    }

    #[test]
    fn test_non_finite_rejected() {
        let mut acc = MomentAccumulator::new();
        acc.incorporate(1.0).unwrap();

        assert!(acc.incorporate(f64::NAN).is_err());
        assert!(acc.incorporate(f64::INFINITY).is_err());

        assert_eq!(acc.count(), 1);
        assert_eq!(acc.mean(), 1.0);
    }

    #[test]
    fn test_extend_counts_rejections() {
        let mut acc = MomentAccumulator::new();
        let rejected = acc.extend_values([1.0, f64::NAN, 3.0]);

        assert_eq!(rejected, 1);
        assert_eq!(acc.count(), 2);
        assert!((acc.mean() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_merge_pair_matches_sequential() {
        let mut a = MomentAccumulator::new();
        let mut b = MomentAccumulator::new();
        a.incorporate(3.0).unwrap();
        b.incorporate(8.0).unwrap();

        let merged = a.merge(&b);
        let sequential: MomentAccumulator = [3.0, 8.0].into_iter().collect();

        assert_eq!(merged.count(), 2);
        let (m1, m2, m3, m4) = merged.raw_moments();
        let (s1, s2, s3, s4) = sequential.raw_moments();
        assert!(close(m1, s1, 1e-12));
        assert!(close(m2, s2, 1e-12));
        assert!(close(m3, s3, 1e-12));
        assert!(close(m4, s4, 1e-12));
    }

    #[test]
    fn test_merge_empty_is_identity() {
        let acc: MomentAccumulator = [2.0, 4.0, 9.0].into_iter().collect();
        let empty = MomentAccumulator::new();

        assert_eq!(acc.merge(&empty), acc);
        assert_eq!(empty.merge(&acc), acc);
        assert!(empty.merge(&empty).is_empty());
    }

    #[test]
    fn test_merge_from_in_place() {
        let mut acc: MomentAccumulator = [1.0, 2.0].into_iter().collect();
        let other: MomentAccumulator = [3.0, 4.0, 5.0].into_iter().collect();
        acc.merge_from(&other);

        assert_eq!(acc.count(), 5);
        assert!((acc.variance() - 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_z_score_and_standard_error() {
        let acc: MomentAccumulator = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0].into_iter().collect();

        // mean 5, sample variance 32/7
        let std = (32.0f64 / 7.0).sqrt();
        assert!((acc.std() - std).abs() < 1e-12);
        assert!((acc.z_score(5.0 + std).unwrap() - 1.0).abs() < 1e-12);
        assert!((acc.standard_error() - std / 8f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_from_raw_empty_normalises() {
        let acc = MomentAccumulator::from_raw(0, 3.0, 1.0, 1.0, 1.0);
        assert_eq!(acc, MomentAccumulator::new());
    }

    #[test]
    fn test_numerical_stability_large_offset() {
        let base = 1e9;
        let acc: MomentAccumulator = (0..1000).map(|i| base + i as f64).collect();

        assert!((acc.mean() - (base + 499.5)).abs() < 1e-3);
        // Variance of 0..1000 with n − 1 denominator
        let expected = 1000.0 * 1001.0 / 12.0;
        assert!(close(acc.variance(), expected, 1e-6));
    }
}
