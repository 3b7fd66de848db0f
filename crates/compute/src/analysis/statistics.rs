pub struct Statistics;

impl Statistics {
    /// `(min, max)` over the present, finite values.
    ///
    /// Missing values are skipped rather than poisoning the result; returns
    /// `None` if nothing usable remains.
    pub fn extent<I>(values: I) -> Option<(f64, f64)>
    where
        I: IntoIterator<Item = Option<f64>>,
    {
        let mut out: Option<(f64, f64)> = None;
        for v in values.into_iter().flatten() {
            if !v.is_finite() {
                continue;
            }
            out = Some(match out {
                None => (v, v),
                Some((min, max)) => (min.min(v), max.max(v)),
            });
        }
        out
    }

    pub fn max<I>(values: I) -> Option<f64>
    where
        I: IntoIterator<Item = Option<f64>>,
    {
        Self::extent(values).map(|(_, max)| max)
    }
}

#[cfg(test)]
mod tests {
    use super::Statistics;

    #[test]
    fn extent_skips_missing_and_non_finite() {
        let values = [None, Some(4.0), Some(f64::NAN), Some(1.5), None];
        assert_eq!(Statistics::extent(values), Some((1.5, 4.0)));
        assert_eq!(Statistics::extent([None, None]), None);
        assert_eq!(Statistics::max([Some(2.0), Some(7.0)]), Some(7.0));
    }
}
