//! Average Directional Index with +DI / -DI.
//!
//! - ADX >= threshold: trending
//! - +DI > -DI: bullish pressure
//! - -DI > +DI: bearish pressure

use crate::domain::Bar;
use crate::error::{Result, ensure_period};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AdxOutput {
    pub adx: Vec<Option<f64>>,
    pub plus_di: Vec<Option<f64>>,
    pub minus_di: Vec<Option<f64>>,
}

/// Wilder-smoothed ADX. Needs at least `2 * period` bars, otherwise every
/// output is `None`. DI values start at index `period`, ADX at `2 * period - 1`.
pub fn adx(bars: &[Bar], period: usize) -> Result<AdxOutput> {
    ensure_period("ADX", period)?;
    let n = bars.len();
    let mut out = AdxOutput {
        adx: vec![None; n],
        plus_di: vec![None; n],
        minus_di: vec![None; n],
    };
    if n < 2 * period {
        return Ok(out);
    }

    let mut tr = vec![0.0; n];
    let mut plus_dm = vec![0.0; n];
    let mut minus_dm = vec![0.0; n];
    for i in 1..n {
        let (cur, prev) = (&bars[i], &bars[i - 1]);
        let up_move = cur.high - prev.high;
        let down_move = prev.low - cur.low;
        plus_dm[i] = if up_move > down_move && up_move > 0.0 { up_move } else { 0.0 };
        minus_dm[i] = if down_move > up_move && down_move > 0.0 { down_move } else { 0.0 };
        tr[i] = (cur.high - cur.low)
            .max((cur.high - prev.close).abs())
            .max((cur.low - prev.close).abs());
    }

    let p = period as f64;
    let mut smooth_tr: f64 = tr[1..=period].iter().sum();
    let mut smooth_plus: f64 = plus_dm[1..=period].iter().sum();
    let mut smooth_minus: f64 = minus_dm[1..=period].iter().sum();
    let mut dx = vec![0.0; n];

    for i in period..n {
        if i > period {
            smooth_tr = smooth_tr - smooth_tr / p + tr[i];
            smooth_plus = smooth_plus - smooth_plus / p + plus_dm[i];
            smooth_minus = smooth_minus - smooth_minus / p + minus_dm[i];
        }
        let (pdi, mdi) = if smooth_tr > 0.0 {
            (100.0 * smooth_plus / smooth_tr, 100.0 * smooth_minus / smooth_tr)
        } else {
            (0.0, 0.0)
        };
        out.plus_di[i] = Some(pdi);
        out.minus_di[i] = Some(mdi);

        let di_sum = pdi + mdi;
        dx[i] = if di_sum > 0.0 {
            100.0 * (pdi - mdi).abs() / di_sum
        } else {
            0.0
        };
    }

    let mut adx_val: f64 = dx[period..2 * period].iter().sum::<f64>() / p;
    out.adx[2 * period - 1] = Some(adx_val);
    for i in (2 * period)..n {
        adx_val = (adx_val * (p - 1.0) + dx[i]) / p;
        out.adx[i] = Some(adx_val);
    }

    Ok(out)
}

/// A reading at or above the threshold counts as a trending market.
pub fn is_trending(adx: f64, threshold: f64) -> bool {
    adx >= threshold
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::bar::test_support::{falling_bars, rising_bars};
    use crate::indicators::last_value;

    #[test]
    fn short_input_is_all_none() {
        let bars = rising_bars(27, 100.0, 1.0);
        let out = adx(&bars, 14).unwrap();
        assert!(out.adx.iter().all(Option::is_none));
        assert!(out.plus_di.iter().all(Option::is_none));
        assert!(out.minus_di.iter().all(Option::is_none));
    }

    #[test]
    fn first_adx_lands_at_twice_the_period() {
        let bars = rising_bars(28, 100.0, 1.0);
        let out = adx(&bars, 14).unwrap();
        assert_eq!(out.adx[26], None);
        assert!(out.adx[27].is_some());
        assert_eq!(out.plus_di[13], None);
        assert!(out.plus_di[14].is_some());
    }

    #[test]
    fn rising_market_has_dominant_plus_di() {
        let out = adx(&rising_bars(60, 100.0, 1.0), 14).unwrap();
        let plus = last_value(&out.plus_di).unwrap();
        let minus = last_value(&out.minus_di).unwrap();
        assert!(plus > minus);
        let value = last_value(&out.adx).unwrap();
        assert!((0.0..=100.0).contains(&value));
    }

    #[test]
    fn falling_market_has_dominant_minus_di() {
        let out = adx(&falling_bars(60, 200.0, 1.0), 14).unwrap();
        assert!(last_value(&out.minus_di).unwrap() > last_value(&out.plus_di).unwrap());
    }

    #[test]
    fn trending_flag_is_monotone_in_adx() {
        let threshold = 25.0;
        let mut was_trending = false;
        for step in 0..100 {
            let now = is_trending(step as f64 * 0.5, threshold);
            assert!(!(was_trending && !now));
            was_trending = now;
        }
        assert!(was_trending);
    }
}
