/// Simple moving average of the trailing `period` values.
pub fn sma(values: &[f64], period: usize) -> Option<f64> {
    if period == 0 || values.len() < period {
        return None;
    }
    let window = &values[values.len() - period..];
    Some(window.iter().sum::<f64>() / period as f64)
}

/// RSI over the trailing `period` close-to-close changes, using plain averages of
/// gains and losses (not Wilder smoothing).
///
/// Returns `None` when there are fewer than `period + 1` closes or the window is
/// flat (no gains and no losses). All-gain windows read 100.
pub fn rsi(closes: &[f64], period: usize) -> Option<f64> {
    if period == 0 || closes.len() < period + 1 {
        return None;
    }

    let tail = &closes[closes.len() - (period + 1)..];
    let mut gain = 0.0;
    let mut loss = 0.0;
    for pair in tail.windows(2) {
        let change = pair[1] - pair[0];
        if change > 0.0 {
            gain += change;
        } else {
            loss -= change;
        }
    }

    let avg_gain = gain / period as f64;
    let avg_loss = loss / period as f64;

    if avg_loss == 0.0 {
        if avg_gain == 0.0 {
            return None;
        }
        return Some(100.0);
    }

    let rs = avg_gain / avg_loss;
    Some(100.0 - 100.0 / (1.0 + rs))
}

/// Where `price` sits inside `[low, high]`, as a fraction. `None` for an empty or
/// inverted range.
pub fn range_position(price: f64, low: f64, high: f64) -> Option<f64> {
    let width = high - low;
    if !width.is_finite() || width <= 0.0 {
        return None;
    }
    Some((price - low) / width)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sma_uses_trailing_window() {
        let v = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(sma(&v, 2), Some(4.5));
        assert_eq!(sma(&v, 5), Some(3.0));
        assert_eq!(sma(&v, 6), None);
    }

    #[test]
    fn rsi_matches_textbook_ratio() {
        // 14 changes: 7 gains of +2, 7 losses of -1 => RS = 2, RSI = 66.67
        let mut closes = vec![100.0];
        for i in 0..14 {
            let last = *closes.last().unwrap();
            closes.push(if i % 2 == 0 { last + 2.0 } else { last - 1.0 });
        }
        let v = rsi(&closes, 14).unwrap();
        assert!((v - 200.0 / 3.0).abs() < 1e-9, "rsi={v}");
    }

    #[test]
    fn rsi_only_looks_at_trailing_period() {
        // Old crash is outside the window; the last 14 changes are all gains.
        let mut closes = vec![500.0, 100.0];
        for i in 0..14 {
            closes.push(101.0 + i as f64);
        }
        assert_eq!(rsi(&closes, 14), Some(100.0));
    }

    #[test]
    fn rsi_flat_window_is_undefined() {
        let closes = vec![10.0; 20];
        assert_eq!(rsi(&closes, 14), None);
        assert_eq!(rsi(&closes[..10], 14), None);
    }

    #[test]
    fn range_position_rejects_zero_width() {
        assert_eq!(range_position(15.0, 10.0, 20.0), Some(0.5));
        assert_eq!(range_position(10.0, 10.0, 10.0), None);
        assert_eq!(range_position(10.0, 12.0, 8.0), None);
    }
}
