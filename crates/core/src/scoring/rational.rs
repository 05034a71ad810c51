//! Valuation-ratio score. Negative means cheap (buy-leaning), positive means rich.

use crate::domain::analysis::ScoreResult;
use crate::domain::fundamentals::FundamentalsSnapshot;

pub fn score(f: &FundamentalsSnapshot) -> ScoreResult {
    let mut score = 0;
    let mut reasons = Vec::new();

    if let Some(pe) = present(f.pe_ratio) {
        let industry_pe = f.industry_pe();
        if pe < industry_pe * 0.8 {
            score -= 20;
            reasons.push(format!(
                "Low P/E ratio ({pe:.2} vs industry {industry_pe:.2})"
            ));
        } else if pe > industry_pe * 1.2 {
            score += 20;
            reasons.push(format!(
                "High P/E ratio ({pe:.2} vs industry {industry_pe:.2})"
            ));
        }
    }

    if let Some(peg) = present(f.peg_ratio) {
        if peg < 1.0 {
            score -= 15;
            reasons.push(format!("Attractive PEG ratio ({peg:.2})"));
        } else if peg > 2.0 {
            score += 15;
            reasons.push(format!("High PEG ratio ({peg:.2})"));
        }
    }

    if let Some(pb) = present(f.price_to_book) {
        if pb < 1.0 {
            score -= 15;
            reasons.push(format!("Trading below book value ({pb:.2})"));
        } else if pb > 3.0 {
            // Lighter than the below-book adjustment.
            score += 10;
            reasons.push(format!("High price-to-book ({pb:.2})"));
        }
    }

    if let Some(margin) = present(f.profit_margin) {
        if margin > 0.20 {
            score -= 10;
            reasons.push(format!("Strong profit margins ({:.1}%)", margin * 100.0));
        } else if margin < 0.05 {
            score += 10;
            reasons.push(format!("Weak profit margins ({:.1}%)", margin * 100.0));
        }
    }

    ScoreResult::clamped(score, reasons)
}

/// Providers report "no value" as either a missing key or a zero.
fn present(v: Option<f64>) -> Option<f64> {
    v.filter(|x| x.is_finite() && *x != 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_cheap_signals_clamp_to_minus_50() {
        let f = FundamentalsSnapshot {
            current_price: 10.0,
            pe_ratio: Some(10.0),
            industry_pe: Some(25.0),
            peg_ratio: Some(0.5),
            price_to_book: Some(0.5),
            profit_margin: Some(0.25),
            ..Default::default()
        };
        let r = score(&f);
        assert_eq!(r.score, -50);
        assert_eq!(
            r.reasons,
            vec![
                "Low P/E ratio (10.00 vs industry 25.00)".to_string(),
                "Attractive PEG ratio (0.50)".to_string(),
                "Trading below book value (0.50)".to_string(),
                "Strong profit margins (25.0%)".to_string(),
            ]
        );
    }

    #[test]
    fn all_rich_signals_sum_to_55_and_clamp() {
        let f = FundamentalsSnapshot {
            current_price: 10.0,
            pe_ratio: Some(40.0),
            peg_ratio: Some(3.0),
            price_to_book: Some(5.0),
            profit_margin: Some(0.01),
            ..Default::default()
        };
        let r = score(&f);
        // 20 + 15 + 10 + 10 = 55
        assert_eq!(r.score, 50);
        assert_eq!(r.reasons.len(), 4);
        assert_eq!(r.reasons[0], "High P/E ratio (40.00 vs industry 25.00)");
        assert_eq!(r.reasons[2], "High price-to-book (5.00)");
        assert_eq!(r.reasons[3], "Weak profit margins (1.0%)");
    }

    #[test]
    fn price_to_book_is_asymmetric() {
        let rich = FundamentalsSnapshot {
            price_to_book: Some(4.0),
            ..Default::default()
        };
        let cheap = FundamentalsSnapshot {
            price_to_book: Some(0.8),
            ..Default::default()
        };
        assert_eq!(score(&rich).score, 10);
        assert_eq!(score(&cheap).score, -15);
    }

    #[test]
    fn missing_and_zero_fields_are_skipped() {
        let empty = score(&FundamentalsSnapshot::default());
        assert_eq!(empty, ScoreResult::default());

        let zeros = FundamentalsSnapshot {
            pe_ratio: Some(0.0),
            peg_ratio: Some(0.0),
            price_to_book: Some(0.0),
            profit_margin: Some(0.0),
            ..Default::default()
        };
        assert_eq!(score(&zeros), ScoreResult::default());
    }

    #[test]
    fn values_inside_bands_contribute_nothing() {
        let f = FundamentalsSnapshot {
            pe_ratio: Some(25.0),
            peg_ratio: Some(1.5),
            price_to_book: Some(2.0),
            profit_margin: Some(0.10),
            ..Default::default()
        };
        assert_eq!(score(&f), ScoreResult::default());
    }

    #[test]
    fn pe_uses_reported_industry_pe() {
        let f = FundamentalsSnapshot {
            pe_ratio: Some(15.0),
            industry_pe: Some(10.0),
            ..Default::default()
        };
        let r = score(&f);
        assert_eq!(r.score, 20);
        assert_eq!(r.reasons, vec!["High P/E ratio (15.00 vs industry 10.00)"]);
    }
}
