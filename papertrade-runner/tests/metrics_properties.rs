//! Property tests for the statistics aggregator.

use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;
use papertrade_core::domain::{ClosedTrade, ExitReason, Side};
use papertrade_runner::metrics::{
    monthly_returns, profit_factor, sharpe_ratio, sortino_ratio, win_rate,
};

fn trade(index: usize, pnl_pct: f64) -> ClosedTrade {
    let entry_time = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::days(index as i64 * 3);
    let entry_price = 100.0;
    let exit_price = entry_price * (1.0 + pnl_pct / 100.0);
    ClosedTrade {
        side: Side::Long,
        entry_index: index * 3,
        entry_time,
        entry_price,
        exit_index: index * 3 + 2,
        exit_time: entry_time + Duration::days(2),
        exit_price,
        exit_reason: ExitReason::Signal,
        quantity: 10,
        pnl: (exit_price - entry_price) * 10.0,
        pnl_pct,
        bars_held: 2,
    }
}

fn arb_trades() -> impl Strategy<Value = Vec<ClosedTrade>> {
    prop::collection::vec(-8.0..8.0_f64, 0..60)
        .prop_map(|pcts| pcts.into_iter().enumerate().map(|(i, p)| trade(i, p)).collect())
}

proptest! {
    #[test]
    fn win_rate_is_a_fraction(trades in arb_trades()) {
        let w = win_rate(&trades);
        prop_assert!((0.0..=1.0).contains(&w));
    }

    #[test]
    fn profit_factor_non_negative(trades in arb_trades()) {
        let pf = profit_factor(&trades);
        prop_assert!(pf >= 0.0);
        let has_loss = trades.iter().any(|t| t.pnl < 0.0);
        let has_win = trades.iter().any(|t| t.pnl > 0.0);
        prop_assert_eq!(pf.is_infinite(), has_win && !has_loss);
    }

    #[test]
    fn ratios_are_finite(trades in arb_trades()) {
        let returns: Vec<f64> = trades.iter().map(|t| t.pnl_pct).collect();
        prop_assert!(sharpe_ratio(&returns).is_finite());
        prop_assert!(sortino_ratio(&returns).is_finite());
    }

    #[test]
    fn monthly_returns_sorted_and_complete(trades in arb_trades()) {
        let months = monthly_returns(&trades);
        for pair in months.windows(2) {
            prop_assert!(pair[0].month < pair[1].month);
        }
        let monthly: f64 = months.iter().map(|m| m.return_pct).sum();
        let total: f64 = trades.iter().map(|t| t.pnl_pct).sum();
        prop_assert!((monthly - total).abs() < 1e-9);
    }
}
