//! Reporting and export: JSON, CSV, and Markdown artifact generation.
//!
//! - **JSON**: full round-trip serialization with schema versioning
//! - **CSV**: trade log and equity/drawdown curve for external tools
//! - **Markdown**: human-readable single-run report
//!
//! Persisted artifacts carry a `schema_version`. Newer versions are rejected on load.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use papertrade_core::domain::ClosedTrade;
use papertrade_core::engine::{DrawdownPoint, EquityPoint};

use crate::runner::{BacktestResult, SCHEMA_VERSION};

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize a `BacktestResult` to pretty JSON.
pub fn export_json(result: &BacktestResult) -> Result<String> {
    serde_json::to_string_pretty(result).context("failed to serialize BacktestResult to JSON")
}

/// Deserialize a `BacktestResult` from JSON, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<BacktestResult> {
    let result: BacktestResult =
        serde_json::from_str(json).context("failed to deserialize BacktestResult from JSON")?;
    if result.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            result.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(result)
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Export a trade log as CSV.
///
/// Columns: side, entry_index, entry_time, entry_price, exit_index, exit_time,
/// exit_price, exit_reason, quantity, pnl, pnl_pct, bars_held
pub fn export_trades_csv(trades: &[ClosedTrade]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "side",
        "entry_index",
        "entry_time",
        "entry_price",
        "exit_index",
        "exit_time",
        "exit_price",
        "exit_reason",
        "quantity",
        "pnl",
        "pnl_pct",
        "bars_held",
    ])?;

    for t in trades {
        wtr.write_record([
            &format!("{:?}", t.side),
            &t.entry_index.to_string(),
            &t.entry_time.to_rfc3339(),
            &format!("{:.6}", t.entry_price),
            &t.exit_index.to_string(),
            &t.exit_time.to_rfc3339(),
            &format!("{:.6}", t.exit_price),
            t.exit_reason.as_str(),
            &t.quantity.to_string(),
            &format!("{:.2}", t.pnl),
            &format!("{:.4}", t.pnl_pct),
            &t.bars_held.to_string(),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Export the equity and drawdown curves side by side.
pub fn export_equity_csv(equity: &[EquityPoint], drawdown: &[DrawdownPoint]) -> Result<String> {
    if equity.len() != drawdown.len() {
        bail!(
            "equity curve has {} points but drawdown curve has {}",
            equity.len(),
            drawdown.len()
        );
    }
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["timestamp", "equity", "drawdown_pct"])?;
    for (eq, dd) in equity.iter().zip(drawdown) {
        wtr.write_record([
            &eq.timestamp.to_rfc3339(),
            &format!("{:.2}", eq.equity),
            &format!("{:.4}", dd.drawdown_pct),
        ])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Directory name for a run's artifacts: `{symbol}_{strategy}_{run id prefix}`.
pub fn artifact_dir_name(result: &BacktestResult) -> String {
    let id = result.run_id.get(..12).unwrap_or(&result.run_id);
    format!("{}_{}_{}", result.symbol, result.strategy_name, id)
}

/// Save the full artifact set for a single backtest run.
///
/// Creates `{symbol}_{strategy}_{id}/` under `output_dir` containing:
/// - `manifest.json`: the full `BacktestResult`
/// - `trades.csv`: trade log
/// - `equity.csv`: equity and drawdown per simulated bar
/// - `report.md`: Markdown summary
///
/// Returns the path to the created directory.
pub fn save_artifacts(result: &BacktestResult, output_dir: &Path) -> Result<PathBuf> {
    let run_dir = output_dir.join(artifact_dir_name(result));
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;

    write(&run_dir.join("manifest.json"), &export_json(result)?)?;
    write(&run_dir.join("trades.csv"), &export_trades_csv(&result.trades)?)?;
    write(
        &run_dir.join("equity.csv"),
        &export_equity_csv(&result.equity_curve, &result.drawdown_curve)?,
    )?;
    write(&run_dir.join("report.md"), &generate_report(result))?;

    Ok(run_dir)
}

fn write(path: &Path, contents: &str) -> Result<()> {
    std::fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))
}

/// Load a `BacktestResult` from an artifact directory's manifest.json.
///
/// Rejects unknown schema versions.
pub fn load_artifacts(dir: &Path) -> Result<BacktestResult> {
    let manifest_path = dir.join("manifest.json");
    let json = std::fs::read_to_string(&manifest_path)
        .with_context(|| format!("failed to read {}", manifest_path.display()))?;
    import_json(&json)
}

// ─── Markdown report ────────────────────────────────────────────────

/// Generate a Markdown report for a single backtest run.
pub fn generate_report(result: &BacktestResult) -> String {
    let mut md = String::with_capacity(2048);
    let m = &result.metrics;

    md.push_str("# Backtest Report\n\n");

    md.push_str("## Run\n\n| Field | Value |\n| --- | --- |\n");
    let _ = writeln!(md, "| Symbol | {} |", result.symbol);
    let _ = writeln!(md, "| Strategy | {} |", result.strategy_name);
    if let (Some(start), Some(end)) = (result.start_time, result.end_time) {
        let _ = writeln!(md, "| Period | {} to {} |", start.date_naive(), end.date_naive());
    }
    let _ = writeln!(
        md,
        "| Bars | {} ({} warm-up) |",
        result.bar_count, result.warmup_bars
    );
    let _ = writeln!(md, "| Initial Capital | {:.2} |", result.initial_capital);
    let _ = writeln!(md, "| Final Equity | {:.2} |", result.final_equity);
    let _ = writeln!(md, "| Run Id | {} |", result.run_id);
    let _ = writeln!(md, "| Dataset Hash | {} |", result.dataset_hash);
    if result.cancelled {
        md.push_str("| Status | **CANCELLED** |\n");
    }
    md.push('\n');

    md.push_str("## Performance Summary\n\n| Metric | Value |\n| --- | --- |\n");
    let _ = writeln!(
        md,
        "| Trades | {} ({} won, {} lost) |",
        m.trade_count, m.winning_trades, m.losing_trades
    );
    let _ = writeln!(md, "| Win Rate | {:.1}% |", m.win_rate * 100.0);
    let _ = writeln!(md, "| Total P&L | {:.2} |", m.total_pnl);
    let _ = writeln!(md, "| Total Return | {:.2}% |", m.total_return_pct);
    let _ = writeln!(md, "| Annualized Return | {:.2}% |", m.annualized_return_pct);
    let _ = writeln!(md, "| Profit Factor | {} |", format_ratio(m.profit_factor));
    let _ = writeln!(md, "| Sharpe | {:.3} |", m.sharpe);
    let _ = writeln!(md, "| Sortino | {:.3} |", m.sortino);
    let _ = writeln!(md, "| Calmar | {:.3} |", m.calmar);
    let _ = writeln!(
        md,
        "| Max Drawdown | {:.2}% ({:.2}) |",
        m.max_drawdown_pct, m.max_drawdown_abs
    );
    let _ = writeln!(md, "| Largest Win / Loss | {:.2} / {:.2} |", m.largest_win, m.largest_loss);
    let _ = writeln!(md, "| Avg Holding | {:.2} days |", m.avg_holding_days);
    md.push('\n');

    if !result.monthly_returns.is_empty() {
        md.push_str("## Monthly Returns\n\n| Month | Return |\n| --- | --- |\n");
        for month in &result.monthly_returns {
            let _ = writeln!(md, "| {} | {:.2}% |", month.month, month.return_pct);
        }
        md.push('\n');
    }

    if let Some(open) = &result.open_position {
        md.push_str("## Open Position\n\n");
        let _ = writeln!(
            md,
            "{:?} {} @ {:.2} since bar {}\n",
            open.side, open.quantity, open.entry_price, open.entry_index
        );
    }

    md
}

/// Finite ratios to two decimals, infinity as a symbol.
pub fn format_ratio(value: f64) -> String {
    if value.is_infinite() {
        "∞".to_string()
    } else {
        format!("{value:.2}")
    }
}
