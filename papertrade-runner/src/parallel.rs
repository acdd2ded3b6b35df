//! Batch execution: many independent runs, in parallel on rayon.
//!
//! Runs share nothing mutable. Series are shared read-only behind `Arc`, each
//! run owns its position, capital and curves. Results come back in job order
//! so a batch is as deterministic as its individual runs.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use rayon::prelude::*;
use tracing::{info, warn};

use papertrade_core::config::StrategyConfig;
use papertrade_core::domain::PriceSeries;
use papertrade_core::engine::EngineConfig;
use papertrade_core::frame::compute_frames;

use crate::runner::{run_strategy, run_strategy_with_frames, BacktestResult, RunError};

/// One unit of batch work.
#[derive(Debug)]
pub struct BatchJob {
    pub series: Arc<PriceSeries>,
    pub config: StrategyConfig,
    pub engine: EngineConfig,
}

impl BatchJob {
    pub fn new(series: Arc<PriceSeries>, config: StrategyConfig, engine: EngineConfig) -> Self {
        Self {
            series,
            config,
            engine,
        }
    }
}

/// Run every job in parallel. A failing job does not stop the others.
pub fn run_batch(jobs: &[BatchJob]) -> Vec<Result<BacktestResult, RunError>> {
    run_batch_with_progress(jobs, |_, _, _| {})
}

/// Same as [`run_batch`], calling `progress(index, total, result)` as each job finishes.
///
/// The callback runs on worker threads, in completion order.
pub fn run_batch_with_progress<F>(
    jobs: &[BatchJob],
    progress: F,
) -> Vec<Result<BacktestResult, RunError>>
where
    F: Fn(usize, usize, &Result<BacktestResult, RunError>) + Send + Sync,
{
    let total = jobs.len();
    let results: Vec<_> = jobs
        .par_iter()
        .enumerate()
        .map(|(idx, job)| {
            let result = run_strategy(&job.series, &job.config, &job.engine);
            if let Err(e) = &result {
                warn!(job = idx, strategy = %job.config.name, error = %e, "batch job failed");
            }
            progress(idx, total, &result);
            result
        })
        .collect();

    info!(
        jobs = total,
        failed = results.iter().filter(|r| r.is_err()).count(),
        "batch complete"
    );
    results
}

/// Run several strategies over one series, computing its indicator frames once.
pub fn run_strategies(
    series: &Arc<PriceSeries>,
    configs: &[StrategyConfig],
    engine: &EngineConfig,
    cancel: &AtomicBool,
) -> Vec<Result<BacktestResult, RunError>> {
    let frames = compute_frames(series);
    configs
        .par_iter()
        .map(|config| run_strategy_with_frames(series, &frames, config, engine, cancel))
        .collect()
}

/// Successful results ordered by Sharpe ratio, best first.
///
/// Ties keep batch order.
pub fn rank_by_sharpe(results: &[BacktestResult]) -> Vec<&BacktestResult> {
    let mut ranked: Vec<&BacktestResult> = results.iter().collect();
    ranked.sort_by(|a, b| b.metrics.sharpe.total_cmp(&a.metrics.sharpe));
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_loader::generate_synthetic;
    use papertrade_core::config::ConfigError;
    use papertrade_core::strategy::StrategyPreset;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn shared_series() -> Arc<PriceSeries> {
        Arc::new(generate_synthetic("BATCH", 500, 5, 100.0).unwrap())
    }

    #[test]
    fn batch_matches_sequential_runs() {
        let series = shared_series();
        let jobs: Vec<BatchJob> = StrategyPreset::ALL
            .iter()
            .map(|p| BatchJob::new(Arc::clone(&series), p.config(), EngineConfig::default()))
            .collect();

        let parallel = run_batch(&jobs);
        assert_eq!(parallel.len(), StrategyPreset::ALL.len());
        for (job, result) in jobs.iter().zip(parallel) {
            let sequential = run_strategy(&series, &job.config, &job.engine).unwrap();
            assert_eq!(result.unwrap(), sequential);
        }
    }

    #[test]
    fn failing_job_is_isolated() {
        let series = shared_series();
        let mut bad = StrategyPreset::RsiReversal.config();
        bad.risk.position_size = 2.0;
        let jobs = vec![
            BatchJob::new(Arc::clone(&series), StrategyPreset::MaCrossover.config(), EngineConfig::default()),
            BatchJob::new(Arc::clone(&series), bad, EngineConfig::default()),
        ];

        let results = run_batch(&jobs);
        assert!(results[0].is_ok());
        assert!(matches!(
            results[1],
            Err(RunError::Config(ConfigError::InvalidPositionSize(_)))
        ));
    }

    #[test]
    fn progress_called_once_per_job() {
        let series = shared_series();
        let jobs: Vec<BatchJob> = StrategyPreset::ALL
            .iter()
            .map(|p| BatchJob::new(Arc::clone(&series), p.config(), EngineConfig::default()))
            .collect();
        let calls = AtomicUsize::new(0);
        run_batch_with_progress(&jobs, |_, total, _| {
            assert_eq!(total, 5);
            calls.fetch_add(1, Ordering::Relaxed);
        });
        assert_eq!(calls.load(Ordering::Relaxed), 5);
    }

    #[test]
    fn shared_frames_match_individual_runs() {
        let series = shared_series();
        let configs: Vec<StrategyConfig> = StrategyPreset::ALL.iter().map(|p| p.config()).collect();
        let engine = EngineConfig::default();
        let shared = run_strategies(&series, &configs, &engine, &AtomicBool::new(false));
        for (config, result) in configs.iter().zip(shared) {
            assert_eq!(result.unwrap(), run_strategy(&series, config, &engine).unwrap());
        }
    }

    #[test]
    fn ranking_is_descending() {
        let series = shared_series();
        let configs: Vec<StrategyConfig> = StrategyPreset::ALL.iter().map(|p| p.config()).collect();
        let results: Vec<BacktestResult> =
            run_strategies(&series, &configs, &EngineConfig::default(), &AtomicBool::new(false))
                .into_iter()
                .collect::<Result<_, _>>()
                .unwrap();
        let ranked = rank_by_sharpe(&results);
        for pair in ranked.windows(2) {
            assert!(pair[0].metrics.sharpe >= pair[1].metrics.sharpe);
        }
    }
}
