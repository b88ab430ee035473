use crate::analysis::confluence::{ConfluenceParams, cluster_levels, rank_levels, resolve_threshold};
use crate::analysis::divergence::{DivergenceParams, detect_divergences};
use crate::analysis::extrema::swing_points;
use crate::analysis::snapshot::market_snapshot;
use crate::config::ANALYSIS;
#[cfg(debug_assertions)]
use crate::config::debug::PRINT_SCAN_PROGRESS;
use crate::data::SeriesProvider;
use crate::domain::Timeframe;
use crate::error::{ScanError, ScanResult};
use crate::models::{DivergenceEvent, ExtremaPoint, LevelReport, MarketSnapshot, OhlcvTimeSeries};

use super::messages::{DivergenceRequest, LevelScan, LevelsRequest, UnitResult};

/// Drives the analysis engines over (symbol, timeframe) units, one fetch at a time.
///
/// A failing unit is recorded and skipped; it never stops the rest of the scan.
pub struct Scanner<P: SeriesProvider> {
    provider: P,
}

impl<P: SeriesProvider> Scanner<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Fetches a series, folding provider failures and empty results into `DataUnavailable`.
    async fn fetch_series(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        limit: usize,
    ) -> ScanResult<OhlcvTimeSeries> {
        let series = self
            .provider
            .fetch(symbol, timeframe, limit)
            .await
            .map_err(|e| ScanError::data_unavailable(symbol, timeframe, format!("{:#}", e)))?;
        if series.is_empty() {
            return Err(ScanError::data_unavailable(
                symbol,
                timeframe,
                "provider returned no candles",
            ));
        }
        Ok(series)
    }

    /// Close of the newest candle on `timeframe`.
    pub async fn current_price(&self, symbol: &str, timeframe: Timeframe) -> ScanResult<f64> {
        let series = self.fetch_series(symbol, timeframe, 1).await?;
        match series.last_close() {
            Some(price) if price.is_finite() && price > 0.0 => Ok(price),
            other => Err(ScanError::DegenerateInput(format!(
                "{}: current price {:?}",
                series.pair_interval, other
            ))),
        }
    }

    pub async fn scan_divergences(
        &self,
        symbols: &[String],
        request: &DivergenceRequest,
    ) -> Vec<UnitResult<Vec<DivergenceEvent>>> {
        let mut results = Vec::new();

        for symbol in symbols {
            if request.timeframes.is_empty() {
                results.push(UnitResult::new(
                    symbol,
                    None,
                    Err(ScanError::InvalidParameter("no timeframes to scan".to_string())),
                ));
                continue;
            }

            for &timeframe in &request.timeframes {
                let mut params = DivergenceParams::for_timeframe(timeframe, request.historical);
                params.lookback_window = request.lookback_window;
                if let Some(&order) = request.order_overrides.get(&timeframe) {
                    params.order = order;
                }

                let outcome = match self
                    .fetch_series(symbol, timeframe, request.candle_limit)
                    .await
                {
                    Ok(series) => detect_divergences(&series, &params),
                    Err(e) => Err(e),
                };

                if let Err(e) = &outcome {
                    log::warn!("Skipping {} [{}]: {}", symbol, timeframe, e);
                }
                #[cfg(debug_assertions)]
                if PRINT_SCAN_PROGRESS {
                    if let Ok(events) = &outcome {
                        log::info!(
                            "{} [{}]: {} divergence(s) (order {})",
                            symbol,
                            timeframe,
                            events.len(),
                            params.order
                        );
                    }
                }
                results.push(UnitResult::new(symbol, Some(timeframe), outcome));
            }
        }
        results
    }

    pub async fn scan_levels(&self, symbol: &str, request: &LevelsRequest) -> LevelScan {
        let mut units = Vec::with_capacity(request.timeframes.len());

        let Some(&price_timeframe) = request.timeframes.first() else {
            return LevelScan {
                report: UnitResult::new(
                    symbol,
                    None,
                    Err(ScanError::InvalidParameter("no timeframes to pool".to_string())),
                ),
                timeframes: units,
            };
        };

        let mut current_price = self.current_price(symbol, price_timeframe).await;
        if let Err(e) = &current_price {
            log::warn!("{}: current price unavailable ({})", symbol, e);
        }

        let mut pool: Vec<ExtremaPoint> = Vec::new();
        for &timeframe in &request.timeframes {
            let order = request
                .order_overrides
                .get(&timeframe)
                .copied()
                .unwrap_or_else(|| ANALYSIS.confluence.order_for(timeframe));

            let outcome = self
                .fetch_series(symbol, timeframe, request.candle_limit)
                .await
                .map(|series| {
                    // Stand-in price when the dedicated fetch failed
                    if current_price.is_err() {
                        if let Some(close) = series.last_close().filter(|c| c.is_finite() && *c > 0.0) {
                            current_price = Ok(close);
                        }
                    }
                    let points =
                        swing_points(&series.high_prices, &series.low_prices, order, timeframe);
                    let found = points.len();
                    pool.extend(points);
                    found
                });

            if let Err(e) = &outcome {
                log::warn!("Skipping {} [{}] for levels: {}", symbol, timeframe, e);
            }
            units.push(UnitResult::new(symbol, Some(timeframe), outcome));
        }

        let report = if units.iter().all(UnitResult::is_skipped) {
            Err(ScanError::data_unavailable(
                symbol,
                price_timeframe,
                "no timeframe produced candles",
            ))
        } else {
            match current_price {
                Ok(price) => self.build_level_report(symbol, &pool, price, request.max_results).await,
                Err(e) => Err(e),
            }
        };

        LevelScan {
            report: UnitResult::new(symbol, None, report),
            timeframes: units,
        }
    }

    async fn build_level_report(
        &self,
        symbol: &str,
        pool: &[ExtremaPoint],
        current_price: f64,
        max_results: usize,
    ) -> ScanResult<LevelReport> {
        let params = ConfluenceParams {
            max_results,
            ..ConfluenceParams::default()
        };
        let daily = self
            .fetch_series(symbol, Timeframe::D1, ANALYSIS.confluence.daily_candle_limit)
            .await;
        let (threshold, threshold_source) = resolve_threshold(daily.as_ref().map_err(ScanError::clone), &params);

        let levels = cluster_levels(pool, threshold)?;

        #[cfg(debug_assertions)]
        if PRINT_SCAN_PROGRESS {
            log::info!(
                "{}: {} swing points -> {} levels at threshold {:.3}%",
                symbol,
                pool.len(),
                levels.len(),
                threshold * 100.0
            );
        }

        Ok(rank_levels(
            levels,
            current_price,
            params.max_results,
            threshold,
            threshold_source,
        ))
    }

    pub async fn snapshot(&self, symbol: &str) -> UnitResult<MarketSnapshot> {
        let outcome = match self
            .fetch_series(symbol, Timeframe::D1, ANALYSIS.snapshot.daily_candle_limit)
            .await
        {
            Ok(daily) => market_snapshot(&daily, ANALYSIS.rsi_period, ANALYSIS.snapshot.sma_period),
            Err(e) => Err(e),
        };
        if let Err(e) = &outcome {
            log::warn!("Skipping snapshot for {}: {}", symbol, e);
        }
        UnitResult::new(symbol, Some(Timeframe::D1), outcome)
    }
}
