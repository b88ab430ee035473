// Std library crates
use std::collections::HashSet;
use std::convert::TryFrom;
use std::error::Error;
use std::fmt;

// External crates
use anyhow::{Result, bail};
use binance_sdk::common::models::Interval as binance_interval;
use binance_sdk::config::ConfigurationRestApi;
use binance_sdk::models::RestApiRateLimit;
use binance_sdk::spot::{
    SpotRestApi,
    rest_api::{KlinesIntervalEnum, KlinesItemInner, KlinesParams, RestApi},
};
use binance_sdk::{errors, errors::ConnectorError as connection_error};
use chrono::Utc;
use tokio::time::{Duration, sleep};

// Local crates
use crate::config::binance::{BINANCE, BinanceApiConfig};
#[cfg(debug_assertions)]
use crate::config::debug::PRINT_PROVIDER_CALLS;
use crate::domain::{Candle, PairInterval, Timeframe};

pub fn kline_interval(timeframe: Timeframe) -> KlinesIntervalEnum {
    match timeframe {
        Timeframe::M1 => KlinesIntervalEnum::Interval1m,
        Timeframe::M3 => KlinesIntervalEnum::Interval3m,
        Timeframe::M5 => KlinesIntervalEnum::Interval5m,
        Timeframe::M15 => KlinesIntervalEnum::Interval15m,
        Timeframe::M30 => KlinesIntervalEnum::Interval30m,
        Timeframe::H1 => KlinesIntervalEnum::Interval1h,
        Timeframe::H2 => KlinesIntervalEnum::Interval2h,
        Timeframe::H4 => KlinesIntervalEnum::Interval4h,
        Timeframe::H6 => KlinesIntervalEnum::Interval6h,
        Timeframe::H8 => KlinesIntervalEnum::Interval8h,
        Timeframe::H12 => KlinesIntervalEnum::Interval12h,
        Timeframe::D1 => KlinesIntervalEnum::Interval1d,
        Timeframe::D3 => KlinesIntervalEnum::Interval3d,
        Timeframe::W1 => KlinesIntervalEnum::Interval1w,
        Timeframe::Mo1 => KlinesIntervalEnum::Interval1M,
    }
}

/// One kline as Binance sends it. Prices arrive as strings.
#[derive(Debug, PartialEq)]
pub struct BNKline {
    pub open_timestamp_ms: i64,
    pub open_price: f64,
    pub high_price: f64,
    pub low_price: f64,
    pub close_price: f64,
    pub base_asset_volume: f64,
}

impl From<BNKline> for Candle {
    fn from(k: BNKline) -> Self {
        Candle::new(
            k.open_timestamp_ms,
            k.open_price,
            k.high_price,
            k.low_price,
            k.close_price,
            k.base_asset_volume,
        )
    }
}

#[derive(Debug)]
pub enum BNKlineError {
    InvalidLength,
    InvalidType(String),
    ConnectionFailed(String),
}

impl fmt::Display for BNKlineError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            BNKlineError::InvalidLength => write!(f, "Invalid length"),
            BNKlineError::InvalidType(field) => write!(f, "Invalid type: {}", field),
            BNKlineError::ConnectionFailed(msg) => {
                write!(f, "Binance API connection failed: {}.", msg)
            }
        }
    }
}

impl Error for BNKlineError {}

/// Numeric kline fields come back as `KlinesItemInner::String`; anything else is malformed.
fn parse_price_field(item: Option<KlinesItemInner>, field: &str) -> Result<f64, BNKlineError> {
    match item.ok_or(BNKlineError::InvalidLength)? {
        KlinesItemInner::String(s) => s
            .parse::<f64>()
            .map_err(|_| BNKlineError::InvalidType(format!("{} ({:?})", field, s))),
        _ => Err(BNKlineError::InvalidType(field.to_string())),
    }
}

impl TryFrom<Vec<KlinesItemInner>> for BNKline {
    type Error = BNKlineError;

    fn try_from(vec_inner_klines: Vec<KlinesItemInner>) -> Result<Self, Self::Error> {
        let mut items = vec_inner_klines.into_iter();
        let open_timestamp_ms = match items.next().ok_or(BNKlineError::InvalidLength)? {
            KlinesItemInner::Integer(a) => a,
            _ => return Err(BNKlineError::InvalidType("open_time".to_string())),
        };

        Ok(BNKline {
            open_timestamp_ms,
            open_price: parse_price_field(items.next(), "open")?,
            high_price: parse_price_field(items.next(), "high")?,
            low_price: parse_price_field(items.next(), "low")?,
            close_price: parse_price_field(items.next(), "close")?,
            base_asset_volume: parse_price_field(items.next(), "volume")?,
        })
    }
}

fn convert_klines(data: Vec<Vec<KlinesItemInner>>) -> Result<Vec<BNKline>, BNKlineError> {
    data.into_iter().map(Vec::try_into).collect()
}

pub fn configure_binance_client() -> Result<RestApi> {
    let config = BinanceApiConfig::default();
    let rest_conf = ConfigurationRestApi::builder()
        .timeout(config.timeout_ms)
        .retries(config.retries)
        .backoff(config.backoff_ms)
        .build()?;
    Ok(SpotRestApi::production(rest_conf))
}

/// Sleeps to the top of the next minute once the used weight leaves no room for another call.
async fn handle_rate_limits(
    rate_limits: &Option<Vec<RestApiRateLimit>>,
    pair_interval: &PairInterval,
) {
    let Some(limits) = rate_limits else {
        return;
    };
    let required_headroom = BINANCE
        .paging
        .weight_limit_minute
        .saturating_sub(BINANCE.paging.kline_call_weight);

    for rate_limit in limits {
        if rate_limit.interval_num == 1 && rate_limit.interval == binance_interval::Minute {
            let current_weight = rate_limit.count;
            if current_weight > required_headroom {
                let secs_into_min = Utc::now().timestamp().rem_euclid(60) as u64;
                let sleep_duration = Duration::from_secs(60 - secs_into_min);
                log::warn!(
                    "{} Current weight ({}) > required headroom ({}), sleeping {:?}",
                    pair_interval,
                    current_weight,
                    required_headroom,
                    sleep_duration
                );
                sleep(sleep_duration).await;
            }
        }
    }
}

/// Prepends a batch fetched with an inclusive `end_time` to `all_klines`.
///
/// Returns the open time to page from next, and whether history ran out.
fn process_new_klines(
    new_klines: Vec<Vec<KlinesItemInner>>,
    requested: usize,
    all_klines: &mut Vec<BNKline>,
    pair_interval: &PairInterval,
) -> Result<(i64, bool)> {
    let mut bn_klines = convert_klines(new_klines).map_err(|e| {
        anyhow::Error::new(e).context(format!("{} convert_klines failed", pair_interval))
    })?;

    let Some(first) = bn_klines.first() else {
        return Ok((0, true));
    };
    let end_time = first.open_timestamp_ms;
    let history_exhausted = bn_klines.len() < requested;

    // end_time is inclusive, so the newest kline of a follow-up batch is the
    // oldest one we already hold
    if let Some(held) = all_klines.first() {
        if bn_klines.last().map(|k| k.open_timestamp_ms) == Some(held.open_timestamp_ms) {
            bn_klines.pop();
        }
        if bn_klines.is_empty() {
            return Ok((end_time, true));
        }
    }

    all_klines.splice(0..0, bn_klines);
    Ok((end_time, history_exhausted))
}

async fn fetch_binance_klines_with_limits(
    rest_client: &RestApi,
    params: KlinesParams,
    pair_interval: &PairInterval,
) -> Result<(Option<Vec<RestApiRateLimit>>, Vec<Vec<KlinesItemInner>>)> {
    match rest_client.klines(params).await {
        Ok(r) => {
            let rate_limits = r.rate_limits.clone();
            let data = r.data().await?;
            Ok((rate_limits, data))
        }
        Err(e) => {
            if let Some(conn_err) = e.downcast_ref::<errors::ConnectorError>() {
                match conn_err {
                    connection_error::ConnectorClientError(msg)
                    | connection_error::BadRequestError(msg) => {
                        log::error!("{} Bad request (unknown symbol?). {}", pair_interval, msg);
                    }
                    connection_error::TooManyRequestsError(msg) => {
                        log::error!("{} Rate limit exceeded. {}", pair_interval, msg);
                    }
                    connection_error::RateLimitBanError(msg) => {
                        log::error!(
                            "{} IP address banned due to excessive rate limits. {}",
                            pair_interval,
                            msg
                        );
                    }
                    connection_error::NetworkError(msg) => {
                        log::error!("{} Network error. {}", pair_interval, msg);
                    }
                    other => {
                        log::error!("{} Binance connector error: {:?}", pair_interval, other);
                    }
                }
                Err(
                    anyhow::Error::new(BNKlineError::ConnectionFailed(conn_err.to_string()))
                        .context(format!("Binance API call failed for {}", pair_interval)),
                )
            } else {
                Err(
                    anyhow::Error::new(BNKlineError::ConnectionFailed(e.to_string())).context(
                        format!("Unexpected error during API call for {}", pair_interval),
                    ),
                )
            }
        }
    }
}

/// Pages backwards from the newest kline until `limit` klines are held or
/// Binance has no older data. Result is ascending by open time.
pub async fn load_klines(
    rest_client: &RestApi,
    pair_interval: &PairInterval,
    limit: usize,
) -> Result<Vec<Candle>> {
    let page_max = BINANCE.paging.page_size as usize;
    let mut end_time: Option<i64> = None;
    let mut all_klines: Vec<BNKline> = Vec::with_capacity(limit);

    while all_klines.len() < limit {
        let remaining = limit - all_klines.len();
        // Follow-up pages overlap by one kline
        let overlap = usize::from(end_time.is_some());
        let requested = (remaining + overlap).min(page_max);

        let params = KlinesParams::builder(
            PairInterval::bn_name(&pair_interval.symbol),
            kline_interval(pair_interval.timeframe),
        )
        .limit(requested as i32)
        .end_time(end_time)
        .start_time(None)
        .build()?;

        #[cfg(debug_assertions)]
        if PRINT_PROVIDER_CALLS {
            log::debug!("{} klines request: limit {} end_time {:?}", pair_interval, requested, end_time);
        }

        let (rate_limits, new_klines) =
            fetch_binance_klines_with_limits(rest_client, params, pair_interval).await?;
        handle_rate_limits(&rate_limits, pair_interval).await;

        let (new_end_time, exhausted) =
            process_new_klines(new_klines, requested, &mut all_klines, pair_interval)?;
        end_time = Some(new_end_time);
        if exhausted {
            break;
        }
    }

    if has_duplicate_kline_open_time(&all_klines) {
        bail!(
            "has_duplicate_kline_open_time() failed for {} so bailing load_klines()!",
            pair_interval
        );
    }

    Ok(all_klines.into_iter().map(Candle::from).collect())
}

fn has_duplicate_kline_open_time(klines: &[BNKline]) -> bool {
    let mut seen_ids = HashSet::new();
    klines.iter().any(|kline| !seen_ids.insert(kline.open_timestamp_ms))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(ts: i64, close: &str) -> Vec<KlinesItemInner> {
        vec![
            KlinesItemInner::Integer(ts),
            KlinesItemInner::String("1.0".to_string()),
            KlinesItemInner::String("2.0".to_string()),
            KlinesItemInner::String("0.5".to_string()),
            KlinesItemInner::String(close.to_string()),
            KlinesItemInner::String("10".to_string()),
            KlinesItemInner::Integer(ts + 59_999),
        ]
    }

    fn held(ts: i64) -> BNKline {
        BNKline {
            open_timestamp_ms: ts,
            open_price: 1.0,
            high_price: 2.0,
            low_price: 0.5,
            close_price: 1.5,
            base_asset_volume: 10.0,
        }
    }

    #[test]
    fn test_kline_parses_string_prices() {
        let kline = BNKline::try_from(raw(60_000, "1.5")).unwrap();
        assert_eq!(kline.open_timestamp_ms, 60_000);
        assert_eq!(kline.close_price, 1.5);
        assert!(BNKline::try_from(raw(0, "abc")).is_err());
        assert!(BNKline::try_from(vec![KlinesItemInner::Integer(0)]).is_err());
    }

    #[test]
    fn test_follow_up_batch_drops_overlap_and_prepends() {
        let pi = PairInterval::new("BTC/USDT", Timeframe::M1);
        let mut all = vec![held(180_000), held(240_000)];
        let batch = vec![raw(60_000, "1"), raw(120_000, "1"), raw(180_000, "1")];

        let (end_time, exhausted) = process_new_klines(batch, 3, &mut all, &pi).unwrap();
        assert_eq!(end_time, 60_000);
        assert!(!exhausted);
        let times: Vec<i64> = all.iter().map(|k| k.open_timestamp_ms).collect();
        assert_eq!(times, vec![60_000, 120_000, 180_000, 240_000]);
        assert!(!has_duplicate_kline_open_time(&all));
    }

    #[test]
    fn test_short_batch_means_history_exhausted() {
        let pi = PairInterval::new("BTC/USDT", Timeframe::M1);
        let mut all = Vec::new();
        let (_, exhausted) =
            process_new_klines(vec![raw(0, "1"), raw(60_000, "1")], 5, &mut all, &pi).unwrap();
        assert!(exhausted);
        assert_eq!(all.len(), 2);

        let (_, exhausted) = process_new_klines(Vec::new(), 5, &mut all, &pi).unwrap();
        assert!(exhausted);
    }

    #[test]
    fn test_every_timeframe_maps_to_an_interval() {
        assert!(matches!(kline_interval(Timeframe::H4), KlinesIntervalEnum::Interval4h));
        assert!(matches!(kline_interval(Timeframe::Mo1), KlinesIntervalEnum::Interval1M));
    }
}
