//! Binance REST settings for the klines provider.

/// Client settings handed to `ConfigurationRestApi`
pub struct BinanceApiConfig {
    pub timeout_ms: u64,
    pub retries: u32,
    pub backoff_ms: u64,
}

impl Default for BinanceApiConfig {
    fn default() -> Self {
        Self {
            timeout_ms: BINANCE.client.timeout_ms,
            retries: BINANCE.client.retries,
            backoff_ms: BINANCE.client.backoff_ms,
        }
    }
}

/// How candle history is paged out of `/api/v3/klines`
pub struct KlinePaging {
    /// Binance caps a single klines response at 1000 rows
    pub page_size: i32,
    /// Request weight allowed per rolling minute
    pub weight_limit_minute: u32,
    /// Weight of one klines call at page sizes 100..=1000
    pub kline_call_weight: u32,
}

pub struct ClientDefaults {
    pub timeout_ms: u64,
    pub retries: u32,
    pub backoff_ms: u64,
}

pub struct BinanceConfig {
    pub paging: KlinePaging,
    pub client: ClientDefaults,
}

pub const BINANCE: BinanceConfig = BinanceConfig {
    paging: KlinePaging {
        page_size: 1000,
        weight_limit_minute: 6000,
        kline_call_weight: 2,
    },
    client: ClientDefaults {
        timeout_ms: 5000,
        retries: 5,
        backoff_ms: 5000,
    },
};
