//! USD quotes from the CoinGecko `simple/price` endpoint.
//!
//! Every failure (transport, HTTP status, unparseable body, id missing from
//! the response) is reported as [`Quote::Unavailable`] and logged; nothing is
//! returned to callers as an error. [`QuoteClient::get_price`] and
//! [`QuoteClient::get_prices_batch`] collapse unavailable quotes to `0.0`.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::time::Duration;

use reqwest::blocking::Client;
use serde_json::{Map, Value};
use tracing::{debug, error, warn};

use crate::alias::AliasResolver;
use crate::config;
use crate::error::Result;

// ---------------------------------------------------------------------------
// Quote
// ---------------------------------------------------------------------------

/// Why a price could not be determined.
#[derive(Debug, Clone, PartialEq)]
pub enum Unavailable {
    /// The request never produced a response (connect error, timeout, ...).
    Transport(String),
    /// The provider answered with a non-success status code.
    Status(u16),
    /// The body was not a JSON object.
    Malformed(String),
    /// The response did not carry a USD price for the id.
    Missing,
}

impl fmt::Display for Unavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unavailable::Transport(msg) => write!(f, "transport error: {}", msg),
            Unavailable::Status(code) => write!(f, "provider returned HTTP {}", code),
            Unavailable::Malformed(msg) => write!(f, "malformed response: {}", msg),
            Unavailable::Missing => write!(f, "no USD price in response"),
        }
    }
}

/// Outcome of a price lookup for one coin.
#[derive(Debug, Clone, PartialEq)]
pub enum Quote {
    Priced(f64),
    Unavailable(Unavailable),
}

impl Quote {
    pub fn price(&self) -> Option<f64> {
        match self {
            Quote::Priced(p) => Some(*p),
            Quote::Unavailable(_) => None,
        }
    }

    /// The price, or the zero sentinel when none could be determined.
    pub fn price_or_zero(&self) -> f64 {
        self.price().unwrap_or(0.0)
    }

    pub fn is_priced(&self) -> bool {
        matches!(self, Quote::Priced(_))
    }
}

// ---------------------------------------------------------------------------
// QuoteClient
// ---------------------------------------------------------------------------

/// Blocking HTTP client for the price provider.
///
/// One attempt per call, bounded by the configured timeout. No caching.
pub struct QuoteClient {
    client: Client,
    endpoint: String,
    resolver: AliasResolver,
}

impl QuoteClient {
    /// Create a client against `base_url` (e.g. `https://api.coingecko.com/api/v3`).
    pub fn new(base_url: &str, timeout: Duration, resolver: AliasResolver) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: format!(
                "{}/{}",
                base_url.trim_end_matches('/'),
                config::SIMPLE_PRICE_PATH
            ),
            resolver,
        })
    }

    /// The resolver used to map coin strings to provider ids.
    pub fn resolver(&self) -> &AliasResolver {
        &self.resolver
    }

    /// Full URL of the simple price endpoint, without query string.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Look up the USD price of a single coin.
    pub fn quote(&self, coin: &str) -> Quote {
        let id = self.resolver.resolve(coin);

        let data = match self.fetch(&id) {
            Ok(data) => data,
            Err(reason) => {
                error!(coin, id = %id, %reason, "price request failed");
                return Quote::Unavailable(reason);
            }
        };
        debug!(coin, id = %id, response = ?data, "price response");

        match usd_price(&data, &id) {
            Some(price) => Quote::Priced(price),
            None => {
                warn!(coin, id = %id, "no price data");
                Quote::Unavailable(Unavailable::Missing)
            }
        }
    }

    /// USD price of a single coin, `0.0` if unavailable.
    pub fn get_price(&self, coin: &str) -> f64 {
        self.quote(coin).price_or_zero()
    }

    /// Look up prices for many coins with a single request.
    ///
    /// The result has one entry per distinct input string, keyed by the
    /// string exactly as given (case and whitespace preserved). Inputs that
    /// resolve to the same provider id share one slot in the request.
    ///
    /// If the request itself fails, every input maps to the same
    /// `Unavailable` reason; partial results are never returned in that case.
    pub fn quote_batch<S: AsRef<str>>(&self, coins: &[S]) -> HashMap<String, Quote> {
        if coins.is_empty() {
            return HashMap::new();
        }

        let resolved: Vec<(&str, String)> = coins
            .iter()
            .map(|c| (c.as_ref(), self.resolver.resolve(c.as_ref())))
            .collect();
        let unique: BTreeSet<&str> = resolved.iter().map(|(_, id)| id.as_str()).collect();
        let ids = unique.into_iter().collect::<Vec<_>>().join(",");

        let data = match self.fetch(&ids) {
            Ok(data) => data,
            Err(reason) => {
                error!(ids = %ids, %reason, "batch price request failed");
                return resolved
                    .into_iter()
                    .map(|(coin, _)| (coin.to_string(), Quote::Unavailable(reason.clone())))
                    .collect();
            }
        };
        debug!(ids = %ids, response = ?data, "batch price response");

        let quotes: HashMap<String, Quote> = resolved
            .into_iter()
            .map(|(coin, id)| {
                let quote = match usd_price(&data, &id) {
                    Some(price) => Quote::Priced(price),
                    None => {
                        warn!(coin, id = %id, "no price data");
                        Quote::Unavailable(Unavailable::Missing)
                    }
                };
                (coin.to_string(), quote)
            })
            .collect();
        debug!(
            requested = quotes.len(),
            priced = quotes.values().filter(|q| q.is_priced()).count(),
            "batch priced"
        );
        quotes
    }

    /// Batch USD prices keyed by the original input strings, `0.0` where
    /// unavailable.
    pub fn get_prices_batch<S: AsRef<str>>(&self, coins: &[S]) -> HashMap<String, f64> {
        self.quote_batch(coins)
            .into_iter()
            .map(|(coin, quote)| (coin, quote.price_or_zero()))
            .collect()
    }

    /// Issue one `simple/price` request for a comma-joined id list.
    fn fetch(&self, ids: &str) -> std::result::Result<Map<String, Value>, Unavailable> {
        debug!(url = %self.endpoint, ids, "requesting prices");

        let resp = self
            .client
            .get(&self.endpoint)
            .query(&[("ids", ids), ("vs_currencies", config::QUOTE_CURRENCY)])
            .send()
            .map_err(|e| Unavailable::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Unavailable::Status(status.as_u16()));
        }

        let body: Value = resp
            .json()
            .map_err(|e| Unavailable::Malformed(e.to_string()))?;

        match body {
            Value::Object(map) => Ok(map),
            other => Err(Unavailable::Malformed(format!(
                "expected a JSON object, got {}",
                json_kind(&other)
            ))),
        }
    }
}

/// Pull `data[id]["usd"]` as a number.
fn usd_price(data: &Map<String, Value>, id: &str) -> Option<f64> {
    data.get(id)?.get(config::QUOTE_CURRENCY)?.as_f64()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn as_map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn usd_price_reads_nested_field() {
        let data = as_map(json!({"bitcoin": {"usd": 50000}, "ethereum": {"usd": 3000.5}}));
        assert_eq!(usd_price(&data, "bitcoin"), Some(50000.0));
        assert_eq!(usd_price(&data, "ethereum"), Some(3000.5));
    }

    #[test]
    fn usd_price_missing_or_wrong_shape() {
        let data = as_map(json!({"bitcoin": {"eur": 45000}, "tether": {"usd": "1"}}));
        assert_eq!(usd_price(&data, "bitcoin"), None);
        assert_eq!(usd_price(&data, "tether"), None);
        assert_eq!(usd_price(&data, "solana"), None);
    }

    #[test]
    fn unavailable_collapses_to_zero() {
        assert_eq!(Quote::Unavailable(Unavailable::Missing).price_or_zero(), 0.0);
        assert_eq!(Quote::Unavailable(Unavailable::Status(503)).price(), None);
        assert_eq!(Quote::Priced(1.25).price_or_zero(), 1.25);
        assert!(Quote::Priced(0.0).is_priced());
    }

    #[test]
    fn endpoint_strips_trailing_slash() {
        let client = QuoteClient::new(
            "http://localhost:1/api/v3/",
            Duration::from_secs(1),
            AliasResolver::default(),
        )
        .unwrap();
        assert_eq!(client.endpoint(), "http://localhost:1/api/v3/simple/price");
    }
}
