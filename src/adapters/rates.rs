use crate::calculators::money::currency;
use crate::domain::model::{RateOrigin, RateTable};
use crate::domain::ports::RateSource;
use crate::utils::error::{CalcError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct LatestRatesResponse {
    result: Option<String>,
    base_code: Option<String>,
    time_last_update_utc: Option<String>,
    rates: Option<HashMap<String, f64>>,
}

/// open.er-api.com compatible `latest` endpoint.
pub struct HttpRateSource {
    client: Client,
    endpoint: String,
}

impl HttpRateSource {
    pub fn new(endpoint: impl Into<String>, timeout_seconds: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl RateSource for HttpRateSource {
    async fn latest(&self) -> Result<RateTable> {
        tracing::debug!("Fetching exchange rates from: {}", self.endpoint);
        let response = self.client.get(&self.endpoint).send().await?;

        if !response.status().is_success() {
            return Err(CalcError::RemoteError {
                message: format!("rate endpoint returned {}", response.status()),
            });
        }

        let body: LatestRatesResponse = response.json().await?;
        let rates = match (body.result.as_deref(), body.rates) {
            (Some("success"), Some(rates)) => rates,
            _ => {
                return Err(CalcError::RemoteError {
                    message: "unexpected rate response".to_string(),
                })
            }
        };

        let base = body.base_code.unwrap_or_else(|| "USD".to_string());
        let mut rates = rates;
        rates.insert(base.clone(), 1.0);

        Ok(RateTable {
            base,
            rates,
            origin: RateOrigin::Live,
            updated: body.time_last_update_utc,
        })
    }
}

/// Always answers with the bundled table.
#[derive(Debug, Default, Clone, Copy)]
pub struct StaticRateSource;

#[async_trait]
impl RateSource for StaticRateSource {
    async fn latest(&self) -> Result<RateTable> {
        Ok(currency::fallback_table())
    }
}

/// Tries the inner source and degrades to the bundled table on any failure.
pub struct FallbackRateSource<S: RateSource> {
    inner: S,
}

impl<S: RateSource> FallbackRateSource<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<S: RateSource> RateSource for FallbackRateSource<S> {
    async fn latest(&self) -> Result<RateTable> {
        match self.inner.latest().await {
            Ok(table) => Ok(table),
            Err(e) => {
                tracing::warn!("Currency fetch failed, using offline rates: {}", e);
                Ok(currency::fallback_table())
            }
        }
    }
}
