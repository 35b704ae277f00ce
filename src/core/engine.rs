use crate::adapters::{
    FallbackRateSource, HttpQrRenderer, HttpRateSource, LocalStorage, StaticRateSource,
    UnavailableQrRenderer,
};
use crate::calculators;
use crate::domain::model::{Card, Form};
use crate::domain::ports::{ConfigProvider, QrRenderer, RateSource};
use crate::utils::error::{CalcError, Result};
use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use std::collections::HashMap;
use std::sync::Arc;

/// Ambient inputs shared by every calculator run.
#[derive(Clone)]
pub struct Env {
    pub today: NaiveDate,
    pub now: DateTime<Utc>,
    pub rates: Arc<dyn RateSource>,
    pub qr: Arc<dyn QrRenderer>,
    /// Where file inputs such as the PDF to extract are read from.
    pub storage: LocalStorage,
    /// Fixed seed for reproducible password runs; `None` uses the OS source.
    pub rng_seed: Option<u64>,
}

impl Env {
    pub fn new(rates: Arc<dyn RateSource>, qr: Arc<dyn QrRenderer>) -> Self {
        Self {
            today: Local::now().date_naive(),
            now: Utc::now(),
            rates,
            qr,
            storage: LocalStorage::new(".".to_string()),
            rng_seed: None,
        }
    }

    /// Bundled data only, clock pinned to noon UTC on `today`.
    pub fn offline_at(today: NaiveDate) -> Self {
        let now = today
            .and_hms_opt(12, 0, 0)
            .map(|dt| Utc.from_utc_datetime(&dt))
            .unwrap_or_else(Utc::now);
        Self {
            today,
            now,
            rates: Arc::new(StaticRateSource),
            qr: Arc::new(UnavailableQrRenderer::default()),
            storage: LocalStorage::new(".".to_string()),
            rng_seed: None,
        }
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        if config.offline() {
            tracing::info!("Offline mode: using bundled rates");
            let mut env = Self::offline_at(Local::now().date_naive());
            env.now = Utc::now();
            env.qr = Arc::new(UnavailableQrRenderer::new(config.qr_endpoint()));
            return Ok(env);
        }

        let rates: Arc<dyn RateSource> = if config.currency_enabled() {
            let live = HttpRateSource::new(config.currency_endpoint(), config.request_timeout_seconds())?;
            Arc::new(FallbackRateSource::new(live))
        } else {
            tracing::info!("Currency lookups disabled: using bundled rates");
            Arc::new(StaticRateSource)
        };
        let qr: Arc<dyn QrRenderer> = if config.qr_enabled() {
            Arc::new(HttpQrRenderer::new(config.qr_endpoint(), config.qr_timeout_seconds())?)
        } else {
            Arc::new(UnavailableQrRenderer::new(config.qr_endpoint()))
        };
        Ok(Self::new(rates, qr))
    }

    pub fn with_rates(mut self, rates: Arc<dyn RateSource>) -> Self {
        self.rates = rates;
        self
    }

    pub fn with_qr(mut self, qr: Arc<dyn QrRenderer>) -> Self {
        self.qr = qr;
        self
    }

    pub fn with_storage(mut self, storage: LocalStorage) -> Self {
        self.storage = storage;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }
}

pub struct CalcEngine {
    env: Env,
    defaults: HashMap<String, HashMap<String, String>>,
}

impl CalcEngine {
    pub fn new(env: Env) -> Self {
        Self {
            env,
            defaults: HashMap::new(),
        }
    }

    pub fn with_defaults(mut self, defaults: HashMap<String, HashMap<String, String>>) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn env(&self) -> &Env {
        &self.env
    }

    /// Runs one calculator. Rejected input comes back as an error-tone card;
    /// only infrastructure failures are returned as `Err`.
    pub async fn run(&self, key: &str, form: Form) -> Result<Card> {
        let calculator = calculators::find(key).ok_or_else(|| CalcError::UnknownCalculator {
            key: key.to_string(),
        })?;

        let mut form = form;
        if let Some(defaults) = self.defaults.get(calculator.key()) {
            form.merge_defaults(defaults);
        }

        tracing::debug!("Running {} with {} fields", calculator.key(), form.len());

        match calculator.run(&form, &self.env).await {
            Ok(card) => {
                tracing::debug!(
                    "{} produced {} stats, {} tables",
                    calculator.key(),
                    card.stats.len(),
                    card.tables.len()
                );
                Ok(card)
            }
            Err(e) if e.is_user_facing() => {
                tracing::info!("{} rejected input: {}", calculator.key(), e);
                Ok(Card::message(e.user_friendly_message()))
            }
            Err(e) => {
                tracing::error!("{} failed: {}", calculator.key(), e);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Tone;

    fn engine() -> CalcEngine {
        CalcEngine::new(Env::offline_at(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()))
    }

    #[tokio::test]
    async fn test_unknown_calculator() {
        let err = engine().run("nope", Form::new()).await.unwrap_err();
        assert!(matches!(err, CalcError::UnknownCalculator { .. }));
    }

    #[tokio::test]
    async fn test_invalid_input_becomes_message_card() {
        let card = engine()
            .run("tip-calculator", Form::new().with("bill", "-5"))
            .await
            .unwrap();
        assert_eq!(card.tone, Tone::Error);
        assert!(card.headline.is_some());
    }

    #[tokio::test]
    async fn test_defaults_fill_missing_fields() {
        let mut tip = HashMap::new();
        tip.insert("tip".to_string(), "20".to_string());
        tip.insert("people".to_string(), "2".to_string());
        let mut defaults = HashMap::new();
        defaults.insert("tip-calculator".to_string(), tip);

        let card = engine()
            .with_defaults(defaults)
            .run("tip-calculator", Form::new().with("bill", "100"))
            .await
            .unwrap();
        assert_eq!(card.tone, Tone::Info);
        assert_eq!(card.stat_value("Tip amount"), Some("$20.00"));
        assert_eq!(card.stat_value("Per person"), Some("$60.00"));
    }
}
