use crate::core::engine::Env;
use crate::domain::model::{Card, Form, QrRequest, RateTable};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn output_format(&self) -> &str;
    fn output_dir(&self) -> &str;
    fn currency_endpoint(&self) -> &str;
    fn qr_endpoint(&self) -> &str;
    fn request_timeout_seconds(&self) -> u64;
    fn qr_timeout_seconds(&self) -> u64 {
        self.request_timeout_seconds()
    }
    fn offline(&self) -> bool;
    fn currency_enabled(&self) -> bool {
        true
    }
    fn qr_enabled(&self) -> bool {
        true
    }
    /// Default form fields for one calculator key.
    fn defaults_for(&self, calculator: &str) -> Option<HashMap<String, String>>;
}

/// One widget: reads its form, validates, computes and renders a card.
#[async_trait]
pub trait Calculator: Send + Sync {
    fn key(&self) -> &'static str;
    async fn run(&self, form: &Form, env: &Env) -> Result<Card>;
}

#[async_trait]
pub trait RateSource: Send + Sync {
    async fn latest(&self) -> Result<RateTable>;
}

#[async_trait]
pub trait QrRenderer: Send + Sync {
    /// Public image URL for the request, usable without fetching.
    fn image_url(&self, request: &QrRequest) -> Result<String>;
    async fn render(&self, request: &QrRequest) -> Result<Vec<u8>>;
}
