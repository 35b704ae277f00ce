// Adapters layer: concrete implementations of the domain ports (http, storage).

pub mod qr;
pub mod rates;
pub mod storage;

pub use qr::{HttpQrRenderer, UnavailableQrRenderer};
pub use rates::{FallbackRateSource, HttpRateSource, StaticRateSource};
pub use storage::LocalStorage;
