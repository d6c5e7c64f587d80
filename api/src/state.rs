use std::sync::Arc;

use shared::{
    ColumnScheme, Config, PopulationService, PriceHistoryProvider, StockFetcher,
    YahooFinanceClient,
};

use crate::session::SessionStore;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub sessions: Arc<SessionStore>,
    pub population: Arc<PopulationService>,
    pub stocks: Arc<StockFetcher>,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, anyhow::Error> {
        let provider = YahooFinanceClient::new(&config.stock_api_base_url, config.http_timeout_secs)?;
        tracing::info!("Price history provider: {}", config.stock_api_base_url);
        Ok(Self::with_provider(config, Arc::new(provider)))
    }

    pub fn with_provider(config: Config, provider: Arc<dyn PriceHistoryProvider>) -> Self {
        AppState {
            config: Arc::new(config),
            sessions: Arc::new(SessionStore::default()),
            population: Arc::new(PopulationService::new(ColumnScheme::default())),
            stocks: Arc::new(StockFetcher::new(provider)),
        }
    }
}
