pub mod bookmarks;
pub mod cache;
pub mod charts;
pub mod config;
pub mod error;
pub mod geolocation;
pub mod models;
pub mod population;
pub mod stocks;
pub mod templates;

pub use bookmarks::{BoundingBox, MapView, Notice, SessionContext};
pub use cache::{EvictionPolicy, UnboundedCache};
pub use config::Config;
pub use error::{PopulationError, StockError, ValidationError};
pub use models::*;
pub use population::{ColumnScheme, PopulationService, PopulationTable};
pub use stocks::{FetchOutcome, PriceHistoryProvider, StockFetcher, YahooFinanceClient};
