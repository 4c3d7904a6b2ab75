use async_trait::async_trait;
use std::time::Duration;

use super::RateTable;
use crate::error::FetchError;
use crate::storage::{self, KeyValueStore, RATES_KEY};

/// Where the rate table currently in use came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Provenance {
    Live,
    Cached,
    Fallback,
}

impl Provenance {
    pub(crate) fn is_offline(&self) -> bool {
        !matches!(self, Self::Live)
    }

    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::Live => "live",
            Self::Cached => "cached",
            Self::Fallback => "fallback",
        }
    }
}

impl std::fmt::Display for Provenance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[async_trait(?Send)]
pub(crate) trait RateProvider {
    async fn fetch(&self) -> Result<RateTable, FetchError>;
}

/// Fetches a flat `{"CODE": factor}` JSON document over HTTP.
pub(crate) struct HttpRateProvider {
    client: reqwest::Client,
    url: String,
}

impl HttpRateProvider {
    pub(crate) fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait(?Send)]
impl RateProvider for HttpRateProvider {
    async fn fetch(&self) -> Result<RateTable, FetchError> {
        let response = self.client.get(&self.url).send().await?.error_for_status()?;
        let table: RateTable = response.json().await?;
        table.validate().map_err(FetchError::Malformed)?;
        Ok(table)
    }
}

/// The authoritative rate table plus its provenance.
///
/// Starts out on the compiled-in fallback table. [`RateSource::refresh`]
/// makes one resolution attempt: network, then cache, then fallback.
pub(crate) struct RateSource<'s> {
    store: &'s dyn KeyValueStore,
    table: RateTable,
    provenance: Provenance,
}

impl<'s> RateSource<'s> {
    pub(crate) fn new(store: &'s dyn KeyValueStore) -> Self {
        Self {
            store,
            table: RateTable::fallback(),
            provenance: Provenance::Fallback,
        }
    }

    pub(crate) fn table(&self) -> &RateTable {
        &self.table
    }

    pub(crate) fn provenance(&self) -> Provenance {
        self.provenance
    }

    pub(crate) fn is_offline(&self) -> bool {
        self.provenance.is_offline()
    }

    pub(crate) async fn refresh(&mut self, provider: &dyn RateProvider) -> Provenance {
        match provider.fetch().await {
            Ok(table) => {
                storage::save(self.store, RATES_KEY, &table);
                tracing::info!(currencies = table.len(), "rates fetched and cached");
                self.table = table;
                self.provenance = Provenance::Live;
            }
            Err(e) => {
                tracing::warn!(error = %e, "rate fetch failed, trying cache");
                self.load_offline();
            }
        }
        self.provenance
    }

    /// Resolve without touching the network: cached table if there is a
    /// valid one, the compiled-in table otherwise.
    pub(crate) fn load_offline(&mut self) -> Provenance {
        match storage::try_load::<RateTable>(self.store, RATES_KEY) {
            Some(table) if table.validate().is_ok() => {
                tracing::info!("using cached rates");
                self.table = table;
                self.provenance = Provenance::Cached;
            }
            cached => {
                if let Some(table) = cached {
                    if let Err(reason) = table.validate() {
                        tracing::warn!(%reason, "ignoring invalid cached rates");
                    }
                }
                tracing::warn!("using fallback rates");
                self.table = RateTable::fallback();
                self.provenance = Provenance::Fallback;
            }
        }
        self.provenance
    }
}
