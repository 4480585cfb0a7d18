//! Where country data comes from.
//!
//! A game start fetches the whole dataset once. No retries and no caching:
//! a failed fetch fails the start and leaves existing sessions alone.

use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use tracing::debug;

use crate::{
    country::CountryRecord,
    error::{Result, TriviaError},
};

pub const DEFAULT_COUNTRIES_URL: &str =
    "https://restcountries.com/v3.1/all?fields=name,capital,population,region,languages";

/// Supplies the country dataset questions are generated from.
pub trait CountrySource: Send + Sync {
    fn fetch_countries(&self) -> BoxFuture<'_, Result<Vec<CountryRecord>>>;
}

/// Fetches countries over HTTP from a REST Countries compatible endpoint.
pub struct RestCountries {
    client: reqwest::Client,
    url: String,
}

impl RestCountries {
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), url)
    }

    pub fn with_client(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

impl CountrySource for RestCountries {
    fn fetch_countries(&self) -> BoxFuture<'_, Result<Vec<CountryRecord>>> {
        async move {
            let response = self.client.get(&self.url).send().await?;
            let status = response.status();
            if !status.is_success() {
                return Err(TriviaError::UpstreamStatus(status));
            }

            let countries: Vec<CountryRecord> = response.json().await?;
            debug!(url = %self.url, count = countries.len(), "fetched countries");
            Ok(countries)
        }
        .boxed()
    }
}

/// A fixed, in-memory dataset.
#[derive(Debug, Clone, Default)]
pub struct StaticCountries {
    countries: Arc<Vec<CountryRecord>>,
}

impl StaticCountries {
    pub fn new(countries: Vec<CountryRecord>) -> Self {
        Self {
            countries: Arc::new(countries),
        }
    }
}

impl CountrySource for StaticCountries {
    fn fetch_countries(&self) -> BoxFuture<'_, Result<Vec<CountryRecord>>> {
        let countries = self.countries.as_ref().clone();
        async move { Ok(countries) }.boxed()
    }
}
