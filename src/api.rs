//! Product Advertising API client tying signing, transport and transformation together.

use crate::amazon::client::{HttpClient, HttpFetch};
use crate::amazon::document::Document;
use crate::amazon::models::ErrorRecord;
use crate::amazon::signer::{Params, Signer};
use crate::amazon::url_builder::UrlBuilder;
use crate::config::Config;
use crate::error::Result;
use crate::transform::{ErrorLog, Output, Transformer};
use tracing::{debug, info, warn};

/// Search indices (categories) known to the service.
pub const DEFAULT_SEARCH_INDICES: &[&str] = &[
    "All",
    "Apparel",
    "Appliances",
    "Automotive",
    "Baby",
    "Beauty",
    "Blended",
    "Books",
    "Classical",
    "DVD",
    "Electronics",
    "Grocery",
    "HealthPersonalCare",
    "HomeGarden",
    "HomeImprovement",
    "Jewelry",
    "KindleStore",
    "Kitchen",
    "Lighting",
    "Marketplace",
    "MP3Downloads",
    "Music",
    "MusicTracks",
    "MusicalInstruments",
    "OfficeProducts",
    "OutdoorLiving",
    "Outlet",
    "PetSupplies",
    "PCHardware",
    "Shoes",
    "Software",
    "SoftwareVideoGames",
    "SportingGoods",
    "Tools",
    "Toys",
    "VHS",
    "Video",
    "VideoGames",
    "Watches",
];

const DEFAULT_SEARCH_INDEX: &str = "All";
const DEFAULT_CONDITION: &str = "New";
const DEFAULT_SEARCH_RESPONSE_GROUP: &str = "ItemAttributes,Offers,Images";
const DEFAULT_LOOKUP_RESPONSE_GROUP: &str = "ItemAttributes,Offers,Reviews,Images,EditorialReview";
const DEFAULT_REVIEW_SORT: &str = "-OverallRating";

/// Parameters of an `ItemSearch` request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemSearch {
    pub keywords: String,
    /// Category to search, `All` when unset
    pub search_index: Option<String>,
    /// Sort order, only sent for a specific search index
    pub sort: Option<String>,
    /// Item condition, `New` when unset
    pub condition: Option<String>,
    pub response_group: Option<String>,
}

impl ItemSearch {
    pub fn new(keywords: impl Into<String>) -> Self {
        Self { keywords: keywords.into(), ..Default::default() }
    }

    pub fn index(mut self, index: impl Into<String>) -> Self {
        self.search_index = Some(index.into());
        self
    }

    pub fn sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    pub fn condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = Some(condition.into());
        self
    }

    pub fn response_group(mut self, group: impl Into<String>) -> Self {
        self.response_group = Some(group.into());
        self
    }

    /// Returns the search index that will be sent.
    pub fn effective_index(&self) -> &str {
        non_empty(&self.search_index).unwrap_or(DEFAULT_SEARCH_INDEX)
    }

    /// Builds the request parameters, applying defaults.
    pub fn params(&self) -> Params {
        let index = self.effective_index();
        let sort = non_empty(&self.sort).filter(|_| index != DEFAULT_SEARCH_INDEX);

        let mut params = Params::new()
            .with("Keywords", self.keywords.as_str())
            .with("SearchIndex", index)
            .with("Condition", non_empty(&self.condition).unwrap_or(DEFAULT_CONDITION))
            .with("ResponseGroup", non_empty(&self.response_group).unwrap_or(DEFAULT_SEARCH_RESPONSE_GROUP));
        params.insert_opt("Sort", sort);
        params
    }
}

/// Parameters of an `ItemLookup` request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemLookup {
    pub asins: Vec<String>,
    /// Restrict offers to those sold by Amazon itself
    pub amazon_only: bool,
    pub response_group: Option<String>,
    /// Review sort order, `-OverallRating` when unset
    pub review_sort: Option<String>,
}

impl ItemLookup {
    pub fn new<I, S>(asins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { asins: asins.into_iter().map(Into::into).collect(), ..Default::default() }
    }

    pub fn amazon_only(mut self, amazon_only: bool) -> Self {
        self.amazon_only = amazon_only;
        self
    }

    pub fn response_group(mut self, group: impl Into<String>) -> Self {
        self.response_group = Some(group.into());
        self
    }

    pub fn review_sort(mut self, sort: impl Into<String>) -> Self {
        self.review_sort = Some(sort.into());
        self
    }

    /// Builds the request parameters, applying defaults.
    pub fn params(&self) -> Params {
        Params::new()
            .with("ItemId", self.asins.join(","))
            .with("MerchantId", if self.amazon_only { "Amazon" } else { "All" })
            .with("ResponseGroup", non_empty(&self.response_group).unwrap_or(DEFAULT_LOOKUP_RESPONSE_GROUP))
            .with("ReviewSort", non_empty(&self.review_sort).unwrap_or(DEFAULT_REVIEW_SORT))
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Product Advertising API client.
///
/// The output representation is fixed when the client is built. Failures
/// that non-strict transformers swallow are kept in an error log readable
/// through [`AmazonApi::errors`].
pub struct AmazonApi<F: HttpFetch = HttpClient> {
    builder: UrlBuilder,
    fetcher: F,
    transformer: Transformer,
    errors: ErrorLog,
    search_indices: Vec<String>,
}

impl AmazonApi<HttpClient> {
    /// Builds a client from configuration, using the wreq transport.
    pub fn from_config(config: &Config) -> Result<Self> {
        let builder = UrlBuilder::new(config.credential()?, config.locale)
            .with_signer(Signer::new(config.version.clone()));
        let fetcher = HttpClient::new(config)?;

        Ok(Self::new(builder, fetcher, config.transformer()).with_search_indices(config.search_indices.clone()))
    }
}

impl<F: HttpFetch> AmazonApi<F> {
    pub fn new(builder: UrlBuilder, fetcher: F, transformer: Transformer) -> Self {
        Self {
            builder,
            fetcher,
            transformer,
            errors: ErrorLog::new(),
            search_indices: DEFAULT_SEARCH_INDICES.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Replaces the known search indices. An empty list keeps the defaults.
    pub fn with_search_indices<I, S>(mut self, indices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let indices: Vec<String> = indices.into_iter().map(Into::into).collect();
        if !indices.is_empty() {
            self.search_indices = indices;
        }
        self
    }

    pub fn url_builder(&self) -> &UrlBuilder {
        &self.builder
    }

    pub fn transformer(&self) -> Transformer {
        self.transformer
    }

    pub fn search_indices(&self) -> &[String] {
        &self.search_indices
    }

    /// Searches the catalog by keywords.
    pub async fn item_search(&self, search: &ItemSearch) -> Result<Output> {
        let index = search.effective_index();
        if !self.search_indices.iter().any(|known| known == index) {
            warn!("Search index '{}' is not a known search index", index);
        }

        info!("Searching '{}' in {}", search.keywords, index);
        self.request("ItemSearch", &search.params()).await
    }

    /// Looks up one or more items by ASIN.
    pub async fn item_lookup(&self, lookup: &ItemLookup) -> Result<Output> {
        info!("Looking up {}", lookup.asins.join(","));
        self.request("ItemLookup", &lookup.params()).await
    }

    /// Signs, sends and transforms an arbitrary operation.
    ///
    /// Transport and parse failures go through the transformer's failure
    /// policy; signing failures are always returned.
    pub async fn request(&self, operation: &str, params: &Params) -> Result<Output> {
        let url = self.builder.build_signed_url(operation, params)?;

        let body = match self.fetcher.execute(&url).await {
            Ok(body) => body,
            Err(err) => return self.transformer.fail(err, &self.errors),
        };
        debug!("Received {} bytes for {}", body.len(), operation);

        let doc = match Document::parse(&body) {
            Ok(doc) => doc,
            Err(err) => return self.transformer.fail(err, &self.errors),
        };

        self.transformer.transform(doc, &self.errors)
    }

    /// Returns the recorded errors, oldest first.
    pub fn errors(&self) -> Vec<ErrorRecord> {
        self.errors.snapshot()
    }

    pub fn clear_errors(&self) {
        self.errors.clear();
    }
}
