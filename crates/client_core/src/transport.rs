use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use shared::{
    domain::Reference,
    protocol::{
        ListingRecord, ListingsPayload, ListingsResponse, LookupResponse, MutationResponse,
        PlaceholderRequest, PriceUpdateRequest,
    },
};
use tracing::{info, warn};
use url::Url;

use crate::{
    error::{describe_transport, LoadError, LookupError, MutationError, TransportSetupError},
    ListingsService,
};

const GENERIC_API_ERROR: &str = "listings service reported a failure";
const UNKNOWN_REJECTION: &str = "unknown";

pub struct HttpListingsService {
    http: Client,
    base_url: Url,
}

impl HttpListingsService {
    /// Every request made through the returned service is aborted after `timeout`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, TransportSetupError> {
        let parsed = Url::parse(base_url).map_err(|e| TransportSetupError::InvalidUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        if parsed.cannot_be_a_base() {
            return Err(TransportSetupError::InvalidUrl {
                url: base_url.to_string(),
                reason: "url cannot carry a path".to_string(),
            });
        }

        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: parsed,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Appends percent-encoded path segments to the base url.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn post_mutation<T: Serialize + ?Sized>(
        &self,
        segments: &[&str],
        body: &T,
    ) -> Result<(), MutationError> {
        let url = self.endpoint(segments);
        let response = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| MutationError::Transport(describe_transport(&e)))?;

        // The service reports rejections in the body, whatever the status.
        let status = response.status();
        let body: MutationResponse = response.json().await.map_err(|e| {
            MutationError::Transport(format!("status {status}: {}", describe_transport(&e)))
        })?;

        if body.success {
            Ok(())
        } else {
            Err(MutationError::Rejected(
                body.error.unwrap_or_else(|| UNKNOWN_REJECTION.to_string()),
            ))
        }
    }
}

#[async_trait]
impl ListingsService for HttpListingsService {
    async fn fetch_listings(&self) -> Result<ListingsPayload, LoadError> {
        let response = self
            .http
            .get(self.endpoint(&["vetrine"]))
            .send()
            .await
            .map_err(|e| LoadError::Transport(describe_transport(&e)))?;

        if !response.status().is_success() {
            return Err(LoadError::Status(response.status().as_u16()));
        }

        let body: ListingsResponse = response
            .json()
            .await
            .map_err(|e| LoadError::Transport(describe_transport(&e)))?;
        if !body.success {
            return Err(LoadError::Rejected(
                body.error.unwrap_or_else(|| GENERIC_API_ERROR.to_string()),
            ));
        }
        body.data.ok_or(LoadError::MissingData)
    }

    async fn lookup(&self, reference: &Reference) -> Result<Option<ListingRecord>, LookupError> {
        let response = self
            .http
            .get(self.endpoint(&["vetrine", "rif", reference.as_str()]))
            .send()
            .await
            .map_err(|e| LookupError {
                reference: reference.clone(),
                reason: describe_transport(&e),
            })?;

        if !response.status().is_success() {
            info!(reference = %reference, status = %response.status(), "lookup: not found");
            return Ok(None);
        }

        match response.json::<LookupResponse>().await {
            Ok(body) if body.success => Ok(body.immobile),
            Ok(_) => Ok(None),
            Err(err) if err.is_timeout() => Err(LookupError {
                reference: reference.clone(),
                reason: describe_transport(&err),
            }),
            Err(err) => {
                warn!(reference = %reference, "lookup: undecodable response: {err}");
                Ok(None)
            }
        }
    }

    async fn lower_price(&self, reference: &Reference, new_price: f64) -> Result<(), MutationError> {
        info!(reference = %reference, new_price, "lowering price");
        self.post_mutation(
            &["vetrine", "ribasso"],
            &PriceUpdateRequest {
                rif: reference.to_string(),
                nuovo_prezzo: new_price,
            },
        )
        .await
    }

    async fn set_placeholder(
        &self,
        reference: &Reference,
        placeholder: bool,
    ) -> Result<(), MutationError> {
        info!(reference = %reference, placeholder, "setting placeholder flag");
        self.post_mutation(
            &["vetrine", "placeholder"],
            &PlaceholderRequest {
                rif: reference.to_string(),
                placeholder,
            },
        )
        .await
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
