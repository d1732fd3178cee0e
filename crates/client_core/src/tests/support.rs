use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use shared::{
    domain::{Listing, Reference},
    protocol::{ListingRecord, ListingsPayload},
};

use crate::{
    error::{LoadError, LookupError, MutationError},
    ListingsService,
};

pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
}

pub fn days_ago(days: i64) -> DateTime<Utc> {
    now() - Duration::days(days)
}

pub fn listing(reference: &str, branch: &str, price: Option<f64>) -> Listing {
    Listing {
        reference: Reference::new(reference),
        branch: branch.to_string(),
        price,
        reference_price: None,
        last_updated: Some(days_ago(10)),
        is_placeholder: false,
        locality: "Concordia".to_string(),
    }
}

pub fn record(reference: &str, branch: Option<&str>, price: f64) -> ListingRecord {
    ListingRecord {
        rif: reference.to_string(),
        agenzia: branch.map(str::to_string),
        prezzo: Some(price),
        ..ListingRecord::default()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Fetch,
    Lookup(String),
    LowerPrice(String, f64),
    SetPlaceholder(String, bool),
}

/// Scripted in-memory service that records every call it receives.
#[derive(Clone)]
pub struct FakeService {
    pub calls: Arc<Mutex<Vec<Call>>>,
    pub payload: Arc<Mutex<Result<ListingsPayload, LoadError>>>,
    pub lookup_result: Result<Option<ListingRecord>, String>,
    pub mutation_result: Result<(), MutationError>,
}

impl FakeService {
    pub fn with_records(records: Vec<ListingRecord>) -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            payload: Arc::new(Mutex::new(Ok(ListingsPayload::Flat(records)))),
            lookup_result: Ok(None),
            mutation_result: Ok(()),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn fail_loads_with(&self, err: LoadError) {
        *self.payload.lock().unwrap() = Err(err);
    }

    pub fn serve_records(&self, records: Vec<ListingRecord>) {
        *self.payload.lock().unwrap() = Ok(ListingsPayload::Flat(records));
    }

    fn record_call(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl ListingsService for FakeService {
    async fn fetch_listings(&self) -> Result<ListingsPayload, LoadError> {
        self.record_call(Call::Fetch);
        self.payload.lock().unwrap().clone()
    }

    async fn lookup(&self, reference: &Reference) -> Result<Option<ListingRecord>, LookupError> {
        self.record_call(Call::Lookup(reference.to_string()));
        self.lookup_result.clone().map_err(|reason| LookupError {
            reference: reference.clone(),
            reason,
        })
    }

    async fn lower_price(&self, reference: &Reference, new_price: f64) -> Result<(), MutationError> {
        self.record_call(Call::LowerPrice(reference.to_string(), new_price));
        self.mutation_result.clone()
    }

    async fn set_placeholder(
        &self,
        reference: &Reference,
        placeholder: bool,
    ) -> Result<(), MutationError> {
        self.record_call(Call::SetPlaceholder(reference.to_string(), placeholder));
        self.mutation_result.clone()
    }
}
