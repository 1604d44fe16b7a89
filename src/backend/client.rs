//! DocAssist REST API Client
//!
//! HTTP client for the DocAssist backend. Calls are never retried; a
//! failed request is reported to the caller as-is.

use super::dto::*;
use super::error::BackendError;
use super::ClinicBackend;
use crate::config::BackendConfig;
use crate::session::Role;
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;
use uuid::Uuid;

/// DocAssist REST API client
#[derive(Clone)]
pub struct BackendClient {
    client: Client,
    base_url: String,
}

impl BackendClient {
    /// Create a client for the configured backend
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(concat!("docassist/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Base URL including the `/api` prefix
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Register a new patient account
    pub async fn register_patient(
        &self,
        registration: &PatientRegistration,
    ) -> Result<(), BackendError> {
        let path = format!("/auth/{}/register", Role::Patient.as_str());
        self.send_discard(self.request(Method::POST, &path).json(registration))
            .await
    }

    /// Register a new doctor account
    pub async fn register_doctor(
        &self,
        registration: &DoctorRegistration,
    ) -> Result<(), BackendError> {
        let path = format!("/auth/{}/register", Role::Doctor.as_str());
        self.send_discard(self.request(Method::POST, &path).json(registration))
            .await
    }

    /// Log in with either role
    pub async fn login(
        &self,
        role: Role,
        request: &LoginRequest,
    ) -> Result<LoginResponse, BackendError> {
        let path = format!("/auth/{}/login", role.as_str());
        self.send_json(self.request(Method::POST, &path).json(request))
            .await
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let request_id = Uuid::new_v4().to_string();
        tracing::debug!(request_id = %request_id, method = %method, path, "Backend request");

        self.client
            .request(method, format!("{}{}", self.base_url, path))
            .header("X-Request-Id", request_id)
    }

    async fn send(&self, builder: RequestBuilder) -> Result<reqwest::Response, BackendError> {
        let response = builder.send().await.map_err(BackendError::from_transport)?;

        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status().as_u16();
        let text = response.text().await.unwrap_or_default();
        let err = BackendError::from_body(status, &text);
        tracing::warn!(status, error = %err, "Backend returned an error");
        Err(err)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<T, BackendError> {
        let response = self.send(builder).await?;
        response.json().await.map_err(BackendError::Request)
    }

    async fn send_discard(&self, builder: RequestBuilder) -> Result<(), BackendError> {
        self.send(builder).await.map(|_| ())
    }
}

#[async_trait]
impl ClinicBackend for BackendClient {
    async fn analyze(&self, request: &AnalyzeRequest) -> Result<TriageResult, BackendError> {
        self.send_json(self.request(Method::POST, "/analyze").json(request))
            .await
    }

    async fn search_doctors(
        &self,
        search: &DoctorSearch,
    ) -> Result<Vec<DoctorCandidate>, BackendError> {
        let mut query = vec![
            ("specialty", search.specialty.clone()),
            ("city", search.city.clone()),
        ];
        if let Some(coords) = search.coordinates {
            query.push(("lat", coords.lat.to_string()));
            query.push(("lon", coords.lon.to_string()));
        }

        self.send_json(self.request(Method::GET, "/doctors/search").query(&query))
            .await
    }

    async fn book(&self, request: &BookingRequest) -> Result<BookingReceipt, BackendError> {
        self.send_json(self.request(Method::POST, "/book").json(request))
            .await
    }

    async fn patient_appointments(
        &self,
        patient_id: i64,
    ) -> Result<Vec<BookingRecord>, BackendError> {
        let path = format!("/patient/{}/appointments", patient_id);
        self.send_json(self.request(Method::GET, &path)).await
    }

    async fn doctor_appointments(
        &self,
        doctor_id: i64,
    ) -> Result<Vec<BookingRecord>, BackendError> {
        let path = format!("/doctor/{}/appointments", doctor_id);
        self.send_json(self.request(Method::GET, &path)).await
    }

    async fn approve_appointment(&self, id: AppointmentId) -> Result<(), BackendError> {
        let path = format!("/appointment/{}/approve", id);
        self.send_discard(self.request(Method::PUT, &path)).await
    }

    async fn cancel_appointment(&self, id: AppointmentId) -> Result<(), BackendError> {
        let path = format!("/appointment/{}", id);
        self.send_discard(self.request(Method::DELETE, &path)).await
    }
}
