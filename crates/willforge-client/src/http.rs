//! HTTP implementation of the service contracts
//!
//! One thin client per backend; all traits are implemented by the same
//! `HttpApi` since the collaborators live behind a single API gateway.

use crate::error::ApiError;
use crate::services::{
    AcknowledgeResponse, ByteStream, ConversationRequest, ConversationService, DocumentRenderer,
    DocumentStore, DraftSummary, PaymentGateway, PaymentSession, PaymentStatus, ScenarioAnalysis,
    TokenProvider, VerificationService,
};
use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::info;
use willforge_draft::{DraftId, DraftKind, DraftState, Message};
use willforge_section::{Scenario, Section};

/// HTTP client for the wizard's backend
pub struct HttpApi {
    client: reqwest::Client,
    base_url: String,
    token: Arc<dyn TokenProvider>,
}

impl HttpApi {
    /// Create a client for the given API base URL.
    ///
    /// `base_url` should be like `https://api.example.com/api` (no
    /// trailing slash).
    pub fn new(base_url: String, token: Arc<dyn TokenProvider>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn authed(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<reqwest::RequestBuilder, ApiError> {
        match self.token.token().await? {
            Some(token) => Ok(builder.bearer_auth(token)),
            None => Ok(builder),
        }
    }

    async fn send(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, ApiError> {
        let resp = self.authed(builder).await?.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ApiError::Server {
                status: status.as_u16(),
                body,
            });
        }
        Ok(resp)
    }

    async fn stream(&self, builder: reqwest::RequestBuilder) -> Result<ByteStream, ApiError> {
        let resp = self.send(builder).await?;
        Ok(Box::pin(
            resp.bytes_stream().map(|r| r.map_err(ApiError::from)),
        ))
    }
}

#[derive(Deserialize)]
struct CreatedDraft {
    id: DraftId,
}

#[derive(Deserialize)]
struct ScenarioList {
    scenarios: BTreeSet<Scenario>,
}

#[derive(Deserialize)]
struct HistoryResponse {
    messages: Vec<Message>,
}

#[async_trait]
impl DocumentStore for HttpApi {
    async fn create_draft(&self, kind: DraftKind) -> Result<DraftId, ApiError> {
        let resp = self
            .send(
                self.client
                    .post(self.url("/wills"))
                    .json(&json!({ "kind": kind })),
            )
            .await?;
        let created: CreatedDraft = resp.json().await?;
        info!(draft = %created.id, "created draft record");
        Ok(created.id)
    }

    async fn fetch_draft(&self, id: DraftId) -> Result<DraftState, ApiError> {
        let resp = self.send(self.client.get(self.url(&format!("/wills/{id}")))).await?;
        Ok(resp.json().await?)
    }

    async fn list_drafts(&self) -> Result<Vec<DraftSummary>, ApiError> {
        let resp = self.send(self.client.get(self.url("/wills"))).await?;
        Ok(resp.json().await?)
    }

    async fn update_section(
        &self,
        id: DraftId,
        section: Section,
        payload: Value,
    ) -> Result<(), ApiError> {
        self.send(
            self.client
                .patch(self.url(&format!("/wills/{id}/sections/{section}")))
                .json(&payload),
        )
        .await?;
        Ok(())
    }

    async fn mark_section_complete(&self, id: DraftId, section: Section) -> Result<(), ApiError> {
        self.send(
            self.client
                .post(self.url(&format!("/wills/{id}/sections/{section}/complete"))),
        )
        .await?;
        Ok(())
    }

    async fn set_current_section(&self, id: DraftId, section: Section) -> Result<(), ApiError> {
        self.send(
            self.client
                .put(self.url(&format!("/wills/{id}/current-section")))
                .json(&json!({ "section": section })),
        )
        .await?;
        Ok(())
    }

    async fn set_scenarios(
        &self,
        id: DraftId,
        scenarios: BTreeSet<Scenario>,
    ) -> Result<(), ApiError> {
        self.send(
            self.client
                .put(self.url(&format!("/wills/{id}/scenarios")))
                .json(&json!({ "scenarios": scenarios })),
        )
        .await?;
        Ok(())
    }

    async fn acknowledge_warnings(
        &self,
        id: DraftId,
        codes: Vec<String>,
    ) -> Result<AcknowledgeResponse, ApiError> {
        let resp = self
            .send(
                self.client
                    .post(self.url(&format!("/wills/{id}/warnings/acknowledge")))
                    .json(&json!({ "codes": codes })),
            )
            .await?;
        Ok(resp.json().await?)
    }

    async fn request_extraction(&self, id: DraftId, section: Section) -> Result<(), ApiError> {
        self.send(
            self.client
                .post(self.url(&format!("/wills/{id}/sections/{section}/extract"))),
        )
        .await?;
        Ok(())
    }
}

#[async_trait]
impl ScenarioAnalysis for HttpApi {
    async fn detect(&self, id: DraftId) -> Result<BTreeSet<Scenario>, ApiError> {
        let resp = self
            .send(self.client.get(self.url(&format!("/wills/{id}/scenarios"))))
            .await?;
        let list: ScenarioList = resp.json().await?;
        info!(draft = %id, count = list.scenarios.len(), "scenario detection complete");
        Ok(list.scenarios)
    }
}

#[async_trait]
impl ConversationService for HttpApi {
    async fn stream_reply(&self, request: ConversationRequest) -> Result<ByteStream, ApiError> {
        self.stream(
            self.client
                .post(self.url("/conversation/stream"))
                .json(&request),
        )
        .await
    }

    async fn history(&self, id: DraftId, section: Section) -> Result<Vec<Message>, ApiError> {
        let resp = self
            .send(
                self.client
                    .get(self.url(&format!("/wills/{id}/conversation/{section}"))),
            )
            .await?;
        let history: HistoryResponse = resp.json().await?;
        Ok(history.messages)
    }
}

#[async_trait]
impl VerificationService for HttpApi {
    async fn stream_verification(&self, id: DraftId) -> Result<ByteStream, ApiError> {
        self.stream(self.client.post(self.url(&format!("/wills/{id}/verify"))))
            .await
    }
}

#[async_trait]
impl PaymentGateway for HttpApi {
    async fn initiate(&self, id: DraftId) -> Result<PaymentSession, ApiError> {
        let resp = self
            .send(self.client.post(self.url(&format!("/wills/{id}/payments"))))
            .await?;
        Ok(resp.json().await?)
    }

    async fn status(&self, payment_id: &str) -> Result<PaymentStatus, ApiError> {
        let resp = self
            .send(
                self.client
                    .get(self.url(&format!("/payments/{payment_id}/status"))),
            )
            .await?;
        Ok(resp.json().await?)
    }
}

#[async_trait]
impl DocumentRenderer for HttpApi {
    async fn preview(&self, id: DraftId) -> Result<Bytes, ApiError> {
        let resp = self
            .send(self.client.get(self.url(&format!("/wills/{id}/preview"))))
            .await?;
        Ok(resp.bytes().await?)
    }

    async fn download(&self, token: &str) -> Result<Bytes, ApiError> {
        let resp = self
            .send(self.client.get(self.url(&format!("/downloads/{token}"))))
            .await?;
        Ok(resp.bytes().await?)
    }
}
