//! REST implementation of the staffing backend.
//!
//! Speaks the staffing API's legacy wire vocabulary: company and credential
//! payloads use Portuguese field names (`nome`, `id_evento`, `cor`, ...)
//! while participant payloads are camelCase. The serde DTOs below own that
//! mapping so the rest of the workspace only sees the core model.

use crate::config::ApiConfig;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use shift_replicator_core::{
    BackendError, Company, CredentialId, CredentialType, EventId, NewCompany, NewCredential,
    NewParticipant, OperatorSession, Participant, ShiftKey, StaffingBackend,
};
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

/// Logical views refreshed after a run touched an event.
const REFRESHED_VIEWS: [&str; 4] = [
    "participants-by-event",
    "participants-grouped",
    "companies-by-event",
    "credentials-by-event",
];

// ============================================================================
// Errors
// ============================================================================

/// Failures constructing the client (request failures are [`BackendError`]).
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid base URL {url}: {message}")]
    InvalidBaseUrl { url: String, message: String },

    #[error("failed to build HTTP client: {message}")]
    HttpClient { message: String },
}

// ============================================================================
// Client
// ============================================================================

/// `StaffingBackend` over the staffing REST API.
pub struct HttpStaffingBackend {
    http: reqwest::Client,
    base_url: Url,
    session: OperatorSession,
}

impl HttpStaffingBackend {
    /// Build a client from API settings and an operator session.
    pub fn new(config: &ApiConfig, session: OperatorSession) -> Result<Self, ClientError> {
        let base_url = Url::parse(&config.base_url).map_err(|e| ClientError::InvalidBaseUrl {
            url: config.base_url.clone(),
            message: e.to_string(),
        })?;

        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ClientError::HttpClient {
                message: e.to_string(),
            })?;

        Ok(Self {
            http,
            base_url,
            session,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, BackendError> {
        // Base URLs without a trailing slash would otherwise drop their
        // path prefix on join.
        let base = if self.base_url.path().ends_with('/') {
            self.base_url.clone()
        } else {
            Url::parse(&format!("{}/", self.base_url)).map_err(|e| BackendError::Transport {
                message: e.to_string(),
            })?
        };
        base.join(path).map_err(|e| BackendError::Transport {
            message: e.to_string(),
        })
    }

    async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R, BackendError>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let url = self.endpoint(path)?;
        debug!(%url, "POST");

        let response = self
            .http
            .post(url)
            .bearer_auth(self.session.token().expose_secret())
            .json(body)
            .send()
            .await
            .map_err(|e| BackendError::Transport {
                message: e.to_string(),
            })?;

        decode(response).await
    }

    async fn get_json<R>(&self, path: &str) -> Result<R, BackendError>
    where
        R: DeserializeOwned,
    {
        let url = self.endpoint(path)?;
        debug!(%url, "GET");

        let response = self
            .http
            .get(url)
            .bearer_auth(self.session.token().expose_secret())
            .send()
            .await
            .map_err(|e| BackendError::Transport {
                message: e.to_string(),
            })?;

        decode(response).await
    }

    /// Participants of one shift, used to assemble analysis inputs.
    #[instrument(skip(self))]
    pub async fn fetch_participants_by_shift(
        &self,
        event_id: &EventId,
        shift: &ShiftKey,
    ) -> Result<Vec<Participant>, BackendError> {
        self.get_json(&format!(
            "events/{}/shifts/{}/participants",
            event_id, shift
        ))
        .await
    }

    /// Companies already registered for the event.
    #[instrument(skip(self))]
    pub async fn fetch_companies(&self, event_id: &EventId) -> Result<Vec<Company>, BackendError> {
        let rows: Vec<CompanyDto> = self.get_json(&format!("events/{}/companies", event_id)).await?;
        rows.into_iter().map(CompanyDto::into_company).collect()
    }

    /// Credential types already registered for the event.
    #[instrument(skip(self))]
    pub async fn fetch_credentials(
        &self,
        event_id: &EventId,
    ) -> Result<Vec<CredentialType>, BackendError> {
        let rows: Vec<CredentialDto> = self
            .get_json(&format!("events/{}/credentials", event_id))
            .await?;
        rows.into_iter().map(CredentialDto::into_credential).collect()
    }
}

/// Map an HTTP response into the backend error taxonomy.
async fn decode<R: DeserializeOwned>(response: reqwest::Response) -> Result<R, BackendError> {
    let status = response.status();
    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(BackendError::Rejected {
            status: status.as_u16(),
            message,
        });
    }

    response
        .json::<R>()
        .await
        .map_err(|e| BackendError::InvalidResponse {
            message: e.to_string(),
        })
}

#[async_trait]
impl StaffingBackend for HttpStaffingBackend {
    async fn create_company(&self, company: NewCompany) -> Result<Company, BackendError> {
        let body = CreateCompanyBody::from(&company);
        let created: CompanyDto = self.post_json("companies", &body).await?;
        created.into_company()
    }

    async fn create_credential(
        &self,
        credential: NewCredential,
    ) -> Result<CredentialType, BackendError> {
        let body = CreateCredentialBody::from(&credential);
        let created: CredentialDto = self.post_json("credentials", &body).await?;
        created.into_credential()
    }

    async fn create_participant(
        &self,
        participant: NewParticipant,
    ) -> Result<Participant, BackendError> {
        let body = CreateParticipantBody::from(&participant);
        self.post_json("participants", &body).await
    }

    async fn invalidate_caches(&self, event_id: &EventId) -> Result<(), BackendError> {
        let url = self.endpoint(&format!("events/{}/refresh", event_id))?;
        let response = self
            .http
            .post(url)
            .bearer_auth(self.session.token().expose_secret())
            .json(&RefreshBody {
                views: REFRESHED_VIEWS.to_vec(),
            })
            .send()
            .await
            .map_err(|e| BackendError::Transport {
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Rejected {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }
        Ok(())
    }
}

// ============================================================================
// Wire Types
// ============================================================================

#[derive(Debug, Serialize)]
struct RefreshBody {
    views: Vec<&'static str>,
}

/// Company creation payload, legacy field names.
#[derive(Debug, Serialize)]
struct CreateCompanyBody {
    nome: String,
    id_evento: String,
    #[serde(rename = "shiftId")]
    shift_id: String,
    #[serde(rename = "workDate")]
    work_date: String,
    #[serde(rename = "workStage")]
    work_stage: String,
    #[serde(rename = "workPeriod")]
    work_period: String,
}

impl From<&NewCompany> for CreateCompanyBody {
    fn from(company: &NewCompany) -> Self {
        Self {
            nome: company.name.clone(),
            id_evento: company.event_id.to_string(),
            shift_id: company.shift.as_str().to_string(),
            work_date: company.shift.date_iso().to_string(),
            work_stage: company.shift.stage().to_string(),
            work_period: company.shift.period().to_string(),
        }
    }
}

/// Credential creation payload. Note the API's inconsistent `id_events`.
#[derive(Debug, Serialize)]
struct CreateCredentialBody {
    nome: String,
    id_events: String,
    cor: String,
    days_works: Vec<String>,
    #[serde(rename = "shiftId")]
    shift_id: String,
    #[serde(rename = "workDate")]
    work_date: String,
    #[serde(rename = "workStage")]
    work_stage: String,
    #[serde(rename = "workPeriod")]
    work_period: String,
}

impl From<&NewCredential> for CreateCredentialBody {
    fn from(credential: &NewCredential) -> Self {
        Self {
            nome: credential.name.clone(),
            id_events: credential.event_id.to_string(),
            cor: credential.color.clone(),
            days_works: credential.days_works.clone(),
            shift_id: credential.shift.as_str().to_string(),
            work_date: credential.shift.date_iso().to_string(),
            work_stage: credential.shift.stage().to_string(),
            work_period: credential.shift.period().to_string(),
        }
    }
}

/// Participant creation payload, camelCase.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateParticipantBody {
    event_id: String,
    name: String,
    cpf: String,
    rg: String,
    company: String,
    role: String,
    days_work: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    credential_id: Option<String>,
    validated_by: String,
    shift_id: String,
    work_date: String,
    work_stage: String,
    work_period: String,
}

impl From<&NewParticipant> for CreateParticipantBody {
    fn from(participant: &NewParticipant) -> Self {
        Self {
            event_id: participant.event_id.to_string(),
            name: participant.name.clone(),
            cpf: participant.cpf.clone(),
            rg: participant.rg.clone(),
            company: participant.company.clone(),
            role: participant.role.clone(),
            days_work: participant.days_work.clone(),
            credential_id: participant.credential_id.as_ref().map(|c| c.to_string()),
            validated_by: participant.validated_by.clone(),
            shift_id: participant.shift.as_str().to_string(),
            work_date: participant.shift.date_iso().to_string(),
            work_stage: participant.shift.stage().to_string(),
            work_period: participant.shift.period().to_string(),
        }
    }
}

/// Company row as the API returns it.
#[derive(Debug, Deserialize)]
struct CompanyDto {
    id: String,
    nome: String,
    id_evento: String,
}

impl CompanyDto {
    fn into_company(self) -> Result<Company, BackendError> {
        Ok(Company {
            id: self.id,
            event_id: EventId::new(self.id_evento).map_err(|e| BackendError::InvalidResponse {
                message: e.to_string(),
            })?,
            name: self.nome,
        })
    }
}

/// Credential row as the API returns it.
#[derive(Debug, Deserialize)]
struct CredentialDto {
    id: String,
    nome: String,
    id_events: String,
    #[serde(default)]
    cor: String,
    #[serde(default)]
    days_works: Vec<String>,
}

impl CredentialDto {
    fn into_credential(self) -> Result<CredentialType, BackendError> {
        Ok(CredentialType {
            id: CredentialId::new(self.id),
            event_id: EventId::new(self.id_events).map_err(|e| BackendError::InvalidResponse {
                message: e.to_string(),
            })?,
            name: self.nome,
            color: self.cor,
            days_works: self.days_works,
        })
    }
}

#[cfg(test)]
#[path = "rest_tests.rs"]
mod tests;
