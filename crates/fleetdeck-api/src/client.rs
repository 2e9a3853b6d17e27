// Inventory backend HTTP client
//
// Wraps `reqwest::Client` with backend-specific URL construction and
// response decoding. The power endpoint's 401 challenge is decoded into a
// typed outcome here so no caller ever has to compare status codes.

use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::models::{AddMachineRequest, ErrorBody, MachineRecord, PowerRequest, PowerSuccess};
use crate::transport::TransportConfig;

/// Result of a power request against `POST /api/power`.
///
/// A `401` response is a protocol signal, not a failure: the operation
/// needs a credential and should be replayed with one. Every other non-2xx
/// status is reported through [`Error`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PowerOutcome {
    /// The backend executed the operation; `message` is its human-readable
    /// confirmation (e.g. "Magic Packet sent").
    Completed { message: String },
    /// The backend requires a password for this operation. Replay the same
    /// request with a credential.
    AuthRequired,
}

/// Raw HTTP client for the inventory backend.
///
/// All methods are stateless request-response calls; the client holds no
/// session. `base_url` is the backend root (e.g. `http://homeserver:5000`).
pub struct InventoryClient {
    http: reqwest::Client,
    base_url: Url,
}

impl InventoryClient {
    /// Create a new client from a [`TransportConfig`].
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self { http, base_url })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// The backend base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build a full URL for an API path: `{base}/api/{path}`.
    pub(crate) fn api_url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}/api/{path}"))?)
    }

    /// The browser/download target for a remote-desktop session on `host`.
    ///
    /// Never fetched by this client — session establishment is entirely the
    /// backend's job. Handed to the operator as a navigation target.
    pub fn rdp_url(&self, host: &str) -> Result<Url, Error> {
        self.api_url(&format!("rdp/{host}"))
    }

    // ── Inventory ────────────────────────────────────────────────────

    /// Fetch the full machine list: `GET /api/vms`.
    pub async fn list_machines(&self) -> Result<Vec<MachineRecord>, Error> {
        let url = self.api_url("vms")?;
        debug!("GET {}", url);

        let resp = self.http.get(url).send().await.map_err(Error::Transport)?;
        parse_json(resp).await
    }

    /// Register a new machine: `POST /api/vms`.
    ///
    /// The request body is the add-form field map, serialized verbatim.
    pub async fn add_machine(&self, request: &AddMachineRequest) -> Result<(), Error> {
        let url = self.api_url("vms")?;
        debug!("POST {}", url);

        let resp = self
            .http
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(Error::Transport)?;
        expect_success(resp).await
    }

    /// Remove a machine from the inventory: `DELETE /api/vms/{mac}`.
    pub async fn delete_machine(&self, mac: &str) -> Result<(), Error> {
        let url = self.api_url(&format!("vms/{mac}"))?;
        debug!("DELETE {}", url);

        let resp = self
            .http
            .delete(url)
            .send()
            .await
            .map_err(Error::Transport)?;
        expect_success(resp).await
    }

    // ── Power ────────────────────────────────────────────────────────

    /// Issue a power operation: `POST /api/power`.
    ///
    /// `action` is the backend's operation token (`"off"`, `"reboot"`,
    /// `"wol"`). Pass `None` for the optimistic unauthenticated attempt;
    /// on [`PowerOutcome::AuthRequired`], replay with the operator's
    /// credential. The secret is exposed only at this serialization
    /// boundary and never logged.
    pub async fn power(
        &self,
        mac: &str,
        action: &str,
        password: Option<&SecretString>,
    ) -> Result<PowerOutcome, Error> {
        let url = self.api_url("power")?;
        debug!(%mac, %action, authenticated = password.is_some(), "POST {}", url);

        let body = PowerRequest {
            mac,
            action,
            password: password.map(ExposeSecret::expose_secret),
        };

        let resp = self
            .http
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(Error::Transport)?;

        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Ok(PowerOutcome::AuthRequired);
        }
        if !status.is_success() {
            return Err(error_from_response(resp).await);
        }

        let success: PowerSuccess = parse_body(resp).await?;
        Ok(PowerOutcome::Completed {
            message: success.message,
        })
    }
}

// ── Response decoding helpers ────────────────────────────────────────

/// Decode a 2xx JSON body, or map a non-2xx response to an error.
async fn parse_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
    if !resp.status().is_success() {
        return Err(error_from_response(resp).await);
    }
    parse_body(resp).await
}

/// Check for a 2xx status, discarding any body.
async fn expect_success(resp: reqwest::Response) -> Result<(), Error> {
    if resp.status().is_success() {
        Ok(())
    } else {
        Err(error_from_response(resp).await)
    }
}

async fn parse_body<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
    let body = resp.text().await.map_err(Error::Transport)?;
    serde_json::from_str(&body).map_err(|e| {
        let preview = &body[..body.len().min(200)];
        Error::Deserialization {
            message: format!("{e} (body preview: {preview:?})"),
            body: body.clone(),
        }
    })
}

/// Map a non-2xx response to [`Error::Rejected`] when the body carries the
/// backend's `{"error": ...}` shape, [`Error::Api`] otherwise.
async fn error_from_response(resp: reqwest::Response) -> Error {
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_default();

    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(&body) {
        return Error::Rejected {
            status,
            message: parsed.error,
        };
    }

    Error::Api {
        status,
        message: body[..body.len().min(200)].to_owned(),
    }
}
