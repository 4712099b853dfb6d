//! A blocking [`Fetcher`] backed by hyper and rustls.

use std::{
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use futures::TryFutureExt;
use hyper::{
    body::{self, Bytes},
    client::HttpConnector,
    header, Body, Client, Method, Request,
};
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use serde::Deserialize;
use tokio::runtime::{self, Runtime};
use tracing::{debug, warn};

use crate::{
    config::{ClientConfig, TOKEN_URL},
    fetch::{encode_url, Fetcher, TransportError},
};

const ACCEPT: &str = "application/json; charset=utf-8";

/// How requests are authenticated.
#[derive(Debug, Clone)]
pub enum Credentials {
    /// A pre-issued bearer token.
    Bearer(String),
    /// OAuth client credentials exchanged for a bearer token on first use.
    ClientCredentials {
        client_id: String,
        client_secret: String,
        token_url: String,
    },
}

impl Credentials {
    /// Client credentials against the registrar's own token endpoint.
    pub fn client_credentials(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Credentials::ClientCredentials {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            token_url: TOKEN_URL.to_owned(),
        }
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Sends requests with hyper, blocking the calling thread until the response body arrives.
///
/// The fetcher owns a small runtime to drive hyper, so it must not be used from within an
/// async context.
pub struct HyperFetcher {
    runtime: Runtime,
    client: Client<HttpsConnector<HttpConnector>, Body>,
    credentials: Credentials,
    user_agent: String,
    timeout: Duration,
    // Tokens are obtained once and reused; there is no refresh.
    token: Mutex<Option<Arc<str>>>,
}

impl HyperFetcher {
    pub fn new(credentials: Credentials, config: &ClientConfig) -> Result<Self, TransportError> {
        let runtime = runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .map_err(|err| TransportError::Connection(err.to_string()))?;
        let client = Client::builder().build(
            HttpsConnectorBuilder::new()
                .with_native_roots()
                .https_or_http()
                .enable_http1()
                .build(),
        );

        Ok(Self {
            runtime,
            client,
            credentials,
            user_agent: config.user_agent.clone(),
            timeout: config.timeout,
            token: Mutex::new(None),
        })
    }

    fn access_token(&self) -> Result<Arc<str>, TransportError> {
        let (client_id, client_secret, token_url) = match &self.credentials {
            Credentials::Bearer(token) => return Ok(Arc::from(token.as_str())),
            Credentials::ClientCredentials {
                client_id,
                client_secret,
                token_url,
            } => (client_id, client_secret, token_url),
        };

        let mut token = self.token.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(token) = token.as_ref() {
            return Ok(token.clone());
        }

        debug!(%token_url, "requesting access token");
        let basic = STANDARD.encode(format!("{client_id}:{client_secret}"));
        let form = form_urlencoded::Serializer::new(String::new())
            .append_pair("grant_type", "client_credentials")
            .finish();
        let request = Request::builder()
            .method(Method::POST)
            .uri(token_url.as_str())
            .header(header::AUTHORIZATION, format!("Basic {basic}"))
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header(header::ACCEPT, ACCEPT)
            .header(header::USER_AGENT, &self.user_agent)
            .body(Body::from(form))?;

        let (status, bytes) = self.runtime.block_on(self.send(request))?;
        if !status.is_success() {
            warn!(%status, "token request rejected");
            return Err(TransportError::TokenRequestFailed(status.to_string()));
        }
        let response: TokenResponse = serde_json::from_slice(&bytes)
            .map_err(|err| TransportError::TokenRequestFailed(err.to_string()))?;

        Ok(token.insert(Arc::from(response.access_token)).clone())
    }

    async fn send(
        &self,
        request: Request<Body>,
    ) -> Result<(hyper::StatusCode, Bytes), TransportError> {
        let response = tokio::time::timeout(self.timeout, self.client.request(request))
            .await
            .map_err(|_| TransportError::Timeout)??;
        let status = response.status();
        let bytes = body::to_bytes(response.into_body())
            .err_into::<TransportError>()
            .await?;
        Ok((status, bytes))
    }
}

impl Fetcher for HyperFetcher {
    fn fetch(&self, url: &str, query: &[(String, String)]) -> Result<Bytes, TransportError> {
        let token = self.access_token()?;
        let uri = encode_url(url, query);
        debug!(%uri, "fetching");

        let request = Request::builder()
            .method(Method::GET)
            .uri(uri)
            .header(header::ACCEPT, ACCEPT)
            .header(header::USER_AGENT, &self.user_agent)
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())?;

        let (status, bytes) = self.runtime.block_on(self.send(request))?;
        // Error envelopes come back with 4xx statuses; let the caller read them.
        let is_json = serde_json::from_slice::<serde::de::IgnoredAny>(&bytes).is_ok();
        if !status.is_success() && !is_json {
            warn!(%status, "request failed");
            return Err(TransportError::UnexpectedStatus(status));
        }

        Ok(bytes)
    }
}
