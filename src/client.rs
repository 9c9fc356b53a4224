//! Generic DevCollab API client: verb helpers layered on the retrying
//! executor and the response normalizer.

use std::sync::Arc;

use reqwest::multipart::Form;
use reqwest::{Method, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::config::ApiConfig;
use crate::error::Error;
use crate::http;
use crate::response;
use crate::store::{CredentialStore, Token};

/// Whether a request carries the stored bearer credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    /// Attach `Authorization: Bearer <token>` when the store holds a
    /// credential; proceed without the header when it does not.
    Bearer,
    /// Send the request without credentials.
    Anonymous,
}

/// HTTP client for the DevCollab API.
///
/// Owns the connection pool, the configuration, and a handle to the
/// credential store. Cloning is cheap — all request state lives behind
/// shared handles.
#[derive(Clone)]
pub struct ApiClient {
    config: ApiConfig,
    http: reqwest::Client,
    store: Arc<dyn CredentialStore>,
}

impl ApiClient {
    /// Create a new API client.
    #[must_use]
    pub fn new(config: ApiConfig, store: Arc<dyn CredentialStore>) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
            store,
        }
    }

    /// Use a custom HTTP client (for connection pool reuse or testing).
    #[must_use]
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http = client;
        self
    }

    /// The stored credential, if any.
    #[must_use]
    pub fn credential(&self) -> Option<Token> {
        self.store.get()
    }

    pub(crate) fn store(&self) -> Arc<dyn CredentialStore> {
        Arc::clone(&self.store)
    }

    /// GET `path`, decoding the JSON reply into `T`.
    ///
    /// # Errors
    ///
    /// Returns the normalized [`Error`] for any transport or server failure.
    pub async fn get<T: DeserializeOwned>(&self, path: &str, auth: AuthMode) -> Result<T, Error> {
        self.send(Method::GET, path, None::<&()>, auth).await
    }

    /// POST a JSON `body` to `path`, decoding the JSON reply into `T`.
    ///
    /// # Errors
    ///
    /// Returns the normalized [`Error`] for any transport or server failure.
    pub async fn post<T, B>(&self, path: &str, body: &B, auth: AuthMode) -> Result<T, Error>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send(Method::POST, path, Some(body), auth).await
    }

    /// PUT a JSON `body` to `path`, decoding the JSON reply into `T`.
    ///
    /// # Errors
    ///
    /// Returns the normalized [`Error`] for any transport or server failure.
    pub async fn put<T, B>(&self, path: &str, body: &B, auth: AuthMode) -> Result<T, Error>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send(Method::PUT, path, Some(body), auth).await
    }

    /// PATCH a JSON `body` to `path`, decoding the JSON reply into `T`.
    ///
    /// # Errors
    ///
    /// Returns the normalized [`Error`] for any transport or server failure.
    pub async fn patch<T, B>(&self, path: &str, body: &B, auth: AuthMode) -> Result<T, Error>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send(Method::PATCH, path, Some(body), auth).await
    }

    /// DELETE `path`, decoding the JSON reply into `T`.
    ///
    /// # Errors
    ///
    /// Returns the normalized [`Error`] for any transport or server failure.
    pub async fn delete<T: DeserializeOwned>(
        &self,
        path: &str,
        auth: AuthMode,
    ) -> Result<T, Error> {
        self.send(Method::DELETE, path, None::<&()>, auth).await
    }

    /// POST a multipart form to `path`, decoding the JSON reply into `T`.
    ///
    /// `form` is called once per attempt: multipart bodies are consumed on
    /// send, so retries need a freshly built form.
    ///
    /// # Errors
    ///
    /// Returns the normalized [`Error`] for any transport or server failure,
    /// or whatever error `form` produced.
    pub async fn upload<T, F>(&self, path: &str, form: F, auth: AuthMode) -> Result<T, Error>
    where
        T: DeserializeOwned,
        F: Fn() -> Result<Form, Error>,
    {
        let url = self.config.endpoint(path);
        let response = http::execute(self.config.retry(), || {
            let request = self.http.post(url.as_str()).multipart(form()?);
            Ok(self.authorize(request, auth))
        })
        .await?;
        response::normalize(response).await
    }

    async fn send<T, B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        auth: AuthMode,
    ) -> Result<T, Error>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = self.config.endpoint(path);
        let response = http::execute(self.config.retry(), || {
            let mut request = self.http.request(method.clone(), url.as_str());
            if let Some(body) = body {
                request = request.json(body);
            }
            Ok(self.authorize(request, auth))
        })
        .await?;
        response::normalize(response).await
    }

    fn authorize(&self, request: RequestBuilder, auth: AuthMode) -> RequestBuilder {
        match auth {
            AuthMode::Bearer => match self.store.get() {
                Some(token) => request.bearer_auth(token.as_str()),
                None => request,
            },
            AuthMode::Anonymous => request,
        }
    }
}
