//! Typed authentication operations over the generic [`ApiClient`].
//!
//! Each operation is a fixed mapping of a domain verb to an HTTP method,
//! path, and payload encoding. Wire names follow the backend contract
//! (camelCase fields, `_id` for the user identifier).

use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};

use crate::client::{ApiClient, AuthMode};
use crate::error::Error;
use crate::store::Token;

/// DevCollab user profile as returned by the backend.
///
/// Never mutated locally — replaced wholesale after a successful fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    /// Avatar reference, when one was uploaded at registration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub is_verified: bool,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "time::serde::rfc3339::option"
    )]
    pub created_at: Option<time::OffsetDateTime>,
}

/// Reply to `register` and `verify_email`: the profile plus a fresh credential.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub user: User,
    pub token: Token,
    #[serde(default)]
    pub message: Option<String>,
}

/// Reply to acknowledgement-style operations (`resend_verification`).
#[derive(Debug, Clone, Deserialize)]
pub struct Ack {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

/// Reply to the health probe.
#[derive(Debug, Clone, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub message: String,
}

/// Avatar file attached to a registration.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    /// MIME type; the server sniffs when absent.
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

/// Registration payload, sent as a multipart form.
#[derive(Debug, Clone)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub image: Option<ImageUpload>,
}

impl RegisterRequest {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            password: password.into(),
            image: None,
        }
    }

    /// Attach an avatar image to the registration.
    #[must_use]
    pub fn with_image(mut self, image: ImageUpload) -> Self {
        self.image = Some(image);
        self
    }

    fn form(&self) -> Result<Form, Error> {
        let mut form = Form::new()
            .text("name", self.name.clone())
            .text("email", self.email.clone())
            .text("password", self.password.clone());
        if let Some(image) = &self.image {
            let mut part = Part::bytes(image.data.clone()).file_name(image.file_name.clone());
            if let Some(mime) = &image.content_type {
                part = part
                    .mime_str(mime)
                    .map_err(|e| Error::Config(format!("image content type: {e}")))?;
            }
            form = form.part("image", part);
        }
        Ok(form)
    }
}

/// Outcome of a login attempt against a valid email/password pair.
///
/// `VerificationRequired` is a recognized alternate outcome, not an error:
/// the account exists and the password matched, but the email has not been
/// confirmed yet. Callers branch on it explicitly.
#[derive(Debug, Clone)]
pub enum LoginReply {
    /// Credentials accepted; a session credential was issued.
    Session { user: User, token: Token },
    /// The account still needs email verification before a session exists.
    VerificationRequired,
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct EmailRequest<'a> {
    email: &'a str,
}

#[derive(Debug, Serialize)]
struct VerifyEmailRequest<'a> {
    token: &'a str,
}

/// Wire shape of the login reply. `user`/`token` are optional because the
/// backend omits them when it answers with `requiresVerification` instead.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginWire {
    #[serde(default)]
    user: Option<User>,
    #[serde(default)]
    token: Option<Token>,
    #[serde(default)]
    requires_verification: bool,
}

/// Typed surface of the `/auth` endpoints plus the `/health` probe.
#[derive(Clone)]
pub struct AuthApi {
    client: ApiClient,
}

impl AuthApi {
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub(crate) fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Register a new account. POST `/auth/register`, multipart.
    ///
    /// Success does not create a session — the email must be verified first.
    ///
    /// # Errors
    ///
    /// Returns the normalized [`Error`] for any transport or server failure.
    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, Error> {
        self.client
            .upload("/auth/register", || request.form(), AuthMode::Anonymous)
            .await
    }

    /// Log in with email and password. POST `/auth/login`, JSON.
    ///
    /// A success payload flagged `requiresVerification` yields
    /// [`LoginReply::VerificationRequired`]; a payload with neither that flag
    /// nor a session is a backend contract violation.
    ///
    /// # Errors
    ///
    /// Returns the normalized [`Error`] for any transport or server failure,
    /// or [`Error::InvalidResponseFormat`] for a malformed success payload.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginReply, Error> {
        let wire: LoginWire = self
            .client
            .post(
                "/auth/login",
                &LoginRequest { email, password },
                AuthMode::Anonymous,
            )
            .await?;
        if wire.requires_verification {
            return Ok(LoginReply::VerificationRequired);
        }
        match (wire.user, wire.token) {
            (Some(user), Some(token)) => Ok(LoginReply::Session { user, token }),
            _ => Err(Error::InvalidResponseFormat),
        }
    }

    /// Fetch the profile behind the stored credential. GET `/auth/me`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoToken`] without touching the network when the
    /// store holds no credential, or the normalized [`Error`] otherwise.
    pub async fn current_user(&self) -> Result<User, Error> {
        if self.client.credential().is_none() {
            return Err(Error::NoToken);
        }
        self.client.get("/auth/me", AuthMode::Bearer).await
    }

    /// Request a fresh verification email. POST `/auth/resend-verification`.
    ///
    /// # Errors
    ///
    /// Returns the normalized [`Error`] for any transport or server failure.
    pub async fn resend_verification(&self, email: &str) -> Result<Ack, Error> {
        self.client
            .post(
                "/auth/resend-verification",
                &EmailRequest { email },
                AuthMode::Anonymous,
            )
            .await
    }

    /// Redeem an email-verification token. POST `/auth/verify-email`.
    ///
    /// Success issues a session credential, same as a login.
    ///
    /// # Errors
    ///
    /// Returns the normalized [`Error`] for any transport or server failure.
    pub async fn verify_email(&self, token: &str) -> Result<AuthResponse, Error> {
        self.client
            .post(
                "/auth/verify-email",
                &VerifyEmailRequest { token },
                AuthMode::Anonymous,
            )
            .await
    }

    /// Probe backend liveness. GET `/health`.
    ///
    /// Used opportunistically to warm a possibly cold-started backend; the
    /// session manager swallows failures, direct callers may not want to.
    ///
    /// # Errors
    ///
    /// Returns the normalized [`Error`] for any transport or server failure.
    pub async fn health(&self) -> Result<HealthStatus, Error> {
        self.client.get("/health", AuthMode::Anonymous).await
    }
}
