//! Connection management for the remote services
//!
//! A [`ConnectionInfo`] is bound to one base URL (management API, developer
//! hub or Launch) and turns every non-success response into an [`ApiError`].

use eyre::{bail, eyre, Result};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;
use url::Url;

use crate::errors::ApiError;

const AUTHTOKEN_HEADER: &str = "authtoken";
const ORGANIZATION_HEADER: &str = "organization_uid";

#[derive(Debug, Clone, Copy)]
enum RequestType {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

#[derive(Clone, Debug)]
pub struct ConnectionInfo {
    pub api_url: Url,
    pub client: Client,
    auth_token: Option<String>,
}

impl ConnectionInfo {
    #[must_use]
    pub fn new(api_url: Url, auth_token: Option<String>) -> Self {
        Self {
            api_url,
            client: Client::new(),
            auth_token,
        }
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        organization_uid: Option<&str>,
    ) -> Result<T> {
        self.request(RequestType::Get, path, query, organization_uid, None::<()>)
            .await
    }

    pub async fn post<I, O>(&self, path: &str, organization_uid: Option<&str>, body: I) -> Result<O>
    where
        I: Serialize,
        O: DeserializeOwned,
    {
        self.request(RequestType::Post, path, &[], organization_uid, Some(body))
            .await
    }

    pub async fn put<I, O>(&self, path: &str, organization_uid: Option<&str>, body: I) -> Result<O>
    where
        I: Serialize,
        O: DeserializeOwned,
    {
        self.request(RequestType::Put, path, &[], organization_uid, Some(body))
            .await
    }

    pub async fn patch<I, O>(
        &self,
        path: &str,
        organization_uid: Option<&str>,
        body: I,
    ) -> Result<O>
    where
        I: Serialize,
        O: DeserializeOwned,
    {
        self.request(RequestType::Patch, path, &[], organization_uid, Some(body))
            .await
    }

    pub async fn delete<T: DeserializeOwned>(
        &self,
        path: &str,
        organization_uid: Option<&str>,
    ) -> Result<T> {
        self.request(RequestType::Delete, path, &[], organization_uid, None::<()>)
            .await
    }

    async fn request<I, O>(
        &self,
        req_type: RequestType,
        path: &str,
        query: &[(&str, String)],
        organization_uid: Option<&str>,
        body: Option<I>,
    ) -> Result<O>
    where
        I: Serialize,
        O: DeserializeOwned,
    {
        let mut url = self.api_url.clone();
        url.set_path(path);

        debug!(?req_type, %url, "sending request");

        let mut builder = match req_type {
            RequestType::Get => self.client.get(url),
            RequestType::Post => self.client.post(url),
            RequestType::Put => self.client.put(url),
            RequestType::Patch => self.client.patch(url),
            RequestType::Delete => self.client.delete(url),
        };

        if !query.is_empty() {
            builder = builder.query(query);
        }

        if let Some(body) = &body {
            builder = builder.json(body);
        }

        let response = self
            .with_headers(builder, organization_uid)
            .send()
            .await?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| eyre!("Failed to get response text: {e}"))?;

        if !status.is_success() {
            bail!(ApiError::from_body(status.as_u16(), &text));
        }

        // Deletes answer with an empty body.
        let text = if text.trim().is_empty() { "null" } else { &text };

        serde_json::from_str(text).map_err(Into::into)
    }

    fn with_headers(
        &self,
        mut builder: RequestBuilder,
        organization_uid: Option<&str>,
    ) -> RequestBuilder {
        if let Some(token) = &self.auth_token {
            builder = builder.header(AUTHTOKEN_HEADER, token);
        }

        if let Some(organization_uid) = organization_uid {
            builder = builder.header(ORGANIZATION_HEADER, organization_uid);
        }

        builder
    }
}
