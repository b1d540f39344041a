//! Crate for interacting with the GitLab REST API (v4).
//!
//! This crate provides [`GitLabClient`], a thin `reqwest` based client authenticated with a
//! personal or project access token, and the [`GitLabApi`] trait that the reconciliation
//! engine is written against. Only the endpoints needed to reconcile merge request
//! approvals, protected branches and the Slack integration are covered.

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{Method, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error, info, instrument};
use url::Url;

pub mod errors;
pub use errors::Error;

pub mod approvals;
pub use approvals::{
    ApprovalConfiguration, ApprovalConfigurationUpdate, ApproverGroup, ApproverUser,
    ApproversUpdate, BasicGroup, BasicUser,
};

pub mod models;
pub use models::{Group, Namespace, Page, Project};

pub mod protected_branch;
pub use protected_branch::{
    AccessLevel, BranchAccessDescription, ProtectBranchOptions, ProtectedBranch,
};

pub mod slack;
pub use slack::{SlackEvent, SlackService, SlackServiceProperties, SlackServiceUpdate};

// Reference the tests module in the separate file
#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;

/// Header carrying the access token.
const TOKEN_HEADER: &str = "PRIVATE-TOKEN";

/// Page size used when listing protected branches.
const PROTECTED_BRANCHES_PER_PAGE: u32 = 100;

/// Operations against the GitLab API used by the reconciliation engine.
///
/// Listing endpoints are exposed page by page so that callers own the pagination policy.
#[async_trait]
pub trait GitLabApi: Send + Sync {
    /// Lists one page of the groups visible to the token, ordered by name.
    async fn list_groups_page(&self, page: u32, per_page: u32) -> Result<Page<Group>, Error>;

    /// Lists one page of the projects in a group, including those in subgroups.
    async fn list_group_projects_page(
        &self,
        group_id: u64,
        page: u32,
        per_page: u32,
    ) -> Result<Page<Project>, Error>;

    /// Gets the merge request approval configuration of a project.
    async fn get_approval_configuration(
        &self,
        project_id: u64,
    ) -> Result<ApprovalConfiguration, Error>;

    /// Replaces the scalar merge request approval settings of a project.
    async fn change_approval_configuration(
        &self,
        project_id: u64,
        update: &ApprovalConfigurationUpdate,
    ) -> Result<ApprovalConfiguration, Error>;

    /// Replaces the allowed approvers and approver groups of a project.
    async fn change_allowed_approvers(
        &self,
        project_id: u64,
        update: &ApproversUpdate,
    ) -> Result<ApprovalConfiguration, Error>;

    /// Lists every protected branch of a project.
    async fn list_protected_branches(&self, project_id: u64)
        -> Result<Vec<ProtectedBranch>, Error>;

    /// Removes protection from a branch.
    ///
    /// Returns `Error::NotFound` if the branch was not protected.
    async fn unprotect_branch(&self, project_id: u64, branch: &str) -> Result<(), Error>;

    /// Protects a branch with the given access levels.
    async fn protect_branch(
        &self,
        project_id: u64,
        options: &ProtectBranchOptions,
    ) -> Result<ProtectedBranch, Error>;

    /// Gets the Slack integration of a project.
    async fn get_slack_service(&self, project_id: u64) -> Result<SlackService, Error>;

    /// Replaces the Slack integration settings of a project.
    async fn set_slack_service(
        &self,
        project_id: u64,
        update: &SlackServiceUpdate,
    ) -> Result<(), Error>;
}

/// A client for the GitLab REST API authenticated with an access token.
#[derive(Debug, Clone)]
pub struct GitLabClient {
    http: reqwest::Client,
    base_url: Url,
    token: SecretString,
}

impl GitLabClient {
    /// Creates a new `GitLabClient`.
    ///
    /// `base_url` may point at the GitLab host (`https://gitlab.example.com`) or directly at
    /// the API root; `/api/v4` is appended when missing.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidUrl` if the URL cannot be parsed or cannot carry a path, and
    /// `Error::Transport` if the HTTP client cannot be built.
    ///
    /// # Example
    ///
    /// ```rust
    /// use gitlab_client::GitLabClient;
    /// use secrecy::SecretString;
    ///
    /// let client = GitLabClient::new(
    ///     "https://gitlab.example.com",
    ///     SecretString::from("glpat-xxxxxxxx".to_string()),
    /// ).unwrap();
    ///
    /// assert_eq!(client.base_url().as_str(), "https://gitlab.example.com/api/v4");
    /// ```
    pub fn new(base_url: &str, token: SecretString) -> Result<Self, Error> {
        let base_url = normalize_base_url(base_url)?;
        let http = reqwest::Client::builder()
            .user_agent(concat!("repo-settings/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Transport(e.to_string()))?;

        info!(base_url = %base_url, "Created GitLab client");

        Ok(Self {
            http,
            base_url,
            token,
        })
    }

    /// The API root all requests are made against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::InvalidUrl {
                url: self.base_url.to_string(),
                reason: "URL cannot be a base".to_string(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.http
            .request(method, url)
            .header(TOKEN_HEADER, self.token.expose_secret())
    }

    /// Sends a request and returns the raw body and headers of a successful response.
    async fn send(&self, builder: RequestBuilder) -> Result<(String, HeaderMap), Error> {
        let response = builder.send().await.map_err(|e| {
            error!(error = %e, "Request to GitLab failed before a response was received");
            Error::from(e)
        })?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text().await?;

        if status.is_success() {
            return Ok((body, headers));
        }

        Err(status_error(status, &body))
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<(T, HeaderMap), Error> {
        let (body, headers) = self.send(builder).await?;
        let value = serde_json::from_str(&body).map_err(|e| {
            error!(error = %e, "Failed to deserialize GitLab response");
            Error::Deserialization(e)
        })?;
        Ok((value, headers))
    }

    async fn get_page<T: DeserializeOwned, Q: Serialize + ?Sized>(
        &self,
        segments: &[&str],
        query: &Q,
        page: u32,
        per_page: u32,
    ) -> Result<Page<T>, Error> {
        let url = self.endpoint(segments)?;
        let builder = self
            .request(Method::GET, url)
            .query(query)
            .query(&[("page", page), ("per_page", per_page)]);

        let (items, headers): (Vec<T>, HeaderMap) = self.send_json(builder).await?;
        let page = page_from_headers(items, &headers, page);

        debug!(
            current_page = page.current_page,
            total_pages = ?page.total_pages,
            next_page = ?page.next_page,
            "Received page"
        );

        Ok(page)
    }
}

#[async_trait]
impl GitLabApi for GitLabClient {
    #[instrument(skip(self))]
    async fn list_groups_page(&self, page: u32, per_page: u32) -> Result<Page<Group>, Error> {
        self.get_page(
            &["groups"],
            &[("order_by", "name"), ("sort", "asc")],
            page,
            per_page,
        )
        .await
    }

    #[instrument(skip(self))]
    async fn list_group_projects_page(
        &self,
        group_id: u64,
        page: u32,
        per_page: u32,
    ) -> Result<Page<Project>, Error> {
        let id = group_id.to_string();
        self.get_page(
            &["groups", &id, "projects"],
            &[
                ("include_subgroups", "true"),
                ("order_by", "name"),
                ("sort", "asc"),
            ],
            page,
            per_page,
        )
        .await
    }

    #[instrument(skip(self))]
    async fn get_approval_configuration(
        &self,
        project_id: u64,
    ) -> Result<ApprovalConfiguration, Error> {
        let id = project_id.to_string();
        let url = self.endpoint(&["projects", &id, "approvals"])?;
        let (config, _) = self.send_json(self.request(Method::GET, url)).await?;
        Ok(config)
    }

    #[instrument(skip(self, update))]
    async fn change_approval_configuration(
        &self,
        project_id: u64,
        update: &ApprovalConfigurationUpdate,
    ) -> Result<ApprovalConfiguration, Error> {
        let id = project_id.to_string();
        let url = self.endpoint(&["projects", &id, "approvals"])?;
        let (config, _) = self
            .send_json(self.request(Method::POST, url).json(update))
            .await?;
        Ok(config)
    }

    #[instrument(skip(self, update))]
    async fn change_allowed_approvers(
        &self,
        project_id: u64,
        update: &ApproversUpdate,
    ) -> Result<ApprovalConfiguration, Error> {
        let id = project_id.to_string();
        let url = self.endpoint(&["projects", &id, "approvers"])?;
        let (config, _) = self
            .send_json(self.request(Method::PUT, url).json(update))
            .await?;
        Ok(config)
    }

    #[instrument(skip(self))]
    async fn list_protected_branches(
        &self,
        project_id: u64,
    ) -> Result<Vec<ProtectedBranch>, Error> {
        let id = project_id.to_string();
        let mut branches = Vec::new();
        let mut page_number = 1;

        loop {
            let page: Page<ProtectedBranch> = self
                .get_page(
                    &["projects", &id, "protected_branches"],
                    &[] as &[(&str, &str)],
                    page_number,
                    PROTECTED_BRANCHES_PER_PAGE,
                )
                .await?;

            let has_next = page.has_next();
            let next = page.next_page.unwrap_or(page.current_page + 1);
            branches.extend(page.items);

            if !has_next {
                break;
            }
            page_number = next;
        }

        Ok(branches)
    }

    #[instrument(skip(self))]
    async fn unprotect_branch(&self, project_id: u64, branch: &str) -> Result<(), Error> {
        let id = project_id.to_string();
        let url = self.endpoint(&["projects", &id, "protected_branches", branch])?;
        self.send(self.request(Method::DELETE, url)).await?;
        Ok(())
    }

    #[instrument(skip(self), fields(branch = %options.name))]
    async fn protect_branch(
        &self,
        project_id: u64,
        options: &ProtectBranchOptions,
    ) -> Result<ProtectedBranch, Error> {
        let id = project_id.to_string();
        let url = self.endpoint(&["projects", &id, "protected_branches"])?;
        let (branch, _) = self
            .send_json(self.request(Method::POST, url).json(options))
            .await?;
        Ok(branch)
    }

    #[instrument(skip(self))]
    async fn get_slack_service(&self, project_id: u64) -> Result<SlackService, Error> {
        let id = project_id.to_string();
        let url = self.endpoint(&["projects", &id, "services", "slack"])?;
        let (service, _) = self.send_json(self.request(Method::GET, url)).await?;
        Ok(service)
    }

    #[instrument(skip(self, update))]
    async fn set_slack_service(
        &self,
        project_id: u64,
        update: &SlackServiceUpdate,
    ) -> Result<(), Error> {
        let id = project_id.to_string();
        let url = self.endpoint(&["projects", &id, "services", "slack"])?;
        self.send(self.request(Method::PUT, url).json(update)).await?;
        Ok(())
    }
}

/// Parses `base_url` and makes sure it points at the v4 API root.
fn normalize_base_url(base_url: &str) -> Result<Url, Error> {
    let mut url = Url::parse(base_url.trim()).map_err(|e| Error::InvalidUrl {
        url: base_url.to_string(),
        reason: e.to_string(),
    })?;

    if url.cannot_be_a_base() {
        return Err(Error::InvalidUrl {
            url: base_url.to_string(),
            reason: "URL cannot be a base".to_string(),
        });
    }

    let path = url.path().trim_end_matches('/').to_string();
    if !path.ends_with("/api/v4") {
        url.set_path(&format!("{path}/api/v4"));
    } else {
        url.set_path(&path);
    }

    Ok(url)
}

/// Builds a [`Page`] from the GitLab pagination headers.
///
/// When `X-Page` is missing the requested page number is assumed. When no pagination
/// headers are present at all the page is treated as the last one.
fn page_from_headers<T>(items: Vec<T>, headers: &HeaderMap, requested_page: u32) -> Page<T> {
    let current_page = header_number(headers, "x-page").unwrap_or(requested_page);
    let total_pages = header_number(headers, "x-total-pages");
    let next_page = header_number(headers, "x-next-page");

    Page {
        items,
        current_page,
        total_pages,
        next_page,
    }
}

fn header_number(headers: &HeaderMap, name: &str) -> Option<u32> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .and_then(|v| v.parse().ok())
}

/// Maps an unsuccessful status code to an [`Error`].
fn status_error(status: StatusCode, body: &str) -> Error {
    let message = error_message(body);
    error!(status = status.as_u16(), message = %message, "GitLab returned an error");

    match status {
        StatusCode::NOT_FOUND => Error::NotFound,
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Error::AuthError(message),
        StatusCode::TOO_MANY_REQUESTS => Error::RateLimitExceeded,
        _ => Error::ApiError {
            status: status.as_u16(),
            message,
        },
    }
}

/// Extracts the human readable part of a GitLab error body.
///
/// GitLab uses `{"message": ...}` for most errors and `{"error": ...}` for some
/// validation failures; `message` may itself be an object of field errors.
fn error_message(body: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(value) => match value.get("message").or_else(|| value.get("error")) {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => body.to_string(),
        },
        Err(_) => body.to_string(),
    }
}
