use std::time::Duration;

use reqwest::StatusCode;
use reqwest::Url;
use reqwest::blocking::Client;
use tracing::{debug, warn};

use super::FileSource;
use crate::error::SourceError;

/// Header GitLab reads personal and project access tokens from.
const TOKEN_HEADER: &str = "PRIVATE-TOKEN";

/// Fetches raw file contents through the GitLab REST API (v4).
pub struct GitLabSource {
    client: Client,
    base_url: Url,
    token: Option<String>,
}

impl GitLabSource {
    /// Create a source for the GitLab instance at `base_url`.
    ///
    /// `timeout` bounds each individual request; there are no retries.
    pub fn new(base_url: &str, token: Option<String>, timeout: Duration) -> Result<Self, SourceError> {
        let parsed = Url::parse(base_url).map_err(|e| SourceError::InvalidUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;
        if parsed.cannot_be_a_base() {
            return Err(SourceError::InvalidUrl {
                url: base_url.to_owned(),
                reason: "URL cannot be a base".to_owned(),
            });
        }

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("robot-deps/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: parsed,
            token,
        })
    }

    /// Check the token against `/api/v4/user`.
    ///
    /// Run once before a build so bad credentials fail fast instead of making
    /// every file look absent.
    pub fn authenticate(&self) -> Result<(), SourceError> {
        let url = self.api_url(&["user"])?;
        let response = self.get(url).send()?;
        match response.status() {
            status if status.is_success() => {
                debug!("authenticated against {}", self.base_url);
                Ok(())
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(SourceError::Unauthorized {
                status: response.status().as_u16(),
            }),
            status => {
                // Anonymous access to public projects can still work.
                warn!("token check against {} returned HTTP {}", self.base_url, status);
                Ok(())
            }
        }
    }

    /// `…/api/v4/projects/{project}/repository/files/{path}/raw?ref={branch}`.
    ///
    /// `project` and `path` are each encoded as a single segment, so their
    /// slashes become `%2F` as the API requires.
    pub fn file_url(&self, project: &str, branch: &str, path: &str) -> Result<Url, SourceError> {
        let mut url = self.api_url(&["projects", project, "repository", "files", path, "raw"])?;
        url.query_pairs_mut().append_pair("ref", branch);
        Ok(url)
    }

    fn api_url(&self, segments: &[&str]) -> Result<Url, SourceError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| SourceError::InvalidUrl {
                url: self.base_url.to_string(),
                reason: "URL cannot be a base".to_owned(),
            })?
            .pop_if_empty()
            .extend(["api", "v4"])
            .extend(segments);
        Ok(url)
    }

    fn get(&self, url: Url) -> reqwest::blocking::RequestBuilder {
        let request = self.client.get(url);
        match &self.token {
            Some(token) => request.header(TOKEN_HEADER, token),
            None => request,
        }
    }
}

impl FileSource for GitLabSource {
    fn fetch(&self, repository: &str, branch: &str, path: &str) -> Result<String, SourceError> {
        let url = self.file_url(repository, branch, path)?;
        debug!("fetching {path} from {repository}@{branch}");

        let response = match self.get(url).send() {
            Ok(response) => response,
            Err(err) => {
                warn!("{path}: request failed: {err}");
                return Ok(String::new());
            }
        };

        match response.status() {
            status if status.is_success() => match response.text() {
                Ok(text) => Ok(text),
                Err(err) => {
                    warn!("{path}: failed to read response body: {err}");
                    Ok(String::new())
                }
            },
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(SourceError::Unauthorized {
                status: response.status().as_u16(),
            }),
            StatusCode::NOT_FOUND => {
                warn!("{path}: not found in {repository}@{branch}");
                Ok(String::new())
            }
            status => {
                warn!("{path}: HTTP {status}");
                Ok(String::new())
            }
        }
    }
}
