//! Repository content providers
//!
//! The scanner reads repositories through [`RepositoryContentProvider`]:
//! resolve the default branch, list the recursive tree, fetch blobs by SHA.
//! [`GitHubProvider`] talks to the GitHub REST API; [`MemoryProvider`] serves
//! repositories built in memory.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::{StatusCode, Url};
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Kind of a tree entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Blob,
    Tree,
    /// Submodule
    Commit,
}

impl EntryKind {
    fn from_github(kind: &str) -> Option<Self> {
        match kind {
            "blob" => Some(Self::Blob),
            "tree" => Some(Self::Tree),
            "commit" => Some(Self::Commit),
            _ => None,
        }
    }
}

/// One entry of a recursive repository tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    pub path: String,
    pub kind: EntryKind,
    /// Blob SHA, when the provider reported one
    pub sha: Option<String>,
}

impl TreeEntry {
    pub fn blob(path: impl Into<String>, sha: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: EntryKind::Blob,
            sha: Some(sha.into()),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("access denied: {0}")]
    AccessDenied(String),

    #[error(
        "GitHub repository analysis requires authentication. \
         Set the {env} environment variable to a personal access token."
    )]
    MissingCredentials { env: String },

    #[error("request failed: {0}")]
    Transport(String),

    #[error("unexpected response: {0}")]
    Upstream(String),
}

/// Read access to repository contents
#[async_trait]
pub trait RepositoryContentProvider: Send + Sync {
    /// Name of the repository's default branch
    async fn default_branch(&self, owner: &str, repo: &str) -> Result<String, ProviderError>;

    /// All entries reachable from `branch`, recursively, in tree order
    async fn tree(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
    ) -> Result<Vec<TreeEntry>, ProviderError>;

    /// Raw bytes of the blob `sha`
    async fn blob(&self, owner: &str, repo: &str, sha: &str) -> Result<Vec<u8>, ProviderError>;
}

// GitHub

#[derive(Deserialize)]
struct RepoResponse {
    default_branch: String,
}

#[derive(Deserialize)]
struct TreeResponse {
    tree: Vec<TreeItem>,
    #[serde(default)]
    truncated: bool,
}

#[derive(Deserialize)]
struct TreeItem {
    path: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    sha: Option<String>,
}

#[derive(Deserialize)]
struct BlobResponse {
    content: String,
    #[serde(default)]
    encoding: Option<String>,
}

/// Reads repositories through the GitHub REST API
#[derive(Debug, Clone)]
pub struct GitHubProvider {
    client: reqwest::Client,
    api_url: String,
    token: Option<String>,
    token_env: String,
}

impl GitHubProvider {
    /// Create a provider for `api_url`, authenticating with `token`.
    ///
    /// Without a token every call fails with
    /// [`ProviderError::MissingCredentials`].
    pub fn new(
        api_url: impl Into<String>,
        token: Option<String>,
        token_env: impl Into<String>,
    ) -> Result<Self, ProviderError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("baseline/", env!("CARGO_PKG_VERSION"))),
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert("X-GitHub-Api-Version", HeaderValue::from_static("2022-11-28"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.trim().is_empty()),
            token_env: token_env.into(),
        })
    }

    /// Create a provider reading its token from the environment variable `token_env`
    pub fn from_env(api_url: impl Into<String>, token_env: &str) -> Result<Self, ProviderError> {
        let token = std::env::var(token_env).ok();
        if token.is_none() {
            warn!(
                "{} is not set; repository analysis will be unavailable",
                token_env
            );
        }
        Self::new(api_url, token, token_env)
    }

    /// API URL for `segments`, each percent-encoded as one path segment
    fn url(&self, segments: &[&str]) -> Result<Url, ProviderError> {
        let invalid = || ProviderError::Transport(format!("invalid API URL {}", self.api_url));
        let mut url = Url::parse(&self.api_url).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|_| invalid())?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, url: Url) -> Result<T, ProviderError> {
        let token = self
            .token
            .as_deref()
            .ok_or_else(|| ProviderError::MissingCredentials {
                env: self.token_env.clone(),
            })?;

        debug!("GET {}", url);
        let path = url.path().to_string();

        let response = self
            .client
            .get(url)
            .header(AUTHORIZATION, format!("Bearer {}", token))
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        match response.status() {
            status if status.is_success() => response
                .json::<T>()
                .await
                .map_err(|e| ProviderError::Upstream(format!("invalid body from {}: {}", path, e))),
            StatusCode::NOT_FOUND => Err(ProviderError::NotFound(path.to_string())),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(ProviderError::AccessDenied(path.to_string()))
            }
            status => Err(ProviderError::Upstream(format!(
                "GitHub returned {} for {}",
                status, path
            ))),
        }
    }
}

#[async_trait]
impl RepositoryContentProvider for GitHubProvider {
    async fn default_branch(&self, owner: &str, repo: &str) -> Result<String, ProviderError> {
        let repo: RepoResponse = self.get(self.url(&["repos", owner, repo])?).await?;
        Ok(repo.default_branch)
    }

    async fn tree(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
    ) -> Result<Vec<TreeEntry>, ProviderError> {
        let mut url = self.url(&["repos", owner, repo, "git", "trees", branch])?;
        url.query_pairs_mut().append_pair("recursive", "1");
        let tree: TreeResponse = self.get(url).await?;

        if tree.truncated {
            warn!(
                "Tree for {}/{} was truncated by GitHub; some files will not be seen",
                owner, repo
            );
        }

        Ok(tree
            .tree
            .into_iter()
            .filter_map(|item| {
                Some(TreeEntry {
                    kind: EntryKind::from_github(&item.kind)?,
                    path: item.path,
                    sha: item.sha,
                })
            })
            .collect())
    }

    async fn blob(&self, owner: &str, repo: &str, sha: &str) -> Result<Vec<u8>, ProviderError> {
        let blob: BlobResponse = self
            .get(self.url(&["repos", owner, repo, "git", "blobs", sha])?)
            .await?;

        match blob.encoding.as_deref() {
            None | Some("base64") => decode_base64(&blob.content),
            Some("utf-8") => Ok(blob.content.into_bytes()),
            Some(other) => Err(ProviderError::Upstream(format!(
                "unsupported blob encoding {}",
                other
            ))),
        }
    }
}

/// Decode GitHub's line-wrapped base64
fn decode_base64(content: &str) -> Result<Vec<u8>, ProviderError> {
    let cleaned: String = content.chars().filter(|c| !c.is_whitespace()).collect();
    STANDARD
        .decode(cleaned)
        .map_err(|e| ProviderError::Upstream(format!("invalid base64 blob: {}", e)))
}

// In-memory

/// A repository held by [`MemoryProvider`]
#[derive(Debug, Clone, Default)]
pub struct MemoryRepo {
    default_branch: String,
    entries: Vec<TreeEntry>,
    blobs: HashMap<String, Vec<u8>>,
    denied: bool,
}

impl MemoryRepo {
    pub fn new(default_branch: impl Into<String>) -> Self {
        Self {
            default_branch: default_branch.into(),
            ..Default::default()
        }
    }

    /// Add a file with the given contents
    pub fn file(mut self, path: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        let sha = format!("blob-{}", self.entries.len());
        self.blobs.insert(sha.clone(), content.into());
        self.entries.push(TreeEntry::blob(path, sha));
        self
    }

    /// Add a raw tree entry; blobs without content fail to fetch
    pub fn entry(mut self, entry: TreeEntry) -> Self {
        self.entries.push(entry);
        self
    }

    /// Reject every read of this repository
    pub fn denied(mut self) -> Self {
        self.denied = true;
        self
    }
}

/// In-memory repositories, keyed by `owner/repo`
#[derive(Debug, Clone, Default)]
pub struct MemoryProvider {
    repos: HashMap<String, MemoryRepo>,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_repo(mut self, owner: &str, repo: &str, contents: MemoryRepo) -> Self {
        self.repos.insert(format!("{}/{}", owner, repo), contents);
        self
    }

    fn repo(&self, owner: &str, repo: &str) -> Result<&MemoryRepo, ProviderError> {
        let key = format!("{}/{}", owner, repo);
        match self.repos.get(&key) {
            Some(contents) if contents.denied => Err(ProviderError::AccessDenied(key)),
            Some(contents) => Ok(contents),
            None => Err(ProviderError::NotFound(key)),
        }
    }
}

#[async_trait]
impl RepositoryContentProvider for MemoryProvider {
    async fn default_branch(&self, owner: &str, repo: &str) -> Result<String, ProviderError> {
        Ok(self.repo(owner, repo)?.default_branch.clone())
    }

    async fn tree(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
    ) -> Result<Vec<TreeEntry>, ProviderError> {
        let contents = self.repo(owner, repo)?;
        if branch != contents.default_branch {
            return Err(ProviderError::NotFound(format!(
                "{}/{}@{}",
                owner, repo, branch
            )));
        }
        Ok(contents.entries.clone())
    }

    async fn blob(&self, owner: &str, repo: &str, sha: &str) -> Result<Vec<u8>, ProviderError> {
        self.repo(owner, repo)?
            .blobs
            .get(sha)
            .cloned()
            .ok_or_else(|| ProviderError::NotFound(format!("{}/{} blob {}", owner, repo, sha)))
    }
}
