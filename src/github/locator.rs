//! Validated identity wrappers for pull request lookups.
//!
//! Owner, repository, and number are validated before any request is built:
//! a violation surfaces as a local `UnprocessableInput` failure and never
//! reaches the network. The locator types also derive the relative API
//! paths and the composite cache key, so path construction stays in one
//! place.

use url::Url;

use super::error::{ApiFailure, GithubError};

fn invalid(message: String) -> GithubError {
    GithubError::api(ApiFailure::invalid_input(message))
}

/// Characters permitted in owner and repository segments.
fn validate_segment(label: &str, value: &str) -> Result<(), GithubError> {
    if value.is_empty() {
        return Err(invalid(format!("{label} must not be empty")));
    }
    let permitted = value
        .chars()
        .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.'));
    if !permitted {
        return Err(invalid(format!(
            "{label} may only contain ASCII letters, digits, '-', '_', and '.'"
        )));
    }
    Ok(())
}

/// Repository owner wrapper to avoid stringly typed parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryOwner(String);

impl RepositoryOwner {
    pub(crate) fn new(value: &str) -> Result<Self, GithubError> {
        validate_segment("repository owner", value)?;
        Ok(Self(value.to_owned()))
    }

    /// Borrow the owner value.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Repository name wrapper to prevent parameter mix-ups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryName(String);

impl RepositoryName {
    pub(crate) fn new(value: &str) -> Result<Self, GithubError> {
        validate_segment("repository name", value)?;
        Ok(Self(value.to_owned()))
    }

    /// Borrow the repository name.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Pull request number, always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PullRequestNumber(u64);

impl PullRequestNumber {
    pub(crate) fn new(value: u64) -> Result<Self, GithubError> {
        if value == 0 {
            return Err(invalid(
                "pull request number must be a positive integer".to_owned(),
            ));
        }
        Ok(Self(value))
    }

    /// Returns the numeric value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Personal access token wrapper enforcing presence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonalAccessToken(String);

impl PersonalAccessToken {
    /// Validates that the token is non-empty and trims whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`GithubError::MissingToken`] when the supplied string is
    /// blank.
    pub fn new(token: impl AsRef<str>) -> Result<Self, GithubError> {
        let trimmed = token.as_ref().trim();
        if trimmed.is_empty() {
            return Err(GithubError::MissingToken);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the token value.
    #[must_use]
    pub const fn value(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for PersonalAccessToken {
    fn as_ref(&self) -> &str {
        self.value()
    }
}

/// Identity of a single pull request.
///
/// The locator names the resource only; the client's configured base
/// endpoint decides which host the request targets.
///
/// # Example
///
/// ```
/// use patty::github::locator::PullRequestLocator;
///
/// let locator = PullRequestLocator::parse("https://github.com/octo/repo/pull/12")
///     .expect("should parse pull request URL");
/// assert_eq!(locator.owner().as_str(), "octo");
/// assert_eq!(locator.number().get(), 12);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestLocator {
    owner: RepositoryOwner,
    repository: RepositoryName,
    number: PullRequestNumber,
}

impl PullRequestLocator {
    /// Builds a locator from its parts, validating every segment.
    ///
    /// # Errors
    ///
    /// Returns an `UnprocessableInput` failure when a segment is empty,
    /// contains characters outside the permitted set, or the number is zero.
    pub fn from_parts(owner: &str, repository: &str, number: u64) -> Result<Self, GithubError> {
        Ok(Self {
            owner: RepositoryOwner::new(owner)?,
            repository: RepositoryName::new(repository)?,
            number: PullRequestNumber::new(number)?,
        })
    }

    /// Parses a pull request URL in the form
    /// `https://<host>/<owner>/<repo>/pull/<number>`.
    ///
    /// # Errors
    ///
    /// Returns an `UnprocessableInput` failure when the URL does not parse
    /// or its path does not name a pull request.
    pub fn parse(input: &str) -> Result<Self, GithubError> {
        let parsed = Url::parse(input)
            .map_err(|error| invalid(format!("pull request URL is invalid: {error}")))?;

        let mut segments = parsed
            .path_segments()
            .ok_or_else(|| invalid(missing_segments_message()))?;

        let owner_segment = segments
            .next()
            .ok_or_else(|| invalid(missing_segments_message()))?;
        let repository_segment = segments
            .next()
            .ok_or_else(|| invalid(missing_segments_message()))?;
        let marker = segments
            .next()
            .ok_or_else(|| invalid(missing_segments_message()))?;
        let number_segment = segments
            .next()
            .ok_or_else(|| invalid(missing_segments_message()))?;

        if marker != "pull" || number_segment.is_empty() {
            return Err(invalid(missing_segments_message()));
        }

        let number = number_segment
            .parse::<u64>()
            .map_err(|_| invalid("pull request number must be a positive integer".to_owned()))?;

        Self::from_parts(owner_segment, repository_segment, number)
    }

    /// Repository owner.
    #[must_use]
    pub const fn owner(&self) -> &RepositoryOwner {
        &self.owner
    }

    /// Repository name.
    #[must_use]
    pub const fn repository(&self) -> &RepositoryName {
        &self.repository
    }

    /// Pull request number.
    #[must_use]
    pub const fn number(&self) -> PullRequestNumber {
        self.number
    }

    /// Relative API path for the pull request resource.
    pub(crate) fn pull_request_path(&self) -> String {
        format!(
            "repos/{}/{}/pulls/{}",
            self.owner.as_str(),
            self.repository.as_str(),
            self.number.get()
        )
    }

    /// Composite identity used as the cache key.
    pub(crate) fn cache_key(&self) -> String {
        format!(
            "{}/{}#{}",
            self.owner.as_str(),
            self.repository.as_str(),
            self.number.get()
        )
    }
}

fn missing_segments_message() -> String {
    "pull request URL must match /owner/repo/pull/<number>".to_owned()
}

/// Identity of a repository, for listing operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryLocator {
    owner: RepositoryOwner,
    repository: RepositoryName,
}

impl RepositoryLocator {
    /// Builds a locator from owner and repository name, validating both.
    ///
    /// # Errors
    ///
    /// Returns an `UnprocessableInput` failure when a segment is empty or
    /// contains characters outside the permitted set.
    pub fn from_parts(owner: &str, repository: &str) -> Result<Self, GithubError> {
        Ok(Self {
            owner: RepositoryOwner::new(owner)?,
            repository: RepositoryName::new(repository)?,
        })
    }

    /// Parses a repository URL in the form `https://<host>/<owner>/<repo>`.
    ///
    /// # Errors
    ///
    /// Returns an `UnprocessableInput` failure when the URL does not parse
    /// or lacks the owner/repo path.
    pub fn parse(input: &str) -> Result<Self, GithubError> {
        let parsed = Url::parse(input)
            .map_err(|error| invalid(format!("repository URL is invalid: {error}")))?;

        let mut segments = parsed
            .path_segments()
            .ok_or_else(|| invalid("repository URL must match /owner/repo".to_owned()))?;

        let owner_segment = segments
            .next()
            .ok_or_else(|| invalid("repository URL must match /owner/repo".to_owned()))?;
        let repository_segment = segments
            .next()
            .ok_or_else(|| invalid("repository URL must match /owner/repo".to_owned()))?;

        Self::from_parts(owner_segment, repository_segment)
    }

    /// Repository owner.
    #[must_use]
    pub const fn owner(&self) -> &RepositoryOwner {
        &self.owner
    }

    /// Repository name.
    #[must_use]
    pub const fn repository(&self) -> &RepositoryName {
        &self.repository
    }

    /// Relative API path for listing pull requests.
    pub(crate) fn pulls_path(&self) -> String {
        format!(
            "repos/{}/{}/pulls",
            self.owner.as_str(),
            self.repository.as_str()
        )
    }
}
