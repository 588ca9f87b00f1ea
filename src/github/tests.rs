//! Unit tests for locators, models, and the trait seam.

use mockall::predicate::always;
use rstest::rstest;

use super::models::ApiPullRequest;
use super::{
    FailureKind, GithubError, MergeableState, MockPullRequestSource, PersonalAccessToken,
    PullRequest, PullRequestLocator, PullRequestSource, PullRequestState, RepositoryLocator,
};

fn sample_locator() -> PullRequestLocator {
    PullRequestLocator::parse("https://github.com/octo/repo/pull/4")
        .expect("sample locator should parse")
}

fn sample_pull_request() -> PullRequest {
    PullRequest {
        number: 4,
        title: Some("demo".to_owned()),
        state: PullRequestState::Open,
        draft: false,
        html_url: None,
        author: Some("octocat".to_owned()),
        created_at: None,
        updated_at: None,
        mergeable_state: None,
    }
}

fn assert_unprocessable(result: Result<PullRequestLocator, GithubError>) {
    let error = result.expect_err("locator should be rejected");
    assert_eq!(
        error.failure_kind(),
        Some(FailureKind::UnprocessableInput),
        "expected UnprocessableInput, got {error:?}"
    );
}

#[rstest]
fn parses_standard_github_url() {
    let locator = PullRequestLocator::parse("https://github.com/octo/repo/pull/12/files")
        .expect("should parse standard GitHub URL");
    assert_eq!(locator.owner().as_str(), "octo", "owner mismatch");
    assert_eq!(locator.repository().as_str(), "repo", "repository mismatch");
    assert_eq!(locator.number().get(), 12_u64, "number mismatch");
}

#[rstest]
fn builds_locator_from_parts() {
    let locator = PullRequestLocator::from_parts("cheefbird", "patty-pr-minder", 1)
        .expect("parts should validate");
    assert_eq!(locator.owner().as_str(), "cheefbird");
    assert_eq!(locator.repository().as_str(), "patty-pr-minder");
    assert_eq!(locator.number().get(), 1_u64);
}

#[rstest]
#[case::missing_number("https://github.com/octo/repo/pull/")]
#[case::non_numeric_number("https://github.com/octo/repo/pull/not-a-number")]
#[case::zero_number("https://github.com/octo/repo/pull/0")]
#[case::issues_path("https://github.com/octo/repo/issues/4")]
#[case::pulls_collection_path("https://github.com/octo/repo/pulls/4")]
#[case::relative_url("octo/repo/pull/4")]
fn rejects_malformed_pull_request_urls(#[case] input: &str) {
    assert_unprocessable(PullRequestLocator::parse(input));
}

#[rstest]
#[case::empty_owner("", "repo")]
#[case::empty_repository("octo", "")]
#[case::owner_with_slash("oc/to", "repo")]
#[case::repository_with_space("octo", "re po")]
#[case::owner_with_unicode("öcto", "repo")]
fn rejects_segments_outside_the_permitted_character_set(
    #[case] owner: &str,
    #[case] repository: &str,
) {
    assert_unprocessable(PullRequestLocator::from_parts(owner, repository, 4));
}

#[rstest]
fn rejects_zero_number_from_parts() {
    assert_unprocessable(PullRequestLocator::from_parts("octo", "repo", 0));
}

#[rstest]
fn repository_locator_accepts_dotted_names() {
    let locator =
        RepositoryLocator::from_parts("octo", "repo.js").expect("dotted name should validate");
    assert_eq!(locator.repository().as_str(), "repo.js");
}

#[rstest]
fn rejects_empty_token() {
    let result = PersonalAccessToken::new(String::new());
    assert!(
        matches!(result, Err(GithubError::MissingToken)),
        "expected MissingToken, got {result:?}"
    );
}

#[rstest]
fn token_trims_surrounding_whitespace() {
    let token = PersonalAccessToken::new("  ghp_demo  ").expect("token should validate");
    assert_eq!(token.value(), "ghp_demo");
}

#[rstest]
fn maps_api_fields_onto_the_resource_model() {
    let api: ApiPullRequest = serde_json::from_value(serde_json::json!({
        "number": 7,
        "title": "Add retry logic",
        "state": "open",
        "draft": true,
        "html_url": "https://github.com/octo/repo/pull/7",
        "user": { "login": "octocat" },
        "created_at": "2025-01-01T00:00:00Z",
        "updated_at": "2025-01-02T00:00:00Z",
        "mergeable_state": "clean"
    }))
    .expect("payload should deserialize");

    let resource = PullRequest::from(api);
    assert_eq!(resource.number, 7);
    assert_eq!(resource.state, PullRequestState::Open);
    assert!(resource.draft);
    assert_eq!(resource.mergeable_state, Some(MergeableState::Clean));
}

#[rstest]
#[case::blocked("blocked", MergeableState::Unknown)]
#[case::behind("behind", MergeableState::Unknown)]
#[case::dirty("dirty", MergeableState::Dirty)]
#[case::unstable("unstable", MergeableState::Unstable)]
fn unfamiliar_mergeability_strings_collapse_to_unknown(
    #[case] value: &str,
    #[case] expected: MergeableState,
) {
    let api: ApiPullRequest = serde_json::from_value(serde_json::json!({
        "number": 7,
        "mergeable_state": value
    }))
    .expect("payload should deserialize");

    assert_eq!(PullRequest::from(api).mergeable_state, Some(expected));
}

#[rstest]
fn list_payloads_without_mergeability_map_to_absent() {
    let api: ApiPullRequest = serde_json::from_value(serde_json::json!({
        "number": 9,
        "title": "List entry",
        "state": "closed"
    }))
    .expect("payload should deserialize");

    let resource = PullRequest::from(api);
    assert_eq!(resource.state, PullRequestState::Closed);
    assert_eq!(resource.mergeable_state, None);
    assert!(!resource.draft);
}

#[tokio::test]
async fn bot_layers_consume_the_source_through_the_trait() {
    let mut source = MockPullRequestSource::new();
    source
        .expect_fetch_pull_request()
        .with(always())
        .times(1)
        .returning(|_| Ok(Some(sample_pull_request())));

    let resolved = source
        .fetch_pull_request(&sample_locator())
        .await
        .expect("fetch should succeed");
    assert_eq!(resolved.map(|resource| resource.number), Some(4));
}
