//! GitHub service implementation over the GraphQL API

use crate::error::{Error, Result};
use crate::platform::RemoteService;
use crate::types::{
    CreatedPullRequest, MergeMethod, NewPullRequest, PullRequestUpdate, RemoteCommit,
    RemotePullRequest, RemoteSnapshot, RepoAssignee,
};
use async_trait::async_trait;
use octocrab::Octocrab;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

const PULL_REQUESTS_QUERY: &str = r"
    query PullRequests($repoOwner: String!, $repoName: String!) {
        viewer {
            login
            pullRequests(first: 100, states: [OPEN]) {
                nodes {
                    id
                    number
                    title
                    body
                    url
                    baseRefName
                    headRefName
                    repository { id }
                    reviewDecision
                    mergeable
                    commits(last: 1) {
                        nodes {
                            commit {
                                oid
                                messageHeadline
                                messageBody
                                statusCheckRollup { state }
                            }
                        }
                    }
                }
            }
        }
        repository(owner: $repoOwner, name: $repoName) {
            id
        }
    }
";

const ASSIGNABLE_USERS_QUERY: &str = r"
    query AssignableUsers($repoOwner: String!, $repoName: String!, $endCursor: String) {
        repository(owner: $repoOwner, name: $repoName) {
            assignableUsers(first: 100, after: $endCursor) {
                nodes { id login name }
                pageInfo { hasNextPage endCursor }
            }
        }
    }
";

const CREATE_PULL_REQUEST_MUTATION: &str = r"
    mutation CreatePullRequest($input: CreatePullRequestInput!) {
        createPullRequest(input: $input) {
            pullRequest { id number url }
        }
    }
";

const UPDATE_PULL_REQUEST_MUTATION: &str = r"
    mutation UpdatePullRequest($input: UpdatePullRequestInput!) {
        updatePullRequest(input: $input) {
            pullRequest { id }
        }
    }
";

const REQUEST_REVIEWS_MUTATION: &str = r"
    mutation RequestReviews($input: RequestReviewsInput!) {
        requestReviews(input: $input) {
            pullRequest { id }
        }
    }
";

const ADD_COMMENT_MUTATION: &str = r"
    mutation AddComment($input: AddCommentInput!) {
        addComment(input: $input) {
            clientMutationId
        }
    }
";

const MERGE_PULL_REQUEST_MUTATION: &str = r"
    mutation MergePullRequest($input: MergePullRequestInput!) {
        mergePullRequest(input: $input) {
            pullRequest { id }
        }
    }
";

const CLOSE_PULL_REQUEST_MUTATION: &str = r"
    mutation ClosePullRequest($input: ClosePullRequestInput!) {
        closePullRequest(input: $input) {
            pullRequest { id }
        }
    }
";

#[derive(Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Deserialize)]
struct Nodes<T> {
    nodes: Option<Vec<T>>,
}

impl<T> Nodes<T> {
    fn into_vec(self) -> Vec<T> {
        self.nodes.unwrap_or_default()
    }
}

#[derive(Deserialize)]
struct NodeId {
    id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PullRequestsData {
    viewer: Viewer,
    repository: NodeId,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Viewer {
    login: String,
    pull_requests: Nodes<PullRequestNode>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PullRequestNode {
    id: String,
    number: u64,
    title: String,
    #[serde(default)]
    body: String,
    url: String,
    base_ref_name: String,
    head_ref_name: String,
    repository: NodeId,
    review_decision: Option<String>,
    mergeable: String,
    commits: Nodes<CommitNode>,
}

#[derive(Deserialize)]
struct CommitNode {
    commit: CommitFields,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommitFields {
    oid: String,
    message_headline: String,
    #[serde(default)]
    message_body: String,
    status_check_rollup: Option<StatusCheckRollup>,
}

#[derive(Deserialize)]
struct StatusCheckRollup {
    state: String,
}

impl From<PullRequestNode> for RemotePullRequest {
    fn from(node: PullRequestNode) -> Self {
        let head_commit = node
            .commits
            .into_vec()
            .into_iter()
            .next()
            .map(|c| RemoteCommit {
                oid: c.commit.oid,
                message_headline: c.commit.message_headline,
                message_body: c.commit.message_body,
                rollup_state: c.commit.status_check_rollup.map(|r| r.state),
            });

        Self {
            id: node.id,
            number: node.number,
            title: node.title,
            body: node.body,
            url: node.url,
            head_ref_name: node.head_ref_name,
            base_ref_name: node.base_ref_name,
            repository_id: node.repository.id,
            head_commit,
            review_decision: node.review_decision,
            mergeable: node.mergeable,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AssignableUsersData {
    repository: AssignableUsersRepository,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AssignableUsersRepository {
    assignable_users: AssignableUsersConnection,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AssignableUsersConnection {
    nodes: Option<Vec<AssigneeNode>>,
    page_info: PageInfo,
}

#[derive(Deserialize)]
struct AssigneeNode {
    id: String,
    login: String,
    name: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageInfo {
    has_next_page: bool,
    end_cursor: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatePullRequestData {
    create_pull_request: CreatePullRequestPayload,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatePullRequestPayload {
    pull_request: CreatedNode,
}

#[derive(Deserialize)]
struct CreatedNode {
    id: String,
    number: u64,
    url: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdatePullRequestInput<'a> {
    pull_request_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    base_ref_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    body: Option<&'a str>,
}

/// Build the GraphQL base URI for a host.
///
/// github.com is served from `api.github.com`; Enterprise hosts serve
/// GraphQL under `/api/graphql`, so the base is `<scheme>://<host>/api`.
fn api_base_uri(host: &str) -> Option<String> {
    if matches!(host, "github.com" | "api.github.com") {
        return None;
    }
    match url::Url::parse(host) {
        Ok(parsed) if parsed.host_str().is_some() => Some(format!(
            "{}://{}/api",
            parsed.scheme(),
            parsed.host_str().unwrap_or(host)
        )),
        _ => Some(format!("https://{host}/api")),
    }
}

/// GitHub service using octocrab's GraphQL client
pub struct GitHubService {
    client: Octocrab,
    owner: String,
    repo: String,
    log_calls: bool,
}

impl GitHubService {
    /// Create a new GitHub service for `owner/repo` on `host`
    pub fn new(token: &str, owner: String, repo: String, host: &str) -> Result<Self> {
        let mut builder = Octocrab::builder().personal_token(token.to_string());

        if let Some(base_uri) = api_base_uri(host) {
            debug!(%base_uri, "using GitHub Enterprise endpoint");
            builder = builder
                .base_uri(&base_uri)
                .map_err(|e| Error::GitHubApi(e.to_string()))?;
        }

        let client = builder
            .build()
            .map_err(|e| Error::GitHubApi(e.to_string()))?;

        Ok(Self {
            client,
            owner,
            repo,
            log_calls: false,
        })
    }

    /// Print a line for every call made to GitHub
    #[must_use]
    pub const fn with_call_logging(mut self, enabled: bool) -> Self {
        self.log_calls = enabled;
        self
    }

    fn log_call(&self, what: &str) {
        if self.log_calls {
            eprintln!("> github {what}");
        }
    }

    async fn graphql<T: DeserializeOwned + Send>(
        &self,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<T> {
        let response: GraphQlResponse<T> = self
            .client
            .graphql(&json!({
                "query": query,
                "variables": variables,
            }))
            .await?;

        if let Some(errors) = response.errors
            && !errors.is_empty()
        {
            let messages: Vec<_> = errors.into_iter().map(|e| e.message).collect();
            return Err(Error::GitHubApi(format!(
                "GraphQL error: {}",
                messages.join(", ")
            )));
        }

        response
            .data
            .ok_or_else(|| Error::GitHubApi("No data in GraphQL response".to_string()))
    }
}

#[async_trait]
impl RemoteService for GitHubService {
    async fn fetch_snapshot(&self) -> Result<RemoteSnapshot> {
        self.log_call("fetch pull requests");
        let data: PullRequestsData = self
            .graphql(
                PULL_REQUESTS_QUERY,
                json!({ "repoOwner": self.owner, "repoName": self.repo }),
            )
            .await?;

        let pull_requests: Vec<RemotePullRequest> = data
            .viewer
            .pull_requests
            .into_vec()
            .into_iter()
            .map(RemotePullRequest::from)
            .collect();

        debug!(count = pull_requests.len(), "fetched pull requests");
        Ok(RemoteSnapshot {
            viewer_login: data.viewer.login,
            repository_id: data.repository.id,
            pull_requests,
        })
    }

    async fn assignable_users(&self) -> Result<Vec<RepoAssignee>> {
        self.log_call("get assignable users");
        let mut users = Vec::new();
        let mut end_cursor: Option<String> = None;

        loop {
            let data: AssignableUsersData = self
                .graphql(
                    ASSIGNABLE_USERS_QUERY,
                    json!({
                        "repoOwner": self.owner,
                        "repoName": self.repo,
                        "endCursor": end_cursor,
                    }),
                )
                .await?;

            let connection = data.repository.assignable_users;
            users.extend(
                connection
                    .nodes
                    .unwrap_or_default()
                    .into_iter()
                    .map(|n| RepoAssignee {
                        id: n.id,
                        login: n.login,
                        name: n.name.unwrap_or_default(),
                    }),
            );

            if !connection.page_info.has_next_page {
                break;
            }
            end_cursor = connection.page_info.end_cursor;
        }

        debug!(count = users.len(), "fetched assignable users");
        Ok(users)
    }

    async fn create_pull_request(&self, input: &NewPullRequest) -> Result<CreatedPullRequest> {
        debug!(
            head = %input.head_ref_name,
            base = %input.base_ref_name,
            draft = input.draft,
            "creating PR"
        );
        let data: CreatePullRequestData = self
            .graphql(
                CREATE_PULL_REQUEST_MUTATION,
                json!({
                    "input": {
                        "repositoryId": input.repository_id,
                        "baseRefName": input.base_ref_name,
                        "headRefName": input.head_ref_name,
                        "title": input.title,
                        "body": input.body,
                        "draft": input.draft,
                    }
                }),
            )
            .await?;

        let created = data.create_pull_request.pull_request;
        self.log_call(&format!("create {} : {}", created.number, input.title));
        Ok(CreatedPullRequest {
            id: created.id,
            number: created.number,
            url: created.url,
        })
    }

    async fn update_pull_request(&self, id: &str, update: &PullRequestUpdate) -> Result<()> {
        debug!(id, ?update, "updating PR");
        self.log_call(&format!("update {id}"));
        let input = UpdatePullRequestInput {
            pull_request_id: id,
            base_ref_name: update.base_ref_name.as_deref(),
            title: update.title.as_deref(),
            body: update.body.as_deref(),
        };
        let _: serde_json::Value = self
            .graphql(UPDATE_PULL_REQUEST_MUTATION, json!({ "input": input }))
            .await?;
        Ok(())
    }

    async fn add_reviewers(&self, id: &str, user_ids: &[String]) -> Result<()> {
        debug!(id, ?user_ids, "requesting reviews");
        self.log_call(&format!("add reviewers {id} - {user_ids:?}"));
        let _: serde_json::Value = self
            .graphql(
                REQUEST_REVIEWS_MUTATION,
                json!({
                    "input": {
                        "pullRequestId": id,
                        "union": false,
                        "userIds": user_ids,
                    }
                }),
            )
            .await?;
        Ok(())
    }

    async fn comment_pull_request(&self, id: &str, body: &str) -> Result<()> {
        debug!(id, "adding comment");
        self.log_call(&format!("add comment {id}"));
        let _: serde_json::Value = self
            .graphql(
                ADD_COMMENT_MUTATION,
                json!({ "input": { "subjectId": id, "body": body } }),
            )
            .await?;
        Ok(())
    }

    async fn merge_pull_request(&self, id: &str, method: MergeMethod) -> Result<()> {
        debug!(id, %method, "merging PR");
        self.log_call(&format!("merge {id}"));
        let _: serde_json::Value = self
            .graphql(
                MERGE_PULL_REQUEST_MUTATION,
                json!({
                    "input": {
                        "pullRequestId": id,
                        "mergeMethod": method.as_graphql(),
                    }
                }),
            )
            .await?;
        Ok(())
    }

    async fn close_pull_request(&self, id: &str) -> Result<()> {
        debug!(id, "closing PR");
        self.log_call(&format!("close {id}"));
        let _: serde_json::Value = self
            .graphql(
                CLOSE_PULL_REQUEST_MUTATION,
                json!({ "input": { "pullRequestId": id } }),
            )
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_base_uri() {
        assert_eq!(api_base_uri("github.com"), None);
        assert_eq!(
            api_base_uri("github.example.com"),
            Some("https://github.example.com/api".to_string())
        );
        assert_eq!(
            api_base_uri("http://ghe.internal"),
            Some("http://ghe.internal/api".to_string())
        );
    }

    #[test]
    fn test_pull_request_node_conversion() {
        let node: PullRequestNode = serde_json::from_value(json!({
            "id": "PR_1",
            "number": 7,
            "title": "Add thing",
            "body": "desc",
            "url": "https://github.com/o/r/pull/7",
            "baseRefName": "main",
            "headRefName": "pr/octocat/feature/0a1b2c3d",
            "repository": { "id": "R_1" },
            "reviewDecision": null,
            "mergeable": "UNKNOWN",
            "commits": { "nodes": [ { "commit": {
                "oid": "abc",
                "messageHeadline": "Add thing",
                "messageBody": "",
                "statusCheckRollup": null
            } } ] }
        }))
        .unwrap();

        let pr = RemotePullRequest::from(node);
        assert_eq!(pr.number, 7);
        assert_eq!(pr.repository_id, "R_1");
        let head = pr.head_commit.unwrap();
        assert_eq!(head.oid, "abc");
        assert_eq!(head.rollup_state, None);
    }
}
