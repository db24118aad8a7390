use anyhow::Context;
use async_trait::async_trait;
use octocrab::{
    models::CommentId as GithubCommentId, service::middleware::retry::RetryConfig, Page,
};
use shared::{github::RepoInfo, CommentId, FileChange, MarkerComment};
use tracing::{debug, instrument};

/// GitHub caps list endpoints at 100 items per page.
pub const PER_PAGE: u8 = 100;

/// Operations the action needs from the code host.
#[async_trait]
pub trait CommentHost: Send + Sync {
    async fn list_files(&self, pr: &RepoInfo) -> anyhow::Result<Vec<FileChange>>;

    async fn list_comments(&self, pr: &RepoInfo) -> anyhow::Result<Vec<MarkerComment>>;

    async fn create_comment(&self, pr: &RepoInfo, body: &str) -> anyhow::Result<CommentId>;

    async fn update_comment(&self, pr: &RepoInfo, id: CommentId, body: &str)
        -> anyhow::Result<()>;

    async fn delete_comment(&self, pr: &RepoInfo, id: CommentId) -> anyhow::Result<()>;
}

#[derive(Clone)]
pub struct GithubClient {
    octocrab: octocrab::Octocrab,
}

impl GithubClient {
    pub fn new(github_token: String, api_url: Option<&str>) -> anyhow::Result<Self> {
        // Every call is attempted once; a failed run is re-triggered by the next event.
        let mut builder = octocrab::Octocrab::builder()
            .personal_token(github_token)
            .add_retry_config(RetryConfig::None);
        if let Some(api_url) = api_url {
            builder = builder
                .base_uri(api_url)
                .with_context(|| format!("Invalid GitHub API url: {api_url}"))?;
        }

        Ok(Self {
            octocrab: builder.build()?,
        })
    }
}

#[async_trait]
impl CommentHost for GithubClient {
    #[instrument(skip(self, pr), fields(pr = %pr.full_id))]
    async fn list_files(&self, pr: &RepoInfo) -> anyhow::Result<Vec<FileChange>> {
        let route = format!("/repos/{}/{}/pulls/{}/files", pr.owner, pr.repo, pr.number);
        let page: Page<FileChange> = self
            .octocrab
            .get(route, Some(&[("per_page", PER_PAGE)]))
            .await
            .with_context(|| format!("Failed to list files of {}", pr.full_id))?;

        let files = self
            .octocrab
            .all_pages(page)
            .await
            .with_context(|| format!("Failed to list files of {}", pr.full_id))?;
        debug!("Fetched {} changed files", files.len());
        Ok(files)
    }

    #[instrument(skip(self, pr), fields(pr = %pr.full_id))]
    async fn list_comments(&self, pr: &RepoInfo) -> anyhow::Result<Vec<MarkerComment>> {
        let page = self
            .octocrab
            .issues(&pr.owner, &pr.repo)
            .list_comments(pr.number)
            .per_page(PER_PAGE)
            .send()
            .await
            .with_context(|| format!("Failed to list comments of {}", pr.full_id))?;

        let comments = self
            .octocrab
            .all_pages(page)
            .await
            .with_context(|| format!("Failed to list comments of {}", pr.full_id))?;
        debug!("Fetched {} comments", comments.len());
        Ok(comments.into_iter().map(MarkerComment::from).collect())
    }

    #[instrument(skip(self, pr, body), fields(pr = %pr.full_id))]
    async fn create_comment(&self, pr: &RepoInfo, body: &str) -> anyhow::Result<CommentId> {
        let comment = self
            .octocrab
            .issues(&pr.owner, &pr.repo)
            .create_comment(pr.number, body)
            .await
            .with_context(|| format!("Failed to create comment on {}", pr.full_id))?;
        Ok(comment.id.0)
    }

    #[instrument(skip(self, pr, body), fields(pr = %pr.full_id))]
    async fn update_comment(
        &self,
        pr: &RepoInfo,
        id: CommentId,
        body: &str,
    ) -> anyhow::Result<()> {
        self.octocrab
            .issues(&pr.owner, &pr.repo)
            .update_comment(GithubCommentId(id), body)
            .await
            .with_context(|| format!("Failed to update comment {id} on {}", pr.full_id))?;
        Ok(())
    }

    #[instrument(skip(self, pr), fields(pr = %pr.full_id))]
    async fn delete_comment(&self, pr: &RepoInfo, id: CommentId) -> anyhow::Result<()> {
        self.octocrab
            .issues(&pr.owner, &pr.repo)
            .delete_comment(GithubCommentId(id))
            .await
            .with_context(|| format!("Failed to delete comment {id} on {}", pr.full_id))?;
        Ok(())
    }
}
