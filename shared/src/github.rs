use octocrab::models::{issues::Comment, Author};

use crate::MarkerComment;

/// Account type GitHub reports for apps and `github-actions[bot]`.
pub const BOT_ACCOUNT_TYPE: &str = "Bot";

pub fn is_bot(author: &Author) -> bool {
    author.r#type == BOT_ACCOUNT_TYPE
}

impl From<Comment> for MarkerComment {
    fn from(comment: Comment) -> Self {
        Self {
            id: comment.id.0,
            author_is_automated: is_bot(&comment.user),
            body: comment
                .body
                .or(comment.body_text)
                .or(comment.body_html)
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoInfo {
    pub owner: String,
    pub repo: String,
    pub number: u64,
    pub full_id: String,
}

impl RepoInfo {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>, number: u64) -> Self {
        let owner = owner.into();
        let repo = repo.into();
        let full_id = format!("{}/{}/{}", owner, repo, number);
        Self {
            owner,
            repo,
            number,
            full_id,
        }
    }
}
