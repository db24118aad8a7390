use shared::{find_marker, reconcile, CommentId, DiffTotals, Reconciliation, Threshold};
use tracing::{info, instrument};

use crate::{api::CommentHost, event::Trigger, messages::MessageLoader};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Skipped,
    Unchanged,
    Created(CommentId),
    Updated(CommentId),
    Deleted(CommentId),
}

pub struct Context<'a> {
    pub host: &'a dyn CommentHost,
    pub messages: &'a MessageLoader,
    pub threshold: Threshold,
}

/// Reads the pull request state from the host, decides and writes the result back.
#[instrument(skip_all)]
pub async fn run(context: &Context<'_>, trigger: &Trigger) -> anyhow::Result<Outcome> {
    let pr = match trigger {
        Trigger::PullRequest(pr) => pr,
        Trigger::Other { event_name } => {
            info!("This action only works on pull_request events, got {event_name:?}. Skipping");
            return Ok(Outcome::Skipped);
        }
    };

    info!("Checking PR #{} for large diffs...", pr.number);

    let (files, comments) = tokio::try_join!(
        context.host.list_files(pr),
        context.host.list_comments(pr)
    )?;

    let totals = DiffTotals::sum(&files);
    info!("PR stats: +{} -{}", totals.additions, totals.deletions);

    let existing = find_marker(&comments).map(|comment| comment.id);
    let outcome = match reconcile(&totals, context.threshold, existing) {
        Reconciliation::Nothing => {
            info!(
                "PR additions ({}) below threshold ({}). No comment needed",
                totals.additions, context.threshold
            );
            Outcome::Unchanged
        }
        Reconciliation::Create => {
            let body = context.messages.big_diff_message(&totals)?;
            let id = context.host.create_comment(pr, &body).await?;
            info!("Comment {id} posted successfully");
            Outcome::Created(id)
        }
        Reconciliation::Update(id) => {
            info!(
                "Updating existing comment {id} with new stats: +{} -{}",
                totals.additions, totals.deletions
            );
            let body = context.messages.big_diff_message(&totals)?;
            context.host.update_comment(pr, id, &body).await?;
            info!("Comment {id} updated successfully");
            Outcome::Updated(id)
        }
        Reconciliation::Delete(id) => {
            info!(
                "PR now below threshold ({} < {}). Deleting comment {id}",
                totals.additions, context.threshold
            );
            context.host.delete_comment(pr, id).await?;
            info!("Comment {id} deleted, great job cleaning up the PR!");
            Outcome::Deleted(id)
        }
    };

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use shared::{github::RepoInfo, FileChange, MarkerComment, MARKER};

    use super::*;
    use crate::messages::Image;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        ListFiles,
        ListComments,
        Create(String),
        Update(CommentId, String),
        Delete(CommentId),
    }

    #[derive(Default)]
    struct MockHost {
        files: Vec<FileChange>,
        comments: Vec<MarkerComment>,
        fail_comments: bool,
        fail_writes: bool,
        calls: Mutex<Vec<Call>>,
    }

    impl MockHost {
        fn with_additions(additions: u64) -> Self {
            Self {
                files: vec![
                    FileChange::new(additions / 2, 3),
                    FileChange::new(additions - additions / 2, 4),
                ],
                ..Default::default()
            }
        }

        fn with_marker(mut self, id: CommentId) -> Self {
            self.comments.push(MarkerComment {
                id,
                author_is_automated: true,
                body: format!("{MARKER}\nold numbers"),
            });
            self
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        fn writes(&self) -> Vec<Call> {
            self.calls()
                .into_iter()
                .filter(|call| !matches!(call, Call::ListFiles | Call::ListComments))
                .collect()
        }

        fn record(&self, call: Call) {
            self.calls.lock().unwrap().push(call);
        }
    }

    #[async_trait]
    impl CommentHost for MockHost {
        async fn list_files(&self, _pr: &RepoInfo) -> anyhow::Result<Vec<FileChange>> {
            self.record(Call::ListFiles);
            Ok(self.files.clone())
        }

        async fn list_comments(&self, _pr: &RepoInfo) -> anyhow::Result<Vec<MarkerComment>> {
            self.record(Call::ListComments);
            if self.fail_comments {
                anyhow::bail!("API rate limit exceeded");
            }
            Ok(self.comments.clone())
        }

        async fn create_comment(&self, _pr: &RepoInfo, body: &str) -> anyhow::Result<CommentId> {
            self.record(Call::Create(body.to_string()));
            if self.fail_writes {
                anyhow::bail!("Resource not accessible by integration");
            }
            Ok(1000)
        }

        async fn update_comment(
            &self,
            _pr: &RepoInfo,
            id: CommentId,
            body: &str,
        ) -> anyhow::Result<()> {
            self.record(Call::Update(id, body.to_string()));
            if self.fail_writes {
                anyhow::bail!("Bad gateway");
            }
            Ok(())
        }

        async fn delete_comment(&self, _pr: &RepoInfo, id: CommentId) -> anyhow::Result<()> {
            self.record(Call::Delete(id));
            if self.fail_writes {
                anyhow::bail!("Not Found");
            }
            Ok(())
        }
    }

    fn pr_trigger() -> Trigger {
        Trigger::PullRequest(RepoInfo::new("octo", "hello", 12))
    }

    fn messages() -> MessageLoader {
        MessageLoader::load_default(&Image::FromTemplate).unwrap()
    }

    async fn run_with(host: &MockHost) -> anyhow::Result<Outcome> {
        let messages = messages();
        let context = Context {
            host,
            messages: &messages,
            threshold: Threshold::DEFAULT,
        };
        run(&context, &pr_trigger()).await
    }

    #[tokio::test]
    async fn small_pr_is_left_alone() {
        let host = MockHost::with_additions(500);

        assert_eq!(run_with(&host).await.unwrap(), Outcome::Unchanged);
        assert!(host.writes().is_empty());
    }

    #[tokio::test]
    async fn big_pr_gets_a_comment() {
        let host = MockHost::with_additions(1500);

        assert_eq!(run_with(&host).await.unwrap(), Outcome::Created(1000));
        let writes = host.writes();
        assert_eq!(writes.len(), 1);
        let Call::Create(body) = &writes[0] else {
            panic!("expected a new comment, got {writes:?}");
        };
        assert!(body.starts_with(MARKER));
        assert!(body.contains("+1,500"));
    }

    #[tokio::test]
    async fn growing_pr_updates_the_comment() {
        let host = MockHost::with_additions(2000).with_marker(42);

        assert_eq!(run_with(&host).await.unwrap(), Outcome::Updated(42));
        let writes = host.writes();
        assert_eq!(writes.len(), 1);
        let Call::Update(42, body) = &writes[0] else {
            panic!("expected an update of 42, got {writes:?}");
        };
        assert!(body.contains("+2,000"));
    }

    #[tokio::test]
    async fn update_is_idempotent() {
        let host = MockHost::with_additions(2000).with_marker(42);
        run_with(&host).await.unwrap();
        run_with(&host).await.unwrap();

        let bodies: Vec<_> = host
            .writes()
            .into_iter()
            .map(|call| match call {
                Call::Update(_, body) => body,
                other => panic!("unexpected call {other:?}"),
            })
            .collect();
        assert_eq!(bodies.len(), 2);
        assert_eq!(bodies[0], bodies[1]);
    }

    #[tokio::test]
    async fn shrunk_pr_removes_the_comment() {
        let host = MockHost::with_additions(300).with_marker(42);

        assert_eq!(run_with(&host).await.unwrap(), Outcome::Deleted(42));
        assert_eq!(host.writes(), vec![Call::Delete(42)]);
    }

    #[tokio::test]
    async fn human_comments_with_marker_are_ignored() {
        let mut host = MockHost::with_additions(300);
        host.comments.push(MarkerComment {
            id: 7,
            author_is_automated: false,
            body: format!("Why does the bot write {MARKER}?"),
        });

        assert_eq!(run_with(&host).await.unwrap(), Outcome::Unchanged);
        assert!(host.writes().is_empty());
    }

    #[tokio::test]
    async fn first_marker_wins() {
        let host = MockHost::with_additions(300).with_marker(5).with_marker(6);

        assert_eq!(run_with(&host).await.unwrap(), Outcome::Deleted(5));
        assert_eq!(host.writes(), vec![Call::Delete(5)]);
    }

    #[tokio::test]
    async fn custom_threshold() {
        let host = MockHost::with_additions(300);
        let messages = messages();
        let context = Context {
            host: &host,
            messages: &messages,
            threshold: Threshold::new(100).unwrap(),
        };

        assert_eq!(
            run(&context, &pr_trigger()).await.unwrap(),
            Outcome::Created(1000)
        );
    }

    #[tokio::test]
    async fn failed_listing_aborts_without_writes() {
        let mut host = MockHost::with_additions(1500);
        host.fail_comments = true;

        let err = run_with(&host).await.unwrap_err();
        assert!(err.to_string().contains("rate limit"));
        assert!(host.writes().is_empty());
    }

    fn failing_writes(host: MockHost) -> MockHost {
        MockHost {
            fail_writes: true,
            ..host
        }
    }

    #[tokio::test]
    async fn failed_create_is_reported_once() {
        let host = failing_writes(MockHost::with_additions(1500));

        let err = run_with(&host).await.unwrap_err();
        assert!(err.to_string().contains("Resource not accessible"));
        let writes = host.writes();
        assert_eq!(writes.len(), 1);
        assert!(matches!(writes[0], Call::Create(_)));
    }

    #[tokio::test]
    async fn failed_update_is_reported_once() {
        let host = failing_writes(MockHost::with_additions(2000).with_marker(42));

        let err = run_with(&host).await.unwrap_err();
        assert!(err.to_string().contains("Bad gateway"));
        let writes = host.writes();
        assert_eq!(writes.len(), 1);
        assert!(matches!(writes[0], Call::Update(42, _)));
    }

    #[tokio::test]
    async fn failed_delete_is_reported_once() {
        let host = failing_writes(MockHost::with_additions(300).with_marker(42));

        let err = run_with(&host).await.unwrap_err();
        assert!(err.to_string().contains("Not Found"));
        assert_eq!(host.writes(), vec![Call::Delete(42)]);
    }

    #[tokio::test]
    async fn non_pull_request_event_makes_no_calls() {
        let host = MockHost::with_additions(5000).with_marker(42);
        let messages = messages();
        let context = Context {
            host: &host,
            messages: &messages,
            threshold: Threshold::DEFAULT,
        };
        let trigger = Trigger::Other {
            event_name: "push".to_string(),
        };

        assert_eq!(run(&context, &trigger).await.unwrap(), Outcome::Skipped);
        assert!(host.calls().is_empty());
    }
}
