use crate::CommentId;

/// Hidden line that tags the comment managed by this action.
/// Prior comments are relocated by this exact text, so it must never change.
pub const MARKER: &str = "<!-- big-diff-energy -->";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerComment {
    pub id: CommentId,
    pub author_is_automated: bool,
    pub body: String,
}

impl MarkerComment {
    pub fn is_marker(&self) -> bool {
        self.author_is_automated && self.body.contains(MARKER)
    }
}

/// Returns the first bot comment carrying the marker. Later duplicates are ignored.
pub fn find_marker<'a>(
    comments: impl IntoIterator<Item = &'a MarkerComment>,
) -> Option<&'a MarkerComment> {
    comments.into_iter().find(|comment| comment.is_marker())
}
