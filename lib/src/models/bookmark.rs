use chrono::{DateTime, Utc};

/// A node of a parsed bookmarks document
///
/// Children keep the order in which they appear in the source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookmarkNode {
    Folder {
        name: String,
        created_at: DateTime<Utc>,
        modified_at: DateTime<Utc>,
        children: Vec<BookmarkNode>,
    },
    Link {
        label: String,
        url: String,
        added_at: DateTime<Utc>,
    },
}

impl BookmarkNode {
    /// Create a folder; a missing or zero modification time falls back to `created_at`
    pub fn folder(
        name: impl Into<String>,
        created_at: DateTime<Utc>,
        modified_at: Option<DateTime<Utc>>,
        children: Vec<BookmarkNode>,
    ) -> Self {
        let modified_at = modified_at
            .filter(|t| t.timestamp() != 0)
            .unwrap_or(created_at);
        BookmarkNode::Folder {
            name: name.into(),
            created_at,
            modified_at,
            children,
        }
    }

    pub fn link(label: impl Into<String>, url: impl Into<String>, added_at: DateTime<Utc>) -> Self {
        BookmarkNode::Link {
            label: label.into(),
            url: url.into(),
            added_at,
        }
    }

    pub fn is_folder(&self) -> bool {
        matches!(self, BookmarkNode::Folder { .. })
    }

    /// Children of a folder, empty for links
    pub fn children(&self) -> &[BookmarkNode] {
        match self {
            BookmarkNode::Folder { children, .. } => children,
            BookmarkNode::Link { .. } => &[],
        }
    }

    /// Number of folders in this subtree, not counting `self`
    pub fn folder_count(&self) -> usize {
        self.children()
            .iter()
            .filter(|c| c.is_folder())
            .map(|c| 1 + c.folder_count())
            .sum()
    }

    /// Number of links in this subtree
    pub fn link_count(&self) -> usize {
        match self {
            BookmarkNode::Link { .. } => 1,
            BookmarkNode::Folder { children, .. } => children.iter().map(|c| c.link_count()).sum(),
        }
    }
}

/// Convert Unix epoch seconds to a UTC timestamp
pub fn from_epoch(seconds: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(seconds, 0)
}
