/// One changed file with its content at both revisions.
///
/// `old` is `None` for added files and `new` is `None` for deleted ones.
/// Binary files carry no content and are classified by path only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileChange {
    pub path: String,
    /// Language tag, `None` when unsupported or unknown.
    pub lang: Option<String>,
    pub old: Option<String>,
    pub new: Option<String>,
    pub binary: bool,
}

impl FileChange {
    #[must_use]
    pub const fn is_added(&self) -> bool {
        self.old.is_none() && self.new.is_some()
    }

    #[must_use]
    pub const fn is_deleted(&self) -> bool {
        self.old.is_some() && self.new.is_none()
    }
}

/// A logical diff between two revisions, files ordered by path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diff {
    pub base: String,
    /// `None` when the target is the working tree.
    pub target: Option<String>,
    pub files: Vec<FileChange>,
}

impl Diff {
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.iter().map(|f| f.path.as_str())
    }
}

/// One file of a whole revision. `content` is `None` for binary files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceFile {
    pub path: String,
    pub lang: Option<String>,
    pub content: Option<String>,
}
