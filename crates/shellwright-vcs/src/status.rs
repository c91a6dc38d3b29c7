//! Repository status summary

use serde::Serialize;

/// What HEAD points at
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "name")]
pub enum HeadState {
    /// A local branch, possibly without commits yet
    Branch(String),
    /// Detached at a commit (short hash)
    Detached(String),
}

impl HeadState {
    /// Label shown in the prompt
    pub fn label(&self) -> String {
        match self {
            HeadState::Branch(name) => name.clone(),
            HeadState::Detached(hash) => format!("@{}", hash),
        }
    }
}

/// Working tree counts for the current repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VcsStatus {
    pub head: HeadState,
    /// Files with changes in the index
    pub staged: usize,
    /// Tracked files changed in the working tree
    pub modified: usize,
    pub untracked: usize,
    pub conflicted: usize,
    /// Commits ahead of upstream
    pub ahead: usize,
    /// Commits behind upstream
    pub behind: usize,
}

impl VcsStatus {
    pub fn new(head: HeadState) -> Self {
        Self {
            head,
            staged: 0,
            modified: 0,
            untracked: 0,
            conflicted: 0,
            ahead: 0,
            behind: 0,
        }
    }

    pub fn is_clean(&self) -> bool {
        self.staged == 0 && self.modified == 0 && self.untracked == 0 && self.conflicted == 0
    }

    /// Compact indicators, in display order.
    ///
    /// `+N` staged, `!N` modified, `?N` untracked, `=` conflicts, then
    /// `↑N`/`↓N` relative to upstream. Empty for a clean, synced tree.
    pub fn indicators(&self) -> Vec<String> {
        let mut parts = Vec::new();
        if self.staged > 0 {
            parts.push(format!("+{}", self.staged));
        }
        if self.modified > 0 {
            parts.push(format!("!{}", self.modified));
        }
        if self.untracked > 0 {
            parts.push(format!("?{}", self.untracked));
        }
        if self.conflicted > 0 {
            parts.push("=".to_string());
        }
        if self.ahead > 0 {
            parts.push(format!("↑{}", self.ahead));
        }
        if self.behind > 0 {
            parts.push(format!("↓{}", self.behind));
        }
        parts
    }

    /// Branch label followed by the indicators, space separated
    pub fn summary(&self) -> String {
        std::iter::once(self.head.label())
            .chain(self.indicators())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_summary_is_branch_only() {
        let status = VcsStatus::new(HeadState::Branch("main".to_string()));
        assert!(status.is_clean());
        assert_eq!(status.summary(), "main");
    }

    #[test]
    fn test_indicator_order() {
        let mut status = VcsStatus::new(HeadState::Branch("dev".to_string()));
        status.staged = 2;
        status.modified = 1;
        status.untracked = 3;
        status.conflicted = 1;
        status.ahead = 4;
        status.behind = 1;
        assert_eq!(status.summary(), "dev +2 !1 ?3 = ↑4 ↓1");
    }

    #[test]
    fn test_detached_label() {
        let status = VcsStatus::new(HeadState::Detached("abc1234".to_string()));
        assert_eq!(status.summary(), "@abc1234");
    }

    #[test]
    fn test_ahead_only_is_clean() {
        let mut status = VcsStatus::new(HeadState::Branch("main".to_string()));
        status.ahead = 1;
        assert!(status.is_clean());
        assert_eq!(status.indicators(), vec!["↑1".to_string()]);
    }
}
