//! Git repository status via libgit2

use std::path::{Path, PathBuf};
use std::time::Duration;

use git2::{BranchType, ErrorCode, Repository, Status, StatusOptions};
use tracing::{debug, trace};

use crate::{
    error::{Result, VcsError},
    status::{HeadState, VcsStatus},
};

/// Git repository opened for status queries
pub struct GitRepository {
    repo: Repository,
    root_path: PathBuf,
}

impl GitRepository {
    /// Discover a Git repository starting from the given path
    pub fn discover<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        trace!("Discovering Git repository from: {}", path.display());

        let repo = Repository::discover(path).map_err(|e| {
            trace!("Failed to discover repository: {}", e);
            VcsError::RepositoryNotFound {
                path: path.display().to_string(),
            }
        })?;
        let root_path = repo
            .workdir()
            .ok_or_else(|| VcsError::InvalidState {
                message: "Repository has no working directory".to_string(),
            })?
            .to_path_buf();

        Ok(Self { repo, root_path })
    }

    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    /// Branch or detached commit HEAD points at
    pub fn head(&self) -> Result<HeadState> {
        match self.repo.head() {
            Ok(head) if head.is_branch() => {
                let name = head.shorthand().ok_or_else(|| VcsError::InvalidState {
                    message: "Could not get branch name".to_string(),
                })?;
                Ok(HeadState::Branch(name.to_string()))
            }
            Ok(head) => {
                let commit = head.peel_to_commit()?;
                let hash = commit.id().to_string();
                Ok(HeadState::Detached(hash.chars().take(7).collect()))
            }
            Err(e) if e.code() == ErrorCode::UnbornBranch => self.unborn_branch(),
            Err(e) => Err(e.into()),
        }
    }

    /// Branch name of a repository without commits, read from HEAD directly
    fn unborn_branch(&self) -> Result<HeadState> {
        let head = self.repo.find_reference("HEAD")?;
        let target = head.symbolic_target().ok_or_else(|| VcsError::InvalidState {
            message: "HEAD is not a symbolic reference".to_string(),
        })?;
        let name = target.strip_prefix("refs/heads/").unwrap_or(target);
        Ok(HeadState::Branch(name.to_string()))
    }

    /// Counts of staged, modified, untracked and conflicted files
    pub fn status(&self) -> Result<VcsStatus> {
        let mut status = VcsStatus::new(self.head()?);

        let mut options = StatusOptions::new();
        options
            .include_untracked(true)
            .include_ignored(false)
            .recurse_untracked_dirs(false);

        for entry in self.repo.statuses(Some(&mut options))?.iter() {
            let flags = entry.status();

            if flags.contains(Status::CONFLICTED) {
                status.conflicted += 1;
                continue;
            }
            if flags.intersects(
                Status::INDEX_NEW
                    | Status::INDEX_MODIFIED
                    | Status::INDEX_DELETED
                    | Status::INDEX_RENAMED
                    | Status::INDEX_TYPECHANGE,
            ) {
                status.staged += 1;
            }
            if flags.intersects(
                Status::WT_MODIFIED | Status::WT_DELETED | Status::WT_RENAMED | Status::WT_TYPECHANGE,
            ) {
                status.modified += 1;
            }
            if flags.contains(Status::WT_NEW) {
                status.untracked += 1;
            }
        }

        if let Ok((ahead, behind)) = self.ahead_behind() {
            status.ahead = ahead;
            status.behind = behind;
        }

        debug!(
            staged = status.staged,
            modified = status.modified,
            untracked = status.untracked,
            conflicted = status.conflicted,
            "repository status"
        );
        Ok(status)
    }

    /// Ahead/behind counts relative to upstream, zero without one
    fn ahead_behind(&self) -> Result<(usize, usize)> {
        let head = match self.repo.head() {
            Ok(head) if head.is_branch() => head,
            _ => return Ok((0, 0)),
        };
        let Some(branch_name) = head.shorthand() else {
            return Ok((0, 0));
        };

        let local = self.repo.find_branch(branch_name, BranchType::Local)?;
        let upstream = match local.upstream() {
            Ok(upstream) => upstream,
            Err(_) => {
                trace!("No upstream branch configured for {}", branch_name);
                return Ok((0, 0));
            }
        };

        let (Some(local_oid), Some(upstream_oid)) = (head.target(), upstream.get().target()) else {
            return Ok((0, 0));
        };
        Ok(self.repo.graph_ahead_behind(local_oid, upstream_oid)?)
    }
}

/// Query the repository containing `path`, giving up after `timeout`.
///
/// Returns `Ok(None)` when `path` is not inside a repository. The libgit2
/// call runs on the blocking pool; on timeout it is left to finish in the
/// background and its result is dropped.
pub async fn status_with_timeout(path: PathBuf, timeout: Duration) -> Result<Option<VcsStatus>> {
    let query = tokio::task::spawn_blocking(move || match GitRepository::discover(&path) {
        Ok(repo) => repo.status().map(Some),
        Err(VcsError::RepositoryNotFound { .. }) => Ok(None),
        Err(e) => Err(e),
    });

    match tokio::time::timeout(timeout, query).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_error)) => Err(VcsError::InvalidState {
            message: format!("status query failed: {}", join_error),
        }),
        Err(_) => Err(VcsError::Timeout {
            millis: timeout.as_millis() as u64,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use git2::Signature;
    use std::fs;
    use tempfile::TempDir;

    fn init_repo_on_main(dir: &Path) -> Repository {
        let repo = Repository::init(dir).unwrap();
        repo.set_head("refs/heads/main").unwrap();
        repo
    }

    fn commit_all(repo: &Repository, message: &str) {
        let mut index = repo.index().unwrap();
        index
            .add_all(["*"].iter(), git2::IndexAddOption::DEFAULT, None)
            .unwrap();
        index.write().unwrap();
        let tree_id = index.write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        let sig = Signature::now("Test", "test@example.com").unwrap();
        let parents = match repo.head() {
            Ok(head) => vec![head.peel_to_commit().unwrap()],
            Err(_) => vec![],
        };
        let parent_refs: Vec<&git2::Commit> = parents.iter().collect();
        repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parent_refs)
            .unwrap();
    }

    #[test]
    fn test_unborn_branch_name() {
        let dir = TempDir::new().unwrap();
        init_repo_on_main(dir.path());

        let repo = GitRepository::discover(dir.path()).unwrap();
        assert_eq!(repo.head().unwrap(), HeadState::Branch("main".to_string()));
    }

    #[test]
    fn test_status_counts() {
        let dir = TempDir::new().unwrap();
        let git = init_repo_on_main(dir.path());
        fs::write(dir.path().join("tracked.txt"), "one").unwrap();
        fs::write(dir.path().join("staged.txt"), "one").unwrap();
        commit_all(&git, "initial");

        fs::write(dir.path().join("tracked.txt"), "two").unwrap();
        fs::write(dir.path().join("staged.txt"), "two").unwrap();
        let mut index = git.index().unwrap();
        index.add_path(Path::new("staged.txt")).unwrap();
        index.write().unwrap();
        fs::write(dir.path().join("new.txt"), "new").unwrap();

        let status = GitRepository::discover(dir.path()).unwrap().status().unwrap();
        assert_eq!(status.head, HeadState::Branch("main".to_string()));
        assert_eq!(status.staged, 1);
        assert_eq!(status.modified, 1);
        assert_eq!(status.untracked, 1);
        assert_eq!(status.conflicted, 0);
        assert_eq!(status.summary(), "main +1 !1 ?1");
    }

    #[test]
    fn test_discover_from_subdirectory() {
        let dir = TempDir::new().unwrap();
        let git = init_repo_on_main(dir.path());
        fs::create_dir(dir.path().join("src")).unwrap();
        fs::write(dir.path().join("src").join("lib.rs"), "").unwrap();
        commit_all(&git, "initial");

        let repo = GitRepository::discover(dir.path().join("src")).unwrap();
        assert!(repo.status().unwrap().is_clean());
    }

    #[test]
    fn test_discover_outside_repository() {
        let dir = TempDir::new().unwrap();
        let err = GitRepository::discover(dir.path()).err().unwrap();
        assert!(matches!(err, VcsError::RepositoryNotFound { .. }));
    }

    #[tokio::test]
    async fn test_status_with_timeout_outside_repository() {
        let dir = TempDir::new().unwrap();
        let status = status_with_timeout(dir.path().to_path_buf(), Duration::from_secs(5))
            .await
            .unwrap();
        assert!(status.is_none());
    }

    #[tokio::test]
    async fn test_status_with_timeout_in_repository() {
        let dir = TempDir::new().unwrap();
        let git = init_repo_on_main(dir.path());
        fs::write(dir.path().join("a.txt"), "a").unwrap();
        commit_all(&git, "initial");

        let status = status_with_timeout(dir.path().to_path_buf(), Duration::from_secs(5))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(status.summary(), "main");
    }
}
