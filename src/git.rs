//! Working-tree operations on the repository being published.

use std::path::{Path, PathBuf};

use git2::build::CheckoutBuilder;
use git2::{BranchType, ObjectType, Oid, Repository, Signature};

// =============================================================================
// Errors
// =============================================================================

#[derive(thiserror::Error, Debug)]
pub enum GitError {
    #[error("failed to open repository at {path}: {source}")]
    OpenRepo { path: PathBuf, source: git2::Error },

    #[error("repository at {0} has no working tree")]
    Bare(PathBuf),

    #[error("branch '{0}' not found")]
    BranchNotFound(String),

    #[error("failed to checkout branch '{branch}': {source}")]
    CheckoutFailed { branch: String, source: git2::Error },

    #[error("'{path}' not found on branch '{branch}'")]
    PathNotFound { branch: String, path: PathBuf },

    #[error("failed to write {path}: {source}")]
    WriteFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to update index: {0}")]
    Index(git2::Error),

    #[error("no commit identity configured (set user.name and user.email): {0}")]
    Signature(git2::Error),

    #[error("failed to commit: {0}")]
    Commit(git2::Error),

    #[error("failed to read HEAD: {0}")]
    Head(git2::Error),
}

// =============================================================================
// Workspace
// =============================================================================

/// A git repository with a working tree, seen through the operations the
/// publish procedure needs.
pub struct Workspace {
    repo: Repository,
    work_tree: PathBuf,
}

impl Workspace {
    /// Open the repository containing `path`, searching parent directories.
    pub fn discover(path: &Path) -> Result<Self, GitError> {
        let repo = Repository::discover(path).map_err(|source| GitError::OpenRepo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_repository(repo)
    }

    pub fn from_repository(repo: Repository) -> Result<Self, GitError> {
        let work_tree = repo
            .workdir()
            .map(Path::to_path_buf)
            .ok_or_else(|| GitError::Bare(repo.path().to_path_buf()))?;
        Ok(Self { repo, work_tree })
    }

    /// Root of the working tree.
    pub fn work_tree(&self) -> &Path {
        &self.work_tree
    }

    /// Absolute path of a repository-relative path.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        self.work_tree.join(path)
    }

    /// Name of the checked-out branch, or `None` on a detached or unborn HEAD.
    pub fn current_branch(&self) -> Option<String> {
        let head = self.repo.head().ok()?;
        if !head.is_branch() {
            return None;
        }
        head.shorthand().map(str::to_string)
    }

    /// Switch the working tree and HEAD to a local branch.
    ///
    /// Uses a safe checkout: local modifications that would be overwritten
    /// make the checkout fail and leave HEAD where it was.
    pub fn checkout_branch(&self, branch: &str) -> Result<(), GitError> {
        let reference = self
            .repo
            .find_branch(branch, BranchType::Local)
            .map_err(|_| GitError::BranchNotFound(branch.to_string()))?;
        let refname = reference
            .get()
            .name()
            .ok_or_else(|| GitError::BranchNotFound(branch.to_string()))?
            .to_string();
        let target = reference
            .get()
            .peel(ObjectType::Commit)
            .map_err(|source| GitError::CheckoutFailed {
                branch: branch.to_string(),
                source,
            })?;

        let mut checkout = CheckoutBuilder::new();
        checkout.safe();
        self.repo
            .checkout_tree(&target, Some(&mut checkout))
            .and_then(|_| self.repo.set_head(&refname))
            .map_err(|source| GitError::CheckoutFailed {
                branch: branch.to_string(),
                source,
            })?;

        tracing::debug!("checked out {} at {}", refname, target.id());
        Ok(())
    }

    /// Copy one file from the tip of `branch` into the working tree and stage
    /// it, without moving HEAD (`git checkout <branch> -- <path>`).
    pub fn checkout_path_from(&self, branch: &str, path: &Path) -> Result<(), GitError> {
        let contents = self.read_on(branch, path)?;

        let destination = self.resolve(path);
        if let Some(parent) = destination.parent() {
            std::fs::create_dir_all(parent).map_err(|source| GitError::WriteFile {
                path: destination.clone(),
                source,
            })?;
        }
        std::fs::write(&destination, &contents).map_err(|source| GitError::WriteFile {
            path: destination.clone(),
            source,
        })?;

        self.add_path(path)?;
        tracing::debug!("materialized {} from {}", path.display(), branch);
        Ok(())
    }

    /// Contents of `path` in the tip of `branch`.
    pub fn read_on(&self, branch: &str, path: &Path) -> Result<Vec<u8>, GitError> {
        let tree = self
            .repo
            .find_branch(branch, BranchType::Local)
            .and_then(|b| b.get().peel_to_tree())
            .map_err(|_| GitError::BranchNotFound(branch.to_string()))?;
        let not_found = || GitError::PathNotFound {
            branch: branch.to_string(),
            path: path.to_path_buf(),
        };
        let blob = tree
            .get_path(path)
            .and_then(|entry| entry.to_object(&self.repo))
            .and_then(|object| object.peel_to_blob())
            .map_err(|_| not_found())?;
        Ok(blob.content().to_vec())
    }

    /// Delete the working-tree copy of `path` if it is byte-identical to the
    /// file on `branch`. Returns whether anything was removed.
    ///
    /// A modified copy is kept so the next checkout refuses to clobber it.
    pub fn discard_unchanged_copy(&self, branch: &str, path: &Path) -> Result<bool, GitError> {
        let destination = self.resolve(path);
        let Ok(on_disk) = std::fs::read(&destination) else {
            return Ok(false);
        };
        let on_branch = match self.read_on(branch, path) {
            Ok(contents) => contents,
            Err(GitError::PathNotFound { .. }) => return Ok(false),
            Err(err) => return Err(err),
        };
        if on_disk != on_branch {
            return Ok(false);
        }
        std::fs::remove_file(&destination).map_err(|source| GitError::WriteFile {
            path: destination.clone(),
            source,
        })?;
        Ok(true)
    }

    /// Reset the whole index to the HEAD tree (`git reset`), keeping the
    /// working tree untouched.
    pub fn reset_index(&self) -> Result<(), GitError> {
        let tree = self
            .repo
            .head()
            .and_then(|head| head.peel_to_tree())
            .map_err(GitError::Head)?;
        let mut index = self.repo.index().map_err(GitError::Index)?;
        index.read_tree(&tree).map_err(GitError::Index)?;
        index.write().map_err(GitError::Index)
    }

    /// Stage a repository-relative path.
    pub fn add_path(&self, path: &Path) -> Result<(), GitError> {
        let mut index = self.repo.index().map_err(GitError::Index)?;
        index.add_path(path).map_err(GitError::Index)?;
        index.write().map_err(GitError::Index)
    }

    /// Commit the index on top of HEAD using the configured identity.
    pub fn commit(&self, message: &str) -> Result<Oid, GitError> {
        let signature = self.repo.signature().map_err(GitError::Signature)?;
        self.commit_as(&signature, message)
    }

    pub(crate) fn commit_as(&self, signature: &Signature, message: &str) -> Result<Oid, GitError> {
        let parent = self
            .repo
            .head()
            .and_then(|head| head.peel_to_commit())
            .map_err(GitError::Head)?;
        let mut index = self.repo.index().map_err(GitError::Index)?;
        let tree_id = index.write_tree().map_err(GitError::Index)?;
        let tree = self.repo.find_tree(tree_id).map_err(GitError::Commit)?;

        self.repo
            .commit(
                Some("HEAD"),
                signature,
                signature,
                message,
                &tree,
                &[&parent],
            )
            .map_err(GitError::Commit)
    }
}

// Read-only queries used to check publish results.
#[cfg(test)]
impl Workspace {
    /// Whether `path` is tracked in the tip of `branch`.
    pub fn is_tracked_on(&self, branch: &str, path: &Path) -> Result<bool, GitError> {
        let tree = self
            .repo
            .find_branch(branch, BranchType::Local)
            .and_then(|b| b.get().peel_to_tree())
            .map_err(|_| GitError::BranchNotFound(branch.to_string()))?;
        Ok(tree.get_path(path).is_ok())
    }

    /// Number of commits reachable from the tip of `branch`.
    pub fn commit_count(&self, branch: &str) -> Result<usize, GitError> {
        let tip = self
            .repo
            .find_branch(branch, BranchType::Local)
            .map_err(|_| GitError::BranchNotFound(branch.to_string()))?
            .get()
            .peel_to_commit()
            .map_err(GitError::Head)?;
        let mut walk = self.repo.revwalk().map_err(GitError::Head)?;
        walk.push(tip.id()).map_err(GitError::Head)?;
        Ok(walk.count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::publish::fixture::Fixture;

    #[test]
    fn test_current_branch_after_fixture() {
        let fixture = Fixture::new("# Hello\n");
        let workspace = fixture.workspace();
        assert_eq!(workspace.current_branch().as_deref(), Some("master"));
    }

    #[test]
    fn test_checkout_branch_switches_tree() {
        let fixture = Fixture::new("# Hello\n");
        let workspace = fixture.workspace();

        workspace.checkout_branch("gh-pages").unwrap();
        assert_eq!(workspace.current_branch().as_deref(), Some("gh-pages"));
        assert!(fixture.path("index.html").exists());
        assert!(!fixture.path("README.md").exists());

        workspace.checkout_branch("master").unwrap();
        assert!(fixture.path("README.md").exists());
        assert!(!fixture.path("index.html").exists());
    }

    #[test]
    fn test_checkout_missing_branch() {
        let fixture = Fixture::new("# Hello\n");
        let err = fixture.workspace().checkout_branch("nope").unwrap_err();
        assert!(matches!(err, GitError::BranchNotFound(name) if name == "nope"));
    }

    #[test]
    fn test_checkout_path_from_other_branch() {
        let fixture = Fixture::new("# From master\n");
        let workspace = fixture.workspace();
        workspace.checkout_branch("gh-pages").unwrap();

        workspace
            .checkout_path_from("master", Path::new("README.md"))
            .unwrap();

        assert_eq!(workspace.current_branch().as_deref(), Some("gh-pages"));
        assert_eq!(fixture.read("README.md"), "# From master\n");
    }

    #[test]
    fn test_checkout_missing_path() {
        let fixture = Fixture::new("# Hello\n");
        let err = fixture
            .workspace()
            .checkout_path_from("master", Path::new("NOPE.md"))
            .unwrap_err();
        assert!(matches!(err, GitError::PathNotFound { .. }));
    }

    #[test]
    fn test_reset_index_unstages_everything() {
        let fixture = Fixture::new("# Hello\n");
        let workspace = fixture.workspace();
        workspace.checkout_branch("gh-pages").unwrap();
        workspace
            .checkout_path_from("master", Path::new("README.md"))
            .unwrap();

        workspace.reset_index().unwrap();
        let oid = workspace.commit("empty change").unwrap();

        assert!(!workspace.is_tracked_on("gh-pages", Path::new("README.md")).unwrap());
        assert!(!oid.is_zero());
        // reset leaves the working tree alone
        assert!(fixture.path("README.md").exists());
    }

    #[test]
    fn test_add_and_commit() {
        let fixture = Fixture::new("# Hello\n");
        let workspace = fixture.workspace();
        workspace.checkout_branch("gh-pages").unwrap();
        std::fs::write(fixture.path("index.html"), "<p>new</p>").unwrap();

        workspace.add_path(Path::new("index.html")).unwrap();
        workspace.commit("update page").unwrap();

        assert_eq!(
            workspace.read_on("gh-pages", Path::new("index.html")).unwrap(),
            b"<p>new</p>"
        );
        assert_eq!(workspace.commit_count("gh-pages").unwrap(), 2);
    }
}
