//! Throwaway repositories for publish tests.
//!
//! Each fixture holds a `master` branch with a committed `README.md` and an
//! unrelated `gh-pages` branch holding an old `index.html`. HEAD starts on
//! `master` with a clean working tree.

use std::path::{Path, PathBuf};

use git2::{Repository, RepositoryInitOptions, Signature};
use tempfile::TempDir;

use crate::git::Workspace;

pub(crate) struct Fixture {
    dir: TempDir,
}

impl Fixture {
    pub fn new(readme: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let mut options = RepositoryInitOptions::new();
        options.initial_head("master");
        let repo = Repository::init_opts(dir.path(), &options).unwrap();

        let mut config = repo.config().unwrap();
        config.set_str("user.name", "Pagecast Test").unwrap();
        config.set_str("user.email", "pagecast@example.com").unwrap();
        let signature = signature();

        // gh-pages: orphan branch built straight from a tree
        let blob = repo.blob(b"<p>old page</p>\n").unwrap();
        let mut builder = repo.treebuilder(None).unwrap();
        builder.insert("index.html", blob, 0o100644).unwrap();
        let pages_tree = repo.find_tree(builder.write().unwrap()).unwrap();
        repo.commit(
            Some("refs/heads/gh-pages"),
            &signature,
            &signature,
            "Initial page",
            &pages_tree,
            &[],
        )
        .unwrap();

        // master: README committed through the index
        std::fs::write(dir.path().join("README.md"), readme).unwrap();
        let mut index = repo.index().unwrap();
        index.add_path(Path::new("README.md")).unwrap();
        index.write().unwrap();
        let main_tree = repo.find_tree(index.write_tree().unwrap()).unwrap();
        repo.commit(
            Some("HEAD"),
            &signature,
            &signature,
            "Initial commit",
            &main_tree,
            &[],
        )
        .unwrap();

        Self { dir }
    }

    /// A fresh handle on the fixture repository.
    pub fn workspace(&self) -> Workspace {
        Workspace::from_repository(Repository::open(self.dir.path()).unwrap()).unwrap()
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    pub fn read(&self, relative: &str) -> String {
        std::fs::read_to_string(self.path(relative)).unwrap()
    }

    pub fn write(&self, relative: &str, contents: &str) {
        std::fs::write(self.path(relative), contents).unwrap();
    }

    /// Commit new contents for a file on the checked-out main branch.
    pub fn commit_on_main(&self, relative: &str, contents: &str) {
        self.write(relative, contents);
        let workspace = self.workspace();
        workspace.add_path(Path::new(relative)).unwrap();
        workspace
            .commit_as(&signature(), &format!("Update {relative}"))
            .unwrap();
    }
}

fn signature() -> Signature<'static> {
    Signature::now("Pagecast Test", "pagecast@example.com").unwrap()
}
