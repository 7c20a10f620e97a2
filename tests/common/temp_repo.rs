//! Temporary git repositories for integration tests

#![allow(dead_code)]

use git2::{Oid, Repository, Signature};
use stackpr::repo::GitRepository;
use std::path::Path;
use tempfile::TempDir;

/// A scratch repository whose `origin/main` points at a base commit
pub struct TempGitRepo {
    pub dir: TempDir,
    pub repo: Repository,
    base: Oid,
}

impl TempGitRepo {
    /// Create a repository on branch `feature` with one commit shared with trunk
    pub fn new() -> Self {
        let dir = TempDir::new().expect("create temp dir");
        let repo = Repository::init(dir.path()).expect("init repo");
        repo.set_head("refs/heads/feature").expect("set HEAD");

        let mut this = Self {
            dir,
            repo,
            base: Oid::zero(),
        };
        this.base = this.commit("Initial commit");
        this.repo
            .reference("refs/remotes/origin/main", this.base, true, "test fixture")
            .expect("create origin/main");
        this
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Commit the current index on top of HEAD with `message`
    pub fn commit(&self, message: &str) -> Oid {
        let sig = Signature::now("Test", "test@example.com").expect("signature");
        let tree_id = self.repo.index().unwrap().write_tree().unwrap();
        let tree = self.repo.find_tree(tree_id).unwrap();
        let parent = self
            .repo
            .head()
            .ok()
            .and_then(|h| h.target())
            .map(|oid| self.repo.find_commit(oid).unwrap());
        let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();
        self.repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .expect("commit")
    }

    /// Add a bare repository as remote `origin` and return its directory
    pub fn add_bare_origin(&self) -> TempDir {
        let bare = TempDir::new().expect("create bare dir");
        Repository::init_bare(bare.path()).expect("init bare");
        self.repo
            .remote("origin", bare.path().to_str().expect("utf-8 path"))
            .expect("add remote");
        bare
    }

    pub fn open(&self) -> GitRepository {
        GitRepository::open(self.path()).expect("open repo")
    }
}
