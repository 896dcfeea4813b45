//! Reverse (child -> parent) index over a page tree snapshot.
//!
//! The tree is stored parent -> children, so finding a page's parent means
//! locating the node whose children list contains it. [`TreeIndex`] does that
//! scan once per snapshot and answers every later parent lookup from a map.
//! The index borrows the tree, so it cannot outlive or drift from the
//! snapshot it was built from.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use folio_types::PageId;

use crate::error::{TreeError, TreeResult};
use crate::tree::PageTree;

/// One entry of a breadcrumb trail.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ancestor {
    pub id: PageId,
    pub title: String,
}

/// Parent lookup for one [`PageTree`] snapshot.
#[derive(Debug)]
pub struct TreeIndex<'a> {
    tree: &'a PageTree,
    parents: HashMap<&'a str, &'a PageId>,
}

impl<'a> TreeIndex<'a> {
    /// Scan the tree once and record each page's parent.
    ///
    /// Fails if a child reference does not resolve or a page is listed under
    /// two different parents.
    pub fn build(tree: &'a PageTree) -> TreeResult<Self> {
        let mut parents: HashMap<&'a str, &'a PageId> = HashMap::new();
        for (parent, node) in tree.iter() {
            for child in &node.children {
                if !tree.contains(child.as_str()) {
                    return Err(TreeError::DanglingChild {
                        parent: parent.clone(),
                        child: child.clone(),
                    });
                }
                if let Some(existing) = parents.insert(child.as_str(), parent) {
                    if existing != parent {
                        return Err(TreeError::MultipleParents {
                            child: child.clone(),
                            first: existing.clone(),
                            second: parent.clone(),
                        });
                    }
                }
            }
        }
        debug!(nodes = tree.len(), links = parents.len(), "tree index built");
        Ok(Self { tree, parents })
    }

    /// The parent of `id`, if it has one (the root counts as a parent).
    pub fn parent_of(&self, id: &str) -> Option<&'a PageId> {
        self.parents.get(id).copied()
    }

    /// Ancestors of `page_id` ordered from the top-level page down to the
    /// immediate parent.
    ///
    /// The reserved root and the page itself are never included. A page with
    /// no parent, or one not in the tree at all, has no ancestors.
    pub fn ancestors(&self, page_id: &str) -> TreeResult<Vec<Ancestor>> {
        let mut chain = Vec::new();
        let mut visited: HashSet<&str> = HashSet::new();
        visited.insert(page_id);

        let mut current = page_id;
        while let Some(parent) = self.parent_of(current) {
            if parent.is_root() {
                break;
            }
            if !visited.insert(parent.as_str()) {
                return Err(TreeError::CycleDetected(parent.clone()));
            }
            // Parents come from the tree's own keys, so the lookup resolves.
            if let Some(node) = self.tree.get(parent.as_str()) {
                chain.push(Ancestor {
                    id: parent.clone(),
                    title: node.title.clone(),
                });
            }
            current = parent.as_str();
        }

        chain.reverse();
        Ok(chain)
    }

    /// Fail if any page is its own ancestor.
    pub(crate) fn check_acyclic(&self) -> TreeResult<()> {
        if let Some(parent) = self.parent_of(folio_types::ROOT_PAGE_ID) {
            return Err(TreeError::CycleDetected(parent.clone()));
        }
        let mut acyclic: HashSet<&str> = HashSet::new();
        for (id, _) in self.tree.iter() {
            let mut path: Vec<&str> = Vec::new();
            let mut on_path: HashSet<&str> = HashSet::new();
            let mut current = id.as_str();
            loop {
                if acyclic.contains(current) {
                    break;
                }
                if !on_path.insert(current) {
                    return Err(TreeError::CycleDetected(id.clone()));
                }
                path.push(current);
                match self.parent_of(current) {
                    Some(parent) => current = parent.as_str(),
                    None => break,
                }
            }
            acyclic.extend(path);
        }
        Ok(())
    }
}

/// Ancestors of `page_id` in `tree`, building the index for a single query.
pub fn ancestors(page_id: &str, tree: &PageTree) -> TreeResult<Vec<Ancestor>> {
    TreeIndex::build(tree)?.ancestors(page_id)
}
