use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use folio_types::{PageId, ROOT_PAGE_ID};

use crate::error::{TreeError, TreeResult};
use crate::index::{Ancestor, TreeIndex};

/// A page in the hierarchy.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageNode {
    pub title: String,
    #[serde(default)]
    pub children: Vec<PageId>,
}

impl PageNode {
    pub fn new(title: impl Into<String>, children: Vec<PageId>) -> Self {
        Self {
            title: title.into(),
            children,
        }
    }

    pub fn leaf(title: impl Into<String>) -> Self {
        Self::new(title, Vec::new())
    }
}

/// Forward-linked page hierarchy: each node lists its children.
///
/// Serializes as a flat map from page id to node, rooted at the reserved
/// `"root"` id. The tree is supplied by the editing surface; this crate only
/// reads it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageTree {
    nodes: BTreeMap<PageId, PageNode>,
}

impl PageTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a tree from slash-separated page keys and their titles.
    ///
    /// A key's direct children are the keys with exactly one extra segment
    /// (`guide` -> `guide/install`). Keys without a `/` become children of
    /// the root. A nested key whose parent key is absent is kept as a node
    /// but is not linked into the hierarchy. Children are ordered by key.
    pub fn from_pages<I, K, T>(pages: I) -> TreeResult<Self>
    where
        I: IntoIterator<Item = (K, T)>,
        K: Into<String>,
        T: Into<String>,
    {
        let mut nodes: BTreeMap<PageId, PageNode> = BTreeMap::new();
        for (key, title) in pages {
            let key = key.into();
            if key == ROOT_PAGE_ID {
                return Err(TreeError::ReservedId(key));
            }
            let id = PageId::new(key.clone()).map_err(|_| TreeError::InvalidKey(key))?;
            nodes.insert(id, PageNode::leaf(title));
        }

        let mut root_children = Vec::new();
        let mut links: Vec<(PageId, PageId)> = Vec::new();
        for id in nodes.keys() {
            match id.as_str().rsplit_once('/') {
                None => root_children.push(id.clone()),
                Some((parent, _)) => {
                    if let Some((parent_id, _)) = nodes.get_key_value(parent) {
                        links.push((parent_id.clone(), id.clone()));
                    }
                }
            }
        }
        for (parent, child) in links {
            if let Some(node) = nodes.get_mut(&parent) {
                node.children.push(child);
            }
        }

        nodes.insert(PageId::root(), PageNode::new("Root", root_children));
        Ok(Self { nodes })
    }

    /// Insert or replace a node.
    pub fn insert(&mut self, id: PageId, node: PageNode) -> Option<PageNode> {
        self.nodes.insert(id, node)
    }

    pub fn get(&self, id: &str) -> Option<&PageNode> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn root(&self) -> Option<&PageNode> {
        self.nodes.get(ROOT_PAGE_ID)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PageId, &PageNode)> {
        self.nodes.iter()
    }

    /// Build the reverse (child -> parent) index for this snapshot.
    pub fn index(&self) -> TreeResult<TreeIndex<'_>> {
        TreeIndex::build(self)
    }

    /// Ancestors of `page_id`, root-first, excluding the root and the page.
    ///
    /// Builds a fresh index; use [`PageTree::index`] when resolving many pages
    /// against the same snapshot.
    pub fn ancestors(&self, page_id: &str) -> TreeResult<Vec<Ancestor>> {
        self.index()?.ancestors(page_id)
    }

    /// Check every structural invariant of the tree.
    ///
    /// - the reserved root exists,
    /// - every child reference resolves,
    /// - no page has two parents,
    /// - no page is its own ancestor.
    pub fn validate(&self) -> TreeResult<()> {
        if self.root().is_none() {
            return Err(TreeError::MissingRoot);
        }
        let index = self.index()?;
        index.check_acyclic()
    }
}
