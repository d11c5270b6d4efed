//! Page tree model
//!
//! One recursive walk over any [`TreeNode`] serves every consumer: the
//! sidebar navigation, the parent-page picker and id lookups. Lookups always
//! search all descendants.

use std::collections::{HashMap, HashSet};

use crate::models::Page;

/// Error types for tree operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    /// Parent links form a cycle; the listed pages are unreachable from a root
    #[error("Parent links form a cycle through pages {0:?}")]
    Cycle(Vec<i64>),

    /// No node with this id
    #[error("Page not found: {0}")]
    NotFound(i64),

    /// Reparenting would make a page its own ancestor
    #[error("Page {page} cannot be placed under {parent}")]
    InvalidParent { page: i64, parent: i64 },
}

/// A node with an id and ordered children
pub trait TreeNode: Sized {
    fn node_id(&self) -> i64;
    fn children(&self) -> &[Self];
}

impl TreeNode for Page {
    fn node_id(&self) -> i64 {
        self.id
    }

    fn children(&self) -> &[Self] {
        &self.children
    }
}

/// A node reached during a walk, with its depth (roots are depth 0)
#[derive(Debug)]
pub struct Visit<'a, N> {
    pub node: &'a N,
    pub depth: usize,
}

/// Pre-order walk that only descends into nodes accepted by `descend`.
///
/// Children are visited before the parent's next sibling.
pub fn walk<'a, N, F>(roots: &'a [N], mut descend: F) -> Vec<Visit<'a, N>>
where
    N: TreeNode,
    F: FnMut(&N) -> bool,
{
    let mut visits = Vec::new();
    let mut stack: Vec<(&'a N, usize)> = roots.iter().rev().map(|n| (n, 0)).collect();

    while let Some((node, depth)) = stack.pop() {
        visits.push(Visit { node, depth });
        if descend(node) {
            stack.extend(node.children().iter().rev().map(|child| (child, depth + 1)));
        }
    }

    visits
}

/// Full pre-order walk
pub fn pre_order<N: TreeNode>(roots: &[N]) -> Vec<Visit<'_, N>> {
    walk(roots, |_| true)
}

/// Find a node anywhere in the tree
pub fn find_by_id<N: TreeNode>(roots: &[N], id: i64) -> Option<&N> {
    pre_order(roots)
        .into_iter()
        .map(|visit| visit.node)
        .find(|node| node.node_id() == id)
}

/// Ids from the root down to (and including) `id`
pub fn path_to<N: TreeNode>(roots: &[N], id: i64) -> Option<Vec<i64>> {
    fn search<N: TreeNode>(nodes: &[N], id: i64, path: &mut Vec<i64>) -> bool {
        for node in nodes {
            path.push(node.node_id());
            if node.node_id() == id || search(node.children(), id, path) {
                return true;
            }
            path.pop();
        }
        false
    }

    let mut path = Vec::new();
    search(roots, id, &mut path).then_some(path)
}

/// Reject a parent that is the page itself or one of its descendants
pub fn validate_parent<N: TreeNode>(roots: &[N], page: i64, parent: i64) -> Result<(), TreeError> {
    if page == parent {
        return Err(TreeError::InvalidParent { page, parent });
    }
    if let Some(node) = find_by_id(roots, page) {
        if find_by_id(node.children(), parent).is_some() {
            return Err(TreeError::InvalidParent { page, parent });
        }
    }
    Ok(())
}

/// Build a render-ready tree from pages.
///
/// Accepts a flat list with parent ids, a pre-nested tree, or a mix: nested
/// children are flattened first, taking their parent from the nesting when
/// they carry none. Siblings are ordered by `nav_order`, then id. Pages whose
/// parent is unknown become roots.
pub fn build_tree(pages: Vec<Page>) -> Result<Vec<Page>, TreeError> {
    let mut flat = Vec::new();
    flatten(pages, None, &mut flat);

    let mut page_map: HashMap<i64, Page> = HashMap::new();
    for page in flat {
        page_map.insert(page.id, page);
    }

    let mut children_map: HashMap<Option<i64>, Vec<i64>> = HashMap::new();
    for (id, page) in &page_map {
        let parent = page.parent.filter(|p| page_map.contains_key(p));
        children_map.entry(parent).or_default().push(*id);
    }

    for children in children_map.values_mut() {
        children.sort_by_key(|id| (page_map[id].nav_order, *id));
    }

    fn build_subtree(
        parent: Option<i64>,
        page_map: &HashMap<i64, Page>,
        children_map: &HashMap<Option<i64>, Vec<i64>>,
        placed: &mut HashSet<i64>,
    ) -> Vec<Page> {
        let Some(child_ids) = children_map.get(&parent) else {
            return Vec::new();
        };
        child_ids
            .iter()
            .filter_map(|id| {
                if !placed.insert(*id) {
                    return None;
                }
                let page = page_map.get(id)?.clone();
                let children = build_subtree(Some(*id), page_map, children_map, placed);
                Some(page.with_children(children))
            })
            .collect()
    }

    let mut placed = HashSet::new();
    let roots = build_subtree(None, &page_map, &children_map, &mut placed);

    if placed.len() < page_map.len() {
        let mut cyclic: Vec<i64> = page_map
            .keys()
            .filter(|id| !placed.contains(id))
            .copied()
            .collect();
        cyclic.sort_unstable();
        return Err(TreeError::Cycle(cyclic));
    }

    Ok(roots)
}

fn flatten(pages: Vec<Page>, nested_parent: Option<i64>, out: &mut Vec<Page>) {
    for mut page in pages {
        if page.parent.is_none() {
            page.parent = nested_parent;
        }
        let children = std::mem::take(&mut page.children);
        let id = page.id;
        out.push(page);
        flatten(children, Some(id), out);
    }
}

/// One rendered line of the tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeRow {
    pub id: i64,
    pub title: String,
    pub depth: usize,
    /// `depth * indent_width`
    pub indent: u32,
    pub has_children: bool,
}

impl std::fmt::Display for TreeRow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let marker = if self.has_children { "+" } else { "-" };
        write!(
            f,
            "{:indent$}{} {} [{}]",
            "",
            marker,
            self.title,
            self.id,
            indent = self.depth * 2
        )
    }
}

fn row(visit: &Visit<'_, Page>, indent_width: u32) -> TreeRow {
    TreeRow {
        id: visit.node.id,
        title: visit.node.title.clone(),
        depth: visit.depth,
        indent: visit.depth as u32 * indent_width,
        has_children: visit.node.has_children(),
    }
}

/// Every page as a row, in pre-order
pub fn render_rows(roots: &[Page], indent_width: u32) -> Vec<TreeRow> {
    pre_order(roots)
        .iter()
        .map(|visit| row(visit, indent_width))
        .collect()
}

/// Expand/collapse state of the sidebar navigation
#[derive(Debug, Clone, Default)]
pub struct NavState {
    expanded: HashSet<i64>,
}

/// What a click on a navigation row does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// Leaf selected: load its page data
    Load(i64),
    /// Branch selected: its expansion flag flipped
    Toggled { id: i64, expanded: bool },
}

impl NavState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_expanded(&self, id: i64) -> bool {
        self.expanded.contains(&id)
    }

    pub fn expand_all(&mut self, roots: &[Page]) {
        for visit in pre_order(roots) {
            if visit.node.has_children() {
                self.expanded.insert(visit.node.id);
            }
        }
    }

    /// Expand every ancestor of `id` so its row is visible
    pub fn reveal(&mut self, roots: &[Page], id: i64) -> Result<(), TreeError> {
        let path = path_to(roots, id).ok_or(TreeError::NotFound(id))?;
        self.expanded.extend(&path[..path.len() - 1]);
        Ok(())
    }

    /// Handle a click on the row for `id`
    pub fn select(&mut self, roots: &[Page], id: i64) -> Result<Selection, TreeError> {
        let node = find_by_id(roots, id).ok_or(TreeError::NotFound(id))?;
        if !node.has_children() {
            return Ok(Selection::Load(id));
        }
        let expanded = if self.expanded.remove(&id) {
            false
        } else {
            self.expanded.insert(id);
            true
        };
        Ok(Selection::Toggled { id, expanded })
    }

    /// Rows currently visible: children only show under expanded parents
    pub fn visible_rows(&self, roots: &[Page], indent_width: u32) -> Vec<TreeRow> {
        walk(roots, |node| self.expanded.contains(&node.id))
            .iter()
            .map(|visit| row(visit, indent_width))
            .collect()
    }
}
