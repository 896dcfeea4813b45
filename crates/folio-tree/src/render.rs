//! ASCII tree rendering for asset listings.

use std::collections::BTreeMap;

const PAGE_SUFFIX: &str = ".html";

/// Render a list of asset paths as an ASCII tree.
///
/// A page `x.html` is the directory node for every asset under `x/`, so pages
/// and their sub-pages nest the way they do in the page tree. Pages are listed
/// before other files at each level; both groups are sorted.
///
/// Example output:
/// ```text
/// ├── guide.html
/// │   ├── faq.html
/// │   └── install.html
/// └── data
///     └── metrics.json
/// ```
pub fn render_paths<S: AsRef<str>>(paths: &[S]) -> String {
    let mut levels: BTreeMap<String, Vec<String>> = BTreeMap::new();

    let mut pages: Vec<&str> = Vec::new();
    let mut others: Vec<&str> = Vec::new();
    for path in paths {
        let clean = path.as_ref().trim_start_matches('/');
        if clean.is_empty() {
            continue;
        }
        if clean.ends_with(PAGE_SUFFIX) {
            pages.push(clean);
        } else {
            others.push(clean);
        }
    }
    pages.sort_unstable();
    others.sort_unstable();

    for page in pages {
        let key = page.strip_suffix(PAGE_SUFFIX).unwrap_or(page);
        let (parent, name) = split_parent(key);
        if !name.is_empty() {
            ensure_dirs(&mut levels, parent);
            push_unique(&mut levels, parent, format!("{name}{PAGE_SUFFIX}"));
        }
    }
    for other in others {
        let (parent, name) = split_parent(other);
        if !name.is_empty() {
            ensure_dirs(&mut levels, parent);
            push_unique(&mut levels, parent, name.to_string());
        }
    }

    let mut output = String::new();
    render_level(&mut output, &levels, "", "");
    output.trim().to_string()
}

/// List every directory on the way to `dir`, unless a page already stands
/// for it.
fn ensure_dirs(levels: &mut BTreeMap<String, Vec<String>>, dir: &str) {
    if dir.is_empty() {
        return;
    }
    let (parent, name) = split_parent(dir);
    ensure_dirs(levels, parent);
    let page = format!("{name}{PAGE_SUFFIX}");
    let siblings = levels.entry(parent.to_string()).or_default();
    if !siblings.iter().any(|s| s == name || *s == page) {
        siblings.push(name.to_string());
    }
}

fn push_unique(levels: &mut BTreeMap<String, Vec<String>>, parent: &str, name: String) {
    let siblings = levels.entry(parent.to_string()).or_default();
    if !siblings.contains(&name) {
        siblings.push(name);
    }
}

fn split_parent(path: &str) -> (&str, &str) {
    match path.rsplit_once('/') {
        Some((parent, name)) => (parent, name),
        None => ("", path),
    }
}

fn render_level(
    output: &mut String,
    levels: &BTreeMap<String, Vec<String>>,
    parent: &str,
    prefix: &str,
) {
    let Some(children) = levels.get(parent) else {
        return;
    };
    for (i, child) in children.iter().enumerate() {
        let is_last = i == children.len() - 1;
        let branch = if is_last { "└── " } else { "├── " };
        output.push_str(prefix);
        output.push_str(branch);
        output.push_str(child);
        output.push('\n');

        let name = child.strip_suffix(PAGE_SUFFIX).unwrap_or(child);
        let child_key = if parent.is_empty() {
            name.to_string()
        } else {
            format!("{parent}/{name}")
        };
        let continuation = if is_last { "    " } else { "│   " };
        render_level(output, levels, &child_key, &format!("{prefix}{continuation}"));
    }
}
