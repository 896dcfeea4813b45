use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use colored::Colorize;
use serde_json::Value;
use walkdir::{DirEntry, WalkDir};

use folio_config::{AppendTarget, ConfigUpdate, JsonConfigFile};
use folio_diff::{inline_block_changes, render_block_diff, Block, BlockDiff, SegmentKind};
use folio_sdk::{AssetPath, DataProposal, PageTree, ProposalOverlay, Settings, Workspace};
use folio_sync::InMemoryProvider;
use folio_tree::render_paths;

use crate::cli::*;

pub async fn run_command(cli: Cli, settings: Settings) -> anyhow::Result<()> {
    let json = matches!(cli.format, OutputFormat::Json);
    match cli.command {
        Command::Diff(args) => cmd_diff(args, settings, json).await,
        Command::Ancestors(args) => cmd_ancestors(args, json),
        Command::Tree(args) => cmd_tree(args, json),
        Command::CheckTree(args) => cmd_check_tree(args),
        Command::ConfigAppend(args) => cmd_config_append(args),
    }
}

async fn cmd_diff(args: DiffArgs, settings: Settings, json: bool) -> anyhow::Result<()> {
    let current = read_file(&args.current)?;
    let proposed = read_file(&args.proposed)?;
    let name = args
        .proposed
        .file_name()
        .and_then(|n| n.to_str())
        .context("proposed file has no usable name")?;
    let path = AssetPath::new(name)?;

    // Stage both files in a scratch workspace so classification and the
    // overlay follow the same rules as an embedded editor.
    let provider = Arc::new(InMemoryProvider::new());
    provider.insert(&path, current);
    let workspace = Workspace::new(settings, provider);
    workspace.open(&path).await?;
    workspace.propose(&path, proposed)?;
    let overlay = workspace
        .overlay(&path)?
        .context("proposal was not recorded")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&overlay)?);
        return Ok(());
    }
    match &overlay {
        ProposalOverlay::Markup(diff) if args.markup => println!("{}", render_block_diff(diff)),
        ProposalOverlay::Markup(diff) => print!("{}", format_block_diff(diff, args.words)),
        ProposalOverlay::Data(data) => print!("{}", format_data_proposal(data)),
    }
    Ok(())
}

fn cmd_ancestors(args: AncestorsArgs, json: bool) -> anyhow::Result<()> {
    let tree = load_tree(&args.tree)?;
    let crumbs = tree.ancestors(&args.page)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&crumbs)?);
    } else if crumbs.is_empty() {
        println!("{} has no ancestors", args.page.bold());
    } else {
        let trail: Vec<String> = crumbs
            .iter()
            .map(|a| format!("{} {}", a.title.bold(), format!("({})", a.id).dimmed()))
            .collect();
        println!("{} › {}", trail.join(" › "), args.page.yellow());
    }
    Ok(())
}

fn cmd_tree(args: TreeArgs, json: bool) -> anyhow::Result<()> {
    let paths = collect_asset_paths(&args.dir, args.all)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&paths)?);
    } else if paths.is_empty() {
        println!("No assets under {}.", args.dir.display());
    } else {
        println!("{}", render_paths(&paths));
    }
    Ok(())
}

fn cmd_check_tree(args: CheckTreeArgs) -> anyhow::Result<()> {
    let tree = load_tree(&args.tree)?;
    tree.validate()?;
    println!(
        "{} Page tree is consistent ({} pages)",
        "✓".green().bold(),
        tree.len().saturating_sub(1)
    );
    Ok(())
}

fn cmd_config_append(args: ConfigAppendArgs) -> anyhow::Result<()> {
    let value = serde_json::from_str(&args.value).unwrap_or(Value::String(args.value.clone()));
    let default_content: Value =
        serde_json::from_str(&args.default).context("--default is not valid JSON")?;
    let file = JsonConfigFile {
        folder_path: args.folder,
        file_name: args.file,
        default_content,
        append_to: AppendTarget {
            path: args.path,
            value,
        },
    };

    let update = if args.dry_run {
        let existing = match fs::read_to_string(file.location(&args.root)) {
            Ok(text) => Some(text),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => return Err(e.into()),
        };
        let update = file.apply(existing.as_deref())?;
        println!("{}", update.document());
        update
    } else {
        file.install(&args.root)?
    };

    println!("{}", describe_update(&update, &file, &args.root, args.dry_run));
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> anyhow::Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn load_tree(path: &Path) -> anyhow::Result<PageTree> {
    let text = read_file(path)?;
    serde_json::from_str(&text).with_context(|| format!("{} is not a page tree", path.display()))
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0 && entry.file_name().to_string_lossy().starts_with('.')
}

/// Every file under `dir` as a `/`-separated path relative to it, sorted.
pub fn collect_asset_paths(dir: &Path, include_hidden: bool) -> anyhow::Result<Vec<String>> {
    let mut paths = Vec::new();
    let walker = WalkDir::new(dir)
        .into_iter()
        .filter_entry(|e| include_hidden || !is_hidden(e));
    for entry in walker {
        let entry = entry.with_context(|| format!("failed to walk {}", dir.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry.path().strip_prefix(dir).unwrap_or(entry.path());
        let parts: Vec<String> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        paths.push(parts.join("/"));
    }
    paths.sort();
    Ok(paths)
}

/// Summary line for a config append. Dry runs say what would happen.
pub fn describe_update(
    update: &ConfigUpdate,
    file: &JsonConfigFile,
    root: &Path,
    dry_run: bool,
) -> String {
    let target = file.append_to.path.yellow();
    let value = &file.append_to.value;
    let name = file.file_name.bold();
    match (update, dry_run) {
        (ConfigUpdate::Created(_), false) => format!(
            "{} Created {name} at {}",
            "✓".green().bold(),
            file.location(root).display()
        ),
        (ConfigUpdate::Created(_), true) => format!(
            "{} Would create {name} at {} (dry run, nothing written)",
            "→".cyan(),
            file.location(root).display()
        ),
        (ConfigUpdate::Updated(_), false) => {
            format!("{} Updated {name}: added {value} to {target}", "✓".green().bold())
        }
        (ConfigUpdate::Updated(_), true) => format!(
            "{} Would update {name}: add {value} to {target} (dry run, nothing written)",
            "→".cyan()
        ),
        (ConfigUpdate::Unchanged(_), _) => {
            format!("{} {name} already contains {value} in {target}", "⚠".yellow())
        }
    }
}

/// One line per block: `-` removed, `+` added, blank for unchanged.
pub fn format_block_diff(diff: &BlockDiff, words: bool) -> String {
    let mut out = String::new();
    let mut removed: Vec<&Block> = Vec::new();
    let mut added: Vec<&Block> = Vec::new();
    for segment in &diff.segments {
        match segment.kind {
            SegmentKind::Removed => removed.push(&segment.block),
            SegmentKind::Added => added.push(&segment.block),
            SegmentKind::Unchanged => {
                flush_run(&mut out, &mut removed, &mut added, words);
                out.push_str(&format!("  {}\n", one_line(segment.block.html()).dimmed()));
            }
        }
    }
    flush_run(&mut out, &mut removed, &mut added, words);

    let stats = diff.stats();
    out.push_str(&format!(
        "{} unchanged, {} added, {} removed\n",
        stats.unchanged,
        stats.added.to_string().green(),
        stats.removed.to_string().red()
    ));
    out
}

fn flush_run(out: &mut String, removed: &mut Vec<&Block>, added: &mut Vec<&Block>, words: bool) {
    if words {
        let paired = removed.len().min(added.len());
        for (old, new) in removed.iter().zip(added.iter()) {
            let line: String = inline_block_changes(old, new)
                .iter()
                .map(|c| match c.kind {
                    SegmentKind::Unchanged => c.text.normal().to_string(),
                    SegmentKind::Added => c.text.green().underline().to_string(),
                    SegmentKind::Removed => c.text.red().strikethrough().to_string(),
                })
                .collect();
            out.push_str(&format!("{} {line}\n", "~".yellow()));
        }
        removed.drain(..paired);
        added.drain(..paired);
    }
    for block in removed.drain(..) {
        out.push_str(&format!("{}\n", format!("- {}", one_line(block.html())).red()));
    }
    for block in added.drain(..) {
        out.push_str(&format!("{}\n", format!("+ {}", one_line(block.html())).green()));
    }
}

fn one_line(html: &str) -> String {
    html.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn format_data_proposal(data: &DataProposal) -> String {
    if data.is_identical() {
        return "No changes.\n".to_string();
    }
    let mut out = String::new();
    for line in data.current.lines() {
        out.push_str(&format!("{}\n", format!("- {line}").red()));
    }
    for line in data.proposed.lines() {
        out.push_str(&format!("{}\n", format!("+ {line}").green()));
    }
    out
}
