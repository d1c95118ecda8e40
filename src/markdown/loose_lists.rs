//! Loose list splitting
//!
//! The engine keeps items separated by blank lines inside one "loose" list.
//! An editor shows those as visually separate lists, so this second pass
//! splits each top-level list at every item that has a blank original line
//! directly above its first line.
//!
//! Ordered runs continue the numbering of the runs before them. A list that
//! forms a single run is returned untouched, id included. Each run of a split
//! list gets its own `tight` flag: it is loose only when blank lines separate
//! its items or the direct children of one of its items.

use log::debug;

use super::converter::ParseContext;
use super::node::{MarkdownNode, NodeLocation};

/// Split the loose top-level lists of a converted document.
pub(crate) fn split_loose_lists(ast: MarkdownNode, ctx: &mut ParseContext<'_>) -> MarkdownNode {
    let MarkdownNode::Document { id, children } = ast else {
        return ast;
    };

    let mut blocks = Vec::with_capacity(children.len());
    for child in children {
        if matches!(child, MarkdownNode::List { .. }) {
            blocks.extend(split_list(child, ctx));
        } else {
            blocks.push(child);
        }
    }

    MarkdownNode::Document {
        id,
        children: blocks,
    }
}

/// Whether an item starts a new run: a blank original line sits right above it.
fn starts_new_run(item: &MarkdownNode, ctx: &ParseContext<'_>) -> bool {
    item.id()
        .and_then(|id| ctx.location(id))
        .is_some_and(|location| location.start > 1 && ctx.source().is_blank(location.start - 1))
}

/// Whether a blank original line sits between any two consecutive nodes.
fn has_blank_between(nodes: &[MarkdownNode], ctx: &ParseContext<'_>) -> bool {
    let locations: Vec<NodeLocation> = nodes
        .iter()
        .filter_map(|node| node.id().and_then(|id| ctx.location(id)))
        .collect();
    locations.windows(2).any(|pair| {
        (pair[0].end + 1..pair[1].start).any(|line| ctx.source().is_blank(line))
    })
}

fn run_is_tight(run: &[MarkdownNode], ctx: &ParseContext<'_>) -> bool {
    !has_blank_between(run, ctx) && !run.iter().any(|item| has_blank_between(item.children(), ctx))
}

fn split_list(list: MarkdownNode, ctx: &mut ParseContext<'_>) -> Vec<MarkdownNode> {
    let MarkdownNode::List {
        id,
        ordered,
        start,
        tight,
        children,
    } = list
    else {
        return vec![list];
    };

    let mut runs: Vec<Vec<MarkdownNode>> = Vec::new();
    for (index, item) in children.into_iter().enumerate() {
        if index == 0 || starts_new_run(&item, ctx) {
            runs.push(Vec::new());
        }
        if let Some(run) = runs.last_mut() {
            run.push(item);
        }
    }

    if runs.len() <= 1 {
        return vec![MarkdownNode::List {
            id,
            ordered,
            start,
            tight,
            children: runs.into_iter().flatten().collect(),
        }];
    }

    debug!("Splitting loose list {} into {} lists", id, runs.len());
    let original_location = ctx.location(&id);
    ctx.remove_location(&id);

    let mut items_before: u32 = 0;
    let mut lists = Vec::with_capacity(runs.len());
    for run in runs {
        let run_start = if ordered {
            start.saturating_add(items_before)
        } else {
            start
        };
        items_before = items_before.saturating_add(run.len() as u32);

        let first = run.first().and_then(|item| item.id()).and_then(|id| ctx.location(id));
        let last = run.last().and_then(|item| item.id()).and_then(|id| ctx.location(id));
        let location = match (first, last) {
            (Some(first), Some(last)) => Some(NodeLocation::new(first.start, last.end)),
            _ => original_location,
        };

        let run_id = ctx.next_id();
        if let Some(location) = location {
            ctx.set_location(run_id.clone(), location);
        }
        lists.push(MarkdownNode::List {
            id: run_id,
            ordered,
            start: run_start,
            tight: run_is_tight(&run, ctx),
            children: run,
        });
    }
    lists
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
