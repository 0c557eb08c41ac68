//! Outline renderer — draws a projection as an indented text tree.
//!
//! Walks the `DiagramGraph` from each root in emission order. Used by the CLI
//! preview and by snapshot tests; the layout surface itself is external.

use std::collections::HashSet;

use crate::diagram::graph::DiagramGraph;
use crate::diagram::types::Projection;
use crate::renderers::charset::{CharSet, TreeGlyphs};

#[derive(Debug, Clone, Default)]
pub struct OutlineOptions {
    pub charset: CharSet,
    /// Append `[id]` after each label.
    pub show_ids: bool,
    /// Append `(width×height)` after each label.
    pub show_sizes: bool,
    /// Mark this domain id as selected.
    pub selected: Option<String>,
}

/// Render `projection` as text. An empty projection renders as an empty string.
pub fn render_outline(projection: &Projection, options: &OutlineOptions) -> String {
    let graph = DiagramGraph::from_projection(projection);
    let glyphs = TreeGlyphs::for_charset(options.charset);
    let mut out = String::new();
    let mut visited = HashSet::new();

    let mut roots = graph.roots();
    // A duplicate id can point a child back at the root and leave no root at all.
    if roots.is_empty() {
        roots.extend(projection.root_id().map(str::to_string));
    }
    for root in roots {
        write_line(&mut out, &graph, &root, "", options, &glyphs);
        visited.insert(root.clone());
        write_children(&mut out, &graph, &root, "", options, &glyphs, &mut visited);
    }
    out
}

fn write_children(
    out: &mut String,
    graph: &DiagramGraph,
    id: &str,
    prefix: &str,
    options: &OutlineOptions,
    glyphs: &TreeGlyphs,
    visited: &mut HashSet<String>,
) {
    let children = graph.children(id);
    let count = children.len();
    for (i, child) in children.iter().enumerate() {
        let is_last = i + 1 == count;
        let branch = if is_last { glyphs.last } else { glyphs.branch };
        write_line(out, graph, child, &format!("{}{}", prefix, branch), options, glyphs);

        // A node reached twice (collapsed duplicate id) is drawn but not expanded again.
        if !visited.insert(child.clone()) {
            continue;
        }
        let next = format!("{}{}", prefix, if is_last { glyphs.blank } else { glyphs.pipe });
        write_children(out, graph, child, &next, options, glyphs, visited);
    }
}

fn write_line(
    out: &mut String,
    graph: &DiagramGraph,
    id: &str,
    prefix: &str,
    options: &OutlineOptions,
    glyphs: &TreeGlyphs,
) {
    let Some(node) = graph.node(id) else {
        return;
    };
    out.push_str(prefix);
    out.push_str(&node.text);
    if options.show_ids {
        out.push_str(&format!(" [{}]", node.id));
    }
    if options.show_sizes {
        let times = match options.charset {
            CharSet::Unicode => '×',
            CharSet::Ascii => 'x',
        };
        out.push_str(&format!(" ({}{}{})", node.width, times, node.height));
    }
    if options.selected.as_deref() == Some(node.id.as_str()) {
        out.push_str(glyphs.selected);
    }
    out.push('\n');
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::config::ProjectionConfig;
    use crate::diagram::{Direction, project};
    use crate::hierarchy::HierarchicalNode;

    fn sample() -> Projection {
        let tree = Arc::new(HierarchicalNode::new("root", "Root Topic").with_children(vec![
            HierarchicalNode::new("a", "Sub A").with_children(vec![
                HierarchicalNode::new("a1", "Leaf 1"),
                HierarchicalNode::new("a2", "Leaf 2"),
            ]),
            HierarchicalNode::new("b", "Sub B").with_children(vec![HierarchicalNode::new("b1", "Leaf 3")]),
        ]));
        project(Some(&tree), Direction::LR, &ProjectionConfig::default())
    }

    #[test]
    fn test_unicode_outline() {
        let text = render_outline(&sample(), &OutlineOptions::default());
        let expected = "\
Root Topic
├── Sub A
│   ├── Leaf 1
│   └── Leaf 2
└── Sub B
    └── Leaf 3
";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_ascii_outline_with_ids() {
        let options = OutlineOptions {
            charset: CharSet::Ascii,
            show_ids: true,
            ..OutlineOptions::default()
        };
        let text = render_outline(&sample(), &options);
        let expected = "\
Root Topic [root]
|-- Sub A [a]
|   |-- Leaf 1 [a1]
|   `-- Leaf 2 [a2]
`-- Sub B [b]
    `-- Leaf 3 [b1]
";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_sizes_and_selection_marker() {
        let options = OutlineOptions {
            charset: CharSet::Ascii,
            show_sizes: true,
            selected: Some("a2".into()),
            ..OutlineOptions::default()
        };
        let text = render_outline(&sample(), &options);
        assert!(text.starts_with("Root Topic (100x50)\n"));
        assert!(text.contains("`-- Leaf 2 (100x50) <\n"));
        assert_eq!(text.matches(" <").count(), 1);
    }

    #[test]
    fn test_empty_projection_renders_nothing() {
        assert_eq!(render_outline(&Projection::default(), &OutlineOptions::default()), "");
    }

    #[test]
    fn test_child_reusing_root_id_still_renders() {
        let tree = Arc::new(HierarchicalNode::new("root", "Root").with_children(vec![
            HierarchicalNode::new("x", "X").with_children(vec![HierarchicalNode::new("root", "Again")]),
        ]));
        let p = project(Some(&tree), Direction::LR, &ProjectionConfig::default());
        assert_eq!(p.nodes.len(), 3);
        let options = OutlineOptions {
            charset: CharSet::Ascii,
            ..OutlineOptions::default()
        };
        assert_eq!(render_outline(&p, &options), "Root\n`-- X\n    `-- Root\n");
    }

    #[test]
    fn test_shared_child_not_expanded_twice() {
        let tree = Arc::new(HierarchicalNode::new("r", "R").with_children(vec![
            HierarchicalNode::new("x", "X").with_children(vec![
                HierarchicalNode::new("y", "Y").with_children(vec![HierarchicalNode::new("z", "Z")]),
            ]),
            HierarchicalNode::new("w", "W").with_children(vec![HierarchicalNode::new("y", "Y2")]),
        ]));
        let p = project(Some(&tree), Direction::LR, &ProjectionConfig::default());
        let options = OutlineOptions {
            charset: CharSet::Ascii,
            ..OutlineOptions::default()
        };
        let text = render_outline(&p, &options);
        assert_eq!(text.matches("Z").count(), 1);
        assert_eq!(text.matches("Y").count(), 2);
    }
}
