//! Glyph sets for the text outline.

// ─── CharSet ─────────────────────────────────────────────────────────────────

/// Which character set to draw tree branches with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CharSet {
    #[default]
    Unicode,
    Ascii,
}

// ─── TreeGlyphs ──────────────────────────────────────────────────────────────

/// Branch prefixes, each four columns wide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeGlyphs {
    pub branch: &'static str,   // ├── child with later siblings
    pub last: &'static str,     // └── last child
    pub pipe: &'static str,     // │   ancestor has later siblings
    pub blank: &'static str,    //     ancestor was the last child
    pub selected: &'static str, // marker after the selected node
}

impl TreeGlyphs {
    pub fn unicode() -> Self {
        Self {
            branch: "├── ",
            last: "└── ",
            pipe: "│   ",
            blank: "    ",
            selected: " ◄",
        }
    }

    pub fn ascii() -> Self {
        Self {
            branch: "|-- ",
            last: "`-- ",
            pipe: "|   ",
            blank: "    ",
            selected: " <",
        }
    }

    pub fn for_charset(cs: CharSet) -> Self {
        match cs {
            CharSet::Unicode => Self::unicode(),
            CharSet::Ascii => Self::ascii(),
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
