//! Block-level markdown model
//!
//! Parsing text into these blocks and printing them back is left to the
//! caller. The engine only inspects headings and link definitions; every
//! other block is carried through untouched.

use serde::{Deserialize, Serialize};

/// Source location of a node, 1-based
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub start_line: usize,
    pub start_column: usize,
    pub end_line: usize,
    pub end_column: usize,
}

/// A top-level block of a markdown document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Block {
    Heading(Heading),
    Definition(Definition),
    Paragraph(Paragraph),
    List(List),
    /// Any other block, kept as source text
    Raw { value: String },
}

impl Block {
    /// Paragraph holding a single emphasized text
    pub fn notice(text: impl Into<String>) -> Self {
        Block::Paragraph(Paragraph {
            children: vec![Inline::Emphasis {
                children: vec![Inline::text(text)],
            }],
        })
    }
}

/// An ATX or setext heading
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heading {
    pub depth: u8,
    pub children: Vec<Inline>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

impl Heading {
    /// Heading with a single text child
    pub fn text(depth: u8, text: impl Into<String>) -> Self {
        Self {
            depth,
            children: vec![Inline::text(text)],
            position: None,
        }
    }

    /// Attach a source position
    pub fn at(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    /// Text of the heading when its only child is a text node
    pub fn sole_text(&self) -> Option<&str> {
        match self.children.as_slice() {
            [Inline::Text { value }] => Some(value),
            _ => None,
        }
    }
}

/// A link reference definition, `[label]: url "title"`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Definition {
    pub identifier: String,
    pub label: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paragraph {
    pub children: Vec<Inline>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct List {
    pub ordered: bool,
    pub spread: bool,
    pub items: Vec<ListItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListItem {
    pub spread: bool,
    pub children: Vec<Block>,
}

/// Shortcut (`[x]`), collapsed (`[x][]`) or full (`[x][y]`) reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceType {
    Shortcut,
    Collapsed,
    Full,
}

/// Inline content of headings and paragraphs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Inline {
    Text {
        value: String,
    },
    Emphasis {
        children: Vec<Inline>,
    },
    Strong {
        children: Vec<Inline>,
    },
    InlineCode {
        value: String,
    },
    Link {
        url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        children: Vec<Inline>,
    },
    LinkReference {
        identifier: String,
        label: String,
        #[serde(rename = "referenceType")]
        reference_type: ReferenceType,
        children: Vec<Inline>,
    },
    /// Inline markdown source that has not been parsed
    Raw {
        value: String,
    },
}

impl Inline {
    pub fn text(value: impl Into<String>) -> Self {
        Inline::Text {
            value: value.into(),
        }
    }

    /// Shortcut reference `[text]`, keyed by the lower-cased text
    pub fn shortcut_reference(text: impl Into<String>) -> Self {
        let text = text.into();
        let identifier = text.to_lowercase();
        Inline::LinkReference {
            label: identifier.clone(),
            identifier,
            reference_type: ReferenceType::Shortcut,
            children: vec![Inline::text(text)],
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Inline::Text { value } => Some(value),
            _ => None,
        }
    }
}
