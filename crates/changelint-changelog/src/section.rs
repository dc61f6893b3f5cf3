//! Section tree of a changelog
//!
//! The flat block sequence is folded into an arena of sections, each owning
//! the heading that opened it, the blocks that follow it and its child
//! sections. Headings deeper than the current section open a child; others
//! climb the parent chain until a shallower section takes them.
//!
//! ```text
//! # Changelog            Document (depth 1)
//! ## [1.0.0] - 2020-01-01  Release  (depth 2)
//! ### Added                Group    (depth 3)
//! #### Notes               Generic  (depth 4)
//! ```

use std::cmp::Ordering;

use changelint_core::error::ChangelogError;
use tracing::debug;

use crate::definitions::Definitions;
use crate::markdown::{Block, Heading, Inline, List, ListItem, Paragraph};
use crate::version;

/// Title every changelog must start with
pub const TITLE: &str = "Changelog";

const ROOT_DEPTH: u8 = 1;

/// Index of a section in its changelog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SectionId(usize);

/// How a release heading links its version
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkType {
    None,
    /// `[1.0.0](https://...)`
    Direct,
    /// `[1.0.0]` resolved through a definition
    Reference,
}

/// Fields read from a release heading
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseInfo {
    pub version: Option<String>,
    pub date: Option<String>,
    /// Raw heading text
    pub title: Option<String>,
    pub link_type: LinkType,
    /// Whether the heading matched an accepted form
    pub parseable: bool,
    /// Version this release follows, filled in before population
    pub previous_version: Option<String>,
    /// Position among the original releases
    pub index: usize,
}

impl ReleaseInfo {
    /// Read a release heading
    ///
    /// Accepted forms are plain text `<version> - <date>` and a link or link
    /// reference around the version, optionally followed by ` - <date>`.
    pub fn parse(heading: &Heading, index: usize) -> Self {
        let mut info = Self {
            version: None,
            date: None,
            title: None,
            link_type: LinkType::None,
            parseable: false,
            previous_version: None,
            index,
        };

        match heading.children.as_slice() {
            [Inline::Text { value }] => {
                info.title = Some(value.clone());

                let mut parts = value.split(" - ");
                let version = parts.next();
                let date = parts.next();

                if parts.next().is_none() {
                    info.parseable = true;
                    info.version = non_empty(version);
                    info.date = non_empty(date);
                }
            }
            [first, rest @ ..] => {
                let Some((link_type, version)) = linked_version(first) else {
                    return info;
                };
                info.link_type = link_type;

                match rest {
                    [] => {
                        info.parseable = true;
                        info.version = non_empty(Some(version));
                        info.title = Some(version.to_string());
                    }
                    [Inline::Text { value }] => {
                        let mut parts = value.split(" - ");
                        let before = parts.next().unwrap_or_default();
                        let date = parts.next();

                        if before.is_empty() && parts.next().is_none() {
                            info.parseable = true;
                            info.version = non_empty(Some(version));
                            info.date = non_empty(date);
                        }
                    }
                    _ => {}
                }
            }
            [] => {}
        }

        info
    }
}

fn linked_version(inline: &Inline) -> Option<(LinkType, &str)> {
    let (link_type, children) = match inline {
        Inline::Link { children, .. } => (LinkType::Direct, children),
        Inline::LinkReference { children, .. } => (LinkType::Reference, children),
        _ => return None,
    };

    match children.as_slice() {
        [Inline::Text { value }] => Some((link_type, value)),
        _ => None,
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(String::from)
}

/// Order releases latest-first, keeping the original order of releases
/// without a version
pub fn compare_releases(a: &ReleaseInfo, b: &ReleaseInfo) -> Ordering {
    match (&a.version, &b.version) {
        (Some(va), Some(vb)) => version::compare(va, vb),
        _ => a.index.cmp(&b.index),
    }
}

/// What a section represents, decided by where it was opened
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionKind {
    Document,
    Release(ReleaseInfo),
    Group,
    Generic,
}

#[derive(Debug, Clone)]
pub struct Section {
    pub depth: u8,
    /// Absent only for a document without a title
    pub heading: Option<Heading>,
    pub content: Vec<Block>,
    pub children: Vec<SectionId>,
    pub parent: Option<SectionId>,
    pub kind: SectionKind,
}

impl Section {
    fn new(depth: u8, parent: Option<SectionId>, heading: Option<Heading>, kind: SectionKind) -> Self {
        Self {
            depth,
            heading,
            content: Vec::new(),
            children: Vec::new(),
            parent,
            kind,
        }
    }

    pub fn release(&self) -> Option<&ReleaseInfo> {
        match &self.kind {
            SectionKind::Release(info) => Some(info),
            _ => None,
        }
    }
}

/// A changelog as a tree of sections plus its link definitions
#[derive(Debug, Clone)]
pub struct Changelog {
    sections: Vec<Section>,
    definitions: Definitions,
}

impl Changelog {
    pub const ROOT: SectionId = SectionId(0);

    fn empty() -> Self {
        Self {
            sections: vec![Section::new(ROOT_DEPTH, None, None, SectionKind::Document)],
            definitions: Definitions::new(),
        }
    }

    /// Build the tree from top-level blocks
    ///
    /// Fails on headings outside of levels 1 to 6. Definitions are collected
    /// wherever they occur.
    pub fn from_blocks(blocks: Vec<Block>) -> Result<Self, ChangelogError> {
        let mut changelog = Self::empty();
        let mut cursor = Self::ROOT;

        for block in blocks {
            cursor = changelog.add(cursor, block)?;
        }

        debug!(
            sections = changelog.sections.len(),
            releases = changelog.releases().len(),
            definitions = changelog.definitions.len(),
            "built changelog tree"
        );
        Ok(changelog)
    }

    fn add(&mut self, at: SectionId, block: Block) -> Result<SectionId, ChangelogError> {
        let heading = match block {
            Block::Heading(heading) => heading,
            Block::Definition(definition) => {
                if definition.identifier.trim().is_empty() {
                    return Err(ChangelogError::Structural(format!(
                        "link definition for {} has no identifier",
                        definition.url
                    )));
                }
                self.definitions.insert(definition);
                return Ok(at);
            }
            other => {
                self.section_mut(at).content.push(other);
                return Ok(at);
            }
        };

        if !(1..=6).contains(&heading.depth) {
            return Err(ChangelogError::InvalidHeadingDepth(heading.depth));
        }

        let mut cursor = at;

        loop {
            if cursor == Self::ROOT && self.takes_title(&heading) {
                self.section_mut(cursor).heading = Some(heading);
                return Ok(cursor);
            }

            let section = self.section(cursor);

            if heading.depth > section.depth {
                return Ok(self.open_child(cursor, heading));
            }

            match section.parent {
                Some(parent) => cursor = parent,
                None => {
                    self.section_mut(cursor).content.push(Block::Heading(heading));
                    return Ok(cursor);
                }
            }
        }
    }

    fn takes_title(&self, heading: &Heading) -> bool {
        let root = self.section(Self::ROOT);
        heading.depth == ROOT_DEPTH && root.heading.is_none() && root.content.is_empty()
    }

    fn open_child(&mut self, parent: SectionId, heading: Heading) -> SectionId {
        let id = SectionId(self.sections.len());
        let owner = self.section(parent);
        let depth = owner.depth + 1;

        let kind = match owner.kind {
            SectionKind::Document => {
                SectionKind::Release(ReleaseInfo::parse(&heading, owner.children.len()))
            }
            SectionKind::Release(_) => SectionKind::Group,
            SectionKind::Group | SectionKind::Generic => SectionKind::Generic,
        };

        self.sections
            .push(Section::new(depth, Some(parent), Some(heading), kind));
        self.section_mut(parent).children.push(id);
        id
    }

    pub fn section(&self, id: SectionId) -> &Section {
        &self.sections[id.0]
    }

    pub fn section_mut(&mut self, id: SectionId) -> &mut Section {
        &mut self.sections[id.0]
    }

    pub fn release(&self, id: SectionId) -> Option<&ReleaseInfo> {
        self.section(id).release()
    }

    pub fn release_mut(&mut self, id: SectionId) -> Option<&mut ReleaseInfo> {
        match &mut self.section_mut(id).kind {
            SectionKind::Release(info) => Some(info),
            _ => None,
        }
    }

    /// Top-level sections, in document order
    pub fn releases(&self) -> &[SectionId] {
        &self.section(Self::ROOT).children
    }

    pub fn definitions(&self) -> &Definitions {
        &self.definitions
    }

    pub fn definitions_mut(&mut self) -> &mut Definitions {
        &mut self.definitions
    }

    pub fn title(&self) -> Option<&Heading> {
        self.section(Self::ROOT).heading.as_ref()
    }

    /// Whether the document starts with `# Changelog`
    pub fn has_valid_title(&self) -> bool {
        self.title().is_some_and(|heading| {
            heading.depth == ROOT_DEPTH && heading.sole_text() == Some(TITLE)
        })
    }

    /// Rewrite the title heading to `# Changelog`, creating it if needed
    pub fn build_title(&mut self) {
        let root = self.section_mut(Self::ROOT);

        if let Some(heading) = root.heading.as_mut().filter(|h| h.depth == ROOT_DEPTH) {
            heading.children = vec![Inline::text(TITLE)];
        } else {
            root.heading = Some(Heading::text(ROOT_DEPTH, TITLE));
        }
    }

    /// Whether releases are in latest-first order
    pub fn releases_sorted(&self) -> bool {
        self.releases().windows(2).all(|pair| {
            match (self.release(pair[0]), self.release(pair[1])) {
                (Some(a), Some(b)) => compare_releases(a, b) != Ordering::Greater,
                _ => true,
            }
        })
    }

    /// Sort releases latest-first
    ///
    /// Stable insertion sort: `compare_releases` is not transitive once
    /// unversioned releases are mixed in.
    pub fn sort_releases(&mut self) {
        let mut order = self.releases().to_vec();

        for i in 1..order.len() {
            let mut j = i;
            while j > 0 && self.compare_ids(order[j - 1], order[j]) == Ordering::Greater {
                order.swap(j - 1, j);
                j -= 1;
            }
        }

        self.section_mut(Self::ROOT).children = order;
    }

    fn compare_ids(&self, a: SectionId, b: SectionId) -> Ordering {
        match (self.release(a), self.release(b)) {
            (Some(a), Some(b)) => compare_releases(a, b),
            _ => Ordering::Equal,
        }
    }

    /// Append a release with a `<version> - <date>` heading
    pub fn create_release(&mut self, version: &str, date: &str) -> SectionId {
        let heading = Heading::text(2, format!("{} - {}", version, date));
        self.open_child(Self::ROOT, heading)
    }

    /// Append a group with a `### <type>` heading
    pub fn create_group(&mut self, release: SectionId, group_type: &str) -> SectionId {
        self.open_child(release, Heading::text(3, group_type))
    }

    /// Append a tight bullet list with one item per entry
    ///
    /// Entries are inline markdown and are kept unparsed.
    pub fn create_list<I, S>(&mut self, group: SectionId, entries: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let items = entries
            .into_iter()
            .map(|entry| ListItem {
                spread: false,
                children: vec![Block::Paragraph(Paragraph {
                    children: vec![Inline::Raw {
                        value: entry.into(),
                    }],
                })],
            })
            .collect();

        self.section_mut(group).content.push(Block::List(List {
            ordered: false,
            spread: false,
            items,
        }));
    }

    /// Put an emphasized notice in front of a section's content
    pub fn create_notice(&mut self, id: SectionId, text: &str) {
        self.section_mut(id).content.insert(0, Block::notice(text));
    }

    /// Whether a section has neither content nor children
    pub fn is_empty(&self, id: SectionId) -> bool {
        let section = self.section(id);
        section.content.is_empty() && section.children.is_empty()
    }

    /// Text of a group heading's first child
    pub fn group_type(&self, id: SectionId) -> Option<&str> {
        self.section(id)
            .heading
            .as_ref()
            .and_then(|heading| heading.children.first())
            .and_then(Inline::as_text)
    }

    /// Whether a group starts with a third-level heading holding only text
    pub fn has_valid_group_heading(&self, id: SectionId) -> bool {
        self.section(id)
            .heading
            .as_ref()
            .is_some_and(|heading| heading.depth == 3 && heading.sole_text().is_some())
    }

    /// Flatten back into blocks: each heading followed by its content and
    /// children, with definitions last
    pub fn tree(&self) -> Vec<Block> {
        let mut blocks = Vec::new();
        self.flatten(Self::ROOT, &mut blocks);
        blocks.extend(self.definitions.values().cloned().map(Block::Definition));
        blocks
    }

    fn flatten(&self, id: SectionId, out: &mut Vec<Block>) {
        let section = self.section(id);

        if let Some(heading) = &section.heading {
            out.push(Block::Heading(heading.clone()));
        }
        out.extend(section.content.iter().cloned());

        for child in &section.children {
            self.flatten(*child, out);
        }
    }
}
