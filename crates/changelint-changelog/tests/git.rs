//! Fixing a changelog against a real git repository

use std::path::Path;
use std::sync::Arc;

use changelint_changelog::markdown::Paragraph;
use changelint_changelog::{Block, ChangelogLinter, FixedClock, Heading, Inline};
use changelint_core::LintConfig;
use chrono::NaiveDate;
use git2::{Repository, Signature};
use tempfile::TempDir;

fn setup_project() -> TempDir {
    let temp = TempDir::new().unwrap();
    let repo = Repository::init(temp.path()).unwrap();
    repo.remote("origin", "git@github.com:acme/widget.git")
        .unwrap();

    std::fs::write(
        temp.path().join("Cargo.toml"),
        "[package]\nname = \"widget\"\nversion = \"1.0.0\"\n",
    )
    .unwrap();

    let sig = Signature::now("Test", "test@example.com").unwrap();
    let tree_id = repo.index().unwrap().write_tree().unwrap();
    let tree = repo.find_tree(tree_id).unwrap();

    let first = repo
        .commit(Some("HEAD"), &sig, &sig, "Initial commit", &tree, &[])
        .unwrap();
    let first = repo.find_commit(first).unwrap();
    repo.tag_lightweight("v1.0.0", first.as_object(), false)
        .unwrap();

    repo.commit(
        Some("HEAD"),
        &sig,
        &sig,
        "Add option\n\nCategory: addition",
        &tree,
        &[&first],
    )
    .unwrap();

    temp
}

fn text_of(block: &Block) -> String {
    match block {
        Block::Heading(h) => h.sole_text().unwrap_or_default().to_string(),
        Block::List(list) => list
            .items
            .iter()
            .flat_map(|item| &item.children)
            .filter_map(|child| match child {
                Block::Paragraph(p) => p.children.first().cloned(),
                _ => None,
            })
            .map(|inline| match inline {
                Inline::Raw { value } | Inline::Text { value } => value,
                _ => String::new(),
            })
            .collect::<Vec<_>>()
            .join("\n"),
        _ => String::new(),
    }
}

#[tokio::test]
async fn test_fix_adds_and_populates_patch_release() {
    let temp = setup_project();
    let config = LintConfig::fix().with_add("patch");
    let linter = ChangelogLinter::for_directory(config, temp.path())
        .with_clock(Arc::new(FixedClock(NaiveDate::from_ymd_opt(2024, 3, 7).unwrap())));

    assert_eq!(linter.repository(), Some("https://github.com/acme/widget"));

    let blocks = vec![
        Block::Heading(Heading::text(1, "Changelog")),
        Block::Heading(Heading::text(2, "1.0.0 - 2020-01-01")),
        Block::Paragraph(Paragraph {
            children: vec![Inline::text("First.")],
        }),
    ];
    let outcome = linter
        .run(blocks, Some(Path::new("CHANGELOG.md")))
        .await
        .unwrap();

    assert!(outcome.diagnostics.is_empty(), "{:?}", outcome.diagnostics);

    let blocks = outcome.blocks.unwrap();
    let Block::Heading(release) = &blocks[1] else {
        panic!("expected the new release, got {:?}", blocks[1]);
    };
    assert_eq!(release.children[0], Inline::shortcut_reference("1.0.1"));
    assert_eq!(release.children[1], Inline::text(" - 2024-03-07"));

    assert_eq!(text_of(&blocks[2]), "Added");
    let entry = text_of(&blocks[3]);
    assert!(entry.starts_with("Add option ([`"), "{}", entry);
    assert!(entry.contains("](https://github.com/acme/widget/commit/"));
    assert!(entry.ends_with(" (Test)"));

    let urls: Vec<&str> = blocks
        .iter()
        .filter_map(|b| match b {
            Block::Definition(d) => Some(d.url.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(
        urls,
        vec![
            "https://github.com/acme/widget/releases/tag/v1.0.1",
            "https://github.com/acme/widget/releases/tag/v1.0.0",
        ]
    );
}
