//! Repository scanning against in-memory repositories

mod common;

use baseline::provider::{EntryKind, MemoryProvider, MemoryRepo, TreeEntry};
use baseline::scanner::{MAX_FILE_SIZE, MAX_FILES, ScanError, ScanLimits};
use baseline_core::Language;
use std::time::Duration;

fn provider(repo: MemoryRepo) -> MemoryProvider {
    MemoryProvider::new().with_repo("octo", "site", repo)
}

#[tokio::test]
async fn test_scan_sample_repository() {
    let scanner = common::scanner(provider(common::sample_repo()));
    let summary = scanner.scan("octo", "site").await.unwrap();

    assert_eq!(summary.repository, "octo/site");
    assert_eq!(summary.eligible_files, 3);
    assert_eq!(summary.total_files, 3);
    assert_eq!(summary.files_analyzed, 3);
    assert_eq!(summary.files_with_issues, 2);
    assert!(summary.skipped_files.is_empty());

    let paths: Vec<&str> = summary.file_results.iter().map(|f| f.path.as_str()).collect();
    assert_eq!(paths, vec!["src/styles/layout.css", "src/Dashboard.tsx"]);

    let css = &summary.file_results[0];
    assert_eq!(css.language, Language::Css);
    assert_eq!(css.issue_count, 8);
    assert_eq!(css.score, 85);

    let tsx = &summary.file_results[1];
    assert_eq!(tsx.language, Language::Js);
    assert_eq!(tsx.issue_count, 4);
    assert_eq!(tsx.score, 70);

    assert_eq!(summary.total_issues, 12);
    // 1 of 3 analyzed files is clean
    assert_eq!(summary.overall_score(), 33);
}

#[tokio::test]
async fn test_file_cap() {
    let mut repo = MemoryRepo::new("main");
    for i in 0..60 {
        repo = repo.file(format!("src/module{:02}.js", i), "items.at(-1);\n");
    }
    repo = repo.file("docs/index.md", "not source");

    let scanner = common::scanner(provider(repo));
    let summary = scanner.scan("octo", "site").await.unwrap();

    assert_eq!(summary.eligible_files, 60);
    assert_eq!(summary.total_files, MAX_FILES);
    assert_eq!(summary.files_analyzed, MAX_FILES);
    assert_eq!(summary.file_results.len(), MAX_FILES);
    assert_eq!(summary.file_results[0].path, "src/module00.js");
    assert_eq!(summary.file_results[49].path, "src/module49.js");
}

#[tokio::test]
async fn test_custom_limits() {
    let mut repo = MemoryRepo::new("main");
    for i in 0..5 {
        repo = repo.file(format!("s{}.css", i), ".a { display: grid; }");
    }
    let scanner = common::scanner(provider(repo)).with_limits(ScanLimits {
        max_files: 2,
        ..ScanLimits::default()
    });

    let summary = scanner.scan("octo", "site").await.unwrap();
    assert_eq!(summary.eligible_files, 5);
    assert_eq!(summary.total_files, 2);
    assert_eq!(summary.files_analyzed, 2);
}

#[tokio::test]
async fn test_oversize_files_are_skipped() {
    let filler = "/* padding */\n";
    let at_limit = format!(
        ".a {{ display: grid; }}\n{}",
        " ".repeat(MAX_FILE_SIZE - ".a { display: grid; }\n".len())
    );
    let too_big = format!("{}{}", filler.repeat(MAX_FILE_SIZE / filler.len()), filler);
    assert_eq!(at_limit.len(), MAX_FILE_SIZE);
    assert!(too_big.len() > MAX_FILE_SIZE);

    let repo = MemoryRepo::new("main")
        .file("big.css", too_big)
        .file("edge.css", at_limit);

    let summary = common::scanner(provider(repo))
        .scan("octo", "site")
        .await
        .unwrap();

    assert_eq!(summary.total_files, 2);
    assert_eq!(summary.files_analyzed, 1);
    assert_eq!(summary.file_results.len(), 1);
    assert_eq!(summary.file_results[0].path, "edge.css");

    assert_eq!(summary.skipped_files.len(), 1);
    assert_eq!(summary.skipped_files[0].path, "big.css");
    assert!(summary.skipped_files[0].reason.starts_with("file too large"));
}

#[tokio::test]
async fn test_unreadable_entries_are_skipped() {
    let repo = MemoryRepo::new("main")
        .entry(TreeEntry {
            path: "src/nosha.js".to_string(),
            kind: EntryKind::Blob,
            sha: None,
        })
        .entry(TreeEntry::blob("src/gone.js", "deadbeef"))
        .entry(TreeEntry {
            path: "src/components.ts".to_string(),
            kind: EntryKind::Tree,
            sha: Some("cafe".to_string()),
        })
        .file("src/ok.js", "Promise.any(ps);\n");

    let summary = common::scanner(provider(repo))
        .scan("octo", "site")
        .await
        .unwrap();

    // The tree entry is not a blob and is never eligible
    assert_eq!(summary.eligible_files, 3);
    assert_eq!(summary.files_analyzed, 1);
    assert_eq!(summary.total_issues, 1);

    let skipped: Vec<(&str, &str)> = summary
        .skipped_files
        .iter()
        .map(|s| (s.path.as_str(), s.reason.as_str()))
        .collect();
    assert_eq!(skipped[0], ("src/nosha.js", "missing blob sha"));
    assert_eq!(skipped[1].0, "src/gone.js");
    assert!(skipped[1].1.starts_with("fetch failed"));
}

#[tokio::test]
async fn test_invalid_utf8_is_decoded_lossily() {
    let mut bytes = b".a { display: grid; }\n/* ".to_vec();
    bytes.extend([0xff, 0xfe]);
    bytes.extend(b" */\n");
    let repo = MemoryRepo::new("main").file("latin.css", bytes);

    let summary = common::scanner(provider(repo))
        .scan("octo", "site")
        .await
        .unwrap();
    assert_eq!(summary.files_analyzed, 1);
    assert_eq!(summary.total_issues, 1);
}

#[tokio::test]
async fn test_size_limit_counts_blob_bytes() {
    // Each invalid byte decodes to a three-byte replacement character
    let mut bytes = b".a { display: grid; }\n/* ".to_vec();
    bytes.extend(std::iter::repeat_n(0xff, 1000));
    bytes.extend(b" */\n");
    bytes.resize(MAX_FILE_SIZE, b' ');
    assert!(String::from_utf8_lossy(&bytes).len() > MAX_FILE_SIZE);

    let repo = MemoryRepo::new("main").file("legacy.css", bytes);
    let summary = common::scanner(provider(repo))
        .scan("octo", "site")
        .await
        .unwrap();

    assert!(summary.skipped_files.is_empty());
    assert_eq!(summary.files_analyzed, 1);
    assert_eq!(summary.total_issues, 1);
}

#[tokio::test]
async fn test_deadline_skips_remaining_files() {
    let scanner = common::scanner(provider(common::sample_repo())).with_limits(ScanLimits {
        deadline: Some(Duration::ZERO),
        ..ScanLimits::default()
    });

    let summary = scanner.scan("octo", "site").await.unwrap();
    assert_eq!(summary.total_files, 3);
    assert_eq!(summary.files_analyzed, 0);
    assert_eq!(summary.skipped_files.len(), 3);
    assert!(
        summary
            .skipped_files
            .iter()
            .all(|s| s.reason == "deadline exceeded")
    );
    assert_eq!(summary.overall_score(), 100);
}

#[tokio::test]
async fn test_empty_repository() {
    let repo = MemoryRepo::new("main").file("README.md", "# nothing here");
    let summary = common::scanner(provider(repo))
        .scan("octo", "site")
        .await
        .unwrap();

    assert_eq!(summary.total_files, 0);
    assert_eq!(summary.files_analyzed, 0);
    assert!(summary.file_results.is_empty());
    assert_eq!(summary.overall_score(), 100);
}

#[tokio::test]
async fn test_repository_errors() {
    let provider = MemoryProvider::new()
        .with_repo("octo", "private", MemoryRepo::new("main").denied());
    let scanner = common::scanner(provider);

    match scanner.scan("octo", "missing").await {
        Err(ScanError::RepositoryNotFound(repository)) => assert_eq!(repository, "octo/missing"),
        other => panic!("expected RepositoryNotFound, got {:?}", other),
    }

    assert!(matches!(
        scanner.scan("octo", "private").await,
        Err(ScanError::AccessDenied(_))
    ));
}
