use std::{fs, path::PathBuf};

use uuid::Uuid;
use webgrade::{GraderConfig, paths::ResultsPaths};

fn temp_root() -> PathBuf {
    let root = std::env::temp_dir().join(format!("webgrade-paths-{}", Uuid::new_v4()));
    fs::create_dir_all(&root).expect("create temp root");
    root
}

#[test]
fn results_paths_defaults_are_consistent() {
    let root = temp_root();

    let via_new = ResultsPaths::new(root.clone());
    let via_builder = webgrade::paths::results_paths().root(root.clone()).build();
    let via_config = GraderConfig::builder()
        .results_dir(root.clone())
        .assignment("dungeon")
        .build()
        .paths();

    let snapshot = |p: &ResultsPaths| {
        (
            p.root().to_path_buf(),
            p.pulled_html().to_path_buf(),
            p.fetched_pages().to_path_buf(),
            p.csv_dir().to_path_buf(),
            p.report_file(),
            p.handoff_file(),
        )
    };

    assert_eq!(snapshot(&via_new), snapshot(&via_builder));
    assert_eq!(snapshot(&via_new), snapshot(&via_config));
    assert_eq!(via_new.report_file(), root.join("csv").join("grading_results.csv"));
    assert_eq!(via_new.fetched_pages(), root.join("fetched_pages"));

    let _ = fs::remove_dir_all(root);
}

#[test]
fn overrides_and_ensure() {
    let root = temp_root();
    let paths = webgrade::paths::results_paths()
        .root(root.clone())
        .csv_dir(root.join("reports"))
        .build();

    paths.ensure().expect("create layout");
    assert!(root.join("pulled_html").is_dir());
    assert!(root.join("fetched_pages").is_dir());
    assert!(root.join("reports").is_dir());
    assert_eq!(paths.report_file(), root.join("reports").join("grading_results.csv"));

    let _ = fs::remove_dir_all(root);
}
