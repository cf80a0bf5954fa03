use std::{fs, path::PathBuf};

use uuid::Uuid;
use webgrade::{
    GradingBatch, GradingRecord,
    gradebook::{
        Gradebook, GradebookEntry, GradebookError, JsonHandoff, SubmitOptions, submit,
    },
};

/// Paged gradebook held in memory. `flaky[i]` is how many reads of entry `i`
/// fail before it shows.
#[derive(Default)]
struct FakeGradebook {
    entries: Vec<GradebookEntry>,
    flaky:   Vec<usize>,
    pos:     usize,
    reads:   usize,
    written: Vec<(String, u32, String)>,
}

impl FakeGradebook {
    fn new(names: &[&str]) -> Self {
        Self {
            entries: names
                .iter()
                .map(|name| GradebookEntry {
                    display_name:  name.to_string(),
                    needs_grading: true,
                    current_score: None,
                })
                .collect(),
            flaky: vec![0; names.len()],
            ..Self::default()
        }
    }
}

impl Gradebook for FakeGradebook {
    fn current_entry(&mut self) -> Result<Option<GradebookEntry>, GradebookError> {
        self.reads += 1;
        if self.flaky[self.pos] > 0 {
            self.flaky[self.pos] -= 1;
            return Err(GradebookError::Unreadable("page still loading".into()));
        }
        Ok(self.entries.get(self.pos).cloned())
    }

    fn write(&mut self, record: &GradingRecord) -> Result<(), GradebookError> {
        let name = self.entries[self.pos].display_name.clone();
        self.written
            .push((name, record.score, record.feedback.clone()));
        Ok(())
    }

    fn advance(&mut self) -> Result<bool, GradebookError> {
        if self.pos + 1 < self.entries.len() {
            self.pos += 1;
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

fn record(key: &str, score: u32) -> GradingRecord {
    GradingRecord {
        canonical_key: key.into(),
        score,
        feedback: format!("feedback for {key}"),
    }
}

fn batch() -> GradingBatch {
    GradingBatch::new(vec![record("leeamy", 38), record("quinnzed", 40)], vec![
        record("smithdoebob", 12),
    ])
}

#[test]
fn every_matched_entry_is_written() {
    let mut book = FakeGradebook::new(&["Zed Quinn", "Bob Smith-Doe", "Amy Lee"]);
    let summary = submit(&mut book, &batch(), SubmitOptions::default());

    assert_eq!(summary.written, vec!["quinnzed", "smithdoebob", "leeamy"]);
    assert!(summary.is_complete());
    assert_eq!(book.written[1], (
        "Bob Smith-Doe".to_string(),
        12,
        "feedback for smithdoebob".to_string()
    ));
}

#[test]
fn unmatched_entry_is_dropped_after_three_attempts() {
    let mut book = FakeGradebook::new(&["Pat Unknown", "Amy Lee"]);
    let summary = submit(&mut book, &batch(), SubmitOptions::default());

    assert_eq!(summary.unmatched, vec!["Pat Unknown"]);
    assert_eq!(summary.written, vec!["leeamy"]);
    assert_eq!(summary.pending, vec!["quinnzed", "smithdoebob"]);
    assert_eq!(book.reads, 3 + 1);
}

#[test]
fn transient_failures_are_retried() {
    let mut book = FakeGradebook::new(&["Amy Lee", "Zed Quinn"]);
    book.flaky = vec![2, 3];
    let summary = submit(&mut book, &batch(), SubmitOptions::default());

    assert_eq!(summary.written, vec!["leeamy"]);
    assert_eq!(summary.unmatched.len(), 1);
    assert!(summary.pending.contains(&"quinnzed".to_string()));
}

#[test]
fn graded_entries_are_left_alone_unless_updating_all() {
    let mut book = FakeGradebook::new(&["Amy Lee"]);
    book.entries[0].needs_grading = false;
    let summary = submit(&mut book, &batch(), SubmitOptions::default());
    assert!(summary.written.is_empty());
    assert!(book.written.is_empty());

    let summary = submit(&mut book, &batch(), SubmitOptions { update_all: true });
    assert_eq!(summary.written, vec!["leeamy"]);
}

#[test]
fn matching_score_is_not_rewritten() {
    let mut book = FakeGradebook::new(&["Amy Lee"]);
    book.entries[0].current_score = Some(38);
    let summary = submit(&mut book, &batch(), SubmitOptions::default());
    assert_eq!(summary.unchanged, vec!["leeamy"]);
    assert!(book.written.is_empty());
}

#[test]
fn json_handoff_keeps_batch_order() {
    let root: PathBuf = std::env::temp_dir().join(format!("webgrade-handoff-{}", Uuid::new_v4()));
    fs::create_dir_all(&root).expect("create temp root");

    let handoff = JsonHandoff::new(root.join("handoff.json"));
    let batch = batch();
    handoff.write(&batch).expect("write handoff");
    assert_eq!(handoff.read().expect("read handoff"), batch.records());

    let _ = fs::remove_dir_all(root);
}
