use std::path::PathBuf;

use chrono::{DateTime, Local};

use super::vault::{StorageError, Vault};
use crate::summary::Summary;

/// Writes meeting notes into the vault under `<folder>/<MonthName>/`.
///
/// Filenames are `DD-HHMM.md` in local time; the transcript-only checkpoint
/// adds a `-transcript` suffix. When a name is already taken (two sessions in
/// the same minute), a `-2`, `-3`, ... counter is appended before `.md`.
#[derive(Clone)]
pub struct NoteWriter {
    vault: Vault,
    folder: String,
}

impl NoteWriter {
    pub fn new(vault: Vault, folder: impl Into<String>) -> Self {
        Self {
            vault,
            folder: folder.into(),
        }
    }

    /// Persist only the raw transcript, flagged as incomplete.
    ///
    /// Durability checkpoint: written as soon as transcription succeeds, so a
    /// failed summarization never loses the transcript.
    pub fn write_transcript_only(
        &self,
        transcript: &str,
        timestamp: DateTime<Local>,
    ) -> Result<PathBuf, StorageError> {
        let month_folder = self.ensure_month_folder(timestamp)?;
        let base = format!("{}-transcript", file_stem(timestamp));

        let content = format!(
            "# Meeting Transcript - {}\n\n\
             > [!warning] AI Processing Incomplete\n\
             > This file contains only the transcript. AI processing failed or was interrupted.\n\n\
             ## Transcript\n{}",
            timestamp.format("%Y-%m-%d %H:%M"),
            transcript
        );

        let relative = self.disambiguate(&month_folder, &base);
        self.vault.create_note(relative, &content)
    }

    /// Persist the full note: rendered summary sections followed by the
    /// complete transcript.
    pub fn write_full_note(
        &self,
        transcript: &str,
        summary: &Summary,
        timestamp: DateTime<Local>,
    ) -> Result<PathBuf, StorageError> {
        let month_folder = self.ensure_month_folder(timestamp)?;
        let base = file_stem(timestamp);

        let content = format!(
            "# Meeting Notes - {}\n\n\
             ## Summary\n{}\n\n\
             ## Action Items\n{}\n\n\
             ## Follow-ups\n{}\n\n\
             ## Full Transcript\n{}",
            timestamp.format("%Y-%m-%d %H:%M"),
            bullet_list(&summary.key_points),
            checkbox_list(&summary.action_items),
            bullet_list(&summary.follow_ups),
            transcript
        );

        let relative = self.disambiguate(&month_folder, &base);
        self.vault.create_note(relative, &content)
    }

    pub fn delete(&self, path: &std::path::Path) -> Result<(), StorageError> {
        self.vault.delete(path)
    }

    fn ensure_month_folder(&self, timestamp: DateTime<Local>) -> Result<String, StorageError> {
        let month_folder = format!("{}/{}", self.folder, timestamp.format("%B"));
        self.vault.ensure_folder(&month_folder)?;
        Ok(month_folder)
    }

    /// First free filename for `base` within `folder`
    fn disambiguate(&self, folder: &str, base: &str) -> String {
        let candidate = format!("{folder}/{base}.md");
        if !self.vault.exists(&candidate) {
            return candidate;
        }

        let mut counter = 2;
        loop {
            let candidate = format!("{folder}/{base}-{counter}.md");
            if !self.vault.exists(&candidate) {
                return candidate;
            }
            counter += 1;
        }
    }
}

fn file_stem(timestamp: DateTime<Local>) -> String {
    timestamp.format("%d-%H%M").to_string()
}

fn bullet_list(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("- {item}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn checkbox_list(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("- [ ] {item}"))
        .collect::<Vec<_>>()
        .join("\n")
}
