//! Chronicle
//!
//! In-memory history of the session, optionally mirrored to an append-only
//! JSONL file.

use bevy_ecs::prelude::*;
use std::collections::VecDeque;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;
use syndicate_events::{generate_entry_id, ChronicleEntry, EntryCategory, GameTime};

use crate::components::GameClock;

/// Entries kept in memory before the oldest are dropped
pub const MAX_CHRONICLE_ENTRIES: usize = 5_000;

/// Writes chronicle entries to a JSONL file
pub struct ChronicleWriter {
    writer: Option<BufWriter<File>>,
    written: u64,
}

impl ChronicleWriter {
    /// Create a writer that truncates and writes to `path`
    pub fn new(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;

        Ok(Self {
            writer: Some(BufWriter::new(file)),
            written: 0,
        })
    }

    /// Create a writer that discards entries
    pub fn null() -> Self {
        Self {
            writer: None,
            written: 0,
        }
    }

    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn write(&mut self, entry: &ChronicleEntry) -> std::io::Result<()> {
        self.written += 1;
        if let Some(ref mut writer) = self.writer {
            let json = entry.to_jsonl()?;
            writeln!(writer, "{}", json)?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> std::io::Result<()> {
        if let Some(ref mut writer) = self.writer {
            writer.flush()?;
        }
        Ok(())
    }
}

impl Drop for ChronicleWriter {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            tracing::warn!("Failed to flush chronicle: {}", e);
        }
    }
}

/// Resource: the session history
#[derive(Resource)]
pub struct Chronicle {
    entries: VecDeque<ChronicleEntry>,
    next_id: u64,
    writer: ChronicleWriter,
}

impl Default for Chronicle {
    fn default() -> Self {
        Self::new(ChronicleWriter::null())
    }
}

impl Chronicle {
    pub fn new(writer: ChronicleWriter) -> Self {
        Self {
            entries: VecDeque::new(),
            next_id: 1,
            writer,
        }
    }

    /// Start a new entry with the next id. It is not recorded until pushed.
    pub fn entry(
        &mut self,
        time: GameTime,
        category: EntryCategory,
        summary: impl Into<String>,
    ) -> ChronicleEntry {
        let id = generate_entry_id(self.next_id);
        self.next_id += 1;
        ChronicleEntry::new(id, time, category, summary)
    }

    pub fn push(&mut self, entry: ChronicleEntry) {
        tracing::debug!(
            category = ?entry.category,
            time = %entry.time,
            "{}",
            entry.summary
        );
        if let Err(e) = self.writer.write(&entry) {
            tracing::warn!("Failed to write chronicle entry {}: {}", entry.entry_id, e);
        }
        if self.entries.len() >= MAX_CHRONICLE_ENTRIES {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    pub fn entries(&self) -> impl Iterator<Item = &ChronicleEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&ChronicleEntry> {
        self.entries.back()
    }

    /// The most recent `n` entries, oldest first
    pub fn recent(&self, n: usize) -> Vec<&ChronicleEntry> {
        let skip = self.entries.len().saturating_sub(n);
        self.entries.iter().skip(skip).collect()
    }

    pub fn with_tag<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a ChronicleEntry> {
        self.entries.iter().filter(move |e| e.has_tag(tag))
    }

    pub fn in_category(&self, category: EntryCategory) -> impl Iterator<Item = &ChronicleEntry> {
        self.entries.iter().filter(move |e| e.category == category)
    }

    pub fn flush(&mut self) -> std::io::Result<()> {
        self.writer.flush()
    }
}

/// Record an entry stamped with the current game time.
pub fn record(
    world: &mut World,
    category: EntryCategory,
    summary: impl Into<String>,
    decorate: impl FnOnce(ChronicleEntry) -> ChronicleEntry,
) {
    let time = world
        .get_resource::<GameClock>()
        .map(|c| c.time)
        .unwrap_or_default();
    if let Some(mut chronicle) = world.get_resource_mut::<Chronicle>() {
        let entry = chronicle.entry(time, category, summary);
        chronicle.push(decorate(entry));
    }
}
