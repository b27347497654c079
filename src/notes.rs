use crate::db::models::{Note, NoteKind};
use crate::db::{self, Database};
use chrono::{Local, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub const DEFAULT_CATEGORY: &str = "Personal";
/// Pseudo-category matching every note.
pub const ALL_CATEGORIES: &str = "all";

const CATEGORY_RULES: &[(&[&str], &str)] = &[
    (&["meeting", "standup"], "Work"),
    (&["research", "study"], "Research"),
    (&["idea", "brainstorm"], "Ideas"),
    (&["todo", "task"], "Tasks"),
];

const AUTO_TAG_WORDS: &[&str] = &[
    "meeting", "project", "idea", "research", "todo", "important", "urgent",
];

const TAG_SUGGESTION_LIMIT: usize = 10;
const DUPLICATE_PREFIX_CHARS: usize = 10;

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NoteStats {
    pub total_notes: usize,
    pub audio_notes: usize,
    pub video_notes: usize,
    pub starred_notes: usize,
}

/// Category picked from keywords in the title and body.
pub fn smart_category(title: &str, content: &str) -> &'static str {
    let text = format!("{title} {content}").to_lowercase();
    CATEGORY_RULES
        .iter()
        .find(|(words, _)| words.iter().any(|w| text.contains(w)))
        .map(|(_, category)| *category)
        .unwrap_or(DEFAULT_CATEGORY)
}

pub fn auto_tags(title: &str, content: &str) -> Vec<String> {
    let text = format!("{title} {content}").to_lowercase();
    AUTO_TAG_WORDS
        .iter()
        .filter(|w| text.contains(*w))
        .map(|w| w.to_string())
        .collect()
}

/// `HH:MM:SS`, hours not capped.
pub fn format_duration(seconds: u64) -> String {
    format!(
        "{:02}:{:02}:{:02}",
        seconds / 3600,
        (seconds % 3600) / 60,
        seconds % 60
    )
}

/// The user's note collection, newest first.
#[derive(Debug, Default, Clone)]
pub struct NoteBook {
    notes: Vec<Note>,
}

impl NoteBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_notes(notes: Vec<Note>) -> Self {
        Self { notes }
    }

    pub fn load(db: &Database) -> db::Result<Self> {
        Ok(Self::from_notes(db.load_notes()?))
    }

    pub fn save(&self, db: &Database) -> db::Result<()> {
        db.save_notes(&self.notes)
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Note> {
        self.notes.iter().find(|n| n.id == id)
    }

    fn get_mut(&mut self, id: &str) -> Option<&mut Note> {
        self.notes.iter_mut().find(|n| n.id == id)
    }

    // ── Creation ──

    /// Create a text note. A blank title creates nothing.
    pub fn create_note(&mut self, title: &str, content: &str) -> Option<Note> {
        if title.trim().is_empty() {
            return None;
        }
        let mut note = Note::new(title, content, NoteKind::Text);
        note.tags = auto_tags(title, content);
        note.category = smart_category(title, content).to_string();
        self.notes.insert(0, note.clone());
        tracing::info!(id = %note.id, category = %note.category, "created note");
        Some(note)
    }

    /// Save a finished audio recording as a note.
    pub fn add_recording(&mut self, duration: u64, audio_url: Option<String>) -> Note {
        let now = Local::now();
        let date = now.format("%Y-%m-%d");
        let length = format_duration(duration);

        let mut note = Note::new(
            format!("Audio Recording {date}"),
            format!(
                "Audio recording captured on {}\n\nDuration: {length}\n\nThis audio note has been processed and is ready for AI transcription and analysis. You can ask the AI assistant questions about this recording.",
                now.format("%Y-%m-%d %H:%M:%S")
            ),
            NoteKind::Audio,
        );
        note.tags = vec!["audio".to_string(), "recording".to_string()];
        note.transcription = Some(
            "AI transcription in progress... This audio will be converted to text automatically."
                .to_string(),
        );
        note.summary = Some(format!(
            "Audio recording from {date} with duration of {length}. Ready for AI processing and transcription."
        ));
        note.audio_url = audio_url;
        note.duration = Some(duration);
        self.notes.insert(0, note.clone());
        note
    }

    /// Prepend a batch, keeping its order.
    pub fn insert_batch(&mut self, batch: Vec<Note>) {
        self.notes.splice(0..0, batch);
    }

    // ── Editing ──

    /// Replace the stored note with the same id.
    pub fn update(&mut self, mut updated: Note) -> bool {
        match self.get_mut(&updated.id) {
            Some(note) => {
                updated.touch();
                *note = updated;
                true
            }
            None => false,
        }
    }

    /// Flip the starred flag, returning the new value.
    pub fn toggle_star(&mut self, id: &str) -> Option<bool> {
        let note = self.get_mut(id)?;
        note.is_starred = !note.is_starred;
        Some(note.is_starred)
    }

    /// Returns false when the note is missing or already in `category`.
    pub fn move_to_category(&mut self, id: &str, category: &str) -> bool {
        match self.get_mut(id) {
            Some(note) if note.category != category => {
                note.category = category.to_string();
                note.touch();
                true
            }
            _ => false,
        }
    }

    pub fn delete(&mut self, id: &str) -> Option<Note> {
        let index = self.notes.iter().position(|n| n.id == id)?;
        Some(self.notes.remove(index))
    }

    pub fn bulk_delete(&mut self, ids: &[String]) -> usize {
        let before = self.notes.len();
        self.notes.retain(|n| !ids.contains(&n.id));
        before - self.notes.len()
    }

    /// Move every note of `name` back to the default category.
    pub fn delete_category(&mut self, name: &str) -> usize {
        let mut moved = 0;
        for note in self.notes.iter_mut().filter(|n| n.category == name) {
            note.category = DEFAULT_CATEGORY.to_string();
            note.touch();
            moved += 1;
        }
        moved
    }

    // ── Queries ──

    pub fn filter(&self, query: &str, category: &str) -> Vec<&Note> {
        let query = query.to_lowercase();
        self.notes
            .iter()
            .filter(|n| category == ALL_CATEGORIES || n.category == category)
            .filter(|n| {
                n.title.to_lowercase().contains(&query)
                    || n.content.to_lowercase().contains(&query)
                    || n.tags.iter().any(|t| t.to_lowercase().contains(&query))
                    || n
                        .summary
                        .as_deref()
                        .is_some_and(|s| s.to_lowercase().contains(&query))
            })
            .collect()
    }

    /// "all" followed by each category in first-seen order.
    pub fn categories(&self) -> Vec<String> {
        let mut out = vec![ALL_CATEGORIES.to_string()];
        for note in &self.notes {
            if !out.contains(&note.category) {
                out.push(note.category.clone());
            }
        }
        out
    }

    pub fn stats(&self) -> NoteStats {
        NoteStats {
            total_notes: self.notes.len(),
            audio_notes: self.count_kind(NoteKind::Audio),
            video_notes: self.count_kind(NoteKind::Video),
            starred_notes: self.notes.iter().filter(|n| n.is_starred).count(),
        }
    }

    fn count_kind(&self, kind: NoteKind) -> usize {
        self.notes.iter().filter(|n| n.kind == kind).count()
    }

    /// Category with the most notes; ties go to the later-seen category.
    pub fn most_active_category(&self) -> String {
        let mut order: Vec<&str> = Vec::new();
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for note in &self.notes {
            let count = counts.entry(note.category.as_str()).or_insert(0);
            if *count == 0 {
                order.push(note.category.as_str());
            }
            *count += 1;
        }
        order
            .into_iter()
            .reduce(|best, next| if counts[best] > counts[next] { best } else { next })
            .unwrap_or(DEFAULT_CATEGORY)
            .to_string()
    }

    /// Most frequent tags, highest first.
    pub fn tag_suggestions(&self) -> Vec<String> {
        let mut order: Vec<&str> = Vec::new();
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for tag in self.notes.iter().flat_map(|n| n.tags.iter()) {
            let count = counts.entry(tag.as_str()).or_insert(0);
            if *count == 0 {
                order.push(tag.as_str());
            }
            *count += 1;
        }
        order.sort_by(|a, b| counts[b].cmp(&counts[a]));
        order
            .into_iter()
            .take(TAG_SUGGESTION_LIMIT)
            .map(String::from)
            .collect()
    }

    /// Notes whose title prefix already occurs in an earlier note's title.
    pub fn potential_duplicates(&self) -> Vec<&Note> {
        let titles: Vec<String> = self.notes.iter().map(|n| n.title.to_lowercase()).collect();
        self.notes
            .iter()
            .enumerate()
            .filter(|(index, _)| {
                let prefix: String = titles[*index].chars().take(DUPLICATE_PREFIX_CHARS).collect();
                titles.iter().position(|t| t.contains(&prefix)) != Some(*index)
            })
            .map(|(_, note)| note)
            .collect()
    }

    // ── Export ──

    pub fn export_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.notes)
    }

    /// Write the collection to `smarta-notes-YYYY-MM-DD.json` inside `dir`.
    pub fn export_to_dir(&self, dir: &Path) -> db::Result<PathBuf> {
        let path = dir.join(export_file_name(Utc::now().date_naive()));
        std::fs::write(&path, self.export_json()?)?;
        tracing::info!(path = %path.display(), count = self.notes.len(), "exported notes");
        Ok(path)
    }
}

pub fn export_file_name(date: chrono::NaiveDate) -> String {
    format!("smarta-notes-{}.json", date.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(title: &str, category: &str) -> Note {
        let mut n = Note::new(title, "", NoteKind::Text);
        n.category = category.to_string();
        n
    }

    #[test]
    fn test_create_note_blank_title_is_ignored() {
        let mut book = NoteBook::new();
        assert!(book.create_note("   ", "body").is_none());
        assert!(book.is_empty());
    }

    #[test]
    fn test_create_note_categorizes_and_tags() {
        let mut book = NoteBook::new();
        let created = book
            .create_note("Standup", "Urgent: finish the project TODO list")
            .unwrap();
        assert_eq!(created.category, "Work");
        assert_eq!(created.tags, vec!["project", "todo", "urgent"]);
        assert_eq!(book.notes()[0].id, created.id);

        let second = book.create_note("Shower thoughts", "a brainstorm").unwrap();
        assert_eq!(second.category, "Ideas");
        assert_eq!(book.notes()[0].id, second.id);
    }

    #[test]
    fn test_smart_category_order_and_default() {
        assert_eq!(smart_category("Study group", "todo"), "Research");
        assert_eq!(smart_category("Groceries", "milk"), "Personal");
        assert_eq!(smart_category("Chores", "one task"), "Tasks");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "00:00:00");
        assert_eq!(format_duration(65), "00:01:05");
        assert_eq!(format_duration(3_725), "01:02:05");
        assert_eq!(format_duration(360_000), "100:00:00");
    }

    #[test]
    fn test_add_recording() {
        let mut book = NoteBook::new();
        let rec = book.add_recording(125, Some("blob:rec".to_string()));
        assert_eq!(rec.kind, NoteKind::Audio);
        assert!(rec.title.starts_with("Audio Recording "));
        assert!(rec.content.contains("Duration: 00:02:05"));
        assert!(rec.summary.unwrap().contains("duration of 00:02:05"));
        assert_eq!(rec.tags, vec!["audio", "recording"]);
        assert_eq!(rec.category, "Personal");
        assert_eq!(rec.duration, Some(125));
        assert_eq!(rec.audio_url.as_deref(), Some("blob:rec"));
    }

    #[test]
    fn test_insert_batch_prepends_in_order() {
        let mut book = NoteBook::from_notes(vec![note("old", "Personal")]);
        book.insert_batch(vec![note("a", "Uploads"), note("b", "Uploads")]);
        let titles: Vec<_> = book.notes().iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, ["a", "b", "old"]);
    }

    #[test]
    fn test_star_move_and_delete() {
        let first = note("first", "Personal");
        let id = first.id.clone();
        let mut book = NoteBook::from_notes(vec![first, note("second", "Work")]);

        assert_eq!(book.toggle_star(&id), Some(true));
        assert_eq!(book.toggle_star(&id), Some(false));
        assert_eq!(book.toggle_star("missing"), None);

        assert!(book.move_to_category(&id, "Ideas"));
        assert!(!book.move_to_category(&id, "Ideas"));
        assert_eq!(book.get(&id).unwrap().category, "Ideas");

        assert_eq!(book.delete(&id).unwrap().title, "first");
        assert!(book.delete(&id).is_none());
        assert_eq!(book.len(), 1);
    }

    #[test]
    fn test_update_replaces_by_id() {
        let original = note("draft", "Personal");
        let mut book = NoteBook::from_notes(vec![original.clone()]);
        let mut edited = original.clone();
        edited.content = "final text".to_string();
        assert!(book.update(edited));
        let stored = book.get(&original.id).unwrap();
        assert_eq!(stored.content, "final text");
        assert!(stored.updated_at >= original.updated_at);
        assert!(!book.update(note("stranger", "Personal")));
    }

    #[test]
    fn test_bulk_delete() {
        let notes = vec![note("a", "x"), note("b", "x"), note("c", "x")];
        let ids = vec![notes[0].id.clone(), notes[2].id.clone(), "nope".to_string()];
        let mut book = NoteBook::from_notes(notes);
        assert_eq!(book.bulk_delete(&ids), 2);
        assert_eq!(book.notes()[0].title, "b");
    }

    #[test]
    fn test_delete_category_moves_to_personal() {
        let mut book = NoteBook::from_notes(vec![
            note("a", "Work"),
            note("b", "Ideas"),
            note("c", "Work"),
        ]);
        assert_eq!(book.delete_category("Work"), 2);
        assert_eq!(book.categories(), vec!["all", "Personal", "Ideas"]);
    }

    #[test]
    fn test_filter_by_query_and_category() {
        let mut tagged = note("Groceries", "Personal");
        tagged.tags = vec!["Shopping".to_string()];
        let mut summarized = note("Call", "Work");
        summarized.summary = Some("Quarterly numbers".to_string());
        let book = NoteBook::from_notes(vec![tagged, summarized, note("Budget", "Work")]);

        assert_eq!(book.filter("shop", ALL_CATEGORIES).len(), 1);
        assert_eq!(book.filter("QUARTERLY", "Work")[0].title, "Call");
        assert!(book.filter("quarterly", "Personal").is_empty());
        assert_eq!(book.filter("", "Work").len(), 2);
    }

    #[test]
    fn test_stats() {
        let mut audio = Note::new("a", "", NoteKind::Audio);
        audio.is_starred = true;
        let video = Note::new("v", "", NoteKind::Video);
        let book = NoteBook::from_notes(vec![audio, video, note("t", "Personal")]);
        assert_eq!(
            book.stats(),
            NoteStats {
                total_notes: 3,
                audio_notes: 1,
                video_notes: 1,
                starred_notes: 1
            }
        );
    }

    #[test]
    fn test_most_active_category() {
        assert_eq!(NoteBook::new().most_active_category(), "Personal");
        let book = NoteBook::from_notes(vec![
            note("a", "Work"),
            note("b", "Ideas"),
            note("c", "Work"),
            note("d", "Ideas"),
        ]);
        assert_eq!(book.most_active_category(), "Ideas");
        let book = NoteBook::from_notes(vec![note("a", "Work"), note("b", "Work"), note("c", "Ideas")]);
        assert_eq!(book.most_active_category(), "Work");
    }

    #[test]
    fn test_tag_suggestions_by_frequency() {
        let mut notes = Vec::new();
        for (i, tags) in [vec!["b", "a"], vec!["a"], vec!["c", "a", "b"]].into_iter().enumerate() {
            let mut n = note(&format!("n{i}"), "x");
            n.tags = tags.into_iter().map(String::from).collect();
            notes.push(n);
        }
        let book = NoteBook::from_notes(notes);
        assert_eq!(book.tag_suggestions(), vec!["a", "b", "c"]);

        let many: Vec<Note> = (0..15)
            .map(|i| {
                let mut n = note("t", "x");
                n.tags = vec![format!("tag{i}")];
                n
            })
            .collect();
        assert_eq!(NoteBook::from_notes(many).tag_suggestions().len(), 10);
    }

    #[test]
    fn test_potential_duplicates() {
        let book = NoteBook::from_notes(vec![
            note("Project Kickoff Meeting", "Work"),
            note("Project Kickoff", "Work"),
            note("Groceries", "Personal"),
        ]);
        let dups: Vec<_> = book.potential_duplicates().iter().map(|n| n.title.clone()).collect();
        assert_eq!(dups, vec!["Project Kickoff"]);
    }

    #[test]
    fn test_export_to_dir() {
        let dir = tempfile::tempdir().unwrap();
        let book = NoteBook::from_notes(vec![note("exported", "Personal")]);
        let path = book.export_to_dir(dir.path()).unwrap();
        let name = path.file_name().unwrap().to_str().unwrap();
        assert_eq!(name, export_file_name(Utc::now().date_naive()));

        let written: Vec<Note> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written, book.notes());
    }

    #[test]
    fn test_export_file_name() {
        let date = chrono::NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(export_file_name(date), "smarta-notes-2024-03-07.json");
    }

    #[test]
    fn test_load_and_save_round_trip_through_store() {
        let db = Database::open_in_memory().unwrap();
        let mut book = NoteBook::new();
        book.create_note("Persist me", "body");
        book.save(&db).unwrap();
        assert_eq!(NoteBook::load(&db).unwrap().notes(), book.notes());
    }
}
