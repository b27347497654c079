use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The five persisted note kinds.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum NoteKind {
    Text,
    Audio,
    Video,
    Image,
    Document,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    pub title: String,
    pub content: String,
    #[serde(rename = "type")]
    pub kind: NoteKind,
    pub tags: Vec<String>,
    pub category: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcription: Option<String>,
    #[serde(default)]
    pub is_starred: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
    /// Seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
}

impl Note {
    /// A fresh, unstarred note stamped with the current time.
    pub fn new(title: impl Into<String>, content: impl Into<String>, kind: NoteKind) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.into(),
            content: content.into(),
            kind,
            tags: Vec::new(),
            category: "Personal".to_string(),
            created_at: now,
            updated_at: now,
            summary: None,
            transcription: None,
            is_starred: false,
            audio_url: None,
            duration: None,
            file_url: None,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Ai,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ChatMessage {
    pub id: String,
    #[serde(rename = "type")]
    pub sender: Sender,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(sender: Sender, content: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            sender,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Dashboard insight card.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Insight {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Suggestion {
    pub id: String,
    pub title: String,
    pub description: String,
    pub action: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VideoSummary {
    pub title: String,
    pub content: String,
    pub note_content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_serializes_camel_case() {
        let mut note = Note::new("Title", "Body", NoteKind::Document);
        note.is_starred = true;
        let json = serde_json::to_value(&note).unwrap();
        assert_eq!(json["type"], "document");
        assert_eq!(json["isStarred"], true);
        assert!(json.get("createdAt").is_some());
        assert!(json.get("summary").is_none());
    }

    #[test]
    fn test_note_ids_are_unique_and_non_empty() {
        let a = Note::new("a", "", NoteKind::Text);
        let b = Note::new("b", "", NoteKind::Text);
        assert!(!a.id.is_empty());
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_chat_message_sender_wire_name() {
        let msg = ChatMessage::new(Sender::Ai, "hi");
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "ai");
    }
}
