//! Task-specific assistant operations layered on the dispatcher.
//!
//! Each operation builds its own prompt, delegates to [`Dispatcher::respond`]
//! and falls back to a deterministic local answer whenever no remote model
//! produced the reply.

use crate::db::models::{Insight, Note, Suggestion, VideoSummary};
use crate::dispatcher::Dispatcher;
use chrono::{NaiveDate, Utc};
use tracing::debug;

const COMMON_TAGS: &[&str] = &[
    "important",
    "learning",
    "reference",
    "todo",
    "idea",
    "research",
    "notes",
    "study",
];

const TAG_RULES: &[(&[&str], &str)] = &[
    (&["learn", "study", "education"], "learning"),
    (&["work", "project", "task"], "work"),
    (&["idea", "concept", "thought"], "ideas"),
    (&["important", "critical", "key"], "important"),
];

fn excerpt(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

// ── Video summaries ──

pub async fn summarize_video(dispatcher: &Dispatcher, url: &str, video_id: &str) -> VideoSummary {
    let today = Utc::now().date_naive();
    if !dispatcher.is_remote() {
        return fallback_video_summary(url, video_id, today);
    }

    let prompt = format!(
        "Analyze this YouTube video and create a comprehensive summary:\n\n\
         Video URL: {url}\n\
         Video ID: {video_id}\n\n\
         Please provide:\n\
         1. A catchy title for the summary\n\
         2. Key points and insights from the video\n\
         3. Actionable takeaways\n\
         4. Main concepts covered\n\n\
         Format the response as a detailed note that would be valuable for studying and reference."
    );
    let reply = dispatcher.respond(&prompt, "", false, &[]).await;
    if !reply.is_remote() {
        return fallback_video_summary(url, video_id, today);
    }

    VideoSummary {
        title: format!("📹 YouTube Summary: {}", video_id),
        content: reply.content.clone(),
        note_content: reply.content,
    }
}

pub fn fallback_video_summary(url: &str, video_id: &str, date: NaiveDate) -> VideoSummary {
    VideoSummary {
        title: format!("📹 YouTube Summary: {}", video_id),
        content: format!(
            "🎬 **Video Summary**\n\nURL: {url}\nVideo ID: {video_id}\n\n✨ **Key Points:**\n• Educational content captured\n• Main concepts identified\n• Actionable insights extracted\n\n🚀 **Next Steps:**\n• Review and take notes\n• Apply key concepts\n• Share insights with others"
        ),
        note_content: format!(
            "# 📹 YouTube Video Summary\n\n**Source:** {url}\n**Video ID:** {video_id}\n**Date:** {date}\n\n## 📝 Summary\n\nThis video contains valuable educational content. Key topics covered include:\n\n• Main concept 1\n• Important insight 2\n• Practical application 3\n\n## 🎯 Action Items\n\n- [ ] Review key concepts\n- [ ] Apply learnings\n- [ ] Take detailed notes",
            date = date.format("%Y-%m-%d")
        ),
    }
}

// ── Search ──

fn note_matches(note: &Note, needle: &str) -> bool {
    note.title.to_lowercase().contains(needle)
        || note.content.to_lowercase().contains(needle)
        || note.tags.iter().any(|t| t.to_lowercase().contains(needle))
}

/// Case-insensitive match on title, content and tags.
pub fn basic_search(query: &str, notes: &[Note]) -> Vec<Note> {
    let needle = query.to_lowercase();
    notes
        .iter()
        .filter(|n| note_matches(n, &needle))
        .cloned()
        .collect()
}

/// Related terms from a free-form model reply, one per comma or line.
fn parse_terms(reply: &str) -> Vec<String> {
    reply
        .split([',', '\n'])
        .map(|t| {
            t.trim()
                .trim_start_matches(|c: char| {
                    c == '-' || c == '*' || c == '•' || c == '.' || c.is_ascii_digit()
                })
                .trim()
                .trim_matches('"')
                .to_lowercase()
        })
        .filter(|t| t.chars().count() >= 3 && t.chars().count() <= 40)
        .take(10)
        .collect()
}

/// Direct matches first, then notes matching model-suggested related terms.
pub async fn enhance_search(dispatcher: &Dispatcher, query: &str, notes: &[Note]) -> Vec<Note> {
    let mut results = basic_search(query, notes);
    if !dispatcher.is_remote() || query.trim().is_empty() {
        return results;
    }

    let prompt = format!(
        "Enhance this search query for better note discovery:\n\n\
         Original query: \"{query}\"\n\
         Number of notes: {count}\n\n\
         Suggest related terms, synonyms, and concepts that might help find relevant notes. \
         Return only the terms, separated by commas.",
        count = notes.len()
    );
    let reply = dispatcher.respond(&prompt, "", false, &[]).await;
    if !reply.is_remote() {
        return results;
    }

    let terms = parse_terms(&reply.content);
    debug!(?terms, "search expanded");
    for note in notes {
        if results.iter().any(|r| r.id == note.id) {
            continue;
        }
        if terms.iter().any(|t| note_matches(note, t)) {
            results.push(note.clone());
        }
    }
    results
}

// ── Insights ──

pub async fn generate_insights(dispatcher: &Dispatcher, notes: &[Note]) -> Vec<Insight> {
    if !dispatcher.is_remote() {
        return fallback_insights(notes.len());
    }

    let sample = notes
        .iter()
        .take(10)
        .map(|n| format!("Title: {}\nContent: {}...", n.title, excerpt(&n.content, 200)))
        .collect::<Vec<_>>()
        .join("\n\n");
    let prompt = format!(
        "Analyze these recent notes and provide insights:\n\n{sample}\n\n\
         Provide 3-5 insights about:\n\
         1. Common themes\n\
         2. Knowledge gaps\n\
         3. Productivity patterns\n\
         4. Learning opportunities\n\
         5. Content organization suggestions"
    );
    let reply = dispatcher.respond(&prompt, "", false, &[]).await;
    if !reply.is_remote() {
        return fallback_insights(notes.len());
    }

    vec![Insight {
        id: new_id(),
        kind: "analysis".to_string(),
        content: reply.content,
        timestamp: Utc::now(),
    }]
}

pub fn fallback_insights(note_count: usize) -> Vec<Insight> {
    let now = Utc::now();
    vec![
        Insight {
            id: new_id(),
            kind: "productivity".to_string(),
            content: format!(
                "📊 **Productivity Insight**\n\nYou have {} notes in your collection. Recent activity shows consistent note-taking habits. Consider organizing by themes for better discovery.",
                note_count
            ),
            timestamp: now,
        },
        Insight {
            id: new_id(),
            kind: "learning".to_string(),
            content: "🧠 **Learning Pattern**\n\nYour notes cover diverse topics. This indicates strong curiosity and learning drive. Consider creating connections between related concepts.".to_string(),
            timestamp: now,
        },
    ]
}

// ── Suggestions ──

pub async fn generate_suggestions(dispatcher: &Dispatcher, notes: &[Note]) -> Vec<Suggestion> {
    if !dispatcher.is_remote() {
        return fallback_suggestions();
    }

    let sample = notes
        .iter()
        .take(5)
        .map(|n| format!("{}: {}...", n.title, excerpt(&n.content, 100)))
        .collect::<Vec<_>>()
        .join("\n");
    let prompt = format!(
        "Based on these notes, suggest 3-5 actionable improvements:\n\n{sample}\n\n\
         Suggest specific actions for:\n\
         1. Better organization\n\
         2. Content enhancement\n\
         3. Study strategies\n\
         4. Productivity improvements"
    );
    let reply = dispatcher.respond(&prompt, "", false, &[]).await;
    if !reply.is_remote() {
        return fallback_suggestions();
    }

    vec![Suggestion {
        id: new_id(),
        title: "🧠 AI Suggestions".to_string(),
        description: reply.content,
        action: "review".to_string(),
    }]
}

pub fn fallback_suggestions() -> Vec<Suggestion> {
    [
        (
            "🏷️ Organize with Tags",
            "Add relevant tags to your notes for better organization and discovery",
            "tag_notes",
        ),
        (
            "⭐ Star Important Notes",
            "Mark your most valuable notes as favorites for quick access",
            "star_notes",
        ),
        (
            "📚 Create Study Sessions",
            "Review your notes regularly to reinforce learning",
            "study_session",
        ),
    ]
    .into_iter()
    .map(|(title, description, action)| Suggestion {
        id: new_id(),
        title: title.to_string(),
        description: description.to_string(),
        action: action.to_string(),
    })
    .collect()
}

// ── Tags ──

pub async fn suggest_tags(dispatcher: &Dispatcher, content: &str) -> Vec<String> {
    if !dispatcher.is_remote() {
        return fallback_tags(content);
    }

    let prompt = format!(
        "Suggest 5-8 relevant tags for this content:\n\n{}...\n\n\
         Provide tags that would help with organization and discovery. \
         Return only the tags, separated by commas.",
        excerpt(content, 500)
    );
    let reply = dispatcher.respond(&prompt, "", false, &[]).await;
    if !reply.is_remote() {
        return fallback_tags(content);
    }

    let tags: Vec<String> = reply
        .content
        .split(',')
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();
    if tags.is_empty() {
        fallback_tags(content)
    } else {
        tags
    }
}

pub fn fallback_tags(content: &str) -> Vec<String> {
    let text = content.to_lowercase();
    let tags: Vec<String> = TAG_RULES
        .iter()
        .filter(|(keywords, _)| keywords.iter().any(|k| text.contains(k)))
        .map(|(_, tag)| tag.to_string())
        .collect();
    if tags.is_empty() {
        COMMON_TAGS.iter().take(4).map(|t| t.to_string()).collect()
    } else {
        tags
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AiConfig;
    use crate::db::models::NoteKind;

    fn offline() -> Dispatcher {
        Dispatcher::new(&AiConfig::default()).unwrap()
    }

    #[test]
    fn test_fallback_tags_table() {
        assert_eq!(
            fallback_tags("Studying the project's key concepts"),
            vec!["learning", "work", "ideas", "important"]
        );
        assert_eq!(fallback_tags("Today I worked late"), vec!["work"]);
    }

    #[test]
    fn test_fallback_tags_default() {
        assert_eq!(
            fallback_tags("groceries: milk, eggs"),
            vec!["important", "learning", "reference", "todo"]
        );
    }

    #[test]
    fn test_fallback_insights_mention_count() {
        let insights = fallback_insights(7);
        assert_eq!(insights.len(), 2);
        assert!(insights[0].content.contains("You have 7 notes"));
        assert_eq!(insights[1].kind, "learning");
    }

    #[test]
    fn test_fallback_video_summary_embeds_link() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        let summary = fallback_video_summary("https://youtu.be/abcdefghijk", "abcdefghijk", date);
        assert_eq!(summary.title, "📹 YouTube Summary: abcdefghijk");
        assert!(summary.content.contains("URL: https://youtu.be/abcdefghijk"));
        assert!(summary.note_content.contains("**Date:** 2024-03-09"));
    }

    #[test]
    fn test_parse_terms() {
        let terms = parse_terms("1. Budget, - finance\n• \"Q3 planning\", ok");
        assert_eq!(terms, vec!["budget", "finance", "q3 planning"]);
    }

    #[test]
    fn test_basic_search_matches_tags_case_insensitively() {
        let mut tagged = Note::new("Groceries", "milk", NoteKind::Text);
        tagged.tags = vec!["Errands".into()];
        let other = Note::new("Standup", "sprint", NoteKind::Text);
        let found = basic_search("errand", &[tagged.clone(), other]);
        assert_eq!(found, vec![tagged]);
    }

    #[tokio::test]
    async fn test_offline_operations_use_fallbacks() {
        let dispatcher = offline();
        let notes = vec![Note::new("Meeting", "agenda", NoteKind::Text)];

        assert_eq!(generate_insights(&dispatcher, &notes).await.len(), 2);
        let suggestions = generate_suggestions(&dispatcher, &notes).await;
        assert_eq!(suggestions.len(), 3);
        assert_eq!(suggestions[1].action, "star_notes");
        assert_eq!(suggest_tags(&dispatcher, "a new idea").await, vec!["ideas"]);
        assert_eq!(enhance_search(&dispatcher, "MEET", &notes).await.len(), 1);
        let summary = summarize_video(&dispatcher, "u", "abcdefghijk").await;
        assert!(summary.content.contains("Video Summary"));
    }
}
