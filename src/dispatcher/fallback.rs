//! Canned replies used when no remote model answers.
//!
//! Everything here is a pure function of its arguments.

struct Template {
    keywords: &'static [&'static str],
    reply: &'static str,
}

const EDITING: &[Template] = &[
    Template {
        keywords: &["improve", "better", "enhance"],
        reply: "✨ **AI Writing Enhancement** (Fallback Mode)\n\n🔧 **Quick Improvements:**\n• Add more specific examples and details\n• Use stronger action verbs and descriptive language\n• Break up long paragraphs for better readability\n• Include bullet points for key information\n• Add section headers to organize content\n\n💡 **Pro Tip:** The AI models are currently busy, but I can still help with basic writing suggestions!",
    },
    Template {
        keywords: &["rewrite", "rephrase"],
        reply: "🔄 **Ready to help you rewrite!**\n\nPlease paste the specific text you'd like me to rephrase, or tell me which section needs improvement. I can help with:\n\n• Clarity and flow\n• Tone and style\n• Conciseness\n• Professional language",
    },
    Template {
        keywords: &["expand", "elaborate"],
        reply: "📝 **Content Expansion Ideas:**\n\n• Add real-world examples\n• Include step-by-step instructions\n• Provide background context\n• Add supporting statistics or facts\n• Include personal insights or experiences\n\nWhich part of your note would you like to expand?",
    },
    Template {
        keywords: &["structure", "organize"],
        reply: "🏗️ **Structure & Organization Tips:**\n\n• Use clear headings (# ## ###)\n• Create bullet lists for key points\n• Number steps in processes\n• Use **bold** for emphasis\n• Add horizontal rules (---) to separate sections\n\nWould you like help reorganizing a specific section?",
    },
    Template {
        keywords: &["grammar", "correct"],
        reply: "📚 **Grammar & Style Check:**\n\nI can help you with:\n\n• Grammar and punctuation\n• Sentence structure\n• Word choice and vocabulary\n• Consistency in tense and voice\n• Professional tone\n\nPaste the text you'd like me to review!",
    },
];

const EDITING_DEFAULT: &str = "✍️ **Writing Assistant Ready!**\n\nI'm here to help you improve your note. I can:\n\n• **Enhance** your writing style\n• **Rewrite** sections for clarity\n• **Expand** on ideas\n• **Organize** content structure\n• **Check** grammar and flow\n\nWhat would you like help with?";

const SUMMARY_KEYWORDS: &[&str] = &["summary", "summarize"];

const READING: &[Template] = &[
    Template {
        keywords: &["key points", "main points", "highlights"],
        reply: "🎯 **Key Points Analysis:**\n\nI can help you identify:\n\n• Main concepts and ideas\n• Important facts and figures\n• Action items and next steps\n• Key insights and conclusions\n\nWould you like me to extract the key points from this note?",
    },
    Template {
        keywords: &["explain", "clarify"],
        reply: "💡 **Happy to Explain!**\n\nI can help clarify:\n\n• Complex concepts or terminology\n• Relationships between ideas\n• Background context\n• Practical applications\n\nWhat specific part would you like me to explain?",
    },
    Template {
        keywords: &["questions", "quiz"],
        reply: "❓ **Study Questions:**\n\nI can create:\n\n• Review questions based on the content\n• Quiz questions to test understanding\n• Discussion prompts\n• Critical thinking questions\n\nWould you like me to generate some questions from this note?",
    },
];

const READING_DEFAULT: &str = "🤖 **AI Assistant Ready!**\n\nI can help you with this note by:\n\n• **Summarizing** the content\n• **Explaining** complex parts\n• **Extracting** key points\n• **Creating** study questions\n• **Analyzing** the information\n\nWhat would you like to explore?";

fn matches_any(input: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| input.contains(k))
}

fn lookup(input: &str, table: &[Template]) -> Option<&'static str> {
    table
        .iter()
        .find(|t| matches_any(input, t.keywords))
        .map(|t| t.reply)
}

/// Keyword-matched reply for `prompt`. The editing and reading tables are
/// disjoint; the reading summary template reports the context's word count.
pub fn fallback_response(prompt: &str, context: &str, editing: bool) -> String {
    let input = prompt.to_lowercase();

    if editing {
        return lookup(&input, EDITING).unwrap_or(EDITING_DEFAULT).to_string();
    }

    if matches_any(&input, SUMMARY_KEYWORDS) {
        let word_count = context.split_whitespace().count();
        return format!(
            "📝 **Quick Summary:**\n\nThis note contains {} words and covers several key topics. Would you like me to:\n\n• Provide a detailed summary\n• Extract the main points\n• Identify key takeaways\n• Create an outline\n\nJust let me know what type of summary would be most helpful!",
            word_count
        );
    }

    lookup(&input, READING).unwrap_or(READING_DEFAULT).to_string()
}
