//! Message formatting for Telegram's legacy `Markdown` parse mode.

use chrono::DateTime;
use chrono_tz::Tz;
use dinnerbot_core::Recommendation;

/// Maximum text length of a single `sendMessage` call, in UTF-16 code units
/// (the unit the Bot API counts in).
pub const MESSAGE_LENGTH_LIMIT: usize = 4096;

/// Escape characters that legacy Markdown treats as entity delimiters.
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '_' | '*' | '`' | '[') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Render a recommendation as a Markdown message stamped with `now`.
#[must_use]
pub fn render_recommendation(recommendation: &Recommendation, now: DateTime<Tz>) -> String {
    let mut out = format!(
        "🍽️ *{}*\n📅 {}\n",
        escape(&recommendation.title),
        now.format("%Y-%m-%d (%a)")
    );

    for (i, dish) in recommendation.dishes.iter().enumerate() {
        out.push('\n');
        out.push_str(&format!("*{}. {}*", i + 1, escape(&dish.name)));
        if let Some(minutes) = dish.cooking_minutes {
            out.push_str(&format!(" ⏱ {minutes}분"));
        }
        out.push('\n');
        if !dish.description.trim().is_empty() {
            out.push_str(&escape(dish.description.trim()));
            out.push('\n');
        }
        if !dish.ingredients.is_empty() {
            out.push_str(&format!("🥬 재료: {}\n", escape(&dish.ingredients.join(", "))));
        }
    }

    if let Some(tip) = recommendation.tip.as_deref().map(str::trim) {
        if !tip.is_empty() {
            out.push_str(&format!("\n💡 {}\n", escape(tip)));
        }
    }

    out
}

/// Split `text` into chunks of at most `limit` UTF-16 code units, breaking on
/// line boundaries where possible. Lines longer than `limit` are hard-wrapped
/// between characters.
#[must_use]
pub fn split_message(text: &str, limit: usize) -> Vec<String> {
    let limit = limit.max(2);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for line in text.split_inclusive('\n') {
        let line_len = utf16_len(line);
        if current_len + line_len > limit && !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if line_len <= limit {
            current.push_str(line);
            current_len += line_len;
            continue;
        }
        for c in line.chars() {
            let width = c.len_utf16();
            if current_len + width > limit {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            current.push(c);
            current_len += width;
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

fn utf16_len(text: &str) -> usize {
    text.chars().map(char::len_utf16).sum()
}
