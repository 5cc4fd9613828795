use chrono::{DateTime, Utc};
use colored::Colorize;
use jotapp::audio::format_duration;
use jotapp::model::{Category, Note};
use serde::Serialize;
use timeago::Formatter;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const LINE_WIDTH: usize = 100;
const TIME_WIDTH: usize = 16;
const CATEGORY_WIDTH: usize = 15;
const MEMO_MARKER: &str = "♪";

pub(super) fn print_success(message: &str) {
    println!("{}", message.green());
}

pub(super) fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub(super) fn print_notes(notes: &[Note]) {
    if notes.is_empty() {
        println!("No notes found.");
        return;
    }

    for note in notes {
        let id_str = format!("{} ", note.id);
        let category_str = format!("{:<width$}", format!("[{}]", note.category), width = CATEGORY_WIDTH);
        let memo = note
            .audio
            .as_ref()
            .map(|m| format!(" {} {}", MEMO_MARKER, format_duration(m.duration_seconds)))
            .unwrap_or_default();
        let time_ago = format_time_ago(note.updated_at);

        let preview: String = note
            .content
            .chars()
            .take(60)
            .map(|c| if c == '\n' { ' ' } else { c })
            .collect();
        let title_content = if preview.is_empty() {
            note.title.clone()
        } else {
            format!("{} {}", note.title, preview)
        };

        let fixed_width = id_str.width() + CATEGORY_WIDTH + memo.width() + TIME_WIDTH;
        let available = LINE_WIDTH.saturating_sub(fixed_width);
        let title_display = truncate_to_width(&title_content, available);
        let padding = available.saturating_sub(title_display.width());

        println!(
            "{}{}{}{}{}{}",
            id_str.yellow(),
            colorize_category(note.category, &category_str),
            title_display,
            " ".repeat(padding),
            memo.cyan(),
            time_ago.dimmed()
        );
    }
}

pub(super) fn print_full_note(note: &Note) {
    println!("{}", note.title.bold());
    println!(
        "{} {}  {}",
        note.id.to_string().yellow(),
        colorize_category(note.category, note.category.as_str()),
        format!(
            "created {}, updated {}",
            note.created_at.format("%Y-%m-%d %H:%M"),
            note.updated_at.format("%Y-%m-%d %H:%M")
        )
        .dimmed()
    );
    if let Some(memo) = &note.audio {
        println!(
            "{}",
            format!("{} voice memo {}", MEMO_MARKER, format_duration(memo.duration_seconds)).cyan()
        );
    }
    println!("--------------------------------");
    println!("{}", note.content);
}

fn colorize_category(category: Category, text: &str) -> colored::ColoredString {
    match category {
        Category::Personal => text.green(),
        Category::Work => text.blue(),
        Category::Ideas => text.magenta(),
        Category::Uncategorised => text.normal(),
    }
}

fn truncate_to_width(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }

    let mut result = String::new();
    let mut current_width = 0;
    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > max_width.saturating_sub(1) {
            break;
        }
        result.push(c);
        current_width += char_width;
    }
    result.push('…');
    result
}

fn format_time_ago(timestamp: DateTime<Utc>) -> String {
    let duration = Utc::now().signed_duration_since(timestamp);
    let time_str = Formatter::new().convert(duration.to_std().unwrap_or_default());
    format!("{:>width$}", time_str, width = TIME_WIDTH)
}
