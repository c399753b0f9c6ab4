// src/ports/terminal.rs
use chrono::{DateTime, Utc};
use std::fmt::Write;

use crate::application::explore::ExploreStats;
use crate::application::{ExploreFilters, LikeState, ProfileStats};
use crate::domain::{Comment, Note, NoteKind, Todo, User};
use crate::ports::notify::{Toast, ToastLevel};
use crate::util::text::{clamp, format_date, format_file_size, format_relative};

const VISIBLE_TAGS: usize = 3;

/// Renders views as plain terminal text.
#[derive(Debug)]
pub struct TerminalPresenter {
    now: DateTime<Utc>,
}

impl TerminalPresenter {
    pub fn new() -> Self {
        Self { now: Utc::now() }
    }

    /// Presenter with a fixed clock, for reproducible output.
    pub fn at(now: DateTime<Utc>) -> Self {
        Self { now }
    }

    fn kind_badge(kind: NoteKind) -> &'static str {
        match kind {
            NoteKind::Note => "[Note]",
            NoteKind::Question => "[Question Paper]",
        }
    }

    /// One card in a list: header, clamped description, tags, counters.
    pub fn render_card(&self, note: &Note) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "{} {}  ({})",
            Self::kind_badge(note.kind),
            note.title,
            note.id
        );
        let _ = writeln!(
            out,
            "  by {} · {}",
            note.author_display(),
            format_relative(&note.created_at, &self.now)
        );
        if !note.description.is_empty() {
            let _ = writeln!(out, "  {}", clamp(&note.description, 120));
        }

        if !note.tags.is_empty() {
            let shown: Vec<String> = note
                .tags
                .iter()
                .take(VISIBLE_TAGS)
                .map(|t| format!("#{t}"))
                .collect();
            let mut line = shown.join(" ");
            if note.tags.len() > VISIBLE_TAGS {
                let _ = write!(line, " +{} more", note.tags.len() - VISIBLE_TAGS);
            }
            let _ = writeln!(out, "  {line}");
        }

        let mut meta = Vec::new();
        if !note.subject.is_empty() {
            meta.push(note.subject.clone());
        }
        if !note.academic_year.is_empty() {
            meta.push(format!("Year: {}", note.academic_year));
        }
        if !meta.is_empty() {
            let _ = writeln!(out, "  {}", meta.join(" · "));
        }
        let _ = writeln!(
            out,
            "  ♥ {}  💬 {}  ⬇ {}",
            note.likes, note.comments, note.downloads
        );
        out
    }

    pub fn render_list(&self, notes: &[Note]) -> String {
        if notes.is_empty() {
            return "No notes yet.\n".to_string();
        }
        notes
            .iter()
            .map(|n| self.render_card(n))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn render_explore(&self, filters: &ExploreFilters, stats: ExploreStats, notes: &[Note]) -> String {
        let mut out = String::new();
        let noun = if stats.results == 1 { "result" } else { "results" };
        let _ = write!(out, "{} {} found", stats.results, noun);
        if !filters.search.is_empty() {
            let _ = write!(out, " for \"{}\"", filters.search);
        }
        let _ = writeln!(out, "  ({} Notes, {} Papers)", stats.notes, stats.papers);

        if notes.is_empty() {
            out.push_str("No results found. Try adjusting your search terms or filters.\n");
        } else {
            out.push('\n');
            out.push_str(&self.render_list(notes));
        }
        out
    }

    /// Full note page with like state and comments.
    pub fn render_detail(&self, note: &Note, like: &LikeState, comments: &[Comment]) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", note.title);
        let _ = writeln!(
            out,
            "{} · by {} · {}",
            note.kind.label(),
            note.author_display(),
            format_date(&note.created_at)
        );
        if !note.description.is_empty() {
            let _ = writeln!(out, "\n{}\n", note.description);
        }
        if !note.tags.is_empty() {
            let _ = writeln!(out, "Tags: {}", note.tags.join(", "));
        }
        if !note.subject.is_empty() {
            let _ = writeln!(out, "Subject: {}", note.subject);
        }
        if !note.academic_year.is_empty() {
            let _ = writeln!(out, "Year: {}", note.academic_year);
        }
        let _ = writeln!(
            out,
            "File: {} ({})",
            note.file_name,
            format_file_size(note.file_size)
        );
        let heart = if like.liked() { "♥" } else { "♡" };
        let _ = writeln!(
            out,
            "{} {}  💬 {}  ⬇ {}",
            heart,
            like.count(),
            note.comments,
            note.downloads
        );

        let _ = writeln!(out, "\nComments ({})", comments.len());
        if comments.is_empty() {
            out.push_str("  No comments yet. Be the first to comment!\n");
        }
        for comment in comments {
            let name = if comment.user_name.is_empty() {
                "Anonymous"
            } else {
                comment.user_name.as_str()
            };
            let _ = writeln!(
                out,
                "  {} · {}\n    {}",
                name,
                format_relative(&comment.created_at, &self.now),
                comment.content
            );
        }
        out
    }

    pub fn render_todos(&self, todos: &[&Todo]) -> String {
        if todos.is_empty() {
            return "No todos yet.\n".to_string();
        }
        let mut out = String::new();
        for todo in todos {
            let check = if todo.completed { "[x]" } else { "[ ]" };
            let _ = write!(out, "{} {} ({}) [{}]", check, todo.title, todo.id, todo.priority);
            if let Some(due) = &todo.due_date {
                let _ = write!(out, " due {}", due.format("%Y-%m-%d"));
            }
            out.push('\n');
            if !todo.description.is_empty() {
                let _ = writeln!(out, "    {}", todo.description);
            }
        }
        out
    }

    pub fn render_profile(&self, user: Option<&User>, stats: ProfileStats, notes: &[Note]) -> String {
        let mut out = String::new();
        if let Some(user) = user {
            let _ = writeln!(out, "({}) {} <{}>", user.initial(), user.name, user.email);
            let _ = writeln!(out, "Member since {}", format_date(&user.created_at));
        }
        let _ = writeln!(
            out,
            "Notes: {}  Likes: {}  Downloads: {}\n",
            stats.total_notes, stats.total_likes, stats.total_downloads
        );
        out.push_str(&self.render_list(notes));
        out
    }

    pub fn render_toast(&self, toast: &Toast) -> String {
        match toast.level {
            ToastLevel::Success => format!("✔ {}", toast.message),
            ToastLevel::Error => format!("✖ {}", toast.message),
        }
    }
}

impl Default for TerminalPresenter {
    fn default() -> Self {
        Self::new()
    }
}
