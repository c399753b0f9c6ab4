// src/cli/args.rs
use chrono::NaiveDate;
use clap::builder::PossibleValuesParser;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::application::SortBy;
use crate::constants::{ACADEMIC_YEARS, SUBJECTS};
use crate::domain::{NoteKind, Priority, TodoFilter};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)] // Read from `Cargo.toml`
#[command(arg_required_else_help = true, disable_help_subcommand = true)]
pub struct Args {
    /// Path to the config file (optional)
    #[arg(short, long, value_name = "CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Sign in with email and password
    Login {
        #[arg(value_name = "EMAIL")]
        email: String,

        #[arg(short, long)]
        password: String,
    },

    /// Create an account and sign in
    Register {
        #[arg(short, long)]
        name: String,

        #[arg(value_name = "EMAIL")]
        email: String,

        #[arg(short, long)]
        password: String,
    },

    /// Sign out of the current session
    Logout,

    /// Show the signed-in account
    Whoami,

    /// Newest notes
    Feed,

    /// Search and filter notes
    Explore {
        /// Free-text search on titles
        #[arg(value_name = "SEARCH")]
        search: Option<String>,

        /// note or question
        #[arg(short = 't', long = "type")]
        kind: Option<NoteKind>,

        #[arg(long, value_parser = PossibleValuesParser::new(SUBJECTS))]
        subject: Option<String>,

        #[arg(long, value_parser = PossibleValuesParser::new(ACADEMIC_YEARS))]
        year: Option<String>,

        /// recent, popular or downloads
        #[arg(short, long, default_value = "recent")]
        sort_by: SortBy,

        /// Start from an address query string, e.g. "?search=calculus&sortBy=popular"
        #[arg(long, value_name = "QUERY", conflicts_with_all = ["search", "kind", "subject", "year", "sort_by"])]
        address: Option<String>,
    },

    /// Show a note with its comments
    Show {
        #[arg(value_name = "NOTE_ID")]
        note_id: String,
    },

    /// Like or unlike a note
    Like {
        #[arg(value_name = "NOTE_ID")]
        note_id: String,
    },

    /// Download a note's file
    Download {
        #[arg(value_name = "NOTE_ID")]
        note_id: String,

        /// Target path (defaults to the stored file name)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Comment on a note
    Comment {
        #[arg(value_name = "NOTE_ID")]
        note_id: String,

        #[arg(value_name = "TEXT")]
        content: String,
    },

    /// Upload a PDF as a new note
    Upload {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        #[arg(long)]
        title: String,

        #[arg(long, default_value = "")]
        description: String,

        #[arg(long, value_parser = PossibleValuesParser::new(SUBJECTS))]
        subject: String,

        #[arg(long, value_parser = PossibleValuesParser::new(ACADEMIC_YEARS))]
        year: Option<String>,

        /// note or question
        #[arg(short = 't', long = "type", default_value = "note")]
        kind: String,

        /// Comma-separated tags
        #[arg(long, default_value = "")]
        tags: String,
    },

    /// Show a profile (your own by default)
    Profile {
        #[arg(value_name = "USER_ID")]
        user_id: Option<String>,
    },

    /// Manage your to-do list
    Todo {
        #[command(subcommand)]
        command: TodoCommand,
    },

    /// Show what the app would display for an address
    Route {
        #[arg(value_name = "PATH")]
        path: String,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum TodoCommand {
    /// List to-dos
    List {
        /// all, pending or completed
        #[arg(short, long, default_value = "all")]
        filter: TodoFilter,
    },

    /// Add a to-do
    Add {
        #[arg(value_name = "TITLE")]
        title: String,

        #[arg(short, long, default_value = "")]
        description: String,

        /// low, medium or high
        #[arg(short, long)]
        priority: Option<Priority>,

        /// Due date as YYYY-MM-DD
        #[arg(long)]
        due: Option<NaiveDate>,
    },

    /// Toggle a to-do between pending and completed
    Done {
        #[arg(value_name = "TODO_ID")]
        todo_id: String,
    },

    /// Delete a to-do
    Delete {
        #[arg(value_name = "TODO_ID")]
        todo_id: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_explore_flags_when_parsing_then_typed_filters() {
        let args = Args::try_parse_from([
            "studyshare", "explore", "calculus", "--type", "note", "--year", "2nd Year", "--sort-by", "popular",
        ])
        .unwrap();

        match args.command {
            Command::Explore { search, kind, year, sort_by, .. } => {
                assert_eq!(search.as_deref(), Some("calculus"));
                assert_eq!(kind, Some(NoteKind::Note));
                assert_eq!(year.as_deref(), Some("2nd Year"));
                assert_eq!(sort_by, SortBy::Popular);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn given_unknown_subject_when_parsing_then_rejected() {
        let result = Args::try_parse_from(["studyshare", "explore", "--subject", "Astrology"]);
        assert!(result.is_err());
    }

    #[test]
    fn given_todo_add_when_parsing_then_due_date_parsed() {
        let args = Args::try_parse_from([
            "studyshare", "todo", "add", "Revise", "--priority", "high", "--due", "2024-06-01",
        ])
        .unwrap();

        match args.command {
            Command::Todo { command: TodoCommand::Add { title, priority, due, .. } } => {
                assert_eq!(title, "Revise");
                assert_eq!(priority, Some(Priority::High));
                assert_eq!(due, NaiveDate::from_ymd_opt(2024, 6, 1));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
