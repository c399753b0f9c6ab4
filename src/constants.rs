// src/constants.rs
//
// Application-wide constants shared by the views and the backends.

/// Maximum number of notes the explore view asks for.
///
/// Used in: `application/explore.rs`
pub const EXPLORE_PAGE_SIZE: usize = 50;

/// Number of newest notes shown on the home feed.
///
/// Used in: `application/feed.rs`
pub const FEED_PAGE_SIZE: usize = 20;

/// Upload ceiling in bytes (10 MiB).
///
/// Files above this size are rejected before anything is sent.
///
/// Used in: `application/upload.rs`
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// The only content type accepted for uploads.
pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// Minimum password length accepted by the identity service.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Subjects offered by the explore filters.
pub const SUBJECTS: [&str; 10] = [
    "Mathematics",
    "Physics",
    "Chemistry",
    "Biology",
    "Computer Science",
    "Engineering",
    "Economics",
    "History",
    "Literature",
    "Psychology",
];

/// Academic years offered by the explore filters and the upload form.
pub const ACADEMIC_YEARS: [&str; 6] = [
    "1st Year", "2nd Year", "3rd Year", "4th Year", "Masters", "PhD",
];

/// Upload progress reported once the file is stored but the note is not yet created.
pub const PROGRESS_FILE_STORED: u8 = 50;
