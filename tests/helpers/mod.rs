use serde_json::Value;
use studyshare::domain::{Collection, User};
use studyshare::util::testing::{as_fields, note_fields, MockBackend};

/// Test fixture: a mock backend seeded with a small catalogue
#[allow(dead_code)]
pub struct TestWorld {
    pub backend: MockBackend,
    pub user: User,
}

#[allow(dead_code)]
impl TestWorld {
    /// Catalogue plus a signed-in session for `Ada`
    pub fn signed_in() -> Self {
        Self::build(true)
    }

    /// Catalogue, account registered but no session
    pub fn anonymous() -> Self {
        Self::build(false)
    }

    fn build(signed_in: bool) -> Self {
        let mut builder = MockBackend::builder()
            .with_user(test_users::BOB_ID, "Bob", "bob@example.com")
            .with_user(test_users::ADA_ID, "Ada", test_users::ADA_EMAIL);
        if signed_in {
            builder = builder.signed_in();
        }
        for (id, fields) in catalogue() {
            builder = builder.with_note(id, fields);
        }
        let backend = builder.build();

        let user = User {
            id: test_users::ADA_ID.to_string(),
            name: "Ada".to_string(),
            email: test_users::ADA_EMAIL.to_string(),
            created_at: chrono::Utc::now(),
        };
        Self { backend, user }
    }

    pub fn likes(&self, note_id: &str) -> i64 {
        self.backend.counter(Collection::Notes, note_id, "likes")
    }
}

fn note(title: &str, kind: &str, overrides: Value) -> serde_json::Map<String, Value> {
    let mut fields = note_fields(title, kind);
    fields.extend(as_fields(overrides));
    fields
}

/// Seeded in this order, so the last one is the newest
fn catalogue() -> Vec<(&'static str, serde_json::Map<String, Value>)> {
    vec![
        (
            test_notes::CALCULUS_NOTE,
            note(
                "Calculus limits",
                "note",
                serde_json::json!({"likes": 10, "downloads": 3, "authorId": test_users::ADA_ID}),
            ),
        ),
        (
            test_notes::CALCULUS_PAPER,
            note(
                "Calculus final exam",
                "question",
                serde_json::json!({"likes": 2, "downloads": 20, "academicYear": "3rd Year", "authorId": test_users::ADA_ID}),
            ),
        ),
        (
            test_notes::CHEMISTRY,
            note(
                "Organic chemistry",
                "note",
                serde_json::json!({"likes": 5, "downloads": 1, "subject": "Chemistry", "academicYear": "1st Year", "authorId": test_users::BOB_ID, "authorName": "Bob"}),
            ),
        ),
        (
            test_notes::VECTOR_CALCULUS,
            note(
                "Vector calculus",
                "note",
                serde_json::json!({"likes": 7, "downloads": 0, "authorId": test_users::BOB_ID, "authorName": "Bob"}),
            ),
        ),
    ]
}

/// Known seeded note IDs
#[allow(dead_code)]
pub mod test_notes {
    pub const CALCULUS_NOTE: &str = "calc-note";
    pub const CALCULUS_PAPER: &str = "calc-paper";
    pub const CHEMISTRY: &str = "chem-note";
    pub const VECTOR_CALCULUS: &str = "vector-calc";
    pub const NONEXISTENT: &str = "missing-note";
}

#[allow(dead_code)]
pub mod test_users {
    pub const ADA_ID: &str = "u1";
    pub const ADA_EMAIL: &str = "ada@example.com";
    pub const BOB_ID: &str = "u2";
}
