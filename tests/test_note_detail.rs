mod helpers;

use helpers::{test_notes, test_users, TestWorld};
use studyshare::application::likes::has_liked;
use studyshare::application::{Backend, NoteDetailView};
use studyshare::domain::{Collection, DomainError, Route};
use studyshare::ports::ToastLevel;
use studyshare::util::testing::{MockBackend, Operation};

fn open<'a>(world: &'a TestWorld, note_id: &str) -> NoteDetailView<&'a MockBackend> {
    let mut view = NoteDetailView::new(&world.backend, note_id, Some(&world.user));
    view.load().expect("note should load");
    view
}

#[test]
fn given_existing_note_when_loading_then_note_and_like_state_set() {
    // Arrange
    let world = TestWorld::signed_in();

    // Act
    let view = open(&world, test_notes::CALCULUS_NOTE);

    // Assert
    let note = view.note().expect("note loaded");
    assert_eq!(note.title, "Calculus limits");
    assert!(!view.like_state().liked());
    assert_eq!(view.like_state().count(), 10);
    assert!(view.comments().is_empty());
    assert_eq!(view.redirect(), None);
}

#[test]
fn given_missing_note_when_loading_then_notifies_and_redirects_home() {
    // Arrange
    let world = TestWorld::signed_in();
    let mut view = NoteDetailView::new(&world.backend, test_notes::NONEXISTENT, Some(&world.user));

    // Act
    let result = view.load();

    // Assert
    assert!(matches!(result, Err(DomainError::NoteNotFound(_))));
    assert!(view.note().is_none());
    assert_eq!(view.redirect(), Some(&Route::Home));
    assert_eq!(
        view.notifier().last().map(|t| t.message.as_str()),
        Some("Failed to load note details")
    );
}

#[test]
fn given_unloaded_note_when_toggling_like_then_note_not_loaded() {
    // Arrange
    let world = TestWorld::signed_in();
    let mut view = NoteDetailView::new(&world.backend, test_notes::CALCULUS_NOTE, Some(&world.user));

    // Act
    let result = view.toggle_like();

    // Assert
    assert!(matches!(result, Err(DomainError::NoteNotLoaded)));
    assert!(world.backend.calls().is_empty());
}

#[test]
fn given_unliked_note_when_toggling_then_liked_and_persisted() {
    // Arrange
    let world = TestWorld::signed_in();
    let mut view = open(&world, test_notes::CALCULUS_NOTE);

    // Act
    let liked = view.toggle_like().expect("like should succeed");

    // Assert
    assert!(liked);
    assert_eq!(view.like_state().count(), 11);
    assert_eq!(view.note().map(|n| n.likes), Some(11));
    assert_eq!(world.likes(test_notes::CALCULUS_NOTE), 11);
    assert!(has_liked(&world.backend, test_notes::CALCULUS_NOTE, test_users::ADA_ID).unwrap());
}

#[test]
fn given_double_toggle_when_both_succeed_then_count_restored() {
    // Arrange
    let world = TestWorld::signed_in();
    let mut view = open(&world, test_notes::VECTOR_CALCULUS);

    // Act
    view.toggle_like().unwrap();
    view.toggle_like().unwrap();

    // Assert
    assert!(!view.like_state().liked());
    assert_eq!(view.like_state().count(), 7);
    assert_eq!(world.likes(test_notes::VECTOR_CALCULUS), 7);
    assert!(!has_liked(&world.backend, test_notes::VECTOR_CALCULUS, test_users::ADA_ID).unwrap());
}

#[test]
fn given_liked_note_when_reopened_then_like_state_restored() {
    // Arrange
    let world = TestWorld::signed_in();
    open(&world, test_notes::CHEMISTRY).toggle_like().unwrap();

    // Act
    let view = open(&world, test_notes::CHEMISTRY);

    // Assert
    assert!(view.like_state().liked());
    assert_eq!(view.like_state().count(), 6);
}

#[test]
fn given_failing_counter_when_toggling_like_then_rolls_back_and_notifies() {
    // Arrange
    let world = TestWorld::signed_in();
    let mut view = open(&world, test_notes::CALCULUS_NOTE);
    world.backend.set_failing(Operation::Increment(Collection::Notes), true);

    // Act
    let result = view.toggle_like();

    // Assert
    assert!(result.is_err());
    assert!(!view.like_state().liked());
    assert_eq!(view.like_state().count(), 10);
    assert_eq!(view.note().map(|n| n.likes), Some(10));
    let toast = view.notifier().last().cloned().expect("a toast");
    assert_eq!(toast.level, ToastLevel::Error);
    assert_eq!(toast.message, "Failed to update like");
}

#[test]
fn given_failing_like_record_when_toggling_then_counter_compensated() {
    // Arrange
    let world = TestWorld::signed_in();
    let mut view = open(&world, test_notes::CALCULUS_NOTE);
    world.backend.set_failing(Operation::Create(Collection::Likes), true);

    // Act
    let result = view.toggle_like();

    // Assert
    assert!(result.is_err());
    assert_eq!(view.like_state().count(), 10);
    assert_eq!(world.likes(test_notes::CALCULUS_NOTE), 10);
}

#[test]
fn given_unreadable_like_state_when_toggling_then_no_duplicate_like() {
    // Arrange
    let world = TestWorld::signed_in();
    open(&world, test_notes::CALCULUS_NOTE).toggle_like().unwrap();
    world.backend.set_failing(Operation::List(Collection::Likes), true);
    let mut view = open(&world, test_notes::CALCULUS_NOTE);
    assert!(!view.like_state().liked());

    // Act
    let blocked = view.toggle_like();
    world.backend.set_failing(Operation::List(Collection::Likes), false);
    let liked = view.toggle_like().expect("like should settle");

    // Assert
    assert!(blocked.is_err());
    assert!(liked);
    assert_eq!(view.like_state().count(), 11);
    assert_eq!(world.likes(test_notes::CALCULUS_NOTE), 11);
    let records = world
        .backend
        .store()
        .list_documents(Collection::Likes, &[])
        .unwrap();
    assert_eq!(records.len(), 1);
}

#[test]
fn given_note_when_downloading_then_counts_and_returns_file() {
    // Arrange
    let world = TestWorld::signed_in();
    let mut view = open(&world, test_notes::CALCULUS_PAPER);

    // Act
    let target = view.download().expect("download should succeed");

    // Assert
    assert_eq!(target.file_name, "Calculus final exam.pdf");
    assert!(target.url.ends_with(&format!("{}/download", target.file_id)));
    assert_eq!(view.note().map(|n| n.downloads), Some(21));
    assert_eq!(world.backend.counter(Collection::Notes, test_notes::CALCULUS_PAPER, "downloads"), 21);
    assert_eq!(
        view.notifier().last().map(|t| t.message.as_str()),
        Some("Download started!")
    );
}

#[test]
fn given_failing_counter_when_downloading_then_error_and_count_unchanged() {
    // Arrange
    let world = TestWorld::signed_in();
    let mut view = open(&world, test_notes::CALCULUS_PAPER);
    world.backend.set_failing(Operation::Increment(Collection::Notes), true);

    // Act
    let result = view.download();

    // Assert
    assert!(result.is_err());
    assert_eq!(view.note().map(|n| n.downloads), Some(20));
    assert_eq!(
        view.notifier().last().map(|t| t.message.as_str()),
        Some("Failed to download file")
    );
}

#[test]
fn given_comment_when_adding_then_prepended_and_counted() {
    // Arrange
    let world = TestWorld::signed_in();
    let mut view = open(&world, test_notes::CHEMISTRY);
    view.add_comment("First!").unwrap();

    // Act
    let comment = view
        .add_comment("  Very clear, thanks  ")
        .expect("comment should be stored")
        .cloned()
        .expect("non-blank comment");

    // Assert
    assert_eq!(comment.content, "Very clear, thanks");
    assert_eq!(comment.user_name, "Ada");
    assert_eq!(view.comments()[0].id, comment.id);
    assert_eq!(view.comments().len(), 2);
    assert_eq!(view.note().map(|n| n.comments), Some(2));

    let reopened = open(&world, test_notes::CHEMISTRY);
    assert_eq!(reopened.comments()[0].content, "Very clear, thanks");
}

#[test]
fn given_blank_comment_when_adding_then_ignored() {
    // Arrange
    let world = TestWorld::signed_in();
    let mut view = open(&world, test_notes::CHEMISTRY);
    world.backend.reset_calls();

    // Act
    let result = view.add_comment("   ").unwrap();

    // Assert
    assert!(result.is_none());
    assert!(world.backend.calls().is_empty());
}

#[test]
fn given_failing_store_when_adding_comment_then_nothing_added() {
    // Arrange
    let world = TestWorld::signed_in();
    let mut view = open(&world, test_notes::CHEMISTRY);
    world.backend.set_failing(Operation::Create(Collection::Comments), true);

    // Act
    let result = view.add_comment("Lost words");

    // Assert
    assert!(result.is_err());
    assert!(view.comments().is_empty());
    assert_eq!(
        view.notifier().last().map(|t| t.message.as_str()),
        Some("Failed to add comment")
    );
}

#[test]
fn given_failing_counter_when_adding_comment_then_comment_kept_and_error_toast() {
    // Arrange
    let world = TestWorld::signed_in();
    let mut view = open(&world, test_notes::CHEMISTRY);
    world.backend.set_failing(Operation::Increment(Collection::Notes), true);

    // Act
    let result = view.add_comment("Counted later");

    // Assert
    assert!(result.is_err());
    assert_eq!(view.comments().len(), 1);
    assert_eq!(view.note().map(|n| n.comments), Some(0));
    let toast = view.notifier().last().cloned().expect("a toast");
    assert_eq!(toast.level, ToastLevel::Error);
    assert_eq!(toast.message, "Failed to add comment");

    world.backend.set_failing(Operation::Increment(Collection::Notes), false);
    let reopened = open(&world, test_notes::CHEMISTRY);
    assert_eq!(reopened.comments().len(), 1);
    assert_eq!(reopened.comments()[0].content, "Counted later");
}

#[test]
fn given_app_url_when_sharing_then_links_to_note_route() {
    // Arrange
    let world = TestWorld::signed_in();
    let view = open(&world, test_notes::CHEMISTRY);

    // Act
    let link = view.share_link("https://notes.example.org/");

    // Assert
    assert_eq!(link, "https://notes.example.org/note/chem-note");
}
