use futurefirst_core::{
    ConversationStore, DataType, Envelope, FavoritesStore, KeyValueStore, ManualClock,
    MemoryKeyValueStore, MessageRole, NewTask, Note, NotesStore, QuizStore, StoreError,
    TaskStore, UserDataStore, UserId, UserScoped,
};
use std::rc::Rc;

fn uid(raw: &str) -> UserId {
    UserId::parse(raw).unwrap()
}

fn shared_data() -> (Rc<MemoryKeyValueStore>, Rc<ManualClock>, UserDataStore) {
    let backend = Rc::new(MemoryKeyValueStore::new());
    let clock = Rc::new(ManualClock::new(1_700_000_000_000));
    let data = UserDataStore::new(backend.clone()).with_clock(clock.clone());
    (backend, clock, data)
}

fn persisted_notes(backend: &MemoryKeyValueStore, key: &str) -> Vec<Note> {
    let raw = backend.get_item(key).unwrap().expect("notes record");
    let envelope: Envelope<Vec<Note>> = serde_json::from_str(&raw).unwrap();
    envelope.data
}

#[test]
fn creating_and_favoriting_a_note_is_persisted() {
    let (backend, _, data) = shared_data();
    let mut notes = NotesStore::new(data);
    notes.set_current_user(&uid("u1"));

    let created = notes.add_note("Biology", "").unwrap();
    assert_eq!(notes.notes().len(), 1);
    assert!(!created.is_favorite);
    assert_eq!(created.title, "Biology");

    let stored = persisted_notes(&backend, "user_u1_notes");
    assert_eq!(stored, vec![created.clone()]);

    let toggled = notes.toggle_favorite(created.id).unwrap();
    assert!(toggled.is_favorite);
    assert_eq!(notes.favorite_count(), 1);
    let stored = persisted_notes(&backend, "user_u1_notes");
    assert_eq!(stored.len(), 1);
    assert!(stored[0].is_favorite);
    assert_eq!(stored[0].id, created.id);
}

#[test]
fn toggling_a_task_twice_restores_done_and_moves_updated_at_each_time() {
    let (_, _, data) = shared_data();
    let mut tasks = TaskStore::new(data);
    tasks.set_current_user(&uid("u1"));
    let task = tasks.add_task(NewTask::titled("Finish business plan")).unwrap();

    let once = tasks.toggle_task(task.id).unwrap();
    assert!(once.done);
    assert!(once.updated_at > task.updated_at);
    assert_eq!(tasks.completed_count(), 1);

    let twice = tasks.toggle_task(task.id).unwrap();
    assert_eq!(twice.done, task.done);
    assert!(twice.updated_at > once.updated_at);
    assert_eq!(tasks.completed_count(), 0);
}

#[test]
fn switching_users_and_back_reloads_identical_data() {
    let (_, clock, data) = shared_data();
    let (a, b) = (uid("alice"), uid("bob"));

    let mut quiz = QuizStore::new(data.clone());
    let mut notes = NotesStore::new(data.clone());
    let mut conversations = ConversationStore::new(data.clone());
    let mut favorites = FavoritesStore::new(data.clone());
    let mut tasks = TaskStore::new(data);

    quiz.set_current_user(&a);
    notes.set_current_user(&a);
    conversations.set_current_user(&a);
    favorites.set_current_user(&a);
    tasks.set_current_user(&a);

    quiz.set_selections(vec!["Accounting I".into(), "Business Law".into()])
        .unwrap();
    notes.add_note("Econ", "supply and demand").unwrap();
    let chat = conversations.create_conversation(None).unwrap();
    conversations
        .append_message(chat.id, MessageRole::User, "Quiz me on ethics")
        .unwrap();
    favorites.toggle_favorite("drive-file-7").unwrap();
    clock.advance(1_000);
    tasks.add_task(NewTask::titled("Register for SLC")).unwrap();

    let quiz_before = quiz.selections().to_vec();
    let notes_before = notes.notes().to_vec();
    let conversations_before = conversations.conversations().to_vec();
    let favorites_before: Vec<String> = favorites.favorites().map(str::to_string).collect();
    let tasks_before = tasks.tasks().to_vec();

    assert!(quiz.set_current_user(&b));
    assert!(notes.set_current_user(&b));
    assert!(conversations.set_current_user(&b));
    assert!(favorites.set_current_user(&b));
    assert!(tasks.set_current_user(&b));
    assert!(quiz.selections().is_empty());
    assert!(notes.notes().is_empty());
    assert!(conversations.conversations().is_empty());
    assert_eq!(favorites.count(), 0);
    assert!(tasks.tasks().is_empty());

    quiz.set_current_user(&a);
    notes.set_current_user(&a);
    conversations.set_current_user(&a);
    favorites.set_current_user(&a);
    tasks.set_current_user(&a);

    assert_eq!(quiz.selections(), quiz_before.as_slice());
    assert_eq!(notes.notes(), notes_before.as_slice());
    assert_eq!(conversations.conversations(), conversations_before.as_slice());
    assert_eq!(
        favorites.favorites().map(str::to_string).collect::<Vec<_>>(),
        favorites_before
    );
    assert_eq!(tasks.tasks(), tasks_before.as_slice());
}

#[test]
fn set_current_user_with_same_id_is_a_noop() {
    let (_, _, data) = shared_data();
    let mut notes = NotesStore::new(data);
    let u1 = uid("u1");
    assert!(notes.set_current_user(&u1));
    notes.add_note("Unsaved draft", "x").unwrap();
    assert!(!notes.set_current_user(&u1));
    assert_eq!(notes.notes().len(), 1);
}

#[test]
fn clear_user_data_keeps_persisted_records() {
    let (backend, _, data) = shared_data();
    let mut favorites = FavoritesStore::new(data);
    let u1 = uid("u1");
    favorites.set_current_user(&u1);
    favorites.add_favorite("folder-1").unwrap();

    favorites.clear_user_data();
    assert_eq!(favorites.count(), 0);
    assert!(favorites.current_user().is_none());
    assert_eq!(
        favorites.add_favorite("folder-2"),
        Err(StoreError::NoActiveUser)
    );
    assert!(backend.get_item("user_u1_gccr_favorites").unwrap().is_some());

    favorites.set_current_user(&u1);
    assert!(favorites.is_favorite("folder-1"));
}

#[test]
fn quiz_reset_keeps_the_key_with_an_empty_list() {
    let (backend, _, data) = shared_data();
    let mut quiz = QuizStore::new(data.clone());
    let u1 = uid("u1");
    quiz.set_current_user(&u1);
    quiz.toggle_competition("Client Service").unwrap();

    quiz.reset_selections().unwrap();

    assert!(backend
        .get_item("user_u1_quiz_competitions")
        .unwrap()
        .is_some());
    let stored: Vec<String> = data.load(&u1, DataType::QuizCompetitions, vec!["x".into()]);
    assert!(stored.is_empty());
}

#[test]
fn quota_failure_keeps_in_memory_change() {
    let backend = Rc::new(MemoryKeyValueStore::with_quota(64));
    let mut notes = NotesStore::new(UserDataStore::new(backend.clone()));
    notes.set_current_user(&uid("u1"));

    let note = notes.add_note("Long", "x".repeat(500)).unwrap();

    assert_eq!(notes.notes()[0].id, note.id);
    assert!(backend.is_empty());
}
