use futurefirst_core::{
    Dashboard, FeatureStores, MemoryKeyValueStore, NewTask, SessionCoordinator, SessionPhase,
    UserDataStore, UserId, UserScoped,
};
use std::rc::Rc;

fn uid(raw: &str) -> UserId {
    UserId::parse(raw).unwrap()
}

fn coordinator() -> SessionCoordinator {
    let data = UserDataStore::new(Rc::new(MemoryKeyValueStore::new()));
    SessionCoordinator::new(FeatureStores::new(&data))
}

#[test]
fn login_logout_login_restores_persisted_data() {
    let mut session = coordinator();
    let u1 = uid("u1");

    assert_eq!(session.phase(), &SessionPhase::Uninitialized);
    session.initialize_user_data(&u1);
    assert!(session.is_initialized());

    let stores = session.stores_mut();
    stores.tasks.add_task(NewTask::titled("Study for Intro to FBLA")).unwrap();
    stores.favorites.toggle_favorite("gccr-item-1").unwrap();

    session.clear_all_user_data();
    assert_eq!(session.phase(), &SessionPhase::Uninitialized);
    assert!(session.stores().tasks.tasks().is_empty());
    assert_eq!(session.stores().favorites.count(), 0);

    let report = session.initialize_user_data(&u1);
    assert!(!report.skipped);
    assert_eq!(report.reloaded.len(), 5);
    assert_eq!(session.stores().tasks.tasks().len(), 1);
    assert!(session.stores().favorites.is_favorite("gccr-item-1"));
}

#[test]
fn switching_users_moves_every_container() {
    let mut session = coordinator();
    let (u1, u2) = (uid("u1"), uid("u2"));

    session.initialize_user_data(&u1);
    session
        .stores_mut()
        .notes
        .add_note("Chapter meeting", "agenda")
        .unwrap();

    let report = session.initialize_user_data(&u2);
    assert!(!report.skipped);
    assert_eq!(session.phase(), &SessionPhase::Ready(u2.clone()));
    assert_eq!(session.current_user(), Some(&u2));

    let stores = session.stores();
    assert_eq!(stores.quiz.current_user(), Some(&u2));
    assert_eq!(stores.notes.current_user(), Some(&u2));
    assert_eq!(stores.conversations.current_user(), Some(&u2));
    assert_eq!(stores.favorites.current_user(), Some(&u2));
    assert_eq!(stores.tasks.current_user(), Some(&u2));
    assert!(stores.notes.notes().is_empty());
}

#[test]
fn repeated_initialize_for_same_user_keeps_in_memory_state() {
    let mut session = coordinator();
    let u1 = uid("u1");
    session.initialize_user_data(&u1);
    session
        .stores_mut()
        .quiz
        .toggle_competition("Cyber Security")
        .unwrap();

    let report = session.initialize_user_data(&u1);
    assert!(report.skipped);
    assert_eq!(session.stores().quiz.selections(), ["Cyber Security"]);
}

#[test]
fn dashboard_opens_sqlite_backend_from_config() {
    let dir = tempfile::tempdir().unwrap();
    let config = futurefirst_core::CoreConfig {
        db_path: dir.path().join("kv.sqlite3"),
        log_dir: None,
        log_level: "info".to_string(),
        protected_account: None,
    };
    let u1 = uid("u1");

    {
        let mut dashboard = Dashboard::open(&config).unwrap();
        dashboard.session_mut().initialize_user_data(&u1);
        dashboard
            .session_mut()
            .stores_mut()
            .notes
            .add_note("Persisted", "")
            .unwrap();
    }

    let mut dashboard = Dashboard::open(&config).unwrap();
    dashboard.session_mut().initialize_user_data(&u1);
    assert_eq!(dashboard.session().stores().notes.notes()[0].title, "Persisted");
    assert_eq!(dashboard.data().list_user_ids(), vec!["u1".to_string()]);
}
