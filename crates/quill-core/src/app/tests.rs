use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{Duration, Utc};
use pretty_assertions::assert_eq;

use super::*;
use crate::api::{ApiError, ApiResult};
use crate::auth::{AuthError, AuthResult, LoginRequest, SessionPersistence};
use crate::models::{Credential, Note, NoteDraft, NoteId};

fn credential(username: &str) -> Credential {
    Credential {
        username: username.to_string(),
        name: format!("{username} display"),
        token: format!("token-{username}"),
    }
}

fn note(id: i64, content: &str, important: bool) -> Note {
    Note {
        id: NoteId::new(id),
        content: content.to_string(),
        important,
        date: Utc::now(),
    }
}

/// In-memory notes service mirroring the remote collection contract:
/// create assigns the next id, update fails for unknown ids.
#[derive(Clone, Default)]
struct StubNotesService {
    notes: Arc<Mutex<Vec<Note>>>,
    next_id: Arc<AtomicI64>,
    reject_creates: Arc<Mutex<Option<String>>>,
    token: Option<String>,
}

impl StubNotesService {
    fn seeded(notes: Vec<Note>) -> Self {
        let next_id = notes.iter().map(|note| note.id.as_i64()).max().unwrap_or(0) + 1;
        Self {
            notes: Arc::new(Mutex::new(notes)),
            next_id: Arc::new(AtomicI64::new(next_id)),
            reject_creates: Arc::new(Mutex::new(None)),
            token: None,
        }
    }

    fn reject_creates_with(&self, message: &str) {
        *self.reject_creates.lock().unwrap() = Some(message.to_string());
    }

    fn remove(&self, id: NoteId) {
        self.notes.lock().unwrap().retain(|note| note.id != id);
    }

    fn stored(&self) -> Vec<Note> {
        self.notes.lock().unwrap().clone()
    }
}

impl NotesService for StubNotesService {
    async fn get_all(&self) -> ApiResult<Vec<Note>> {
        Ok(self.stored())
    }

    async fn create(&self, draft: &NoteDraft) -> ApiResult<Note> {
        if let Some(message) = self.reject_creates.lock().unwrap().clone() {
            return Err(ApiError::Api(message));
        }
        let assigned = Note {
            id: NoteId::new(self.next_id.fetch_add(1, Ordering::SeqCst)),
            content: draft.content.clone(),
            important: draft.important,
            date: draft.date,
        };
        self.notes.lock().unwrap().push(assigned.clone());
        Ok(assigned)
    }

    async fn update(&self, id: NoteId, note: &Note) -> ApiResult<Note> {
        let mut notes = self.notes.lock().unwrap();
        let Some(entry) = notes.iter_mut().find(|entry| entry.id == id) else {
            return Err(ApiError::NotFound(id));
        };
        *entry = note.clone();
        Ok(note.clone())
    }

    fn install_token(&mut self, token: &str) {
        self.token = Some(token.to_string());
    }

    fn discard_token(&mut self) {
        self.token = None;
    }
}

/// Login stub that accepts a single known pair.
#[derive(Clone)]
struct StubLoginService {
    username: String,
    password: String,
    calls: Arc<AtomicI64>,
}

impl StubLoginService {
    fn accepting(username: &str, password: &str) -> Self {
        Self {
            username: username.to_string(),
            password: password.to_string(),
            calls: Arc::new(AtomicI64::new(0)),
        }
    }

    fn call_count(&self) -> i64 {
        self.calls.load(Ordering::SeqCst)
    }
}

impl LoginService for StubLoginService {
    async fn login(&self, request: &LoginRequest) -> AuthResult<Credential> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if request.username == self.username && request.password == self.password {
            Ok(credential(&self.username))
        } else {
            Err(AuthError::InvalidCredentials)
        }
    }
}

#[derive(Clone, Default)]
struct MemorySessionStore {
    slot: Arc<Mutex<Option<Credential>>>,
}

impl SessionPersistence for MemorySessionStore {
    fn load(&self) -> AuthResult<Option<Credential>> {
        Ok(self.slot.lock().unwrap().clone())
    }

    fn save(&self, credential: &Credential) -> AuthResult<()> {
        *self.slot.lock().unwrap() = Some(credential.clone());
        Ok(())
    }

    fn clear(&self) -> AuthResult<()> {
        *self.slot.lock().unwrap() = None;
        Ok(())
    }
}

fn app_with(
    notes: Vec<Note>,
) -> (
    App<StubNotesService, StubLoginService, MemorySessionStore>,
    StubNotesService,
    StubLoginService,
    MemorySessionStore,
) {
    let service = StubNotesService::seeded(notes);
    let login = StubLoginService::accepting("root", "hunter2");
    let store = MemorySessionStore::default();
    let app = App::new(service.clone(), login.clone(), store.clone());
    (app, service, login, store)
}

// --- state machine ---

#[test]
fn filter_preserves_relative_order() {
    let mut state = AppState::new();
    let notes = vec![
        note(1, "first", true),
        note(2, "second", false),
        note(3, "third", true),
    ];
    state.apply(Event::NotesLoaded(notes), Utc::now());

    state.apply(
        Event::FilterChanged(NoteFilter::ImportantOnly),
        Utc::now(),
    );
    let shown: Vec<i64> = state
        .visible_notes()
        .iter()
        .map(|note| note.id.as_i64())
        .collect();
    assert_eq!(shown, vec![1, 3]);

    state.apply(Event::FilterChanged(NoteFilter::All), Utc::now());
    assert_eq!(state.visible_notes().len(), 3);
}

#[test]
fn worked_example_filter_then_toggle() {
    // Notes [{id:1,important:true},{id:2,important:false}]: the
    // important-only view shows [1]; after note 2 turns important it
    // shows [1, 2] in original order.
    let mut state = AppState::new();
    state.apply(
        Event::NotesLoaded(vec![note(1, "one", true), note(2, "two", false)]),
        Utc::now(),
    );
    state.apply(
        Event::FilterChanged(NoteFilter::from_show_all(false)),
        Utc::now(),
    );

    let shown: Vec<i64> = state
        .visible_notes()
        .iter()
        .map(|note| note.id.as_i64())
        .collect();
    assert_eq!(shown, vec![1]);

    let toggled = note(2, "two", true);
    state.apply(Event::NoteReplaced(toggled), Utc::now());

    let shown: Vec<i64> = state
        .visible_notes()
        .iter()
        .map(|note| note.id.as_i64())
        .collect();
    assert_eq!(shown, vec![1, 2]);
    assert!(state.visible_notes()[1].important);
}

#[test]
fn login_succeeded_requests_persist_and_token_install() {
    let mut state = AppState::new();
    let effects = state.apply(Event::LoginSucceeded(credential("root")), Utc::now());

    assert!(state.session.is_authenticated());
    assert_eq!(
        effects,
        vec![
            Effect::SaveCredential(credential("root")),
            Effect::InstallToken("token-root".to_string()),
        ]
    );
}

#[test]
fn session_restore_installs_token_without_persisting() {
    let mut state = AppState::new();
    let effects = state.apply(Event::SessionRestored(credential("root")), Utc::now());

    assert!(state.session.is_authenticated());
    assert_eq!(effects, vec![Effect::InstallToken("token-root".to_string())]);
}

#[test]
fn logout_clears_credential_and_token() {
    let mut state = AppState::new();
    state.apply(Event::LoginSucceeded(credential("root")), Utc::now());

    let effects = state.apply(Event::LoggedOut, Utc::now());
    assert_eq!(state.session, Session::Anonymous);
    assert_eq!(effects, vec![Effect::ClearCredential, Effect::ClearToken]);
}

#[test]
fn error_visible_until_ttl_and_not_after() {
    let shown_at = Utc::now();
    let mut state = AppState::new();
    state.apply(Event::LoginRejected, shown_at);

    assert_eq!(state.visible_error(shown_at), Some("Wrong credentials"));
    assert_eq!(
        state.visible_error(shown_at + Duration::milliseconds(4_999)),
        Some("Wrong credentials")
    );
    assert_eq!(
        state.visible_error(shown_at + Duration::seconds(ERROR_TTL_SECONDS)),
        None
    );
}

#[test]
fn stale_error_timer_does_not_clear_newer_error() {
    let now = Utc::now();
    let mut state = AppState::new();

    let first = state.apply(Event::LoginRejected, now);
    let Effect::ScheduleErrorClear { generation: first_generation } = first[0].clone() else {
        panic!("expected a schedule effect");
    };

    // A second error arrives inside the first error's window.
    state.apply(
        Event::RemoteCallFailed("boom".to_string()),
        now + Duration::seconds(2),
    );

    // The first timer fires; the newer message must survive.
    state.apply(Event::ErrorElapsed(first_generation), now + Duration::seconds(5));
    assert_eq!(state.visible_error(now + Duration::seconds(6)), Some("boom"));

    // The matching timer clears it.
    let current = state.current_error().unwrap().generation;
    state.apply(Event::ErrorElapsed(current), now + Duration::seconds(7));
    assert_eq!(state.current_error(), None);
}

#[test]
fn vanished_note_error_names_content_and_keeps_stale_entry() {
    let now = Utc::now();
    let mut state = AppState::new();
    state.apply(
        Event::NotesLoaded(vec![note(1, "call the dentist", false)]),
        now,
    );

    state.apply(Event::NoteVanished(NoteId::new(1)), now);
    assert_eq!(
        state.visible_error(now),
        Some("Note 'call the dentist' was already removed from server")
    );
    // The stale entry stays on display.
    assert_eq!(state.notes.len(), 1);
}

#[test]
fn replacing_unknown_note_is_a_no_op() {
    let mut state = AppState::new();
    state.apply(Event::NotesLoaded(vec![note(1, "one", false)]), Utc::now());

    state.apply(Event::NoteReplaced(note(9, "ghost", true)), Utc::now());
    assert_eq!(state.notes.len(), 1);
    assert_eq!(state.notes[0].id, NoteId::new(1));
}

// --- orchestrator ---

#[tokio::test]
async fn startup_without_stored_session_stays_anonymous() {
    let (mut app, _service, login, _store) = app_with(vec![note(1, "one", false)]);

    app.startup().await.unwrap();
    assert_eq!(app.state().notes.len(), 1);
    assert!(!app.state().session.is_authenticated());
    assert_eq!(login.call_count(), 0);
}

#[tokio::test]
async fn startup_restores_stored_session_without_login_call() {
    let (mut app, service, login, store) = app_with(vec![]);
    store.save(&credential("root")).unwrap();

    app.startup().await.unwrap();
    assert!(app.state().session.is_authenticated());
    assert_eq!(login.call_count(), 0);
    // The token landed on the orchestrator's own client, not the
    // seeded handle.
    assert!(service.token.is_none());
}

#[tokio::test]
async fn login_roundtrips_credential_through_store() {
    let (mut app, _service, _login, store) = app_with(vec![]);

    let outcome = app.login("root", "hunter2").await.unwrap();
    assert_eq!(outcome, LoginOutcome::SignedIn(credential("root")));

    // save() followed by load() returns an equal value.
    assert_eq!(store.load().unwrap(), Some(credential("root")));
    assert_eq!(app.state().session.credential(), Some(&credential("root")));
}

#[tokio::test]
async fn rejected_login_leaves_session_and_store_untouched() {
    let (mut app, _service, login, store) = app_with(vec![]);
    let now = Utc::now();

    let outcome = app.login("root", "wrong").await.unwrap();
    assert_eq!(outcome, LoginOutcome::Rejected);
    assert_eq!(login.call_count(), 1);
    assert_eq!(store.load().unwrap(), None);
    assert_eq!(app.state().session, Session::Anonymous);
    assert_eq!(app.state().visible_error(now), Some("Wrong credentials"));
}

#[tokio::test]
async fn add_note_appends_server_record_not_the_draft() {
    let (mut app, service, _login, _store) = app_with(vec![
        note(1, "one", false),
        note(2, "two", true),
    ]);
    app.startup().await.unwrap();

    let created = app.add_note("buy milk", false).await.unwrap();
    assert_eq!(created.id, NoteId::new(3));
    assert_eq!(created.content, "buy milk");

    assert_eq!(app.state().notes.len(), 3);
    assert_eq!(app.state().notes[2], created);
    assert_eq!(service.stored().len(), 3);
}

#[tokio::test]
async fn failed_create_surfaces_transient_error_and_leaves_list_unchanged() {
    let (mut app, service, _login, _store) = app_with(vec![note(1, "one", false)]);
    app.startup().await.unwrap();

    service.reject_creates_with("service unavailable (503)");

    let error = app.add_note("buy milk", false).await.unwrap_err();
    assert!(matches!(error, AppError::Api(ApiError::Api(_))));
    assert_eq!(app.state().notes.len(), 1);
    assert_eq!(
        app.state().visible_error(Utc::now()),
        Some("Notes API error: service unavailable (503)")
    );
}

#[tokio::test]
async fn toggle_parity_matches_initial_xor_count() {
    let (mut app, _service, _login, _store) = app_with(vec![note(1, "one", true)]);
    app.startup().await.unwrap();

    for toggles in 1..=4 {
        app.toggle_importance(NoteId::new(1)).await.unwrap();
        let expected = true ^ (toggles % 2 == 1);
        assert_eq!(app.state().notes[0].important, expected);
    }
}

#[tokio::test]
async fn toggle_on_vanished_note_surfaces_transient_error() {
    let (mut app, service, _login, _store) = app_with(vec![note(1, "call the dentist", false)]);
    app.startup().await.unwrap();

    // Deleted server-side after the client loaded its list.
    service.remove(NoteId::new(1));

    let error = app.toggle_importance(NoteId::new(1)).await.unwrap_err();
    assert!(matches!(error, AppError::Api(ApiError::NotFound(_))));
    assert_eq!(
        app.state().visible_error(Utc::now()),
        Some("Note 'call the dentist' was already removed from server")
    );
    // Stale entry stays; resynchronization is a product decision.
    assert_eq!(app.state().notes.len(), 1);
}

#[tokio::test]
async fn toggle_unknown_local_id_fails_without_remote_call() {
    let (mut app, _service, _login, _store) = app_with(vec![]);
    app.startup().await.unwrap();

    let error = app.toggle_importance(NoteId::new(42)).await.unwrap_err();
    assert!(matches!(error, AppError::Api(ApiError::NotFound(_))));
}

#[tokio::test]
async fn logout_clears_store_and_returns_to_anonymous() {
    let (mut app, _service, _login, store) = app_with(vec![]);
    app.login("root", "hunter2").await.unwrap();
    assert!(store.load().unwrap().is_some());

    app.logout().unwrap();
    assert_eq!(app.state().session, Session::Anonymous);
    assert_eq!(store.load().unwrap(), None);
}

#[tokio::test]
async fn set_filter_is_pure_ui_state() {
    let (mut app, _service, _login, _store) = app_with(vec![
        note(1, "one", true),
        note(2, "two", false),
    ]);
    app.startup().await.unwrap();

    app.set_filter(NoteFilter::ImportantOnly);
    assert_eq!(app.state().visible_notes().len(), 1);
    // The authoritative list is untouched.
    assert_eq!(app.state().notes.len(), 2);

    app.set_filter(NoteFilter::All);
    assert_eq!(app.state().visible_notes().len(), 2);
}
