//! Application state controller.
//!
//! State is a tagged machine over two modes, `Anonymous` and
//! `Authenticated`. Every transition is a pure function from
//! `(state, event)` to a list of effects; the [`App`] orchestrator
//! feeds events from service calls and executes the effects against
//! the session store and the notes client.
//!
//! Transient errors carry a generation counter and a shown-at
//! timestamp. Expiry is deadline-based through
//! [`AppState::visible_error`]; timer-driven front ends instead apply
//! [`Event::ErrorElapsed`] with the generation from
//! [`Effect::ScheduleErrorClear`], and a stale timer whose generation
//! no longer matches is ignored rather than erasing a newer message.

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

use crate::api::{ApiError, ApiResult, NotesClient};
use crate::auth::{AuthError, AuthResult, LoginClient, LoginRequest, SessionPersistence};
use crate::models::{Credential, Note, NoteDraft, NoteId};

/// Errors surfaced by the orchestrator: remote call failures plus
/// session store failures raised while executing effects.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Auth(#[from] AuthError),
}

pub type AppResult<T> = Result<T, AppError>;

/// How long a transient error stays visible.
pub const ERROR_TTL_SECONDS: i64 = 5;

/// Top-level session mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Session {
    Anonymous,
    Authenticated(Credential),
}

impl Session {
    #[must_use]
    pub const fn credential(&self) -> Option<&Credential> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated(credential) => Some(credential),
        }
    }

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }
}

/// Which subset of the notes list is displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NoteFilter {
    #[default]
    All,
    ImportantOnly,
}

impl NoteFilter {
    #[must_use]
    pub const fn from_show_all(show_all: bool) -> Self {
        if show_all {
            Self::All
        } else {
            Self::ImportantOnly
        }
    }

    #[must_use]
    pub const fn matches(self, note: &Note) -> bool {
        match self {
            Self::All => true,
            Self::ImportantOnly => note.important,
        }
    }
}

/// A user-facing message that auto-expires after [`ERROR_TTL_SECONDS`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransientError {
    pub message: String,
    pub shown_at: DateTime<Utc>,
    pub generation: u64,
}

/// Inputs to the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// The full collection arrived from the notes service.
    NotesLoaded(Vec<Note>),
    /// A stored credential was found on startup.
    SessionRestored(Credential),
    /// The login endpoint accepted the submitted pair.
    LoginSucceeded(Credential),
    /// The login endpoint rejected the submitted pair.
    LoginRejected,
    /// The user asked to end the session.
    LoggedOut,
    /// The service assigned an id to a submitted draft.
    NoteCreated(Note),
    /// The service returned the replacement record for an update.
    NoteReplaced(Note),
    /// An update hit a note that no longer exists server-side.
    NoteVanished(NoteId),
    /// A remote call failed for a reason other than a vanished note.
    RemoteCallFailed(String),
    /// The user changed the display filter.
    FilterChanged(NoteFilter),
    /// An error-clear timer fired for the given generation.
    ErrorElapsed(u64),
}

/// Side effects requested by a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    SaveCredential(Credential),
    ClearCredential,
    InstallToken(String),
    ClearToken,
    /// Ask the front end to apply [`Event::ErrorElapsed`] with this
    /// generation after [`ERROR_TTL_SECONDS`].
    ScheduleErrorClear { generation: u64 },
}

/// Controller-owned state: the authoritative notes list, the session
/// mode, and the transient UI flags.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub session: Session,
    pub notes: Vec<Note>,
    pub filter: NoteFilter,
    error: Option<TransientError>,
    error_generation: u64,
}

impl Default for Session {
    fn default() -> Self {
        Self::Anonymous
    }
}

impl AppState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one event, returning the effects the caller must execute.
    pub fn apply(&mut self, event: Event, now: DateTime<Utc>) -> Vec<Effect> {
        match event {
            Event::NotesLoaded(notes) => {
                self.notes = notes;
                Vec::new()
            }
            Event::SessionRestored(credential) => {
                let token = credential.token.clone();
                self.session = Session::Authenticated(credential);
                vec![Effect::InstallToken(token)]
            }
            Event::LoginSucceeded(credential) => {
                let token = credential.token.clone();
                self.session = Session::Authenticated(credential.clone());
                vec![
                    Effect::SaveCredential(credential),
                    Effect::InstallToken(token),
                ]
            }
            Event::LoginRejected => {
                vec![self.set_error("Wrong credentials", now)]
            }
            Event::LoggedOut => {
                self.session = Session::Anonymous;
                vec![Effect::ClearCredential, Effect::ClearToken]
            }
            Event::NoteCreated(note) => {
                self.notes.push(note);
                Vec::new()
            }
            Event::NoteReplaced(note) => {
                if let Some(entry) = self.notes.iter_mut().find(|entry| entry.id == note.id) {
                    *entry = note;
                }
                Vec::new()
            }
            Event::NoteVanished(id) => {
                // The stale entry stays in the list; only the message
                // tells the user the server no longer has it.
                let content = self
                    .notes
                    .iter()
                    .find(|note| note.id == id)
                    .map_or_else(|| id.to_string(), |note| note.content.clone());
                let message = format!("Note '{content}' was already removed from server");
                vec![self.set_error(message, now)]
            }
            Event::RemoteCallFailed(message) => {
                vec![self.set_error(message, now)]
            }
            Event::FilterChanged(filter) => {
                self.filter = filter;
                Vec::new()
            }
            Event::ErrorElapsed(generation) => {
                if self
                    .error
                    .as_ref()
                    .is_some_and(|error| error.generation == generation)
                {
                    self.error = None;
                }
                Vec::new()
            }
        }
    }

    /// The displayed subset of the authoritative notes list, in
    /// original relative order.
    #[must_use]
    pub fn visible_notes(&self) -> Vec<&Note> {
        self.notes
            .iter()
            .filter(|note| self.filter.matches(note))
            .collect()
    }

    /// The current error message, if it has not yet expired.
    #[must_use]
    pub fn visible_error(&self, now: DateTime<Utc>) -> Option<&str> {
        let error = self.error.as_ref()?;
        if now - error.shown_at < Duration::seconds(ERROR_TTL_SECONDS) {
            Some(&error.message)
        } else {
            None
        }
    }

    /// The raw error slot, regardless of expiry.
    #[must_use]
    pub const fn current_error(&self) -> Option<&TransientError> {
        self.error.as_ref()
    }

    fn set_error(&mut self, message: impl Into<String>, now: DateTime<Utc>) -> Effect {
        self.error_generation += 1;
        let generation = self.error_generation;
        self.error = Some(TransientError {
            message: message.into(),
            shown_at: now,
            generation,
        });
        Effect::ScheduleErrorClear { generation }
    }
}

/// Read side of the notes service, plus token installation.
#[allow(async_fn_in_trait)]
pub trait NotesService {
    async fn get_all(&self) -> ApiResult<Vec<Note>>;
    async fn create(&self, draft: &NoteDraft) -> ApiResult<Note>;
    async fn update(&self, id: NoteId, note: &Note) -> ApiResult<Note>;
    fn install_token(&mut self, token: &str);
    fn discard_token(&mut self);
}

impl NotesService for NotesClient {
    async fn get_all(&self) -> ApiResult<Vec<Note>> {
        Self::get_all(self).await
    }

    async fn create(&self, draft: &NoteDraft) -> ApiResult<Note> {
        Self::create(self, draft).await
    }

    async fn update(&self, id: NoteId, note: &Note) -> ApiResult<Note> {
        Self::update(self, id, note).await
    }

    fn install_token(&mut self, token: &str) {
        self.set_token(token);
    }

    fn discard_token(&mut self) {
        self.clear_token();
    }
}

/// Login side of the remote services.
#[allow(async_fn_in_trait)]
pub trait LoginService {
    async fn login(&self, request: &LoginRequest) -> AuthResult<Credential>;
}

impl LoginService for LoginClient {
    async fn login(&self, request: &LoginRequest) -> AuthResult<Credential> {
        Self::login(self, request).await
    }
}

/// Outcome of a login attempt that reached the endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    SignedIn(Credential),
    Rejected,
}

/// Orchestrator tying the state machine to the remote services and the
/// session store.
pub struct App<N, L, S> {
    notes_service: N,
    login_service: L,
    store: S,
    state: AppState,
}

impl<N, L, S> App<N, L, S>
where
    N: NotesService,
    L: LoginService,
    S: SessionPersistence,
{
    pub fn new(notes_service: N, login_service: L, store: S) -> Self {
        Self {
            notes_service,
            login_service,
            store,
            state: AppState::new(),
        }
    }

    #[must_use]
    pub const fn state(&self) -> &AppState {
        &self.state
    }

    /// Load the note collection and restore any stored session.
    ///
    /// A stored credential transitions directly to `Authenticated`
    /// without contacting the login endpoint.
    pub async fn startup(&mut self) -> AppResult<()> {
        let notes = self.notes_service.get_all().await?;
        self.dispatch(Event::NotesLoaded(notes))?;

        match self.store.load() {
            Ok(Some(credential)) => self.dispatch(Event::SessionRestored(credential))?,
            Ok(None) => {}
            Err(error) => {
                tracing::warn!("Failed to load stored session: {error}");
            }
        }

        Ok(())
    }

    /// Submit the pair to the login endpoint.
    ///
    /// A rejected pair records a transient error and leaves the
    /// session untouched; transport failures propagate to the caller.
    pub async fn login(&mut self, username: &str, password: &str) -> AppResult<LoginOutcome> {
        let request = LoginRequest::new(username, password)?;
        match self.login_service.login(&request).await {
            Ok(credential) => {
                self.dispatch(Event::LoginSucceeded(credential.clone()))?;
                Ok(LoginOutcome::SignedIn(credential))
            }
            Err(AuthError::InvalidCredentials) => {
                self.dispatch(Event::LoginRejected)?;
                Ok(LoginOutcome::Rejected)
            }
            Err(error) => Err(error.into()),
        }
    }

    /// End the session: clear the stored credential and the installed
    /// bearer token.
    pub fn logout(&mut self) -> AppResult<()> {
        self.dispatch(Event::LoggedOut)
    }

    /// Submit a draft and fold the server-assigned record into state.
    pub async fn add_note(&mut self, content: &str, important: bool) -> AppResult<Note> {
        let draft = NoteDraft::new(content, important);
        match self.notes_service.create(&draft).await {
            Ok(note) => {
                self.dispatch(Event::NoteCreated(note.clone()))?;
                Ok(note)
            }
            Err(error) => {
                self.dispatch(Event::RemoteCallFailed(error.to_string()))?;
                Err(error.into())
            }
        }
    }

    /// Flip the importance flag of the named note via full replacement.
    pub async fn toggle_importance(&mut self, id: NoteId) -> AppResult<Note> {
        let Some(note) = self.state.notes.iter().find(|note| note.id == id).cloned() else {
            return Err(ApiError::NotFound(id).into());
        };

        let changed = note.toggled();
        match self.notes_service.update(id, &changed).await {
            Ok(returned) => {
                self.dispatch(Event::NoteReplaced(returned.clone()))?;
                Ok(returned)
            }
            Err(ApiError::NotFound(_)) => {
                self.dispatch(Event::NoteVanished(id))?;
                Err(ApiError::NotFound(id).into())
            }
            Err(error) => {
                self.dispatch(Event::RemoteCallFailed(error.to_string()))?;
                Err(error.into())
            }
        }
    }

    /// Pure UI state change, no I/O.
    pub fn set_filter(&mut self, filter: NoteFilter) {
        // Filter changes never request effects.
        let _ = self.state.apply(Event::FilterChanged(filter), Utc::now());
    }

    fn dispatch(&mut self, event: Event) -> AppResult<()> {
        let effects = self.state.apply(event, Utc::now());
        self.run_effects(effects)
    }

    fn run_effects(&mut self, effects: Vec<Effect>) -> AppResult<()> {
        for effect in effects {
            match effect {
                Effect::SaveCredential(credential) => self.store.save(&credential)?,
                Effect::ClearCredential => self.store.clear()?,
                Effect::InstallToken(token) => self.notes_service.install_token(&token),
                Effect::ClearToken => self.notes_service.discard_token(),
                // Expiry is deadline-based here (`visible_error`);
                // interactive front ends drive `ErrorElapsed` from
                // their own timers.
                Effect::ScheduleErrorClear { .. } => {}
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests;
