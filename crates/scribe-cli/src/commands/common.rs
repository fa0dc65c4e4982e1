use std::fmt::Display;
use std::io::{self, IsTerminal, Read};
use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone, Utc};
use scribe_core::auth::AuthUser;
use scribe_core::backend::NotesBackend;
use scribe_core::config::BackendConfig;
use scribe_core::{Note, NoteId, NotesStore};
use serde::Serialize;

use crate::auth::{open_backend, CliBackend};
use crate::config_profiles::CliProfilesConfig;
use crate::error::CliError;

const SHORT_ID_LEN: usize = 8;
const PREVIEW_CHARS: usize = 72;

#[derive(Debug, Serialize)]
pub struct NoteListItem {
    pub id: String,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub date_label: String,
}

/// Profile name and backend settings: the profile file first, then the
/// `SUPABASE_*` environment.
pub fn resolve_backend_config(
    profile: Option<&str>,
) -> Result<(String, BackendConfig), CliError> {
    let config = CliProfilesConfig::load().map_err(CliError::Config)?;
    let profile_name = config.resolve_profile_name(profile);

    let from_profile = match config.profile(&profile_name) {
        Some(profile) => profile
            .backend_config()
            .map_err(|error| CliError::Config(format!("profile '{profile_name}': {error}")))?,
        None => None,
    };
    let backend_config = match from_profile {
        Some(backend_config) => backend_config,
        None => BackendConfig::from_env()?.ok_or(CliError::NotConfigured)?,
    };

    Ok((profile_name, backend_config))
}

pub fn open_profile_backend(profile: Option<&str>) -> Result<(String, CliBackend), CliError> {
    let (profile_name, config) = resolve_backend_config(profile)?;
    let backend = open_backend(&profile_name, &config)?;
    tracing::debug!("Using profile '{}' against {}", profile_name, config.supabase_url);
    Ok((profile_name, backend))
}

pub fn open_store(profile: Option<&str>) -> Result<NotesStore<CliBackend>, CliError> {
    let (_, backend) = open_profile_backend(profile)?;
    Ok(NotesStore::new(Arc::new(backend)))
}

pub async fn require_user<B: NotesBackend>(store: &NotesStore<B>) -> Result<AuthUser, CliError> {
    store
        .backend()
        .current_user()
        .await?
        .ok_or(CliError::NotSignedIn)
}

/// Load the signed-in user's notes into `store`, surfacing a fetch error.
pub async fn load_notes<B: NotesBackend>(store: &NotesStore<B>) -> Result<Vec<Note>, CliError> {
    require_user(store).await?;
    store.fetch_all().await;

    let state = store.snapshot();
    if let Some(error) = state.error {
        return Err(CliError::Fetch(error));
    }
    Ok(state.notes)
}

/// Find a note by full id or unique id prefix.
pub fn resolve_note(notes: &[Note], query: &str) -> Result<Note, CliError> {
    let query = normalize_note_identifier(query)?;

    if let Some(note) = notes.iter().find(|note| note.id.as_str() == query) {
        return Ok(note.clone());
    }

    let matching = notes
        .iter()
        .filter(|note| note.id.as_str().starts_with(&query))
        .collect::<Vec<_>>();

    match matching.as_slice() {
        [] => Err(CliError::NoteNotFound(query)),
        [note] => Ok((*note).clone()),
        _ => {
            let options = matching
                .iter()
                .take(3)
                .map(|note| short_id(&note.id))
                .collect::<Vec<_>>()
                .join(", ");
            Err(CliError::AmbiguousNoteId(format!(
                "ID prefix '{query}' is ambiguous; matches: {options}"
            )))
        }
    }
}

pub fn normalize_note_identifier(id: &str) -> Result<String, CliError> {
    id.parse::<NoteId>()
        .map(|id| id.as_str().to_string())
        .map_err(|_| CliError::EmptyNoteId)
}

pub fn short_id(id: &NoteId) -> String {
    id.as_str().chars().take(SHORT_ID_LEN).collect()
}

/// First two content lines collapsed to one, truncated with `...`.
pub fn note_preview(note: &Note, max_chars: usize) -> String {
    let collapsed = note
        .content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .take(2)
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ");

    if collapsed.chars().count() <= max_chars {
        collapsed
    } else {
        let mut truncated = collapsed
            .chars()
            .take(max_chars.saturating_sub(3))
            .collect::<String>();
        truncated.push_str("...");
        truncated
    }
}

pub fn format_note_lines<Tz>(notes: &[Note], now: &DateTime<Tz>) -> Vec<String>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    notes
        .iter()
        .flat_map(|note| {
            let header = format!(
                "{:<width$}  {}  ({})",
                short_id(&note.id),
                note.display_title(),
                format_note_date(note.updated_at, now),
                width = SHORT_ID_LEN
            );
            let preview = note_preview(note, PREVIEW_CHARS);
            if preview.is_empty() {
                vec![header]
            } else {
                vec![header, format!("{:<width$}  {preview}", "", width = SHORT_ID_LEN)]
            }
        })
        .collect()
}

/// Time of day for today, `Yesterday`, otherwise `Mon D`, all in `now`'s zone.
pub fn format_note_date<Tz>(timestamp: DateTime<Utc>, now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let local = timestamp.with_timezone(&now.timezone());
    let today = now.date_naive();

    if local.date_naive() == today {
        local.format("%I:%M %p").to_string()
    } else if today.pred_opt() == Some(local.date_naive()) {
        "Yesterday".to_string()
    } else {
        local.format("%b %-d").to_string()
    }
}

pub fn note_to_list_item(note: &Note) -> NoteListItem {
    NoteListItem {
        id: note.id.to_string(),
        title: note.display_title().to_string(),
        content: note.content.clone(),
        created_at: note.created_at,
        updated_at: note.updated_at,
        date_label: format_note_date(note.updated_at, &Local::now()),
    }
}

/// Joined arguments, or piped stdin when no arguments were given.
pub fn resolve_note_content(content_parts: &[String]) -> Result<String, CliError> {
    let joined = content_parts.join(" ");
    if !joined.trim().is_empty() {
        return Ok(joined);
    }
    Ok(read_piped_stdin()?.unwrap_or_default())
}

pub fn normalize_content(content: &str) -> Option<String> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub fn read_piped_stdin() -> Result<Option<String>, CliError> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        return Ok(None);
    }

    let mut buffer = String::new();
    stdin.lock().read_to_string(&mut buffer)?;
    Ok(normalize_content(&buffer))
}
