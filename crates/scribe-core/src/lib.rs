//! scribe-core - Core library for Scribe
//!
//! This crate contains the note models, the backend contract with its
//! Supabase implementation, and the synced notes store shared by every
//! Scribe front end.

pub mod auth;
pub mod backend;
pub mod config;
pub mod error;
pub mod models;
pub mod store;

pub use error::{Error, Result};
pub use models::{Note, NoteDraft, NoteId};
pub use store::{NotesState, NotesStore, SessionWatch, StorePhase};
