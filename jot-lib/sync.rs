//! Persistence and synchronization seams.
//!
//! The model never talks to browser storage or a backing service directly;
//! it sees three narrow traits. [`LocalStore`] is a two-key string store
//! (text and title). [`RemoteStore`] is a per-user document with point read,
//! a push subscription, and merge-writes of partial fields; conflicts
//! resolve last-writer-wins at the store, no merging here. The
//! [`IdentityProvider`] decides whether a remote store is in play at all.
//!
//! [`SyncController`] ties them to the document: remote-first load with
//! local fallback, debounce-driven coalesced saves to both stores, and
//! remote updates applied only when the [`EditorSession`] allows (never over
//! an in-flight local edit, focus, or IME composition). Remote failures are
//! logged and degrade to local-only; they never corrupt local state.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
  document::{Document, DocumentError},
  session::EditorSession,
};

pub type Result<T> = std::result::Result<T, SyncError>;

#[derive(Debug, Error)]
pub enum SyncError {
  #[error("store error: {0}")]
  Store(#[from] StoreError),
  #[error("document error: {0}")]
  Document(#[from] DocumentError),
}

/// An opaque failure from a backing store.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct StoreError(pub String);

/// Key-value persistence with two string keys, read at startup and written
/// on the save debounce.
pub trait LocalStore {
  fn load_text(&self) -> Option<String>;
  fn load_title(&self) -> Option<String>;
  fn store(&mut self, title: &str, text: &str);
}

/// The remote document, keyed by user identity.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RemoteDoc {
  pub title:      String,
  pub text:       String,
  /// Milliseconds since the epoch; the store's last-writer-wins clock.
  #[serde(default)]
  pub updated_at: u64,
}

/// A merge-write: only present fields are written.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RemoteFields {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub title:      Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub text:       Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub updated_at: Option<u64>,
}

pub type Unsubscribe = Box<dyn FnOnce()>;

/// Remote persistence for one user's document.
pub trait RemoteStore {
  fn get(&mut self) -> std::result::Result<Option<RemoteDoc>, StoreError>;
  fn set(&mut self, fields: RemoteFields) -> std::result::Result<(), StoreError>;
  /// Push updates on change. The host forwards them into
  /// [`SyncController::apply_remote_update`].
  fn subscribe(&mut self, on_change: Box<dyn FnMut(RemoteDoc)>) -> Unsubscribe;
}

/// Supplies a stable user id when authenticated.
pub trait IdentityProvider {
  fn user_id(&self) -> Option<String>;
}

/// Orchestrates load, debounced save, and remote update application for one
/// document. Holds a remote store only when the identity provider yielded a
/// user; otherwise the editor is local-only.
pub struct SyncController<L, R> {
  local:     L,
  remote:    Option<R>,
  deep_link: Option<String>,
}

impl<L: LocalStore, R: RemoteStore> SyncController<L, R> {
  pub fn new(local: L) -> Self {
    Self {
      local,
      remote: None,
      deep_link: None,
    }
  }

  pub fn with_remote(mut self, remote: R) -> Self {
    self.remote = Some(remote);
    self
  }

  /// Pick the backing mode from the identity provider: remote-backed when a
  /// user id is present, local-only otherwise.
  pub fn for_identity(
    local: L,
    identity: &dyn IdentityProvider,
    remote: impl FnOnce(&str) -> R,
  ) -> Self {
    match identity.user_id() {
      Some(id) => Self::new(local).with_remote(remote(&id)),
      None => Self::new(local),
    }
  }

  pub fn is_remote_backed(&self) -> bool {
    self.remote.is_some()
  }

  /// Text carried in by the URL, appended once during [`Self::load`].
  pub fn set_deep_link(&mut self, text: impl Into<String>) {
    self.deep_link = Some(text.into());
  }

  /// Initial load: the remote copy wins when available, local storage is
  /// the fallback (including on remote failure). Consumes any pending
  /// deep-link text and ends the session's initializing phase.
  pub fn load(&mut self, doc: &mut Document, session: &mut EditorSession) -> Result<()> {
    let remote_doc = match self.remote.as_mut() {
      Some(remote) => match remote.get() {
        Ok(found) => found,
        Err(err) => {
          warn!(error = %err, "remote load failed, falling back to local store");
          None
        },
      },
      None => None,
    };

    match remote_doc {
      Some(RemoteDoc { title, text, .. }) => {
        doc.replace_all(text)?;
        doc.set_title(title);
      },
      None => {
        if let Some(text) = self.local.load_text() {
          doc.replace_all(text)?;
        }
        if let Some(title) = self.local.load_title() {
          doc.set_title(title);
        }
      },
    }

    if let Some(text) = self.deep_link.take() {
      debug!("appending deep-link text");
      append_with_separator(doc, &text)?;
    }

    doc.mark_saved();
    session.finish_initializing();
    Ok(())
  }

  /// Persist the current state: local always, remote best-effort. A remote
  /// failure is reported but leaves the local save intact.
  pub fn save(&mut self, doc: &mut Document, now_ms: u64) {
    let text = doc.text().to_string();
    self.local.store(doc.title(), &text);
    doc.mark_saved();

    if let Some(remote) = self.remote.as_mut() {
      let fields = RemoteFields {
        title:      Some(doc.title().to_string()),
        text:       Some(text),
        updated_at: Some(now_ms),
      };
      if let Err(err) = remote.set(fields) {
        warn!(error = %err, "remote save failed, document kept locally");
      }
    }
  }

  /// Run the debounced save if its quiet period has elapsed.
  pub fn flush_if_due(
    &mut self,
    doc: &mut Document,
    session: &mut EditorSession,
    now: Instant,
    now_ms: u64,
  ) {
    if session.take_due_save(now) {
      self.save(doc, now_ms);
    }
  }

  /// Apply a pushed remote update. Returns false when the session suppressed
  /// it (local edit in flight, focus, IME) or it matched the current state.
  pub fn apply_remote_update(
    &mut self,
    doc: &mut Document,
    session: &mut EditorSession,
    update: RemoteDoc,
  ) -> Result<bool> {
    if !session.remote_updates_allowed() {
      debug!("remote update suppressed by session state");
      return Ok(false);
    }
    if doc.text() == update.text.as_str() && doc.title() == update.title {
      return Ok(false);
    }

    session.begin_remote_apply();
    let result = doc.replace_all(update.text);
    session.end_remote_apply();
    result?;
    doc.set_title(update.title);
    doc.mark_saved();
    Ok(true)
  }
}

/// Append `text` to the document, ensuring one blank line separates it from
/// existing content.
pub fn append_with_separator(doc: &mut Document, text: &str) -> crate::document::Result<()> {
  let len = doc.text().len_chars();
  let mut fragment = crate::Tendril::new();
  if len > 0 {
    let tail: String = doc
      .text()
      .slice(len.saturating_sub(2)..)
      .chars()
      .collect();
    if tail.ends_with("\n\n") {
      // Already separated.
    } else if tail.ends_with('\n') {
      fragment.push('\n');
    } else {
      fragment.push_str("\n\n");
    }
  }
  fragment.push_str(text);

  let tx = crate::transaction::Transaction::change(doc.text(), vec![(len, len, Some(fragment))])
    .map_err(DocumentError::from)?;
  doc.apply_transaction(&tx)
}
