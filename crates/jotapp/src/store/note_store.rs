use super::backend::KvBackend;
use super::NOTES_KEY;
use crate::audio::AudioCodec;
use crate::clock::{Clock, SystemClock};
use crate::config::JotConfig;
use crate::error::{JotError, Result};
use crate::ids::IdGenerator;
use crate::model::{AudioChange, CategoryFilter, Note, NoteDraft, NoteId, NotePatch};
use crate::notify::ChangePublisher;
use crate::query;
use std::collections::HashSet;
use tracing::{debug, warn};

/// The sole writer of the note collection.
///
/// Every mutation is one read-modify-write of the whole collection value. See the
/// [module docs](super) for the failure and corruption rules.
pub struct NoteStore<B: KvBackend> {
    /// The underlying key-value backend.
    /// Exposed as pub(crate) for testing and internal access only.
    pub(crate) backend: B,
    key: String,
    clock: Box<dyn Clock>,
    ids: IdGenerator,
    codec: AudioCodec,
    notifier: Option<ChangePublisher>,
}

impl<B: KvBackend> NoteStore<B> {
    pub fn with_backend(backend: B) -> Self {
        Self {
            backend,
            key: NOTES_KEY.to_string(),
            clock: Box::new(SystemClock),
            ids: IdGenerator::new(),
            codec: AudioCodec::default(),
            notifier: None,
        }
    }

    pub fn from_config(backend: B, config: &JotConfig) -> Result<Self> {
        config.validate()?;
        let codec = AudioCodec::new(config.audio_media_type.clone(), config.max_audio_bytes)?;
        Ok(Self::with_backend(backend)
            .with_key(config.notes_key.clone())
            .with_codec(codec))
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn with_ids(mut self, ids: IdGenerator) -> Self {
        self.ids = ids;
        self
    }

    pub fn with_codec(mut self, codec: AudioCodec) -> Self {
        self.codec = codec;
        self
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// Announce every successful write through `publisher`.
    pub fn with_notifier(mut self, publisher: ChangePublisher) -> Self {
        self.notifier = Some(publisher);
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn codec(&self) -> &AudioCodec {
        &self.codec
    }

    /// The whole collection, in insertion order.
    pub fn snapshot(&self) -> Result<Vec<Note>> {
        self.load()
    }

    pub fn list(&self, filter: CategoryFilter) -> Result<Vec<Note>> {
        let notes = self.load()?;
        Ok(query::filter_by_category(&notes, filter))
    }

    pub fn get(&self, id: &NoteId) -> Result<Option<Note>> {
        Ok(self
            .list(CategoryFilter::All)?
            .into_iter()
            .find(|n| &n.id == id))
    }

    /// Like [`Self::get`], but a missing note is an error.
    pub fn get_required(&self, id: &NoteId) -> Result<Note> {
        self.get(id)?.ok_or_else(|| JotError::NotFound(id.clone()))
    }

    pub fn create(&mut self, draft: NoteDraft) -> Result<Note> {
        let title = validated_title(&draft.title)?;
        let audio = draft
            .audio
            .as_ref()
            .map(|clip| self.codec.encode(clip))
            .transpose()?;

        let mut notes = self.load()?;
        let now = self.clock.now();
        let id = self.fresh_id(&notes, now);
        let note = Note {
            id,
            title,
            content: draft.content.trim().to_string(),
            category: draft.category,
            created_at: now,
            updated_at: now,
            audio,
        };
        notes.push(note.clone());
        self.save(&notes)?;

        debug!(id = %note.id, "created note");
        Ok(note)
    }

    pub fn update(&mut self, id: &NoteId, patch: NotePatch) -> Result<Note> {
        let title = patch.title.as_deref().map(validated_title).transpose()?;
        let audio = match &patch.audio {
            AudioChange::Keep => None,
            AudioChange::Replace(clip) => Some(Some(self.codec.encode(clip)?)),
            AudioChange::Remove => Some(None),
        };

        let mut notes = self.load()?;
        let note = notes
            .iter_mut()
            .find(|n| &n.id == id)
            .ok_or_else(|| JotError::NotFound(id.clone()))?;

        if let Some(title) = title {
            note.title = title;
        }
        if let Some(content) = &patch.content {
            note.content = content.trim().to_string();
        }
        if let Some(category) = patch.category {
            note.category = category;
        }
        if let Some(audio) = audio {
            note.audio = audio;
        }
        // Never move backwards, even if the wall clock does.
        note.updated_at = self.clock.now().max(note.updated_at);

        let updated = note.clone();
        self.save(&notes)?;

        debug!(id = %updated.id, "updated note");
        Ok(updated)
    }

    /// Remove the note with `id`. Deleting an unknown id is a no-op and writes nothing.
    pub fn delete(&mut self, id: &NoteId) -> Result<()> {
        let mut notes = self.load()?;
        let before = notes.len();
        notes.retain(|n| &n.id != id);
        if notes.len() == before {
            debug!(id = %id, "delete of unknown note ignored");
            return Ok(());
        }
        self.save(&notes)?;

        debug!(id = %id, "deleted note");
        Ok(())
    }

    fn load(&self) -> Result<Vec<Note>> {
        let loaded = self.backend.get(&self.key).and_then(|raw| match raw {
            None => Ok(Vec::new()),
            Some(raw) => {
                let notes = parse_collection(&self.key, &raw)?;
                debug!(key = %self.key, bytes = raw.len(), count = notes.len(), "loaded notes");
                Ok(notes)
            }
        });
        loaded.inspect_err(|e| {
            if e.is_corruption() {
                warn!(key = %self.key, error = %e, "stored notes are unreadable");
            }
        })
    }

    fn save(&self, notes: &[Note]) -> Result<()> {
        let payload = serde_json::to_string(notes)
            .map_err(|e| JotError::Encoding(format!("could not serialize notes: {}", e)))?;

        if let Err(e) = self.backend.set(&self.key, &payload) {
            warn!(key = %self.key, bytes = payload.len(), error = %e, "writing notes failed");
            return Err(e);
        }
        debug!(key = %self.key, bytes = payload.len(), count = notes.len(), "saved notes");

        if let Some(notifier) = &self.notifier {
            notifier.publish(&self.key);
        }
        Ok(())
    }

    fn fresh_id(&self, notes: &[Note], now: chrono::DateTime<chrono::Utc>) -> NoteId {
        loop {
            let id = self.ids.next_id(now);
            if !notes.iter().any(|n| n.id == id) {
                return id;
            }
        }
    }
}

fn validated_title(title: &str) -> Result<String> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(JotError::Validation("title must not be empty".to_string()));
    }
    Ok(trimmed.to_string())
}

/// Parse a stored collection. An empty value counts as an empty collection.
fn parse_collection(key: &str, raw: &str) -> Result<Vec<Note>> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    let notes: Vec<Note> = serde_json::from_str(raw).map_err(|e| JotError::corrupt(key, e))?;

    let mut seen = HashSet::with_capacity(notes.len());
    for note in &notes {
        if !seen.insert(&note.id) {
            return Err(JotError::corrupt(
                key,
                format!("duplicate note id {}", note.id),
            ));
        }
    }
    Ok(notes)
}
