use jotapp::api::JotApi;
use jotapp::model::{Category, NoteDraft, NotePatch};
use jotapp::notify::ChangeBus;
use jotapp::query::NoteQuery;
use jotapp::store::mem_backend::MemBackend;
use jotapp::store::{KvBackend, NoteStore, NOTES_KEY};
use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

fn context(backend: &Rc<MemBackend>, bus: &ChangeBus) -> JotApi<Rc<MemBackend>> {
    JotApi::connect(NoteStore::with_backend(backend.clone()), bus)
}

#[test]
fn test_other_context_sees_change_after_notification() {
    let backend = Rc::new(MemBackend::new());
    let bus = ChangeBus::new();
    let mut window_a = context(&backend, &bus);
    let window_b = context(&backend, &bus);

    assert!(window_b.notes(&NoteQuery::new()).unwrap().is_empty());
    assert!(!window_b.is_stale());

    window_a
        .create(NoteDraft::new("Groceries").category(Category::Personal))
        .unwrap();

    assert!(window_b.is_stale());
    let seen = window_b.notes(&NoteQuery::new()).unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].title, "Groceries");
}

#[test]
fn test_writer_is_not_notified_of_its_own_changes() {
    let backend = Rc::new(MemBackend::new());
    let bus = ChangeBus::new();
    let mut window_a = context(&backend, &bus);
    let _window_b = context(&backend, &bus);

    window_a.create(NoteDraft::new("Mine")).unwrap();
    window_a.notes(&NoteQuery::new()).unwrap();
    assert!(!window_a.is_stale());
}

#[test]
fn test_reload_between_cycles_keeps_both_writes() {
    let backend = Rc::new(MemBackend::new());
    let bus = ChangeBus::new();
    let mut window_a = context(&backend, &bus);
    let mut window_b = context(&backend, &bus);

    window_a.create(NoteDraft::new("From A")).unwrap();
    window_b.create(NoteDraft::new("From B")).unwrap();

    let titles: Vec<String> = window_a
        .notes(&NoteQuery::new())
        .unwrap()
        .into_iter()
        .map(|n| n.title)
        .collect();
    assert_eq!(titles, vec!["From A", "From B"]);
}

/// Backend that lets another context write between a read and the write that follows.
struct InterleavingBackend {
    inner: Rc<MemBackend>,
    hook: RefCell<Option<Box<dyn FnOnce()>>>,
}

impl KvBackend for InterleavingBackend {
    fn get(&self, key: &str) -> jotapp::error::Result<Option<String>> {
        let value = self.inner.get(key)?;
        if let Some(hook) = self.hook.borrow_mut().take() {
            hook();
        }
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> jotapp::error::Result<()> {
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> jotapp::error::Result<()> {
        self.inner.remove(key)
    }
}

#[test]
fn test_overlapping_cycles_last_write_wins() {
    let shared = Rc::new(MemBackend::new());
    let mut seed = NoteStore::with_backend(shared.clone());
    let existing = seed.create(NoteDraft::new("Existing")).unwrap();

    let other = shared.clone();
    let hook: Box<dyn FnOnce()> = Box::new(move || {
        let mut window_b = NoteStore::with_backend(other);
        window_b.create(NoteDraft::new("From B")).unwrap();
    });
    let mut window_a = NoteStore::with_backend(InterleavingBackend {
        inner: shared.clone(),
        hook: RefCell::new(Some(hook)),
    });

    window_a.create(NoteDraft::new("From A")).unwrap();

    // A wrote back the collection it read before B's write: B's note is lost.
    let after = NoteStore::with_backend(shared.clone()).snapshot().unwrap();
    let titles: Vec<&str> = after.iter().map(|n| n.title.as_str()).collect();
    assert_eq!(titles, vec!["Existing", "From A"]);
    assert_eq!(after[0], existing);

    // The collection is still well-formed, with unique ids.
    let ids: HashSet<_> = after.iter().map(|n| n.id.clone()).collect();
    assert_eq!(ids.len(), after.len());
    assert!(shared.get(NOTES_KEY).unwrap().is_some());
}

#[test]
fn test_concurrent_creates_never_share_ids() {
    let backend = Rc::new(MemBackend::new());
    let bus = ChangeBus::new();
    let mut window_a = context(&backend, &bus);
    let mut window_b = context(&backend, &bus);

    for i in 0..50 {
        window_a.create(NoteDraft::new(format!("a{i}"))).unwrap();
        window_b.create(NoteDraft::new(format!("b{i}"))).unwrap();
    }

    let notes = window_a.notes(&NoteQuery::new()).unwrap();
    assert_eq!(notes.len(), 100);
    let ids: HashSet<_> = notes.iter().map(|n| n.id.clone()).collect();
    assert_eq!(ids.len(), 100);
}

#[test]
fn test_update_from_one_context_reaches_the_other() {
    let backend = Rc::new(MemBackend::new());
    let bus = ChangeBus::new();
    let mut window_a = context(&backend, &bus);
    let window_b = context(&backend, &bus);

    let note = window_a.create(NoteDraft::new("Draft")).unwrap();
    assert_eq!(window_b.notes(&NoteQuery::new()).unwrap()[0].title, "Draft");

    window_a
        .update(&note.id, NotePatch::default().title("Final"))
        .unwrap();
    assert_eq!(window_b.notes(&NoteQuery::new()).unwrap()[0].title, "Final");

    window_a.delete(&note.id).unwrap();
    assert!(window_b.notes(&NoteQuery::new()).unwrap().is_empty());
}
