use chrono::{TimeZone, Utc};
use jotapp::audio;
use jotapp::model::{AudioClip, Category, CategoryFilter, Note, NoteDraft, NoteId};
use jotapp::query::{filter_by_category, search};
use jotapp::store::mem_backend::MemBackend;
use jotapp::store::{KvBackend, NoteStore, NOTES_KEY};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;

const WORDS: &[&str] = &[
    "Rome", "rome", "flights", "Budget", "idea", "IDEA", "groceries", "Milk", "standup", "Q3",
    "voice", "Ünïcode", "straße", "",
];

fn random_text(rng: &mut StdRng) -> String {
    let len = rng.gen_range(0..4);
    (0..len)
        .map(|_| WORDS[rng.gen_range(0..WORDS.len())])
        .collect::<Vec<_>>()
        .join(" ")
}

fn random_category(rng: &mut StdRng) -> Category {
    Category::ALL[rng.gen_range(0..Category::ALL.len())]
}

fn random_filter(rng: &mut StdRng) -> CategoryFilter {
    if rng.gen_bool(0.2) {
        CategoryFilter::All
    } else {
        CategoryFilter::Only(random_category(rng))
    }
}

fn random_notes(rng: &mut StdRng) -> Vec<Note> {
    let ts = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
    let count = rng.gen_range(0..25);
    (0..count)
        .map(|i| Note {
            id: NoteId::new(format!("n{i}")),
            title: random_text(rng),
            content: random_text(rng),
            category: random_category(rng),
            created_at: ts,
            updated_at: ts,
            audio: None,
        })
        .collect()
}

#[test]
fn test_search_and_filter_commute() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    for _ in 0..500 {
        let notes = random_notes(&mut rng);
        let query = if rng.gen_bool(0.5) {
            WORDS[rng.gen_range(0..WORDS.len())].to_string()
        } else {
            let word = WORDS[rng.gen_range(0..WORDS.len())];
            let end = word.char_indices().nth(2).map(|(i, _)| i).unwrap_or(word.len());
            word[..end].to_uppercase()
        };
        let category = random_filter(&mut rng);

        let search_then_filter = filter_by_category(&search(&notes, &query), category);
        let filter_then_search = search(&filter_by_category(&notes, category), &query);
        assert_eq!(
            search_then_filter, filter_then_search,
            "query {query:?}, category {category}"
        );
    }
}

#[test]
fn test_query_results_are_ordered_subsequences() {
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..200 {
        let notes = random_notes(&mut rng);
        let query = WORDS[rng.gen_range(0..WORDS.len())];
        let found = search(&notes, query);

        let positions = found
            .iter()
            .map(|f| notes.iter().position(|n| n.id == f.id).unwrap());
        let mut last = None;
        for p in positions {
            assert!(last.map_or(true, |l| p > l));
            last = Some(p);
        }
    }
}

#[test]
fn test_ids_unique_across_many_creates() {
    let mut store = NoteStore::with_backend(MemBackend::new());
    let mut seen = HashSet::new();
    for i in 0..1_000 {
        let note = store.create(NoteDraft::new(format!("note {i}"))).unwrap();
        assert!(seen.insert(note.id), "duplicate id on create #{i}");
    }
}

#[test]
fn test_collection_serialization_round_trip() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut store = NoteStore::with_backend(MemBackend::new());
    for _ in 0..30 {
        let mut draft = NoteDraft::new(format!("title {}", rng.gen::<u32>()))
            .content(random_text(&mut rng))
            .category(random_category(&mut rng));
        if rng.gen_bool(0.3) {
            let bytes: Vec<u8> = (0..rng.gen_range(0..64)).map(|_| rng.gen()).collect();
            draft = draft.audio(AudioClip::new(bytes, rng.gen_range(0..600)));
        }
        store.create(draft).unwrap();
    }

    let notes = store.snapshot().unwrap();
    let json = serde_json::to_string(&notes).unwrap();
    let back: Vec<Note> = serde_json::from_str(&json).unwrap();
    assert_eq!(back, notes);
    assert_eq!(store.backend().get(NOTES_KEY).unwrap().unwrap(), json);
}

#[test]
fn test_audio_round_trip_through_store() {
    let mut rng = StdRng::seed_from_u64(99);
    // 3.6 MiB of audio is ~4.8 MiB once encoded: close to a 5 MiB quota.
    let sizes = [0usize, 17, 3_600_000];
    let mut store = NoteStore::with_backend(MemBackend::with_quota(5 * 1024 * 1024));

    for size in sizes {
        let bytes: Vec<u8> = (0..size).map(|_| rng.gen()).collect();
        let note = store
            .create(NoteDraft::new(format!("memo {size}")).audio(AudioClip::new(bytes.clone(), 30)))
            .unwrap();
        let stored = store.get(&note.id).unwrap().unwrap();
        let memo = stored.audio.expect("memo kept");
        assert_eq!(memo.duration_seconds, 30);
        assert_eq!(audio::decode(&memo.encoded_data).unwrap().bytes, bytes);
        store.delete(&note.id).unwrap();
    }
}
