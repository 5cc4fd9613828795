//! # CLI Layer
//!
//! One client of the `jotapp` library. This is the only place that touches the terminal,
//! reads recordings from disk, sets up logging or decides exit codes.
//!
//! Each `handle_*` builds library inputs from arguments, calls [`JotApi`], and hands
//! the result to `print`. Business rules (validation, ids, timestamps, quota) stay in
//! the library.

use super::print::{print_full_note, print_json, print_notes, print_success};
use super::setup::{AudioArgs, Cli, Commands};
use anyhow::{bail, Context};
use clap::Parser;
use jotapp::api::JotApi;
use jotapp::audio;
use jotapp::config::JotConfig;
use jotapp::model::{AudioChange, AudioClip, Category, CategoryFilter, NoteDraft, NoteId, NotePatch};
use jotapp::query::NoteQuery;
use jotapp::store::fs_backend::FsBackend;
use jotapp::store::NoteStore;
use std::fs;
use std::path::Path;
use tracing::debug;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

struct AppContext {
    api: JotApi<FsBackend>,
}

pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let mut ctx = init_context(&cli)?;

    match cli.command {
        Some(Commands::Add {
            title,
            content,
            category,
            audio,
        }) => handle_add(&mut ctx, title, content, category, audio),
        Some(Commands::List {
            category,
            search,
            json,
        }) => handle_list(&ctx, category, search, json),
        Some(Commands::Search {
            query,
            category,
            json,
        }) => handle_list(&ctx, category, Some(query), json),
        Some(Commands::Show { id, json }) => handle_show(&ctx, id, json),
        Some(Commands::Edit {
            id,
            title,
            content,
            category,
            audio,
            remove_audio,
        }) => handle_edit(&mut ctx, id, title, content, category, audio, remove_audio),
        Some(Commands::Delete { id }) => handle_delete(&mut ctx, id),
        Some(Commands::ExportAudio { id, file }) => handle_export_audio(&ctx, id, &file),
        None => handle_list(&ctx, None, None, false),
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("jot=debug,jotapp=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("jot=warn,jotapp=warn"))
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}

fn init_context(cli: &Cli) -> anyhow::Result<AppContext> {
    let mut config = JotConfig::load()?;
    if let Some(dir) = &cli.data_dir {
        config.data_dir = Some(dir.clone());
    }
    let data_dir = config.data_dir()?;
    debug!(data_dir = %data_dir.display(), quota = config.quota_bytes, "opening store");

    let backend = FsBackend::new(data_dir).with_quota(config.quota_bytes);
    let store = NoteStore::from_config(backend, &config)?;
    Ok(AppContext {
        api: JotApi::new(store),
    })
}

fn handle_add(
    ctx: &mut AppContext,
    title: Vec<String>,
    content: Option<String>,
    category: Option<Category>,
    audio: AudioArgs,
) -> anyhow::Result<()> {
    let mut draft = NoteDraft::new(title.join(" ")).content(content.unwrap_or_default());
    if let Some(category) = category {
        draft = draft.category(category);
    }
    if let Some(clip) = read_clip(&audio)? {
        draft = draft.audio(clip);
    }

    let note = ctx.api.create(draft)?;
    print_success(&format!("Added note {}: {}", note.id, note.title));
    Ok(())
}

fn handle_list(
    ctx: &AppContext,
    category: Option<CategoryFilter>,
    search: Option<String>,
    json: bool,
) -> anyhow::Result<()> {
    let mut query = NoteQuery::new().category(category.unwrap_or_default());
    if let Some(text) = search {
        query = query.text(text);
    }
    let notes = ctx.api.notes(&query)?;

    if json {
        print_json(&notes)
    } else {
        print_notes(&notes);
        Ok(())
    }
}

fn handle_show(ctx: &AppContext, id: String, json: bool) -> anyhow::Result<()> {
    let note = ctx.api.store().get_required(&NoteId::from(id))?;
    if json {
        print_json(&note)
    } else {
        print_full_note(&note);
        Ok(())
    }
}

fn handle_edit(
    ctx: &mut AppContext,
    id: String,
    title: Option<String>,
    content: Option<String>,
    category: Option<Category>,
    audio: AudioArgs,
    remove_audio: bool,
) -> anyhow::Result<()> {
    let mut patch = NotePatch::default();
    if let Some(title) = title {
        patch = patch.title(title);
    }
    if let Some(content) = content {
        patch = patch.content(content);
    }
    if let Some(category) = category {
        patch = patch.category(category);
    }
    if let Some(clip) = read_clip(&audio)? {
        patch = patch.audio(AudioChange::Replace(clip));
    } else if remove_audio {
        patch = patch.audio(AudioChange::Remove);
    }
    if patch.is_empty() {
        bail!("nothing to change; pass --title, --content, --category, --audio or --remove-audio");
    }

    let note = ctx.api.update(&NoteId::from(id), patch)?;
    print_success(&format!("Updated note {}: {}", note.id, note.title));
    Ok(())
}

fn handle_delete(ctx: &mut AppContext, id: String) -> anyhow::Result<()> {
    let id = NoteId::from(id);
    let Some(note) = ctx.api.get(&id)? else {
        println!("Nothing to delete: no note {}", id);
        return Ok(());
    };
    ctx.api.delete(&id)?;
    print_success(&format!("Deleted note {}: {}", note.id, note.title));
    Ok(())
}

fn handle_export_audio(ctx: &AppContext, id: String, file: &Path) -> anyhow::Result<()> {
    let note = ctx.api.store().get_required(&NoteId::from(id))?;
    let Some(memo) = &note.audio else {
        bail!("note {} has no voice memo", note.id);
    };
    let decoded = audio::decode(&memo.encoded_data)?;
    fs::write(file, &decoded.bytes)
        .with_context(|| format!("could not write {}", file.display()))?;

    print_success(&format!(
        "Wrote {} bytes ({}, {}) to {}",
        decoded.bytes.len(),
        audio::format_duration(memo.duration_seconds),
        decoded.media_type,
        file.display()
    ));
    Ok(())
}

fn read_clip(args: &AudioArgs) -> anyhow::Result<Option<AudioClip>> {
    let (Some(path), Some(duration)) = (&args.audio, args.duration) else {
        return Ok(None);
    };
    let bytes =
        fs::read(path).with_context(|| format!("could not read recording {}", path.display()))?;
    let mut clip = AudioClip::new(bytes, duration);
    if let Some(media_type) = media_type_for(path) {
        clip = clip.with_media_type(media_type);
    }
    Ok(Some(clip))
}

/// Media type from a recording's extension. Unknown extensions fall back to the
/// configured default.
fn media_type_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "wav" => Some("audio/wav"),
        "webm" => Some("audio/webm"),
        "ogg" | "oga" => Some("audio/ogg"),
        "mp3" => Some("audio/mpeg"),
        "m4a" => Some("audio/mp4"),
        _ => None,
    }
}
