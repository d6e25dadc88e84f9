//! Commands that run a full editing session against the restaurant backend.

use std::path::Path;
use std::sync::Arc;

use platemap_backend::BackendClient;
use platemap_core::{AppConfig, ImageUpload, SessionContext};
use platemap_editor::{
    EditorDeps, FileIdCache, LocationState, ProfileEditor, ResolveOutcome, RestaurantIdResolver,
    SearchOutcome,
};
use platemap_geocode::GeocodeClient;

use crate::lookup::geocode_client;
use crate::SaveArgs;

type Editor = ProfileEditor<GeocodeClient, BackendClient>;
type Resolver = RestaurantIdResolver<BackendClient, FileIdCache>;

fn backend_client(
    config: &AppConfig,
    session: &SessionContext,
) -> anyhow::Result<Arc<BackendClient>> {
    let client = BackendClient::new(
        &config.api_base_url,
        config.request_timeout_secs,
        &session.token,
    )
    .map_err(|e| anyhow::anyhow!("failed to build backend client: {e}"))?;
    Ok(Arc::new(client))
}

fn id_resolver(
    config: &AppConfig,
    session: &SessionContext,
    backend: Arc<BackendClient>,
) -> Resolver {
    let resolver = RestaurantIdResolver::new(backend, FileIdCache::new(&config.id_cache_path));
    if let Some(id) = &session.restaurant_id {
        resolver.remember(&session.owner_id, id);
    }
    resolver
}

async fn open_editor(config: &AppConfig, session: &SessionContext) -> anyhow::Result<Editor> {
    let backend = backend_client(config, session)?;
    let resolver = id_resolver(config, session, Arc::clone(&backend));
    let deps = EditorDeps {
        geocoder: Arc::new(geocode_client(config)?),
        backend,
        debounce: config.search_debounce(),
        default_position: config.default_position,
    };
    let editor = ProfileEditor::open(deps, &resolver, &session.owner_id).await?;
    Ok(editor)
}

pub(crate) async fn run_resolve_id(
    config: &AppConfig,
    session: &SessionContext,
) -> anyhow::Result<()> {
    let backend = backend_client(config, session)?;
    let resolver = id_resolver(config, session, backend);
    match resolver.resolve_owned_restaurant_id(&session.owner_id).await? {
        Some(id) => println!("{id}"),
        None => println!("owner {} has no restaurant yet", session.owner_id),
    }
    Ok(())
}

pub(crate) async fn run_show(config: &AppConfig, session: &SessionContext) -> anyhow::Result<()> {
    let editor = open_editor(config, session).await?;
    match editor.profile() {
        Some(profile) => println!("{}", serde_json::to_string_pretty(profile)?),
        None => print_state(&editor.state()),
    }
    Ok(())
}

/// Searches `query`, selects the `index`-th suggestion, and saves when asked.
///
/// # Errors
///
/// Returns an error if the query is blank, the search fails, `index` is out
/// of range, or the save fails.
pub(crate) async fn run_pick(
    config: &AppConfig,
    session: &SessionContext,
    query: &str,
    index: usize,
    save: &SaveArgs,
) -> anyhow::Result<()> {
    let mut editor = open_editor(config, session).await?;

    let handle = editor
        .search(query)
        .ok_or_else(|| anyhow::anyhow!("search text must not be blank"))?;
    match handle.await? {
        SearchOutcome::Applied { .. } => {}
        SearchOutcome::Superseded => anyhow::bail!("search was superseded"),
        SearchOutcome::Failed | SearchOutcome::SessionInvalid => {
            print_state(&editor.state());
            anyhow::bail!("address search failed");
        }
    }

    let state = editor.state();
    for (i, s) in state.suggestions().iter().enumerate() {
        println!("[{i}] {}  ({})", s.label, s.position);
    }
    let count = state.suggestions().len();
    let picked = editor
        .select_index(index)
        .ok_or_else(|| anyhow::anyhow!("no suggestion at index {index} ({count} available)"))?;
    println!("picked: {}", picked.label);

    print_state(&editor.state());
    maybe_save(&mut editor, save).await
}

/// Places the marker at `lat`/`lng`, waits for the reverse lookup, and saves
/// when asked.
///
/// # Errors
///
/// Returns an error for an out-of-range coordinate or a failed save. A failed
/// lookup is reported but keeps the previous address.
pub(crate) async fn run_click(
    config: &AppConfig,
    session: &SessionContext,
    lat: f64,
    lng: f64,
    save: &SaveArgs,
) -> anyhow::Result<()> {
    let mut editor = open_editor(config, session).await?;

    match editor.click(lat, lng)?.await? {
        ResolveOutcome::Applied(address) => tracing::info!(%address, "marker address resolved"),
        ResolveOutcome::SessionInvalid => anyhow::bail!("session rejected by geocoder"),
        ResolveOutcome::Failed | ResolveOutcome::Superseded => {}
    }

    print_state(&editor.state());
    maybe_save(&mut editor, save).await
}

async fn maybe_save(editor: &mut Editor, args: &SaveArgs) -> anyhow::Result<()> {
    if !args.save {
        return Ok(());
    }
    if let Some(path) = &args.image {
        editor.attach_image(read_image(path).await?);
    }
    let saved = editor.save().await?;
    println!("saved restaurant {} at {}", saved.id, saved.address);
    Ok(())
}

async fn read_image(path: &Path) -> anyhow::Result<ImageUpload> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| anyhow::anyhow!("failed to read image {}: {e}", path.display()))?;
    let file_name = path
        .file_name()
        .map_or_else(|| "image".to_owned(), |n| n.to_string_lossy().into_owned());
    Ok(ImageUpload {
        mime: mime_for(path).to_owned(),
        file_name,
        bytes,
    })
}

fn mime_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        _ => "application/octet-stream",
    }
}

fn print_state(state: &LocationState) {
    println!("position: {}", state.position());
    println!("address:  {}", state.address());
    if let Some(notice) = state.notice() {
        println!("notice:   {notice}");
    }
}
