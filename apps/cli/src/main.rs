//! QuickTask demo CLI.
//!
//! Wires the full stack together: auth backend -> session store -> watch
//! channel -> task store -> change feeds, then runs a short scripted session
//! and logs what the store sees at each step.

mod config;

use std::{sync::Arc, time::Duration};

use backend::{AuthBackend, LocalBackend, MemoryBackend, TableBackend};
use config::Config;
use entities::{TaskDraft, TaskPatch};
use session::SessionStore;
use task_store::{
    spawn_session_sync,
    views::{task_stats, visible_tasks, TaskFilterOption, TaskSortOption},
    TaskStore,
};
use tracing_subscriber::EnvFilter;

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Polls until the condition holds. The store only reflects mutations once
/// the backend echo lands, so the demo has to wait like a UI would.
async fn settled(mut condition: impl FnMut() -> bool) -> anyhow::Result<()> {
    for _ in 0..400 {
        if condition() {
            return Ok(());
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    anyhow::bail!("store did not settle in time")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env if present
    dotenvy::dotenv().ok();

    let config = Config::from_env();
    init_tracing(&config.log_level);

    let auth: Arc<dyn AuthBackend> = Arc::new(MemoryBackend::new());
    let tables: Arc<dyn TableBackend> = match &config.data_dir {
        Some(dir) => {
            tracing::info!(dir = %dir.display(), "using local JSON backend");
            Arc::new(LocalBackend::open(dir)?)
        }
        None => {
            tracing::info!("using in-memory backend");
            Arc::new(MemoryBackend::new())
        }
    };

    let session = Arc::new(SessionStore::new(auth));
    session.restore().await;
    let listener = session.spawn_listener();

    let store = Arc::new(TaskStore::new(tables));
    let sync = spawn_session_sync(Arc::clone(&store), session.subscribe_user());

    session
        .signup("demo@example.com", "demo-password", "Demo")
        .await?;
    let probe = Arc::clone(&store);
    settled(move || !probe.categories().is_empty() && !probe.is_loading()).await?;

    let categories = store.categories();
    for category in &categories {
        tracing::info!(name = %category.name, color = %category.color, "category");
    }

    let personal = categories[0].clone();
    store
        .create_task(TaskDraft::new("Buy milk", personal.id))
        .await?;
    store
        .create_task(
            TaskDraft::new("Call the bank", personal.id).with_description("About the mortgage"),
        )
        .await?;
    let probe = Arc::clone(&store);
    settled(move || probe.tasks().len() >= 2).await?;

    let first = store.tasks()[0].clone();
    store
        .update_task(first.id, TaskPatch::new().with_completed(true))
        .await?;
    let probe = Arc::clone(&store);
    settled(move || probe.tasks().iter().any(|t| t.completed)).await?;

    let visible = visible_tasks(
        &store.tasks(),
        personal.id,
        TaskFilterOption::All,
        TaskSortOption::Newest,
    );
    for task in &visible {
        tracing::info!(title = %task.title, completed = task.completed, "task");
    }

    let stats = task_stats(&store.tasks_by_category(personal.id));
    tracing::info!(
        total = stats.total,
        completed = stats.completed,
        pending = stats.pending,
        completion_rate = stats.completion_rate,
        "stats"
    );

    session.logout().await;
    let probe = Arc::clone(&store);
    settled(move || probe.tasks().is_empty()).await?;
    tracing::info!("signed out; store cleared");

    sync.abort();
    listener.abort();
    store.shutdown();

    Ok(())
}
