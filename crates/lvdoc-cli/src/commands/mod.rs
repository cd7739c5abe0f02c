//! CLI subcommands and the wiring they share.

pub mod analyze;
pub mod config;
pub mod history;

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use lvdoc_core::models::config::BackendKind;
use lvdoc_core::{
    Coordinator, DocumentAnalyzer, FileStore, HistoryStore, KeyValueStore, LlmBackend,
    LvdocConfig, MemoryStore, MockBackend, OpenAiBackend,
};

/// Coordinator type used by the binary.
pub type AppCoordinator = Coordinator<Box<dyn LlmBackend>, Arc<dyn KeyValueStore>>;

/// Load the configuration from `path`, the default location, or defaults.
pub fn load_config(path: Option<&str>) -> anyhow::Result<LvdocConfig> {
    if let Some(path) = path {
        return Ok(LvdocConfig::from_file(Path::new(path))?);
    }

    let default_path = config::default_config_path();
    if default_path.exists() {
        debug!("Using config file {}", default_path.display());
        Ok(LvdocConfig::from_file(&default_path)?)
    } else {
        Ok(LvdocConfig::default())
    }
}

/// Read document text from a file, or from stdin when `input` is `-`.
pub fn read_input(input: &Path) -> anyhow::Result<String> {
    if input == Path::new("-") {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        return Ok(text);
    }

    if !input.exists() {
        anyhow::bail!("Input file not found: {}", input.display());
    }
    Ok(fs::read_to_string(input)?)
}

/// Directory of the persisted history.
pub fn history_dir(config: &LvdocConfig) -> PathBuf {
    config.history.dir.clone().unwrap_or_else(|| {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("lvdoc")
    })
}

/// Open the input history as configured.
pub fn open_history(config: &LvdocConfig) -> HistoryStore<Arc<dyn KeyValueStore>> {
    let store: Arc<dyn KeyValueStore> = if config.history.enabled {
        Arc::new(FileStore::new(history_dir(config)))
    } else {
        Arc::new(MemoryStore::new())
    };
    HistoryStore::with_limit(store, config.history.max_entries)
}

/// Build the coordinator with the configured backend and history.
pub fn build_coordinator(config: &LvdocConfig) -> anyhow::Result<AppCoordinator> {
    let backend: Box<dyn LlmBackend> = match config.llm.backend {
        BackendKind::OpenAi => Box::new(OpenAiBackend::new(config.llm.to_openai_config()?)?),
        BackendKind::Mock => Box::new(mock_backend(config.llm.mock_replies.as_deref())?),
    };
    debug!("Using {} backend", backend.name());

    let analyzer = DocumentAnalyzer::new(backend).with_prompts(config.prompts.clone());
    Ok(Coordinator::new(analyzer, open_history(config)))
}

/// Mock backend replaying a JSON array: strings are text replies, anything
/// else is a structured reply.
fn mock_backend(replies: Option<&Path>) -> anyhow::Result<MockBackend> {
    let mut backend = MockBackend::new();
    let Some(path) = replies else {
        return Ok(backend);
    };

    let replies: Vec<Value> = serde_json::from_str(&fs::read_to_string(path)?)?;
    for reply in replies {
        backend = match reply {
            Value::String(text) => backend.with_text(text),
            other => backend.with_json(other),
        };
    }
    Ok(backend)
}
