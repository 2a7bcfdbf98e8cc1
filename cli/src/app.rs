//! Application context: unified state passed to every command handler.
//!
//! `AppContext` is also the composition root: it is the only place that
//! pairs the infrastructure adapters with the resolver service.

use crate::application::services::resolver::ResolverConfig;
use crate::domain::config::FleetConfig;
use crate::infra::cache::FsMinionCache;
use crate::infra::config::YamlConfigStore;
use crate::infra::pki::PkiKeyStore;
use crate::output::{HumanRenderer, JsonRenderer, OutputContext, Renderer};

/// Output rendering mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable terminal output (default).
    Human,
    /// Machine-readable JSON output.
    Json,
}

/// Output rendering flags.
pub struct OutputFlags {
    /// Disable ANSI color output.
    pub no_color: bool,
    /// Suppress non-error output.
    pub quiet: bool,
    /// Enable JSON output mode.
    pub json: bool,
}

/// Flags passed from the top-level CLI to `AppContext::new`.
pub struct AppFlags {
    /// Output rendering options.
    pub output: OutputFlags,
}

/// Unified application context passed to every command handler.
pub struct AppContext {
    /// Terminal output context (colors, quiet mode).
    pub output: OutputContext,
    /// Output rendering mode (human vs JSON).
    pub mode: OutputMode,
    /// Where `fleet config` reads and writes `FleetConfig`.
    pub config_store: YamlConfigStore,
}

impl AppContext {
    /// Construct an `AppContext` from top-level CLI flags.
    #[must_use]
    pub fn new(flags: &AppFlags) -> Self {
        let mode = if flags.output.json {
            OutputMode::Json
        } else {
            OutputMode::Human
        };

        Self {
            output: OutputContext::new(flags.output.no_color, flags.output.quiet),
            mode,
            config_store: YamlConfigStore,
        }
    }

    /// Returns the appropriate `Renderer` variant for the current output mode.
    #[must_use]
    pub fn renderer(&self) -> Renderer<'_> {
        match self.mode {
            OutputMode::Human => Renderer::Human(HumanRenderer::new(&self.output)),
            OutputMode::Json => Renderer::Json(JsonRenderer),
        }
    }

    /// Wire the on-disk key store and metadata cache described by `config`
    /// into a resolver configuration. No range expander is attached, so
    /// `R@` terms fail with a resolve error.
    #[must_use]
    pub fn resolver_config(&self, config: &FleetConfig) -> ResolverConfig {
        let key_store = PkiKeyStore::new(config.accepted_keys_dir(), config.key_cache);
        let cache = FsMinionCache::new(config.cachedir.clone());
        ResolverConfig::new(Box::new(key_store), Box::new(cache))
            .with_nodegroups(config.nodegroups.clone())
            .with_cache_bank(config.cache_bank.clone())
            .with_minion_data_cache(config.minion_data_cache)
    }
}
