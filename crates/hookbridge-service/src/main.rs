//! # Hookbridge Service
//!
//! Binary entry point: reads configuration from flags/environment, builds
//! the immutable adapter registry and routing table, and starts the
//! event-loop HTTP binding.
//!
//! Zero-code integrations are registered from a template directory: every
//! `<inputType>.json` file becomes a templated handler for that routing
//! key. A second filename segment selects the body type, e.g.
//! `librato.payload.json` binds the form-`payload` decoder.

use anyhow::{bail, Context};
use clap::Parser;
use hookbridge_api::start_server;
use hookbridge_core::adapters::ChatWebhookAdapter;
use hookbridge_core::{
    AdapterSet, Handler, MessageBodyType, Service, ServiceConfig, TemplateNormalizer,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "hookbridge", version, about = "Webhook-to-chat fan-out service")]
struct Cli {
    /// Port to listen on.
    #[arg(long, env = "HOOKBRIDGE_PORT", default_value_t = 8080)]
    port: u16,

    /// Base URL prepended to relative icon paths.
    #[arg(long, env = "HOOKBRIDGE_ICON_BASE_URL", default_value = "")]
    icon_base_url: String,

    /// Comma-separated token allow-list; empty disables the check.
    #[arg(long, env = "HOOKBRIDGE_TOKENS", default_value = "")]
    tokens: String,

    /// URL shown on the landing page.
    #[arg(long, env = "HOOKBRIDGE_DISPLAY_URL")]
    display_url: Option<String>,

    /// Outbound adapters as comma-separated `name=url` pairs.
    #[arg(long, env = "HOOKBRIDGE_ADAPTERS", default_value = "")]
    adapters: String,

    /// Directory of JSON message templates, one per routing key.
    #[arg(long, env = "HOOKBRIDGE_TEMPLATE_DIR")]
    template_dir: Option<PathBuf>,

    /// Emit logs as JSON lines.
    #[arg(long, env = "HOOKBRIDGE_LOG_JSON", default_value_t = false)]
    log_json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let config = ServiceConfig {
        port: cli.port,
        icon_base_url: cli.icon_base_url,
        token_allow_list: ServiceConfig::parse_token_allow_list(&cli.tokens),
        display_url: cli.display_url,
    };

    let mut adapter_set = AdapterSet::new();
    for (name, url) in parse_adapter_specs(&cli.adapters)? {
        info!(adapter = %name, "registering outbound adapter");
        adapter_set.register(Arc::new(ChatWebhookAdapter::new(name, url)));
    }
    let adapters = Arc::new(adapter_set);
    let shared_config = Arc::new(config.clone());

    let mut service = Service::new(config);
    if let Some(dir) = &cli.template_dir {
        register_template_handlers(&mut service, dir, &adapters, &shared_config)
            .with_context(|| format!("loading templates from {}", dir.display()))?;
    }

    info!(
        adapters = adapters.len(),
        handlers = service.input_types().count(),
        "hookbridge starting"
    );

    start_server(Arc::new(service)).await?;
    Ok(())
}

/// Initialize the tracing subscriber, honoring `RUST_LOG`.
fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

/// Parse comma-separated `name=url` adapter specs.
fn parse_adapter_specs(raw: &str) -> anyhow::Result<Vec<(String, String)>> {
    let mut specs = Vec::new();
    for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let Some((name, url)) = entry.split_once('=') else {
            bail!("adapter spec '{entry}' is not name=url");
        };
        let (name, url) = (name.trim(), url.trim());
        if name.is_empty() || url.is_empty() {
            bail!("adapter spec '{entry}' has an empty name or url");
        }
        specs.push((name.to_string(), url.to_string()));
    }
    Ok(specs)
}

/// Register one templated handler per `*.json` file in `dir`.
fn register_template_handlers(
    service: &mut Service,
    dir: &Path,
    adapters: &Arc<AdapterSet>,
    config: &Arc<ServiceConfig>,
) -> anyhow::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .context("template filename is not UTF-8")?;

        let (input_type, body_type) = match stem.split_once('.') {
            Some((name, tag)) => (name, parse_body_type_tag(tag)?),
            None => (stem, MessageBodyType::Json),
        };

        let template = std::fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?;
        // Rails bodies pass through the decoder untouched, so the
        // normalizer reconstructs the nested form itself.
        let normalizer = match body_type {
            MessageBodyType::UrlEncodedRails => TemplateNormalizer::new_rails_form(template),
            _ => TemplateNormalizer::new(template),
        };
        service.register(
            input_type,
            Handler::new(body_type, Arc::new(normalizer), adapters.clone(), config.clone()),
        );
    }
    Ok(())
}

/// Map a template filename's body-type segment to its decoder.
fn parse_body_type_tag(tag: &str) -> anyhow::Result<MessageBodyType> {
    match tag {
        "json" => Ok(MessageBodyType::Json),
        "form" => Ok(MessageBodyType::UrlEncoded),
        "payload" => Ok(MessageBodyType::UrlEncodedJsonPayload),
        "sniff" => Ok(MessageBodyType::UrlEncodedJsonPayloadOrJson),
        "rails" => Ok(MessageBodyType::UrlEncodedRails),
        other => bail!("unknown body type tag '{other}'"),
    }
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
