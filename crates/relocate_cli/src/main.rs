//! `relocate`: run the relocation engine once over an HTML file and print the result.

use anyhow::{Context as _, Result, anyhow, bail};
use clap::Parser;
use css_selectors::parse_selector_list;
use html::parse_document;
use log::info;
use relocate::{
    CollectingErrorSink, ContentRelocator, Environment, PlacementMode, RelocateConfig,
    RelocationOptions,
};
use std::fs;
use std::io::{self, Write as _};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Builder;
use tokio::sync::watch;

/// Move a placeholder's content next to, into, or in place of another element
#[derive(Parser)]
#[command(name = "relocate")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// HTML document to transform
    file: PathBuf,

    /// Selector of the placeholder whose content is moved
    placeholder: String,

    /// Selector of the anchor element
    target: String,

    /// before, after, start, end or self (default: $RELOCATE_PLACE, else before)
    #[arg(long)]
    place: Option<PlacementMode>,

    /// Detach the placeholder once its content is placed
    #[arg(long)]
    remove_host: bool,

    /// Print the whole document instead of the body's content
    #[arg(long)]
    document: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let markup = fs::read_to_string(&cli.file)
        .with_context(|| format!("failed to read {}", cli.file.display()))?;
    let mut options = RelocationOptions::from_env(cli.target)?;
    if let Some(place) = cli.place {
        options.place = place;
    }
    options.remove_host |= cli.remove_host;
    let config = RelocateConfig::from_env();

    let runtime = Builder::new_current_thread()
        .enable_time()
        .build()?;
    let output = runtime.block_on(relocate_once(
        &markup,
        &cli.placeholder,
        options,
        &config,
        cli.document,
    ))?;

    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{output}")?;
    Ok(())
}

/// Mount a relocator on the parsed document, let its first pass run, and
/// serialize what is left.
async fn relocate_once(
    markup: &str,
    placeholder_selector: &str,
    options: RelocationOptions,
    config: &RelocateConfig,
    whole_document: bool,
) -> Result<String> {
    let dom = parse_document(markup);
    let list = parse_selector_list(placeholder_selector)
        .with_context(|| format!("invalid placeholder selector `{placeholder_selector}`"))?;
    let Some(placeholder) = dom.query_selector(dom.root(), &list) else {
        bail!("no element matches placeholder selector `{placeholder_selector}`");
    };

    let dom = dom.into_shared();
    let (_options_tx, options_rx) = watch::channel(options);
    let errors = CollectingErrorSink::new();
    let mut relocator = ContentRelocator::new(
        Arc::clone(&dom),
        placeholder,
        options_rx,
        Environment::from_config(config),
        Arc::new(errors.clone()),
    );
    relocator.mount().await;
    relocator.teardown();

    if let Some(err) = errors.take().into_iter().next() {
        return Err(err).context("relocation failed");
    }
    info!("{} placement pass(es) completed", relocator.pass_count());

    let dom = dom.lock().map_err(|_| anyhow!("document lock poisoned"))?;
    let node = if whole_document {
        dom.root()
    } else {
        dom.body().unwrap_or_else(|| dom.root())
    };
    Ok(dom.inner_html(node))
}
