//! One-shot page commands: snapshot, text, act.

use std::io::Read;

use anyhow::{Context, Result};

use webpilot_protocols::{GetPageTextParams, ToolAction, ToolResult};

use crate::config::Config;
use crate::session::open_session;

/// Print the indexed element tree (or the snapshot JSON) of a page.
pub(crate) async fn snapshot(
    config: &Config,
    url: Option<&str>,
    json: bool,
    viewport_expansion: Option<i64>,
) -> Result<()> {
    let session = open_session(config, url).await?;
    let snapshot = session.perceive(viewport_expansion, None).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    println!("{}  [{}]", snapshot.title, snapshot.url);
    println!();
    println!("{}", snapshot.tree_text);
    println!();
    let scroll = &snapshot.scroll;
    println!(
        "{} elements | scroll y {:.0}/{:.0} ({:.1} pages above, {:.1} pages below)",
        snapshot.element_count(),
        scroll.scroll_y,
        scroll.content_height,
        scroll.pages_above,
        scroll.pages_below,
    );
    Ok(())
}

/// Print a markdown rendering of a page.
pub(crate) async fn text(
    config: &Config,
    url: Option<&str>,
    include_links: bool,
    max_length: Option<usize>,
    start_from: Option<usize>,
) -> Result<()> {
    let session = open_session(config, url).await?;

    let mut params = GetPageTextParams {
        include_links,
        ..GetPageTextParams::default()
    };
    if let Some(max) = max_length {
        params.max_length = max;
    }
    if let Some(start) = start_from {
        params.start_from_char = start;
    }

    let result = session.execute(&ToolAction::GetPageText(params)).await;
    let data = require_success(result)?;

    println!("{}", data["text"].as_str().unwrap_or_default());
    if data["has_more"].as_bool().unwrap_or(false) {
        eprintln!(
            "(truncated at {} of {} chars; resume with --start-from {})",
            data["end_char"], data["total_chars"], data["end_char"],
        );
    }
    Ok(())
}

/// Execute one tool action and print its result as JSON.
pub(crate) async fn act(config: &Config, action: &str, url: Option<&str>) -> Result<()> {
    let raw = if action == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("reading action JSON from stdin")?;
        buffer
    } else {
        action.to_string()
    };
    let action: ToolAction = serde_json::from_str(&raw).context("parsing action JSON")?;

    let session = open_session(config, url).await?;
    let result = session.execute(&action).await;

    println!("{}", serde_json::to_string_pretty(&result)?);
    if !result.is_success() {
        std::process::exit(1);
    }
    Ok(())
}

fn require_success(result: ToolResult) -> Result<serde_json::Value> {
    if !result.is_success() {
        anyhow::bail!("{}", result.error_message());
    }
    Ok(result.data.unwrap_or(serde_json::Value::Null))
}
