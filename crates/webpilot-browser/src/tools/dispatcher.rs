//! The automation session: one browser host, one element registry, one
//! entry point for every tool action.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, warn};
use webpilot_protocols::{PageSnapshot, ToolAction, ToolResult};

use crate::config::PerceptionConfig;
use crate::dom::builder::{build_tree, ElementRegistry, NodeRef};
use crate::dom::node::DomSnapshotData;
use crate::error::BrowserError;
use crate::page::{BrowserHost, PageContext};

use super::{content, interaction, navigation};

/// Executes tool actions against a browser host.
///
/// Owns the element registry indices resolve through. Each perception pass
/// (the orchestrator's, or a `get-elements` call) replaces the registry
/// wholesale under a bumped generation; navigation empties it, so indices
/// read from a page that has since been left fail with a distinguishable
/// error instead of hitting an unrelated element.
pub struct AutomationSession {
    host: Arc<dyn BrowserHost>,
    perception: PerceptionConfig,
    navigation_timeout_ms: u64,
    registry: Mutex<ElementRegistry>,
    generation: AtomicU64,
}

impl AutomationSession {
    pub fn new(
        host: Arc<dyn BrowserHost>,
        perception: PerceptionConfig,
        navigation_timeout_ms: u64,
    ) -> Self {
        Self {
            host,
            perception,
            navigation_timeout_ms,
            registry: Mutex::new(ElementRegistry::default()),
            generation: AtomicU64::new(0),
        }
    }

    pub fn host(&self) -> &Arc<dyn BrowserHost> {
        &self.host
    }

    /// Registry generation of the most recent perception pass.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    pub(super) fn navigation_timeout_ms(&self) -> u64 {
        self.navigation_timeout_ms
    }

    pub(super) async fn page(&self) -> Result<Arc<dyn PageContext>, BrowserError> {
        self.host.active_page().await
    }

    /// Fresh perception pass over the active page; replaces the registry.
    pub async fn perceive(
        &self,
        viewport_expansion: Option<i64>,
        max_depth: Option<usize>,
    ) -> Result<PageSnapshot, BrowserError> {
        let page = self.page().await?;
        let data = page.dom_snapshot().await?;
        let (snapshot, _) = self.install_tree(&data, viewport_expansion, max_depth);
        Ok(snapshot)
    }

    /// Build the indexed tree from `data` and make it the current registry.
    pub(super) fn install_tree(
        &self,
        data: &DomSnapshotData,
        viewport_expansion: Option<i64>,
        max_depth: Option<usize>,
    ) -> (PageSnapshot, ElementRegistry) {
        let config = self.perception.with_overrides(viewport_expansion, max_depth);
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let built = build_tree(data, &config, generation);
        *self.registry.lock() = built.registry.clone();
        debug!(
            generation,
            elements = built.snapshot.element_count(),
            "installed element registry"
        );
        (built.snapshot, built.registry)
    }

    pub(super) fn registry_entry(&self, index: u32) -> Result<NodeRef, BrowserError> {
        self.registry.lock().resolve(index).cloned()
    }

    /// Indices die with the page they were read from.
    pub(super) fn invalidate_registry(&self) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        *self.registry.lock() = ElementRegistry::new(generation);
    }

    /// Run one action to completion. Never returns an error; every failure
    /// becomes a failed [`ToolResult`].
    pub async fn execute(&self, action: &ToolAction) -> ToolResult {
        debug!(tool = action.name(), "executing action");
        let outcome = match action {
            ToolAction::Navigate(p) => navigation::navigate(self, p).await,
            ToolAction::GoBack(_) => navigation::go_back(self).await,
            ToolAction::WaitForNavigation(p) => navigation::wait_for_navigation(self, p).await,
            ToolAction::GetPageText(p) => content::get_page_text(self, p).await,
            ToolAction::GetElements(p) => content::get_elements(self, p).await,
            ToolAction::SearchPage(p) => content::search_page(self, p).await,
            ToolAction::FindElements(p) => content::find_elements(self, p).await,
            ToolAction::EvaluateJs(p) => content::evaluate_js(self, p).await,
            ToolAction::CaptureVisibleTab(p) => content::capture_visible_tab(self, p).await,
            ToolAction::ExtractLinks(p) => content::extract_links(self, p).await,
            ToolAction::GetPageMetadata(_) => content::get_page_metadata(self).await,
            ToolAction::ClickElement(p) => interaction::click_element(self, p).await,
            ToolAction::TypeText(p) => interaction::type_text(self, p).await,
            ToolAction::Scroll(p) => interaction::scroll(self, p).await,
            ToolAction::SendKeys(p) => interaction::send_keys(self, p).await,
            ToolAction::WaitForElement(p) => interaction::wait_for_element(self, p).await,
            ToolAction::GetDropdownOptions(p) => interaction::get_dropdown_options(self, p).await,
            ToolAction::SelectDropdownOption(p) => {
                interaction::select_dropdown_option(self, p).await
            }
            ToolAction::HighlightElement(p) => interaction::highlight_element(self, p).await,
            ToolAction::FillForm(p) => interaction::fill_form(self, p).await,
        };

        match outcome {
            Ok(result) => result,
            Err(e) => {
                warn!(tool = action.name(), "action failed: {e}");
                ToolResult::failure(e.to_string())
            }
        }
    }
}

#[cfg(test)]
#[path = "dispatcher_tests.rs"]
mod tests;
