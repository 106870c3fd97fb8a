//! The closed catalog of tool actions.
//!
//! Every atomic browser operation the agent can take is a variant of
//! [`ToolAction`]. The wire shape is `{"tool": "<kebab-name>", "params":
//! {...}}` with `params` omissible whenever every field has a default.
//! Deserialization rejects unknown tool names up front, so the dispatcher
//! only ever sees catalog members and its `match` stays exhaustive.

use serde::de::{Deserializer, Error as DeError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One atomic browser operation, with its typed parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "tool", content = "params", rename_all = "kebab-case")]
pub enum ToolAction {
    /// Load a URL in the active tab, or a fresh tab when requested.
    Navigate(NavigateParams),
    /// Go one entry back in the tab's history.
    GoBack(GoBackParams),
    /// Markdown rendering of the page, chunked for large documents.
    GetPageText(GetPageTextParams),
    /// Fresh perception pass returning the indexed interactable elements.
    GetElements(GetElementsParams),
    /// Click an element by index, selector, or viewport coordinates.
    ClickElement(ClickParams),
    /// Type into an input, textarea, or contenteditable element.
    TypeText(TypeTextParams),
    /// Scroll the page or a specific element.
    Scroll(ScrollParams),
    /// Send a keyboard key or combo (e.g. `Enter`, `Control+a`).
    SendKeys(SendKeysParams),
    /// Poll for a selector to appear; timing out is a result, not an error.
    WaitForElement(WaitForElementParams),
    /// Wait for the current document to finish loading.
    WaitForNavigation(WaitForNavigationParams),
    /// Search the page's visible text for a pattern.
    SearchPage(SearchPageParams),
    /// List elements matching a CSS selector.
    FindElements(FindElementsParams),
    /// Read the options of a `<select>` element.
    GetDropdownOptions(DropdownTargetParams),
    /// Choose a `<select>` option by value or visible label.
    SelectDropdownOption(SelectDropdownOptionParams),
    /// Evaluate a JavaScript expression in page context.
    EvaluateJs(EvaluateJsParams),
    /// Screenshot the visible viewport.
    CaptureVisibleTab(CaptureParams),
    /// Collect the page's hyperlinks.
    ExtractLinks(ExtractLinksParams),
    /// Title, meta tags, Open Graph and canonical data.
    GetPageMetadata(GetPageMetadataParams),
    /// Flash a visual outline around an element.
    HighlightElement(HighlightParams),
    /// Batch-fill several form fields in one call.
    FillForm(FillFormParams),
}

impl ToolAction {
    /// The wire name of this action.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Navigate(_) => "navigate",
            Self::GoBack(_) => "go-back",
            Self::GetPageText(_) => "get-page-text",
            Self::GetElements(_) => "get-elements",
            Self::ClickElement(_) => "click-element",
            Self::TypeText(_) => "type-text",
            Self::Scroll(_) => "scroll",
            Self::SendKeys(_) => "send-keys",
            Self::WaitForElement(_) => "wait-for-element",
            Self::WaitForNavigation(_) => "wait-for-navigation",
            Self::SearchPage(_) => "search-page",
            Self::FindElements(_) => "find-elements",
            Self::GetDropdownOptions(_) => "get-dropdown-options",
            Self::SelectDropdownOption(_) => "select-dropdown-option",
            Self::EvaluateJs(_) => "evaluate-js",
            Self::CaptureVisibleTab(_) => "capture-visible-tab",
            Self::ExtractLinks(_) => "extract-links",
            Self::GetPageMetadata(_) => "get-page-metadata",
            Self::HighlightElement(_) => "highlight-element",
            Self::FillForm(_) => "fill-form",
        }
    }
}

/// Every wire name in the catalog, in catalog order.
pub const TOOL_NAMES: [&str; 20] = [
    "navigate",
    "go-back",
    "get-page-text",
    "get-elements",
    "click-element",
    "type-text",
    "scroll",
    "send-keys",
    "wait-for-element",
    "wait-for-navigation",
    "search-page",
    "find-elements",
    "get-dropdown-options",
    "select-dropdown-option",
    "evaluate-js",
    "capture-visible-tab",
    "extract-links",
    "get-page-metadata",
    "highlight-element",
    "fill-form",
];

impl<'de> Deserialize<'de> for ToolAction {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Envelope {
            tool: String,
            #[serde(default)]
            params: serde_json::Value,
        }

        fn params<T, E>(tool: &str, value: serde_json::Value) -> Result<T, E>
        where
            T: serde::de::DeserializeOwned,
            E: DeError,
        {
            let value = if value.is_null() {
                serde_json::Value::Object(serde_json::Map::new())
            } else {
                value
            };
            serde_json::from_value(value)
                .map_err(|e| E::custom(format!("invalid params for '{tool}': {e}")))
        }

        let env = Envelope::deserialize(deserializer)?;
        let tool = env.tool.as_str();
        match tool {
            "navigate" => Ok(Self::Navigate(params(tool, env.params)?)),
            "go-back" => Ok(Self::GoBack(params(tool, env.params)?)),
            "get-page-text" => Ok(Self::GetPageText(params(tool, env.params)?)),
            "get-elements" => Ok(Self::GetElements(params(tool, env.params)?)),
            "click-element" => Ok(Self::ClickElement(params(tool, env.params)?)),
            "type-text" => Ok(Self::TypeText(params(tool, env.params)?)),
            "scroll" => Ok(Self::Scroll(params(tool, env.params)?)),
            "send-keys" => Ok(Self::SendKeys(params(tool, env.params)?)),
            "wait-for-element" => Ok(Self::WaitForElement(params(tool, env.params)?)),
            "wait-for-navigation" => Ok(Self::WaitForNavigation(params(tool, env.params)?)),
            "search-page" => Ok(Self::SearchPage(params(tool, env.params)?)),
            "find-elements" => Ok(Self::FindElements(params(tool, env.params)?)),
            "get-dropdown-options" => Ok(Self::GetDropdownOptions(params(tool, env.params)?)),
            "select-dropdown-option" => Ok(Self::SelectDropdownOption(params(tool, env.params)?)),
            "evaluate-js" => Ok(Self::EvaluateJs(params(tool, env.params)?)),
            "capture-visible-tab" => Ok(Self::CaptureVisibleTab(params(tool, env.params)?)),
            "extract-links" => Ok(Self::ExtractLinks(params(tool, env.params)?)),
            "get-page-metadata" => Ok(Self::GetPageMetadata(params(tool, env.params)?)),
            "highlight-element" => Ok(Self::HighlightElement(params(tool, env.params)?)),
            "fill-form" => Ok(Self::FillForm(params(tool, env.params)?)),
            other => Err(D::Error::custom(format!("unknown tool '{other}'"))),
        }
    }
}

// ===== Targeting =====

/// How an action addresses a specific element.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementTarget {
    /// A 1-based index from the current snapshot's registry.
    Index(u32),
    /// A CSS selector resolved live in the page.
    Selector(String),
    /// Raw viewport coordinates (click only).
    Point { x: f64, y: f64 },
}

impl std::fmt::Display for ElementTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Index(i) => write!(f, "index {i}"),
            Self::Selector(s) => write!(f, "selector '{s}'"),
            Self::Point { x, y } => write!(f, "point ({x}, {y})"),
        }
    }
}

/// Invalid element-target combinations in action params.
#[derive(Debug, Error, PartialEq)]
pub enum TargetError {
    #[error("no target given; provide an element index or a CSS selector")]
    Missing,
    #[error("ambiguous target; provide exactly one of index, selector, or coordinates")]
    Ambiguous,
    #[error("incomplete coordinates; both x and y are required")]
    IncompletePoint,
}

fn index_or_selector(
    index: Option<u32>,
    selector: Option<&str>,
) -> Result<ElementTarget, TargetError> {
    match (index, selector) {
        (Some(_), Some(_)) => Err(TargetError::Ambiguous),
        (Some(i), None) => Ok(ElementTarget::Index(i)),
        (None, Some(s)) => Ok(ElementTarget::Selector(s.to_string())),
        (None, None) => Err(TargetError::Missing),
    }
}

// ===== Per-action parameters =====

fn default_true() -> bool {
    true
}

fn default_wait_timeout_ms() -> u64 {
    10_000
}

fn default_text_max_length() -> usize {
    20_000
}

fn default_search_max_matches() -> usize {
    20
}

fn default_search_context_chars() -> usize {
    80
}

fn default_find_limit() -> usize {
    20
}

fn default_links_limit() -> usize {
    100
}

fn default_highlight_color() -> String {
    "red".to_string()
}

fn default_highlight_duration_ms() -> u64 {
    2_000
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavigateParams {
    /// Absolute URL to load.
    pub url: String,
    /// Open in a new tab instead of reusing the active one.
    #[serde(default)]
    pub new_tab: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GoBackParams {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetPageTextParams {
    /// Keep hyperlinks as `[text](url)` in the markdown.
    #[serde(default = "default_true")]
    pub include_links: bool,
    /// Chunk size cap in characters.
    #[serde(default = "default_text_max_length")]
    pub max_length: usize,
    /// Resume offset for paging through long documents.
    #[serde(default)]
    pub start_from_char: usize,
}

impl Default for GetPageTextParams {
    fn default() -> Self {
        Self {
            include_links: true,
            max_length: default_text_max_length(),
            start_from_char: 0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GetElementsParams {
    /// Override the configured viewport expansion margin (px; -1 = no limit).
    #[serde(default)]
    pub viewport_expansion: Option<i64>,
    /// Override the configured maximum walk depth.
    #[serde(default)]
    pub max_depth: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClickParams {
    /// Element index from the current snapshot.
    #[serde(default)]
    pub index: Option<u32>,
    /// CSS selector, resolved live.
    #[serde(default)]
    pub selector: Option<String>,
    /// Viewport x coordinate.
    #[serde(default)]
    pub x: Option<f64>,
    /// Viewport y coordinate.
    #[serde(default)]
    pub y: Option<f64>,
}

impl ClickParams {
    /// Validate that exactly one target form was given.
    pub fn target(&self) -> Result<ElementTarget, TargetError> {
        let has_point = self.x.is_some() || self.y.is_some();
        let forms = usize::from(self.index.is_some())
            + usize::from(self.selector.is_some())
            + usize::from(has_point);
        match forms {
            0 => Err(TargetError::Missing),
            1 => {
                if let Some(i) = self.index {
                    Ok(ElementTarget::Index(i))
                } else if let Some(s) = &self.selector {
                    Ok(ElementTarget::Selector(s.clone()))
                } else {
                    match (self.x, self.y) {
                        (Some(x), Some(y)) => Ok(ElementTarget::Point { x, y }),
                        _ => Err(TargetError::IncompletePoint),
                    }
                }
            }
            _ => Err(TargetError::Ambiguous),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeTextParams {
    #[serde(default)]
    pub index: Option<u32>,
    #[serde(default)]
    pub selector: Option<String>,
    /// Text to enter.
    pub text: String,
    /// Empty the field before typing.
    #[serde(default)]
    pub clear: bool,
    /// Synthesize Enter afterwards (and submit the enclosing form for inputs).
    #[serde(default)]
    pub press_enter: bool,
}

impl TypeTextParams {
    pub fn target(&self) -> Result<ElementTarget, TargetError> {
        index_or_selector(self.index, self.selector.as_deref())
    }
}

/// Scroll direction for the `scroll` action.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollDirection {
    Up,
    #[default]
    Down,
    Left,
    Right,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScrollParams {
    #[serde(default)]
    pub direction: ScrollDirection,
    /// Pixels to scroll; defaults to one viewport.
    #[serde(default)]
    pub amount: Option<f64>,
    /// Scroll inside this element instead of the page.
    #[serde(default)]
    pub index: Option<u32>,
    #[serde(default)]
    pub selector: Option<String>,
}

impl ScrollParams {
    /// Element container target, if one was given.
    pub fn container(&self) -> Result<Option<ElementTarget>, TargetError> {
        if self.index.is_none() && self.selector.is_none() {
            return Ok(None);
        }
        index_or_selector(self.index, self.selector.as_deref()).map(Some)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendKeysParams {
    /// Key name or `Modifier+Key` combo, e.g. `Enter`, `Control+a`.
    pub keys: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaitForElementParams {
    pub selector: String,
    #[serde(default = "default_wait_timeout_ms")]
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaitForNavigationParams {
    #[serde(default = "default_wait_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for WaitForNavigationParams {
    fn default() -> Self {
        Self {
            timeout_ms: default_wait_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchPageParams {
    /// Substring, or a regular expression when `regex` is set.
    pub pattern: String,
    #[serde(default)]
    pub regex: bool,
    #[serde(default)]
    pub case_sensitive: bool,
    #[serde(default = "default_search_max_matches")]
    pub max_matches: usize,
    /// Characters of context captured around each match.
    #[serde(default = "default_search_context_chars")]
    pub context_chars: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FindElementsParams {
    pub selector: String,
    #[serde(default = "default_find_limit")]
    pub limit: usize,
    /// Drop elements that are not currently visible.
    #[serde(default)]
    pub visible_only: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DropdownTargetParams {
    #[serde(default)]
    pub index: Option<u32>,
    #[serde(default)]
    pub selector: Option<String>,
}

impl DropdownTargetParams {
    pub fn target(&self) -> Result<ElementTarget, TargetError> {
        index_or_selector(self.index, self.selector.as_deref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectDropdownOptionParams {
    #[serde(default)]
    pub index: Option<u32>,
    #[serde(default)]
    pub selector: Option<String>,
    /// Match by option `value` attribute.
    #[serde(default)]
    pub value: Option<String>,
    /// Match by visible option text.
    #[serde(default)]
    pub label: Option<String>,
}

impl SelectDropdownOptionParams {
    pub fn target(&self) -> Result<ElementTarget, TargetError> {
        index_or_selector(self.index, self.selector.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluateJsParams {
    /// Expression or IIFE body; promises are awaited.
    pub code: String,
}

/// Screenshot encoding for `capture-visible-tab`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureFormat {
    #[default]
    Png,
    Jpeg,
}

impl CaptureFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CaptureParams {
    #[serde(default)]
    pub format: CaptureFormat,
    /// JPEG quality 0-100; ignored for PNG.
    #[serde(default)]
    pub quality: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractLinksParams {
    /// Keep only links on the current page's host.
    #[serde(default)]
    pub internal_only: bool,
    #[serde(default = "default_links_limit")]
    pub limit: usize,
}

impl Default for ExtractLinksParams {
    fn default() -> Self {
        Self {
            internal_only: false,
            limit: default_links_limit(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GetPageMetadataParams {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighlightParams {
    #[serde(default)]
    pub index: Option<u32>,
    #[serde(default)]
    pub selector: Option<String>,
    /// CSS color for the outline.
    #[serde(default = "default_highlight_color")]
    pub color: String,
    #[serde(default = "default_highlight_duration_ms")]
    pub duration_ms: u64,
}

impl HighlightParams {
    pub fn target(&self) -> Result<ElementTarget, TargetError> {
        index_or_selector(self.index, self.selector.as_deref())
    }
}

/// One field in a `fill-form` batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormField {
    pub selector: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FillFormParams {
    pub fields: Vec<FormField>,
}

#[cfg(test)]
#[path = "action_tests.rs"]
mod tests;
