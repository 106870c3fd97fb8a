//! Self-contained page scripts the CDP backend injects.
//!
//! Function sources run via `Runtime.callFunctionOn` with the target node as
//! `this`; expression builders run via `Runtime.evaluate`. None of them
//! assume any helper exists in the page.

/// Summarize a node for action preflight: tag, editability, value, short
/// text, and viewport-relative bounds.
pub(crate) const DESCRIBE_NODE: &str = r#"function() {
    const rect = this.getBoundingClientRect();
    const tag = this.tagName ? this.tagName.toLowerCase() : '';
    let value = null;
    if (tag === 'input' || tag === 'textarea' || tag === 'select') {
        value = this.value;
    }
    let text = (this.innerText || this.textContent || '').replace(/\s+/g, ' ').trim();
    if (text.length > 80) {
        text = text.slice(0, 80);
    }
    return {
        tag: tag,
        inputType: tag === 'input' ? (this.getAttribute('type') || 'text') : null,
        contentEditable: this.isContentEditable === true,
        value: value,
        text: text,
        rect: { x: rect.x, y: rect.y, width: rect.width, height: rect.height },
    };
}"#;

/// Set a field's value through the native setter so framework-bound inputs
/// (React and friends) observe the change, then fire input/change.
pub(crate) const SET_FIELD_VALUE: &str = r#"function(text, clear) {
    const tag = this.tagName ? this.tagName.toLowerCase() : '';
    if (tag === 'input' || tag === 'textarea') {
        const proto = tag === 'input'
            ? window.HTMLInputElement.prototype
            : window.HTMLTextAreaElement.prototype;
        const setter = Object.getOwnPropertyDescriptor(proto, 'value').set;
        setter.call(this, clear ? text : this.value + text);
        this.dispatchEvent(new Event('input', { bubbles: true }));
        this.dispatchEvent(new Event('change', { bubbles: true }));
        this.focus();
        return { tag: tag, value: this.value, hasForm: !!this.form };
    }
    if (this.isContentEditable) {
        this.textContent = clear ? text : this.textContent + text;
        this.dispatchEvent(new Event('input', { bubbles: true }));
        this.focus();
        return { tag: tag, value: this.textContent, hasForm: false };
    }
    throw new Error('element <' + tag + '> is not editable');
}"#;

/// Read every option of a `<select>`.
pub(crate) const DROPDOWN_OPTIONS: &str = r#"function() {
    if (!this.tagName || this.tagName.toLowerCase() !== 'select') {
        throw new Error('element is not a <select>');
    }
    return Array.from(this.options).map(function(opt, i) {
        return {
            index: i,
            value: opt.value,
            label: (opt.label || opt.textContent || '').trim(),
            selected: opt.selected,
        };
    });
}"#;

/// Select an option by value (preferred) or visible label; null when no
/// option matches.
pub(crate) const SELECT_OPTION: &str = r#"function(value, label) {
    if (!this.tagName || this.tagName.toLowerCase() !== 'select') {
        throw new Error('element is not a <select>');
    }
    const options = Array.from(this.options);
    let match = null;
    if (value !== null && value !== undefined) {
        match = options.find(function(opt) { return opt.value === value; }) || null;
    }
    if (!match && label !== null && label !== undefined) {
        const wanted = label.trim();
        match = options.find(function(opt) {
            return (opt.label || opt.textContent || '').trim() === wanted;
        }) || null;
    }
    if (!match) {
        return null;
    }
    this.value = match.value;
    this.dispatchEvent(new Event('input', { bubbles: true }));
    this.dispatchEvent(new Event('change', { bubbles: true }));
    return {
        index: options.indexOf(match),
        value: match.value,
        label: (match.label || match.textContent || '').trim(),
        selected: true,
    };
}"#;

/// In-page click sequence; the fallback when trusted coordinates are
/// unusable (element covered or off-viewport).
pub(crate) const CLICK_NODE: &str = r#"function() {
    this.scrollIntoView({ block: 'center', inline: 'nearest' });
    const rect = this.getBoundingClientRect();
    const opts = {
        bubbles: true,
        cancelable: true,
        view: window,
        clientX: rect.x + rect.width / 2,
        clientY: rect.y + rect.height / 2,
    };
    this.dispatchEvent(new MouseEvent('mousedown', opts));
    this.dispatchEvent(new MouseEvent('mouseup', opts));
    this.click();
}"#;

/// Center a node in the viewport.
pub(crate) const SCROLL_INTO_VIEW: &str =
    r#"function() { this.scrollIntoView({ block: 'center', inline: 'nearest' }); }"#;

/// Flash an outline around a node, restoring the previous style after.
pub(crate) const HIGHLIGHT_NODE: &str = r#"function(color, durationMs) {
    const el = this;
    const previousOutline = el.style.outline;
    const previousOffset = el.style.outlineOffset;
    el.style.outline = '3px solid ' + color;
    el.style.outlineOffset = '2px';
    el.scrollIntoView({ block: 'center', inline: 'nearest' });
    setTimeout(function() {
        el.style.outline = previousOutline;
        el.style.outlineOffset = previousOffset;
    }, durationMs);
}"#;

/// Scroll a node's own overflow box and report its metrics.
pub(crate) const SCROLL_NODE_BY: &str = r#"function(dx, dy) {
    this.scrollBy(dx, dy);
    return {
        scrollX: this.scrollLeft,
        scrollY: this.scrollTop,
        contentWidth: this.scrollWidth,
        contentHeight: this.scrollHeight,
        viewportWidth: this.clientWidth,
        viewportHeight: this.clientHeight,
    };
}"#;

/// Page scroll state, in the shape `scroll_info_from_value` decodes.
pub(crate) const PAGE_SCROLL_INFO: &str = r#"(function() {
    const doc = document.documentElement;
    return {
        scrollX: window.scrollX,
        scrollY: window.scrollY,
        contentWidth: doc.scrollWidth,
        contentHeight: doc.scrollHeight,
        viewportWidth: window.innerWidth,
        viewportHeight: window.innerHeight,
    };
})()"#;

/// Scroll the page by a delta and report the resulting state.
pub(crate) fn page_scroll_by(dx: f64, dy: f64) -> String {
    format!(
        r#"(function() {{
    window.scrollBy({{ left: {dx}, top: {dy}, behavior: 'instant' }});
    const doc = document.documentElement;
    return {{
        scrollX: window.scrollX,
        scrollY: window.scrollY,
        contentWidth: doc.scrollWidth,
        contentHeight: doc.scrollHeight,
        viewportWidth: window.innerWidth,
        viewportHeight: window.innerHeight,
    }};
}})()"#
    )
}

#[cfg(test)]
#[path = "scripts_tests.rs"]
mod tests;
