//! Scripts evaluated against the content surface.
//!
//! Both scripts remove every node carrying the well-known id before doing
//! anything else, so repeated or overlapping evaluations converge on at most
//! one injected node.
//!
//! Both also evaluate to a string: `SCRIPT_OK` on success, the thrown error's
//! message otherwise. `script_outcome` reads that back from the webview.

use serde_json::Value;

use super::navigation::{LINK_SCHEME, TRUSTED_DOMAIN};

/// Id of the injected `<style>` node. Removal locates the node by this id, so
/// it must never change between releases.
pub const STYLE_NODE_ID: &str = "deepseek-shell-custom-css";

/// Value a stylesheet script evaluates to when it ran to completion.
pub const SCRIPT_OK: &str = "ok";

// JSON string literals are valid JavaScript string literals.
fn js_string(text: &str) -> String {
    Value::from(text).to_string()
}

/// Replace any injected node with a fresh `<style>` holding `css` verbatim.
pub fn inject_stylesheet(css: &str) -> String {
    format!(
        r#"(function () {{
  try {{
    var id = {id};
    var existing;
    while ((existing = document.getElementById(id))) {{
      existing.remove();
    }}
    var style = document.createElement('style');
    style.id = id;
    style.textContent = {css};
    (document.head || document.documentElement).appendChild(style);
    return {ok};
  }} catch (e) {{
    return String(e);
  }}
}})();"#,
        id = js_string(STYLE_NODE_ID),
        css = js_string(css),
        ok = js_string(SCRIPT_OK),
    )
}

/// Remove the injected node if present. A missing node is not an error.
pub fn remove_stylesheet() -> String {
    format!(
        r#"(function () {{
  try {{
    var id = {id};
    var existing;
    while ((existing = document.getElementById(id))) {{
      existing.remove();
    }}
    return {ok};
  }} catch (e) {{
    return String(e);
  }}
}})();"#,
        id = js_string(STYLE_NODE_ID),
        ok = js_string(SCRIPT_OK),
    )
}

/// Interpret the JSON-encoded value a stylesheet script evaluated to.
pub fn script_outcome(raw: &str) -> Result<(), String> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::String(result)) if result == SCRIPT_OK => Ok(()),
        Ok(Value::String(message)) => Err(message),
        _ => Err(format!("unexpected script result: {}", raw)),
    }
}

/// Initialization script for the content surface.
///
/// Trusted clicks on anchors pointing outside the trusted domain are turned
/// into a `shell-link:` navigation, which the navigation hook recognises as a
/// user link activation. Same-site anchors are left alone so the page's own
/// client-side routing keeps working.
pub fn link_activation_bridge() -> String {
    format!(
        r#"(function () {{
  var trusted = {domain};
  var scheme = {scheme};
  document.addEventListener('click', function (event) {{
    if (!event.isTrusted || event.defaultPrevented || event.button !== 0) return;
    var anchor = event.target instanceof Element ? event.target.closest('a[href]') : null;
    if (!anchor) return;
    var target;
    try {{
      target = new URL(anchor.href, window.location.href);
    }} catch (_) {{
      return;
    }}
    if (target.protocol !== 'http:' && target.protocol !== 'https:') return;
    if (target.hostname.indexOf(trusted) !== -1) return;
    event.preventDefault();
    event.stopPropagation();
    window.location.assign(scheme + '://activate?target=' + encodeURIComponent(target.href));
  }}, true);
}})();"#,
        domain = js_string(TRUSTED_DOMAIN),
        scheme = js_string(LINK_SCHEME),
    )
}
