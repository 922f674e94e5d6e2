//! `{name}` placeholder templates for status reports

use std::collections::HashMap;

/// Fill `{name}` placeholders in `template` from `values`.
///
/// Placeholders without a value, and unmatched braces, are copied through
/// unchanged.
pub fn render_template(template: &str, values: &HashMap<&str, String>) -> String {
    let mut rendered = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        rendered.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            rendered.push_str(&rest[open..]);
            return rendered;
        };

        let name = &after[..close];
        match values.get(name) {
            Some(value) => rendered.push_str(value),
            None => {
                tracing::debug!("render_template no value for placeholder {:?}", name);
                rendered.push_str(&rest[open..open + close + 2]);
            }
        }
        rest = &after[close + 1..];
    }

    rendered.push_str(rest);
    rendered
}
