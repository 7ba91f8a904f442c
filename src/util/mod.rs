pub(crate) mod dom;
#[cfg(all(test, target_arch = "wasm32"))]
pub(crate) mod test_support;

/// Escape text for use in element content or a double-quoted attribute.
pub(crate) fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Last non-empty path segment of a form action such as `/admin/delete/42`.
pub(crate) fn trailing_path_segment(action: &str) -> Option<String> {
    // Absolute actions (`http://host/admin/delete/42?x=1`) reduce to their path.
    let without_query = action.split(['?', '#']).next().unwrap_or_default();
    let segment = without_query
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|s| !s.trim().is_empty())?;

    urlencoding::decode(segment)
        .ok()
        .map(|s| s.into_owned())
}

pub(crate) fn log_error(scope: &str, msg: impl std::fmt::Display) {
    web_sys::console::error_1(&format!("[{scope}] {msg}").into());
}

pub(crate) fn log_warn(scope: &str, msg: impl std::fmt::Display) {
    web_sys::console::warn_1(&format!("[{scope}] {msg}").into());
}

pub(crate) fn log_debug(scope: &str, msg: impl std::fmt::Display) {
    web_sys::console::debug_1(&format!("[{scope}] {msg}").into());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<b class="x">Tom & 'Jerry'</b>"#),
            "&lt;b class=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn test_trailing_path_segment() {
        assert_eq!(trailing_path_segment("/admin/delete/42").as_deref(), Some("42"));
        assert_eq!(trailing_path_segment("/admin/delete/42/").as_deref(), Some("42"));
        assert_eq!(
            trailing_path_segment("http://localhost:5000/admin/delete/7?next=/admin").as_deref(),
            Some("7")
        );
        assert_eq!(trailing_path_segment("/admin/delete/a%20b").as_deref(), Some("a b"));
        assert_eq!(trailing_path_segment("").as_deref(), None);
        assert_eq!(trailing_path_segment("/").as_deref(), None);
    }
}
