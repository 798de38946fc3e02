use std::ops::Range;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::placeholder::{Category, SourceType};

use super::{ScalarLayer, ScrubContext};

static CONTENT_ROUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/(question|answer|pin|p)/([0-9]{9,})(?-u:\b)").expect("valid content route pattern")
});
static PEOPLE_ROUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"/people/([^/?#&\s"']+)"#).expect("valid people route pattern")
});
static DIGIT_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]{9,}").expect("valid digit-run pattern"));
static OPAQUE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z0-9._\-]{24,}").expect("valid opaque-run pattern"));
static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:PERSON|CID|TOKEN|COOKIE|TRACK)_[0-9]{3,}$").expect("valid placeholder pattern")
});

/// Query keys that are always tracking noise.
const TRACKING_KEYS: &[&str] = &["spm", "xsec_source", "xsec_token", "from", "_t"];
const TRACKING_PREFIXES: &[&str] = &["utm_"];

/// Layer b: content ids and people handles in known routes, then query parameters.
pub struct RouteLayer {
    extra_tracking_keys: Vec<String>,
}

impl RouteLayer {
    pub fn new(extra_tracking_keys: &[String]) -> Self {
        Self {
            extra_tracking_keys: extra_tracking_keys.to_vec(),
        }
    }

    fn is_tracking_key(&self, key: &str) -> bool {
        TRACKING_KEYS.contains(&key)
            || TRACKING_PREFIXES.iter().any(|prefix| key.starts_with(prefix))
            || self.extra_tracking_keys.iter().any(|extra| extra == key)
    }

    /// Rewrite query values in place, leaving ordering and encoding untouched.
    fn scrub_query(&self, url: &str, ctx: &mut ScrubContext<'_>) -> String {
        let Some(span) = query_span(url) else {
            return url.to_string();
        };
        let query = &url[span.clone()];

        let pairs: Vec<String> = query
            .split('&')
            .map(|pair| {
                let Some((key, value)) = pair.split_once('=') else {
                    return pair.to_string();
                };
                if value.is_empty() || is_placeholder(value) {
                    return pair.to_string();
                }
                let sensitive = self.is_tracking_key(key)
                    || DIGIT_RUN.is_match(value)
                    || OPAQUE_RUN.is_match(value);
                if sensitive {
                    let raw = format!("{key}:{value}");
                    let placeholder = ctx.store.next(Category::Tracking, &raw, SourceType::Query);
                    format!("{key}={placeholder}")
                } else {
                    pair.to_string()
                }
            })
            .collect();

        format!(
            "{}{}{}",
            &url[..span.start],
            pairs.join("&"),
            &url[span.end..]
        )
    }
}

impl ScalarLayer for RouteLayer {
    fn apply(&self, input: &str, ctx: &mut ScrubContext<'_>) -> String {
        let result = CONTENT_ROUTE.replace_all(input, |caps: &Captures| {
            let placeholder = ctx
                .store
                .next(Category::ContentId, &caps[2], SourceType::UrlPart);
            format!("/{}/{}", &caps[1], placeholder)
        });

        let result = PEOPLE_ROUTE.replace_all(&result, |caps: &Captures| {
            let placeholder = ctx.store.next(Category::Person, &caps[1], SourceType::UrlPart);
            format!("/people/{placeholder}")
        });

        self.scrub_query(&result, ctx)
    }

    fn name(&self) -> &str {
        "route"
    }
}

fn is_absolute_http_url(value: &str) -> bool {
    url::Url::parse(value.trim())
        .map(|parsed| matches!(parsed.scheme(), "http" | "https"))
        .unwrap_or(false)
}

/// Byte range of the query string (after `?`, before `#`) of an absolute
/// http(s) URL. `None` for anything else.
pub(super) fn query_span(value: &str) -> Option<Range<usize>> {
    if !is_absolute_http_url(value) {
        return None;
    }
    let start = value.find('?')? + 1;
    let end = value[start..].find('#').map_or(value.len(), |idx| start + idx);
    Some(start..end)
}

/// Value already replaced by an earlier layer.
fn is_placeholder(value: &str) -> bool {
    PLACEHOLDER.is_match(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placeholder::PlaceholderStore;

    fn run_with(layer: &RouteLayer, input: &str) -> String {
        let mut store = PlaceholderStore::new();
        let mut ctx = ScrubContext::attr(&mut store, false);
        layer.apply(input, &mut ctx)
    }

    fn run(input: &str) -> String {
        run_with(&RouteLayer::new(&[]), input)
    }

    #[test]
    fn test_zhuanlan_post_id() {
        assert_eq!(
            run("https://zhuanlan.zhihu.com/p/123456789123"),
            "https://zhuanlan.zhihu.com/p/CID_001"
        );
    }

    #[test]
    fn test_short_ids_are_kept() {
        assert_eq!(run("/question/12345678"), "/question/12345678");
    }

    #[test]
    fn test_relative_routes_are_rewritten() {
        assert_eq!(run("/pin/123456789012"), "/pin/CID_001");
        assert_eq!(run("/people/jane-doe-42/answers"), "/people/PERSON_001/answers");
    }

    #[test]
    fn test_tracking_params_always_replaced() {
        assert_eq!(
            run("https://example.com/s?utm_source=abc123&id=42#top"),
            "https://example.com/s?utm_source=TRACK_001&id=42#top"
        );
        assert_eq!(
            run("https://example.com/?spm=a1&from=feed&_t=1&q=rust"),
            "https://example.com/?spm=TRACK_001&from=TRACK_002&_t=TRACK_003&q=rust"
        );
    }

    #[test]
    fn test_sensitive_values_in_other_params() {
        assert_eq!(
            run("https://example.com/?uid=1234567890&page=2"),
            "https://example.com/?uid=TRACK_001&page=2"
        );
    }

    #[test]
    fn test_query_left_alone_when_not_absolute() {
        assert_eq!(run("/search?utm_source=abc"), "/search?utm_source=abc");
    }

    #[test]
    fn test_extra_tracking_keys() {
        let layer = RouteLayer::new(&["share_id".to_string()]);
        assert_eq!(
            run_with(&layer, "https://example.com/?share_id=x&q=y"),
            "https://example.com/?share_id=TRACK_001&q=y"
        );
    }

    #[test]
    fn test_content_id_before_cjk_text() {
        assert_eq!(run("/question/123456789012回答"), "/question/CID_001回答");
    }

    #[test]
    fn test_earlier_placeholders_are_not_wrapped() {
        assert_eq!(
            run("https://example.com/?xsec_token=TOKEN_001&spm=a1"),
            "https://example.com/?xsec_token=TOKEN_001&spm=TRACK_001"
        );
    }

    #[test]
    fn test_query_span() {
        assert_eq!(query_span("https://e.com/a?x=1#f"), Some(16..19));
        assert_eq!(query_span("https://e.com/a"), None);
        assert_eq!(query_span("/a?x=1"), None);
    }

    #[test]
    fn test_empty_values_and_bare_keys_survive() {
        assert_eq!(
            run("https://example.com/?from=&flag"),
            "https://example.com/?from=&flag"
        );
    }
}
