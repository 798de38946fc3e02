use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::placeholder::Category;

use super::{route, ScalarLayer, ScrubContext};

static BEARER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(bearer\s+)([A-Za-z0-9._~+/\-]{8,}=*)").expect("valid bearer pattern")
});
static NOTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"ntn_[A-Za-z0-9]{8,}").expect("valid ntn_ pattern"));
static Z_C0: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(z_c0=)([^;&\s"']+)"#).expect("valid z_c0 pattern"));
static OPAQUE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z0-9._\-]{24,}").expect("valid opaque-run pattern"));

/// Layer a: credential-shaped substrings become `token`/`cookie` placeholders.
///
/// Literal framing (`Bearer `, `z_c0=`) is kept. Generic opaque runs that sit in
/// a host position (`//host`, `user@host`) or in the query of an absolute URL
/// are left for the URL layer.
pub struct TokenLayer;

impl TokenLayer {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TokenLayer {
    fn default() -> Self {
        Self::new()
    }
}

impl ScalarLayer for TokenLayer {
    fn apply(&self, input: &str, ctx: &mut ScrubContext<'_>) -> String {
        let origin = ctx.origin;

        let result = BEARER.replace_all(input, |caps: &Captures| {
            let placeholder = ctx.store.next(Category::Token, &caps[2], origin);
            format!("{}{}", &caps[1], placeholder)
        });

        let result = NOTION.replace_all(&result, |caps: &Captures| {
            ctx.store.next(Category::Token, &caps[0], origin)
        });

        let result = Z_C0.replace_all(&result, |caps: &Captures| {
            let placeholder = ctx.store.next(Category::Cookie, &caps[2], origin);
            format!("{}{}", &caps[1], placeholder)
        });

        let query = route::query_span(&result);
        let mut out = String::with_capacity(result.len());
        let mut last = 0;
        for m in OPAQUE_RUN.find_iter(&result) {
            let before = &result[..m.start()];
            let in_query = query
                .as_ref()
                .is_some_and(|q| q.contains(&m.start()));
            out.push_str(&result[last..m.start()]);
            if in_query || before.ends_with("//") || before.ends_with('@') {
                out.push_str(m.as_str());
            } else {
                out.push_str(&ctx.store.next(Category::Token, m.as_str(), origin));
            }
            last = m.end();
        }
        out.push_str(&result[last..]);
        out
    }

    fn name(&self) -> &str {
        "token"
    }
}
