use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::placeholder::Category;

use super::{ScalarLayer, ScrubContext};

static WHOLE_DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{9,}$").expect("valid whole-digits pattern"));
static DIGIT_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?-u:\b)[0-9]{9,}(?-u:\b)").expect("valid digit-run pattern"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    WholeValue,
    Runs,
}

/// Long decimal ids become `content_id` placeholders.
///
/// `whole_value` replaces a value that is nothing but 9+ digits; `runs` replaces
/// any remaining free-standing 9+ digit run.
pub struct NumericLayer {
    mode: Mode,
}

impl NumericLayer {
    pub fn whole_value() -> Self {
        Self {
            mode: Mode::WholeValue,
        }
    }

    pub fn runs() -> Self {
        Self { mode: Mode::Runs }
    }
}

impl ScalarLayer for NumericLayer {
    fn apply(&self, input: &str, ctx: &mut ScrubContext<'_>) -> String {
        let origin = ctx.origin;
        match self.mode {
            Mode::WholeValue => {
                let trimmed = input.trim();
                if !WHOLE_DIGITS.is_match(trimmed) {
                    return input.to_string();
                }
                let placeholder = ctx.store.next(Category::ContentId, trimmed, origin);
                input.replacen(trimmed, &placeholder, 1)
            }
            Mode::Runs => DIGIT_RUN
                .replace_all(input, |caps: &Captures| {
                    ctx.store.next(Category::ContentId, &caps[0], origin)
                })
                .into_owned(),
        }
    }

    fn name(&self) -> &str {
        match self.mode {
            Mode::WholeValue => "numeric-whole",
            Mode::Runs => "numeric-runs",
        }
    }
}
