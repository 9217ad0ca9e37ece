//! Entry filtering.
//!
//! Hosts bring their own matching algorithm, so matching sits behind the
//! [`Tokenizer`] and [`TokenSet`] traits. The engine compiles the page's
//! `filter` field into a token set of its own; while that field is defined it
//! overrides whatever query the host would otherwise match with. Lines opt
//! out of filtering entirely via their `filter` flag.

use std::borrow::Cow;

use crate::page::{Line, TextValue};

/// A compiled filter query. All tokens must match for an entry to pass.
pub trait TokenSet {
    fn matches(&self, text: &str) -> bool;
}

/// Compiles a filter string into a token set. Returning `None` means the
/// filter has no tokens and every entry matches.
pub trait Tokenizer {
    fn compile(&self, filter: &str, case_sensitive: bool) -> Option<Box<dyn TokenSet>>;
}

/// Token state compiled from the page's `filter` field.
///
/// Rebuilt whenever the field or the case sensitivity changes. While the
/// field is defined the compiled set overrides host-provided tokens, and a
/// defined-but-empty filter deliberately matches everything.
#[derive(Default)]
pub struct FilterTokens {
    tokens: Option<Box<dyn TokenSet>>,
    overriding: bool,
}

impl FilterTokens {
    pub fn rebuild(&mut self, tokenizer: &dyn Tokenizer, filter: &TextValue, case_sensitive: bool) {
        match filter.as_deref() {
            Some(text) => {
                self.tokens = tokenizer.compile(text, case_sensitive);
                self.overriding = true;
            }
            None => {
                self.tokens = None;
                self.overriding = false;
            }
        }
    }

    pub fn is_overriding(&self) -> bool {
        self.overriding
    }

    pub fn tokens(&self) -> Option<&dyn TokenSet> {
        self.tokens.as_deref()
    }
}

/// Decide whether one line passes filtering, given the page-level token
/// override and the host's own tokens.
pub fn entry_matches(line: &Line, page_tokens: &FilterTokens, host: Option<&dyn TokenSet>) -> bool {
    if !line.filter {
        return true;
    }
    // Metatext, when present, is the matching text even if empty; it is
    // always stripped, the display text only when the line holds markup.
    let text: Cow<'_, str> = match &line.metatext {
        Some(meta) => Cow::Owned(strip_markup(meta)),
        None if line.markup => Cow::Owned(strip_markup(&line.text)),
        None => Cow::Borrowed(line.text.as_str()),
    };
    let tokens = if page_tokens.is_overriding() {
        page_tokens.tokens()
    } else {
        host
    };
    match tokens {
        Some(set) => set.matches(&text),
        None => true,
    }
}

/// Remove markup from a line before matching, so queries hit the visible
/// text rather than tag names. Tags are dropped (an unterminated tag
/// swallows the remainder) and the common named entities are decoded.
pub fn strip_markup(text: &str) -> String {
    let mut plain = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(ch) = chars.next() {
        match ch {
            '<' => {
                for inner in chars.by_ref() {
                    if inner == '>' {
                        break;
                    }
                }
            }
            '&' => match decode_entity(chars.as_str()) {
                Some((decoded, consumed)) => {
                    plain.push(decoded);
                    for _ in 0..consumed {
                        chars.next();
                    }
                }
                None => plain.push('&'),
            },
            other => plain.push(other),
        }
    }
    plain
}

/// Decode the entity right after a `&`. Returns the character and the number
/// of characters consumed, terminator included.
fn decode_entity(rest: &str) -> Option<(char, usize)> {
    let end = rest.find(';')?;
    let decoded = match &rest[..end] {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        _ => return None,
    };
    Some((decoded, end + 1))
}

/// Whitespace-separated substring matching, the stand-in used when the host
/// does not supply its own algorithm.
pub struct SubstringTokenizer;

struct SubstringTokens {
    tokens: Vec<String>,
    case_sensitive: bool,
}

impl Tokenizer for SubstringTokenizer {
    fn compile(&self, filter: &str, case_sensitive: bool) -> Option<Box<dyn TokenSet>> {
        let tokens: Vec<String> = filter
            .split_whitespace()
            .map(|token| {
                if case_sensitive {
                    token.to_string()
                } else {
                    token.to_lowercase()
                }
            })
            .collect();
        if tokens.is_empty() {
            return None;
        }
        Some(Box::new(SubstringTokens {
            tokens,
            case_sensitive,
        }))
    }
}

impl TokenSet for SubstringTokens {
    fn matches(&self, text: &str) -> bool {
        if self.case_sensitive {
            self.tokens.iter().all(|token| text.contains(token.as_str()))
        } else {
            let haystack = text.to_lowercase();
            self.tokens
                .iter()
                .all(|token| haystack.contains(token.as_str()))
        }
    }
}
