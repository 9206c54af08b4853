/// One position of a passage after markup has been stripped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AnnotatedChar {
    pub ch: char,
    pub hidden: bool,
}

impl AnnotatedChar {
    pub fn visible(ch: char) -> Self {
        Self { ch, hidden: false }
    }

    pub fn hidden(ch: char) -> Self {
        Self { ch, hidden: true }
    }
}

const SPAN_OPEN: char = '{';
const SPAN_CLOSE: char = '}';

/// Parse passage markup into its positional character sequence.
///
/// A `{...}` span hides every code point it contains, newlines included. Spans
/// do not nest: a `{` inside an open span is ordinary hidden content and the
/// first `}` closes the span. A `{` with no `}` anywhere after it is kept as a
/// literal, and so is everything following it. A stray `}` outside a span is
/// kept as a visible literal.
pub fn parse(raw: &str) -> Vec<AnnotatedChar> {
    let chars: Vec<char> = raw.chars().collect();
    let mut out = Vec::with_capacity(chars.len());
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];
        if ch == SPAN_OPEN {
            match chars[i + 1..].iter().position(|&c| c == SPAN_CLOSE) {
                Some(len) => {
                    out.extend(chars[i + 1..i + 1 + len].iter().map(|&c| AnnotatedChar::hidden(c)));
                    i += len + 2;
                }
                None => {
                    // Unterminated: no later `{` can close either, so the rest is literal.
                    out.extend(chars[i..].iter().map(|&c| AnnotatedChar::visible(c)));
                    break;
                }
            }
        } else {
            out.push(AnnotatedChar::visible(ch));
            i += 1;
        }
    }

    out
}

/// The passage text as the user is expected to type it.
pub fn plain_text(chars: &[AnnotatedChar]) -> String {
    chars.iter().map(|c| c.ch).collect()
}
