//! Deterministic LaTeX repair.
//!
//! Pure, total and idempotent: `sanitize(sanitize(x)) == sanitize(x)`. The output
//! never contains code fences, always has as many `{` as `}`, and ends with
//! exactly one newline.
//!
//! # Rules, applied in order
//! 1. Strip code-fence delimiters.
//! 2. Collapse repeated `\begin{document}` and `\resheading{..}` + line-break runs
//!    (repeated until nothing changes).
//! 3. Outside tabular-like environments, escape every `&` not already preceded
//!    by a backslash, except on lines carrying a link marker.
//! 4. Escape every `_` not already preceded by a backslash.
//! 5. Balance braces without removing any: an unmatched `}` gets an opening
//!    brace inserted in front of it, missing closers are appended at the end.
//! 6. Collapse repetitions once more, since a balanced brace can complete a
//!    pattern from rule 2 in truncated input.
//! 7. Trim surrounding whitespace and end with a single newline.

use std::sync::LazyLock;

use regex::Regex;

static RE_REPEATED_BEGIN_DOCUMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\\begin\{document\}\s*){2,}").unwrap());
/// `\resheading{X}` followed by `\\[..]` spacing breaks and then plain `\\` breaks.
static RE_HEADING_SPACED_BREAKS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\\resheading\{[^\}]*\})\s*(?:\\\\\[[^\]{}]*\]\s*)+(?:\\\\\s*)+").unwrap()
});
/// `\resheading{X}` followed by two plain `\\` breaks.
static RE_HEADING_DOUBLE_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\\resheading\{[^\}]*\})\s*\\\\\s*\\\\").unwrap());
static RE_ENV: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\(begin|end)\{([^}]*)\}").unwrap());

/// Environments whose `&` is a column separator and must stay unescaped.
const TABULAR_ENVS: &[&str] = &[
    "tabular",
    "tabular*",
    "tabularx",
    "longtable",
    "array",
    "align",
    "align*",
    "matrix",
];

const LINK_MARKERS: &[&str] = &["\\href", "http", "mailto:", "\\url"];

const FENCE: &str = "```";
const FENCE_OPENERS: &[&str] = &["```latex", "```tex"];

pub fn sanitize(markup: &str) -> String {
    let s = strip_fences(markup);
    let s = collapse_repetitions(s);
    let s = escape_separators(&s);
    let s = escape_underscores(&s);
    let s = balance_braces(&s);
    // Only removes brace-free text or whole groups, so balance survives.
    let s = collapse_repetitions(s);
    format!("{}\n", s.trim())
}

fn strip_fences(markup: &str) -> String {
    let mut s = markup.to_string();
    for opener in FENCE_OPENERS {
        s = s.replace(opener, "");
    }
    // A removal can join stray backticks into a new fence.
    while s.contains(FENCE) {
        s = s.replace(FENCE, "");
    }
    s
}

fn collapse_repetitions(mut s: String) -> String {
    loop {
        let next = RE_REPEATED_BEGIN_DOCUMENT.replace_all(&s, "\\begin{document}\n");
        let next = RE_HEADING_SPACED_BREAKS.replace_all(&next, "$1\n");
        let next = RE_HEADING_DOUBLE_BREAK
            .replace_all(&next, "$1\n")
            .into_owned();
        if next == s {
            return s;
        }
        s = next;
    }
}

/// Escapes `&` line by line, tracking tabular-like environment nesting. A line
/// that opens, closes or sits inside such an environment is left alone.
fn escape_separators(s: &str) -> String {
    let mut depth: usize = 0;
    let mut out = Vec::new();

    for line in s.split('\n') {
        let mut touches_tabular = false;
        let depth_before = depth;
        for cap in RE_ENV.captures_iter(line) {
            if !TABULAR_ENVS.contains(&cap[2].trim()) {
                continue;
            }
            touches_tabular = true;
            if &cap[1] == "begin" {
                depth += 1;
            } else {
                depth = depth.saturating_sub(1);
            }
        }

        let protected = depth_before > 0 || touches_tabular;
        if protected || LINK_MARKERS.iter().any(|m| line.contains(m)) {
            out.push(line.to_string());
        } else {
            out.push(escape_unescaped(line, '&'));
        }
    }

    out.join("\n")
}

fn escape_underscores(s: &str) -> String {
    escape_unescaped(s, '_')
}

/// Puts a backslash in front of every `target` not already preceded by one.
fn escape_unescaped(s: &str, target: char) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev = None;
    for c in s.chars() {
        if c == target && prev != Some('\\') {
            out.push('\\');
        }
        out.push(c);
        prev = Some(c);
    }
    out
}

fn balance_braces(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut depth: usize = 0;
    for c in s.chars() {
        match c {
            '{' => depth += 1,
            '}' if depth == 0 => {
                // Keep `\}` intact by opening the group before its backslash.
                if out.ends_with('\\') {
                    out.insert(out.len() - 1, '{');
                } else {
                    out.push('{');
                }
            }
            '}' => depth -= 1,
            _ => {}
        }
        out.push(c);
    }
    out.extend(std::iter::repeat('}').take(depth));
    out
}

/// Brace deficit as `opening - closing`, counted over raw characters.
#[cfg(test)]
pub fn brace_deficit(markup: &str) -> i64 {
    markup.chars().fold(0, |acc, c| match c {
        '{' => acc + 1,
        '}' => acc - 1,
        _ => acc,
    })
}
