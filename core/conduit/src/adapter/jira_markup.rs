//! Markdown → Jira wiki 記法の変換
//!
//! ステージングファイルは Markdown で書かれる前提。API v2 の description / comment は
//! wiki 記法で解釈されるため送信直前に変換する。対応は見出し・リスト・引用・コードブロック・
//! 強調・リンク・インラインコード・取り消し線のみ。

use regex::Regex;
use std::sync::OnceLock;

struct Patterns {
    heading: Regex,
    bullet: Regex,
    ordered: Regex,
    quote: Regex,
    fence: Regex,
    bold: Regex,
    italic: Regex,
    strike: Regex,
    link: Regex,
}

fn patterns() -> &'static Patterns {
    static P: OnceLock<Patterns> = OnceLock::new();
    P.get_or_init(|| {
        let re = |s: &str| Regex::new(s).expect("valid markup regex");
        Patterns {
            heading: re(r"^(#{1,6})\s+(.*)$"),
            bullet: re(r"^(\s*)[-*+]\s+(.*)$"),
            ordered: re(r"^(\s*)\d+[.)]\s+(.*)$"),
            quote: re(r"^>\s?(.*)$"),
            fence: re(r"^\s*```\s*([A-Za-z0-9_+-]*)\s*$"),
            bold: re(r"\*\*([^*\n]+)\*\*|__([^_\n]+)__"),
            italic: re(r"\*([^*\s][^*\n]*)\*"),
            strike: re(r"~~([^~\n]+)~~"),
            link: re(r"\[([^\]\n]+)\]\(([^)\s]+)\)"),
        }
    })
}

/// Markdown を Jira wiki 記法に変換する
pub fn markdown_to_jira(markdown: &str) -> String {
    let p = patterns();
    let mut out: Vec<String> = Vec::new();
    let mut in_code = false;

    for line in markdown.lines() {
        if let Some(caps) = p.fence.captures(line) {
            if in_code {
                out.push("{code}".to_string());
            } else {
                let lang = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
                if lang.is_empty() {
                    out.push("{code}".to_string());
                } else {
                    out.push(format!("{{code:{}}}", lang));
                }
            }
            in_code = !in_code;
            continue;
        }
        if in_code {
            out.push(line.to_string());
            continue;
        }
        out.push(convert_block_line(line, p));
    }
    // 閉じ忘れのフェンス
    if in_code {
        out.push("{code}".to_string());
    }

    let mut text = out.join("\n");
    if markdown.ends_with('\n') {
        text.push('\n');
    }
    text
}

fn convert_block_line(line: &str, p: &Patterns) -> String {
    if let Some(caps) = p.heading.captures(line) {
        return format!("h{}. {}", caps[1].len(), convert_inline(&caps[2], p));
    }
    if let Some(caps) = p.bullet.captures(line) {
        let depth = caps[1].len() / 2 + 1;
        return format!("{} {}", "*".repeat(depth), convert_inline(&caps[2], p));
    }
    if let Some(caps) = p.ordered.captures(line) {
        let depth = caps[1].len() / 2 + 1;
        return format!("{} {}", "#".repeat(depth), convert_inline(&caps[2], p));
    }
    if let Some(caps) = p.quote.captures(line) {
        return format!("bq. {}", convert_inline(&caps[1], p));
    }
    convert_inline(line, p)
}

/// バッククォートで区切り、コード外のみ強調・リンクを変換する
fn convert_inline(text: &str, p: &Patterns) -> String {
    let segments: Vec<&str> = text.split('`').collect();
    // 対になっていない最後のバッククォートは文字として残す
    let paired = if segments.len() % 2 == 0 {
        segments.len() - 1
    } else {
        segments.len()
    };
    let mut out = String::new();
    for (i, seg) in segments.iter().enumerate() {
        if i >= paired {
            out.push('`');
            out.push_str(&convert_emphasis(seg, p));
        } else if i % 2 == 1 {
            out.push_str("{{");
            out.push_str(seg);
            out.push_str("}}");
        } else {
            out.push_str(&convert_emphasis(seg, p));
        }
    }
    out
}

const BOLD_MARK: char = '\u{1}';

fn convert_emphasis(text: &str, p: &Patterns) -> String {
    let text = p.link.replace_all(text, "[$1|$2]");
    // 太字を一旦退避してから斜体を変換する（`**` と `*` の取り違え防止）
    let text = p.bold.replace_all(&text, |caps: &regex::Captures| {
        let inner = caps.get(1).or_else(|| caps.get(2)).map_or("", |m| m.as_str());
        format!("{}{}{}", BOLD_MARK, inner, BOLD_MARK)
    });
    let text = p.italic.replace_all(&text, "_${1}_");
    let text = p.strike.replace_all(&text, "-${1}-");
    text.replace(BOLD_MARK, "*")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headings() {
        assert_eq!(markdown_to_jira("# Title"), "h1. Title");
        assert_eq!(markdown_to_jira("### Sub **bold**"), "h3. Sub *bold*");
    }

    #[test]
    fn test_lists() {
        let md = "- one\n  - nested\n1. first\n2. second";
        assert_eq!(markdown_to_jira(md), "* one\n** nested\n# first\n# second");
    }

    #[test]
    fn test_inline_emphasis_and_links() {
        assert_eq!(
            markdown_to_jira("This is **bold**, *italic* and ~~gone~~."),
            "This is *bold*, _italic_ and -gone-."
        );
        assert_eq!(
            markdown_to_jira("See [docs](https://example.com/a)"),
            "See [docs|https://example.com/a]"
        );
    }

    #[test]
    fn test_inline_code_is_not_rewritten() {
        assert_eq!(
            markdown_to_jira("run `a **b**` now"),
            "run {{a **b**}} now"
        );
        assert_eq!(markdown_to_jira("odd ` tick"), "odd ` tick");
    }

    #[test]
    fn test_code_block_passthrough() {
        let md = "before\n```rust\nlet x = **y**;\n```\nafter";
        assert_eq!(
            markdown_to_jira(md),
            "before\n{code:rust}\nlet x = **y**;\n{code}\nafter"
        );
    }

    #[test]
    fn test_unclosed_fence_is_closed() {
        assert_eq!(markdown_to_jira("```\ncode"), "{code}\ncode\n{code}");
    }

    #[test]
    fn test_quote_and_trailing_newline() {
        assert_eq!(markdown_to_jira("> note\n"), "bq. note\n");
        assert_eq!(markdown_to_jira(""), "");
    }
}
