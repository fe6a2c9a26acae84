//! Confluence storage 形式（XHTML）→ Markdown の簡易変換と、ページ表示用の整形

use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

struct Patterns {
    code_macro: Regex,
    heading: Regex,
    strong: Regex,
    em: Regex,
    code: Regex,
    link: Regex,
    list_item: Regex,
    br: Regex,
    paragraph_end: Regex,
    cell: Regex,
    cell_end: Regex,
    row_end: Regex,
    tag: Regex,
    blank_lines: Regex,
}

fn patterns() -> &'static Patterns {
    static P: OnceLock<Patterns> = OnceLock::new();
    P.get_or_init(|| {
        let re = |s: &str| Regex::new(s).expect("valid storage regex");
        Patterns {
            code_macro: re(
                r#"(?is)<ac:structured-macro[^>]*ac:name="code"[^>]*>.*?<ac:plain-text-body><!\[CDATA\[(.*?)\]\]></ac:plain-text-body>.*?</ac:structured-macro>"#,
            ),
            heading: re(r"(?is)<h([1-6])[^>]*>(.*?)</h[1-6]>"),
            strong: re(r"(?is)<(?:strong|b)(?:\s[^>]*)?>(.*?)</(?:strong|b)>"),
            em: re(r"(?is)<(?:em|i)(?:\s[^>]*)?>(.*?)</(?:em|i)>"),
            code: re(r"(?is)<code[^>]*>(.*?)</code>"),
            link: re(r#"(?is)<a\s[^>]*href="([^"]*)"[^>]*>(.*?)</a>"#),
            list_item: re(r"(?is)<li[^>]*>(.*?)</li>"),
            br: re(r"(?i)<br\s*/?>"),
            paragraph_end: re(r"(?i)</p>|</ul>|</ol>|</table>"),
            cell: re(r"(?i)<t[hd][^>]*>"),
            cell_end: re(r"(?i)</t[hd]>"),
            row_end: re(r"(?i)</tr>"),
            tag: re(r"(?s)<[^>]+>"),
            blank_lines: re(r"\n{3,}"),
        }
    })
}

/// storage 形式の本文を読みやすい Markdown 風テキストにする
pub fn storage_to_markdown(storage: &str) -> String {
    let p = patterns();
    let s = p
        .code_macro
        .replace_all(storage, |c: &regex::Captures| format!("\n```\n{}\n```\n", &c[1]));
    let s = p.heading.replace_all(&s, |c: &regex::Captures| {
        let level: usize = c[1].parse().unwrap_or(1);
        format!("\n{} {}\n\n", "#".repeat(level), c[2].trim())
    });
    let s = p.strong.replace_all(&s, "**${1}**");
    let s = p.em.replace_all(&s, "*${1}*");
    let s = p.code.replace_all(&s, "`${1}`");
    let s = p.link.replace_all(&s, "[${2}](${1})");
    let s = p.list_item.replace_all(&s, "\n- ${1}");
    let s = p.br.replace_all(&s, "\n");
    let s = p.paragraph_end.replace_all(&s, "\n\n");
    let s = p.cell.replace_all(&s, "| ");
    let s = p.cell_end.replace_all(&s, " ");
    let s = p.row_end.replace_all(&s, "|\n");
    let s = p.tag.replace_all(&s, "");
    let s = decode_entities(&s);
    let s = p.blank_lines.replace_all(&s, "\n\n");
    s.trim().to_string()
}

fn decode_entities(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// ページ JSON を見出し・メタ情報・本文の Markdown にまとめる
pub fn format_page_markdown(page: &Value) -> String {
    let title = page["title"].as_str().unwrap_or("(untitled)");
    let id = match &page["id"] {
        Value::String(s) => s.clone(),
        Value::Null => "Unknown".to_string(),
        other => other.to_string(),
    };
    let version = page["version"]["number"]
        .as_u64()
        .map(|n| n.to_string())
        .unwrap_or_else(|| "Unknown".to_string());
    let updated = page["version"]["when"].as_str().unwrap_or("Unknown");
    let body = page["body"]["storage"]["value"].as_str().unwrap_or_default();

    format!(
        "# {}\n\n**Page Details:**\n- ID: {}\n- Version: {}\n- Last Updated: {}\n\n**Content:**\n{}",
        title,
        id,
        version,
        updated,
        storage_to_markdown(body)
    )
}

/// 一覧表示の 1 行（`- タイトル (ID: 123)`）
pub fn page_list_line(page: &Value) -> String {
    let id = match &page["id"] {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    format!("- {} (ID: {})", page["title"].as_str().unwrap_or("(untitled)"), id)
}
