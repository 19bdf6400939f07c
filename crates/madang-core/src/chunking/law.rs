//! Hierarchical statute parser.
//!
//! Parses Korean statute text (법률 / 시행령 / 시행규칙) into one record per
//! article clause. Heading markers are located by pattern search over the
//! whole text, so multiple articles jammed onto one line still parse:
//!
//! - chapters: `제N장 ...`
//! - sections: `제N절 ...`
//! - articles: `제N조(title)`
//! - clauses: circled digits `①`–`⑩`
//!
//! The chapter/section in effect for an article is the *last* heading of
//! that kind appearing before the article start. Known edge case: a heading
//! carries forward from anywhere earlier in the text, even across unrelated
//! intervening content; documents that restart chapter numbering inherit
//! whichever heading occurred last. See the carryforward test below.

use super::Chunk;
use regex::{Match, Regex};
use std::sync::LazyLock;

static CHAPTER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"제\d+장\s*\S*").expect("chapter pattern"));
static SECTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"제\d+절\s*\S*").expect("section pattern"));
static ARTICLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(제\d+조)\s*\((.*?)\)").expect("article pattern"));
static CLAUSE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("[①②③④⑤⑥⑦⑧⑨⑩]").expect("clause pattern"));

/// Sentinel for a missing chapter, section, or clause.
const NONE_MARK: &str = "-";

struct ArticleHeading<'a> {
    start: usize,
    body_start: usize,
    article: &'a str,
    title: &'a str,
}

/// Parses statute text into one chunk per article clause.
///
/// An article's body spans from the end of its heading to the start of the
/// next article (or end of text). Bodies without clause markers yield a
/// single record with `clause = "-"`; otherwise each circled-digit marker
/// pairs with the text up to the next marker, and any body text before the
/// first marker is dropped.
pub fn parse_law(text: &str) -> Vec<Chunk> {
    let chapters: Vec<Match> = CHAPTER_RE.find_iter(text).collect();
    let sections: Vec<Match> = SECTION_RE.find_iter(text).collect();

    let articles: Vec<ArticleHeading> = ARTICLE_RE
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let article = caps.get(1)?.as_str();
            let title = caps.get(2)?.as_str();
            Some(ArticleHeading {
                start: whole.start(),
                body_start: whole.end(),
                article,
                title: title.trim(),
            })
        })
        .collect();

    let mut chunks = Vec::new();

    for (idx, heading) in articles.iter().enumerate() {
        let body_end = articles
            .get(idx + 1)
            .map(|next| next.start)
            .unwrap_or(text.len());
        let body = text[heading.body_start..body_end].trim();

        let chapter = last_heading_before(&chapters, heading.start);
        let section = last_heading_before(&sections, heading.start);

        let markers: Vec<Match> = CLAUSE_RE.find_iter(body).collect();

        if markers.is_empty() {
            chunks.push(law_chunk(
                chapter,
                section,
                heading.article,
                heading.title,
                NONE_MARK,
                body,
            ));
            continue;
        }

        for (m_idx, marker) in markers.iter().enumerate() {
            let clause_end = markers
                .get(m_idx + 1)
                .map(|next| next.start())
                .unwrap_or(body.len());
            let clause_text = body[marker.end()..clause_end].trim();

            chunks.push(law_chunk(
                chapter,
                section,
                heading.article,
                heading.title,
                marker.as_str(),
                clause_text,
            ));
        }
    }

    chunks
}

/// Returns the last heading match starting strictly before `position`, or
/// the `"-"` sentinel when none precedes it.
fn last_heading_before<'a>(headings: &[Match<'a>], position: usize) -> &'a str {
    headings
        .iter()
        .take_while(|m| m.start() < position)
        .last()
        .map(|m| m.as_str())
        .unwrap_or(NONE_MARK)
}

fn law_chunk(
    chapter: &str,
    section: &str,
    article: &str,
    title: &str,
    clause: &str,
    text: &str,
) -> Chunk {
    let mut chunk = Chunk::new("law");
    chunk.set("chapter", chapter);
    chunk.set("section", section);
    chunk.set("article", article);
    chunk.set("title", title);
    chunk.set("clause", clause);
    chunk.set("text", text);
    chunk
}
