//! Field extractors. Each one looks at the page on its own and yields
//! `None` rather than failing when its markers are missing.

use std::sync::LazyLock;

use chrono::NaiveDateTime;
use regex::Regex;
use scraper::{ElementRef, Selector};

use super::page::{collapse_whitespace, compact_text, flatten_text, line_text, Page};
use super::strategies::{first_match, Strategy};
use crate::models::EntryStats;

static SYNOPSIS: LazyLock<Selector> = LazyLock::new(|| Selector::parse("div#novelintro").unwrap());
static DESCRIPTION: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"[itemprop="description"]"#).unwrap());
static INFO_ITEMS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"ul[name="printright"] li"#).unwrap());
static IMG: LazyLock<Selector> = LazyLock::new(|| Selector::parse("img").unwrap());
static FONT: LazyLock<Selector> = LazyLock::new(|| Selector::parse("font").unwrap());
static ANCHOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").unwrap());
static TAG_LABELS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("span, b, strong, font, label").unwrap());

static TAG_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"内容标签[：:]\s*([^\n\r]+)",
        r"作品标签[：:]\s*([^\n\r]+)",
        r"(?m)^\s*标签[：:]\s*([^\n\r]+)",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});
static REVIEW_COUNT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"总书评数[：:]\s*(\d+)").unwrap());
static FAVORITE_COUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"当前被收藏数[：:]\s*(\d+)").unwrap());
static NUTRIENT_COUNT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"营养液数[：:]\s*(\d+)").unwrap());
static SCORE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"文章积分[：:]\s*([\d,]+)").unwrap());
static TOTAL_CLICKS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:非V章节)?总点击数[：:]\s*(\d+)").unwrap());
static LAST_UPDATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"最新更新[：:]\s*(\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2})").unwrap()
});
static CHAPTER_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"novelid=\d+&(?:amp;)?chapterid=\d+").unwrap());

/// Tag values that mean "no tags".
const EMPTY_TAGS: &[&str] = &["无", "暂无", "无标签", "none", "empty"];

const CHARACTER_MARKER: &str = "主角：";
const CHARACTER_WINDOW: usize = 200;

/// Sentinel the site prints for entries without a print edition.
const NOT_PUBLISHED: &str = "尚未出版";
const PUBLISHED: &str = "已出版";

pub(crate) const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s.trim().to_string())
    }
}

fn marked_synopsis(page: &Page) -> Option<String> {
    page.select_first(&SYNOPSIS).map(line_text).and_then(non_empty)
}

fn described_synopsis(page: &Page) -> Option<String> {
    page.select_first(&DESCRIPTION).map(line_text).and_then(non_empty)
}

const SYNOPSIS_STRATEGIES: &[Strategy<String>] = &[marked_synopsis, described_synopsis];

/// Synopsis text, one line per text node.
pub fn synopsis(page: &Page) -> Option<String> {
    first_match(page, SYNOPSIS_STRATEGIES)
}

/// Character notes split from the `主角：... ┃ 配角：... ┃ 其它：...` line.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct CharacterNotes {
    pub main: Option<String>,
    pub supporting: Option<String>,
    pub other: Option<String>,
}

pub fn character_notes(page: &Page) -> CharacterNotes {
    let text = page.text();
    let Some(start) = text.find(CHARACTER_MARKER) else {
        return CharacterNotes::default();
    };
    let window: String = text[start..].chars().take(CHARACTER_WINDOW).collect();

    let mut notes = CharacterNotes::default();
    for part in window.split('┃').map(str::trim) {
        let (slot, value) = if let Some(v) = part.strip_prefix("主角：") {
            (&mut notes.main, v)
        } else if let Some(v) = part.strip_prefix("配角：") {
            (&mut notes.supporting, v)
        } else if let Some(v) = part.strip_prefix("其它：") {
            (&mut notes.other, v)
        } else {
            continue;
        };
        if slot.is_none() {
            *slot = non_empty(value.lines().next().unwrap_or_default().to_string());
        }
    }
    notes
}

/// Whitespace-separated tag line, or `None` when the page has none.
pub fn tags(page: &Page) -> Option<String> {
    let from_text = TAG_PATTERNS.iter().find_map(|pattern| {
        pattern
            .captures(page.text())
            .map(|caps| collapse_whitespace(&caps[1]))
    });
    let raw = from_text.or_else(|| labeled_tags(page))?;
    if raw.is_empty() || EMPTY_TAGS.contains(&raw.to_lowercase().as_str()) {
        return None;
    }
    Some(raw)
}

/// Tags from an element labeled `标签` whose parent holds the values.
fn labeled_tags(page: &Page) -> Option<String> {
    page.document()
        .select(&TAG_LABELS)
        .filter(|el| compact_text(*el).contains("标签"))
        .find_map(|label| {
            let parent = label.parent().and_then(ElementRef::wrap)?;
            let text = flatten_text(parent);
            let (_, rest) = text.split_once(['：', ':'])?;
            let rest = rest.lines().next().unwrap_or_default();
            let tags = collapse_whitespace(rest);
            (!tags.is_empty()).then_some(tags)
        })
}

/// Metadata from the info list, keyed by label prefix.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct InfoList {
    pub category: Option<String>,
    pub narrative_perspective: Option<String>,
    pub series: Option<String>,
    pub progress_status: Option<String>,
    pub word_count: Option<i64>,
    pub publication_status: Option<String>,
    pub contract_status: Option<String>,
}

pub fn info_list(page: &Page) -> InfoList {
    let mut info = InfoList::default();
    for item in page.document().select(&INFO_ITEMS) {
        let text = compact_text(item);
        let field = |prefix: &str| text.strip_prefix(prefix).map(|rest| rest.trim().to_string());

        if let Some(v) = field("文章类型：") {
            info.category = non_empty(v);
        } else if let Some(v) = field("作品视角：") {
            info.narrative_perspective = non_empty(v);
        } else if let Some(v) = field("所属系列：") {
            info.series = non_empty(v);
        } else if let Some(v) = field("文章进度：") {
            info.progress_status = non_empty(v);
        } else if let Some(v) = field("全文字数：") {
            let digits: String = v.chars().filter(char::is_ascii_digit).collect();
            info.word_count = digits.parse().ok();
        } else if let Some(v) = field("版权转化：") {
            info.publication_status = publication(item, v);
        } else if let Some(v) = field("签约状态：") {
            info.contract_status = contract(item, v);
        }
    }
    info
}

fn publication(item: ElementRef<'_>, rest: String) -> Option<String> {
    if rest.contains(NOT_PUBLISHED) {
        Some(NOT_PUBLISHED.to_string())
    } else if item.select(&IMG).next().is_some() {
        Some(PUBLISHED.to_string())
    } else {
        non_empty(rest)
    }
}

fn contract(item: ElementRef<'_>, rest: String) -> Option<String> {
    item.select(&FONT)
        .map(compact_text)
        .find(|t| !t.is_empty())
        .or_else(|| non_empty(rest))
}

fn capture_count(pattern: &Regex, text: &str) -> Option<i64> {
    let caps = pattern.captures(text)?;
    caps[1].replace(',', "").parse().ok()
}

/// Popularity counters. Each one is independent of the others.
pub fn stats(page: &Page) -> EntryStats {
    let text = page.text();
    EntryStats {
        review_count: capture_count(&REVIEW_COUNT, text),
        favorite_count: capture_count(&FAVORITE_COUNT, text),
        nutrient_count: capture_count(&NUTRIENT_COUNT, text),
        total_click_count: capture_count(&TOTAL_CLICKS, text),
        score: capture_count(&SCORE, text),
    }
}

/// Last update time normalized to `YYYY-MM-DDTHH:MM:SS`.
pub fn last_update(page: &Page) -> Option<String> {
    let caps = LAST_UPDATE.captures(page.text())?;
    NaiveDateTime::parse_from_str(&caps[1], "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|t| t.format(TIMESTAMP_FORMAT).to_string())
}

/// Number of chapter links, `None` when there are none.
pub fn chapter_count(page: &Page) -> Option<i64> {
    let count = page
        .document()
        .select(&ANCHOR)
        .filter_map(|a| a.value().attr("href"))
        .filter(|href| CHAPTER_LINK.is_match(href))
        .count();
    (count > 0).then_some(count as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(html: &str) -> Page {
        Page::parse(html, "https://www.jjwxc.net/onebook.php?novelid=1")
    }

    #[test]
    fn test_synopsis_lines() {
        let p = page(r#"<div id="novelintro">第一句。<br>第二句。<br><br>  </div>"#);
        assert_eq!(synopsis(&p).as_deref(), Some("第一句。\n第二句。"));
        assert_eq!(synopsis(&page("<div>无简介</div>")), None);
    }

    #[test]
    fn test_character_notes() {
        let p = page(
            "<div>搜索关键字：<span>主角：温客行，周子舒 ┃ 配角：张成岭 ┃ 其它：江湖\n一句话简介：天涯</span></div>",
        );
        let notes = character_notes(&p);
        assert_eq!(notes.main.as_deref(), Some("温客行，周子舒"));
        assert_eq!(notes.supporting.as_deref(), Some("张成岭"));
        assert_eq!(notes.other.as_deref(), Some("江湖"));
    }

    #[test]
    fn test_character_notes_by_label() {
        let notes = character_notes(&page("<span>主角：周子舒 ┃ 其它：江湖</span>"));
        assert_eq!(notes.main.as_deref(), Some("周子舒"));
        assert_eq!(notes.supporting, None);
        assert_eq!(notes.other.as_deref(), Some("江湖"));

        let notes = character_notes(&page("<span>主角：温客行 ┃ 无关 ┃ 配角：叶白衣</span>"));
        assert_eq!(notes.main.as_deref(), Some("温客行"));
        assert_eq!(notes.supporting.as_deref(), Some("叶白衣"));
        assert_eq!(notes.other, None);
    }

    #[test]
    fn test_character_notes_missing() {
        assert_eq!(character_notes(&page("<p>没有角色</p>")), CharacterNotes::default());
    }

    #[test]
    fn test_tags_from_text() {
        let p = page("<div>内容标签：<a>强强</a> <a>江湖</a> <a>正剧</a>\n</div>");
        assert_eq!(tags(&p).as_deref(), Some("强强 江湖 正剧"));
    }

    #[test]
    fn test_tags_placeholder_means_none() {
        assert_eq!(tags(&page("<div>内容标签：无\n</div>")), None);
        assert_eq!(tags(&page("<div>\n标签：暂无\n</div>")), None);
    }

    #[test]
    fn test_tags_from_labeled_element() {
        let p = page("<div><strong>类别标签</strong>：仙侠 修真</div>");
        assert_eq!(tags(&p).as_deref(), Some("仙侠 修真"));
    }

    #[test]
    fn test_info_list() {
        let p = page(
            r#"<ul name="printright">
            <li>文章类型：原创-纯爱-近代现代-爱情</li>
            <li>作品视角：主受</li>
            <li>所属系列：<span>无从属系列</span></li>
            <li>文章进度：完结</li>
            <li>全文字数：<span>1,234,567字</span></li>
            <li>版权转化：<img src="pub.gif"></li>
            <li>签约状态：<font color="red">已签约</font></li>
            </ul>"#,
        );
        let info = info_list(&p);
        assert_eq!(info.category.as_deref(), Some("原创-纯爱-近代现代-爱情"));
        assert_eq!(info.narrative_perspective.as_deref(), Some("主受"));
        assert_eq!(info.series.as_deref(), Some("无从属系列"));
        assert_eq!(info.progress_status.as_deref(), Some("完结"));
        assert_eq!(info.word_count, Some(1_234_567));
        assert_eq!(info.publication_status.as_deref(), Some("已出版"));
        assert_eq!(info.contract_status.as_deref(), Some("已签约"));
    }

    #[test]
    fn test_unpublished_sentinel() {
        let p = page(
            r#"<ul name="printright"><li>版权转化：尚未出版(联系出版)</li><li>签约状态：未签约</li></ul>"#,
        );
        let info = info_list(&p);
        assert_eq!(info.publication_status.as_deref(), Some("尚未出版"));
        assert_eq!(info.contract_status.as_deref(), Some("未签约"));
    }

    #[test]
    fn test_stats() {
        let p = page(
            "<div>总书评数：1024 当前被收藏数：20480 营养液数：3000 文章积分：1,234,567,890</div>\
             <div>非V章节总点击数：999999</div>",
        );
        assert_eq!(
            stats(&p),
            EntryStats {
                review_count: Some(1024),
                favorite_count: Some(20480),
                nutrient_count: Some(3000),
                total_click_count: Some(999_999),
                score: Some(1_234_567_890),
            }
        );
    }

    #[test]
    fn test_click_count_with_or_without_qualifier() {
        let plain = stats(&page("<div>总点击数：12345 总书评数：1</div>"));
        assert_eq!(plain.total_click_count, Some(12_345));
        assert_eq!(plain.review_count, Some(1));

        let qualified = stats(&page("<div>非V章节总点击数：678</div>"));
        assert_eq!(qualified.total_click_count, Some(678));
    }

    #[test]
    fn test_stats_independent() {
        let p = page("<div>当前被收藏数：12</div>");
        let s = stats(&p);
        assert_eq!(s.favorite_count, Some(12));
        assert_eq!(s.review_count, None);
        assert_eq!(s.score, None);
    }

    #[test]
    fn test_last_update_normalized() {
        let p = page("<span>最新更新:2021-03-04 05:06:07</span>");
        assert_eq!(last_update(&p).as_deref(), Some("2021-03-04T05:06:07"));
        assert_eq!(last_update(&page("最新更新：2021-13-40 00:00:00")), None);
    }

    #[test]
    fn test_chapter_count() {
        let p = page(
            r#"<a href="onebook.php?novelid=1&amp;chapterid=1">1</a>
            <a href="onebook.php?novelid=1&chapterid=2">2</a>
            <a href="onebook.php?novelid=1">目录</a>"#,
        );
        assert_eq!(chapter_count(&p), Some(2));
        assert_eq!(chapter_count(&page("<a href='x'>x</a>")), None);
    }
}
