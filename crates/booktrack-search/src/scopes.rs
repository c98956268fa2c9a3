//! Per-kind matching rules and hit construction.
//!
//! Every entity kind has a fixed set of text fields a free-text query is
//! matched against, an ordered set of fields relevance is scored over, and a
//! title/subtitle/snippet shape for its hits.

use serde_json::{json, Map, Value};

use booktrack_core::{defaults, Book, Note, Quote, Record, Review, SearchHit};

use crate::relevance::{calculate_relevance, create_snippet, leading_chars};

fn contains(text: &str, needle: &str) -> bool {
    text.to_lowercase().contains(needle)
}

fn any_field(fields: &[Option<&str>], needle: &str) -> bool {
    fields.iter().copied().flatten().any(|t| contains(t, needle))
}

fn any_item(items: &[String], needle: &str) -> bool {
    items.iter().any(|t| contains(t, needle))
}

/// Title, author, description, ISBN or any genre.
pub fn book_matches(book: &Book, needle: &str) -> bool {
    any_field(
        &[
            Some(book.title.as_str()),
            book.author.as_deref(),
            book.description.as_deref(),
            book.isbn.as_deref(),
        ],
        needle,
    ) || any_item(&book.genres, needle)
}

/// Title, content or any tag.
pub fn note_matches(note: &Note, needle: &str) -> bool {
    any_field(&[note.title.as_deref(), Some(note.content.as_str())], needle)
        || any_item(&note.tags, needle)
}

/// Text, speaker or context.
pub fn quote_matches(quote: &Quote, needle: &str) -> bool {
    any_field(
        &[
            Some(quote.text.as_str()),
            quote.speaker.as_deref(),
            quote.context.as_deref(),
        ],
        needle,
    )
}

/// Title or content.
pub fn review_matches(review: &Review, needle: &str) -> bool {
    any_field(&[review.title.as_deref(), review.content.as_deref()], needle)
}

fn named_matches(name: &str, description: Option<&str>, needle: &str) -> bool {
    any_field(&[Some(name), description], needle)
}

/// Whether any of the record's searchable text fields contains `needle`.
///
/// `needle` must already be lower-cased. An empty needle matches everything.
pub fn matches_query(record: &Record, needle: &str) -> bool {
    match record {
        Record::Book(b) => book_matches(b, needle),
        Record::Note(n) => note_matches(n, needle),
        Record::Quote(q) => quote_matches(q, needle),
        Record::Review(r) => review_matches(r, needle),
        Record::Collection(c) => named_matches(&c.name, c.description.as_deref(), needle),
        Record::List(l) => named_matches(&l.name, l.description.as_deref(), needle),
        Record::Tag(t) => named_matches(&t.name, t.description.as_deref(), needle),
        Record::Author(a) => contains(&a.name, needle),
    }
}

/// Ordered fields relevance is scored over, most important first.
pub fn relevance_fields(record: &Record) -> Vec<Option<&str>> {
    match record {
        Record::Book(b) => vec![
            Some(b.title.as_str()),
            b.author.as_deref(),
            b.description.as_deref(),
        ],
        Record::Note(n) => vec![n.title.as_deref(), Some(n.content.as_str())],
        Record::Quote(q) => vec![Some(q.text.as_str()), q.speaker.as_deref()],
        Record::Review(r) => vec![r.title.as_deref(), r.content.as_deref()],
        Record::Collection(c) => vec![Some(c.name.as_str()), c.description.as_deref()],
        Record::List(l) => vec![Some(l.name.as_str()), l.description.as_deref()],
        Record::Tag(t) => vec![Some(t.name.as_str()), t.description.as_deref()],
        Record::Author(a) => vec![Some(a.name.as_str())],
    }
}

/// Quoted display title of a quotation, cut after 50 characters.
pub fn quote_title(text: &str) -> String {
    if text.chars().count() > defaults::QUOTE_TITLE_LENGTH {
        format!(
            "\"{}{}\"",
            leading_chars(text, defaults::QUOTE_TITLE_LENGTH),
            defaults::ELLIPSIS
        )
    } else {
        format!("\"{text}\"")
    }
}

fn book_count_label(count: i64) -> String {
    format!("{count} books")
}

fn name_and_description(name: &str, description: Option<&str>) -> String {
    format!("{name}. {}", description.unwrap_or_default())
}

/// Title, subtitle and metadata of a hit, shared by unified and advanced search.
fn display(record: &Record) -> (String, Option<String>, Map<String, Value>) {
    let mut metadata = Map::new();
    let (title, subtitle) = match record {
        Record::Book(b) => {
            metadata.insert("status".into(), json!(b.status));
            metadata.insert("genres".into(), json!(b.genres));
            metadata.insert("rating".into(), json!(b.rating));
            (b.title.clone(), b.author.clone())
        }
        Record::Note(n) => {
            metadata.insert("note_type".into(), json!(n.note_type));
            metadata.insert("book_id".into(), json!(n.book_id));
            (
                n.title.clone().unwrap_or_else(|| "Note".to_string()),
                n.book_title.clone(),
            )
        }
        Record::Quote(q) => {
            metadata.insert("speaker".into(), json!(q.speaker));
            metadata.insert("book_id".into(), json!(q.book_id));
            (quote_title(&q.text), q.book_title.clone())
        }
        Record::Review(r) => {
            metadata.insert("rating".into(), json!(r.rating));
            metadata.insert("book_id".into(), json!(r.book_id));
            (
                r.title.clone().unwrap_or_else(|| "Review".to_string()),
                r.book_title.clone(),
            )
        }
        Record::Collection(c) => {
            metadata.insert("book_count".into(), json!(c.book_count));
            (c.name.clone(), Some(book_count_label(c.book_count)))
        }
        Record::List(l) => {
            metadata.insert("book_count".into(), json!(l.book_count));
            (l.name.clone(), Some(book_count_label(l.book_count)))
        }
        Record::Tag(t) => {
            metadata.insert("color".into(), json!(t.color));
            metadata.insert("book_count".into(), json!(t.book_count));
            (t.name.clone(), Some(book_count_label(t.book_count)))
        }
        Record::Author(a) => {
            metadata.insert("book_count".into(), json!(a.book_count));
            (a.name.clone(), Some(book_count_label(a.book_count)))
        }
    };
    (title, subtitle, metadata)
}

/// Build the unified-search hit for a matched record.
pub fn to_hit(record: &Record, needle: &str, snippet_length: usize) -> SearchHit {
    let snippet = match record {
        Record::Book(b) => create_snippet(
            &name_and_description(&b.title, b.description.as_deref()),
            needle,
            snippet_length,
        ),
        Record::Note(n) => create_snippet(&n.content, needle, snippet_length),
        Record::Quote(q) => create_snippet(&q.text, needle, snippet_length),
        Record::Review(r) => create_snippet(
            r.content.as_deref().unwrap_or_default(),
            needle,
            snippet_length,
        ),
        Record::Collection(c) => create_snippet(
            &name_and_description(&c.name, c.description.as_deref()),
            needle,
            snippet_length,
        ),
        Record::List(l) => create_snippet(
            &name_and_description(&l.name, l.description.as_deref()),
            needle,
            snippet_length,
        ),
        Record::Tag(t) => create_snippet(
            &name_and_description(&t.name, t.description.as_deref()),
            needle,
            snippet_length,
        ),
        Record::Author(a) => format!("Author of {} books in your library", a.book_count),
    };

    let (title, subtitle, metadata) = display(record);
    SearchHit {
        id: record.id(),
        result_type: record.result_type(),
        title,
        subtitle,
        snippet: Some(snippet),
        relevance_score: calculate_relevance(needle, &relevance_fields(record)),
        created_at: record.created_at(),
        metadata,
    }
}

// =============================================================================
// ADVANCED SEARCH
// =============================================================================

/// Field key of an advanced query, as typed by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetField {
    Title,
    Author,
    Content,
    Tag,
    Genre,
}

/// Whether the record's targeted field contains `needle` (lower-cased).
///
/// Keys that do not apply to the record's kind, and kinds outside advanced
/// search, impose no restriction.
pub fn matches_target(record: &Record, field: TargetField, needle: &str) -> bool {
    match (record, field) {
        (Record::Book(b), TargetField::Title) => contains(&b.title, needle),
        (Record::Book(b), TargetField::Author) => any_field(&[b.author.as_deref()], needle),
        (Record::Book(b), TargetField::Genre) => any_item(&b.genres, needle),
        (Record::Note(n), TargetField::Title) => any_field(&[n.title.as_deref()], needle),
        (Record::Note(n), TargetField::Content) => contains(&n.content, needle),
        (Record::Note(n), TargetField::Tag) => any_item(&n.tags, needle),
        (Record::Quote(q), TargetField::Content) => contains(&q.text, needle),
        (Record::Quote(q), TargetField::Tag) => any_item(&q.tags, needle),
        _ => true,
    }
}

/// Concatenated text the boolean term lists are tested against.
///
/// `None` for kinds advanced search does not cover.
pub fn advanced_text(record: &Record) -> Option<String> {
    match record {
        Record::Book(b) => Some(format!(
            "{} {} {}",
            b.title,
            b.author.as_deref().unwrap_or_default(),
            b.description.as_deref().unwrap_or_default()
        )),
        Record::Note(n) => Some(format!(
            "{} {}",
            n.title.as_deref().unwrap_or_default(),
            n.content
        )),
        Record::Quote(q) => Some(format!(
            "{} {}",
            q.text,
            q.speaker.as_deref().unwrap_or_default()
        )),
        _ => None,
    }
}

/// Build an advanced-search hit with a precomputed score.
pub fn to_advanced_hit(
    record: &Record,
    text: &str,
    score: f64,
    snippet_length: usize,
) -> SearchHit {
    let (title, subtitle, metadata) = display(record);
    SearchHit {
        id: record.id(),
        result_type: record.result_type(),
        title,
        subtitle,
        snippet: Some(leading_chars(text, snippet_length)),
        relevance_score: score,
        created_at: record.created_at(),
        metadata,
    }
}
