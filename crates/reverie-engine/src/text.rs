//! Normalizing, sentence splitting and scene combining.

use std::sync::OnceLock;

use regex::Regex;
use reverie_contracts::analysis::AnalyzeOptions;

fn is_clause_mark(ch: char) -> bool {
    matches!(ch, ',' | '.' | '!' | '?' | ';' | ':')
}

/// Collapses whitespace runs to one space, drops the space in front of
/// `,.!?;:` and trims the ends.
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for word in text.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        for ch in word.chars() {
            if is_clause_mark(ch) && out.ends_with(' ') {
                out.pop();
            }
            out.push(ch);
        }
    }
    out
}

fn sentence_regex() -> &'static Regex {
    static SENTENCE_RE: OnceLock<Regex> = OnceLock::new();
    SENTENCE_RE
        .get_or_init(|| {
            Regex::new(r"[.!?]*[^.!?]+[.!?]*|[.!?]+").expect("sentence regex should compile")
        })
}

/// Splits on `.`, `!` and `?`, keeping the marks on the sentence they end.
/// Marks that open the text stay on the first sentence and a text of marks
/// alone is one sentence. Text without any terminal mark is a single sentence.
pub fn segment(text: &str) -> Vec<String> {
    sentence_regex()
        .find_iter(text)
        .map(|piece| normalize(piece.as_str()))
        .filter(|sentence| !sentence.is_empty())
        .collect()
}

/// Merges contiguous runs of `ceil(len / target)` sentences. The result can
/// be shorter than `target` when the division does not come out even.
pub fn combine(sentences: Vec<String>, target: usize) -> Vec<String> {
    let target = target.max(1);
    if sentences.len() <= target {
        return sentences;
    }
    let chunk_size = sentences.len().div_ceil(target);
    sentences
        .chunks(chunk_size)
        .map(|chunk| normalize(&chunk.join(" ")))
        .collect()
}

/// Brings the sentence list down to the panel target, merging or truncating
/// depending on `merge_short`.
pub fn fit_scenes(sentences: Vec<String>, options: &AnalyzeOptions) -> Vec<String> {
    let target = options.panel_target();
    if options.merge_short {
        return combine(sentences, target);
    }
    let mut sentences = sentences;
    sentences.truncate(target);
    sentences
}
