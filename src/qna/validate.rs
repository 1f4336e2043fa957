use std::collections::HashMap;

use super::dto::QnaItem;
use crate::form::FormData;
use crate::lang;

/// True if any language has at least one non-blank entry.
pub fn has_populated_lang(data: &HashMap<String, Vec<String>>) -> bool {
    data.values()
        .flatten()
        .any(|entry| !entry.trim().is_empty())
}

/// True if any language carries at least one rich-content block.
pub fn has_content_answer(data: &HashMap<String, Vec<FormData>>) -> bool {
    data.values().any(|blocks| !blocks.is_empty())
}

/// Checks one item before save. Returns localized messages in a fixed order:
/// missing question, missing answer, duplicate question. Empty means the
/// item may be sent to the server.
///
/// Duplicate detection only looks at `current_lang`: an entry is a duplicate
/// when an earlier, non-blank entry in the same language equals it. Blank
/// entries in between do not reset the scan.
pub fn validate(item: &QnaItem, current_lang: &str) -> Vec<String> {
    let data = &item.data;
    let mut errors = Vec::new();

    if !has_populated_lang(&data.questions) {
        errors.push(lang::tr("qna.form.missingQuestion"));
    }
    if !has_populated_lang(&data.answers)
        && !has_content_answer(&data.content_answers)
        && data.redirect_flow.is_empty()
        && data.redirect_node.is_empty()
    {
        errors.push(lang::tr("qna.form.missingAnswer"));
    }
    if has_duplicate_questions(data.questions.get(current_lang)) {
        errors.push(lang::tr("qna.form.writingSameQuestion"));
    }

    errors
}

fn has_duplicate_questions(questions: Option<&Vec<String>>) -> bool {
    let questions = match questions {
        Some(q) => q,
        None => return false,
    };
    questions.iter().enumerate().any(|(i, entry)| {
        questions[..i]
            .iter()
            .any(|prior| !prior.trim().is_empty() && prior == entry)
    })
}
