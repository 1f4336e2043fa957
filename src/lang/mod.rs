use std::collections::HashMap;

use once_cell::sync::Lazy;

pub static IS_EN: Lazy<bool> = Lazy::new(|| {
    let language = get_lang();
    language.len() >= 2 && language[0..2].eq("en")
});

// https://doc.rust-lang.org/reference/conditional-compilation.html
#[cfg(windows)]
fn get_lang() -> String {
    std::env::var("LANG").unwrap_or(String::from("en_US"))
}

#[cfg(not(windows))]
fn get_lang() -> String {
    std::env::var("LANG").unwrap_or(String::from("zh_CN"))
}

static TRANSLATIONS: Lazy<HashMap<&'static str, (&'static str, &'static str)>> = Lazy::new(|| {
    let mut m = HashMap::with_capacity(8);
    m.insert(
        "qna.form.missingQuestion",
        ("Please add a question", "请添加一个问题"),
    );
    m.insert(
        "qna.form.missingAnswer",
        ("Please add an answer", "请添加一个答案"),
    );
    m.insert(
        "qna.form.writingSameQuestion",
        ("Duplicate question found", "问题重复"),
    );
    m.insert("topic.defaultName", ("Topic", "主题"));
    m.insert("workflow.defaultName", ("Workflow", "工作流"));
    m
});

/// Looks a key up in the translation table, picking the language from the OS
/// environment. Unknown keys come back verbatim so a missing translation
/// never hides which message was meant.
pub fn tr(key: &str) -> String {
    match TRANSLATIONS.get(key) {
        Some((en, zh)) => String::from(if *IS_EN { *en } else { *zh }),
        None => String::from(key),
    }
}
