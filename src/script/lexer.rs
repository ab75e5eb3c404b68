/// One significant script line, split into whitespace-delimited tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Line<'a> {
    /// 1-based line number in the source text.
    pub(crate) number: usize,
    pub(crate) tokens: Vec<&'a str>,
}

impl<'a> Line<'a> {
    pub(crate) fn keyword(&self) -> &'a str {
        self.tokens[0]
    }

    pub(crate) fn args(&self) -> &[&'a str] {
        &self.tokens[1..]
    }
}

pub(crate) const COMMENT_PREFIX: &str = "//";

/// Split `src` into significant lines, dropping blank lines and `//` comments.
pub(crate) fn lex(src: &str) -> Vec<Line<'_>> {
    src.lines()
        .enumerate()
        .filter_map(|(i, raw)| {
            let trimmed = raw.trim_start();
            if trimmed.is_empty() || trimmed.starts_with(COMMENT_PREFIX) {
                return None;
            }
            Some(Line {
                number: i + 1,
                tokens: trimmed.split_whitespace().collect(),
            })
        })
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/script/lexer.rs"]
mod tests;
