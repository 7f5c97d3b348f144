//! Line parser for `entity1|relationship|entity2` model output.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A (subject, relation, object) statement extracted from text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Triple {
    pub subject: String,
    pub relation: String,
    pub object: String,
}

impl Triple {
    pub fn new(
        subject: impl Into<String>,
        relation: impl Into<String>,
        object: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            relation: relation.into(),
            object: object.into(),
        }
    }
}

impl std::fmt::Display for Triple {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}", self.subject, self.relation, self.object)
    }
}

/// Why a line of model output was not accepted as a triple.
///
/// Skips are expected (models add preambles, headings, blank lines) and are
/// never fatal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseSkip {
    #[error("line {line}: blank")]
    Blank { line: usize },

    #[error("line {line}: expected 2 '|' separators, found {separators}")]
    SeparatorCount { line: usize, separators: usize },

    #[error("line {line}: empty field")]
    EmptyField { line: usize },
}

/// Parse one line. `line_number` is 1-based and only used for reporting.
pub fn parse_line(line: &str, line_number: usize) -> Result<Triple, ParseSkip> {
    if line.trim().is_empty() {
        return Err(ParseSkip::Blank { line: line_number });
    }

    let fields: Vec<&str> = line.split('|').map(str::trim).collect();
    if fields.len() != 3 {
        return Err(ParseSkip::SeparatorCount {
            line: line_number,
            separators: fields.len() - 1,
        });
    }

    if fields.iter().any(|f| f.is_empty()) {
        return Err(ParseSkip::EmptyField { line: line_number });
    }

    Ok(Triple::new(fields[0], fields[1], fields[2]))
}

/// Parse raw model output into triples, one item per line, in order.
pub fn parse_triples(output: &str) -> impl Iterator<Item = Result<Triple, ParseSkip>> + '_ {
    output
        .lines()
        .enumerate()
        .map(|(idx, line)| parse_line(line, idx + 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_well_formed_line() {
        assert_eq!(
            parse_line("  Alice | founded |Acme  ", 1),
            Ok(Triple::new("Alice", "founded", "Acme"))
        );
    }

    #[test]
    fn test_parse_mixed_output() {
        let output = "Here are the triples:\nAlice|knows|Bob\ngarbage line\nA|B\n\nAcme|makes|widgets\nx|y|z|w";
        let results: Vec<_> = parse_triples(output).collect();

        assert_eq!(results.len(), 7);
        let triples: Vec<Triple> = results.iter().filter_map(|r| r.clone().ok()).collect();
        assert_eq!(
            triples,
            vec![
                Triple::new("Alice", "knows", "Bob"),
                Triple::new("Acme", "makes", "widgets"),
            ]
        );

        assert_eq!(results[2], Err(ParseSkip::SeparatorCount { line: 3, separators: 0 }));
        assert_eq!(results[3], Err(ParseSkip::SeparatorCount { line: 4, separators: 1 }));
        assert_eq!(results[4], Err(ParseSkip::Blank { line: 5 }));
        assert_eq!(results[6], Err(ParseSkip::SeparatorCount { line: 7, separators: 3 }));
    }

    #[test]
    fn test_empty_field_is_skipped() {
        assert_eq!(parse_line("Alice| |Bob", 2), Err(ParseSkip::EmptyField { line: 2 }));
        assert_eq!(parse_line("|knows|Bob", 3), Err(ParseSkip::EmptyField { line: 3 }));
    }

    #[test]
    fn test_order_and_duplicates_preserved() {
        let output = "B|r|C\nA|r|B\nB|r|C";
        let triples: Vec<Triple> = parse_triples(output).filter_map(Result::ok).collect();
        assert_eq!(triples.len(), 3);
        assert_eq!(triples[0], triples[2]);
        assert_eq!(triples[1].subject, "A");
    }

    #[test]
    fn test_names_are_case_sensitive() {
        let triples: Vec<Triple> = parse_triples("acme|sells|Widgets\nAcme|sells|widgets")
            .filter_map(Result::ok)
            .collect();
        assert_ne!(triples[0], triples[1]);
    }

    #[test]
    fn test_crlf_lines() {
        let triples: Vec<Triple> = parse_triples("Alice|knows|Bob\r\nBob|knows|Carol\r\n")
            .filter_map(Result::ok)
            .collect();
        assert_eq!(triples[0].object, "Bob");
        assert_eq!(triples[1].object, "Carol");
    }

    #[test]
    fn test_triple_display() {
        assert_eq!(Triple::new("Alice", "founded", "Acme").to_string(), "Alice founded Acme");
    }
}
