use crate::file::csv::{error::FileError, lines::Line};
use model::core::cell::Cell;
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    pub delimiters: Vec<char>,
    pub quote: char,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            delimiters: vec![','],
            quote: '"',
        }
    }
}

impl ParserConfig {
    pub fn with_delimiters(mut self, delimiters: Vec<char>) -> Self {
        self.delimiters = delimiters;
        self
    }

    pub fn with_quote(mut self, quote: char) -> Self {
        self.quote = quote;
        self
    }

    fn is_delimiter(&self, ch: char) -> bool {
        self.delimiters.contains(&ch)
    }
}

/// Splits one line into cells in a single pass.
///
/// Inside quotes a doubled quote character is a literal quote, and
/// delimiters are literal. A field that was quoted and ends up empty is
/// [`Cell::ExplicitEmpty`]; an unquoted empty field is an absent value.
/// Values are never trimmed.
#[derive(Debug, Clone, Default)]
pub struct LineParser {
    config: ParserConfig,
}

impl LineParser {
    pub fn new(config: ParserConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    pub fn parse_line(&self, line: &Line) -> Result<Vec<Cell>, FileError> {
        self.parse(&line.text, line.number)
    }

    pub fn parse(&self, text: &str, line_number: usize) -> Result<Vec<Cell>, FileError> {
        let quote = self.config.quote;
        let mut cells = Vec::new();
        let mut field = String::new();
        let mut was_quoted = false;
        let mut in_quotes = false;
        let mut chars = text.chars().peekable();

        while let Some(ch) = chars.next() {
            if in_quotes {
                if ch == quote {
                    if chars.peek() == Some(&quote) {
                        field.push(quote);
                        chars.next();
                    } else {
                        in_quotes = false;
                    }
                } else {
                    field.push(ch);
                }
            } else if ch == quote {
                in_quotes = true;
                was_quoted = true;
            } else if self.config.is_delimiter(ch) {
                cells.push(finish_field(&mut field, was_quoted));
                was_quoted = false;
            } else {
                field.push(ch);
            }
        }

        if in_quotes {
            return Err(FileError::UnterminatedQuote {
                expected: quote,
                line: line_number,
                text: text.to_string(),
            });
        }

        cells.push(finish_field(&mut field, was_quoted));
        Ok(cells)
    }
}

fn finish_field(field: &mut String, was_quoted: bool) -> Cell {
    let value = std::mem::take(field);
    if value.is_empty() && was_quoted {
        Cell::ExplicitEmpty
    } else {
        Cell::Value(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Vec<Cell> {
        LineParser::default().parse(text, 1).unwrap()
    }

    #[test]
    fn splits_plain_fields() {
        assert_eq!(
            parse("1,x,true"),
            vec![Cell::from("1"), Cell::from("x"), Cell::from("true")]
        );
    }

    #[test]
    fn distinguishes_quoted_empty_from_absent() {
        assert_eq!(
            parse(r#","",0"#),
            vec![Cell::from(""), Cell::ExplicitEmpty, Cell::from("0")]
        );
    }

    #[test]
    fn doubled_quote_is_one_literal_quote() {
        assert_eq!(parse(r#""a""b",c"#), vec![Cell::from(r#"a"b"#), Cell::from("c")]);
        assert_eq!(parse(r#""""""#), vec![Cell::from(r#"""#)]);
    }

    #[test]
    fn delimiters_are_literal_inside_quotes() {
        assert_eq!(parse(r#""a,b",c"#), vec![Cell::from("a,b"), Cell::from("c")]);
    }

    #[test]
    fn does_not_trim() {
        assert_eq!(parse(" a , b"), vec![Cell::from(" a "), Cell::from(" b")]);
    }

    #[test]
    fn trailing_delimiter_yields_absent_cell() {
        assert_eq!(parse("a,"), vec![Cell::from("a"), Cell::from("")]);
    }

    #[test]
    fn supports_multiple_delimiters_and_custom_quote() {
        let parser = LineParser::new(
            ParserConfig::default()
                .with_delimiters(vec![',', '\t'])
                .with_quote('\''),
        );
        assert_eq!(
            parser.parse("a\t'b,c',d", 1).unwrap(),
            vec![Cell::from("a"), Cell::from("b,c"), Cell::from("d")]
        );
    }

    #[test]
    fn unterminated_quote_names_terminator_and_line() {
        let err = LineParser::default().parse(r#""abc"#, 7).unwrap_err();
        match err {
            FileError::UnterminatedQuote {
                expected,
                line,
                text,
            } => {
                assert_eq!(expected, '"');
                assert_eq!(line, 7);
                assert_eq!(text, r#""abc"#);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
