//! A small parser for generated VALUES lists, used to check encoded tuples field by field.

use std::{fmt::Debug, str::FromStr};

use chrono::NaiveDateTime;
use uuid::Uuid;

use crate::database::postgres::sql_type_wrapper::TIMESTAMP_FORMAT;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedLiteral {
    /// `null::<type>`
    Null(String),
    /// `'text'` with an optional `::<type>` cast
    Quoted { text: String, cast: Option<String> },
    /// Anything unquoted, such as `65001` or `true::boolean`
    Bare(String),
}

impl ParsedLiteral {
    pub fn text(&self) -> String {
        match self {
            ParsedLiteral::Quoted { text, cast: None } => text.clone(),
            other => panic!("expected an uncast string literal, got {:?}", other),
        }
    }

    pub fn text_with_cast(&self, expected: &str) -> String {
        match self {
            ParsedLiteral::Quoted { text, cast: Some(cast) } if cast == expected => text.clone(),
            other => panic!("expected a ::{} literal, got {:?}", expected, other),
        }
    }

    /// The uuid in its 32 digit simple form.
    pub fn uuid(&self) -> String {
        let text = self.text_with_cast("uuid");
        Uuid::parse_str(&text).unwrap().simple().to_string()
    }

    pub fn number<T>(&self) -> T
    where
        T: FromStr,
        T::Err: Debug,
    {
        match self {
            ParsedLiteral::Bare(raw) => raw.parse().unwrap(),
            other => panic!("expected a number, got {:?}", other),
        }
    }

    pub fn boolean(&self) -> bool {
        match self {
            ParsedLiteral::Bare(raw) => match raw.trim_end_matches("::boolean") {
                "true" => true,
                "false" => false,
                other => panic!("expected a boolean, got {}", other),
            },
            other => panic!("expected a boolean, got {:?}", other),
        }
    }

    pub fn timestamp(&self) -> NaiveDateTime {
        let text = self.text_with_cast("timestamp");
        NaiveDateTime::parse_from_str(&text, TIMESTAMP_FORMAT).unwrap()
    }
}

/// Splits `(a,b),(c,d)` into rows of parsed literals.
pub fn parse_values(values: &str) -> Vec<Vec<ParsedLiteral>> {
    let mut rows = Vec::new();
    let mut chars = values.chars().peekable();

    loop {
        match chars.next() {
            None => break,
            Some(',') => continue,
            Some('(') => {}
            Some(other) => panic!("unexpected '{}' between tuples", other),
        }

        let mut row = Vec::new();
        let mut token = String::new();
        let mut quoted: Option<String> = None;
        let mut in_quote = false;

        loop {
            let c = chars.next().expect("unterminated tuple");
            if in_quote {
                if c == '\'' {
                    if chars.peek() == Some(&'\'') {
                        chars.next();
                        quoted.get_or_insert_with(String::new).push('\'');
                    } else {
                        in_quote = false;
                    }
                } else {
                    quoted.get_or_insert_with(String::new).push(c);
                }
                continue;
            }

            match c {
                '\'' => {
                    in_quote = true;
                    quoted.get_or_insert_with(String::new);
                }
                ',' | ')' => {
                    row.push(finish_literal(quoted.take(), &token));
                    token.clear();
                    if c == ')' {
                        break;
                    }
                }
                _ => token.push(c),
            }
        }

        rows.push(row);
    }

    rows
}

fn finish_literal(quoted: Option<String>, token: &str) -> ParsedLiteral {
    match quoted {
        Some(text) => {
            let cast = token.strip_prefix("::").map(str::to_string);
            ParsedLiteral::Quoted { text, cast }
        }
        None => match token.strip_prefix("null::") {
            Some(cast) => ParsedLiteral::Null(cast.to_string()),
            None => ParsedLiteral::Bare(token.to_string()),
        },
    }
}

#[test]
fn test_parse_values() {
    let rows = parse_values("('a''b'::inet,null::uuid,12,true::boolean),('',3,'x')");
    assert_eq!(rows.len(), 2);
    assert_eq!(
        rows[0][0],
        ParsedLiteral::Quoted { text: "a'b".to_string(), cast: Some("inet".to_string()) }
    );
    assert_eq!(rows[0][1], ParsedLiteral::Null("uuid".to_string()));
    assert_eq!(rows[0][2].number::<u32>(), 12);
    assert!(rows[0][3].boolean());
    assert_eq!(rows[1][0].text(), "");
    assert_eq!(rows[1][2].text(), "x");
}
