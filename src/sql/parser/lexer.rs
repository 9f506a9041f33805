//! Tokenizer for the SQL subset

use std::{fmt::Display, iter::Peekable, str::Chars};

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Keyword(Keyword),
    /// Table or column name, case preserved
    Ident(String),
    /// String literal (single- or double-quoted)
    String(String),
    /// Unsigned integer literal
    Number(String),
    OpenParen,
    CloseParen,
    Comma,
    Semicolon,
    Asterisk,
    Period,
    Minus,
    Equal,
    NotEqual,
    GreaterThan,
    LessThan,
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text: &str = match self {
            Token::Keyword(keyword) => keyword.as_str(),
            Token::Ident(ident) => ident,
            Token::String(v) => v,
            Token::Number(n) => n,
            Token::OpenParen => "(",
            Token::CloseParen => ")",
            Token::Comma => ",",
            Token::Semicolon => ";",
            Token::Asterisk => "*",
            Token::Period => ".",
            Token::Minus => "-",
            Token::Equal => "=",
            Token::NotEqual => "!=",
            Token::GreaterThan => ">",
            Token::LessThan => "<",
        };
        f.write_str(text)
    }
}

/// Reserved words. Matching is case-insensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Create,
    Table,
    Int,
    Integer,
    Varchar,
    Boolean,
    Bool,
    Primary,
    Key,
    Unique,
    Not,
    Null,
    Insert,
    Into,
    Values,
    Select,
    From,
    Inner,
    Join,
    On,
    Where,
    Update,
    Set,
    Delete,
    True,
    False,
}

const KEYWORDS: &[(&str, Keyword)] = &[
    ("CREATE", Keyword::Create),
    ("TABLE", Keyword::Table),
    ("INT", Keyword::Int),
    ("INTEGER", Keyword::Integer),
    ("VARCHAR", Keyword::Varchar),
    ("BOOLEAN", Keyword::Boolean),
    ("BOOL", Keyword::Bool),
    ("PRIMARY", Keyword::Primary),
    ("KEY", Keyword::Key),
    ("UNIQUE", Keyword::Unique),
    ("NOT", Keyword::Not),
    ("NULL", Keyword::Null),
    ("INSERT", Keyword::Insert),
    ("INTO", Keyword::Into),
    ("VALUES", Keyword::Values),
    ("SELECT", Keyword::Select),
    ("FROM", Keyword::From),
    ("INNER", Keyword::Inner),
    ("JOIN", Keyword::Join),
    ("ON", Keyword::On),
    ("WHERE", Keyword::Where),
    ("UPDATE", Keyword::Update),
    ("SET", Keyword::Set),
    ("DELETE", Keyword::Delete),
    ("TRUE", Keyword::True),
    ("FALSE", Keyword::False),
];

impl Keyword {
    pub fn lookup(word: &str) -> Option<Keyword> {
        KEYWORDS
            .iter()
            .find(|(text, _)| text.eq_ignore_ascii_case(word))
            .map(|(_, keyword)| *keyword)
    }

    /// Canonical upper-case spelling
    pub fn as_str(&self) -> &'static str {
        KEYWORDS
            .iter()
            .find(|(_, keyword)| keyword == self)
            .map_or("", |(text, _)| text)
    }
}

impl Display for Keyword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Splits statement text into tokens. Yields `Err` once on the first bad
/// character or unterminated string.
pub struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
}

impl Iterator for Lexer<'_> {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        self.skip_whitespace();
        let c = *self.chars.peek()?;
        Some(match c {
            '\'' | '"' => self.scan_string(c),
            '!' => self.scan_not_equal(),
            c if c.is_ascii_digit() => Ok(self.scan_number()),
            c if c.is_alphabetic() || c == '_' => Ok(self.scan_word()),
            c => self
                .scan_symbol()
                .ok_or_else(|| Error::parse(c.to_string(), "unexpected character")),
        })
    }
}

impl<'a> Lexer<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            chars: text.chars().peekable(),
        }
    }

    fn next_if<F: Fn(char) -> bool>(&mut self, predicate: F) -> Option<char> {
        self.chars.next_if(|&c| predicate(c))
    }

    /// Collects the run of characters matching `predicate`
    fn next_while<F: Fn(char) -> bool>(&mut self, predicate: F) -> String {
        let mut run = String::new();
        while let Some(c) = self.next_if(&predicate) {
            run.push(c);
        }
        run
    }

    fn skip_whitespace(&mut self) {
        self.next_while(char::is_whitespace);
    }

    /// Quoted literal, quotes stripped. There are no escape sequences,
    /// so the literal ends at the first matching quote.
    fn scan_string(&mut self, quote: char) -> Result<Token> {
        self.chars.next();
        let body = self.next_while(|c| c != quote);
        if self.next_if(|c| c == quote).is_none() {
            return Err(Error::parse(
                format!("{}{}", quote, body),
                "unterminated string literal",
            ));
        }
        Ok(Token::String(body))
    }

    /// Digits only; the sign is a separate `Minus` token
    fn scan_number(&mut self) -> Token {
        Token::Number(self.next_while(|c| c.is_ascii_digit()))
    }

    /// Keyword or identifier. Identifiers keep their case.
    fn scan_word(&mut self) -> Token {
        let word = self.next_while(|c| c.is_alphanumeric() || c == '_');
        Keyword::lookup(&word).map_or(Token::Ident(word), Token::Keyword)
    }

    fn scan_not_equal(&mut self) -> Result<Token> {
        self.chars.next();
        self.next_if(|c| c == '=')
            .map(|_| Token::NotEqual)
            .ok_or_else(|| Error::parse("!", "expected '!='"))
    }

    fn scan_symbol(&mut self) -> Option<Token> {
        let token = match self.chars.peek()? {
            '*' => Token::Asterisk,
            '(' => Token::OpenParen,
            ')' => Token::CloseParen,
            ',' => Token::Comma,
            ';' => Token::Semicolon,
            '.' => Token::Period,
            '-' => Token::Minus,
            '=' => Token::Equal,
            '>' => Token::GreaterThan,
            '<' => Token::LessThan,
            _ => return None,
        };
        self.chars.next();
        Some(token)
    }
}

#[cfg(test)]
mod tests {
    use super::Lexer;
    use crate::{
        error::{ErrorKind, Result},
        sql::parser::lexer::{Keyword, Token},
    };

    #[test]
    fn test_lexer_create_table() -> Result<()> {
        let tokens = Lexer::new(
            "CREATE table Users
                (
                    id int primary key,
                    name VARCHAR(50) unique not null
                );
                ",
        )
        .collect::<Result<Vec<_>>>()?;

        assert_eq!(
            tokens,
            vec![
                Token::Keyword(Keyword::Create),
                Token::Keyword(Keyword::Table),
                Token::Ident("Users".to_string()),
                Token::OpenParen,
                Token::Ident("id".to_string()),
                Token::Keyword(Keyword::Int),
                Token::Keyword(Keyword::Primary),
                Token::Keyword(Keyword::Key),
                Token::Comma,
                Token::Ident("name".to_string()),
                Token::Keyword(Keyword::Varchar),
                Token::OpenParen,
                Token::Number("50".to_string()),
                Token::CloseParen,
                Token::Keyword(Keyword::Unique),
                Token::Keyword(Keyword::Not),
                Token::Keyword(Keyword::Null),
                Token::CloseParen,
                Token::Semicolon
            ]
        );
        Ok(())
    }

    #[test]
    fn test_lexer_insert_into() -> Result<()> {
        let tokens = Lexer::new("insert into tbl values (1, -2, 'it''s', \"dq\", true, FALSE)")
            .collect::<Result<Vec<_>>>()?;

        assert_eq!(
            tokens,
            vec![
                Token::Keyword(Keyword::Insert),
                Token::Keyword(Keyword::Into),
                Token::Ident("tbl".to_string()),
                Token::Keyword(Keyword::Values),
                Token::OpenParen,
                Token::Number("1".to_string()),
                Token::Comma,
                Token::Minus,
                Token::Number("2".to_string()),
                Token::Comma,
                Token::String("it".to_string()),
                Token::String("s".to_string()),
                Token::Comma,
                Token::String("dq".to_string()),
                Token::Comma,
                Token::Keyword(Keyword::True),
                Token::Comma,
                Token::Keyword(Keyword::False),
                Token::CloseParen,
            ]
        );
        Ok(())
    }

    #[test]
    fn test_lexer_select_join() -> Result<()> {
        let tokens = Lexer::new("select * from a inner join b on a.id = b.a_id where x != 3")
            .collect::<Result<Vec<_>>>()?;

        assert_eq!(tokens.len(), 19);
        assert_eq!(tokens[9], Token::Period);
        assert_eq!(tokens[14], Token::Ident("a_id".to_string()));
        assert_eq!(tokens[17], Token::NotEqual);

        let tokens = Lexer::new("a>1 b<2").collect::<Result<Vec<_>>>()?;
        assert_eq!(tokens[1], Token::GreaterThan);
        assert_eq!(tokens[4], Token::LessThan);
        Ok(())
    }

    #[test]
    fn test_lexer_errors() {
        let err = Lexer::new("select 'abc").collect::<Result<Vec<_>>>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);

        let err = Lexer::new("a ! b").collect::<Result<Vec<_>>>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);

        let err = Lexer::new("a # b").collect::<Result<Vec<_>>>().unwrap_err();
        assert_eq!(err.to_string(), "parse error near '#': unexpected character");
    }
}
