use std::collections::BTreeMap;
use std::iter::Peekable;
use std::vec::IntoIter;

use tracing::debug;

use crate::error::{Error, Result};
use crate::sql::parser::ast::{Column, Condition, Join, Operator, Projection, QualifiedColumn};
use crate::sql::parser::lexer::{Keyword, Lexer, Token};
use crate::sql::types::{ColumnType, Value};

pub mod ast;
mod lexer;

/// Parses a single statement
pub fn parse(input: &str) -> Result<ast::Statement> {
    Parser::new(input)?.parse()
}

/// Recursive-descent parser over a pre-lexed token stream
pub struct Parser {
    tokens: Peekable<IntoIter<Token>>,
}

impl Parser {
    /// Tokenizes the input; lexical errors and unbalanced parentheses fail here
    pub fn new(input: &str) -> Result<Self> {
        let tokens = Lexer::new(input).collect::<Result<Vec<_>>>()?;
        check_parentheses(&tokens)?;
        Ok(Parser {
            tokens: tokens.into_iter().peekable(),
        })
    }

    /// Parses the input SQL statement into an AST. A trailing `;` is optional.
    pub fn parse(&mut self) -> Result<ast::Statement> {
        let stmt = self.parse_statement()?;
        self.next_if_token(Token::Semicolon);
        // No tokens allowed after the statement
        if let Some(token) = self.peek() {
            return Err(Error::parse(token.to_string(), "unexpected token after end of statement"));
        }
        debug!(?stmt, "parsed statement");
        Ok(stmt)
    }

    /// Dispatches on the leading keyword
    fn parse_statement(&mut self) -> Result<ast::Statement> {
        match self.peek() {
            Some(Token::Keyword(Keyword::Create)) => self.parse_ddl(),
            Some(Token::Keyword(Keyword::Select)) => self.parse_select(),
            Some(Token::Keyword(Keyword::Insert)) => self.parse_insert(),
            Some(Token::Keyword(Keyword::Update)) => self.parse_update(),
            Some(Token::Keyword(Keyword::Delete)) => self.parse_delete(),
            Some(t) => Err(Error::parse(t.to_string(), "unknown statement keyword")),
            None => Err(Error::parse("", "empty statement")),
        }
    }

    /// Parses DDL statements (CREATE TABLE)
    fn parse_ddl(&mut self) -> Result<ast::Statement> {
        self.next_expect(Token::Keyword(Keyword::Create))?;
        match self.next()? {
            Token::Keyword(Keyword::Table) => self.parse_ddl_create_table(),
            token => Err(Error::parse(token.to_string(), "expected TABLE after CREATE")),
        }
    }

    fn parse_ddl_create_table(&mut self) -> Result<ast::Statement> {
        let table_name = self.next_ident()?;
        self.next_expect(Token::OpenParen)?;

        let mut columns = Vec::new();
        loop {
            columns.push(self.parse_ddl_column()?);
            if self.next_if_token(Token::Comma).is_none() {
                break;
            }
        }
        self.next_expect(Token::CloseParen)?;
        Ok(ast::Statement::CreateTable {
            name: table_name,
            columns,
        })
    }

    /// `name TYPE [constraint]*`
    fn parse_ddl_column(&mut self) -> Result<ast::Column> {
        let name = self.next_ident()?;
        let mut column = Column {
            column_type: self.parse_column_type()?,
            name,
            primary_key: false,
            unique: false,
            nullable: None,
        };

        // Constraints may appear in any order
        while let Some(Token::Keyword(keyword)) = self.next_if_keyword() {
            match keyword {
                Keyword::Primary => {
                    self.next_expect(Token::Keyword(Keyword::Key))?;
                    column.primary_key = true;
                }
                Keyword::Unique => column.unique = true,
                Keyword::Not => {
                    self.next_expect(Token::Keyword(Keyword::Null))?;
                    column.nullable = Some(false);
                }
                Keyword::Null => column.nullable = Some(true),
                k => {
                    return Err(Error::parse(
                        k.to_string(),
                        format!("unexpected keyword in definition of column {}", column.name),
                    ));
                }
            }
        }

        Ok(column)
    }

    /// INT and BOOLEAN take no length, VARCHAR requires one
    fn parse_column_type(&mut self) -> Result<ColumnType> {
        let column_type = match self.next()? {
            Token::Keyword(Keyword::Int) | Token::Keyword(Keyword::Integer) => ColumnType::Integer,
            Token::Keyword(Keyword::Bool) | Token::Keyword(Keyword::Boolean) => ColumnType::Boolean,
            Token::Keyword(Keyword::Varchar) => {
                if self.next_if_token(Token::OpenParen).is_none() {
                    return Err(Error::parse("VARCHAR", "VARCHAR requires a length, e.g. VARCHAR(50)"));
                }
                let length = match self.next()? {
                    Token::Number(n) => n
                        .parse::<usize>()
                        .map_err(|_| Error::parse(n.clone(), "invalid VARCHAR length"))?,
                    token => return Err(Error::parse(token.to_string(), "invalid VARCHAR length")),
                };
                self.next_expect(Token::CloseParen)?;
                ColumnType::VarChar(length)
            }
            token => return Err(Error::parse(token.to_string(), "unknown column type")),
        };

        if !matches!(column_type, ColumnType::VarChar(_)) && self.peek() == Some(&Token::OpenParen) {
            return Err(Error::parse(
                column_type.to_string(),
                format!("{} does not take a length", column_type),
            ));
        }
        Ok(column_type)
    }

    /// Parses SELECT statement
    fn parse_select(&mut self) -> Result<ast::Statement> {
        self.next_expect(Token::Keyword(Keyword::Select))?;

        let columns = if self.next_if_token(Token::Asterisk).is_some() {
            Projection::All
        } else {
            let mut cols = Vec::new();
            loop {
                cols.push(self.parse_column_name()?);
                if self.next_if_token(Token::Comma).is_none() {
                    break;
                }
            }
            Projection::Columns(cols)
        };

        self.next_expect(Token::Keyword(Keyword::From))?;
        let table_name = self.next_ident()?;
        let join = self.parse_join_clause()?;

        Ok(ast::Statement::Select {
            table_name,
            columns,
            join,
            where_clause: self.parse_where_clause()?,
        })
    }

    /// Parses `[INNER] JOIN table ON a.x = b.y`
    fn parse_join_clause(&mut self) -> Result<Option<Join>> {
        if self.next_if_token(Token::Keyword(Keyword::Inner)).is_some() {
            if self.peek() != Some(&Token::Keyword(Keyword::Join)) {
                return Err(Error::parse("INNER", "expected JOIN after INNER"));
            }
        }
        if self.next_if_token(Token::Keyword(Keyword::Join)).is_none() {
            return Ok(None);
        }

        let table = self.next_ident()?;
        self.next_expect(Token::Keyword(Keyword::On))?;
        let left = self.parse_qualified_column()?;
        match self.next()? {
            Token::Equal => {}
            token => {
                return Err(Error::parse(token.to_string(), "JOIN supports only equality conditions"));
            }
        }
        let right = self.parse_qualified_column()?;
        Ok(Some(Join {
            table,
            on: (left, right),
        }))
    }

    /// `INSERT INTO t [(cols)] VALUES (..)[, (..)]*`
    fn parse_insert(&mut self) -> Result<ast::Statement> {
        self.next_expect(Token::Keyword(Keyword::Insert))?;
        self.next_expect(Token::Keyword(Keyword::Into))?;

        let table_name = self.next_ident()?;

        let columns = if self.next_if_token(Token::OpenParen).is_some() {
            let mut cols = Vec::new();
            loop {
                cols.push(self.next_ident()?);
                match self.next()? {
                    Token::CloseParen => break,
                    Token::Comma => {}
                    token => return Err(Error::parse(token.to_string(), "expected ',' or ')' in column list")),
                }
            }
            Some(cols)
        } else {
            None
        };

        self.next_expect(Token::Keyword(Keyword::Values))?;
        // Parse multiple value rows: INSERT INTO tbl VALUES (1,2),(3,4)
        let mut values = Vec::new();
        loop {
            self.next_expect(Token::OpenParen)?;
            let mut row = Vec::new();
            loop {
                row.push(self.parse_value()?);
                match self.next()? {
                    Token::CloseParen => break,
                    Token::Comma => {}
                    token => return Err(Error::parse(token.to_string(), "expected ',' or ')' in value list")),
                }
            }
            values.push(row);
            if self.next_if_token(Token::Comma).is_none() {
                break;
            }
        }
        Ok(ast::Statement::Insert {
            table_name,
            columns,
            values,
        })
    }

    /// Parses UPDATE statement
    fn parse_update(&mut self) -> Result<ast::Statement> {
        self.next_expect(Token::Keyword(Keyword::Update))?;
        let table_name = self.next_ident()?;
        self.next_expect(Token::Keyword(Keyword::Set))?;

        let mut assignments = BTreeMap::new();
        loop {
            let col = self.next_ident()?;
            self.next_expect(Token::Equal)?;
            let value = self.parse_value()?;
            if assignments.contains_key(&col) {
                return Err(Error::parse(col, "column assigned more than once"));
            }
            assignments.insert(col, value);
            if self.next_if_token(Token::Comma).is_none() {
                break;
            }
        }
        Ok(ast::Statement::Update {
            table_name,
            assignments,
            where_clause: self.parse_where_clause()?,
        })
    }

    /// Parses DELETE statement
    fn parse_delete(&mut self) -> Result<ast::Statement> {
        self.next_expect(Token::Keyword(Keyword::Delete))?;
        self.next_expect(Token::Keyword(Keyword::From))?;
        let table_name = self.next_ident()?;
        Ok(ast::Statement::Delete {
            table_name,
            where_clause: self.parse_where_clause()?,
        })
    }

    /// Parses a literal: quoted string, integer, TRUE/FALSE or NULL
    fn parse_value(&mut self) -> Result<Value> {
        Ok(match self.next()? {
            Token::Number(n) => Value::Integer(parse_integer(&n)?),
            Token::Minus => match self.next()? {
                Token::Number(n) => Value::Integer(parse_integer(&format!("-{}", n))?),
                token => return Err(Error::parse(format!("-{}", token), "malformed value")),
            },
            Token::String(s) => Value::String(s),
            Token::Keyword(Keyword::True) => Value::Boolean(true),
            Token::Keyword(Keyword::False) => Value::Boolean(false),
            Token::Keyword(Keyword::Null) => Value::Null,
            t => return Err(Error::parse(t.to_string(), "malformed value")),
        })
    }

    /// Parses the WHERE condition `column OP value`
    fn parse_where_clause(&mut self) -> Result<Option<Condition>> {
        if self.next_if_token(Token::Keyword(Keyword::Where)).is_none() {
            return Ok(None);
        }
        let column = self.parse_column_name()?;
        let operator = match self.next()? {
            Token::Equal => Operator::Equal,
            Token::NotEqual => Operator::NotEqual,
            Token::GreaterThan => Operator::GreaterThan,
            Token::LessThan => Operator::LessThan,
            token => return Err(Error::parse(token.to_string(), "expected one of =, !=, >, <")),
        };
        let value = self.parse_value()?;

        match self.peek() {
            None | Some(Token::Semicolon) => Ok(Some(Condition {
                column,
                operator,
                value,
            })),
            Some(token) => Err(Error::parse(
                token.to_string(),
                "WHERE supports a single comparison only",
            )),
        }
    }

    /// Parses `column` or `table.column`
    fn parse_column_name(&mut self) -> Result<String> {
        let name = self.next_ident()?;
        if self.next_if_token(Token::Period).is_some() {
            return Ok(format!("{}.{}", name, self.next_ident()?));
        }
        Ok(name)
    }

    fn parse_qualified_column(&mut self) -> Result<QualifiedColumn> {
        let table = self.next_ident()?;
        if self.next_if_token(Token::Period).is_none() {
            return Err(Error::parse(table, "JOIN condition columns must be written as table.column"));
        }
        Ok(QualifiedColumn {
            table,
            column: self.next_ident()?,
        })
    }

    fn peek(&mut self) -> Option<&Token> {
        self.tokens.peek()
    }

    fn next(&mut self) -> Result<Token> {
        self.tokens
            .next()
            .ok_or_else(|| Error::parse("", "unexpected end of input"))
    }

    fn next_ident(&mut self) -> Result<String> {
        match self.next()? {
            Token::Ident(ident) => Ok(ident),
            Token::Keyword(keyword) => Err(Error::parse(
                keyword.to_string(),
                "reserved word cannot be used as an identifier",
            )),
            token => Err(Error::parse(token.to_string(), "expected an identifier")),
        }
    }

    /// Consumes the next token, failing unless it is `expect`
    fn next_expect(&mut self, expect: Token) -> Result<()> {
        match self.tokens.next() {
            Some(token) if token == expect => Ok(()),
            Some(token) => Err(Error::parse(token.to_string(), format!("expected {}", expect))),
            None => Err(Error::parse("", format!("missing {}", expect))),
        }
    }

    fn next_if<F: Fn(&Token) -> bool>(&mut self, predicate: F) -> Option<Token> {
        self.tokens.next_if(|t| predicate(t))
    }

    fn next_if_keyword(&mut self) -> Option<Token> {
        self.next_if(|t| matches!(t, Token::Keyword(_)))
    }

    fn next_if_token(&mut self, token: Token) -> Option<Token> {
        self.next_if(|t| t == &token)
    }
}

fn parse_integer(literal: &str) -> Result<i64> {
    literal
        .parse()
        .map_err(|_| Error::parse(literal, "integer literal out of range"))
}

fn check_parentheses(tokens: &[Token]) -> Result<()> {
    let mut depth = 0usize;
    for token in tokens {
        match token {
            Token::OpenParen => depth += 1,
            Token::CloseParen if depth == 0 => {
                return Err(Error::parse(")", "unbalanced parentheses"));
            }
            Token::CloseParen => depth -= 1,
            _ => {}
        }
    }
    if depth > 0 {
        return Err(Error::parse("(", "unbalanced parentheses"));
    }
    Ok(())
}
