// ABOUTME: Statement parser collaborator that identifies statements and counts `?` placeholders
// ABOUTME: Byte-level lexer aware of quoting and comment rules for the supported dialects
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Serialize};

/// SQL dialect used when lexing statements
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SqlDialect {
    /// `MySQL`/`MariaDB`: backslash escapes, `"` strings, `#` comments, backtick identifiers
    #[default]
    MySql,
    /// ANSI: `''` escapes only, `"` identifiers, no `#` comments
    Ansi,
}

/// Leading keyword class of a statement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatementKind {
    /// `SELECT` or a `WITH` query
    Select,
    /// `SHOW`, `DESCRIBE`, `EXPLAIN`
    Show,
    /// `INSERT` or `REPLACE`
    Insert,
    /// `UPDATE`
    Update,
    /// `DELETE`
    Delete,
    /// `CREATE`, `ALTER`, `DROP`, `TRUNCATE`, `RENAME`
    Ddl,
    /// Anything else
    Unknown,
}

impl StatementKind {
    /// Whether the statement produces a result set rather than a header
    #[must_use]
    pub const fn returns_rows(self) -> bool {
        matches!(self, Self::Select | Self::Show)
    }

    fn from_keyword(word: &str) -> Self {
        match word.to_ascii_uppercase().as_str() {
            "SELECT" | "WITH" | "VALUES" | "TABLE" => Self::Select,
            "SHOW" | "DESCRIBE" | "DESC" | "EXPLAIN" => Self::Show,
            "INSERT" | "REPLACE" => Self::Insert,
            "UPDATE" => Self::Update,
            "DELETE" => Self::Delete,
            "CREATE" | "ALTER" | "DROP" | "TRUNCATE" | "RENAME" => Self::Ddl,
            _ => Self::Unknown,
        }
    }
}

/// One statement found in a query string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentifiedStatement {
    /// Statement class
    pub kind: StatementKind,
    /// Number of `?` placeholders in the statement
    pub parameters: usize,
}

/// Identifies the statements of a query string
pub trait StatementParser: Send + Sync {
    /// Statements in order of appearance; empty statements are skipped
    fn identify(&self, sql: &str, dialect: SqlDialect) -> Vec<IdentifiedStatement>;

    /// Total `?` placeholders across all statements
    fn count_positional(&self, sql: &str, dialect: SqlDialect) -> usize {
        self.identify(sql, dialect)
            .iter()
            .map(|statement| statement.parameters)
            .sum()
    }

    /// Kind of the first statement, `Unknown` for empty input
    fn leading_kind(&self, sql: &str, dialect: SqlDialect) -> StatementKind {
        self.identify(sql, dialect)
            .first()
            .map_or(StatementKind::Unknown, |statement| statement.kind)
    }
}

/// Default parser: lexes just enough to skip literals and comments
#[derive(Debug, Clone, Copy, Default)]
pub struct LexicalStatementParser;

impl StatementParser for LexicalStatementParser {
    fn identify(&self, sql: &str, dialect: SqlDialect) -> Vec<IdentifiedStatement> {
        Scanner::new(sql, dialect).run()
    }
}

struct Scanner<'a> {
    input: &'a str,
    bytes: &'a [u8],
    pos: usize,
    dialect: SqlDialect,
    statements: Vec<IdentifiedStatement>,
    kind: Option<StatementKind>,
    parameters: usize,
}

impl<'a> Scanner<'a> {
    fn new(input: &'a str, dialect: SqlDialect) -> Self {
        Self {
            input,
            bytes: input.as_bytes(),
            pos: 0,
            dialect,
            statements: Vec::new(),
            kind: None,
            parameters: 0,
        }
    }

    fn run(mut self) -> Vec<IdentifiedStatement> {
        while !self.is_eof() {
            let ch = self.current();
            match ch {
                b'\'' => self.skip_quoted(b'\''),
                b'"' => self.skip_quoted(b'"'),
                b'`' => self.skip_quoted(b'`'),
                b'-' if self.peek_char() == Some(b'-') && self.dash_comment_allowed() => {
                    self.skip_line();
                }
                b'#' if self.dialect == SqlDialect::MySql => self.skip_line(),
                b'/' if self.peek_char() == Some(b'*') => self.skip_block_comment(),
                b'?' => {
                    self.parameters += 1;
                    self.mark_unknown();
                    self.advance();
                }
                b';' => {
                    self.finish_statement();
                    self.advance();
                }
                _ if ch.is_ascii_alphabetic() || ch == b'_' => self.scan_word(),
                _ => self.advance(),
            }
        }
        self.finish_statement();
        self.statements
    }

    fn is_eof(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn current(&self) -> u8 {
        self.bytes[self.pos]
    }

    fn peek_char(&self) -> Option<u8> {
        self.bytes.get(self.pos + 1).copied()
    }

    fn advance(&mut self) {
        if !self.is_eof() {
            self.pos += 1;
        }
    }

    // MySQL only treats `--` as a comment when followed by whitespace or end of input
    fn dash_comment_allowed(&self) -> bool {
        match self.dialect {
            SqlDialect::Ansi => true,
            SqlDialect::MySql => self
                .bytes
                .get(self.pos + 2)
                .is_none_or(u8::is_ascii_whitespace),
        }
    }

    fn skip_quoted(&mut self, quote: u8) {
        let is_string = quote == b'\'' || (quote == b'"' && self.dialect == SqlDialect::MySql);
        if is_string {
            self.mark_unknown();
        }
        self.advance();
        while !self.is_eof() {
            let ch = self.current();
            if ch == b'\\' && is_string && self.dialect == SqlDialect::MySql {
                self.advance();
                self.advance();
            } else if ch == quote {
                self.advance();
                if self.is_eof() || self.current() != quote {
                    return;
                }
                self.advance();
            } else {
                self.advance();
            }
        }
    }

    fn skip_line(&mut self) {
        while !self.is_eof() && self.current() != b'\n' {
            self.advance();
        }
    }

    fn skip_block_comment(&mut self) {
        self.advance();
        self.advance();
        while !self.is_eof() {
            if self.current() == b'*' && self.peek_char() == Some(b'/') {
                self.advance();
                self.advance();
                return;
            }
            self.advance();
        }
    }

    fn scan_word(&mut self) {
        let start = self.pos;
        while !self.is_eof() && (self.current().is_ascii_alphanumeric() || self.current() == b'_') {
            self.advance();
        }
        if self.kind.is_none() {
            self.kind = Some(StatementKind::from_keyword(&self.input[start..self.pos]));
        }
    }

    fn mark_unknown(&mut self) {
        if self.kind.is_none() {
            self.kind = Some(StatementKind::Unknown);
        }
    }

    fn finish_statement(&mut self) {
        if let Some(kind) = self.kind.take() {
            self.statements.push(IdentifiedStatement {
                kind,
                parameters: self.parameters,
            });
        }
        self.parameters = 0;
    }
}
