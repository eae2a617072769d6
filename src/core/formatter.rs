//! Pattern-based record formatter
//!
//! A [`Formatter`] compiles a pattern such as
//! `[%d{%H:%M:%S}][%t][%c][%f:%l][%p]%T%m%n` into a list of [`Directive`]s
//! once, then renders records by walking that list.
//!
//! | token    | output                                                   |
//! |----------|----------------------------------------------------------|
//! | `%d{fmt}`| local timestamp, strftime `fmt` (default `%H:%M:%S`)     |
//! | `%t`     | thread id                                                |
//! | `%c`     | logger name                                              |
//! | `%f`     | source file                                              |
//! | `%l`     | source line                                              |
//! | `%p`     | level name                                               |
//! | `%T`     | tab                                                      |
//! | `%m`     | message payload                                          |
//! | `%n`     | newline                                                  |
//! | `%%`     | literal `%`                                              |
//!
//! # Example
//!
//! ```
//! use rust_async_logger::{Formatter, LogLevel, LogRecord};
//!
//! let formatter = Formatter::new("%p:%m%n").unwrap();
//! let record = LogRecord::new(LogLevel::Info, file!(), line!(), "root", "ready");
//! assert_eq!(formatter.format(&record).unwrap(), "INFO:ready\n");
//! ```

use super::error::{LoggerError, Result};
use super::log_record::LogRecord;
use chrono::format::{Item, StrftimeItems};
use chrono::Local;
use std::fmt::{self, Write};

/// Pattern used when none is configured
pub const DEFAULT_PATTERN: &str = "[%d{%H:%M:%S}][%t][%c][%f:%l][%p]%T%m%n";

/// Sub-format used by a bare `%d`
pub const DEFAULT_TIME_FORMAT: &str = "%H:%M:%S";

/// One compiled unit of a pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    Literal(String),
    Message,
    Level,
    Line,
    Thread,
    Logger,
    File,
    /// Timestamp rendered with a strftime sub-format
    Time(String),
    Tab,
    NewLine,
}

impl Directive {
    fn from_key(key: char, sub_format: Option<String>) -> Result<Self> {
        let directive = match key {
            'd' => {
                let time_format = sub_format.unwrap_or_else(|| DEFAULT_TIME_FORMAT.to_string());
                validate_time_format(&time_format)?;
                Directive::Time(time_format)
            }
            't' => Directive::Thread,
            'c' => Directive::Logger,
            'f' => Directive::File,
            'l' => Directive::Line,
            'p' => Directive::Level,
            'T' => Directive::Tab,
            'm' => Directive::Message,
            'n' => Directive::NewLine,
            other => {
                return Err(LoggerError::config(
                    "Formatter",
                    format!("unrecognized directive '%{}'", other),
                ))
            }
        };
        Ok(directive)
    }

    fn render<W: Write>(&self, out: &mut W, record: &LogRecord<'_>) -> fmt::Result {
        match self {
            Directive::Literal(text) => out.write_str(text),
            Directive::Message => out.write_str(record.payload),
            Directive::Level => out.write_str(record.level.to_str()),
            Directive::Line => write!(out, "{}", record.line),
            Directive::Thread => write!(out, "{:?}", record.thread_id),
            Directive::Logger => out.write_str(record.logger),
            Directive::File => out.write_str(record.file),
            Directive::Time(time_format) => {
                let local = record.timestamp.with_timezone(&Local);
                write!(out, "{}", local.format(time_format))
            }
            Directive::Tab => out.write_char('\t'),
            Directive::NewLine => out.write_char('\n'),
        }
    }
}

fn validate_time_format(time_format: &str) -> Result<()> {
    if StrftimeItems::new(time_format).any(|item| matches!(item, Item::Error)) {
        return Err(LoggerError::config(
            "Formatter",
            format!("invalid timestamp format '{}'", time_format),
        ));
    }
    Ok(())
}

/// Compiled pattern. Immutable and shareable across threads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Formatter {
    pattern: String,
    directives: Vec<Directive>,
}

impl Formatter {
    /// Compile `pattern`
    ///
    /// # Errors
    ///
    /// Returns [`LoggerError::InvalidConfiguration`] for a trailing `%`, an
    /// unclosed `{`, an unknown directive or an invalid timestamp format.
    pub fn new(pattern: impl Into<String>) -> Result<Self> {
        let pattern = pattern.into();
        let directives = parse_pattern(&pattern)?;
        Ok(Self {
            pattern,
            directives,
        })
    }

    /// The source pattern
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// The compiled directives in render order
    pub fn directives(&self) -> &[Directive] {
        &self.directives
    }

    /// Append the rendering of `record` to `out`
    pub fn render<W: Write>(&self, out: &mut W, record: &LogRecord<'_>) -> fmt::Result {
        for directive in &self.directives {
            directive.render(out, record)?;
        }
        Ok(())
    }

    /// Render `record` into a new string
    ///
    /// # Errors
    ///
    /// Returns [`LoggerError::FormatterError`] if a directive fails to render.
    pub fn format(&self, record: &LogRecord<'_>) -> Result<String> {
        let mut out = String::with_capacity(self.pattern.len() + record.payload.len() + 32);
        self.render(&mut out, record)
            .map_err(|_| LoggerError::formatter("pattern", format!("failed to render '{}'", self.pattern)))?;
        Ok(out)
    }
}

impl Default for Formatter {
    fn default() -> Self {
        Self {
            pattern: DEFAULT_PATTERN.to_string(),
            directives: vec![
                Directive::Literal("[".to_string()),
                Directive::Time(DEFAULT_TIME_FORMAT.to_string()),
                Directive::Literal("][".to_string()),
                Directive::Thread,
                Directive::Literal("][".to_string()),
                Directive::Logger,
                Directive::Literal("][".to_string()),
                Directive::File,
                Directive::Literal(":".to_string()),
                Directive::Line,
                Directive::Literal("][".to_string()),
                Directive::Level,
                Directive::Literal("]".to_string()),
                Directive::Tab,
                Directive::Message,
                Directive::NewLine,
            ],
        }
    }
}

fn parse_pattern(pattern: &str) -> Result<Vec<Directive>> {
    let mut directives = Vec::new();
    let mut literal = String::new();
    let mut chars = pattern.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '%' {
            literal.push(c);
            continue;
        }

        let key = chars.next().ok_or_else(|| {
            LoggerError::config(
                "Formatter",
                format!("pattern '{}' ends with an unescaped '%'", pattern),
            )
        })?;
        if key == '%' {
            literal.push('%');
            continue;
        }

        let sub_format = if chars.peek() == Some(&'{') {
            chars.next();
            let mut sub = String::new();
            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(ch) => sub.push(ch),
                    None => {
                        return Err(LoggerError::config(
                            "Formatter",
                            format!("unclosed '{{' in pattern '{}'", pattern),
                        ))
                    }
                }
            }
            Some(sub)
        } else {
            None
        };

        let directive = Directive::from_key(key, sub_format)?;
        if !literal.is_empty() {
            directives.push(Directive::Literal(std::mem::take(&mut literal)));
        }
        directives.push(directive);
    }

    if !literal.is_empty() {
        directives.push(Directive::Literal(literal));
    }
    Ok(directives)
}
