//! Date-time codec and field extraction helpers.
//!
//! The API writes every date-time as `YYYY-MM-DD HH:MM:SS` in UTC. Fields are
//! read either from child element text or from element attributes.

use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime};

use crate::error::{ParserError, TimestampError};
use crate::xml::Element;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// True when `value` is exactly `DDDD-DD-DD DD:DD:DD`
fn has_timestamp_shape(value: &str) -> bool {
    const SHAPE: &[u8; 19] = b"9999-99-99 99:99:99";
    value.len() == SHAPE.len()
        && value.bytes().zip(SHAPE).all(|(byte, &expected)| match expected {
            b'9' => byte.is_ascii_digit(),
            sep => byte == sep,
        })
}

/// Parse an API date-time string into epoch seconds.
///
/// Only the zero-padded `YYYY-MM-DD HH:MM:SS` form is accepted.
pub fn parse_timestamp(value: &str) -> Result<i64, TimestampError> {
    if !has_timestamp_shape(value) {
        return Err(TimestampError::Format {
            value: value.to_string(),
        });
    }
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT)
        .map(|dt| dt.and_utc().timestamp())
        .map_err(|_| TimestampError::Format {
            value: value.to_string(),
        })
}

/// Format epoch seconds the way the API expects them in request parameters
pub fn format_timestamp(timestamp: i64) -> Result<String, TimestampError> {
    DateTime::from_timestamp(timestamp, 0)
        .map(|dt| dt.format(TIMESTAMP_FORMAT).to_string())
        .ok_or(TimestampError::OutOfRange { value: timestamp })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Source {
    Children,
    Attributes,
}

/// Typed accessors over one element's fields.
///
/// Absent and empty values read as `None` (or `false` for booleans). A value
/// that is present but does not parse is always an error. The `required_*`
/// variants turn absence into [`ParserError::MissingField`].
#[derive(Debug, Clone, Copy)]
pub struct Fields<'a> {
    element: &'a Element,
    source: Source,
}

impl<'a> Fields<'a> {
    /// Read fields from the text of child elements
    pub fn children(element: &'a Element) -> Self {
        Self {
            element,
            source: Source::Children,
        }
    }

    /// Read fields from the element's attributes
    pub fn attributes(element: &'a Element) -> Self {
        Self {
            element,
            source: Source::Attributes,
        }
    }

    pub fn element(&self) -> &'a Element {
        self.element
    }

    fn raw(&self, name: &str) -> Option<&'a str> {
        let value = match self.source {
            Source::Children => self.element.child_text(name),
            Source::Attributes => self.element.attr(name),
        };
        value.map(str::trim).filter(|v| !v.is_empty())
    }

    fn parsed<T: FromStr>(&self, name: &str) -> Result<Option<T>, ParserError> {
        match self.raw(name) {
            None => Ok(None),
            Some(v) => v.parse().map(Some).map_err(|_| self.invalid(name, v)),
        }
    }

    fn invalid(&self, name: &str, value: &str) -> ParserError {
        ParserError::InvalidField {
            element: self.element.name.clone(),
            field: name.to_string(),
            value: value.to_string(),
        }
    }

    fn missing(&self, name: &str) -> ParserError {
        ParserError::MissingField {
            element: self.element.name.clone(),
            field: name.to_string(),
        }
    }

    pub fn str(&self, name: &str) -> Option<String> {
        self.raw(name).map(str::to_string)
    }

    pub fn int(&self, name: &str) -> Result<Option<i64>, ParserError> {
        self.parsed(name)
    }

    pub fn float(&self, name: &str) -> Result<Option<f64>, ParserError> {
        self.parsed(name)
    }

    /// The literal `1` is true; anything else, including absence, is false
    pub fn bool(&self, name: &str) -> bool {
        self.raw(name) == Some("1")
    }

    pub fn ts(&self, name: &str) -> Result<Option<i64>, ParserError> {
        match self.raw(name) {
            None => Ok(None),
            Some(v) => parse_timestamp(v)
                .map(Some)
                .map_err(|_| self.invalid(name, v)),
        }
    }

    pub fn required_str(&self, name: &str) -> Result<String, ParserError> {
        self.str(name).ok_or_else(|| self.missing(name))
    }

    pub fn required_int(&self, name: &str) -> Result<i64, ParserError> {
        self.int(name)?.ok_or_else(|| self.missing(name))
    }

    pub fn required_float(&self, name: &str) -> Result<f64, ParserError> {
        self.float(name)?.ok_or_else(|| self.missing(name))
    }

    pub fn required_ts(&self, name: &str) -> Result<i64, ParserError> {
        self.ts(name)?.ok_or_else(|| self.missing(name))
    }
}
