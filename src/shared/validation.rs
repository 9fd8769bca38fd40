//! Validation Utilities
//!
//! Helpers shared by every entity validator: conversion of `validator`
//! failures into the error taxonomy, string normalization, slug derivation
//! and id parsing.

use chrono::NaiveDate;
use validator::{Validate, ValidationErrors};

use super::error::{AppError, FieldError};
use super::object_id::ObjectId;

/// Convert validation errors to AppError
pub fn validation_error(errors: ValidationErrors) -> AppError {
    let mut field_errors: Vec<FieldError> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            let field = to_camel_case(field);
            errs.iter().map(move |e| FieldError {
                field: field.clone(),
                message: e
                    .message
                    .clone()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid value ({})", e.code)),
            })
        })
        .collect();

    // field_errors() is backed by a HashMap
    field_errors.sort_by(|a, b| a.field.cmp(&b.field));

    AppError::validation(field_errors)
}

/// Run the derived validator on `input`.
pub fn validate<T: Validate>(input: &T) -> Result<(), AppError> {
    input.validate().map_err(validation_error)
}

/// Parse a raw id, failing with a validation error before any lookup happens.
pub fn parse_object_id(raw: &str) -> Result<ObjectId, AppError> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::invalid_field("id", "Invalid id format"))
}

/// Lowercase, hyphenated, URL-safe form of `text`.
///
/// Letters and digits of any script are kept, lowercased. Runs of anything
/// else collapse into a single `-`; leading and trailing hyphens are dropped.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_hyphen = false;

    for c in text.chars() {
        if c.is_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.extend(c.to_lowercase());
        } else {
            pending_hyphen = true;
        }
    }

    slug
}

pub fn trimmed(value: String) -> String {
    let trimmed = value.trim();
    if trimmed.len() == value.len() {
        value
    } else {
        trimmed.to_string()
    }
}

/// Trim an optional string, treating blank as absent.
pub fn trimmed_opt(value: Option<String>) -> Option<String> {
    value.map(trimmed).filter(|v| !v.is_empty())
}

/// Trim list entries, drop blanks and duplicates, keep first-seen order.
pub fn normalize_list(values: Vec<String>) -> Vec<String> {
    let mut seen = Vec::with_capacity(values.len());
    for value in values.into_iter().map(trimmed) {
        if !value.is_empty() && !seen.contains(&value) {
            seen.push(value);
        }
    }
    seen
}

/// Reject an end date that lies before its start date.
pub fn check_date_range(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<(), AppError> {
    match (start, end) {
        (Some(start), Some(end)) if end < start => Err(AppError::invalid_field(
            "endDate",
            "End date must not be before start date",
        )),
        _ => Ok(()),
    }
}

fn to_camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = !out.is_empty();
        } else if upper {
            out.push(c.to_ascii_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}
