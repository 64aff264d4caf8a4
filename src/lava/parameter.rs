//! # Parameters
//!
//! A [`Parameter`] is a named, user-suppliable value that a job template or a
//! command needs: the device type, the image to boot, the scheduler URL.
//! Resolved values are cached in the configuration store, so each parameter
//! knows how to flatten its value to a single string and how to read it back.
//!
//! ## Variants
//!
//! The set of variants is closed ([`ParameterKind`]):
//!
//! - `Scalar`: a plain string, stored as-is.
//! - `List`: an ordered list of strings, stored comma-joined. Empty elements
//!   are dropped both ways, so `["a", "", "b"]` is stored as `a,b`.
//! - `SingleChoice`: one of a list of candidates, picked from a numbered menu.
//!   Candidates are either fixed or derived from the value of the parameter
//!   this one depends on (see [`Candidates::Derived`]).
//! - `UrlScheme`: one of a known set of URL schemes, picked from a menu or
//!   typed out.
//!
//! ## Dependencies
//!
//! Parameters live in a [`ParameterSet`] and refer to each other through
//! [`ParamRef`] handles. A parameter that `depends` on another is always
//! resolved after it, and its cached value is stored in a namespace keyed on
//! the dependency's value (see `store`).

use crate::error::{LavaError, Result};
use crate::prompt::Prompter;
use std::fmt;
use std::ops::{Index, IndexMut};

/// Separator used when flattening list values for storage.
pub const LIST_SEPARATOR: char = ',';

/// Schemes offered by [`Parameter::url_scheme_default`].
pub const URL_SCHEMES: &[&str] = &["bzr", "file", "git", "http", "https"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Text(String),
    List(Vec<String>),
}

impl ParamValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ParamValue::Text(s) => Some(s),
            ParamValue::List(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            ParamValue::Text(_) => None,
            ParamValue::List(items) => Some(items),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            ParamValue::Text(s) => serde_json::Value::String(s.clone()),
            ParamValue::List(items) => serde_json::Value::Array(
                items
                    .iter()
                    .map(|item| serde_json::Value::String(item.clone()))
                    .collect(),
            ),
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Text(s) => write!(f, "{}", s),
            ParamValue::List(items) => write!(f, "{}", join_list(items)),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Text(value)
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(value: Vec<String>) -> Self {
        ParamValue::List(value)
    }
}

impl From<Vec<&str>> for ParamValue {
    fn from(value: Vec<&str>) -> Self {
        ParamValue::List(value.into_iter().map(str::to_string).collect())
    }
}

/// Handle to a parameter inside a [`ParameterSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParamRef(usize);

#[derive(Debug, Clone)]
pub enum Candidates {
    Fixed(Vec<String>),
    /// Computed from the serialized value of the dependency, e.g. the images
    /// available for a given device type.
    Derived(fn(&str) -> Vec<String>),
}

#[derive(Debug, Clone)]
pub enum ParameterKind {
    Scalar,
    List,
    SingleChoice(Candidates),
    UrlScheme(Vec<String>),
}

#[derive(Debug, Clone)]
pub struct Parameter {
    pub id: String,
    pub value: Option<ParamValue>,
    pub kind: ParameterKind,
    pub depends: Option<ParamRef>,
    /// Set once the value has been confirmed in the current resolution pass.
    pub asked: bool,
}

impl Parameter {
    pub fn new(id: impl Into<String>) -> Self {
        Self::with_kind(id, ParameterKind::Scalar)
    }

    pub fn list(id: impl Into<String>) -> Self {
        Self::with_kind(id, ParameterKind::List)
    }

    pub fn single_choice<I, S>(id: impl Into<String>, candidates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let candidates = candidates.into_iter().map(Into::into).collect();
        Self::with_kind(
            id,
            ParameterKind::SingleChoice(Candidates::Fixed(candidates)),
        )
    }

    pub fn derived_choice(id: impl Into<String>, derive: fn(&str) -> Vec<String>) -> Self {
        Self::with_kind(
            id,
            ParameterKind::SingleChoice(Candidates::Derived(derive)),
        )
    }

    pub fn url_scheme<I, S>(id: impl Into<String>, schemes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let schemes = schemes.into_iter().map(Into::into).collect();
        Self::with_kind(id, ParameterKind::UrlScheme(schemes))
    }

    pub fn url_scheme_default() -> Self {
        Self::url_scheme("url_scheme", URL_SCHEMES.iter().copied())
    }

    fn with_kind(id: impl Into<String>, kind: ParameterKind) -> Self {
        Self {
            id: id.into(),
            value: None,
            kind,
            depends: None,
            asked: false,
        }
    }

    pub fn with_value(mut self, value: impl Into<ParamValue>) -> Self {
        self.set(value);
        self
    }

    pub fn depends_on(mut self, dependency: ParamRef) -> Self {
        self.depends = Some(dependency);
        self
    }

    pub fn set(&mut self, value: impl Into<ParamValue>) {
        self.value = Some(self.coerce(value.into()));
    }

    pub fn mark_asked(&mut self) {
        self.asked = true;
    }

    /// Appends to a list value, turning a missing or text value into a list first.
    pub fn add(&mut self, item: impl Into<String>) {
        let mut items = self.value.take().map(to_list).unwrap_or_default();
        items.push(item.into());
        self.value = Some(ParamValue::List(items));
    }

    /// Removes every occurrence of `item` from a list value. Returns whether
    /// anything was removed.
    pub fn remove(&mut self, item: &str) -> bool {
        let Some(value) = self.value.take() else {
            return false;
        };
        let mut items = to_list(value);
        let before = items.len();
        items.retain(|existing| existing != item);
        let removed = items.len() != before;
        self.value = Some(ParamValue::List(items));
        removed
    }

    pub fn serialize(&self, value: &ParamValue) -> String {
        match value {
            ParamValue::Text(s) => s.clone(),
            ParamValue::List(items) => join_list(items),
        }
    }

    pub fn deserialize(&self, raw: &str) -> Result<ParamValue> {
        match &self.kind {
            ParameterKind::Scalar => Ok(ParamValue::Text(raw.to_string())),
            ParameterKind::List => Ok(ParamValue::List(split_list(raw))),
            ParameterKind::SingleChoice(Candidates::Derived(_)) => {
                Ok(ParamValue::Text(raw.to_string()))
            }
            ParameterKind::SingleChoice(Candidates::Fixed(candidates))
            | ParameterKind::UrlScheme(candidates) => {
                self.check_choice(raw, candidates)?;
                Ok(ParamValue::Text(raw.to_string()))
            }
        }
    }

    /// Like [`Parameter::deserialize`], but for values that may already be
    /// structured. A list handed to a list parameter comes back untouched.
    pub fn coerce(&self, value: ParamValue) -> ParamValue {
        match (&self.kind, value) {
            (ParameterKind::List, ParamValue::Text(raw)) => ParamValue::List(split_list(&raw)),
            (_, value) => value,
        }
    }

    /// Fails with [`LavaError::Mismatch`] when `raw` is not one of `candidates`.
    pub fn check_choice(&self, raw: &str, candidates: &[String]) -> Result<()> {
        if candidates.iter().any(|c| c == raw) {
            Ok(())
        } else {
            Err(LavaError::Mismatch {
                id: self.id.clone(),
                reason: format!("'{}' is not one of: {}", raw, candidates.join(", ")),
            })
        }
    }

    /// Menu entries for choice parameters, `None` for free-form ones.
    pub fn candidates(&self, dependency: Option<&str>) -> Option<Vec<String>> {
        match &self.kind {
            ParameterKind::Scalar | ParameterKind::List => None,
            ParameterKind::SingleChoice(Candidates::Fixed(candidates)) => Some(candidates.clone()),
            ParameterKind::SingleChoice(Candidates::Derived(derive)) => {
                Some(derive(dependency.unwrap_or_default()))
            }
            ParameterKind::UrlScheme(schemes) => Some(schemes.clone()),
        }
    }

    /// Asks the user for a value. With empty input (or end of input) the old
    /// value is returned; `old_value` falls back to the parameter's own value.
    /// Without an old value, empty input asks again and end of input fails.
    pub fn prompt(
        &self,
        prompter: &mut dyn Prompter,
        message: &str,
        old_value: Option<&ParamValue>,
    ) -> Result<ParamValue> {
        self.prompt_with(prompter, message, old_value, None)
    }

    /// [`Parameter::prompt`], with the dependency's serialized value available
    /// to derive the candidate list.
    pub fn prompt_with(
        &self,
        prompter: &mut dyn Prompter,
        message: &str,
        old_value: Option<&ParamValue>,
        dependency: Option<&str>,
    ) -> Result<ParamValue> {
        let old = old_value.or(self.value.as_ref());
        match &self.kind {
            ParameterKind::Scalar => self.prompt_scalar(prompter, message, old),
            ParameterKind::List => self.prompt_list(prompter, message, old),
            ParameterKind::SingleChoice(_) | ParameterKind::UrlScheme(_) => {
                let candidates = self.candidates(dependency).unwrap_or_default();
                self.prompt_choice(prompter, message, old, &candidates)
            }
        }
    }

    fn prompt_scalar(
        &self,
        prompter: &mut dyn Prompter,
        message: &str,
        old: Option<&ParamValue>,
    ) -> Result<ParamValue> {
        let label = self.label(message, old);
        loop {
            let Some(input) = prompter.ask(&label)? else {
                return old.cloned().ok_or_else(|| self.missing());
            };
            let input = input.trim();
            if !input.is_empty() {
                return Ok(ParamValue::Text(input.to_string()));
            }
            if let Some(old) = old {
                return Ok(old.clone());
            }
        }
    }

    fn prompt_list(
        &self,
        prompter: &mut dyn Prompter,
        message: &str,
        old: Option<&ParamValue>,
    ) -> Result<ParamValue> {
        prompter.say(&format!(
            "Enter values for '{}', one per line. An empty line finishes.",
            self.id
        ))?;

        let mut items = Vec::new();
        loop {
            let label = if items.is_empty() {
                self.label(message, old)
            } else {
                self.label(message, None)
            };
            match prompter.ask(&label)? {
                Some(input) if !input.trim().is_empty() => items.push(input.trim().to_string()),
                // A list needs at least one value when there is nothing to keep.
                Some(_) if items.is_empty() && old.is_none() => continue,
                Some(_) => break,
                None if items.is_empty() => return old.cloned().ok_or_else(|| self.missing()),
                None => break,
            }
        }

        match old {
            Some(old) if items.is_empty() => Ok(old.clone()),
            _ => Ok(ParamValue::List(items)),
        }
    }

    fn prompt_choice(
        &self,
        prompter: &mut dyn Prompter,
        message: &str,
        old: Option<&ParamValue>,
        candidates: &[String],
    ) -> Result<ParamValue> {
        if candidates.is_empty() && old.is_none() {
            return Err(LavaError::Configuration(format!(
                "'{}' has no candidates to choose from",
                self.id
            )));
        }

        for (i, candidate) in candidates.iter().enumerate() {
            prompter.say(&format!("  {}. {}", i + 1, candidate))?;
        }

        let accepts_names = matches!(self.kind, ParameterKind::UrlScheme(_));
        let label = self.label(message, old);
        loop {
            let Some(input) = prompter.ask(&label)? else {
                return old.cloned().ok_or_else(|| self.missing());
            };
            let input = input.trim();

            if input.is_empty() {
                if let Some(old) = old {
                    return Ok(old.clone());
                }
                continue;
            }

            if candidates.is_empty() {
                prompter.say(&format!(
                    "Nothing to choose from for '{}'. Press Enter to keep the current value.",
                    self.id
                ))?;
                continue;
            }

            if let Ok(n) = input.parse::<usize>() {
                if (1..=candidates.len()).contains(&n) {
                    return Ok(ParamValue::Text(candidates[n - 1].clone()));
                }
            } else if accepts_names && candidates.iter().any(|c| c == input) {
                return Ok(ParamValue::Text(input.to_string()));
            }

            prompter.say(&format!(
                "Please choose a number between 1 and {}.",
                candidates.len()
            ))?;
        }
    }

    fn label(&self, message: &str, old: Option<&ParamValue>) -> String {
        let base = if message.trim().is_empty() {
            self.id.as_str()
        } else {
            message.trim_end().trim_end_matches(':')
        };
        match old {
            Some(old) => format!("{} [{}]: ", base, self.serialize(old)),
            None => format!("{}: ", base),
        }
    }

    /// Same kind, same candidates and same dependency.
    fn same_shape(&self, other: &Parameter) -> bool {
        let same_kind = match (&self.kind, &other.kind) {
            (ParameterKind::Scalar, ParameterKind::Scalar)
            | (ParameterKind::List, ParameterKind::List)
            | (
                ParameterKind::SingleChoice(Candidates::Derived(_)),
                ParameterKind::SingleChoice(Candidates::Derived(_)),
            ) => true,
            (
                ParameterKind::SingleChoice(Candidates::Fixed(a)),
                ParameterKind::SingleChoice(Candidates::Fixed(b)),
            )
            | (ParameterKind::UrlScheme(a), ParameterKind::UrlScheme(b)) => a == b,
            _ => false,
        };
        same_kind && self.depends == other.depends
    }

    fn missing(&self) -> LavaError {
        LavaError::Configuration(format!("no value provided for '{}'", self.id))
    }
}

/// Arena owning every parameter of a job (or a command). Declaring the same
/// id twice yields the same handle, so a template can reference one logical
/// parameter in several places.
#[derive(Debug, Clone, Default)]
pub struct ParameterSet {
    params: Vec<Parameter>,
}

impl ParameterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declare(&mut self, parameter: Parameter) -> ParamRef {
        if let Some(existing) = self.find(&parameter.id) {
            debug_assert!(
                self[existing].same_shape(&parameter),
                "parameter '{}' declared twice with different kinds or dependencies",
                parameter.id
            );
            return existing;
        }
        self.params.push(parameter);
        ParamRef(self.params.len() - 1)
    }

    pub fn find(&self, id: &str) -> Option<ParamRef> {
        self.params.iter().position(|p| p.id == id).map(ParamRef)
    }

    pub fn get(&self, id: &str) -> Option<&Parameter> {
        self.find(id).map(|r| &self.params[r.0])
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Parameter> {
        self.find(id).map(|r| &mut self.params[r.0])
    }

    /// Makes `dependent` depend on `dependency`. No cycle check happens here;
    /// the resolver rejects cycles when it walks them.
    pub fn link(&mut self, dependent: ParamRef, dependency: ParamRef) {
        self.params[dependent.0].depends = Some(dependency);
    }

}

impl Index<ParamRef> for ParameterSet {
    type Output = Parameter;

    fn index(&self, index: ParamRef) -> &Parameter {
        &self.params[index.0]
    }
}

impl IndexMut<ParamRef> for ParameterSet {
    fn index_mut(&mut self, index: ParamRef) -> &mut Parameter {
        &mut self.params[index.0]
    }
}

fn join_list(items: &[String]) -> String {
    items
        .iter()
        .filter(|item| !item.is_empty())
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(&LIST_SEPARATOR.to_string())
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(LIST_SEPARATOR)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn to_list(value: ParamValue) -> Vec<String> {
    match value {
        ParamValue::Text(raw) => split_list(&raw),
        ParamValue::List(items) => items,
    }
}
