//! # Job Documents
//!
//! A [`Job`] is a JSON-shaped tree ([`Node`]) in which some leaves are
//! parameter placeholders instead of values. Filling the job walks the tree
//! depth-first, in document order, and replaces every placeholder with the
//! value the [`Resolver`] produces for it.
//!
//! Document order matters: a placeholder for `device_type` that appears before
//! `prebuilt_image` gets asked first. Dependencies are still honoured when a
//! template lists them the other way around, since the resolver always settles
//! a dependency before its dependent.
//!
//! The parameters themselves live in the job's [`ParameterSet`]; placeholders
//! only hold handles. Two placeholders with the same handle are one logical
//! parameter and are asked about once.

use crate::error::{LavaError, Result};
use crate::parameter::{ParamRef, Parameter, ParameterSet};
use crate::resolver::Resolver;
use crate::store::ConfigStore;
use serde::Serialize;
use serde_json::ser::Formatter;
use serde_json::Value;
use std::io::{self, Write};
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Value(Value),
    /// Entries keep their insertion order.
    Map(Vec<(String, Node)>),
    Seq(Vec<Node>),
    Param(ParamRef),
}

impl Node {
    pub fn map<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Node)>,
    {
        Node::Map(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn seq<I: IntoIterator<Item = Node>>(items: I) -> Self {
        Node::Seq(items.into_iter().collect())
    }

    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Object(map) => Node::Map(
                map.iter()
                    .map(|(k, v)| (k.clone(), Node::from_json(v)))
                    .collect(),
            ),
            Value::Array(items) => Node::Seq(items.iter().map(Node::from_json).collect()),
            other => Node::Value(other.clone()),
        }
    }

    /// Looks up a direct child of a map node.
    pub fn get(&self, key: &str) -> Option<&Node> {
        match self {
            Node::Map(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    fn render(&self, params: &ParameterSet) -> Result<Value> {
        match self {
            Node::Value(value) => Ok(value.clone()),
            Node::Map(entries) => {
                let mut map = serde_json::Map::new();
                for (key, child) in entries {
                    map.insert(key.clone(), child.render(params)?);
                }
                Ok(Value::Object(map))
            }
            Node::Seq(items) => Ok(Value::Array(
                items
                    .iter()
                    .map(|item| item.render(params))
                    .collect::<Result<_>>()?,
            )),
            Node::Param(param) => Err(LavaError::Configuration(format!(
                "parameter '{}' has not been filled in",
                params[*param].id
            ))),
        }
    }

    fn fill<S: ConfigStore + ?Sized>(
        &mut self,
        params: &mut ParameterSet,
        resolver: &mut Resolver<'_>,
        store: &mut S,
    ) -> Result<()> {
        match self {
            Node::Param(param) => {
                let param = *param;
                let value = resolver.resolve(params, param, store)?;
                debug!(id = %params[param].id, "Filled placeholder");
                *self = Node::Value(value.to_json());
            }
            Node::Map(entries) => {
                for (_, child) in entries.iter_mut() {
                    child.fill(params, resolver, store)?;
                }
            }
            Node::Seq(items) => {
                for item in items.iter_mut() {
                    item.fill(params, resolver, store)?;
                }
            }
            Node::Value(_) => {}
        }
        Ok(())
    }
}

impl From<&str> for Node {
    fn from(value: &str) -> Self {
        Node::Value(Value::String(value.to_string()))
    }
}

impl From<String> for Node {
    fn from(value: String) -> Self {
        Node::Value(Value::String(value))
    }
}

impl From<u64> for Node {
    fn from(value: u64) -> Self {
        Node::Value(Value::from(value))
    }
}

impl From<bool> for Node {
    fn from(value: bool) -> Self {
        Node::Value(Value::Bool(value))
    }
}

impl From<Value> for Node {
    fn from(value: Value) -> Self {
        Node::Value(value)
    }
}

impl From<ParamRef> for Node {
    fn from(param: ParamRef) -> Self {
        Node::Param(param)
    }
}

#[derive(Debug, Clone)]
pub struct Job {
    data: Node,
    params: ParameterSet,
}

impl Job {
    pub fn new(data: Node, params: ParameterSet) -> Self {
        Self { data, params }
    }

    /// A job from a plain document. The document is copied, never borrowed.
    pub fn from_value(template: &Value) -> Self {
        Self::new(Node::from_json(template), ParameterSet::new())
    }

    /// The document as JSON. Fails while placeholders are left.
    pub fn data(&self) -> Result<Value> {
        self.data.render(&self.params)
    }

    pub fn parameters(&self) -> &ParameterSet {
        &self.params
    }

    pub fn parameter_mut(&mut self, id: &str) -> Option<&mut Parameter> {
        self.params.get_mut(id)
    }

    /// Replaces every placeholder with its resolved value. Filling an already
    /// filled job changes nothing.
    pub fn fill_in<S: ConfigStore + ?Sized>(
        &mut self,
        resolver: &mut Resolver<'_>,
        store: &mut S,
    ) -> Result<()> {
        self.data.fill(&mut self.params, resolver, store)
    }

    /// Writes the document as indented JSON followed by a newline.
    pub fn write<W: Write>(&self, mut writer: W) -> Result<()> {
        let data = self.data()?;
        let mut serializer = serde_json::Serializer::with_formatter(&mut writer, JobFormatter::default());
        data.serialize(&mut serializer)?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}

/// Two-space indented JSON. Unlike serde_json's pretty printer, objects always
/// break after the opening brace, so even `{}` comes out as `{\n}`.
#[derive(Default)]
struct JobFormatter {
    depth: usize,
    has_value: bool,
}

impl JobFormatter {
    fn indent<W: ?Sized + Write>(&self, writer: &mut W) -> io::Result<()> {
        for _ in 0..self.depth {
            writer.write_all(b"  ")?;
        }
        Ok(())
    }
}

impl Formatter for JobFormatter {
    fn begin_array<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.depth += 1;
        self.has_value = false;
        writer.write_all(b"[")
    }

    fn end_array<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.depth -= 1;
        if self.has_value {
            writer.write_all(b"\n")?;
            self.indent(writer)?;
        }
        writer.write_all(b"]")
    }

    fn begin_array_value<W: ?Sized + Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        writer.write_all(if first { &b"\n"[..] } else { &b",\n"[..] })?;
        self.indent(writer)
    }

    fn end_array_value<W: ?Sized + Write>(&mut self, _writer: &mut W) -> io::Result<()> {
        self.has_value = true;
        Ok(())
    }

    fn begin_object<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.depth += 1;
        self.has_value = false;
        writer.write_all(b"{")
    }

    fn end_object<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.depth -= 1;
        writer.write_all(b"\n")?;
        self.indent(writer)?;
        writer.write_all(b"}")
    }

    fn begin_object_key<W: ?Sized + Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        writer.write_all(if first { &b"\n"[..] } else { &b",\n"[..] })?;
        self.indent(writer)
    }

    fn begin_object_value<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        writer.write_all(b": ")
    }

    fn end_object_value<W: ?Sized + Write>(&mut self, _writer: &mut W) -> io::Result<()> {
        self.has_value = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameter::ParamValue;
    use crate::prompt::ScriptedPrompter;
    use crate::store::memory::InMemoryStore;
    use crate::store::DEFAULT_NAMESPACE;
    use serde_json::json;

    fn written(job: &Job) -> String {
        let mut out = Vec::new();
        job.write(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn twice_device_job() -> Job {
        let mut params = ParameterSet::new();
        let device = params.declare(Parameter::new("device_type"));
        let again = params.declare(Parameter::new("device_type"));
        let data = Node::map([
            ("device_type", Node::from(device)),
            (
                "actions",
                Node::seq([Node::map([("target", Node::from(again))])]),
            ),
        ]);
        Job::new(data, params)
    }

    #[test]
    fn from_value_copies_template() {
        let template = json!({});
        let job = Job::from_value(&template);
        assert_eq!(job.data().unwrap(), template);
    }

    #[test]
    fn write_round_trips() {
        let orig = json!({"foo": "bar"});
        let job = Job::from_value(&orig);
        let parsed: Value = serde_json::from_str(&written(&job)).unwrap();
        assert_eq!(parsed, orig);
    }

    #[test]
    fn writes_nicely_formatted_json() {
        let job = Job::from_value(&json!({"foo": "bar"}));
        assert_eq!(written(&job), "{\n  \"foo\": \"bar\"\n}\n");
    }

    #[test]
    fn empty_document_still_breaks_after_brace() {
        let job = Job::from_value(&json!({}));
        assert!(written(&job).starts_with("{\n"));
    }

    #[test]
    fn rewriting_parsed_output_is_byte_identical() {
        let doc = json!({
            "job_name": "nested",
            "timeout": 18000,
            "empty_map": {},
            "empty_list": [],
            "actions": [{"command": "boot", "parameters": {"list": ["a", "b"], "flag": true}}]
        });
        let first = written(&Job::from_value(&doc));
        let reparsed: Value = serde_json::from_str(&first).unwrap();
        let second = written(&Job::from_value(&reparsed));
        assert_eq!(first, second);
    }

    #[test]
    fn keys_keep_template_order() {
        let job = Job::new(
            Node::map([("zeta", Node::from(1u64)), ("alpha", Node::from(2u64))]),
            ParameterSet::new(),
        );
        assert_eq!(written(&job), "{\n  \"zeta\": 1,\n  \"alpha\": 2\n}\n");
    }

    #[test]
    fn unfilled_job_cannot_be_written() {
        let job = twice_device_job();
        let mut out = Vec::new();
        assert!(matches!(job.write(&mut out), Err(LavaError::Configuration(_))));
    }

    #[test]
    fn repeated_parameter_is_asked_once() {
        let mut job = twice_device_job();
        let mut store = InMemoryStore::new();
        let mut prompter = ScriptedPrompter::new(["panda", "beaglebone"]);

        job.fill_in(&mut Resolver::new(&mut prompter), &mut store).unwrap();

        assert_eq!(prompter.prompts.len(), 1);
        let data = job.data().unwrap();
        assert_eq!(data["device_type"], "panda");
        assert_eq!(data["actions"][0]["target"], "panda");
    }

    #[test]
    fn second_fill_changes_nothing() {
        let mut job = twice_device_job();
        let mut store = InMemoryStore::new().with_value(DEFAULT_NAMESPACE, "device_type", "panda");
        let mut prompter = ScriptedPrompter::default();
        let mut resolver = Resolver::new(&mut prompter).force_interactive(true);

        job.fill_in(&mut resolver, &mut store).unwrap();
        let once = job.data().unwrap();
        job.fill_in(&mut resolver, &mut store).unwrap();

        assert_eq!(job.data().unwrap(), once);
        assert_eq!(prompter.prompts.len(), 1);
    }

    #[test]
    fn list_values_become_arrays() {
        let mut params = ParameterSet::new();
        let urls = params.declare(Parameter::list("testdef_urls"));
        let mut job = Job::new(Node::map([("testdef_urls", Node::from(urls))]), params);
        let mut store = InMemoryStore::new().with_value(DEFAULT_NAMESPACE, "testdef_urls", "a.yaml,b.yaml");
        let mut prompter = ScriptedPrompter::default();

        job.fill_in(&mut Resolver::new(&mut prompter), &mut store).unwrap();

        assert_eq!(job.data().unwrap(), json!({"testdef_urls": ["a.yaml", "b.yaml"]}));
    }

    #[test]
    fn preset_parameter_is_used_as_is() {
        let mut job = twice_device_job();
        let device = job.parameter_mut("device_type").unwrap();
        device.set("vexpress");
        device.mark_asked();
        let mut store = InMemoryStore::new();
        let mut prompter = ScriptedPrompter::default();

        job.fill_in(&mut Resolver::new(&mut prompter), &mut store).unwrap();

        assert_eq!(job.data().unwrap()["device_type"], "vexpress");
        assert_eq!(
            job.parameters().get("device_type").unwrap().value,
            Some(ParamValue::from("vexpress"))
        );
    }
}
