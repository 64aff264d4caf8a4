//! # Resolver
//!
//! Turns a declared [`Parameter`] into a concrete value. For each parameter:
//!
//! 1. Its dependency, if any and not yet confirmed, is resolved first.
//! 2. A cached value in the store wins, unless the run forces interaction.
//! 3. Otherwise the user is prompted, with the cached value (if any) offered
//!    as the default, and the answer is written back to the store.
//!
//! A parameter confirmed once in a pass (`asked`) is never prompted again in
//! that pass, which is what keeps a template that mentions `device_type` in
//! three places down to a single question.
//!
//! Cached values the parameter can no longer read (a device type that is no
//! longer offered, a malformed scheme) are treated as missing, never as fatal.
//! So are empty ones.

use crate::error::{LavaError, Result};
use crate::parameter::{ParamRef, ParamValue, Parameter, ParameterSet};
use crate::prompt::Prompter;
use crate::store::ConfigStore;
use tracing::{debug, warn};

pub struct Resolver<'p> {
    prompter: &'p mut dyn Prompter,
    force_interactive: bool,
}

impl<'p> Resolver<'p> {
    pub fn new(prompter: &'p mut dyn Prompter) -> Self {
        Self {
            prompter,
            force_interactive: false,
        }
    }

    /// Ask for every parameter even when a cached value exists.
    pub fn force_interactive(mut self, force: bool) -> Self {
        self.force_interactive = force;
        self
    }

    pub fn resolve<S: ConfigStore + ?Sized>(
        &mut self,
        params: &mut ParameterSet,
        param: ParamRef,
        store: &mut S,
    ) -> Result<ParamValue> {
        let mut visiting = Vec::new();
        self.resolve_inner(params, param, store, &mut visiting)
    }

    fn resolve_inner<S: ConfigStore + ?Sized>(
        &mut self,
        params: &mut ParameterSet,
        param: ParamRef,
        store: &mut S,
        visiting: &mut Vec<ParamRef>,
    ) -> Result<ParamValue> {
        if visiting.contains(&param) {
            let chain: Vec<&str> = visiting
                .iter()
                .chain(std::iter::once(&param))
                .map(|r| params[*r].id.as_str())
                .collect();
            return Err(LavaError::Configuration(format!(
                "circular dependency between parameters: {}",
                chain.join(" -> ")
            )));
        }

        if params[param].asked {
            if let Some(value) = &params[param].value {
                return Ok(value.clone());
            }
        }

        visiting.push(param);
        if let Some(dependency) = params[param].depends {
            if !params[dependency].asked {
                self.resolve_inner(params, dependency, store, visiting)?;
            }
        }

        let dependency_value = params[param].depends.and_then(|d| {
            let dependency = &params[d];
            dependency.value.as_ref().map(|v| dependency.serialize(v))
        });
        let parameter = &params[param];
        let candidates = parameter.candidates(dependency_value.as_deref());

        let cached = match store.get_from_backend(params, param)? {
            Some(raw) if raw.trim().is_empty() => {
                debug!(id = %parameter.id, "Stored value is empty");
                None
            }
            Some(raw) => match read_cached(parameter, &raw, candidates.as_deref()) {
                Ok(value) => Some(value),
                Err(LavaError::Mismatch { id, reason }) => {
                    warn!(id = %id, %reason, "Ignoring stored value");
                    None
                }
                Err(e) => return Err(e),
            },
            None => None,
        };

        let value = match cached {
            Some(value) if !self.force_interactive => {
                debug!(id = %parameter.id, "Using cached value");
                value
            }
            cached => {
                let value = parameter.prompt_with(
                    &mut *self.prompter,
                    "",
                    cached.as_ref(),
                    dependency_value.as_deref(),
                )?;
                store.put_parameter(params, param, Some(&value))?;
                value
            }
        };

        let parameter = &mut params[param];
        parameter.value = Some(value.clone());
        parameter.mark_asked();
        visiting.pop();
        Ok(value)
    }
}

fn read_cached(parameter: &Parameter, raw: &str, candidates: Option<&[String]>) -> Result<ParamValue> {
    let value = parameter.deserialize(raw)?;
    if let (Some(candidates), Some(text)) = (candidates, value.as_text()) {
        parameter.check_choice(text, candidates)?;
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::ScriptedPrompter;
    use crate::store::memory::InMemoryStore;
    use crate::store::{StoredEntry, DEFAULT_NAMESPACE};

    /// Counts writes so tests can tell a refresh from a no-op.
    #[derive(Default)]
    struct CountingStore {
        inner: InMemoryStore,
        puts: usize,
    }

    impl ConfigStore for CountingStore {
        fn get(&self, namespace: &str, key: &str) -> Result<Option<String>> {
            self.inner.get(namespace, key)
        }

        fn put(&mut self, namespace: &str, key: &str, value: &str) -> Result<()> {
            self.puts += 1;
            self.inner.put(namespace, key, value)
        }

        fn entries(&self) -> Result<Vec<StoredEntry>> {
            self.inner.entries()
        }
    }

    fn device_and_image() -> (ParameterSet, ParamRef, ParamRef) {
        let mut params = ParameterSet::new();
        let device = params.declare(Parameter::new("device_type"));
        let image = params.declare(Parameter::new("prebuilt_image").depends_on(device));
        (params, device, image)
    }

    #[test]
    fn cached_value_is_used_without_prompting() {
        let mut store = InMemoryStore::new().with_value(DEFAULT_NAMESPACE, "device_type", "panda");
        let (mut params, device, _) = device_and_image();
        let mut prompter = ScriptedPrompter::default();

        let value = Resolver::new(&mut prompter)
            .resolve(&mut params, device, &mut store)
            .unwrap();

        assert_eq!(value, ParamValue::from("panda"));
        assert!(params[device].asked);
        assert!(prompter.prompts.is_empty());
    }

    #[test]
    fn missing_value_is_prompted_and_stored() {
        let mut store = InMemoryStore::new();
        let (mut params, device, _) = device_and_image();
        let mut prompter = ScriptedPrompter::new(["panda"]);

        let value = Resolver::new(&mut prompter)
            .resolve(&mut params, device, &mut store)
            .unwrap();

        assert_eq!(value, ParamValue::from("panda"));
        assert_eq!(
            store.get(DEFAULT_NAMESPACE, "device_type").unwrap(),
            Some("panda".to_string())
        );
    }

    #[test]
    fn dependency_is_resolved_first() {
        let mut store = InMemoryStore::new();
        let (mut params, device, image) = device_and_image();
        let mut prompter = ScriptedPrompter::new(["panda", "/img/panda.img"]);

        let value = Resolver::new(&mut prompter)
            .resolve(&mut params, image, &mut store)
            .unwrap();

        assert_eq!(value, ParamValue::from("/img/panda.img"));
        assert_eq!(prompter.prompts, vec!["device_type: ", "prebuilt_image: "]);
        assert!(params[device].asked);
        assert_eq!(
            store.get("device_type=panda", "prebuilt_image").unwrap(),
            Some("/img/panda.img".to_string())
        );
    }

    #[test]
    fn dependent_cache_is_looked_up_under_dependency_value() {
        let mut store = InMemoryStore::new()
            .with_value(DEFAULT_NAMESPACE, "device_type", "beaglebone")
            .with_value("device_type=panda", "prebuilt_image", "/img/panda.img");
        let (mut params, _, image) = device_and_image();
        let mut prompter = ScriptedPrompter::new(["/img/beagle.img"]);

        let value = Resolver::new(&mut prompter)
            .resolve(&mut params, image, &mut store)
            .unwrap();

        assert_eq!(value, ParamValue::from("/img/beagle.img"));
        assert_eq!(prompter.prompts, vec!["prebuilt_image: "]);
    }

    #[test]
    fn forced_run_offers_cached_value_and_rewrites_it() {
        let mut store = CountingStore::default();
        store.inner = InMemoryStore::new().with_value(DEFAULT_NAMESPACE, "device_type", "panda");
        let (mut params, device, _) = device_and_image();
        let mut prompter = ScriptedPrompter::new([""]);

        let value = Resolver::new(&mut prompter)
            .force_interactive(true)
            .resolve(&mut params, device, &mut store)
            .unwrap();

        assert_eq!(value, ParamValue::from("panda"));
        assert_eq!(prompter.prompts, vec!["device_type [panda]: "]);
        assert_eq!(store.puts, 1);
    }

    #[test]
    fn cache_hit_does_not_write() {
        let mut store = CountingStore::default();
        store.inner = InMemoryStore::new().with_value(DEFAULT_NAMESPACE, "device_type", "panda");
        let (mut params, device, _) = device_and_image();
        let mut prompter = ScriptedPrompter::default();

        Resolver::new(&mut prompter)
            .resolve(&mut params, device, &mut store)
            .unwrap();

        assert_eq!(store.puts, 0);
    }

    #[test]
    fn confirmed_parameter_is_not_asked_twice() {
        let mut store = InMemoryStore::new();
        let (mut params, device, _) = device_and_image();
        let mut prompter = ScriptedPrompter::new(["panda"]);
        let mut resolver = Resolver::new(&mut prompter).force_interactive(true);

        let first = resolver.resolve(&mut params, device, &mut store).unwrap();
        let second = resolver.resolve(&mut params, device, &mut store).unwrap();

        assert_eq!(first, second);
        assert_eq!(prompter.prompts.len(), 1);
    }

    #[test]
    fn preset_value_skips_prompt_and_store() {
        let mut store = InMemoryStore::new();
        let mut params = ParameterSet::new();
        let repo = params.declare(Parameter::new("tar-repo"));
        params[repo].set("/tmp/tests");
        params[repo].mark_asked();
        let mut prompter = ScriptedPrompter::default();

        let value = Resolver::new(&mut prompter)
            .resolve(&mut params, repo, &mut store)
            .unwrap();

        assert_eq!(value, ParamValue::from("/tmp/tests"));
        assert!(store.entries().unwrap().is_empty());
    }

    #[test]
    fn circular_dependency_fails_fast() {
        let mut params = ParameterSet::new();
        let a = params.declare(Parameter::new("a"));
        let b = params.declare(Parameter::new("b").depends_on(a));
        params.link(a, b);
        let mut store = InMemoryStore::new();
        let mut prompter = ScriptedPrompter::new(["x", "y", "z"]);

        let err = Resolver::new(&mut prompter)
            .resolve(&mut params, b, &mut store)
            .unwrap_err();

        match err {
            LavaError::Configuration(msg) => assert!(msg.contains("b -> a -> b"), "{}", msg),
            other => panic!("unexpected error: {other}"),
        }
        assert!(prompter.prompts.is_empty());
    }

    #[test]
    fn unreadable_cache_falls_back_to_prompt() {
        let mut store = InMemoryStore::new().with_value(DEFAULT_NAMESPACE, "url_scheme", "gopher");
        let mut params = ParameterSet::new();
        let scheme = params.declare(Parameter::url_scheme_default());
        let mut prompter = ScriptedPrompter::new(["git"]);

        let value = Resolver::new(&mut prompter)
            .resolve(&mut params, scheme, &mut store)
            .unwrap();

        assert_eq!(value, ParamValue::from("git"));
        assert_eq!(prompter.prompts, vec!["url_scheme: "]);
        assert_eq!(
            store.get(DEFAULT_NAMESPACE, "url_scheme").unwrap(),
            Some("git".to_string())
        );
    }

    #[test]
    fn blank_answer_is_asked_again_and_never_stored() {
        let mut store = InMemoryStore::new();
        let (mut params, device, _) = device_and_image();
        let mut prompter = ScriptedPrompter::new(["", "panda"]);

        let value = Resolver::new(&mut prompter)
            .resolve(&mut params, device, &mut store)
            .unwrap();

        assert_eq!(value, ParamValue::from("panda"));
        assert_eq!(prompter.prompts, vec!["device_type: ", "device_type: "]);
        assert_eq!(
            store.get(DEFAULT_NAMESPACE, "device_type").unwrap(),
            Some("panda".to_string())
        );
    }

    #[test]
    fn blank_answers_until_end_of_input_fail_without_storing() {
        let mut store = InMemoryStore::new();
        let (mut params, _, image) = device_and_image();
        let mut prompter = ScriptedPrompter::new(["", ""]);

        let err = Resolver::new(&mut prompter)
            .resolve(&mut params, image, &mut store)
            .unwrap_err();

        assert!(matches!(err, LavaError::Configuration(_)));
        assert!(store.entries().unwrap().is_empty());
    }

    #[test]
    fn empty_stored_value_is_a_cache_miss() {
        let mut store = CountingStore::default();
        store.inner = InMemoryStore::new()
            .with_value(DEFAULT_NAMESPACE, "device_type", "")
            .with_value("device_type=", "prebuilt_image", "");
        let (mut params, _, image) = device_and_image();
        let mut prompter = ScriptedPrompter::new(["panda", "/img/panda.img"]);

        let value = Resolver::new(&mut prompter)
            .resolve(&mut params, image, &mut store)
            .unwrap();

        assert_eq!(value, ParamValue::from("/img/panda.img"));
        assert_eq!(prompter.prompts, vec!["device_type: ", "prebuilt_image: "]);
        assert_eq!(store.puts, 2);
        assert_eq!(
            store.get(DEFAULT_NAMESPACE, "device_type").unwrap(),
            Some("panda".to_string())
        );
    }

    #[test]
    fn derived_choices_see_resolved_dependency() {
        fn images(device: &str) -> Vec<String> {
            vec![format!("{device}-a.img"), format!("{device}-b.img")]
        }
        let mut params = ParameterSet::new();
        let device = params.declare(Parameter::new("device_type"));
        let image = params.declare(Parameter::derived_choice("image", images).depends_on(device));
        let mut store = InMemoryStore::new().with_value(DEFAULT_NAMESPACE, "device_type", "panda");
        let mut prompter = ScriptedPrompter::new(["2"]);

        let value = Resolver::new(&mut prompter)
            .resolve(&mut params, image, &mut store)
            .unwrap();

        assert_eq!(value, ParamValue::from("panda-b.img"));
        assert_eq!(prompter.lines, vec!["  1. panda-a.img", "  2. panda-b.img"]);
    }

    #[test]
    fn unattended_run_with_everything_cached() {
        let mut store = InMemoryStore::new()
            .with_value(DEFAULT_NAMESPACE, "device_type", "panda")
            .with_value("device_type=panda", "prebuilt_image", "/img/panda.img");
        let (mut params, _, image) = device_and_image();
        let mut prompter = ScriptedPrompter::default();

        let value = Resolver::new(&mut prompter)
            .resolve(&mut params, image, &mut store)
            .unwrap();

        assert_eq!(value, ParamValue::from("/img/panda.img"));
        assert!(prompter.prompts.is_empty());
    }
}
