//! # API Facade
//!
//! A thin facade over the command layer and the single entry point for every
//! lava operation, whatever the UI.
//!
//! The facade dispatches to `commands/*.rs`, wires in the store, the prompter
//! and the scheduler connection, and returns structured [`CmdResult`]s. It
//! never prints; the only user interaction goes through the injected
//! [`Prompter`].
//!
//! `LavaApi<S: ConfigStore, P: Prompter>` is generic over both seams:
//! production uses `FileStore` with a terminal prompter, tests use
//! `InMemoryStore` with a `ScriptedPrompter`. The scheduler is reached
//! through a connector so tests can swap in an in-memory one.

use crate::commands::{self, CmdResult};
use crate::config::LavaConfig;
use crate::error::Result;
use crate::prompt::Prompter;
use crate::scheduler::xmlrpc::XmlRpcScheduler;
use crate::scheduler::Scheduler;
use crate::store::ConfigStore;
use std::path::Path;

/// Opens a scheduler connection for an endpoint URL.
pub type Connector = Box<dyn Fn(&str) -> Result<Box<dyn Scheduler>>>;

fn connect_xmlrpc(url: &str) -> Result<Box<dyn Scheduler>> {
    Ok(Box::new(XmlRpcScheduler::new(url)?))
}

pub struct LavaApi<S: ConfigStore, P: Prompter> {
    store: S,
    prompter: P,
    config: LavaConfig,
    connect: Connector,
}

impl<S: ConfigStore, P: Prompter> LavaApi<S, P> {
    pub fn new(store: S, prompter: P, config: LavaConfig) -> Self {
        Self {
            store,
            prompter,
            config,
            connect: Box::new(connect_xmlrpc),
        }
    }

    pub fn with_connector<F>(mut self, connect: F) -> Self
    where
        F: Fn(&str) -> Result<Box<dyn Scheduler>> + 'static,
    {
        self.connect = Box::new(connect);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn prompter(&self) -> &P {
        &self.prompter
    }

    pub fn config(&self) -> &LavaConfig {
        &self.config
    }

    pub fn new_job(
        &mut self,
        file: &Path,
        template: Option<&str>,
        tests_dir: Option<&str>,
    ) -> Result<CmdResult> {
        commands::new::run(
            &mut self.store,
            &mut self.prompter,
            self.config.force_interactive,
            file,
            template,
            tests_dir,
        )
    }

    pub fn submit_job(&mut self, file: &Path) -> Result<CmdResult> {
        let scheduler = self.scheduler()?;
        commands::submit::run(&mut self.store, scheduler.as_ref(), file)
    }

    /// Without an id, the user picks one of the stored ids, which is then
    /// forgotten once the job has finished.
    pub fn job_status(&mut self, job_id: Option<&str>) -> Result<CmdResult> {
        let (job_id, picked) = match job_id {
            Some(id) => (id.to_string(), false),
            None => (
                commands::status::pick_job_id(&self.store, &mut self.prompter)?,
                true,
            ),
        };
        let scheduler = self.scheduler()?;
        commands::status::run(&mut self.store, scheduler.as_ref(), &job_id, picked)
    }

    pub fn configure(&mut self, action: commands::config::ConfigAction) -> Result<CmdResult> {
        commands::config::run(&mut self.store, action)
    }

    pub fn templates(&self) -> Result<CmdResult> {
        commands::templates::run()
    }

    fn scheduler(&mut self) -> Result<Box<dyn Scheduler>> {
        let url = commands::submit::resolve_endpoint(
            &mut self.store,
            &mut self.prompter,
            self.config.force_interactive,
        )?;
        (self.connect)(&url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::config::ConfigAction;
    use crate::commands::submit::{RPC_ENDPOINT, SERVER, SERVER_SCHEME};
    use crate::commands::JOBS_ID;
    use crate::prompt::ScriptedPrompter;
    use crate::scheduler::memory::InMemoryScheduler;
    use crate::store::memory::InMemoryStore;
    use crate::store::DEFAULT_NAMESPACE;
    use crate::templates::{BOOT_TEST, DEVICE_TYPE, PREBUILT_IMAGE};
    use std::cell::RefCell;
    use std::fs;
    use std::rc::Rc;
    use tempfile::TempDir;

    fn server_store() -> InMemoryStore {
        InMemoryStore::new()
            .with_value(DEFAULT_NAMESPACE, SERVER_SCHEME, "https")
            .with_value(DEFAULT_NAMESPACE, SERVER, "lava.example.org")
            .with_value("server=lava.example.org", RPC_ENDPOINT, "RPC2")
    }

    fn api(
        store: InMemoryStore,
        answers: &[&str],
    ) -> (LavaApi<InMemoryStore, ScriptedPrompter>, Rc<RefCell<Vec<String>>>) {
        let urls = Rc::new(RefCell::new(Vec::new()));
        let seen = Rc::clone(&urls);
        let api = LavaApi::new(
            store,
            ScriptedPrompter::new(answers.iter().copied()),
            LavaConfig::new("unused.json"),
        )
        .with_connector(move |url| {
            seen.borrow_mut().push(url.to_string());
            Ok(Box::new(
                InMemoryScheduler::new()
                    .starting_at(12)
                    .with_status("12", "Complete", "sha")
                    .with_status("13", "Running", ""),
            ))
        });
        (api, urls)
    }

    #[test]
    fn new_job_dispatches() {
        let temp = TempDir::new().unwrap();
        let store = InMemoryStore::new()
            .with_value(DEFAULT_NAMESPACE, DEVICE_TYPE, "panda")
            .with_value("device_type=panda", PREBUILT_IMAGE, "p.img");
        let (mut api, _) = api(store, &[]);

        let result = api
            .new_job(&temp.path().join("boot"), Some(BOOT_TEST), None)
            .unwrap();

        let path = result.job_file.unwrap();
        assert!(path.ends_with("boot.json"));
        assert!(fs::read_to_string(path).unwrap().contains("\"Boot test\""));
    }

    #[test]
    fn submit_connects_to_resolved_endpoint() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("job.json");
        fs::write(&file, "{\n}\n").unwrap();
        let (mut api, urls) = api(server_store(), &[]);

        let result = api.submit_job(&file).unwrap();

        assert_eq!(result.job_id.as_deref(), Some("12"));
        assert_eq!(*urls.borrow(), vec!["https://lava.example.org/RPC2/"]);
        assert_eq!(
            api.store().get(DEFAULT_NAMESPACE, JOBS_ID).unwrap(),
            Some("12".to_string())
        );
    }

    #[test]
    fn status_with_explicit_id_keeps_list() {
        let store = server_store().with_value(DEFAULT_NAMESPACE, JOBS_ID, "12,13");
        let (mut api, _) = api(store, &[]);

        let result = api.job_status(Some("12")).unwrap();

        assert_eq!(result.job_status.unwrap().status, "complete");
        assert_eq!(
            api.store().get(DEFAULT_NAMESPACE, JOBS_ID).unwrap(),
            Some("12,13".to_string())
        );
    }

    #[test]
    fn status_of_picked_finished_job_forgets_it() {
        let store = server_store().with_value(DEFAULT_NAMESPACE, JOBS_ID, "12,13");
        let (mut api, _) = api(store, &["1"]);

        api.job_status(None).unwrap();

        assert_eq!(
            api.store().get(DEFAULT_NAMESPACE, JOBS_ID).unwrap(),
            Some("13".to_string())
        );
        assert_eq!(api.prompter().prompts, vec!["Job ids: "]);
    }

    #[test]
    fn configure_and_templates_dispatch() {
        let (mut api, _) = api(InMemoryStore::new(), &[]);
        api.configure(ConfigAction::Set {
            namespace: None,
            key: SERVER.into(),
            value: "lava.example.org".into(),
        })
        .unwrap();

        assert_eq!(
            api.store().get(DEFAULT_NAMESPACE, SERVER).unwrap(),
            Some("lava.example.org".to_string())
        );
        assert!(!api.templates().unwrap().templates.is_empty());
    }
}
