use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::store::{ConfigStore, DEFAULT_NAMESPACE};

#[derive(Debug, Clone)]
pub enum ConfigAction {
    ShowAll,
    ShowKey {
        namespace: Option<String>,
        key: String,
    },
    Set {
        namespace: Option<String>,
        key: String,
        value: String,
    },
}

pub fn run<S: ConfigStore + ?Sized>(store: &mut S, action: ConfigAction) -> Result<CmdResult> {
    match action {
        ConfigAction::ShowAll => Ok(CmdResult::default().with_entries(store.entries()?)),
        ConfigAction::ShowKey { namespace, key } => {
            let namespace = namespace.as_deref().unwrap_or(DEFAULT_NAMESPACE);
            let mut result = CmdResult::default();
            match store.get(namespace, &key)? {
                Some(value) => result.add_message(CmdMessage::info(value)),
                None => result.add_message(CmdMessage::warning(format!(
                    "No value stored for '{}' in [{}]",
                    key, namespace
                ))),
            }
            Ok(result)
        }
        ConfigAction::Set {
            namespace,
            key,
            value,
        } => {
            let namespace = namespace.as_deref().unwrap_or(DEFAULT_NAMESPACE);
            store.put(namespace, &key, &value)?;
            let mut result = CmdResult::default();
            result.add_message(CmdMessage::success(format!(
                "{} set to {} in [{}]",
                key, value, namespace
            )));
            Ok(result)
        }
    }
}
