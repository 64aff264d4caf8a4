use crate::commands::CmdResult;
use crate::error::Result;
use crate::templates::TEMPLATES;

pub fn run() -> Result<CmdResult> {
    let listed = TEMPLATES.iter().map(|t| (t.name, t.description)).collect();
    Ok(CmdResult::default().with_templates(listed))
}
