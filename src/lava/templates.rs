//! Named job templates.
//!
//! Every lookup builds a fresh [`Job`], so filling one never leaks into the
//! next. All templates start with the device type and deploy a prebuilt
//! image; the image is cached per device type.

use crate::error::{LavaError, Result};
use crate::job::{Job, Node};
use crate::parameter::{ParamRef, Parameter, ParameterSet};

pub const DEVICE_TYPE: &str = "device_type";
pub const PREBUILT_IMAGE: &str = "prebuilt_image";
pub const TESTDEF_URLS: &str = "testdef_urls";
pub const TESTDEF_REPOS_TAR_REPO: &str = "tar-repo";
pub const TESTDEF_REPOS_GIT_REPO: &str = "git-repo";
pub const TESTDEF_FILE: &str = "testdef";

pub const BOOT_TEST: &str = "boot-test";
pub const LAVA_TEST_SHELL: &str = "lava-test-shell";
pub const LAVA_TEST_SHELL_TAR_REPO: &str = "lava-test-shell-tar-repo";
pub const LAVA_TEST_SHELL_GIT: &str = "lava-test-shell-git";

pub const DEFAULT_TEMPLATE: &str = LAVA_TEST_SHELL;

const JOB_TIMEOUT: u64 = 18000;
const TEST_SHELL_TIMEOUT: u64 = 1800;

pub struct TemplateInfo {
    pub name: &'static str,
    pub description: &'static str,
    build: fn() -> Job,
}

pub const TEMPLATES: &[TemplateInfo] = &[
    TemplateInfo {
        name: BOOT_TEST,
        description: "Deploy a prebuilt image and boot it",
        build: boot_test,
    },
    TemplateInfo {
        name: LAVA_TEST_SHELL,
        description: "Run test definitions fetched from URLs",
        build: lava_test_shell,
    },
    TemplateInfo {
        name: LAVA_TEST_SHELL_TAR_REPO,
        description: "Run test definitions from a local tarball repository",
        build: lava_test_shell_tar_repo,
    },
    TemplateInfo {
        name: LAVA_TEST_SHELL_GIT,
        description: "Run a test definition from a git repository",
        build: lava_test_shell_git,
    },
];

pub fn lookup(name: &str) -> Result<Job> {
    TEMPLATES
        .iter()
        .find(|t| t.name == name)
        .map(|t| (t.build)())
        .ok_or_else(|| {
            let known: Vec<_> = TEMPLATES.iter().map(|t| t.name).collect();
            LavaError::Configuration(format!(
                "unknown job template '{}' (known: {})",
                name,
                known.join(", ")
            ))
        })
}

fn device_and_image(params: &mut ParameterSet) -> (ParamRef, ParamRef) {
    let device = params.declare(Parameter::new(DEVICE_TYPE));
    let image = params.declare(Parameter::new(PREBUILT_IMAGE).depends_on(device));
    (device, image)
}

fn deploy(image: ParamRef) -> Node {
    Node::map([
        ("command", Node::from("deploy_linaro_image")),
        ("parameters", Node::map([("image", Node::from(image))])),
    ])
}

fn test_shell(parameters: Vec<(&str, Node)>) -> Node {
    let mut all = vec![("timeout", Node::from(TEST_SHELL_TIMEOUT))];
    all.extend(parameters);
    Node::map([
        ("command", Node::from("lava_test_shell")),
        ("parameters", Node::map(all)),
    ])
}

fn job(name: &str, device: ParamRef, actions: Vec<Node>, params: ParameterSet) -> Job {
    let data = Node::map([
        ("job_name", Node::from(name)),
        ("device_type", Node::from(device)),
        ("timeout", Node::from(JOB_TIMEOUT)),
        ("actions", Node::Seq(actions)),
    ]);
    Job::new(data, params)
}

fn boot_test() -> Job {
    let mut params = ParameterSet::new();
    let (device, image) = device_and_image(&mut params);
    let actions = vec![
        deploy(image),
        Node::map([("command", Node::from("boot_linaro_image"))]),
    ];
    job("Boot test", device, actions, params)
}

fn lava_test_shell() -> Job {
    let mut params = ParameterSet::new();
    let (device, image) = device_and_image(&mut params);
    let urls = params.declare(Parameter::list(TESTDEF_URLS));
    let actions = vec![
        deploy(image),
        test_shell(vec![("testdef_urls", Node::from(urls))]),
    ];
    job("LAVA Test Shell", device, actions, params)
}

fn lava_test_shell_tar_repo() -> Job {
    let mut params = ParameterSet::new();
    let (device, image) = device_and_image(&mut params);
    let tar_repo = params.declare(Parameter::new(TESTDEF_REPOS_TAR_REPO));
    let repos = Node::seq([Node::map([(TESTDEF_REPOS_TAR_REPO, Node::from(tar_repo))])]);
    let actions = vec![deploy(image), test_shell(vec![("testdef_repos", repos)])];
    job("LAVA Test Shell", device, actions, params)
}

fn lava_test_shell_git() -> Job {
    let mut params = ParameterSet::new();
    let (device, image) = device_and_image(&mut params);
    let repo = params.declare(Parameter::new(TESTDEF_REPOS_GIT_REPO));
    // Remembered per repository.
    let testdef = params.declare(Parameter::new(TESTDEF_FILE).depends_on(repo));
    let repos = Node::seq([Node::map([
        (TESTDEF_REPOS_GIT_REPO, Node::from(repo)),
        (TESTDEF_FILE, Node::from(testdef)),
    ])]);
    let actions = vec![deploy(image), test_shell(vec![("testdef_repos", repos)])];
    job("LAVA Test Shell", device, actions, params)
}
