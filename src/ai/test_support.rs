//! Fake `gemini` executables for exercising the subprocess runner.
//!
//! Every script is written once, before any test spawns a process, so no
//! child can inherit a still-open write handle (which makes exec fail with
//! `ETXTBSY`).

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;
use std::sync::OnceLock;
use tempfile::TempDir;

pub const ECHO_ARGS: &str = "echo_args";
pub const PADDED_OUTPUT: &str = "padded_output";
pub const FAIL_BOOM: &str = "fail_boom";
pub const SLOW: &str = "slow";
pub const LIST_IMAGES: &str = "list_images";

const SCRIPTS: &[(&str, &str)] = &[
    (ECHO_ARGS, "printf '[%s]' \"$@\"\n"),
    (PADDED_OUTPUT, "printf '  \\n  hello from gemini \\n\\n'\n"),
    (FAIL_BOOM, "echo '  boom  ' >&2\nexit 2\n"),
    (SLOW, "sleep 5\necho done\n"),
    (
        LIST_IMAGES,
        "printf '%s' \"$4\" | grep -o '@[^ ]*' | cut -c2- | while read -r f; do\n  if [ -f \"$f\" ]; then echo \"present $f\"; else echo \"missing $f\"; fi\ndone\n",
    ),
];

static SCRIPT_DIR: OnceLock<TempDir> = OnceLock::new();

/// Absolute path of the named fake CLI.
pub fn script(name: &str) -> String {
    let dir = SCRIPT_DIR.get_or_init(|| {
        let dir = TempDir::new().expect("create script dir");
        for (script_name, body) in SCRIPTS {
            let path = dir.path().join(script_name);
            fs::write(&path, format!("#!/bin/sh\n{}", body)).expect("write script");
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("chmod script");
        }
        dir
    });

    let path: PathBuf = dir.path().join(name);
    path.to_string_lossy().into_owned()
}
