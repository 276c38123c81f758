use std::path::{Path, PathBuf};
use std::process::Command;

/// Files whose change means HEAD moved: `HEAD` itself, the branch it points
/// at and `packed-refs`.
fn head_inputs(git_dir: &Path) -> Vec<PathBuf> {
    let head = git_dir.join("HEAD");
    let mut inputs = vec![git_dir.join("packed-refs")];
    if let Ok(contents) = std::fs::read_to_string(&head) {
        if let Some(reference) = contents.trim().strip_prefix("ref: ") {
            inputs.push(git_dir.join(reference));
        }
    }
    inputs.push(head);
    inputs
}

fn short_sha(workspace: &Path) -> Option<String> {
    let out = Command::new("git")
        .arg("-C")
        .arg(workspace)
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()?;
    if !out.status.success() {
        return None;
    }
    let sha = String::from_utf8_lossy(&out.stdout).trim().to_string();
    (!sha.is_empty()).then_some(sha)
}

fn main() {
    let manifest_dir = PathBuf::from(std::env::var("CARGO_MANIFEST_DIR").unwrap_or_default());
    let workspace = manifest_dir.parent().unwrap_or(&manifest_dir).to_path_buf();

    let git_dir = workspace.join(".git");
    if git_dir.is_dir() {
        for input in head_inputs(&git_dir) {
            println!("cargo:rerun-if-changed={}", input.display());
        }
    }
    println!("cargo:rerun-if-changed=build.rs");

    let sha = short_sha(&workspace).unwrap_or_else(|| "unknown".to_string());
    println!("cargo:rustc-env=DESGLOSE_BUILD_SHA={sha}");
}
