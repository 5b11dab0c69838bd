use std::path::Path;
use std::process::Command;

const SHA_VAR: &str = "RESUMEN_BUILD_SHA";

fn main() {
    println!("cargo:rerun-if-env-changed={SHA_VAR}");

    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".into());
    let repo_root = Path::new(&manifest_dir).join("..");
    let git_head = repo_root.join(".git/HEAD");
    if git_head.exists() {
        println!("cargo:rerun-if-changed={}", git_head.display());
    }

    // Packaged sources have no .git; release scripts pass the SHA in.
    let sha = std::env::var(SHA_VAR)
        .ok()
        .filter(|s| !s.trim().is_empty())
        .or_else(|| git_short_sha(&repo_root))
        .unwrap_or_else(|| "unknown".into());

    println!("cargo:rustc-env={SHA_VAR}={sha}");
}

fn git_short_sha(repo_root: &Path) -> Option<String> {
    let out = Command::new("git")
        .arg("-C")
        .arg(repo_root)
        .args(["rev-parse", "--short=10", "HEAD"])
        .output()
        .ok()?;
    if !out.status.success() {
        return None;
    }
    let sha = String::from_utf8(out.stdout).ok()?;
    let sha = sha.trim();
    (!sha.is_empty()).then(|| sha.to_string())
}
