use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

const RETRY_PATCH: &str = "\
diff --git a/net/retry.py b/net/retry.py
index 1111111..2222222 100644
--- a/net/retry.py
+++ b/net/retry.py
@@ -1,6 +1,9 @@
-import time
+import asyncio
 def fetch(url):
-    while True:
+    for attempt in range(5):
         try:
             return get(url)
-        except:
+        except ConnectionError as exc:
+            if attempt == 4:
+                raise FetchError
diff --git a/setup.cfg b/setup.cfg
--- a/setup.cfg
+++ b/setup.cfg
@@ -1 +1 @@
-import = nothing
+if = nothing
";

const DOCS_PATCH: &str = "\
diff --git a/docs/index.md b/docs/index.md
--- a/docs/index.md
+++ b/docs/index.md
@@ -1 +1 @@
-for the record
+while we wait:
";

fn workspace() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("PR_DATA");
    std::fs::create_dir(&data).unwrap();
    std::fs::write(data.join("101.patch"), RETRY_PATCH).unwrap();
    std::fs::write(data.join("102.patch"), DOCS_PATCH).unwrap();
    dir
}

fn patchscan(dir: &Path, args: &[&str], stdin: &str) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_patchscan"))
        .args(args)
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(stdin.as_bytes())
        .unwrap();
    child.wait_with_output().unwrap()
}

#[test]
fn analyze_writes_records_for_matching_patches_only() {
    let dir = workspace();
    let output = patchscan(dir.path(), &["analyze", "--no-plot"], "");
    assert!(
        output.status.success(),
        "analyze failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let content = std::fs::read_to_string(dir.path().join("extract.json")).unwrap();
    let doc: serde_json::Value = serde_json::from_str(&content).unwrap();
    let sets = doc.as_array().unwrap();
    assert_eq!(sets.len(), 1);
    assert_eq!(sets[0]["file_name"], "101.patch");

    let changes = sets[0]["changes"].as_array().unwrap();
    let kinds: Vec<&str> = changes
        .iter()
        .map(|c| c["keywords"].as_str().unwrap())
        .collect();
    assert_eq!(
        kinds,
        vec!["import", "import", "while", "for", "except", "except", "if", "raise"]
    );

    let bare_except = &changes[4];
    assert_eq!(bare_except["action"], "removed");
    assert_eq!(bare_except["exception_type"], "general");

    let for_loop = &changes[3];
    assert_eq!(for_loop["value"], "attempt");
    assert_eq!(for_loop["loop_entity"], "range(5)");
    assert!(for_loop["condition"].is_null());

    for change in changes {
        assert_eq!(change.as_object().unwrap().len(), 7);
    }

    assert!(!dir.path().join("analysis.svg").exists());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Skipping chart."));
    assert!(stdout.contains("keyword"));
}

#[test]
fn piped_yes_renders_chart() {
    let dir = workspace();
    let output = patchscan(dir.path(), &["analyze", "PR_DATA"], "YES\n");
    assert!(output.status.success());
    let svg = std::fs::read_to_string(dir.path().join("analysis.svg")).unwrap();
    assert!(svg.contains("Repository patch analysis"));
    assert!(svg.contains("Deletions"));
}

#[test]
fn piped_other_answer_skips_chart() {
    let dir = workspace();
    let output = patchscan(dir.path(), &["analyze"], "nope\n");
    assert!(output.status.success());
    assert!(!dir.path().join("analysis.svg").exists());
}

#[test]
fn output_flags_override_config() {
    let dir = workspace();
    std::fs::write(
        dir.path().join(".patchscan.toml"),
        "[output]\nextract_path = \"from-config.json\"\n",
    )
    .unwrap();

    let output = patchscan(
        dir.path(),
        &["analyze", "--plot", "--output", "out/records.json", "--chart", "out/chart.svg"],
        "",
    );
    assert!(output.status.success());
    assert!(dir.path().join("out/records.json").exists());
    assert!(dir.path().join("out/chart.svg").exists());
    assert!(!dir.path().join("from-config.json").exists());
}

#[test]
fn config_extensions_widen_tracking() {
    let dir = workspace();
    std::fs::write(
        dir.path().join(".patchscan.toml"),
        "[scan]\nextensions = [\"py\", \"md\"]\n",
    )
    .unwrap();

    let output = patchscan(dir.path(), &["analyze", "--no-plot"], "");
    assert!(output.status.success());
    let content = std::fs::read_to_string(dir.path().join("extract.json")).unwrap();
    let doc: serde_json::Value = serde_json::from_str(&content).unwrap();
    let names: Vec<&str> = doc
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["file_name"].as_str().unwrap())
        .collect();
    // "-for the record" has no ` in `, so only the while line classifies
    assert_eq!(names, vec!["101.patch", "102.patch"]);
}

#[test]
fn missing_patch_directory_fails() {
    let dir = tempfile::tempdir().unwrap();
    let output = patchscan(dir.path(), &["analyze", "--no-plot"], "");
    assert!(!output.status.success());
    assert!(!dir.path().join("extract.json").exists());
}

#[test]
fn scan_prints_single_patch_report() {
    let dir = workspace();
    let output = patchscan(dir.path(), &["scan", "PR_DATA/101.patch"], "");
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["change_set"]["file_name"], "101.patch");
    assert_eq!(report["blocks"], 1);
    assert_eq!(report["malformed_lines"], 0);
    assert_eq!(report["tally"]["added"]["import"], 1);
    // setup.cfg lines are counted too, though never classified
    assert_eq!(report["tally"]["removed"]["import"], 2);
    assert_eq!(report["tally"]["added"]["if"], 2);
}

#[test]
fn scan_decodes_non_utf8_patch() {
    let dir = tempfile::tempdir().unwrap();
    let mut patch = b"diff --git a/caf.py b/caf.py\n@@ -1 +1,2 @@\n+import caf".to_vec();
    patch.push(0xE9);
    patch.extend_from_slice(b"\n+if menu:\n");
    std::fs::write(dir.path().join("latin1.patch"), patch).unwrap();

    let output = patchscan(dir.path(), &["scan", "latin1.patch"], "");
    assert!(
        output.status.success(),
        "scan failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let changes = report["change_set"]["changes"].as_array().unwrap();
    assert_eq!(changes.len(), 2);
    assert_eq!(changes[0]["value"], "caf\u{FFFD}");
    assert_eq!(changes[1]["condition"], "menu");
}

#[test]
fn init_creates_valid_toml() {
    let dir = tempfile::tempdir().unwrap();
    let output = patchscan(dir.path(), &["init"], "");
    assert!(
        output.status.success(),
        "patchscan init failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let content = std::fs::read_to_string(dir.path().join(".patchscan.toml")).unwrap();
    assert!(content.contains("[scan]"));
    assert!(content.contains("[output]"));

    let config: patchscan_core::PatchscanConfig = toml::from_str(&content).unwrap();
    assert_eq!(config.scan.extensions, vec!["py"]);
}

#[test]
fn init_refuses_if_exists() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(".patchscan.toml"), "# existing").unwrap();
    let output = patchscan(dir.path(), &["init"], "");
    assert!(!output.status.success());
}
