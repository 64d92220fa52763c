use serde_json::Value;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

struct TempDirGuard {
    path: PathBuf,
}

impl TempDirGuard {
    fn new(prefix: &str) -> Self {
        let unique = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be after unix epoch")
            .as_nanos();
        let path = std::env::temp_dir().join(format!(
            "gradus-cli-{prefix}-{}-{unique}",
            std::process::id()
        ));
        fs::create_dir_all(&path).expect("temp dir should be created");
        Self { path }
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn store(&self) -> PathBuf {
        self.path.join("store")
    }
}

impl Drop for TempDirGuard {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

fn run_gradus<I, S>(store: &Path, args: I) -> Output
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let bin = env!("CARGO_BIN_EXE_gradus");
    Command::new(bin)
        .arg("--store")
        .arg(store)
        .arg("--quiet")
        .args(args)
        .env_remove("GRADUS_STORE")
        .output()
        .expect("gradus command should execute")
}

fn assert_success(output: &Output) {
    if !output.status.success() {
        panic!(
            "command failed with status {:?}\nstdout:\n{}\nstderr:\n{}",
            output.status.code(),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr),
        );
    }
}

fn assert_failure(output: &Output) {
    if output.status.success() {
        panic!(
            "command unexpectedly succeeded\nstdout:\n{}\nstderr:\n{}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr),
        );
    }
}

fn stdout_text(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr_text(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn parse_json_stdout(output: &Output) -> Value {
    serde_json::from_slice::<Value>(&output.stdout).unwrap_or_else(|e| {
        panic!(
            "stdout should be valid json ({e})\nstdout:\n{}\nstderr:\n{}",
            stdout_text(output),
            stderr_text(output),
        )
    })
}

fn init_store(tmp: &TempDirGuard) -> PathBuf {
    let store = tmp.store();
    let output = run_gradus(&store, ["init"]);
    assert_success(&output);
    store
}

fn add_knowledge(store: &Path, level: &str, category: &str, content: &str) -> u64 {
    let output = run_gradus(
        store,
        [
            "knowledge",
            "add",
            "--level",
            level,
            "--category",
            category,
            "--content",
            content,
            "--json",
        ],
    );
    assert_success(&output);
    parse_json_stdout(&output)["knowledge"]["id"]
        .as_u64()
        .expect("knowledge id should be numeric")
}

#[test]
fn init_creates_store_files() {
    let tmp = TempDirGuard::new("init");
    let store = tmp.store();

    let output = run_gradus(&store, ["init", "--json"]);
    assert_success(&output);
    let payload = parse_json_stdout(&output);
    assert_eq!(payload["action"], "init");
    assert_eq!(payload["createdKnowledgeFile"], true);
    assert!(store.join("knowledge.jsonl").is_file());
    assert!(store.join("recipes.jsonl").is_file());
    assert!(store.join("sequence.jsonl").is_file());

    let again = run_gradus(&store, ["init", "--json"]);
    assert_success(&again);
    assert_eq!(parse_json_stdout(&again)["createdKnowledgeFile"], false);
}

#[test]
fn init_accepts_explicit_path() {
    let tmp = TempDirGuard::new("init-path");
    let target = tmp.path().join("elsewhere");

    let output = run_gradus(&tmp.store(), [OsStr::new("init"), target.as_os_str()]);
    assert_success(&output);
    assert!(target.join("knowledge.jsonl").is_file());
    assert!(!tmp.store().exists());
}

#[test]
fn commands_require_initialized_store() {
    let tmp = TempDirGuard::new("missing-store");
    let output = run_gradus(&tmp.store(), ["knowledge", "list"]);
    assert_failure(&output);
    assert!(stderr_text(&output).contains("gradus init"));
}

#[test]
fn knowledge_add_list_and_show() {
    let tmp = TempDirGuard::new("knowledge");
    let store = init_store(&tmp);

    let first = add_knowledge(&store, "work", "form", "Sonata form: exposition, development, recapitulation");
    let second = add_knowledge(&store, "section", "material", "Second theme in the relative major");
    assert_eq!((first, second), (1, 2));

    let list = run_gradus(&store, ["knowledge", "list", "--level", "section", "--json"]);
    assert_success(&list);
    let payload = parse_json_stdout(&list);
    assert_eq!(payload["count"], 1);
    assert_eq!(payload["items"][0]["id"], 2);
    assert_eq!(payload["items"][0]["category"], "material");

    let show = run_gradus(&store, ["knowledge", "show", "1", "--json"]);
    assert_success(&show);
    let payload = parse_json_stdout(&show);
    let usable = payload["usableAt"]
        .as_array()
        .expect("usableAt should be an array");
    assert_eq!(usable.len(), 2);
    assert_eq!(usable[0]["level"], "collection");
    assert_eq!(usable[0]["effectiveCategory"], "material");
    assert_eq!(usable[1]["level"], "work");
    assert_eq!(usable[1]["effectiveCategory"], "form");
}

#[test]
fn knowledge_add_rejects_unknown_level() {
    let tmp = TempDirGuard::new("bad-level");
    let store = init_store(&tmp);

    let output = run_gradus(
        &store,
        [
            "knowledge",
            "add",
            "--level",
            "movement",
            "--category",
            "form",
            "--content",
            "x",
        ],
    );
    assert_failure(&output);
    assert!(stderr_text(&output).contains("movement"));
}

#[test]
fn resolve_reports_effective_category_and_rejections() {
    let tmp = TempDirGuard::new("resolve");
    let store = init_store(&tmp);
    add_knowledge(&store, "section", "material", "Dominant pedal before the return");
    add_knowledge(&store, "work", "material", "Key plan of the whole sonata");

    let down = run_gradus(&store, ["resolve", "1", "--level", "motif", "--json"]);
    assert_success(&down);
    let payload = parse_json_stdout(&down);
    assert_eq!(payload["usable"], true);
    assert_eq!(payload["preview"]["effectiveCategory"], "form");
    assert_eq!(payload["preview"]["relation"], "finer");

    let up = run_gradus(&store, ["resolve", "2", "--level", "collection", "--json"]);
    assert_failure(&up);
    let payload = parse_json_stdout(&up);
    assert_eq!(payload["usable"], false);
    assert_eq!(payload["reason"]["kind"], "material_cannot_ascend");

    let missing = run_gradus(&store, ["resolve", "9", "--level", "work", "--json"]);
    assert_failure(&missing);
    assert_eq!(parse_json_stdout(&missing)["reason"]["kind"], "not_found");
}

#[test]
fn recipe_add_validates_references() {
    let tmp = TempDirGuard::new("recipe-add");
    let store = init_store(&tmp);
    add_knowledge(&store, "work", "form", "Rondo: refrain alternating with episodes");
    add_knowledge(&store, "collection", "form", "Cycle of four contrasting works");

    let accepted = run_gradus(
        &store,
        [
            "recipe",
            "add",
            "--level",
            "collection",
            "--knowledge",
            "1",
            "--procedure",
            "Close the cycle with a rondo finale",
            "--description",
            "Finale placement",
            "--json",
        ],
    );
    assert_success(&accepted);
    let payload = parse_json_stdout(&accepted);
    assert_eq!(payload["recipe"]["id"], 1);
    assert_eq!(payload["recipe"]["knowledgePointIds"], serde_json::json!([1]));

    let missing = run_gradus(
        &store,
        [
            "recipe",
            "add",
            "--level",
            "work",
            "--knowledge",
            "1",
            "--knowledge",
            "9",
            "--procedure",
            "p",
            "--description",
            "d",
            "--json",
        ],
    );
    assert_failure(&missing);
    let payload = parse_json_stdout(&missing);
    assert_eq!(payload["error"], "missing_knowledge");
    assert_eq!(payload["missingIds"], serde_json::json!([9]));

    let unusable = run_gradus(
        &store,
        [
            "recipe",
            "add",
            "--level",
            "section",
            "--knowledge",
            "2",
            "--procedure",
            "p",
            "--description",
            "d",
            "--json",
        ],
    );
    assert_failure(&unusable);
    let payload = parse_json_stdout(&unusable);
    assert_eq!(payload["error"], "unusable_at_level");
    assert_eq!(payload["unusableIds"], serde_json::json!([2]));

    let list = run_gradus(&store, ["recipe", "list", "--json"]);
    assert_success(&list);
    assert_eq!(parse_json_stdout(&list)["count"], 1);
}

#[test]
fn recipe_show_and_update_revalidate() {
    let tmp = TempDirGuard::new("recipe-update");
    let store = init_store(&tmp);
    add_knowledge(&store, "section", "material", "Sequence rising by step");

    let add = run_gradus(
        &store,
        [
            "recipe",
            "add",
            "--level",
            "motif",
            "--knowledge",
            "1",
            "--procedure",
            "Build the cell from the sequence step",
            "--description",
            "Motivic cell",
        ],
    );
    assert_success(&add);

    let show = run_gradus(&store, ["recipe", "show", "1", "--json"]);
    assert_success(&show);
    let payload = parse_json_stdout(&show);
    assert_eq!(payload["valid"], true);
    assert_eq!(
        payload["report"]["accepted"][0]["effectiveCategory"],
        "form"
    );

    let bad_level = run_gradus(
        &store,
        ["recipe", "update", "1", "--level", "work", "--json"],
    );
    assert_failure(&bad_level);
    assert_eq!(parse_json_stdout(&bad_level)["error"], "unusable_at_level");

    let text_only = run_gradus(
        &store,
        ["recipe", "update", "1", "--description", "Rising cell", "--json"],
    );
    assert_success(&text_only);
    let payload = parse_json_stdout(&text_only);
    assert_eq!(payload["revalidated"], false);
    assert_eq!(payload["recipe"]["level"], "motif");
    assert_eq!(payload["recipe"]["description"], "Rising cell");
}

#[test]
fn validate_is_a_dry_run() {
    let tmp = TempDirGuard::new("validate");
    let store = init_store(&tmp);
    add_knowledge(&store, "section", "material", "Cadential six-four");
    add_knowledge(&store, "section", "form", "Period: antecedent and consequent");

    let ok = run_gradus(&store, ["validate", "--level", "motif", "1", "--json"]);
    assert_success(&ok);
    let payload = parse_json_stdout(&ok);
    assert_eq!(payload["accepted"], true);
    assert!(payload["error"].is_null());

    let rejected = run_gradus(&store, ["validate", "--level", "motif", "1", "2", "2", "--json"]);
    assert_failure(&rejected);
    let payload = parse_json_stdout(&rejected);
    assert_eq!(payload["error"], "unusable_at_level");
    let unusable = payload["report"]["unusable"]
        .as_array()
        .expect("unusable should be an array");
    assert_eq!(unusable.len(), 1);
    assert_eq!(unusable[0]["id"], 2);
    assert_eq!(unusable[0]["reason"]["kind"], "form_cannot_descend");

    let list = run_gradus(&store, ["recipe", "list", "--json"]);
    assert_success(&list);
    assert_eq!(parse_json_stdout(&list)["count"], 0);
}

#[test]
fn referenced_knowledge_removal_and_audit() {
    let tmp = TempDirGuard::new("remove-audit");
    let store = init_store(&tmp);
    add_knowledge(&store, "work", "material", "Slow introduction in the tonic minor");

    let add = run_gradus(
        &store,
        [
            "recipe",
            "add",
            "--level",
            "work",
            "--knowledge",
            "1",
            "--procedure",
            "Open with the introduction",
            "--description",
            "Opening",
        ],
    );
    assert_success(&add);

    let audit = run_gradus(&store, ["audit", "--json"]);
    assert_success(&audit);
    assert_eq!(parse_json_stdout(&audit)["failing"], 0);

    let refused = run_gradus(&store, ["knowledge", "remove", "1", "--json"]);
    assert_failure(&refused);
    let payload = parse_json_stdout(&refused);
    assert_eq!(payload["error"], "knowledge_referenced");
    assert_eq!(payload["recipeIds"], serde_json::json!([1]));

    let forced = run_gradus(&store, ["knowledge", "remove", "1", "--force", "--json"]);
    assert_success(&forced);
    assert_eq!(
        parse_json_stdout(&forced)["danglingRecipeIds"],
        serde_json::json!([1])
    );

    let replacement = add_knowledge(&store, "work", "material", "Slow introduction in the parallel major");
    assert_eq!(replacement, 2, "a removed id must not be handed out again");

    let audit = run_gradus(&store, ["audit", "--json"]);
    assert_failure(&audit);
    let payload = parse_json_stdout(&audit);
    assert_eq!(payload["checked"], 1);
    assert_eq!(payload["failing"], 1);
    assert_eq!(payload["items"][0]["recipeId"], 1);
    assert_eq!(payload["items"][0]["error"], "missing_knowledge");
    assert_eq!(
        payload["items"][0]["report"]["missingIds"],
        serde_json::json!([1])
    );
}

#[test]
fn levels_lists_scale_coarsest_first() {
    let tmp = TempDirGuard::new("levels");
    let output = run_gradus(&tmp.store(), ["levels", "--json"]);
    assert_success(&output);
    let payload = parse_json_stdout(&output);
    assert_eq!(payload["count"], 5);
    assert_eq!(payload["items"][0]["level"], "collection");
    assert!(payload["items"][0]["parent"].is_null());
    assert_eq!(payload["items"][4]["level"], "timbre");

    let text = run_gradus(&tmp.store(), ["levels"]);
    assert_success(&text);
    assert!(stdout_text(&text).contains("section"));
}
