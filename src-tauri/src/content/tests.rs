//! Scenario tests for the content controller.
//!
//! The fake surface applies script effects in issue order, the way a renderer
//! executes them, but hands completions back to the test so their delivery
//! order can be shuffled.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::json;
use tauri::Url;

use super::controller::{handle_navigation_hook, ContentController, InjectionState, SharedContent};
use super::navigation::{NavigationDecision, NavigationRequest};
use super::surface::{
    ContentSurface, DirectoryCallback, ExternalOpener, FilePicker, FilesCallback, ScriptCallback,
};
use crate::config::preferences::{
    KEY_CUSTOMIZATION_ENABLED, KEY_HAS_RUN_BEFORE, KEY_STYLESHEET_DIRECTORY,
};
use crate::config::{MemoryBackend, PreferenceBackend, PreferenceStore};
use crate::error::{ShellError, ShellResult};
use crate::notice::{Notice, Notifier};

// ============================================================================
// Fakes
// ============================================================================

#[derive(Default)]
struct Document {
    style_nodes: usize,
    scripts: Vec<String>,
    navigations: Vec<Url>,
    reloads: usize,
    pending: Vec<ScriptCallback>,
    fail_with: Option<String>,
    reject_reload: bool,
}

#[derive(Clone, Default)]
struct FakeSurface(Arc<Mutex<Document>>);

impl FakeSurface {
    fn style_nodes(&self) -> usize {
        self.0.lock().style_nodes
    }

    fn script_count(&self) -> usize {
        self.0.lock().scripts.len()
    }

    fn fail_scripts_with(&self, message: &str) {
        self.0.lock().fail_with = Some(message.to_string());
    }

    /// Deliver outstanding completions, newest first.
    fn complete_reversed(&self) {
        let (pending, failure) = {
            let mut doc = self.0.lock();
            (std::mem::take(&mut doc.pending), doc.fail_with.clone())
        };
        for done in pending.into_iter().rev() {
            done(match &failure {
                Some(message) => Err(message.clone()),
                None => Ok(()),
            });
        }
    }
}

impl ContentSurface for FakeSurface {
    fn navigate(&self, url: &Url) -> ShellResult<()> {
        let mut doc = self.0.lock();
        doc.navigations.push(url.clone());
        doc.style_nodes = 0;
        Ok(())
    }

    fn evaluate_script(&self, script: String, done: ScriptCallback) {
        let mut doc = self.0.lock();
        // Both scripts start by removing every node with the well-known id.
        doc.style_nodes = if script.contains("createElement('style')") {
            1
        } else {
            0
        };
        doc.scripts.push(script);
        doc.pending.push(done);
    }

    fn reload(&self) -> ShellResult<()> {
        let mut doc = self.0.lock();
        if doc.reject_reload {
            return Err(ShellError::NavigationError("webview is gone".to_string()));
        }
        doc.reloads += 1;
        doc.style_nodes = 0;
        Ok(())
    }
}

#[derive(Clone, Default)]
struct RecordingNotifier(Arc<Mutex<Vec<Notice>>>);

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.0.lock().push(notice);
    }
}

#[derive(Clone, Default)]
struct RecordingOpener(Arc<Mutex<Vec<Url>>>);

impl ExternalOpener for RecordingOpener {
    fn open_external(&self, url: &Url) -> ShellResult<()> {
        self.0.lock().push(url.clone());
        Ok(())
    }
}

#[derive(Default)]
struct FakePicker {
    answer: Option<Vec<PathBuf>>,
    requests: Mutex<Vec<bool>>,
}

impl FilePicker for FakePicker {
    fn pick_files(&self, allow_multiple: bool, done: FilesCallback) {
        self.requests.lock().push(allow_multiple);
        done(self.answer.clone());
    }

    fn pick_directory(&self, done: DirectoryCallback) {
        done(None);
    }
}

// ============================================================================
// Harness
// ============================================================================

struct Harness {
    controller: SharedContent,
    preferences: Arc<PreferenceStore>,
    backend: Arc<MemoryBackend>,
    surface: FakeSurface,
    notices: RecordingNotifier,
    opened: RecordingOpener,
    picker: Arc<FakePicker>,
    dir: PathBuf,
}

impl Harness {
    fn new(css: Option<&str>, enabled: bool) -> Self {
        Self::with_picker(css, enabled, FakePicker::default())
    }

    fn with_picker(css: Option<&str>, enabled: bool, picker: FakePicker) -> Self {
        let dir = std::env::temp_dir().join(format!("deepseek-shell-it-{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        if let Some(css) = css {
            fs::write(dir.join("custom.css"), css).unwrap();
        }

        let backend = Arc::new(MemoryBackend::with_entries([
            (KEY_HAS_RUN_BEFORE, json!(true)),
            (KEY_CUSTOMIZATION_ENABLED, json!(enabled)),
            (KEY_STYLESHEET_DIRECTORY, json!(dir.to_string_lossy())),
        ]));
        let preferences = Arc::new(PreferenceStore::open(backend.clone()));
        let notices = RecordingNotifier::default();
        let opened = RecordingOpener::default();
        let picker = Arc::new(picker);

        let controller = Arc::new(Mutex::new(ContentController::new(
            preferences.clone(),
            Arc::new(notices.clone()),
            Arc::new(opened.clone()),
            picker.clone(),
        )));
        ContentController::subscribe(&controller, &preferences);

        let surface = FakeSurface::default();
        controller.lock().attach(Box::new(surface.clone()));

        Self {
            controller,
            preferences,
            backend,
            surface,
            notices,
            opened,
            picker,
            dir,
        }
    }

    fn state(&self) -> InjectionState {
        self.controller.lock().state()
    }

    fn finish(&self) {
        self.controller.lock().navigation_finished();
    }

    fn notices(&self) -> Vec<Notice> {
        self.notices.0.lock().clone()
    }

    fn path(&self) -> PathBuf {
        self.dir.join("custom.css")
    }
}

impl Drop for Harness {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.dir);
    }
}

fn url(s: &str) -> Url {
    Url::parse(s).unwrap()
}

fn mentions(notice: &Notice, path: &Path) -> bool {
    notice.message.contains(&path.display().to_string())
}

// ============================================================================
// Injection lifecycle
// ============================================================================

#[test]
fn test_attach_starts_loading() {
    let h = Harness::new(Some("body {}"), true);
    assert_eq!(h.state(), InjectionState::Loading);
    assert_eq!(h.surface.script_count(), 0);
}

#[test]
fn test_finish_injects_when_enabled() {
    let h = Harness::new(Some("body { color: red; }"), true);
    h.finish();

    assert_eq!(h.state(), InjectionState::LoadedInjected);
    assert_eq!(h.surface.style_nodes(), 1);
    let scripts = h.surface.0.lock().scripts.clone();
    assert!(scripts[0].contains("body { color: red; }"));
}

#[test]
fn test_finish_leaves_page_alone_when_disabled() {
    let h = Harness::new(Some("body {}"), false);
    h.finish();

    assert_eq!(h.state(), InjectionState::LoadedUninjected);
    assert_eq!(h.surface.script_count(), 0);
}

#[test]
fn test_repeated_finish_signal_runs_injection_once() {
    let h = Harness::new(Some("body {}"), true);
    h.finish();
    h.finish();
    h.finish();

    assert_eq!(h.surface.script_count(), 1);
    assert_eq!(h.state(), InjectionState::LoadedInjected);
}

#[test]
fn test_reload_resets_guard_and_reinjects() {
    let h = Harness::new(Some("body {}"), true);
    h.finish();

    assert!(h.controller.lock().reload());
    assert_eq!(h.state(), InjectionState::Loading);
    assert_eq!(h.surface.0.lock().reloads, 1);
    assert_eq!(h.surface.style_nodes(), 0);

    h.finish();
    assert_eq!(h.state(), InjectionState::LoadedInjected);
    assert_eq!(h.surface.script_count(), 2);
    assert_eq!(h.surface.style_nodes(), 1);
}

#[test]
fn test_reload_follows_preference_changed_while_loading() {
    let h = Harness::new(Some("body {}"), true);
    h.finish();
    h.controller.lock().reload();

    // Arrives while loading: nothing to do yet.
    h.preferences.set_enabled(false).unwrap();
    assert_eq!(h.state(), InjectionState::Loading);
    assert_eq!(h.surface.script_count(), 1);

    h.finish();
    assert_eq!(h.state(), InjectionState::LoadedUninjected);
    assert_eq!(h.surface.script_count(), 1);
    assert_eq!(h.surface.style_nodes(), 0);
}

#[test]
fn test_unrequested_navigation_gets_own_injection_pass() {
    let h = Harness::new(Some("body {}"), true);
    h.finish();

    h.controller.lock().navigation_started();
    assert_eq!(h.state(), InjectionState::Loading);
    // Started again for the same document: still one pending navigation.
    h.controller.lock().navigation_started();
    h.finish();
    h.finish();

    assert_eq!(h.surface.script_count(), 2);
    assert_eq!(h.state(), InjectionState::LoadedInjected);
}

// ============================================================================
// Toggling
// ============================================================================

#[test]
fn test_toggle_off_and_on() {
    let h = Harness::new(Some("body {}"), true);
    h.finish();

    h.preferences.set_enabled(false).unwrap();
    assert_eq!(h.state(), InjectionState::LoadedUninjected);
    assert_eq!(h.surface.style_nodes(), 0);

    h.preferences.set_enabled(true).unwrap();
    assert_eq!(h.state(), InjectionState::LoadedInjected);
    assert_eq!(h.surface.style_nodes(), 1);
    assert!(h.notices().is_empty());
}

#[test]
fn test_toggle_sequence_converges_regardless_of_completion_order() {
    let h = Harness::new(Some("body {}"), false);
    h.finish();

    for _ in 0..5 {
        h.preferences.set_enabled(true).unwrap();
        h.preferences.set_enabled(false).unwrap();
    }
    h.preferences.set_enabled(true).unwrap();
    // Nothing completed yet; then everything completes newest first.
    h.surface.complete_reversed();

    assert_eq!(h.state(), InjectionState::LoadedInjected);
    assert_eq!(h.surface.style_nodes(), 1);
    assert_eq!(h.surface.script_count(), 11);
    assert!(h.notices().is_empty());
}

#[test]
fn test_duplicate_injection_keeps_single_node() {
    let h = Harness::new(Some("body {}"), true);
    h.finish();
    // A second injection pass on the same document (new document signal
    // racing a finish) still leaves one node.
    h.controller.lock().navigation_started();
    h.finish();

    assert_eq!(h.surface.script_count(), 2);
    assert_eq!(h.surface.style_nodes(), 1);
}

#[test]
fn test_disable_without_node_is_silent() {
    let h = Harness::new(Some("body {}"), true);
    h.finish();
    // The page dropped the node on its own.
    h.surface.0.lock().style_nodes = 0;

    h.preferences.set_enabled(false).unwrap();
    h.surface.complete_reversed();

    assert_eq!(h.state(), InjectionState::LoadedUninjected);
    assert_eq!(h.surface.style_nodes(), 0);
    assert!(h.notices().is_empty());
}

#[test]
fn test_disable_after_failed_injection_issues_nothing() {
    let h = Harness::new(None, true);
    h.finish();
    assert_eq!(h.notices().len(), 1);

    h.preferences.set_enabled(false).unwrap();
    assert_eq!(h.surface.script_count(), 0);
    assert_eq!(h.notices().len(), 1);
}

#[test]
fn test_toggle_before_surface_is_ignored() {
    let backend = Arc::new(MemoryBackend::new());
    let preferences = Arc::new(PreferenceStore::open(backend));
    let controller = Arc::new(Mutex::new(ContentController::new(
        preferences.clone(),
        Arc::new(RecordingNotifier::default()),
        Arc::new(RecordingOpener::default()),
        Arc::new(FakePicker::default()),
    )));
    ContentController::subscribe(&controller, &preferences);

    preferences.set_enabled(false).unwrap();
    preferences.set_enabled(true).unwrap();

    let controller = controller.lock();
    assert_eq!(controller.state(), InjectionState::NotLoaded);
    assert!(!controller.has_surface());
}

#[test]
fn test_reload_without_surface_is_noop() {
    let preferences = Arc::new(PreferenceStore::open(Arc::new(MemoryBackend::new())));
    let mut controller = ContentController::new(
        preferences,
        Arc::new(RecordingNotifier::default()),
        Arc::new(RecordingOpener::default()),
        Arc::new(FakePicker::default()),
    );
    assert!(!controller.reload());
    assert_eq!(controller.state(), InjectionState::NotLoaded);
}

#[test]
fn test_rejected_reload_keeps_page_state() {
    let h = Harness::new(Some("body {}"), true);
    h.finish();
    h.surface.0.lock().reject_reload = true;

    assert!(!h.controller.lock().reload());
    assert_eq!(h.state(), InjectionState::LoadedInjected);

    // Toggles still reach the page, and a stray finish is not taken as a
    // new document.
    h.preferences.set_enabled(false).unwrap();
    assert_eq!(h.state(), InjectionState::LoadedUninjected);
    assert_eq!(h.surface.style_nodes(), 0);
    h.finish();
    assert_eq!(h.surface.script_count(), 2);
    assert_eq!(h.state(), InjectionState::LoadedUninjected);
}

#[test]
fn test_second_attach_is_ignored() {
    let h = Harness::new(Some("body {}"), true);
    let other = FakeSurface::default();
    h.controller.lock().attach(Box::new(other.clone()));
    h.finish();

    assert_eq!(other.script_count(), 0);
    assert_eq!(h.surface.script_count(), 1);
}

// ============================================================================
// Failure handling
// ============================================================================

#[test]
fn test_missing_file_reports_exact_path() {
    let h = Harness::new(None, true);
    h.finish();

    assert_eq!(h.state(), InjectionState::LoadedUninjected);
    assert_eq!(h.surface.script_count(), 0);
    let notices = h.notices();
    assert_eq!(notices.len(), 1);
    assert!(notices[0].message.contains("not found"));
    assert!(mentions(&notices[0], &h.path()));
}

#[test]
fn test_empty_file_creates_no_node() {
    let h = Harness::new(Some("  \n\t\n"), true);
    h.finish();

    assert_eq!(h.state(), InjectionState::LoadedUninjected);
    assert_eq!(h.surface.style_nodes(), 0);
    assert_eq!(h.surface.script_count(), 0);
    let notices = h.notices();
    assert!(notices[0].message.contains("empty"));
    assert!(mentions(&notices[0], &h.path()));
}

#[test]
fn test_missing_directory_is_created_and_reported() {
    let h = Harness::new(None, true);
    let nested = h.dir.join("styles");
    h.preferences.set_directory(&nested).unwrap();
    h.finish();

    assert!(nested.is_dir());
    assert_eq!(h.state(), InjectionState::LoadedUninjected);
    assert!(mentions(&h.notices()[0], &nested.join("custom.css")));
}

#[test]
fn test_file_added_later_is_picked_up_on_next_trigger() {
    let h = Harness::new(None, true);
    h.finish();
    assert_eq!(h.state(), InjectionState::LoadedUninjected);

    fs::write(h.path(), "p { margin: 0; }").unwrap();
    h.controller.lock().reload();
    h.finish();

    assert_eq!(h.state(), InjectionState::LoadedInjected);
    assert!(h.surface.0.lock().scripts[0].contains("p { margin: 0; }"));
}

#[test]
fn test_script_failure_surfaces_notice_and_keeps_state() {
    let h = Harness::new(Some("body {}"), true);
    h.surface.fail_scripts_with("renderer gone");
    h.finish();
    h.surface.complete_reversed();

    assert_eq!(h.state(), InjectionState::LoadedInjected);
    let notices = h.notices();
    assert_eq!(notices.len(), 1);
    assert!(notices[0].message.contains("renderer gone"));

    // Toggle behaviour is not desynchronised by the failure.
    h.preferences.set_enabled(false).unwrap();
    assert_eq!(h.state(), InjectionState::LoadedUninjected);
    assert_eq!(h.surface.script_count(), 2);
}

#[test]
fn test_preference_store_is_authoritative_for_directory() {
    let h = Harness::new(Some("body {}"), true);
    let other = h.dir.join("other");
    fs::create_dir_all(&other).unwrap();
    fs::write(other.join("custom.css"), "h1 { color: blue; }").unwrap();

    // Written behind the store's back, as by an earlier session.
    h.backend
        .set(KEY_STYLESHEET_DIRECTORY, json!(other.to_string_lossy()));
    h.finish();

    assert!(h.surface.0.lock().scripts[0].contains("h1 { color: blue; }"));
}

// ============================================================================
// Navigation policy and pickers
// ============================================================================

#[test]
fn test_domain_policy_through_controller() {
    let h = Harness::new(Some("body {}"), true);
    let controller = h.controller.lock();

    let same_site = NavigationRequest::link(url("https://chat.deepseek.com/x"));
    assert_eq!(controller.decide_navigation(&same_site), NavigationDecision::Allow);

    let foreign = NavigationRequest::link(url("https://example.com"));
    assert_eq!(controller.decide_navigation(&foreign), NavigationDecision::Cancel);

    let scripted = NavigationRequest::other(url("https://example.com"));
    assert_eq!(controller.decide_navigation(&scripted), NavigationDecision::Allow);

    assert_eq!(*h.opened.0.lock(), vec![url("https://example.com")]);
}

#[test]
fn test_navigation_hook_handles_bridge_urls() {
    let h = Harness::new(Some("body {}"), true);
    let mut controller = h.controller.lock();

    let foreign = url("shell-link://activate?target=https%3A%2F%2Fexample.com%2F");
    assert!(!handle_navigation_hook(&mut controller, &foreign));
    assert_eq!(*h.opened.0.lock(), vec![url("https://example.com/")]);

    let same_site = url("shell-link://activate?target=https%3A%2F%2Fchat.deepseek.com%2Fx");
    assert!(!handle_navigation_hook(&mut controller, &same_site));
    assert_eq!(
        h.surface.0.lock().navigations,
        vec![url("https://chat.deepseek.com/x")]
    );

    assert!(handle_navigation_hook(&mut controller, &url("https://accounts.example.org/login")));
    assert!(!handle_navigation_hook(&mut controller, &url("shell-link://activate")));
    assert_eq!(h.opened.0.lock().len(), 1);
}

#[test]
fn test_file_picker_result_passed_back_verbatim() {
    let selected = vec![PathBuf::from("/tmp/a.png"), PathBuf::from("/tmp/b.pdf")];
    let h = Harness::with_picker(
        Some("body {}"),
        true,
        FakePicker {
            answer: Some(selected.clone()),
            ..FakePicker::default()
        },
    );

    let received = Arc::new(Mutex::new(None));
    let sink = received.clone();
    h.controller
        .lock()
        .run_file_picker(true, Box::new(move |paths| *sink.lock() = Some(paths)));

    assert_eq!(*received.lock(), Some(Some(selected)));
    assert_eq!(*h.picker.requests.lock(), vec![true]);
}

#[test]
fn test_file_picker_cancellation_passed_back() {
    let h = Harness::new(Some("body {}"), true);
    let received = Arc::new(Mutex::new(None));
    let sink = received.clone();
    h.controller
        .lock()
        .run_file_picker(false, Box::new(move |paths| *sink.lock() = Some(paths)));

    assert_eq!(*received.lock(), Some(None));
    assert_eq!(*h.picker.requests.lock(), vec![false]);
}
