//! Injection state machine for the single content surface.
//!
//! ```text
//! NotLoaded --attach--> Loading --finished--> LoadedUninjected
//! LoadedUninjected <--toggle--> LoadedInjected
//! any loaded state --reload / new document--> Loading
//! ```
//!
//! The state records the request that was made, never the result reported by
//! the surface, and is never re-derived by probing the document.

use std::path::PathBuf;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tauri::Url;

use super::navigation::{self, NavigationDecision, NavigationRequest};
use super::scripts;
use super::stylesheet::StylesheetLoader;
use super::surface::{ContentSurface, ExternalOpener, FilePicker, FilesCallback};
use crate::config::{ListenerId, PreferenceEvent, PreferenceStore};
use crate::notice::{Notice, Notifier};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectionState {
    NotLoaded,
    Loading,
    LoadedUninjected,
    LoadedInjected,
}

impl InjectionState {
    pub fn is_loaded(self) -> bool {
        matches!(
            self,
            InjectionState::LoadedUninjected | InjectionState::LoadedInjected
        )
    }
}

pub struct ContentController {
    preferences: Arc<PreferenceStore>,
    loader: StylesheetLoader,
    notifier: Arc<dyn Notifier>,
    opener: Arc<dyn ExternalOpener>,
    picker: Arc<dyn FilePicker>,
    surface: Option<Box<dyn ContentSurface>>,
    state: InjectionState,
    navigation: u64,
    // One-shot guard: set by the first finish signal of the current navigation.
    finish_handled: bool,
}

impl ContentController {
    pub fn new(
        preferences: Arc<PreferenceStore>,
        notifier: Arc<dyn Notifier>,
        opener: Arc<dyn ExternalOpener>,
        picker: Arc<dyn FilePicker>,
    ) -> Self {
        Self {
            preferences,
            loader: StylesheetLoader::new(),
            notifier,
            opener,
            picker,
            surface: None,
            state: InjectionState::NotLoaded,
            navigation: 0,
            finish_handled: false,
        }
    }

    /// Subscribe `controller` to preference changes. Holds only a weak
    /// reference, so the store does not keep the controller alive.
    pub fn subscribe(controller: &Arc<Mutex<Self>>, preferences: &PreferenceStore) -> ListenerId {
        let weak: Weak<Mutex<Self>> = Arc::downgrade(controller);
        preferences.subscribe(move |event| {
            if let Some(controller) = weak.upgrade() {
                controller.lock().on_preference_event(event);
            }
        })
    }

    pub fn state(&self) -> InjectionState {
        self.state
    }

    pub fn has_surface(&self) -> bool {
        self.surface.is_some()
    }

    /// Take ownership of a freshly created surface that is already loading
    /// the home page. Only the first surface is accepted.
    pub fn attach(&mut self, surface: Box<dyn ContentSurface>) {
        if self.surface.is_some() {
            log::warn!("[CONTENT] Surface already attached, ignoring replacement");
            return;
        }
        self.surface = Some(surface);
        self.begin_navigation();
    }

    /// Explicit reload. Resets the navigation guard before the surface is
    /// asked to reload, so the next finish signal runs injection again.
    ///
    /// Returns whether a reload was issued. A reload the surface rejects
    /// leaves the previous state and guard in place.
    pub fn reload(&mut self) -> bool {
        if self.surface.is_none() {
            return false;
        }
        let previous = (self.state, self.finish_handled);
        self.begin_navigation();
        let result = match self.surface.as_ref() {
            Some(surface) => surface.reload(),
            None => Ok(()),
        };
        if let Err(e) = result {
            log::error!("[CONTENT] Reload failed: {}", e);
            (self.state, self.finish_handled) = previous;
            return false;
        }
        true
    }

    /// The surface started loading a new document it was not asked to load
    /// (redirect, same-site full navigation).
    pub fn navigation_started(&mut self) {
        if self.state.is_loaded() {
            self.begin_navigation();
        }
    }

    /// The surface finished loading the current document. Only the first
    /// signal per navigation is acted on.
    ///
    /// The webview's load events carry no request id. A late finish from a
    /// superseded load is followed by the `Started` of the newer document,
    /// which puts the controller back into `Loading` for its own finish.
    pub fn navigation_finished(&mut self) {
        if self.state != InjectionState::Loading || self.finish_handled {
            log::debug!(
                "[CONTENT] Ignoring finish signal in state {:?}",
                self.state
            );
            return;
        }
        self.finish_handled = true;
        self.state = InjectionState::LoadedUninjected;
        log::debug!("[CONTENT] Navigation {} finished", self.navigation);
        self.apply_preference();
    }

    pub fn on_preference_event(&mut self, event: PreferenceEvent) {
        match event {
            PreferenceEvent::CustomizationToggled => self.apply_preference(),
        }
    }

    /// Decide a navigation. Cancelled requests are handed to the system's
    /// default handler.
    pub fn decide_navigation(&self, request: &NavigationRequest) -> NavigationDecision {
        let decision = navigation::decide(request);
        if decision == NavigationDecision::Cancel {
            log::info!("[CONTENT] Opening {} externally", request.url);
            if let Err(e) = self.opener.open_external(&request.url) {
                log::error!("[CONTENT] Failed to open {} externally: {}", request.url, e);
            }
        }
        decision
    }

    /// Forward a file-selection request from the page to the picker and pass
    /// its answer back unchanged.
    ///
    /// The desktop webviews answer `<input type=file>` with their own native
    /// dialog, so the main window never routes uploads here. Hosts whose
    /// renderer delegates file selection call this from that delegate.
    pub fn run_file_picker(&self, allow_multiple: bool, done: FilesCallback) {
        self.picker.pick_files(allow_multiple, done);
    }

    fn begin_navigation(&mut self) {
        self.navigation += 1;
        self.finish_handled = false;
        self.state = InjectionState::Loading;
    }

    fn apply_preference(&mut self) {
        let prefs = self.preferences.get();
        match (self.state, prefs.customization_enabled) {
            (InjectionState::LoadedUninjected, true) => self.inject(prefs.stylesheet_directory),
            (InjectionState::LoadedInjected, false) => self.remove(),
            _ => {},
        }
    }

    fn inject(&mut self, directory: PathBuf) {
        match self.loader.load(&directory) {
            Ok(css) => {
                self.state = InjectionState::LoadedInjected;
                self.evaluate(scripts::inject_stylesheet(&css), "apply");
            },
            Err(e) => {
                log::warn!("[CONTENT] Stylesheet not injected: {}", e);
                self.notifier.notify(e.notice());
            },
        }
    }

    fn remove(&mut self) {
        self.state = InjectionState::LoadedUninjected;
        self.evaluate(scripts::remove_stylesheet(), "remove");
    }

    // Completion only reports; state already reflects the request.
    fn evaluate(&self, script: String, action: &'static str) {
        let Some(surface) = self.surface.as_ref() else {
            return;
        };
        let notifier = Arc::clone(&self.notifier);
        surface.evaluate_script(
            script,
            Box::new(move |result| {
                if let Err(message) = result {
                    log::error!("[CONTENT] Failed to {} stylesheet: {}", action, message);
                    notifier.notify(Notice::error(
                        "Custom Stylesheet",
                        format!("Failed to {} the custom stylesheet: {}", action, message),
                    ));
                }
            }),
        );
    }
}

/// Shared handle used by the app and the surface callbacks.
pub type SharedContent = Arc<Mutex<ContentController>>;

/// Resolve a URL seen by the surface's navigation hook into allow/cancel.
/// Bridge URLs never load: allowed targets are re-issued as a navigation.
pub fn handle_navigation_hook(controller: &mut ContentController, url: &Url) -> bool {
    let Some(request) = NavigationRequest::from_hook(url) else {
        log::warn!("[CONTENT] Dropping malformed link activation {}", url);
        return false;
    };
    let decision = controller.decide_navigation(&request);
    if url.scheme() == navigation::LINK_SCHEME {
        if decision == NavigationDecision::Allow {
            if let Some(surface) = controller.surface.as_ref() {
                if let Err(e) = surface.navigate(&request.url) {
                    log::error!("[CONTENT] Failed to follow {}: {}", request.url, e);
                }
            }
        }
        return false;
    }
    decision == NavigationDecision::Allow
}
