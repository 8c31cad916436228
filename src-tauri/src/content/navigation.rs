//! Navigation policy for the content surface.

use tauri::Url;

/// Page loaded into the content surface.
pub const HOME_URL: &str = "https://chat.deepseek.com";

/// Link activations whose host does not contain this are opened externally.
pub const TRUSTED_DOMAIN: &str = "deepseek.com";

/// Scheme used by the link bridge script to flag a user link activation.
pub const LINK_SCHEME: &str = "shell-link";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationKind {
    /// The user activated a link in the page.
    LinkActivation,
    /// Shell-initiated loads, redirects, script navigation.
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationRequest {
    pub url: Url,
    pub kind: NavigationKind,
}

impl NavigationRequest {
    pub fn link(url: Url) -> Self {
        Self {
            url,
            kind: NavigationKind::LinkActivation,
        }
    }

    pub fn other(url: Url) -> Self {
        Self {
            url,
            kind: NavigationKind::Other,
        }
    }

    /// Interpret a URL seen by the surface's navigation hook. Bridge URLs
    /// decode to a link activation of their target; a bridge URL without a
    /// parseable target yields `None`.
    pub fn from_hook(url: &Url) -> Option<Self> {
        if url.scheme() != LINK_SCHEME {
            return Some(Self::other(url.clone()));
        }
        let target = url
            .query_pairs()
            .find(|(key, _)| key == "target")
            .and_then(|(_, value)| Url::parse(&value).ok())?;
        Some(Self::link(target))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationDecision {
    Allow,
    /// Cancel inside the surface and hand the URL to the system handler.
    Cancel,
}

pub fn home_url() -> Url {
    Url::parse(HOME_URL).expect("HOME_URL is a valid URL")
}

pub fn is_trusted(url: &Url) -> bool {
    url.host_str()
        .is_some_and(|host| host.contains(TRUSTED_DOMAIN))
}

pub fn decide(request: &NavigationRequest) -> NavigationDecision {
    match request.kind {
        NavigationKind::LinkActivation if !is_trusted(&request.url) => NavigationDecision::Cancel,
        _ => NavigationDecision::Allow,
    }
}
