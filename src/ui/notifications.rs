//! Toast notifications
//!
//! Used for the access-denied notice, auth failures and the one-time
//! browser-notification prompt.

use leptos::prelude::*;
use std::collections::VecDeque;

use crate::core::roles::AccessNotice;

/// Maximum number of notifications to show at once
const MAX_NOTIFICATIONS: usize = 5;

/// Delay before the browser-notification prompt appears
#[cfg(feature = "hydrate")]
const PROMPT_DELAY_MS: u32 = 3000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
    Warning,
    Info,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub auto_dismiss_ms: Option<u32>,
}

impl Notification {
    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Success,
            title: title.into(),
            message: message.into(),
            auto_dismiss_ms: Some(3000),
        }
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Error,
            title: title.into(),
            message: message.into(),
            auto_dismiss_ms: None, // errors stay until dismissed
        }
    }

    pub fn warning(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Warning,
            title: title.into(),
            message: message.into(),
            auto_dismiss_ms: Some(5000),
        }
    }

    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Info,
            title: title.into(),
            message: message.into(),
            auto_dismiss_ms: Some(3000),
        }
    }
}

impl From<AccessNotice> for Notification {
    fn from(notice: AccessNotice) -> Self {
        Self::warning(notice.title, notice.message)
    }
}

/// Notification item with unique ID for tracking
#[derive(Clone, Debug, PartialEq)]
pub struct NotificationItem {
    pub id: u64,
    pub notification: Notification,
}

/// Bounded queue of visible notifications, oldest first
#[derive(Clone, Debug, Default)]
pub struct NotificationQueue {
    items: VecDeque<NotificationItem>,
    next_id: u64,
}

impl NotificationQueue {
    /// Add a notification, dropping the oldest beyond the limit
    pub fn push(&mut self, notification: Notification) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.items.push_back(NotificationItem { id, notification });
        while self.items.len() > MAX_NOTIFICATIONS {
            self.items.pop_front();
        }
        id
    }

    pub fn dismiss(&mut self, id: u64) {
        self.items.retain(|i| i.id != id);
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn items(&self) -> impl Iterator<Item = &NotificationItem> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Reactive handle to the notification queue
#[derive(Clone, Copy)]
pub struct NotificationManager {
    queue: RwSignal<NotificationQueue>,
}

impl NotificationManager {
    pub fn new() -> Self {
        Self {
            queue: RwSignal::new(NotificationQueue::default()),
        }
    }

    pub fn notify(&self, notification: Notification) {
        self.queue.update(|q| {
            q.push(notification);
        });
    }

    pub fn success(&self, title: impl Into<String>, message: impl Into<String>) {
        self.notify(Notification::success(title, message));
    }

    pub fn error(&self, title: impl Into<String>, message: impl Into<String>) {
        self.notify(Notification::error(title, message));
    }

    pub fn warning(&self, title: impl Into<String>, message: impl Into<String>) {
        self.notify(Notification::warning(title, message));
    }

    pub fn info(&self, title: impl Into<String>, message: impl Into<String>) {
        self.notify(Notification::info(title, message));
    }

    /// Dismissing after the container was unmounted is a no-op
    pub fn dismiss(&self, id: u64) {
        let _ = self.queue.try_update(|q| q.dismiss(id));
    }

    pub fn clear(&self) {
        self.queue.update(NotificationQueue::clear);
    }
}

impl Default for NotificationManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Provide the notification manager to the component tree
pub fn provide_notifications() -> NotificationManager {
    let manager = NotificationManager::new();
    provide_context(manager);
    manager
}

/// Notification manager from the component tree, if one was provided
pub fn use_notifications() -> Option<NotificationManager> {
    use_context::<NotificationManager>()
}

/// Notifications container component
/// Place this once near the root to show notifications
#[component]
pub fn NotificationsContainer() -> impl IntoView {
    let manager = use_notifications().unwrap_or_else(provide_notifications);
    let queue = manager.queue;

    view! {
        <div class="fixed top-4 right-4 z-50 flex flex-col gap-2 max-w-sm">
            <For
                each={move || queue.get().items().cloned().collect::<Vec<_>>()}
                key={|item| item.id}
                children={move |item| view! { <NotificationToast item=item manager=manager /> }}
            />
        </div>
    }
}

/// Single notification toast component
#[component]
fn NotificationToast(item: NotificationItem, manager: NotificationManager) -> impl IntoView {
    let id = item.id;
    let notification = item.notification;
    let (is_exiting, _set_is_exiting) = signal(false);

    // Auto-dismiss if specified
    if let Some(_ms) = notification.auto_dismiss_ms {
        #[cfg(feature = "hydrate")]
        {
            use gloo_timers::future::TimeoutFuture;
            use leptos::task::spawn_local;

            spawn_local(async move {
                TimeoutFuture::new(_ms).await;
                let _ = _set_is_exiting.try_set(true);
                // Wait for exit animation
                TimeoutFuture::new(300).await;
                manager.dismiss(id);
            });
        }
    }

    let (bg_class, border_class, icon_class) = match notification.kind {
        NotificationKind::Success => ("bg-green-500/10", "border-green-500/30", "text-green-400"),
        NotificationKind::Error => ("bg-red-500/10", "border-red-500/30", "text-red-400"),
        NotificationKind::Warning => (
            "bg-yellow-500/10",
            "border-yellow-500/30",
            "text-yellow-400",
        ),
        NotificationKind::Info => ("bg-blue-500/10", "border-blue-500/30", "text-blue-400"),
    };

    let icon_path = match notification.kind {
        NotificationKind::Success => "M9 12l2 2 4-4m6 2a9 9 0 11-18 0 9 9 0 0118 0z",
        NotificationKind::Error => "M12 8v4m0 4h.01M21 12a9 9 0 11-18 0 9 9 0 0118 0z",
        NotificationKind::Warning => {
            "M12 9v2m0 4h.01m-6.938 4h13.856c1.54 0 2.502-1.667 1.732-3L13.732 4c-.77-1.333-2.694-1.333-3.464 0L3.34 16c-.77 1.333.192 3 1.732 3z"
        }
        NotificationKind::Info => "M13 16h-1v-4h-1m1-4h.01M21 12a9 9 0 11-18 0 9 9 0 0118 0z",
    };

    let container_class = format!(
        "flex items-start gap-3 p-4 rounded-lg border backdrop-blur-sm shadow-lg transition-all duration-300 {} {}",
        bg_class, border_class
    );

    view! {
        <div
            class=container_class
            role="status"
            style=move || if is_exiting.get() { "opacity: 0; transform: translateX(1rem);" } else { "opacity: 1; transform: translateX(0);" }
        >
            <div class=icon_class>
                <svg class="w-5 h-5" fill="none" stroke="currentColor" viewBox="0 0 24 24">
                    <path stroke-linecap="round" stroke-linejoin="round" stroke-width="2" d=icon_path />
                </svg>
            </div>
            <div class="flex-1 min-w-0">
                <h4 class="text-sm font-medium">{notification.title}</h4>
                <p class="text-xs mt-0.5">{notification.message}</p>
            </div>
            <button
                class="opacity-60 hover:opacity-100 transition-opacity"
                aria-label="Dismiss"
                on:click=move |_| manager.dismiss(id)
            >
                <svg class="w-4 h-4" fill="none" stroke="currentColor" viewBox="0 0 24 24">
                    <path stroke-linecap="round" stroke-linejoin="round" stroke-width="2" d="M6 18L18 6M6 6l12 12" />
                </svg>
            </button>
        </div>
    }
}

/// One-time prompt asking for browser notification permission.
///
/// Shown a few seconds after mount when the browser has not decided yet and
/// the prompt was never answered. Either answer is remembered in the local
/// cache, so the prompt never comes back.
#[component]
pub fn NotificationPrompt() -> impl IntoView {
    let visible = RwSignal::new(false);
    let auth = crate::ui::auth::use_auth_context();

    #[cfg(feature = "hydrate")]
    Effect::new(move |_| {
        use gloo_timers::future::TimeoutFuture;
        use leptos::task::spawn_local;

        if auth.prompt_already_asked() || !permission_undecided() {
            return;
        }
        spawn_local(async move {
            TimeoutFuture::new(PROMPT_DELAY_MS).await;
            let _ = visible.try_set(true);
        });
    });

    let dismiss = move |_| {
        auth.mark_prompt_asked();
        visible.set(false);
    };

    let enable = move |_| {
        auth.mark_prompt_asked();
        visible.set(false);
        #[cfg(feature = "hydrate")]
        request_permission();
    };

    view! {
        <Show when=move || visible.get()>
            <div class="fixed bottom-4 right-4 z-50 max-w-sm p-4 rounded-lg border shadow-lg">
                <h4 class="font-semibold text-sm">"Enable Notifications"</h4>
                <p class="text-xs mt-1">"Get instant updates on your orders and exclusive deals!"</p>
                <div class="flex gap-2 mt-3">
                    <button class="px-3 py-1 text-sm rounded" on:click=enable>"Enable"</button>
                    <button class="px-3 py-1 text-sm rounded" on:click=dismiss>"Not Now"</button>
                </div>
            </div>
        </Show>
    }
}

#[cfg(feature = "hydrate")]
fn permission_undecided() -> bool {
    web_sys::Notification::permission() == web_sys::NotificationPermission::Default
}

#[cfg(feature = "hydrate")]
fn request_permission() {
    use leptos::task::spawn_local;
    use wasm_bindgen_futures::JsFuture;

    let Ok(promise) = web_sys::Notification::request_permission() else {
        leptos::logging::warn!("Notification permission request failed");
        return;
    };
    spawn_local(async move {
        match JsFuture::from(promise).await {
            Ok(answer) if answer.as_string().as_deref() == Some("granted") => {
                let options = web_sys::NotificationOptions::new();
                options.set_body("You will now receive order updates and promotions.");
                let _ = web_sys::Notification::new_with_options("Notifications Enabled!", &options);
            }
            Ok(_) => {}
            Err(err) => leptos::logging::warn!("Notification permission error: {:?}", err),
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_assigns_increasing_ids() {
        let mut queue = NotificationQueue::default();
        let first = queue.push(Notification::info("A", "a"));
        let second = queue.push(Notification::info("B", "b"));
        assert!(second > first);
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn test_queue_drops_oldest_beyond_limit() {
        let mut queue = NotificationQueue::default();
        for i in 0..7 {
            queue.push(Notification::info(format!("n{i}"), ""));
        }

        assert_eq!(queue.len(), MAX_NOTIFICATIONS);
        let titles: Vec<_> = queue.items().map(|i| i.notification.title.clone()).collect();
        assert_eq!(titles.first().map(String::as_str), Some("n2"));
        assert_eq!(titles.last().map(String::as_str), Some("n6"));
    }

    #[test]
    fn test_dismiss_removes_only_that_item() {
        let mut queue = NotificationQueue::default();
        let keep = queue.push(Notification::success("Saved", ""));
        let drop = queue.push(Notification::error("Failed", ""));

        queue.dismiss(drop);
        queue.dismiss(drop);

        let ids: Vec<_> = queue.items().map(|i| i.id).collect();
        assert_eq!(ids, vec![keep]);
    }

    #[test]
    fn test_errors_do_not_auto_dismiss() {
        assert_eq!(Notification::error("x", "y").auto_dismiss_ms, None);
        assert!(Notification::success("x", "y").auto_dismiss_ms.is_some());
    }

    #[test]
    fn test_access_notice_becomes_warning() {
        let notice = AccessNotice {
            title: "Access denied",
            message: "Admins only".to_string(),
        };
        let notification = Notification::from(notice);
        assert_eq!(notification.kind, NotificationKind::Warning);
        assert_eq!(notification.title, "Access denied");
    }
}
