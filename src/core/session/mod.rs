//! Session persistence: credential cookies and the cached profile record

mod backend;
mod store;

pub use backend::{CookieJar, LocalCache, MemoryCache, MemoryCookieJar};
pub use store::{
    ACCESS_COOKIE, CachedProfile, NOTIFICATION_PROMPT_KEY, PROFILE_KEY, REFRESH_COOKIE,
    SessionStore,
};
