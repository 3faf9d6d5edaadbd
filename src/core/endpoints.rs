//! REST paths of the external LOS API, relative to the configured base URL.

pub const LOGIN: &str = "/auth/login/";
pub const REGISTER: &str = "/auth/register/";
pub const REGISTER_SHOPKEEPER: &str = "/auth/register/shopkeeper/";
pub const TOKEN_REFRESH: &str = "/auth/token/refresh/";
pub const LOGOUT: &str = "/auth/logout/";
pub const PROFILE: &str = "/auth/profile/";
pub const DASHBOARD: &str = "/auth/dashboard/";
