/// Symbols a password may (and must at least once) contain.
pub const PASSWORD_SYMBOLS: &str = "@$!%*#?&";

pub const MIN_PASSWORD_LENGTH: usize = 8;

pub mod session {

    /// Key under which the authenticated principal is stored.
    pub const PRINCIPAL_KEY: &str = "principal";

    /// One-shot message shown on the next rendered list page.
    pub const FLASH_KEY: &str = "flash";
}

pub mod routes {

    pub const HOME: &str = "/";

    pub const LOGIN: &str = "/login";

    pub const LOGOUT: &str = "/logout";

    pub const ADMIN_HOME: &str = "/admin/home";

    /// Where a successful login lands.
    pub const DEFAULT_LANDING: &str = "/bidList/list";

    /// Everything under this prefix is restricted to administrators.
    pub const USER_ADMIN_PREFIX: &str = "/user";
}

pub mod messages {

    pub const BAD_CREDENTIALS: &str = "Invalid username or password.";

    pub const ACCESS_DENIED: &str = "You are not authorized to access this page.";
}
