use std::env;

pub const ENV_VAR: &str = "ATELIER_ENV";

/// Whether the admin surface (create/edit/delete/export/reset) is
/// available in this runtime context.
///
/// Editing is a local, non-production activity: it is enabled unless
/// `ATELIER_ENV=production`. This is an availability toggle, not a
/// security boundary.
#[must_use]
pub fn admin_available() -> bool {
    match env::var(ENV_VAR) {
        Ok(value) => !value.eq_ignore_ascii_case("production"),
        Err(_) => true,
    }
}
