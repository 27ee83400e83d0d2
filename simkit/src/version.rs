/// Build tag appended to the version. Set `SIM_BUILD_TAG` at compile time
/// (CI passes the short commit hash) or get `dev`.
pub const BUILD_TAG: &str = match option_env!("SIM_BUILD_TAG") {
    Some(tag) => tag,
    None => "dev",
};

/// `MAJOR.MINOR.PATCH-TAG`, as printed by `-V`.
pub fn version_string() -> String {
    format!(
        "{}.{}.{}-{}",
        env!("CARGO_PKG_VERSION_MAJOR"),
        env!("CARGO_PKG_VERSION_MINOR"),
        env!("CARGO_PKG_VERSION_PATCH"),
        BUILD_TAG
    )
}
