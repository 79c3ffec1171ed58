/// Author used when none is given: the OS user's real name, falling back to
/// the login name.
pub fn default_author() -> String {
    pick_author(&whoami::realname(), whoami::username)
}

fn pick_author(real_name: &str, login: impl FnOnce() -> String) -> String {
    let real_name = real_name.trim();
    if real_name.is_empty() {
        return login();
    }
    real_name.to_string()
}
