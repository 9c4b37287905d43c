//! Application configuration port.
//!
//! Sections read by findbetter: `[data]`, `[settings]`, `[find_better]`.

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    fn get_int(&self, section: &str, key: &str, default: i64) -> i64;

    /// `true` when the key is present with a non-blank value.
    fn has(&self, section: &str, key: &str) -> bool {
        self.get_string(section, key)
            .is_some_and(|v| !v.trim().is_empty())
    }
}
