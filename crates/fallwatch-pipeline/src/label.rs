/// Raw labels starting with this token are falls.
///
/// Tied to the vocabulary of the bundled classifier; a classifier with other
/// labels needs this convention revisited.
pub const FALL_PREFIX: &str = "fall";

pub const ALERT_MARKER: &str = "🚨 Fall Detected!";
pub const NORMAL_MARKER: &str = "Normal -";

/// Label surfaced while no classifier is loaded.
pub const MODEL_NOT_LOADED_LABEL: &str = "Model not loaded - Using test data";

/// Label held by the cache before the first successful poll.
pub const INITIALIZING_LABEL: &str = "Initializing...";

pub fn is_fall(raw: &str) -> bool {
    raw.starts_with(FALL_PREFIX)
}

/// Decorate a raw classifier label for display.
pub fn decorate(raw: &str) -> String {
    if is_fall(raw) {
        format!("{ALERT_MARKER} {raw}")
    } else {
        format!("{NORMAL_MARKER} {raw}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fall_labels_get_alert_marker() {
        assert_eq!(decorate("fall_forward"), "🚨 Fall Detected! fall_forward");
        assert_eq!(decorate("fall"), "🚨 Fall Detected! fall");
    }

    #[test]
    fn other_labels_get_normal_marker() {
        assert_eq!(decorate("stand"), "Normal - stand");
        assert_eq!(decorate("pre_fall"), "Normal - pre_fall");
        assert_eq!(decorate("Fall_forward"), "Normal - Fall_forward");
    }
}
