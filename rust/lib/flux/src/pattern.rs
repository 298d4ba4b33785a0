/// Check whether a concrete topic path matches a subscription pattern.
///
/// `+` matches exactly one level, `#` matches all remaining levels
/// (including none, so `auth/#` also matches `auth`). `#` is only
/// meaningful as the last segment.
pub fn topic_matches(pattern: &str, topic: &str) -> bool {
    let mut pat = pattern.split('/');
    let mut top = topic.split('/');

    loop {
        match (pat.next(), top.next()) {
            (Some("#"), _) => return true,
            (Some("+"), Some(_)) => {}
            (Some(p), Some(t)) if p == t => {}
            (None, None) => return true,
            _ => return false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact() {
        assert!(topic_matches("auth/user", "auth/user"));
        assert!(!topic_matches("auth/user", "auth/loading"));
        assert!(!topic_matches("auth/user", "auth/user/extra"));
        assert!(!topic_matches("auth/user/extra", "auth/user"));
    }

    #[test]
    fn single_level_wildcard() {
        assert!(topic_matches("auth/+", "auth/user"));
        assert!(topic_matches("auth/+", "auth/loading"));
        assert!(topic_matches("+/items", "complaints/items"));
        assert!(!topic_matches("auth/+", "auth"));
        assert!(!topic_matches("auth/+", "auth/a/b"));
        assert!(!topic_matches("auth/+", "complaints/items"));
    }

    #[test]
    fn multi_level_wildcard() {
        assert!(topic_matches("complaints/#", "complaints/items"));
        assert!(topic_matches("complaints/#", "complaints/a/b/c"));
        assert!(topic_matches("complaints/#", "complaints"));
        assert!(!topic_matches("complaints/#", "auth/user"));
        assert!(topic_matches("#", "anything/at/all"));
    }

    #[test]
    fn similar_prefix_does_not_match() {
        assert!(!topic_matches("auth/#", "authorization/state"));
        assert!(!topic_matches("auth", "authorization"));
    }
}
