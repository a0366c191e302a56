//! Deterministic image tag naming for built environments.
//!
//! The tag carries both the environment name and the owning author so that a
//! user environment can never collide with a library environment sharing the
//! same name. Tags are derived, never user-supplied.

const TAG_PREFIX: &str = "runbot_build";

/// Owner component used for shared library environments.
const LIBRARY_OWNER: &str = "library";

/// Maps an environment name and optional owner to the container image tag
/// used for its build. Pure and deterministic; no failure modes.
pub fn image_tag(name: &str, author_id: Option<&str>) -> String {
    format!(
        "{}_{}:{}",
        TAG_PREFIX,
        name,
        author_id.unwrap_or(LIBRARY_OWNER)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_is_deterministic() {
        assert_eq!(image_tag("sci", Some("42")), image_tag("sci", Some("42")));
        assert_eq!(image_tag("sci", Some("42")), "runbot_build_sci:42");
    }

    #[test]
    fn tag_separates_owners() {
        assert_ne!(image_tag("sci", Some("42")), image_tag("sci", Some("43")));
        assert_ne!(image_tag("sci", Some("42")), image_tag("sci", None));
        assert_eq!(image_tag("sci", None), "runbot_build_sci:library");
    }
}
