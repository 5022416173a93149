// ABOUTME: Integration tests for validated domain types.
// ABOUTME: Image references, tag rules, service names, and revisions.

use briefex_ops::types::*;

mod image_ref_tests {
    use super::*;

    #[test]
    fn repository_parts_are_lower_cased() {
        let img = ImageRef::for_repository("ghcr.io", "Acme", "Briefex").unwrap();
        assert_eq!(img.registry(), Some("ghcr.io"));
        assert_eq!(img.to_string(), "ghcr.io/acme/briefex");
    }

    #[test]
    fn parse_without_registry() {
        let img = ImageRef::parse("acme/briefex").unwrap();
        assert!(img.registry().is_none());
        assert_eq!(img.to_string(), "acme/briefex");
    }

    #[test]
    fn registry_with_port_is_not_a_tag() {
        let img = ImageRef::parse("localhost:5000/x").unwrap();
        assert_eq!(img.registry(), Some("localhost:5000"));
        assert_eq!(img.to_string(), "localhost:5000/x");

        let img = ImageRef::parse("registry.internal:5000/news/briefex").unwrap();
        assert_eq!(img.registry(), Some("registry.internal:5000"));
    }

    #[test]
    fn trailing_tag_is_rejected() {
        for input in ["ghcr.io/acme/briefex:v1", "briefex:latest", "localhost:5000/x:dev"] {
            assert!(
                matches!(ImageRef::parse(input), Err(ParseImageRefError::HasTag(_))),
                "{input}"
            );
        }
    }

    #[test]
    fn digest_is_rejected() {
        let result = ImageRef::parse("ghcr.io/acme/briefex@sha256:abc123");
        assert!(matches!(result, Err(ParseImageRefError::HasTag(_))));
    }

    #[test]
    fn invalid_character_is_reported() {
        let result = ImageRef::parse("ghcr.io/acme/bri fex");
        assert!(matches!(result, Err(ParseImageRefError::InvalidChar(' '))));
    }

    #[test]
    fn parse_empty_returns_error() {
        assert!(matches!(ImageRef::parse("  "), Err(ParseImageRefError::Empty)));
    }

    #[test]
    fn tagged_renders_reference() {
        let img = ImageRef::parse("ghcr.io/acme/briefex").unwrap();
        assert_eq!(img.tagged("v1.2.3").unwrap(), "ghcr.io/acme/briefex:v1.2.3");
        assert!(img.tagged("v1 2").is_err());
    }
}

mod tag_tests {
    use super::*;

    #[test]
    fn accepts_common_tags() {
        for tag in ["v1.2.3", "0.1.0", "sha-abc1234", "_build", "latest", "1.0.0-rc.1"] {
            assert!(validate_tag(tag).is_ok(), "{tag}");
        }
    }

    #[test]
    fn length_limit_is_128() {
        assert!(validate_tag(&"a".repeat(128)).is_ok());
        assert!(matches!(
            validate_tag(&"a".repeat(129)),
            Err(ParseImageRefError::InvalidTag(_))
        ));
    }

    #[test]
    fn leading_separator_is_rejected() {
        for tag in [".v1", "-v1", ""] {
            assert!(validate_tag(tag).is_err(), "{tag:?}");
        }
    }

    #[test]
    fn forbidden_characters_are_rejected() {
        for tag in ["v1+build", "v1/2", "v1 2", "v1:2"] {
            assert!(validate_tag(tag).is_err(), "{tag:?}");
        }
    }
}

mod service_name_tests {
    use super::*;

    #[test]
    fn valid_names() {
        for name in ["app", "worker-1", "db_primary", "api.v2", "9lives"] {
            assert_eq!(ServiceName::new(name).unwrap().as_str(), name);
        }
    }

    #[test]
    fn surrounding_whitespace_is_trimmed() {
        assert_eq!(ServiceName::new("  worker \n").unwrap().to_string(), "worker");
    }

    #[test]
    fn empty_is_rejected() {
        assert!(matches!(ServiceName::new(" "), Err(ServiceNameError::Empty)));
    }

    #[test]
    fn bad_start_is_rejected() {
        assert!(matches!(
            ServiceName::new("-app"),
            Err(ServiceNameError::BadStart('-'))
        ));
        assert!(matches!(
            ServiceName::new(".hidden"),
            Err(ServiceNameError::BadStart('.'))
        ));
    }

    #[test]
    fn invalid_character_is_rejected() {
        assert!(matches!(
            ServiceName::new("app/worker"),
            Err(ServiceNameError::InvalidChar('/'))
        ));
        assert!(matches!(
            ServiceName::new("app;rm"),
            Err(ServiceNameError::InvalidChar(';'))
        ));
    }
}

mod revision_tests {
    use super::*;

    #[test]
    fn tag_uses_short_form() {
        let rev = Revision::new(" abc1234\n", "abc1234def567890");
        assert_eq!(rev.short(), "abc1234");
        assert_eq!(rev.tag(), "sha-abc1234");
        assert_eq!(rev.full(), "abc1234def567890");
    }
}
