//! Denial message grammar
//!
//! The rendered message is shown to callers verbatim, so every shape of
//! required and held role lists is pinned here.

use maskgate::prelude::*;

#[test]
fn test_denial_message_grammar() {
    let cases: [(&[&str], &[&str], &str); 9] = [
        (
            &["foo"],
            &[],
            "Access denied: foo is required; however, you have no roles set",
        ),
        (
            &["foo"],
            &["qux"],
            "Access denied: foo is required; however, you have qux roles set",
        ),
        (
            &["foo"],
            &["qux", "quux", "quuz"],
            "Access denied: foo is required; however, you have qux, quux, and quuz roles set",
        ),
        (
            &["foo", "bar"],
            &[],
            "Access denied: foo or bar are required; however, you have no roles set",
        ),
        (
            &["foo", "bar"],
            &["qux"],
            "Access denied: foo or bar are required; however, you have qux roles set",
        ),
        (
            &["foo", "bar"],
            &["qux", "quux"],
            "Access denied: foo or bar are required; however, you have qux and quux roles set",
        ),
        (
            &["foo", "bar", "baz"],
            &[],
            "Access denied: foo, bar, or baz are required; however, you have no roles set",
        ),
        (
            &["foo", "bar", "baz"],
            &["qux", "quux"],
            "Access denied: foo, bar, or baz are required; however, you have qux and quux roles set",
        ),
        (
            &["foo", "bar", "baz"],
            &["qux", "quux", "quuz"],
            "Access denied: foo, bar, or baz are required; however, you have qux, quux, and quuz roles set",
        ),
    ];

    for (required, actual, expected) in cases {
        let denied = authorize("roles", required, actual).unwrap_err();
        assert_eq!(denied.to_string(), expected);
        assert_eq!(denied.required, required);
        assert_eq!(denied.actual, actual);
    }
}

#[test]
fn test_any_one_role_allows() {
    let vocabulary = ["download", "fork", "edit", "delete"];

    // Every pair of single roles: allowed exactly when they coincide
    for required in vocabulary {
        for held in vocabulary {
            let result = authorize("roles", &[required], &[held]);
            assert_eq!(result.is_ok(), required == held, "{required} vs {held}");
        }
    }

    assert!(authorize("roles", &["edit", "delete"], &["download", "delete"]).is_ok());
    assert!(authorize::<&str, &str>("roles", &[], &[]).is_ok());
}

#[test]
fn test_denial_reports_attribute_alias() {
    let access = RoleAttribute::declare_as(["moderator", "support", "editor"], "access").unwrap();
    let field = RoleField::with_roles(access, ["support"]);

    #[derive(Debug)]
    struct Admin(RoleField);

    impl Entity for Admin {
        fn kind(&self) -> &str {
            "admin"
        }

        fn attribute(&self, _field: &str) -> Option<serde_json::Value> {
            None
        }

        fn role_field(&self) -> Option<&RoleField> {
            Some(&self.0)
        }

        fn as_any(&self) -> &dyn std::any::Any {
            self
        }
    }

    let admin = Admin(field);
    assert!(authorize_entity(&["support"], &admin).is_ok());

    match authorize_entity(&["editor"], &admin) {
        Err(AuthzError::Denied(denied)) => assert_eq!(denied.attribute, "access"),
        other => panic!("expected denial, got {other:?}"),
    }
}
