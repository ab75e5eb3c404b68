use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        LiveMixError::syntax(3, "x")
            .to_string()
            .contains("syntax error at line 3:")
    );
    assert!(
        LiveMixError::unbalanced(7, "x")
            .to_string()
            .contains("unbalanced block at line 7:")
    );
    assert!(LiveMixError::value("x").to_string().contains("value error:"));
    assert!(
        LiveMixError::type_mismatch("x")
            .to_string()
            .contains("type mismatch:")
    );
    assert!(
        LiveMixError::config("x")
            .to_string()
            .contains("config error:")
    );
}

#[test]
fn arity_message_names_bounds() {
    let err = LiveMixError::Arity {
        template: "xoutput".to_owned(),
        min: 4,
        max: 4,
        got: 2,
    };
    assert_eq!(
        err.to_string(),
        "arity error: template 'xoutput' accepts 4..=4 arguments, got 2"
    );
}

#[test]
fn per_action_errors_are_recoverable() {
    assert!(LiveMixError::value("bad int").is_recoverable());
    assert!(LiveMixError::type_mismatch("int vs string").is_recoverable());
    assert!(LiveMixError::UnknownInstance("w".to_owned()).is_recoverable());
    assert!(!LiveMixError::DuplicateInstance("w".to_owned()).is_recoverable());
    assert!(!LiveMixError::syntax(1, "x").is_recoverable());
    assert!(LiveMixError::syntax(1, "x").is_compile_time());
    assert!(!LiveMixError::port_mismatch("x").is_compile_time());
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = LiveMixError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
