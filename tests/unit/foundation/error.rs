use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        VisdiffError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(VisdiffError::parse("x").to_string().contains("parse error:"));
    assert!(
        VisdiffError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = VisdiffError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
