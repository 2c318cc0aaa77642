use std::sync::Arc;

use dialectic_model::{
    create_backend, default_backend, set_default_backend, BackendKind, BackendOptions,
    ConfigurationError, GenerationPort, GenerationRequest, ScriptedBackend, DEFAULT_BACKEND,
};

#[test]
fn unknown_backend_name_is_rejected() {
    let err = create_backend("gpt-neo", &BackendOptions::default())
        .err()
        .unwrap();
    match err {
        ConfigurationError::UnsupportedBackend { name, supported } => {
            assert_eq!(name, "gpt-neo");
            for kind in BackendKind::ALL {
                assert!(supported.contains(kind.name()));
            }
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn volcano_requires_secret_key_and_model() {
    let err = create_backend("volcano", &BackendOptions::default().with_api_key("ak"))
        .err()
        .unwrap();
    assert!(matches!(
        err,
        ConfigurationError::MissingCredential { field: "secret_key", .. }
    ));

    let options = BackendOptions::default()
        .with_api_key("ak")
        .with_secret_key("sk")
        .with_model("ep-20240101-abcde");
    let port = create_backend("volcano", &options).unwrap();
    assert_eq!(port.kind(), BackendKind::Volcano);
}

#[test]
fn default_backend_name_is_mock() {
    let port = create_backend(DEFAULT_BACKEND, &BackendOptions::default()).unwrap();
    assert_eq!(port.kind(), BackendKind::Mock);
}

// Single test so no other test in this binary races on the shared slot.
#[tokio::test]
async fn default_backend_is_shared_and_replaceable() {
    let first = default_backend();
    let second = default_backend();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(first.kind(), BackendKind::Mock);

    let scripted: Arc<dyn GenerationPort> = Arc::new(ScriptedBackend::new(["scripted answer"]));
    set_default_backend(Arc::clone(&scripted));

    let replaced = default_backend();
    assert!(Arc::ptr_eq(&replaced, &scripted));
    assert_eq!(
        replaced.generate(&GenerationRequest::new("q")).await,
        "scripted answer"
    );
}
