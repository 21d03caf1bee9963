//! Integration tests for ConverterRegistry
//!
//! These tests complement the unit tests in registry.rs and dispatch.rs by
//! driving a registry the way a worker does: built once, then shared by many
//! threads decoding and encoding concurrently.

use std::collections::HashMap;
use std::sync::Arc;
use std::thread;

use worker_bindings::scalar::decode_scalar;
use worker_bindings::{
    BindingKind, ConverterRegistration, ConverterRegistry, Error, FunctionManifest, NativeType,
    NativeValue, Result, RpcHttp, ScalarType, TriggerMetadata, TypedData,
};

// ============================================================================
// Converters
// ============================================================================

fn http_check(ty: &NativeType) -> bool {
    *ty == NativeType::Http
}

fn http_trigger_decode(data: &TypedData, _meta: Option<&TriggerMetadata>) -> Result<NativeValue> {
    match data {
        TypedData::Http(http) => Ok(NativeValue::Http(http.clone())),
        _ => Err(Error::NotImplemented),
    }
}

fn http_encode(value: &NativeValue) -> Result<TypedData> {
    match value {
        NativeValue::Http(http) => Ok(TypedData::Http(http.clone())),
        NativeValue::Str(body) => Ok(TypedData::Http(RpcHttp {
            status_code: Some("200".into()),
            body: Some(Box::new(TypedData::String(body.clone()))),
            ..Default::default()
        })),
        _ => Err(Error::NotImplemented),
    }
}

fn counter_check(ty: &NativeType) -> bool {
    *ty == NativeType::Int
}

fn counter_decode(data: &TypedData, _meta: Option<&TriggerMetadata>) -> Result<NativeValue> {
    decode_scalar(Some(data), ScalarType::Int, "counter")
}

fn counter_encode(value: &NativeValue) -> Result<TypedData> {
    value.as_i64().map(TypedData::Int).ok_or(Error::NotImplemented)
}

fn build_registry() -> ConverterRegistry {
    ConverterRegistry::from_registrations([
        ConverterRegistration::new(BindingKind::HttpTrigger, http_check).with_decode(http_trigger_decode),
        ConverterRegistration::new(BindingKind::Http, |ty| {
            matches!(ty, NativeType::Http | NativeType::Str)
        })
        .with_encode(http_encode),
        ConverterRegistration::new(BindingKind::Queue, counter_check)
            .with_decode(counter_decode)
            .with_encode(counter_encode),
    ])
    .expect("registrations are unique")
}

// ============================================================================
// Registration
// ============================================================================

#[test]
fn test_duplicate_in_batch_rejected() {
    let result = ConverterRegistry::from_registrations([
        ConverterRegistration::new(BindingKind::Queue, counter_check),
        ConverterRegistration::new(BindingKind::Blob, counter_check),
        ConverterRegistration::new(BindingKind::Queue, http_check).with_decode(http_trigger_decode),
    ]);

    match result {
        Err(Error::ConfigError(msg)) => assert!(msg.contains("queue binding"), "{}", msg),
        other => panic!("Expected ConfigError, got {:?}", other),
    }
}

#[test]
fn test_concurrent_registration_admits_one() {
    let registry = Arc::new(ConverterRegistry::new());

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                registry
                    .register(ConverterRegistration::new(BindingKind::Blob, counter_check))
                    .is_ok()
            })
        })
        .collect();

    let successes = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|ok| *ok)
        .count();

    assert_eq!(successes, 1, "Exactly one registration should win");
    assert_eq!(registry.len(), 1);
}

// ============================================================================
// Dispatch
// ============================================================================

#[test]
fn test_http_round_trip_through_bindings() {
    let registry = build_registry();

    let request = RpcHttp {
        method: "GET".into(),
        url: "https://localhost/api/items?id=1".into(),
        query: HashMap::from([("id".to_string(), "1".to_string())]),
        ..Default::default()
    };

    let value = registry
        .decode_incoming(BindingKind::HttpTrigger, &TypedData::Http(request.clone()), None)
        .unwrap();
    assert_eq!(value, NativeValue::Http(request));
    assert!(registry
        .check_bind_type_matches(BindingKind::HttpTrigger, &value.native_type())
        .unwrap());

    let response = registry
        .encode_outgoing(BindingKind::Http, &NativeValue::from("ok"))
        .unwrap();
    match response {
        TypedData::Http(http) => {
            assert_eq!(http.status_code.as_deref(), Some("200"));
            assert_eq!(http.body.as_deref(), Some(&TypedData::String("ok".into())));
        }
        other => panic!("Expected http response, got {:?}", other),
    }
}

#[test]
fn test_decoded_values_satisfy_type_check() {
    let registry = build_registry();

    let inputs = [
        (BindingKind::Queue, TypedData::Int(4)),
        (BindingKind::Queue, TypedData::from("12")),
        (BindingKind::Queue, TypedData::Json("7".into())),
        (BindingKind::Queue, TypedData::Double(9.5)),
        (BindingKind::HttpTrigger, TypedData::Http(RpcHttp::default())),
    ];

    for (binding, data) in inputs {
        let value = registry.decode_incoming(binding, &data, None).unwrap();
        assert!(
            registry.check_bind_type_matches(binding, &value.native_type()).unwrap(),
            "{} produced {:?}",
            binding,
            value
        );
    }
}

#[test]
fn test_http_trigger_declines_non_http_payload() {
    let registry = build_registry();
    let err = registry
        .decode_incoming(BindingKind::HttpTrigger, &TypedData::Stream(vec![0]), None)
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "unable to decode incoming TypedData: unsupported combination of TypedData field 'stream' and expected binding type httpTrigger"
    );
}

#[test]
fn test_concurrent_dispatch() {
    let registry = Arc::new(build_registry());

    let handles: Vec<_> = (0..16i64)
        .map(|i| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                let decoded = registry
                    .decode_incoming(BindingKind::Queue, &TypedData::from(i.to_string()), None)
                    .unwrap();
                let encoded = registry.encode_outgoing(BindingKind::Queue, &decoded).unwrap();
                assert_eq!(encoded, TypedData::Int(i));

                // Failures on one thread leave the registry usable for the rest
                assert!(registry
                    .decode_incoming(BindingKind::Queue, &TypedData::Bytes(vec![]), None)
                    .is_err());
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}

// ============================================================================
// Manifest validation
// ============================================================================

#[test]
fn test_manifest_validation_against_registry() {
    let registry = build_registry();
    let manifest = FunctionManifest::from_json(
        r#"{
            "bindings": [
                { "name": "req", "type": "httpTrigger", "direction": "in", "authLevel": "anonymous" },
                { "name": "$return", "type": "http", "direction": "out" }
            ]
        }"#,
    )
    .unwrap();

    let params = HashMap::from([("req".to_string(), NativeType::Http)]);
    manifest.validate(&registry, &params).unwrap();

    let wrong = HashMap::from([("req".to_string(), NativeType::Str)]);
    assert!(matches!(
        manifest.validate(&registry, &wrong),
        Err(Error::InvalidManifest(_))
    ));
}
