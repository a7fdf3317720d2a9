use std::path::PathBuf;

use pf_core::DataObjectReference;
use pf_document::{DocumentStore, load_json, load_yaml};
use pf_network::ModelLookup;
use pf_network::resolve::{check_contracts, check_external_pairing, resolve_external_connect};
use uuid::Uuid;

const FIELD_UUID: &str = "6a1f3c2e-9b4d-4e8a-a7c1-2f5d8e9b0c3a";
const TERMINAL_UUID: &str = "c0d4e5f6-1a2b-4c3d-8e9f-0a1b2c3d4e5f";

fn data_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

#[test]
fn load_dir_indexes_by_uuid() {
    init_tracing();
    let mut store = DocumentStore::new();
    assert_eq!(store.load_dir(&data_dir()).unwrap(), 2);
    assert_eq!(store.len(), 2);

    let terminal = store.get(Uuid::parse_str(TERMINAL_UUID).unwrap()).unwrap();
    assert_eq!(terminal.title(), "Terminal");
}

#[test]
fn lookup_only_serves_product_flow_models() {
    let store: DocumentStore = [load_yaml(&data_dir().join("field.yaml")).unwrap()]
        .into_iter()
        .collect();

    let field = DataObjectReference::new(DataObjectReference::PRODUCT_FLOW_MODEL, FIELD_UUID)
        .unwrap();
    assert!(store.lookup(&field).is_some());

    let wrong_type = DataObjectReference::new("ProductVolume", FIELD_UUID).unwrap();
    assert!(store.lookup(&wrong_type).is_none());
}

#[test]
fn external_connections_pair_across_documents() {
    init_tracing();
    let mut store = DocumentStore::new();
    let field = store
        .load_file(&data_dir().join("field.yaml"))
        .unwrap();
    store
        .load_file(&data_dir().join("terminal.json"))
        .unwrap();

    let facility = field.network("Facility").unwrap();
    let target =
        resolve_external_connect(facility, &facility.external_connects()[0], &store).unwrap();
    assert_eq!(target.network().name(), "Terminal");
    assert_eq!(target.port().name, "receipt");

    assert!(check_external_pairing(&field, &store).is_empty());
    assert!(check_contracts(&field).is_clean());
}

#[test]
fn pairing_reports_missing_partner_document() {
    let store: DocumentStore = [load_yaml(&data_dir().join("field.yaml")).unwrap()]
        .into_iter()
        .collect();
    let field = store.get(Uuid::parse_str(FIELD_UUID).unwrap()).unwrap();

    let findings = check_external_pairing(field, &store);
    assert_eq!(findings.len(), 1);
    assert!(findings[0].to_string().starts_with("No document found for"));
}

#[test]
fn reinserting_a_document_replaces_it() {
    let mut store = DocumentStore::new();
    let first = load_json(&data_dir().join("terminal.json")).unwrap();
    store.insert(first.clone());
    store.insert(first);
    assert_eq!(store.len(), 1);
}
