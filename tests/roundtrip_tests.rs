//! Import/export round trips against both repository implementations.
//!
//! Every scenario runs once on SQLite (in memory) and once on the
//! in-process [`MemoryRepository`], so both stores are held to the same
//! behavior.

use serde_json::{json, Value};

use jbrowse_config_sync::core::assembly::SequenceAdapterKind;
use jbrowse_config_sync::core::display::{Renderer, RendererPayload};
use jbrowse_config_sync::core::track::TrackAdapterKind;
use jbrowse_config_sync::core::types::ParentType;
use jbrowse_config_sync::document::differences;
use jbrowse_config_sync::store::SequenceAdapterLookup;
use jbrowse_config_sync::{
    export_config, import_config, ConfigDocument, ConfigRepository, ErrorKind, MemoryRepository,
    SkipReason, SqliteRepository,
};

const CONFIG: &str = include_str!("data/config.json");

fn fixture() -> ConfigDocument {
    ConfigDocument::from_json(CONFIG).unwrap()
}

fn sqlite() -> SqliteRepository {
    SqliteRepository::open_in_memory().unwrap()
}

fn track<'a>(document: &'a ConfigDocument, track_id: &str) -> &'a Value {
    document
        .tracks
        .iter()
        .find(|t| t["trackId"] == track_id)
        .unwrap_or_else(|| panic!("track {track_id} missing from export"))
}

fn assembly<'a>(document: &'a ConfigDocument, name: &str) -> &'a Value {
    document
        .assemblies
        .iter()
        .find(|a| a["name"] == name)
        .unwrap_or_else(|| panic!("assembly {name} missing from export"))
}

fn volvox_assembly() -> Value {
    fixture().assemblies[0].clone()
}

fn hg38_bam_track() -> Value {
    let document = fixture();
    track(&document, "hg38_reads").clone()
}

/// The fixture with `edit` applied to the track `track_id`
fn fixture_with_track(track_id: &str, edit: impl FnOnce(&mut Value)) -> ConfigDocument {
    let document = fixture();
    let mut tracks = document.tracks.clone();
    let target = tracks
        .iter_mut()
        .find(|t| t["trackId"] == track_id)
        .unwrap_or_else(|| panic!("track {track_id} missing from fixture"));
    edit(target);
    ConfigDocument::from_fragments(document.assemblies.clone(), tracks)
}

fn assert_store_is_empty<R: ConfigRepository>(repo: &R) {
    assert!(repo.assemblies().unwrap().is_empty());
    assert!(repo.sequence_adapters().unwrap().is_empty());
    assert!(repo.tracks().unwrap().is_empty());
    assert!(repo.ref_name_alias_features().unwrap().is_empty());
}

// ============================================================================
// Full round trip
// ============================================================================

fn full_round_trip_is_identical<R: ConfigRepository>(mut repo: R) {
    let document = fixture();
    let report = import_config(&mut repo, &document).unwrap();

    assert_eq!(report.assemblies, 2);
    assert_eq!(report.sequence_adapters, 2);
    assert_eq!(report.ref_name_alias_features, 2);
    assert_eq!(report.tracks, 5);
    assert_eq!(report.track_adapters, 5);
    assert_eq!(report.displays, 5);
    assert_eq!(report.renderers, 5);
    assert!(report.skipped.is_empty(), "{:?}", report.skipped);

    let outcome = export_config(&repo).unwrap();
    assert!(outcome.report.omitted.is_empty(), "{:?}", outcome.report.omitted);

    let expected = json!({"assemblies": document.assemblies, "tracks": document.tracks});
    let actual = json!({
        "assemblies": outcome.document.assemblies,
        "tracks": outcome.document.tracks,
    });
    let found = differences(&expected, &actual);
    assert!(found.is_empty(), "round trip changed the document: {found:#?}");
}

#[test]
fn test_full_round_trip_sqlite() {
    full_round_trip_is_identical(sqlite());
}

#[test]
fn test_full_round_trip_memory() {
    full_round_trip_is_identical(MemoryRepository::new());
}

// ============================================================================
// File locations
// ============================================================================

fn locations_keep_their_fields<R: ConfigRepository>(mut repo: R) {
    import_config(&mut repo, &fixture()).unwrap();
    let exported = export_config(&repo).unwrap().document;

    let genes = &track(&exported, "volvox_genes")["adapter"];
    assert_eq!(genes["gffGzLocation"]["uri"], "volvox.sort.gff3.gz");
    assert_eq!(genes["index"]["location"]["uri"], "volvox.sort.gff3.gz.tbi");
    assert_eq!(genes["index"]["indexType"], "TBI");

    let cram = &track(&exported, "volvox_cram")["adapter"];
    assert_eq!(cram["cramLocation"]["uri"], "volvox.cram");
    assert_eq!(cram["craiLocation"]["uri"], "volvox.cram.crai");
    assert!(cram.get("index").is_none());

    let hg38 = &assembly(&exported, "hg38")["sequence"]["adapter"];
    assert_eq!(hg38["fastaLocation"]["uri"], "hg38.fa.gz");
    assert_eq!(hg38["faiLocation"]["uri"], "hg38.fa.gz.fai");
    assert_eq!(hg38["gziLocation"]["uri"], "hg38.fa.gz.gzi");

    let volvox = &assembly(&exported, "volvox")["sequence"]["adapter"];
    assert!(volvox.get("gziLocation").is_none());
    assert_eq!(volvox["metadataLocation"]["uri"], "volvox.meta.json");
}

#[test]
fn test_locations_keep_their_fields_sqlite() {
    locations_keep_their_fields(sqlite());
}

#[test]
fn test_locations_keep_their_fields_memory() {
    locations_keep_their_fields(MemoryRepository::new());
}

// ============================================================================
// Sequence adapter references
// ============================================================================

fn bam_track_references_assembly_adapter<R: ConfigRepository>(mut repo: R) {
    import_config(&mut repo, &fixture()).unwrap();

    let adapter_id = repo
        .find_sequence_adapter("hg38", SequenceAdapterKind::BgzipFasta)
        .unwrap()
        .expect("hg38 BgzipFastaAdapter row");
    let track_row = repo
        .tracks()
        .unwrap()
        .into_iter()
        .find(|t| t.track_id == "hg38_reads")
        .unwrap();
    let bam = repo
        .track_adapter(TrackAdapterKind::Bam, track_row.id)
        .unwrap()
        .expect("BamAdapter row");

    assert_eq!(bam.sequence_adapter_id, Some(adapter_id));
    assert_eq!(bam.sequence_adapter_type.as_deref(), Some("BgzipFastaAdapter"));
}

#[test]
fn test_bam_track_references_assembly_adapter_sqlite() {
    bam_track_references_assembly_adapter(sqlite());
}

#[test]
fn test_bam_track_references_assembly_adapter_memory() {
    bam_track_references_assembly_adapter(MemoryRepository::new());
}

fn unresolved_reference_keeps_track<R: ConfigRepository>(mut repo: R) {
    let document = ConfigDocument::from_fragments(vec![volvox_assembly()], vec![hg38_bam_track()]);

    let report = import_config(&mut repo, &document).unwrap();
    assert_eq!(report.tracks, 1);
    assert_eq!(report.track_adapters, 0);

    let unresolved: Vec<_> = report.skipped_for(SkipReason::UnresolvedReference).collect();
    assert_eq!(unresolved.len(), 1);
    assert_eq!(unresolved[0].owner, "hg38_reads");
    assert_eq!(unresolved[0].entity, "track adapter");

    let track_row = repo
        .tracks()
        .unwrap()
        .into_iter()
        .find(|t| t.track_id == "hg38_reads")
        .expect("track committed without its adapter");
    assert!(repo
        .track_adapter(TrackAdapterKind::Bam, track_row.id)
        .unwrap()
        .is_none());

    let outcome = export_config(&repo).unwrap();
    assert!(track(&outcome.document, "hg38_reads").get("adapter").is_none());
    assert_eq!(outcome.report.omitted.len(), 1);
    assert_eq!(outcome.report.omitted[0].reason, SkipReason::NotStored);
}

#[test]
fn test_unresolved_reference_keeps_track_sqlite() {
    unresolved_reference_keeps_track(sqlite());
}

#[test]
fn test_unresolved_reference_keeps_track_memory() {
    unresolved_reference_keeps_track(MemoryRepository::new());
}

// ============================================================================
// Displays and renderers
// ============================================================================

fn renderers_keep_their_slots<R: ConfigRepository>(mut repo: R) {
    import_config(&mut repo, &fixture()).unwrap();
    let exported = export_config(&repo).unwrap().document;

    let synteny = &track(&exported, "volvox_hg38_synteny")["displays"][0];
    assert!(synteny.get("renderer").is_none());
    assert_eq!(synteny["renderers"]["linear"]["type"], "LinearSyntenyRenderer");
    assert_eq!(synteny["renderers"]["linear"]["color"], "rgba(255,0,0,0.3)");
    assert_eq!(synteny["renderers"]["dotplot"]["lineWidth"], 2);

    let variants = &track(&exported, "volvox_variants")["displays"];
    assert_eq!(variants.as_array().map(Vec::len), Some(1));
    assert!(variants[0].get("renderer").is_none());
    assert!(variants[0].get("renderers").is_none());

    let genes = &track(&exported, "volvox_genes")["displays"][0]["renderer"];
    assert_eq!(genes["labels"]["name"], "jexl:get(feature,'name')");

    let refseq = &assembly(&exported, "volvox")["sequence"]["displays"][0];
    assert_eq!(refseq["renderer"]["type"], "DivSequenceRenderer");
}

#[test]
fn test_renderers_keep_their_slots_sqlite() {
    renderers_keep_their_slots(sqlite());
}

#[test]
fn test_renderers_keep_their_slots_memory() {
    renderers_keep_their_slots(MemoryRepository::new());
}

fn unrecognized_renderer_round_trips<R: ConfigRepository>(mut repo: R) {
    let document = fixture_with_track("volvox_genes", |genes| {
        genes["displays"][0]["renderer"]["type"] = json!("LinearManhattanRenderer");
    });

    let report = import_config(&mut repo, &document).unwrap();
    assert_eq!(report.renderers, 5);
    assert!(report.skipped.is_empty(), "{:?}", report.skipped);

    let outcome = export_config(&repo).unwrap();
    assert!(outcome.report.omitted.is_empty(), "{:?}", outcome.report.omitted);
    let renderer = &track(&outcome.document, "volvox_genes")["displays"][0]["renderer"];
    assert_eq!(renderer["type"], "LinearManhattanRenderer");
    assert_eq!(renderer["labels"]["name"], "jexl:get(feature,'name')");
}

#[test]
fn test_unrecognized_renderer_round_trips_sqlite() {
    unrecognized_renderer_round_trips(sqlite());
}

#[test]
fn test_unrecognized_renderer_round_trips_memory() {
    unrecognized_renderer_round_trips(MemoryRepository::new());
}

fn untyped_stored_renderer_is_reported<R: ConfigRepository>(mut repo: R) {
    import_config(&mut repo, &fixture()).unwrap();
    let variants = repo
        .display_renderers(ParentType::Track)
        .unwrap()
        .into_iter()
        .find(|row| row.display_id == "volvox_variants-LinearVariantDisplay")
        .expect("variant display row");
    repo.insert_renderer(
        variants.display_row_id,
        &Renderer {
            key: "renderer".to_string(),
            renderer_type: String::new(),
            payload: RendererPayload::default(),
        },
    )
    .unwrap();

    let outcome = export_config(&repo).unwrap();
    assert_eq!(outcome.report.renderers, 5);
    assert_eq!(outcome.report.omitted.len(), 1);
    let omitted = &outcome.report.omitted[0];
    assert_eq!(omitted.entity, "renderer");
    assert_eq!(omitted.owner, "volvox_variants-LinearVariantDisplay");
    assert_eq!(omitted.reason, SkipReason::MissingRequiredField);

    let display = &track(&outcome.document, "volvox_variants")["displays"][0];
    assert!(display.get("renderer").is_none());
}

#[test]
fn test_untyped_stored_renderer_is_reported_sqlite() {
    untyped_stored_renderer_is_reported(sqlite());
}

#[test]
fn test_untyped_stored_renderer_is_reported_memory() {
    untyped_stored_renderer_is_reported(MemoryRepository::new());
}

// ============================================================================
// Reference-name aliases
// ============================================================================

fn empty_alias_table_is_dropped<R: ConfigRepository>(mut repo: R) {
    let mut volvox = volvox_assembly();
    volvox["refNameAliases"]["adapter"]["features"] = json!([]);
    let document = ConfigDocument::from_fragments(vec![volvox], Vec::new());

    let report = import_config(&mut repo, &document).unwrap();
    assert_eq!(report.ref_name_alias_features, 0);
    assert!(repo.ref_name_alias_features().unwrap().is_empty());

    let exported = export_config(&repo).unwrap().document;
    assert!(assembly(&exported, "volvox").get("refNameAliases").is_none());
}

#[test]
fn test_empty_alias_table_is_dropped_sqlite() {
    empty_alias_table_is_dropped(sqlite());
}

#[test]
fn test_empty_alias_table_is_dropped_memory() {
    empty_alias_table_is_dropped(MemoryRepository::new());
}

fn empty_display_name_round_trips<R: ConfigRepository>(mut repo: R) {
    let mut volvox = volvox_assembly();
    volvox["displayName"] = json!("");
    volvox["refNameAliases"]["adapter"]["features"][1]["uniqueId"] = json!("");
    let document = ConfigDocument::from_fragments(vec![volvox.clone()], Vec::new());

    import_config(&mut repo, &document).unwrap();
    let exported = export_config(&repo).unwrap().document;

    let found = differences(&volvox, assembly(&exported, "volvox"));
    assert!(found.is_empty(), "round trip changed the assembly: {found:#?}");
}

#[test]
fn test_empty_display_name_round_trips_sqlite() {
    empty_display_name_round_trips(sqlite());
}

#[test]
fn test_empty_display_name_round_trips_memory() {
    empty_display_name_round_trips(MemoryRepository::new());
}

// ============================================================================
// Failure handling
// ============================================================================

fn short_paf_rolls_back<R: ConfigRepository>(mut repo: R) {
    let document = fixture();
    let mut tracks = document.tracks.clone();
    let synteny = tracks
        .iter_mut()
        .find(|t| t["trackId"] == "volvox_hg38_synteny")
        .unwrap();
    synteny["adapter"]["assemblyNames"] = json!(["volvox"]);
    let broken = ConfigDocument::from_fragments(document.assemblies.clone(), tracks);

    let err = import_config(&mut repo, &broken).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingRequiredField);
    assert!(err.to_string().contains("PAFAdapter"));
    assert_store_is_empty(&repo);
}

#[test]
fn test_short_paf_rolls_back_sqlite() {
    short_paf_rolls_back(sqlite());
}

#[test]
fn test_short_paf_rolls_back_memory() {
    short_paf_rolls_back(MemoryRepository::new());
}

fn sequence_adapter_without_type_rolls_back<R: ConfigRepository>(mut repo: R) {
    let broken = fixture_with_track("hg38_reads", |reads| {
        reads["adapter"]["sequenceAdapter"]
            .as_object_mut()
            .unwrap()
            .remove("type");
    });

    let err = import_config(&mut repo, &broken).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingRequiredField);
    assert!(err.to_string().contains("sequenceAdapter.type"));
    assert_store_is_empty(&repo);
}

#[test]
fn test_sequence_adapter_without_type_rolls_back_sqlite() {
    sequence_adapter_without_type_rolls_back(sqlite());
}

#[test]
fn test_sequence_adapter_without_type_rolls_back_memory() {
    sequence_adapter_without_type_rolls_back(MemoryRepository::new());
}

fn tabix_without_assembly_names_rolls_back<R: ConfigRepository>(mut repo: R) {
    let broken = fixture_with_track("volvox_genes", |genes| {
        genes["assemblyNames"] = json!([]);
    });

    let err = import_config(&mut repo, &broken).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingRequiredField);
    assert!(err.to_string().contains("Gff3TabixAdapter"));
    assert_store_is_empty(&repo);
}

#[test]
fn test_tabix_without_assembly_names_rolls_back_sqlite() {
    tabix_without_assembly_names_rolls_back(sqlite());
}

#[test]
fn test_tabix_without_assembly_names_rolls_back_memory() {
    tabix_without_assembly_names_rolls_back(MemoryRepository::new());
}

fn unknown_adapter_type_is_skipped<R: ConfigRepository>(mut repo: R) {
    let foo = json!({
        "type": "FeatureTrack",
        "trackId": "foo_track",
        "name": "Foo",
        "assemblyNames": ["volvox"],
        "adapter": {"type": "FooAdapter", "fooLocation": {"uri": "x.foo"}},
        "displays": []
    });
    let mut tracks = fixture().tracks;
    tracks.push(foo);
    let document = ConfigDocument::from_fragments(fixture().assemblies, tracks);

    let report = import_config(&mut repo, &document).unwrap();
    assert_eq!(report.tracks, 6);
    assert_eq!(report.track_adapters, 5);

    let unknown: Vec<_> = report.skipped_for(SkipReason::UnknownVariant).collect();
    assert_eq!(unknown.len(), 1);
    assert_eq!(unknown[0].owner, "foo_track");

    let outcome = export_config(&repo).unwrap();
    let exported = track(&outcome.document, "foo_track");
    assert!(exported.get("adapter").is_none());
    assert_eq!(outcome.document.tracks.len(), 6);
}

#[test]
fn test_unknown_adapter_type_is_skipped_sqlite() {
    unknown_adapter_type_is_skipped(sqlite());
}

#[test]
fn test_unknown_adapter_type_is_skipped_memory() {
    unknown_adapter_type_is_skipped(MemoryRepository::new());
}

#[test]
fn test_missing_track_id_is_fatal() {
    let mut repo = MemoryRepository::new();
    let mut bad = hg38_bam_track();
    bad.as_object_mut().unwrap().remove("trackId");
    let document = ConfigDocument::from_fragments(fixture().assemblies, vec![bad]);

    let err = import_config(&mut repo, &document).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingRequiredField);
    assert!(err.to_string().contains("trackId"));
    assert!(repo.assemblies().unwrap().is_empty());
}
