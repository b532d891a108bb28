//! Round-Trip Tests
//!
//! Documents built through the public operations survive serialize → parse
//! in both grammars, including metadata and list lengths.

use rstest::rstest;
use vrmat::{
    Document, ElementId, FormatOptions, Meta, MetaMask, Multiplicity, ParamMeta, ParamType,
    PluginMeta, RootTag, SchemaVersion, TypeDescriptor, ValueInput, parse, serialize,
};

fn add(
    doc: &mut Document,
    plugin: ElementId,
    name: &str,
    ty: ParamType,
    custom: bool,
) -> ElementId {
    doc.add_parameter(plugin, name, ty, custom).unwrap()
}

fn set_floats(
    doc: &mut Document,
    param: ElementId,
    ty: ParamType,
    data: &[f32],
    list: Option<usize>,
) {
    let multiplicity = if list.is_some() { Multiplicity::List } else { Multiplicity::Single };
    doc.set_value(param, ty.descriptor(multiplicity), ValueInput::Floats(data), list.unwrap_or(0))
        .unwrap();
}

/// A material touching every parameter type and both multiplicities.
fn material() -> Document {
    let mut doc = Document::new();
    doc.set_preview_image(b"\x89PNG fake preview");

    let mtl = doc.add_plugin("/Mtl", "MtlSingleBRDF", "material").unwrap();
    let brdf = doc.add_plugin("/Brdf", "BRDFVRayMtl", "bsdf").unwrap();
    let version = Meta::Plugin(PluginMeta {
        version: Some(2),
        ..Default::default()
    });
    doc.set_meta(Some(brdf), MetaMask::PLUGIN_VERSION, &version).unwrap();

    let link = add(&mut doc, mtl, "brdf", ParamType::Plugin, false);
    doc.set_value(
        link,
        ParamType::Plugin.descriptor(Multiplicity::Single),
        ValueInput::Strings(&["/Brdf"]),
        1,
    )
    .unwrap();

    let ior = add(&mut doc, brdf, "fresnel_ior", ParamType::Float, false);
    set_floats(&mut doc, ior, ParamType::Float, &[1.6], None);

    let diffuse = add(&mut doc, brdf, "diffuse", ParamType::AColor, false);
    set_floats(&mut doc, diffuse, ParamType::AColor, &[0.5, 0.25, 0.125, 1.0], None);

    let tints = add(&mut doc, brdf, "tints", ParamType::Color, true);
    set_floats(&mut doc, tints, ParamType::Color, &[1.0, 0.0, 0.0, 0.0, 1.0, 0.0], Some(2));

    let offsets = add(&mut doc, brdf, "offsets", ParamType::Vector, false);
    set_floats(&mut doc, offsets, ParamType::Vector, &[0.1, -2.5, 3.0], None);

    let uvw = add(&mut doc, brdf, "uvw", ParamType::Transform, false);
    let identity = [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 4.0, 5.0, 6.0];
    set_floats(&mut doc, uvw, ParamType::Transform, &identity, None);

    let basis = add(&mut doc, brdf, "basis", ParamType::Matrix, false);
    set_floats(&mut doc, basis, ParamType::Matrix, &identity[..9], None);

    let depth = add(&mut doc, brdf, "reflect_depth", ParamType::Integer, false);
    doc.set_value(depth, TypeDescriptor::int(), ValueInput::Ints(&[-5]), 0)
        .unwrap();

    let flags = add(&mut doc, brdf, "flags", ParamType::Bool, true);
    doc.set_value(
        flags,
        ParamType::Bool.descriptor(Multiplicity::List),
        ValueInput::Ints(&[1, 0, 1]),
        3,
    )
    .unwrap();

    let maps = add(&mut doc, brdf, "maps", ParamType::String, false);
    doc.set_value(
        maps,
        TypeDescriptor::string().into_list(),
        ValueInput::Strings(&["textures/a b.png", "<b>&c.png"]),
        2,
    )
    .unwrap();
    let file = Meta::Param(ParamMeta {
        file_path: Some(true),
        ..Default::default()
    });
    doc.set_meta(Some(maps), MetaMask::PARAM_FILE_PATH, &file).unwrap();

    add(&mut doc, brdf, "unset", ParamType::Color, false);
    doc
}

fn assert_same_graph(expected: &Document, actual: &Document) {
    assert_eq!(actual.plugin_count(), expected.plugin_count());
    assert_eq!(actual.preview(), expected.preview());
    for plugin in expected.plugins() {
        let other = actual.plugin_by_name(plugin.name()).unwrap();
        assert_eq!(other.plugin_type(), plugin.plugin_type());
        assert_eq!(other.class(), plugin.class());
        assert_eq!(other.version(), plugin.version());
        assert_eq!(other.parameter_count(), plugin.parameter_count());

        for param in plugin.parameters() {
            let copy = other.parameter_by_name(param.name()).unwrap();
            assert_eq!(copy.param_type(), param.param_type(), "{}", param.name());
            assert_eq!(copy.is_custom(), param.is_custom(), "{}", param.name());
            assert_eq!(copy.is_file_path(), param.is_file_path(), "{}", param.name());
            assert_eq!(copy.value(), param.value(), "{}", param.name());
        }
    }
}

// ============================================================================
// Both grammars
// ============================================================================

#[rstest]
fn test_round_trip(
    #[values(SchemaVersion::Legacy, SchemaVersion::Compact)] version: SchemaVersion,
    #[values(FormatOptions::default(), FormatOptions::compact())] options: FormatOptions,
) {
    let doc = material();
    let bytes = serialize(&doc, version, &options).unwrap();
    let back = parse(&bytes).unwrap();

    assert_eq!(back.version(), version);
    assert_same_graph(&doc, &back);
    assert_eq!(back.preview_image().unwrap(), doc.preview_image().unwrap());

    let again = serialize(&back, version, &options).unwrap();
    assert_eq!(again, bytes);
}

#[rstest]
fn test_list_lengths_survive(
    #[values(SchemaVersion::Legacy, SchemaVersion::Compact)] version: SchemaVersion,
) {
    let doc = material();
    let back = parse(&serialize(&doc, version, &FormatOptions::default()).unwrap()).unwrap();
    let brdf = back.resolve_id(None, "/Brdf").unwrap();

    for (name, count) in [("tints", 2), ("flags", 3), ("maps", 2), ("diffuse", 1)] {
        let id = back.resolve_id(Some(brdf), name).unwrap();
        let view = back.get_value(id).unwrap().unwrap();
        assert_eq!(view.list_count(), count, "{name}");
    }
    let unset = back.resolve_id(Some(brdf), "unset").unwrap();
    assert!(back.get_value(unset).unwrap().is_none());
}

#[test]
fn test_escaped_strings_round_trip() {
    let doc = material();
    let bytes = serialize(&doc, SchemaVersion::Compact, &FormatOptions::default()).unwrap();
    let text = String::from_utf8(bytes.clone()).unwrap();
    assert!(text.contains("&lt;b&gt;&amp;c.png"), "{text}");

    let back = parse(&bytes).unwrap();
    let maps = back.plugin_by_name("/Brdf").unwrap().parameter_by_name("maps").unwrap();
    let view = maps.value().unwrap().view();
    let entries: Vec<_> = view.strings().unwrap().map(|e| e.value).collect();
    assert_eq!(entries, ["textures/a b.png", "<b>&c.png"]);
}

// ============================================================================
// Edge values
// ============================================================================

#[rstest]
#[case::empty_list_entry(ParamType::String, Multiplicity::List, &["x", ""][..])]
#[case::empty_single(ParamType::String, Multiplicity::Single, &[""][..])]
#[case::empty_reference(ParamType::Plugin, Multiplicity::Single, &[""][..])]
#[case::whitespace_entries(ParamType::String, Multiplicity::List, &["  ", "\t", " a "][..])]
#[case::whitespace_single(ParamType::String, Multiplicity::Single, &["   "][..])]
fn test_edge_strings_round_trip(
    #[case] ty: ParamType,
    #[case] multiplicity: Multiplicity,
    #[case] entries: &[&str],
    #[values(SchemaVersion::Legacy, SchemaVersion::Compact)] version: SchemaVersion,
    #[values(FormatOptions::default(), FormatOptions::compact())] options: FormatOptions,
) {
    let mut doc = Document::new();
    let plugin = doc.add_plugin("/P", "T", "c").unwrap();
    let param = add(&mut doc, plugin, "s", ty, false);
    doc.set_value(param, ty.descriptor(multiplicity), ValueInput::Strings(entries), entries.len())
        .unwrap();

    let back = parse(&serialize(&doc, version, &options).unwrap()).unwrap();
    assert_same_graph(&doc, &back);
    let copy = back.plugin_by_name("/P").unwrap().parameter_by_name("s").unwrap();
    let read: Vec<_> = copy.value().unwrap().view().strings().unwrap().map(|e| e.value).collect();
    assert_eq!(read, entries);
}

#[rstest]
fn test_empty_plugin_type_and_class_round_trip(
    #[values(SchemaVersion::Legacy, SchemaVersion::Compact)] version: SchemaVersion,
    #[values(FormatOptions::default(), FormatOptions::compact())] options: FormatOptions,
) {
    let mut doc = Document::new();
    doc.add_plugin("/A", "", "texture").unwrap();
    doc.add_plugin("/B", "TexBitmap", "").unwrap();
    doc.add_plugin("/C", "", "").unwrap();

    let back = parse(&serialize(&doc, version, &options).unwrap()).unwrap();
    assert_same_graph(&doc, &back);
    assert_eq!(back.plugin_by_name("/A").unwrap().plugin_type(), "");
    assert_eq!(back.plugin_by_name("/B").unwrap().class(), "");
}

#[test]
fn test_empty_category_round_trip() {
    let mut doc = Document::new();
    doc.set_category(Some(String::new()));
    let back = parse(&serialize(&doc, SchemaVersion::Compact, &FormatOptions::default()).unwrap())
        .unwrap();
    assert_eq!(back.category(), Some(""));

    let (mask, _) = back.get_meta(None, MetaMask::ROOT_CATEGORY).unwrap();
    assert_eq!(mask, MetaMask::ROOT_CATEGORY);
}

// ============================================================================
// Migration
// ============================================================================

#[test]
fn test_legacy_to_compact_migration() {
    let mut doc = material();
    doc.set_tag(RootTag::Vismat);
    let legacy = serialize(&doc, SchemaVersion::Legacy, &FormatOptions::default()).unwrap();

    let mut loaded = parse(&legacy).unwrap();
    assert_eq!(loaded.version(), SchemaVersion::Legacy);
    assert_eq!(loaded.tag(), RootTag::Vismat);
    loaded.set_category(Some("metal".into()));

    let compact = serialize(&loaded, SchemaVersion::Compact, &FormatOptions::default()).unwrap();
    let migrated = parse(&compact).unwrap();
    assert_eq!(migrated.version(), SchemaVersion::Compact);
    assert_eq!(migrated.tag(), RootTag::Vrmat);
    assert_eq!(migrated.category(), Some("metal"));
    assert_same_graph(&doc, &migrated);
}

#[test]
fn test_category_not_written_to_legacy() {
    let mut doc = material();
    doc.set_category(Some("metal".into()));
    let bytes = serialize(&doc, SchemaVersion::Legacy, &FormatOptions::default()).unwrap();
    assert!(!String::from_utf8(bytes.clone()).unwrap().contains("metal"));
    assert_eq!(parse(&bytes).unwrap().category(), None);
}

#[test]
fn test_empty_list_stays_a_list() {
    let mut doc = Document::new();
    let plugin = doc.add_plugin("/P", "T", "c").unwrap();
    let param = add(&mut doc, plugin, "empty", ParamType::Float, false);
    set_floats(&mut doc, param, ParamType::Float, &[], Some(0));

    for version in [SchemaVersion::Legacy, SchemaVersion::Compact] {
        let back = parse(&serialize(&doc, version, &FormatOptions::default()).unwrap()).unwrap();
        let id = back.resolve_id(None, "/P").unwrap();
        let param = back.resolve_id(Some(id), "empty").unwrap();
        let view = back.get_value(param).unwrap().unwrap();
        assert!(view.is_list());
        assert_eq!(view.list_count(), 0);
        assert_eq!(back.parameter(param).unwrap().param_type(), ParamType::Float);
    }
}
