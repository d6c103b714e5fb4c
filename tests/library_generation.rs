//! Definition libraries through generation and file output.

use footprint_tool::config::Config;
use footprint_tool::definitions::Library;
use footprint_tool::error::{DefinitionError, UnresolvedReason};
use footprint_tool::footprint::{generate, FootprintType, Layer};
use footprint_tool::{kicad, output};

const LIBRARY: &str = r#"{
    "DIP": {
        "template": true,
        "type": "through-hole",
        "description": "Dual inline package",
        "pads": [{
            "type": "dual",
            "count": 8,
            "pitch": 2.54,
            "distance": 7.62,
            "size": 1.6,
            "shape": "circle",
            "drillSize": 0.8
        }]
    },
    "DIP-8": {
        "inherit": "DIP",
        "body": [9.27, 6.35, 3.3],
        "excludeFromBom": false
    },
    "SOT-23": {
        "type": "smd",
        "body": { "size": [2.9, 1.3, 1.0], "offset": [0, 0, 0.1] },
        "pads": [
            { "count": 2, "pitch": 1.9, "position": [0, 1.1], "size": [0.6, 0.7], "shape": 0.1 },
            { "count": 1, "position": [0, -1.1], "size": [0.6, 0.7], "number": 3, "shape": 0.1 }
        ],
        "lines": [{ "layer": "F.Fab", "width": 0.1, "points": [-1, 0, 1, 0] }]
    },
    "MOUNT": {
        "pads": [{ "drillSize": 3.2, "names": [""] }, { "drillSize": 3.2, "position": 5 }],
        "excludeFromBom": true,
        "excludeFromPosFiles": true
    }
}"#;

#[test]
fn generates_every_non_template() {
    let library = Library::from_json_str(LIBRARY).unwrap();
    let names: Vec<&str> = library.generated().map(|(name, _)| name).collect();
    assert_eq!(names, vec!["DIP-8", "SOT-23", "MOUNT"]);

    let config = Config::default();
    for (name, spec) in library.generated() {
        let fp = generate(name, spec, &config).unwrap();
        let text = kicad::write_footprint(&fp);
        assert!(text.starts_with(&format!("(footprint \"{name}\"")));
    }
}

#[test]
fn inherited_dip_has_drilled_pads() {
    let library = Library::from_json_str(LIBRARY).unwrap();
    let fp = generate("DIP-8", library.get("DIP-8").unwrap(), &Config::default()).unwrap();

    assert_eq!(fp.kind, FootprintType::ThroughHole);
    assert_eq!(fp.description, "Dual inline package");
    assert_eq!(fp.pads.len(), 8);
    assert!(fp.pads.iter().all(|p| p.has_drill()));

    let text = kicad::write_footprint(&fp);
    assert_eq!(text.matches("thru_hole circle").count(), 8);
    assert!(text.contains("(attr through_hole)"));
    assert!(text.contains("(model \"DIP-8.wrl\""));
    assert!(text.contains("(layer \"F.CrtYd\")"));
}

#[test]
fn sot23_pads_lines_and_body() {
    let library = Library::from_json_str(LIBRARY).unwrap();
    let fp = generate("SOT-23", library.get("SOT-23").unwrap(), &Config::default()).unwrap();

    let names: Vec<&str> = fp.pads.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["1", "2", "3"]);
    assert_eq!(fp.kind, FootprintType::Smd);

    let body = fp.body.unwrap();
    assert!((body.center.z - 0.1).abs() < f64::EPSILON);

    let fab_lines = fp
        .segments
        .iter()
        .filter(|s| s.layer == Layer::Fabrication)
        .count();
    // chamfered body outline plus the auxiliary line
    assert_eq!(fab_lines, 6);

    let text = kicad::write_footprint(&fp);
    assert!(text.contains("smd roundrect (roundrect_rratio 0.1)"));
}

#[test]
fn hole_only_pads() {
    let library = Library::from_json_str(LIBRARY).unwrap();
    let fp = generate("MOUNT", library.get("MOUNT").unwrap(), &Config::default()).unwrap();

    // the first hole is removed by its empty name
    assert_eq!(fp.pads.len(), 1);
    assert!(fp.body.is_none());

    let text = kicad::write_footprint(&fp);
    assert!(text.contains("(pad \"\" np_thru_hole circle (at 5 5) (size 3.2 3.2) (drill 3.2)"));
    assert!(text.contains("exclude_from_pos_files exclude_from_bom"));
    assert!(!text.contains("(model"));
}

#[test]
fn forward_inheritance_is_rejected() {
    let json = r#"{ "SOIC-8": { "inherit": "SOIC" }, "SOIC": { "template": true } }"#;
    let error = Library::from_json_str(json).unwrap_err();
    assert!(matches!(
        error,
        DefinitionError::UnresolvedBase {
            reason: UnresolvedReason::DefinedLater,
            ..
        }
    ));
    assert!(error.to_string().contains("defined later"));
}

#[tokio::test]
async fn writes_library_to_directory() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("parts.json");
    tokio::fs::write(&input, LIBRARY).await.unwrap();

    let text = output::read_definitions(&input).await.unwrap();
    let library = Library::from_json_str(&text).unwrap();
    let config = Config::default();

    let out = dir.path().join("generated");
    for (name, spec) in library.generated() {
        let fp = generate(name, spec, &config).unwrap();
        output::write_outputs(&out, &fp).await.unwrap();
    }

    assert!(out.join("DIP-8.kicad_mod").exists());
    assert!(out.join("DIP-8.wrl").exists());
    assert!(out.join("SOT-23.wrl").exists());
    assert!(out.join("MOUNT.kicad_mod").exists());
    assert!(!out.join("MOUNT.wrl").exists());
    assert!(!out.join("DIP.kicad_mod").exists());
}
