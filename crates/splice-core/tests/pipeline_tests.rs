/*!
# Pipeline Integration Tests

Runs the standard rule set over a trimmed-down editor bundle and checks the
injected hooks, the discovered identifiers, and the failure modes.
*/

use splice_core::{patch, Pipeline, SpliceConfig, SpliceError};

const EDITOR: &str = include_str!("fixtures/editor.js");

const RESET_ROUTINE: &str = "function j0Z(){z5i[977]=-1;z5i[450]=-1;z5i[462]=-1;p4Z();v4Z();n4V.a1V();B4Z(true);M4Z();y0Z();I6s();}";

const NEW_MAP_GUARD: &str =
    "if(window.kklee.afterNewMapObject)window.kklee.afterNewMapObject();";

fn standard() -> Pipeline {
    Pipeline::standard(&SpliceConfig::default()).unwrap()
}

#[test]
fn test_standard_rules_run_in_order() -> anyhow::Result<()> {
    let outcome = standard().run(EDITOR)?;

    let rules: Vec<&str> = outcome.report.rules.iter().map(|r| r.rule.as_str()).collect();
    assert_eq!(
        rules,
        vec![
            "map-object",
            "map-encoder",
            "reset-state",
            "undo-history",
            "chat-listener",
            "colour-picker"
        ]
    );
    let sites: Vec<usize> = outcome.report.rules.iter().map(|r| r.sites).collect();
    assert_eq!(sites, vec![3, 1, 1, 1, 1, 1]);
    assert_eq!(outcome.report.bytes_in, EDITOR.len());
    assert_eq!(outcome.report.bytes_out, outcome.text.len());

    Ok(())
}

#[test]
fn test_discovered_identifiers() -> anyhow::Result<()> {
    let outcome = patch(EDITOR, &SpliceConfig::default())?;
    let ids = outcome.bindings();
    let get = |name: &str| ids.get(name).map(|id| id.as_str().to_string());

    assert_eq!(get("ns").as_deref(), Some("window.kklee"));
    assert_eq!(get("map_object").as_deref(), Some("abc[12]"));
    assert_eq!(get("map_container").as_deref(), Some("abc"));
    assert_eq!(get("map_encoder").as_deref(), Some("Q"));
    assert_eq!(get("reset_routine").as_deref(), Some("j0Z"));
    assert_eq!(get("undo_routine").as_deref(), Some("k3Z"));
    assert_eq!(get("colour_picker_key").as_deref(), Some("\"showColorPicker\""));
    assert_eq!(get("update.Renderer").as_deref(), Some("B4Z"));
    assert_eq!(get("selection.Spawn").as_deref(), Some("z5i[450]"));

    Ok(())
}

#[test]
fn test_original_fragments_survive() -> anyhow::Result<()> {
    let outcome = standard().run(EDITOR)?;
    let text = outcome.text.as_str();

    for fragment in [
        "var d={rxid:abc[12],rxn:abc[13]};",
        "function Q(){}",
        "abc[12]=Q[T[1]]();",
        "abc[12]=new Q();",
        RESET_ROUTINE,
        "function k3Z(){if(abc[5]>=20){abc[7].shift();abc[5]--;}abc[7][abc[5]]=Z[3](JSON[T[4]](abc[12]));abc[5]++;}",
        "this[\"chatActive\"]=false;}",
        "M8u(false);e8u(Z8D[0][1]);",
        "function K8u(a){return {hue:a,brightness:a,saturation:a}}",
    ] {
        assert!(text.contains(fragment), "lost fragment: {fragment}");
    }
    assert!(!text.contains("keydown.chat"));

    Ok(())
}

#[test]
fn test_one_guard_per_map_assignment() -> anyhow::Result<()> {
    let outcome = standard().run(EDITOR)?;
    let text = outcome.text.as_str();

    let assignments = EDITOR.matches("abc[12]=").count();
    assert_eq!(assignments, 3);
    assert_eq!(text.matches(NEW_MAP_GUARD).count(), assignments);
    // every call sits behind its guard
    assert_eq!(text.matches("window.kklee.afterNewMapObject()").count(), assignments);

    Ok(())
}

#[test]
fn test_update_routines_keep_their_names() -> anyhow::Result<()> {
    let outcome = standard().run(EDITOR)?;
    let text = outcome.text.as_str();

    assert!(text.contains(&format!("{RESET_ROUTINE};{{let p4ZOLD=p4Z;p4Z=function(){{p4ZOLD(...arguments);")));
    assert_eq!(text.matches("if(window.kklee.afterUpdate").count(), 6);
    for (capability, routine) in [
        ("LeftBox", "p4Z"),
        ("RightBoxBody", "v4Z"),
        ("Renderer", "B4Z"),
        ("Warnings", "M4Z"),
        ("UndoButtons", "y0Z"),
        ("ModeDropdown", "I6s"),
    ] {
        assert!(text.contains(&format!("window.kklee.update{capability}={routine};")));
    }
    // callers are untouched
    assert!(text.contains("p4Z();v4Z();n4V.a1V();B4Z(true);"));
    assert!(text.contains("window.kklee.getCurrentCapZone=function(){return z5i[462];};"));
    assert!(text.contains("window.kklee.saveToUndoHistory=k3Z;function k3Z(){"));
    assert!(text.contains("function Q(){};window.kklee.mapEncoder=Q;"));

    Ok(())
}

#[test]
fn test_colour_picker_setter() -> anyhow::Result<()> {
    let outcome = standard().run(EDITOR)?;
    let text = outcome.text.as_str();

    assert!(text.contains(
        "this[\"showColorPicker\"]=function(H0R,k0R,C0R,u0R){window.kklee.showColourPickerArguments=[...arguments];\n"
    ));
    assert!(text.contains("document.getElementById(\"kkleeColourInput\")"));
    assert!(text.contains(
        "let Kscpa=this[\"showColorPicker\"];window.kklee.setColourPickerColour=function(c){"
    ));

    Ok(())
}

#[test]
fn test_rerun_on_patched_text_is_refused() -> anyhow::Result<()> {
    let mut pipeline = standard();
    let once = pipeline.run(EDITOR)?;

    let err = pipeline.run(once.text.as_str()).unwrap_err();
    assert!(matches!(
        err,
        SpliceError::AlreadyPatched { ref marker } if marker == "window.kklee."
    ));

    Ok(())
}

#[test]
fn test_missing_undo_routine_aborts_run() {
    let text: String = EDITOR
        .lines()
        .filter(|line| !line.starts_with("function k3Z"))
        .map(|line| format!("{line}\n"))
        .collect();

    let mut pipeline = standard();
    let err = pipeline.run(&text).unwrap_err();
    assert!(matches!(err, SpliceError::PatternNotFound { ref rule, .. } if rule == "undo-history"));
    assert!(err.is_format_drift());
    // rules before the failure ran; none after it did
    assert_eq!(pipeline.stats()["reset-state"].applications, 1);
    assert_eq!(pipeline.stats()["chat-listener"].applications, 0);
}

#[test]
fn test_reset_routine_shape_drift() {
    let short = EDITOR.replace("p4Z();v4Z();", "p4Z();");
    let err = standard().run(&short).unwrap_err();
    assert!(matches!(
        err,
        SpliceError::UnexpectedShape { ref rule, expected: 9, actual: 8, .. } if rule == "reset-state"
    ));

    let long = EDITOR.replace("y0Z();I6s();}", "y0Z();I6s();Q1Z();}");
    let err = standard().run(&long).unwrap_err();
    assert!(matches!(
        err,
        SpliceError::UnexpectedShape { expected: 9, actual: 10, .. }
    ));
}

#[test]
fn test_custom_namespace_and_prelude() -> anyhow::Result<()> {
    let config = SpliceConfig::from_json_str(
        r#"{"namespace": "window.ext", "declare_namespace": true, "colour_input_id": "pick"}"#,
    )?;
    let outcome = patch(EDITOR, &config)?;
    let text = outcome.text.as_str();

    assert!(text.starts_with("window.ext=window.ext||{};"));
    assert!(text.contains("window.ext.mapObject=abc[12];"));
    assert!(text.contains("document.getElementById(\"pick\")"));
    assert!(!text.contains("window.kklee"));

    Ok(())
}
