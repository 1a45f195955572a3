//! Integration tests for pattern registries and display names

mod common;
use common::*;

use pixel_patterns::{
    Blank, BuiltinPrimary, BuiltinSecondary, ColorSpace, ExprModulation, NO_MODULATION_ID,
    PatternError, PrimaryRegistry, PrimaryRegistry16, RegistryError, SecondaryRegistry,
    SecondaryRegistry16, title_case,
};

#[test]
fn title_case_matches_ui_names() {
    assert_eq!(title_case("bounce_cubic_1d").unwrap().as_str(), "Bounce Cubic 1D");
    assert_eq!(title_case("ramp").unwrap().as_str(), "Ramp");
    assert_eq!(title_case("Ramp").unwrap().as_str(), "Ramp");
    assert_eq!(title_case("RAMP_UP").unwrap().as_str(), "Ramp Up");
    assert_eq!(title_case("").unwrap().as_str(), "");
}

#[test]
fn primary_defaults_list_in_id_order() {
    let registry = PrimaryRegistry16::with_defaults().unwrap();
    let listed: Vec<(u8, &str)> = registry
        .iter()
        .map(|descriptor| (descriptor.id(), descriptor.display_name()))
        .collect();

    let expected: Vec<(u8, &str)> = BuiltinPrimary::ALL
        .iter()
        .map(|pattern| (pattern.id(), pattern.display_name()))
        .collect();
    assert_eq!(listed, expected);
    assert_eq!(listed[5], (5, "Cycle Blackbody 1D"));
}

#[test]
fn secondary_defaults_derive_names_from_identifiers() {
    let registry = SecondaryRegistry16::with_defaults().unwrap();
    let names: Vec<&str> = registry.iter().map(|d| d.display_name()).collect();
    assert_eq!(
        names,
        [
            "None",
            "Sine 1D",
            "Cubic 1D",
            "Ramp 1D",
            "Bounce Triangle 1D",
            "Bounce Sine 1D",
            "Bounce Cubic 1D",
            "Twinkle Pulse 1D",
        ]
    );
}

#[test]
fn lookup_of_unknown_id_fails_fast() {
    let primaries = PrimaryRegistry16::with_defaults().unwrap();
    assert!(matches!(primaries.get(8), Err(RegistryError::NotFound(8))));

    let secondaries = SecondaryRegistry16::with_defaults().unwrap();
    assert!(matches!(secondaries.get(200), Err(RegistryError::NotFound(200))));
    assert!(!secondaries.contains(200));
}

#[test]
fn secondary_zero_is_identity_for_any_input() {
    let registry = SecondaryRegistry16::new().unwrap();
    assert_eq!(registry.len(), 1);
    assert!(!registry.is_empty());
    assert_eq!(registry.get(NO_MODULATION_ID).unwrap().display_name(), "None");

    let odd_state = pixel_patterns::PatternState::from_values(&[-4.0, 9.0, 1.5]).unwrap();
    let mut rng = test_rng();
    for &t in &TIMES {
        for &x in &POSITIONS {
            let modulation = registry
                .evaluate(NO_MODULATION_ID, &sample(t, x), &odd_state, pixel_patterns::COLOR_OFF, &mut rng)
                .unwrap();
            assert_eq!(modulation.brightness, 1.0);
        }
    }
}

#[test]
fn secondary_zero_is_reserved() {
    let custom = ExprModulation::compile("0.5").unwrap();
    let mut registry = SecondaryRegistry16::with_defaults().unwrap();

    assert_eq!(
        registry.register(NO_MODULATION_ID, "half", &custom),
        Err(RegistryError::ReservedId(0))
    );
    assert_eq!(
        registry.register_named(NO_MODULATION_ID, "Half", &custom),
        Err(RegistryError::ReservedId(0))
    );
    assert_eq!(registry.get(0).unwrap().display_name(), "None");
}

#[test]
fn duplicate_ids_are_rejected() {
    let mut registry = PrimaryRegistry16::with_defaults().unwrap();
    assert_eq!(
        registry.register(3, "blank", &Blank),
        Err(RegistryError::DuplicateId(3))
    );
    assert_eq!(registry.get(3).unwrap().display_name(), "RGB Sines 1D");
}

#[test]
fn registering_out_of_order_keeps_ids_sorted() {
    let mut registry = PrimaryRegistry::<4>::new();
    registry.register(9, "blank", &Blank).unwrap();
    registry.register(2, "cycle_hue_1d", &BuiltinPrimary::CycleHue1d).unwrap();
    registry.register(5, "solid_color", &BuiltinPrimary::SolidColor).unwrap();

    let ids: Vec<u8> = registry.iter().map(|d| d.id()).collect();
    assert_eq!(ids, [2, 5, 9]);
}

#[test]
fn full_registry_rejects_more_patterns() {
    let mut registry = PrimaryRegistry::<2>::new();
    registry.register(0, "blank", &Blank).unwrap();
    registry.register(1, "solid_color", &BuiltinPrimary::SolidColor).unwrap();
    assert_eq!(
        registry.register(2, "cycle_hue_1d", &BuiltinPrimary::CycleHue1d),
        Err(RegistryError::RegistryFull)
    );
}

#[test]
fn overlong_names_are_rejected() {
    let mut registry = SecondaryRegistry::<4>::new().unwrap();
    let result = registry.register(
        1,
        "a_very_long_identifier_that_cannot_fit",
        &BuiltinSecondary::Sine1d,
    );
    assert_eq!(result, Err(RegistryError::NameTooLong));
    assert!(registry.get(1).is_err());
}

#[test]
fn evaluate_by_id_dispatches_to_pattern() {
    let registry = PrimaryRegistry16::with_defaults().unwrap();
    let output = registry
        .evaluate(1, &sample(0.25, 0.5), &empty_state(), &test_palette())
        .unwrap();
    assert_eq!(output.space, ColorSpace::Hsv);
    assert!(approx_eq(output.color.channels()[0], 0.75));
}

#[test]
fn evaluate_surfaces_pattern_errors() {
    let registry = PrimaryRegistry16::with_defaults().unwrap();
    let result = registry.evaluate(0, &sample(0.0, 0.0), &empty_state(), &pixel_patterns::Palette::new());
    assert_eq!(
        result,
        Err(RegistryError::Pattern(PatternError::PaletteIndex { index: 0, len: 0 }))
    );
}

#[test]
fn registries_can_be_shared_across_threads() {
    let primaries = PrimaryRegistry16::with_defaults().unwrap();
    let palette = test_palette();

    let results: Vec<f32> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|worker| {
                let primaries = &primaries;
                let palette = &palette;
                scope.spawn(move || {
                    let x = worker as f32 * 0.25;
                    primaries
                        .evaluate(1, &sample(0.0, x), &empty_state(), palette)
                        .unwrap()
                        .color
                        .channels()[0]
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(results, [0.0, 0.25, 0.5, 0.75]);
}

#[test]
fn error_messages_format_correctly_for_display() {
    assert_eq!(
        RegistryError::NotFound(12).to_string(),
        "no pattern registered with id 12"
    );
    assert_eq!(
        RegistryError::Pattern(PatternError::PaletteIndex { index: 2, len: 1 }).to_string(),
        "pattern error: palette index 2 out of range for palette of 1 colors"
    );
}
