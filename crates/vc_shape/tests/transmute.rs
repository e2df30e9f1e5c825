#![expect(unsafe_code, reason = "The fast reinterpreter is checked against the copying one.")]

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use vc_shape::transmute::{
    ReinterpretMode, Reinterpreter, TransmuteError, derive_serialization_shape,
};
use vc_shape::{Shaped, ValueRef};

const EXPECTED: &str = r#"{"make":"Chevrolet","model":"Celebrity","engine":{"hp":130,"fuel":"gasoline"},"available_colors":[{"base":"red","metallic":true},{"base":"blue","metallic":false}],"preferred_colors":[{"base":"red","metallic":true}],"since":"1982-01-01T00:00:00Z","price":"10000"}"#;

#[derive(Clone, Shaped)]
struct Engine {
    #[shape(tag(json = "hp"))]
    pub horse_power: i64,
    #[shape(tag(json = "fuel"))]
    pub fuel: String,
}

#[derive(Clone, Shaped)]
struct Color {
    #[shape(tag(json = "base"))]
    pub base: String,
    #[shape(tag(json = "metallic"))]
    pub metallic: bool,
}

#[derive(Clone, Shaped)]
struct Car {
    #[shape(tag(json = "make"))]
    pub manufacturer: String,
    #[shape(tag(json = "model"))]
    pub model: String,
    #[shape(tag(json = "engine"))]
    pub engine: Engine,
    #[shape(tag(json = "available_colors"))]
    pub available_colors: Vec<Color>,
    #[shape(tag(json = "preferred_colors"))]
    pub preferred_colors: Vec<Box<Color>>,
    #[shape(tag(json = "since"))]
    pub since: DateTime<Utc>,
    #[shape(tag(json = "price"))]
    pub price: Decimal,
}

fn red() -> Color {
    Color {
        base: "red".into(),
        metallic: true,
    }
}

fn celebrity() -> Car {
    Car {
        manufacturer: "Chevrolet".into(),
        model: "Celebrity".into(),
        engine: Engine {
            horse_power: 130,
            fuel: "gasoline".into(),
        },
        available_colors: vec![
            red(),
            Color {
                base: "blue".into(),
                metallic: false,
            },
        ],
        preferred_colors: vec![Box::new(red())],
        since: Utc.with_ymd_and_hms(1982, 1, 1, 0, 0, 0).unwrap(),
        price: Decimal::from(10000),
    }
}

// Field-by-field encoding of the same data, written by hand with serde.
#[derive(Serialize)]
struct ReferenceEngine<'a> {
    hp: i64,
    fuel: &'a str,
}

#[derive(Serialize)]
struct ReferenceColor<'a> {
    base: &'a str,
    metallic: bool,
}

#[derive(Serialize)]
struct ReferenceCar<'a> {
    make: &'a str,
    model: &'a str,
    engine: ReferenceEngine<'a>,
    available_colors: Vec<ReferenceColor<'a>>,
    preferred_colors: Vec<ReferenceColor<'a>>,
    since: DateTime<Utc>,
    price: Decimal,
}

fn reference_color(color: &Color) -> ReferenceColor<'_> {
    ReferenceColor {
        base: &color.base,
        metallic: color.metallic,
    }
}

fn reference(car: &Car) -> String {
    let reference = ReferenceCar {
        make: &car.manufacturer,
        model: &car.model,
        engine: ReferenceEngine {
            hp: car.engine.horse_power,
            fuel: &car.engine.fuel,
        },
        available_colors: car.available_colors.iter().map(reference_color).collect(),
        preferred_colors: car.preferred_colors.iter().map(|c| reference_color(c)).collect(),
        since: car.since,
        price: car.price,
    };
    serde_json::to_string(&reference).unwrap()
}

fn reinterpreter(mode: ReinterpretMode) -> Reinterpreter {
    let shape = derive_serialization_shape(Car::shape(), "json").unwrap();
    match mode {
        ReinterpretMode::Reconstruct => Reinterpreter::new(shape),
        ReinterpretMode::Checked => Reinterpreter::checked(shape),
        // SAFETY: only `Car` values are applied.
        ReinterpretMode::Unchecked => unsafe { Reinterpreter::unchecked(shape) },
    }
}

#[test]
fn every_mode_renames_keys() {
    let car = celebrity();
    for mode in [
        ReinterpretMode::Reconstruct,
        ReinterpretMode::Checked,
        ReinterpretMode::Unchecked,
    ] {
        let reinterpreter = reinterpreter(mode);
        let value = reinterpreter.apply(ValueRef::new(&car)).unwrap();
        assert_eq!(serde_json::to_string(&value).unwrap(), EXPECTED, "{mode:?}");
    }
}

#[test]
fn zero_copy_matches_field_by_field_encoding() {
    let mut car = celebrity();
    let fast = reinterpreter(ReinterpretMode::Checked);
    let slow = reinterpreter(ReinterpretMode::Reconstruct);

    let check = |car: &Car| {
        let expected = reference(car);
        let fast = serde_json::to_string(&fast.apply(ValueRef::new(car)).unwrap()).unwrap();
        let slow = serde_json::to_string(&slow.apply(ValueRef::new(car)).unwrap()).unwrap();
        assert_eq!(fast, expected);
        assert_eq!(slow, expected);
    };

    check(&car);
    car.available_colors.clear();
    car.preferred_colors.push(Box::new(Color {
        base: "\"quoted\"".into(),
        metallic: false,
    }));
    car.price = Decimal::new(-12345, 2);
    check(&car);
    check(&Car::zero());
}

#[test]
fn source_shape_keeps_field_names() {
    let car = celebrity();
    let json = serde_json::to_string(&ValueRef::new(&car)).unwrap();
    assert!(json.starts_with(r#"{"manufacturer":"Chevrolet","#));
    assert!(json.contains(r#""horse_power":130"#));
}

#[derive(Clone, Shaped)]
struct Employee {
    #[shape(tag(json = "name"))]
    pub name: String,
    #[shape(tag(json = "subordinates"))]
    pub subordinates: Vec<Employee>,
}

#[test]
fn circular_structure_returns_error() {
    let err = derive_serialization_shape(Employee::shape(), "json").unwrap_err();
    assert!(matches!(err, TransmuteError::Circular { .. }));
    assert!(
        err.to_string()
            .starts_with("circular type reference to `")
    );
}
