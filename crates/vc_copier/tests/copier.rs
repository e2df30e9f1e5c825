#![expect(unsafe_code, reason = "Hand-written shapes need `unsafe impl Shaped`.")]

use core::convert::Infallible;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use language_tags::LanguageTag;
use prost_types::Timestamp;
use rust_decimal::Decimal;
use uuid::Uuid;
use vc_copier::{
    CompileError, ConversionRegistry, ConvertError, Copier, CopierOptions, CopyError, Copying,
    cast,
};
use vc_shape::cell::NonGenericShapeCell;
use vc_shape::{CopyTo, DynMap, DynValue, Required, Shape, ShapeKind, Shaped, ValueRef};

const ID: &str = "67e55044-10b1-426f-9247-bb680e5fe0c8";

fn copier() -> Copier {
    Copier::with_registry(ConversionRegistry::empty())
}

fn convert_error(err: CopyError) -> ConvertError {
    match err {
        CopyError::Convert(err) => err,
        other => panic!("expected a conversion error, got {other:?}"),
    }
}

fn compile_error(err: CopyError) -> CompileError {
    match err {
        CopyError::Compile(err) => err,
        other => panic!("expected a compile error, got {other:?}"),
    }
}

// -----------------------------------------------------------------------------
// Closed enumerations

#[derive(Clone, Debug, PartialEq, Shaped)]
#[repr(transparent)]
#[shape(transparent, closed_enum("a1", "b2", "c3", "d4"))]
struct AbcEnum(String);

#[derive(Clone, Shaped)]
struct Choice {
    pub value: String,
    pub maybe: Option<Box<String>>,
}

#[derive(Clone, Shaped)]
struct CheckedChoice {
    pub value: AbcEnum,
    pub maybe: Option<AbcEnum>,
}

#[test]
fn closed_enum_accepts_members() {
    let copier = copier();
    let mut checked = CheckedChoice::zero();
    let choice = Choice {
        value: "b2".into(),
        maybe: Some(Box::new("d4".into())),
    };
    copier.copy(&mut checked, &choice).unwrap();
    assert_eq!(checked.value, AbcEnum("b2".into()));
    assert_eq!(checked.maybe, Some(AbcEnum("d4".into())));

    let mut back = Choice::zero();
    copier.copy(&mut back, &checked).unwrap();
    assert_eq!(back.value, "b2");
    assert_eq!(back.maybe.as_deref().map(String::as_str), Some("d4"));

    let choice = Choice {
        value: "a1".into(),
        maybe: None,
    };
    let mut fresh = CheckedChoice::zero();
    copier.copy(&mut fresh, &choice).unwrap();
    assert_eq!(fresh.value, AbcEnum("a1".into()));
    assert_eq!(fresh.maybe, None);
}

#[test]
fn closed_enum_rejects_other_values() {
    let copier = copier();
    let mut checked = CheckedChoice::zero();
    let choice = Choice {
        value: "aa11".into(),
        maybe: None,
    };
    let err = convert_error(copier.copy(&mut checked, &choice).unwrap_err());
    assert_eq!(
        err.root().to_string(),
        "bad value for closed enum value=aa11 dstType=AbcEnum"
    );
    assert_eq!(
        err.to_string(),
        "field `value`: bad value for closed enum value=aa11 dstType=AbcEnum"
    );
}

// -----------------------------------------------------------------------------
// Required values

#[derive(Clone, Shaped)]
struct NewUser {
    pub name: Required<String>,
    pub age: Required<u8>,
}

#[derive(Clone, Shaped)]
struct User {
    pub name: String,
    pub age: u32,
}

#[test]
fn required_values_unwrap_or_fail() {
    let copier = copier();
    let mut user = User::zero();
    let new_user = NewUser {
        name: Required::new("ada".into()),
        age: Required::new(36),
    };
    copier.copy(&mut user, &new_user).unwrap();
    assert_eq!(user.name, "ada");
    assert_eq!(user.age, 36);

    let new_user = NewUser {
        name: Required::new("bob".into()),
        age: Required::missing(),
    };
    let err = convert_error(copier.copy(&mut user, &new_user).unwrap_err());
    assert!(matches!(err.root(), ConvertError::RequiredMissing { .. }));
    assert!(err.root().to_string().starts_with("required field has no value"));
    // Fields before the failing one are written.
    assert_eq!(user.name, "bob");
}

// -----------------------------------------------------------------------------
// Self-converting sources

#[derive(Clone, Shaped)]
#[shape(copy_to)]
struct Digits {
    pub digits: Vec<u8>,
}

impl CopyTo for Digits {
    fn can_copy_to(target: &Shape) -> bool {
        target.is::<String>()
    }

    fn copy_to(&self, _target: &'static Shape) -> DynValue {
        DynValue::new(self.digits.iter().map(u8::to_string).collect::<String>())
    }
}

#[derive(Clone, Shaped)]
struct Packet {
    pub body: Box<Digits>,
}

#[derive(Clone, Shaped)]
struct TextPacket {
    pub body: Box<String>,
}

#[derive(Clone, Shaped)]
struct NumberPacket {
    pub body: Box<i64>,
}

#[test]
fn copy_to_produces_destination() {
    let copier = copier();
    let mut text = TextPacket::zero();
    let packet = Packet {
        body: Box::new(Digits {
            digits: vec![1, 2, 3, 4],
        }),
    };
    copier.copy(&mut text, &packet).unwrap();
    assert_eq!(*text.body, "1234");
}

#[test]
fn copy_to_refusal_fails_compilation() {
    let copier = copier();
    let mut number = NumberPacket::zero();
    let packet = Packet {
        body: Box::new(Digits { digits: vec![7] }),
    };
    let err = compile_error(copier.copy(&mut number, &packet).unwrap_err());
    assert!(matches!(err.root(), CompileError::CopyToRefused { dst: "i64", .. }));
    assert!(err.root().to_string().starts_with("can't copy"));
    assert!(copier.cache().is_empty());
}

// -----------------------------------------------------------------------------
// Value and slice copiers

#[test]
fn value_copier_parses_identifiers() {
    let copier = Copier::new();
    let to_uuid = copier.value_copier::<Uuid, String>().unwrap();
    let id = to_uuid.copy(&ID.to_string()).unwrap();
    assert_eq!(id.to_string(), ID);

    let err = to_uuid.copy(&"uuid".to_string()).unwrap_err();
    assert!(matches!(err, ConvertError::Parse { ty: "Uuid", .. }));

    let boxed = to_uuid.copy_boxed(&ID.to_string()).unwrap();
    assert_eq!(*boxed, id);
}

#[test]
fn slice_copier_stops_at_first_failure() {
    let to_uuid = vc_copier::slice_copier::<Uuid, String>().unwrap();
    let ids = to_uuid.copy(&[ID.to_string(), Uuid::nil().to_string()]).unwrap();
    assert_eq!(ids, [Uuid::parse_str(ID).unwrap(), Uuid::nil()]);

    let err = to_uuid.copy(&[ID.to_string(), "uuid".to_string()]).unwrap_err();
    assert!(matches!(err, ConvertError::Parse { ref value, .. } if value == "uuid"));

    let to_text = vc_copier::slice_copier::<String, Uuid>().unwrap();
    assert_eq!(to_text.copy(&ids).unwrap(), [ID.to_string(), Uuid::nil().to_string()]);
}

#[test]
fn cast_wraps_plain_functions() {
    let double = cast(|value: &i32| i64::from(*value) * 2);
    assert_eq!(double.copy(&21).unwrap(), 42);
    assert_eq!(*double.copy_boxed(&4).unwrap(), 8);
}

// -----------------------------------------------------------------------------
// Maps

#[derive(Clone, Debug, Shaped)]
struct Counter {
    #[shape(key = "Num")]
    pub number: i32,
    pub label: String,
    #[shape(skip)]
    pub scratch: Vec<u8>,
    hits: u64,
}

#[test]
fn record_into_map_uses_keys() {
    let copier = copier();
    let to_map = copier.value_copier::<DynMap, Counter>().unwrap();
    let counter = Counter {
        number: 7,
        label: "seven".into(),
        scratch: vec![1],
        hits: 3,
    };
    let map = to_map.copy(&counter).unwrap();
    assert_eq!(map.len(), 2);
    assert_eq!(map["Num"].downcast_ref::<i32>(), Some(&7));
    assert_eq!(
        serde_json::to_string(&ValueRef::new(&map)).unwrap(),
        r#"{"Num":7,"label":"seven"}"#
    );
}

#[test]
fn map_into_record_checks_keys_and_types() {
    let copier = copier();
    let from_map = copier.value_copier::<Counter, DynMap>().unwrap();

    let mut map = DynMap::default();
    map.insert("Num".into(), DynValue::new(9_i32));
    map.insert("label".into(), DynValue::new(String::from("nine")));
    let counter = from_map.copy(&map).unwrap();
    assert_eq!(counter.number, 9);
    assert_eq!(counter.label, "nine");
    assert_eq!(counter.hits, 0);

    map.remove("label");
    let err = from_map.copy(&map).unwrap_err();
    assert!(matches!(err, ConvertError::MapKeyMissing { key: "label" }));

    map.insert("label".into(), DynValue::new(String::new()));
    map.insert("Num".into(), DynValue::new(9_i64));
    let err = from_map.copy(&map).unwrap_err();
    assert!(matches!(
        err,
        ConvertError::MapValueMismatch {
            key: "Num",
            expected: "i32",
            found: "i64"
        }
    ));
}

// -----------------------------------------------------------------------------
// Records

#[derive(Clone, Shaped)]
struct IdRow {
    pub id: String,
}

#[derive(Clone, Debug, Shaped)]
struct IdModel {
    pub id: Uuid,
}

#[test]
fn copy_map_converts_every_item() {
    let rows = vec![
        IdRow { id: ID.into() },
        IdRow {
            id: Uuid::nil().to_string(),
        },
    ];
    let models: Vec<IdModel> = vc_copier::copy_map(&rows).unwrap();
    assert_eq!(models.len(), 2);
    assert_eq!(models[0].id.to_string(), ID);
    assert!(models[1].id.is_nil());

    let rows = vec![IdRow { id: "uuid".into() }];
    let err = convert_error(vc_copier::copy_map::<IdModel, IdRow>(&rows).unwrap_err());
    assert!(matches!(err.root(), ConvertError::Parse { .. }));
}

#[derive(Clone, Shaped)]
struct TagRow {
    pub tags: Vec<String>,
}

#[derive(Clone, Debug, Shaped)]
struct TagModel {
    pub tags: Vec<Uuid>,
}

#[test]
fn list_fields_convert_every_item() {
    let copier = copier();
    let mut model = TagModel::zero();
    let row = TagRow {
        tags: vec![ID.into(), Uuid::nil().to_string()],
    };
    copier.copy(&mut model, &row).unwrap();
    assert_eq!(model.tags.len(), 2);
    assert_eq!(model.tags[0].to_string(), ID);
    assert!(model.tags[1].is_nil());

    let row = TagRow {
        tags: vec![ID.into(), "uuid".into()],
    };
    let err = convert_error(copier.copy(&mut TagModel::zero(), &row).unwrap_err());
    assert!(matches!(err, ConvertError::InField { field: "tags", .. }));
    assert!(matches!(err.root(), ConvertError::Parse { value, ty: "Uuid", .. } if value == "uuid"));
    assert!(err.to_string().starts_with("field `tags`: cannot parse `uuid` as `Uuid`"));
}

#[derive(Clone, Shaped)]
struct Account {
    pub name: String,
    pub email: String,
    pub balance: i64,
    password: String,
    #[shape(skip)]
    pub session: Vec<u8>,
}

#[derive(Clone, Shaped)]
struct AccountView {
    pub name: String,
    pub email: String,
    pub password: String,
    pub session: Vec<u8>,
}

fn account() -> Account {
    Account {
        name: "ada".into(),
        email: "ada@example.com".into(),
        balance: 10,
        password: "hunter2".into(),
        session: vec![9],
    }
}

#[test]
fn missing_destination_field_fails_unless_omitted() {
    let copier = copier();
    let mut view = AccountView::zero();
    let err = compile_error(copier.copy(&mut view, &account()).unwrap_err());
    assert_eq!(
        *err.root(),
        CompileError::FieldNotFound {
            field: "balance",
            src: Account::shape().type_path(),
            dst: AccountView::shape().type_path(),
        }
    );

    let options = CopierOptions::new().omit_not_found();
    copier.copy_with(&mut view, &account(), &options).unwrap();
    assert_eq!(view.name, "ada");
    assert_eq!(view.email, "ada@example.com");
    // Private and skipped source fields are never copied.
    assert!(view.password.is_empty());
    assert!(view.session.is_empty());
}

#[test]
fn include_and_exclude_select_fields() {
    let copier = copier();

    let mut view = AccountView::zero();
    let options = CopierOptions::new().include(["name"]);
    copier.copy_with(&mut view, &account(), &options).unwrap();
    assert_eq!(view.name, "ada");
    assert!(view.email.is_empty());

    let mut view = AccountView::zero();
    let options = CopierOptions::new().exclude(["name", "balance"]);
    copier.copy_with(&mut view, &account(), &options).unwrap();
    assert!(view.name.is_empty());
    assert_eq!(view.email, "ada@example.com");
}

#[test]
fn options_are_cached_separately() {
    let copier = copier();
    let include = CopierOptions::new().include(["name"]);
    let exclude = CopierOptions::new().exclude(["balance"]);
    let (dst, src) = (AccountView::shape(), Account::shape());

    let first = copier.struct_copier_with(dst, src, &include).unwrap();
    let again = copier.struct_copier_with(dst, src, &include).unwrap();
    assert!(Arc::ptr_eq(&first, &again));
    assert_eq!(first.field_names().collect::<Vec<_>>(), ["name"]);

    let other = copier.struct_copier_with(dst, src, &exclude).unwrap();
    assert!(!Arc::ptr_eq(&first, &other));
    assert_eq!(other.field_names().collect::<Vec<_>>(), ["name", "email"]);
    assert_eq!(copier.cache().len(), 2);

    copier.cache().clear();
    assert!(copier.cache().is_empty());
    assert_eq!(first.len(), 1);
}

#[test]
fn struct_copier_checks_types() {
    let copier = copier();
    let struct_copier = copier
        .struct_copier(IdModel::shape(), IdRow::shape())
        .unwrap();
    let model: Box<IdModel> = struct_copier.copy_boxed(&IdRow { id: ID.into() }).unwrap();
    assert_eq!(model.id.to_string(), ID);

    let mut view = AccountView::zero();
    let err = struct_copier
        .copy_into(&mut view, &IdRow { id: ID.into() })
        .unwrap_err();
    assert!(matches!(err, ConvertError::TypeMismatch { .. }));
}

#[derive(Clone, Shaped)]
struct Inner {
    pub count: i32,
}

#[derive(Clone, Shaped)]
struct Outer {
    pub inner: Inner,
    pub items: Vec<Inner>,
}

#[derive(Clone, Shaped)]
struct WideInner {
    pub count: i64,
}

#[derive(Clone, Shaped)]
struct WideOuter {
    pub inner: Box<WideInner>,
    pub items: Vec<Option<WideInner>>,
}

#[test]
fn nested_records_share_cached_copiers() {
    let copier = copier();
    let mut wide = WideOuter::zero();
    let outer = Outer {
        inner: Inner { count: 1 },
        items: vec![Inner { count: 2 }, Inner { count: 0 }],
    };
    copier.copy(&mut wide, &outer).unwrap();
    assert_eq!(wide.inner.count, 1);
    assert_eq!(wide.items.len(), 2);
    assert_eq!(wide.items[0].as_ref().map(|item| item.count), Some(2));
    // A zero record becomes absent.
    assert!(wide.items[1].is_none());
    assert_eq!(copier.cache().len(), 2);
}

#[derive(Clone, Shaped)]
struct Node {
    pub value: i32,
    pub next: Option<Box<Node>>,
}

#[derive(Clone, Shaped)]
struct Link {
    pub value: i64,
    pub next: Option<Box<Link>>,
}

#[test]
fn circular_records_are_reported() {
    let copier = copier();
    let mut link = Link::zero();
    let node = Node {
        value: 1,
        next: None,
    };
    let err = compile_error(copier.copy(&mut link, &node).unwrap_err());
    assert!(matches!(err.root(), CompileError::Circular { .. }));

    // The same type on both sides clones without recursing.
    let mut copy = Node::zero();
    let node = Node {
        value: 1,
        next: Some(Box::new(Node {
            value: 2,
            next: None,
        })),
    };
    copier.copy(&mut copy, &node).unwrap();
    assert_eq!(copy.next.map(|next| next.value), Some(2));
}

#[derive(Clone, Shaped)]
struct Tree {
    pub name: String,
    pub children: Vec<Tree>,
}

#[derive(Clone, Shaped)]
struct Forest {
    pub name: String,
    pub children: Vec<Forest>,
}

#[test]
fn records_holding_lists_of_themselves_are_reported() {
    let copier = copier();
    let mut forest = Forest::zero();
    let tree = Tree {
        name: "root".into(),
        children: Vec::new(),
    };
    let err = compile_error(copier.copy(&mut forest, &tree).unwrap_err());
    assert!(matches!(err, CompileError::InField { field: "children", .. }));
    assert!(matches!(err.root(), CompileError::Circular { .. }));
    // Not cached, the next request compiles again and fails the same way.
    assert!(copier.cache().is_empty());
    assert!(copier.copy(&mut forest, &tree).is_err());
}

#[derive(Clone, Debug, PartialEq, Shaped)]
struct Everything {
    pub flag: bool,
    pub letter: char,
    pub small: i8,
    pub large: u64,
    pub ratio: f32,
    pub text: String,
    pub list: Vec<String>,
    pub boxed: Box<i32>,
    pub nullable: Option<Box<String>>,
    pub optional: Option<u16>,
    pub required: Required<String>,
    pub id: Uuid,
    pub at: DateTime<Utc>,
}

#[test]
fn identical_records_copy_every_field() {
    let copier = copier();
    let everything = Everything {
        flag: true,
        letter: 'x',
        small: -4,
        large: u64::MAX,
        ratio: 0.5,
        text: "text".into(),
        list: vec!["a".into(), "b".into()],
        boxed: Box::new(9),
        nullable: Some(Box::new("n".into())),
        optional: Some(3),
        required: Required::new("r".into()),
        id: Uuid::parse_str(ID).unwrap(),
        at: Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap(),
    };
    let mut copy = Everything::zero();
    copier.copy(&mut copy, &everything).unwrap();
    assert_eq!(copy, everything);
}

#[derive(Clone, Shaped)]
struct Boxed {
    pub value: Option<Box<i32>>,
}

#[derive(Clone, Shaped)]
struct Optional {
    pub value: Option<i32>,
}

#[test]
fn pointers_and_optionals_mirror_each_other() {
    let copier = copier();
    let mut optional = Optional::zero();
    let mut boxed = Boxed::zero();

    copier
        .copy(&mut optional, &Boxed { value: Some(Box::new(5)) })
        .unwrap();
    assert_eq!(optional.value, Some(5));
    copier.copy(&mut boxed, &optional).unwrap();
    assert_eq!(boxed.value.as_deref(), Some(&5));

    // An absent source leaves a filled destination as it was.
    copier.copy(&mut optional, &Boxed { value: None }).unwrap();
    assert_eq!(optional.value, Some(5));
    copier.copy(&mut boxed, &Optional { value: None }).unwrap();
    assert_eq!(boxed.value.as_deref(), Some(&5));

    let mut optional = Optional::zero();
    copier.copy(&mut optional, &Boxed { value: None }).unwrap();
    assert_eq!(optional.value, None);
    let mut boxed = Boxed::zero();
    copier.copy(&mut boxed, &optional).unwrap();
    assert!(boxed.value.is_none());
}

// -----------------------------------------------------------------------------
// Numbers

#[derive(Clone, Shaped)]
struct Wide {
    pub small: i64,
    pub ratio: i32,
}

#[derive(Clone, Shaped)]
struct Narrow {
    pub small: u8,
    pub ratio: f64,
}

#[test]
fn narrowing_is_checked() {
    let copier = copier();
    let mut narrow = Narrow::zero();
    copier
        .copy(&mut narrow, &Wide { small: 200, ratio: -3 })
        .unwrap();
    assert_eq!(narrow.small, 200);
    assert_eq!(narrow.ratio, -3.0);

    let err = convert_error(
        copier
            .copy(&mut narrow, &Wide { small: 300, ratio: 0 })
            .unwrap_err(),
    );
    assert_eq!(err.to_string(), "field `small`: value 300 does not fit in `u8`");
    assert_eq!(narrow.small, 200);
}

#[test]
fn float_into_integer_is_unsupported() {
    let copier = copier();
    let mut wide = Wide::zero();
    let err = compile_error(
        copier
            .copy(&mut wide, &Narrow { small: 1, ratio: 1.0 })
            .unwrap_err(),
    );
    assert!(matches!(err, CompileError::InField { field: "ratio", .. }));
    assert!(matches!(err.root(), CompileError::Unsupported { dst: "i32", src: "f64" }));
}

#[derive(Clone, Shaped)]
struct Tally {
    pub total: i64,
    pub count: u64,
    pub part: i32,
}

#[derive(Clone, Shaped)]
struct FloatTally {
    pub total: f64,
    pub count: f64,
    pub part: f32,
}

#[test]
fn integers_convert_into_floats() {
    let copier = copier();
    let mut tally = FloatTally::zero();
    let source = Tally {
        total: -9_007_199_254_740_993,
        count: 12,
        part: 3,
    };
    copier.copy(&mut tally, &source).unwrap();
    assert_eq!(tally.total, -9_007_199_254_740_992.0);
    assert_eq!(tally.count, 12.0);
    assert_eq!(tally.part, 3.0);
}

// -----------------------------------------------------------------------------
// Domain values

#[derive(Clone, Shaped)]
struct Event {
    pub at: DateTime<Utc>,
    pub day: NaiveDate,
    pub until: Option<DateTime<Utc>>,
    pub price: Decimal,
    pub lang: LanguageTag,
}

#[derive(Clone, Shaped)]
struct WireEvent {
    pub at: Option<Timestamp>,
    pub day: Option<Timestamp>,
    pub until: Option<Box<Timestamp>>,
    pub price: String,
    pub lang: String,
}

fn event() -> Event {
    Event {
        at: Utc.with_ymd_and_hms(2021, 3, 4, 5, 6, 7).unwrap(),
        day: NaiveDate::from_ymd_opt(2021, 3, 4).unwrap(),
        until: None,
        price: Decimal::new(1999, 2),
        lang: LanguageTag::parse("en-US").unwrap(),
    }
}

#[test]
fn domain_values_round_trip_through_wire_types() {
    let copier = copier();
    let mut wire = WireEvent::zero();
    copier.copy(&mut wire, &event()).unwrap();
    assert_eq!(wire.at.map(|at| at.seconds), Some(1_614_834_367));
    assert_eq!(
        wire.day,
        Some(Timestamp {
            seconds: 1_614_816_000,
            nanos: 0
        })
    );
    assert!(wire.until.is_none());
    assert_eq!(wire.price, "19.99");
    assert_eq!(wire.lang, "en-US");

    let mut back = Event::zero();
    copier.copy(&mut back, &wire).unwrap();
    assert_eq!(back.at, event().at);
    assert_eq!(back.day, event().day);
    assert_eq!(back.price, event().price);
    assert_eq!(back.lang, event().lang);
}

#[test]
fn invalid_wire_values() {
    let copier = copier();
    let mut back = event();
    let wire = WireEvent {
        at: Some(Timestamp {
            seconds: i64::MAX,
            nanos: 0,
        }),
        day: None,
        until: None,
        price: String::new(),
        lang: "en-US".into(),
    };
    copier.copy(&mut back, &wire).unwrap();
    // Invalid and missing timestamps leave the destination untouched.
    assert_eq!(back.at, event().at);
    assert_eq!(back.day, event().day);
    assert_eq!(back.price, Decimal::ZERO);

    let wire = WireEvent {
        price: "cheap".into(),
        ..wire
    };
    let err = convert_error(copier.copy(&mut back, &wire).unwrap_err());
    assert!(matches!(err, ConvertError::InField { field: "price", .. }));
    assert!(matches!(err.root(), ConvertError::Parse { ty: "Decimal", .. }));
}

// -----------------------------------------------------------------------------
// Registered conversions

#[derive(Clone, Shaped)]
struct Reading {
    pub celsius: f64,
    pub station: String,
}

#[derive(Clone, Shaped)]
struct Display {
    pub celsius: String,
    pub station: u32,
}

#[test]
fn registered_conversions_take_precedence() {
    let mut registry = ConversionRegistry::empty();
    registry.register(|celsius: &f64| Ok::<_, Infallible>(format!("{celsius:.1}°C")));
    registry.register(|station: &String| station.parse::<u32>());
    let copier = Copier::with_registry(registry);

    let mut display = Display::zero();
    let reading = Reading {
        celsius: 21.5,
        station: "42".into(),
    };
    copier.copy(&mut display, &reading).unwrap();
    assert_eq!(display.celsius, "21.5°C");
    assert_eq!(display.station, 42);

    let reading = Reading {
        station: "north".into(),
        ..reading
    };
    let err = convert_error(copier.copy(&mut display, &reading).unwrap_err());
    assert!(matches!(
        err.root(),
        ConvertError::Custom {
            src: "alloc::string::String",
            dst: "u32",
            ..
        }
    ));
}

#[test]
fn domain_registry_replaces_built_in_rules() {
    let copier = Copier::with_registry(ConversionRegistry::empty().with_domain_conversions());
    let mut model = IdModel::zero();
    copier.copy(&mut model, &IdRow { id: ID.into() }).unwrap();
    assert_eq!(model.id.to_string(), ID);

    let err = convert_error(copier.copy(&mut model, &IdRow { id: "uuid".into() }).unwrap_err());
    assert!(matches!(err.root(), ConvertError::Custom { dst: "uuid::Uuid", .. }));
}

// -----------------------------------------------------------------------------
// Hand-written shapes

#[derive(Clone, Debug, PartialEq)]
struct Badge(String);

// SAFETY: the shape is built for `Self`.
unsafe impl Shaped for Badge {
    fn shape() -> &'static Shape {
        static CELL: NonGenericShapeCell = NonGenericShapeCell::new();
        CELL.get_or_init(|| Shape::new::<Self>(ShapeKind::Opaque))
    }

    fn zero() -> Self {
        Badge(String::new())
    }

    fn is_zero(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Clone, Shaped)]
struct Visitor {
    pub badge: Badge,
    pub name: String,
}

#[derive(Clone, Shaped)]
struct VisitorView {
    pub badge: Badge,
}

#[test]
fn hand_written_shape_is_cloned() {
    let copier = copier();
    let to_badge = copier.value_copier::<Badge, Badge>().unwrap();
    assert_eq!(to_badge.copy(&Badge("b-17".into())).unwrap(), Badge("b-17".into()));

    let mut view = VisitorView::zero();
    let visitor = Visitor {
        badge: Badge("b-18".into()),
        name: "eve".into(),
    };
    let options = CopierOptions::new().omit_not_found();
    copier.copy_with(&mut view, &visitor, &options).unwrap();
    assert_eq!(view.badge, Badge("b-18".into()));
}

// -----------------------------------------------------------------------------
// Concurrency

#[test]
fn shared_engine_across_threads() {
    let copier = copier();
    std::thread::scope(|scope| {
        for index in 0..4_i32 {
            let copier = &copier;
            scope.spawn(move || {
                for _ in 0..32 {
                    let mut narrow = Narrow::zero();
                    let wide = Wide {
                        small: i64::from(index),
                        ratio: index,
                    };
                    copier.copy(&mut narrow, &wide).unwrap();
                    assert_eq!(i32::from(narrow.small), index);
                }
            });
        }
    });
    assert_eq!(copier.cache().len(), 1);
}
