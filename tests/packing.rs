//! End-to-end packing through the public API.
//!
//! Every category is exercised the way a reflection front end would use it:
//! populate a storage, resolve the packing function for the static type, call
//! it, and inspect the resulting dynamic value.

use std::ptr::NonNull;

use typepack::{
    Category, DynamicValue, Field, Method, PackFn, RawStorage, SourceType, TypeDescriptor,
    category_of, field, markers::Strategy, plain_object, pointer::FnPtr, resolve,
};

#[derive(Clone, Debug, PartialEq)]
struct Sensor {
    id: u32,
    name: String,
    readings: Vec<f32>,
}

plain_object!(Sensor);

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
enum SensorFault {
    #[error("sensor {0} is offline")]
    Offline(u32),
    #[error("reading out of range: {value}")]
    OutOfRange { value: f32 },
}

plain_object!(SensorFault);

struct MyClass {
    value: i32,
}

impl MyClass {
    fn value(&self) -> i32 {
        self.value
    }

    fn scale(&mut self, factor: i32) -> i32 {
        self.value *= factor;
        self.value
    }
}

fn forty_two() -> i32 {
    42
}

fn sensor() -> Sensor {
    Sensor {
        id: 9,
        name: String::from("north"),
        readings: vec![1.0, 2.5],
    }
}

/// Populates a storage for `value` and packs it through `resolve::<T>()`.
fn pack<T: SourceType + ?Sized>(value: &T) -> DynamicValue {
    let storage = <T::Strategy as Strategy<T>>::store(value);
    let pack: PackFn = resolve::<T>();
    // SAFETY: The storage was populated by the strategy of `T`.
    unsafe { pack(storage) }
}

#[test]
fn test_plain_object_scenario() {
    let value = pack(&42_i32);
    assert_eq!(category_of::<i32>(), Category::PlainObject);
    assert!(value.is_valid());
    assert_eq!(value.get::<i32>(), Some(42));
}

#[test]
fn test_plain_object_user_types() {
    let original = sensor();
    let value = pack(&original);
    assert_eq!(value.downcast_ref::<Sensor>(), Some(&original));

    let fault = SensorFault::OutOfRange { value: 99.5 };
    let value = DynamicValue::new(&fault);
    let restored = value.downcast::<SensorFault>().unwrap();
    assert_eq!(restored.to_string(), "reading out of range: 99.5");
    assert_ne!(restored, SensorFault::Offline(1));
}

#[test]
fn test_plain_object_is_copied() {
    let mut original = sensor();
    let value = DynamicValue::new(&original);
    original.readings.push(7.0);
    original.name.push_str("-east");

    let packed = value.downcast_ref::<Sensor>().unwrap();
    assert_eq!(packed.readings, [1.0, 2.5]);
    assert_eq!(packed.name, "north");
    assert_eq!(packed.id, original.id);
}

#[test]
fn test_object_pointer_scenario() {
    let x = 7_i32;
    let ptr: *const i32 = &x;
    let value = pack(&ptr);

    assert_eq!(category_of::<*const i32>(), Category::ObjectPointer);
    let packed = value.get::<*const i32>().unwrap();
    assert!(std::ptr::eq(packed, &x));
    assert!(!value.is::<i32>());
}

#[test]
fn test_object_pointer_is_not_dereferenced() {
    let dangling = NonNull::<u64>::dangling();
    let value = pack(&dangling);
    assert_eq!(value.get::<NonNull<u64>>(), Some(dangling));

    let null: *mut Sensor = std::ptr::null_mut();
    let value = pack(&null);
    assert!(value.get::<*mut Sensor>().unwrap().is_null());
}

#[test]
fn test_function_pointer_scenario() {
    let function: fn() -> i32 = forty_two;
    let value = pack(&function);

    assert_eq!(category_of::<fn() -> i32>(), Category::FunctionPointer);
    let packed = value.get::<fn() -> i32>().unwrap();
    assert_eq!(packed(), 42);
    assert!(std::ptr::fn_addr_eq(packed.to_raw(), function.to_raw()));
}

#[test]
fn test_extern_and_unsafe_function_pointers() {
    extern "C" fn halve(value: u32) -> u32 {
        value / 2
    }

    unsafe fn first(values: *const u8) -> u8 {
        // SAFETY: Only called with a pointer to a live `u8`.
        unsafe { *values }
    }

    let extern_fn: extern "C" fn(u32) -> u32 = halve;
    let value = pack(&extern_fn);
    assert_eq!((value.get::<extern "C" fn(u32) -> u32>().unwrap())(10), 5);

    let unsafe_fn: unsafe fn(*const u8) -> u8 = first;
    let value = pack(&unsafe_fn);
    let restored = value.get::<unsafe fn(*const u8) -> u8>().unwrap();
    let byte = 3_u8;
    // SAFETY: `byte` is a live `u8`.
    assert_eq!(unsafe { restored(&byte) }, 3);
}

#[test]
fn test_bare_function_type_scenario() {
    let closure = |x: i32| x + 1;
    let callback: &(dyn Fn(i32) -> i32 + 'static) = &closure;
    assert_eq!(callback(1), 2);

    assert_eq!(
        category_of::<dyn Fn(i32) -> i32>(),
        Category::BareFunctionType
    );
    assert!(DynamicValue::new(callback).is_empty());

    let number = 5_i64;
    let storages = [
        RawStorage::empty(),
        RawStorage::from_object(&number),
        RawStorage::from_object_ptr(std::ptr::from_ref(&number)),
        RawStorage::from_member_data(usize::MAX),
    ];
    for storage in storages {
        // SAFETY: The packing function of a bare function type never reads the
        // storage.
        let value = unsafe { resolve::<dyn FnOnce(String)>()(storage) };
        assert!(value.is_empty());
    }
}

#[test]
fn test_member_data_pointer() {
    let id: Field<Sensor, u32> = field!(Sensor, id);
    let value = pack(&id);

    assert_eq!(category_of::<Field<Sensor, u32>>(), Category::MemberDataPointer);
    let packed = value.get::<Field<Sensor, u32>>().unwrap();
    assert_eq!(packed.offset(), std::mem::offset_of!(Sensor, id));
    assert_eq!(*packed.get(&sensor()), 9);
}

#[test]
fn test_member_function_pointer_scenario() {
    type Getter = Method<MyClass, fn(&MyClass) -> i32>;
    type Scaler = Method<MyClass, fn(&mut MyClass, i32) -> i32>;

    assert_eq!(category_of::<Getter>(), Category::MemberFunctionPointer);
    assert_ne!(category_of::<Getter>(), Category::ObjectPointer);
    assert_ne!(category_of::<Scaler>(), Category::ObjectPointer);

    let getter = pack(&Getter::new(MyClass::value))
        .get::<Getter>()
        .unwrap();
    let scaler = pack(&Scaler::new(MyClass::scale))
        .get::<Scaler>()
        .unwrap();

    let mut object = MyClass { value: 4 };
    assert_eq!((scaler.function())(&mut object, 3), 12);
    assert_eq!((getter.function())(&object), 12);
    assert_eq!(getter, Getter::new(MyClass::value));
}

#[test]
fn test_resolution_is_deterministic() {
    const FIRST: PackFn = resolve::<fn(u8) -> u8>();
    let second = resolve::<fn(u8) -> u8>();

    fn double(value: u8) -> u8 {
        value * 2
    }
    let function: fn(u8) -> u8 = double;

    for pack in [FIRST, second] {
        let storage = RawStorage::from_function(function.to_raw());
        // SAFETY: The storage holds a `fn(u8) -> u8`.
        let value = unsafe { pack(storage) };
        assert_eq!((value.get::<fn(u8) -> u8>().unwrap())(21), 42);
    }

    let a = TypeDescriptor::of::<Sensor>();
    let b = TypeDescriptor::of::<Sensor>();
    assert!(std::ptr::eq(a, b));
    assert_eq!(a.category(), category_of::<Sensor>());
}

#[test]
fn test_every_category_is_reachable() {
    let categories = [
        category_of::<Sensor>(),
        category_of::<*mut Sensor>(),
        category_of::<extern "C" fn()>(),
        category_of::<dyn FnMut()>(),
        category_of::<Field<Sensor, String>>(),
        category_of::<Method<Sensor, fn(&mut Sensor)>>(),
    ];
    assert_eq!(categories, Category::ALL);
}

#[test]
fn test_packing_from_many_threads() {
    let readings: Vec<Sensor> = (0..8)
        .map(|id| Sensor {
            id,
            name: format!("sensor-{id}"),
            readings: vec![id as f32],
        })
        .collect();

    let ids: Vec<u32> = std::thread::scope(|scope| {
        let handles: Vec<_> = readings
            .iter()
            .map(|reading| {
                scope.spawn(move || {
                    let value = DynamicValue::new(reading);
                    value.downcast::<Sensor>().unwrap().id
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect()
    });

    assert_eq!(ids, (0..8).collect::<Vec<u32>>());
}
