//! Runtime lookup of packing functions through the type registry.

use std::any::TypeId;

use typepack::{
    Category, DynamicValue, Field, Method, RawStorage, RegistryError, TypeDescriptor,
    TypeRegistry, field, plain_object,
};

#[derive(Clone, Debug, PartialEq)]
struct Order {
    id: u64,
    total: u32,
}

plain_object!(Order);

impl Order {
    fn total(&self) -> u32 {
        self.total
    }
}

#[test]
fn test_pack_by_type_id() {
    let registry = TypeRegistry::new();
    registry.register::<Order>();
    registry.register::<*const Order>();

    let order = Order { id: 1, total: 250 };
    let ptr: *const Order = &order;

    let storage = RawStorage::from_object(&order);
    // SAFETY: The storage holds an `Order`, the type registered for this ID.
    let value = unsafe { registry.pack(TypeId::of::<Order>(), storage) };
    assert_eq!(value.unwrap().downcast_ref::<Order>(), Some(&order));

    let storage = RawStorage::from_object_ptr(ptr);
    // SAFETY: The storage holds a `*const Order`.
    let value = unsafe { registry.pack(TypeId::of::<*const Order>(), storage) };
    assert_eq!(value.unwrap().get::<*const Order>(), Some(ptr));
}

#[test]
fn test_unregistered_type_is_an_error() {
    let registry = TypeRegistry::new();
    registry.register::<Order>();

    // SAFETY: The lookup fails before the storage could be read.
    let result = unsafe { registry.pack(TypeId::of::<u64>(), RawStorage::empty()) };
    assert_eq!(
        result.unwrap_err(),
        RegistryError::Unregistered {
            type_id: TypeId::of::<u64>()
        }
    );
}

#[test]
fn test_member_accessors_by_name() {
    let registry = TypeRegistry::new();
    let field_descriptor = registry.register::<Field<Order, u32>>();
    let method_descriptor = registry.register::<Method<Order, fn(&Order) -> u32>>();

    let found = registry
        .get_by_name(std::any::type_name::<Field<Order, u32>>())
        .unwrap();
    assert!(std::ptr::eq(found, field_descriptor));
    assert_eq!(found.category(), Category::MemberDataPointer);
    assert_eq!(
        method_descriptor.category(),
        Category::MemberFunctionPointer
    );

    let total = field!(Order, total);
    let value = DynamicValue::new(&total);
    let order = Order { id: 2, total: 80 };
    let field = value.get::<Field<Order, u32>>().unwrap();
    assert_eq!(*field.get(&order), 80);

    let method = DynamicValue::new(&Method::<Order, fn(&Order) -> u32>::new(Order::total));
    let method = method.get::<Method<Order, fn(&Order) -> u32>>().unwrap();
    assert_eq!((method.function())(&order), 80);
    assert_eq!(order.id, 2);
}

#[test]
fn test_strict_registration() {
    let registry = TypeRegistry::new();

    let error = registry.try_register::<dyn Fn(String)>().unwrap_err();
    let RegistryError::Unpackable { type_name } = error else {
        panic!("unexpected error: {error}");
    };
    assert!(type_name.contains("Fn"));
    assert!(!registry.contains(TypeId::of::<dyn Fn(String)>()));

    let descriptor = registry.try_register::<fn(u8)>().unwrap();
    assert_eq!(descriptor.category(), Category::FunctionPointer);
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_register_descriptor_directly() {
    let registry = TypeRegistry::new();
    let descriptor = TypeDescriptor::of::<Vec<Order>>();

    assert!(std::ptr::eq(registry.register_descriptor(descriptor), descriptor));
    assert!(std::ptr::eq(registry.register::<Vec<Order>>(), descriptor));
    assert_eq!(registry.descriptors().len(), 1);
}

#[test]
fn test_concurrent_registration() {
    let registry = TypeRegistry::new();

    std::thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                registry.register::<Order>();
                registry.register::<u64>();
                registry.register::<fn() -> Order>();
            });
        }
    });

    assert_eq!(registry.len(), 3);
    let categories: Vec<Category> = registry
        .descriptors()
        .iter()
        .map(|descriptor| descriptor.category())
        .collect();
    let plain = categories
        .iter()
        .filter(|category| **category == Category::PlainObject)
        .count();
    assert_eq!(plain, 2);
    assert!(categories.contains(&Category::FunctionPointer));
}

#[test]
fn test_global_registry() {
    struct OnlyHere;

    let registry = TypeRegistry::global();
    assert!(!registry.contains(TypeId::of::<*mut OnlyHere>()));
    registry.register::<*mut OnlyHere>();
    assert!(TypeRegistry::global().contains(TypeId::of::<*mut OnlyHere>()));
}
