use std::any::{Any, TypeId};
use std::sync::Arc;

use crate::container::resolver::Resolver;
use crate::errors::CoreError;

/// Service identifier combining the capability type and an optional secondary name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ServiceId {
    pub type_id: TypeId,
    pub type_name: &'static str,
    pub name: Option<String>,
}

impl ServiceId {
    /// Create a new service ID for a type
    pub fn of<T: 'static + ?Sized>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            name: None,
        }
    }

    /// Create a named service ID for a type
    pub fn named<T: 'static + ?Sized>(name: impl Into<String>) -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            name: Some(name.into()),
        }
    }

    /// Check if this ServiceId matches a type and name without allocating
    pub fn matches_named<T: 'static + ?Sized>(&self, name: &str) -> bool {
        self.type_id == TypeId::of::<T>() && self.name.as_deref() == Some(name)
    }

    /// Check if this ServiceId belongs to the capability `T`, named or not
    pub fn is_capability<T: 'static + ?Sized>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }

    /// Get the type name as a string
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl std::fmt::Display for ServiceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{}({})", self.type_name, name),
            None => write!(f, "{}", self.type_name),
        }
    }
}

/// Type-erased instance. The erased value is always an `Arc<T>` for the capability `T`.
pub type AnyInstance = Arc<dyn Any + Send + Sync>;

/// Factory function for creating service instances
pub type ServiceFactory =
    Arc<dyn Fn(&Resolver<'_>) -> Result<AnyInstance, CoreError> + Send + Sync>;

/// How an implementation produces its instances
#[derive(Clone)]
pub enum ServiceActivationStrategy {
    /// Constructed by a factory that may resolve its own dependencies
    Factory(ServiceFactory),
    /// Pre-built object handed in at registration time
    Instance(AnyInstance),
}

impl std::fmt::Debug for ServiceActivationStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceActivationStrategy::Factory(_) => write!(f, "Factory(<factory_fn>)"),
            ServiceActivationStrategy::Instance(_) => write!(f, "Instance(<instance>)"),
        }
    }
}

/// Describes one implementation of a capability
#[derive(Clone)]
pub struct ImplementationDescriptor {
    capability_id: TypeId,
    capability_name: &'static str,
    implementation_name: &'static str,
    activation: ServiceActivationStrategy,
}

impl std::fmt::Debug for ImplementationDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImplementationDescriptor")
            .field("capability", &self.capability_name)
            .field("implementation", &self.implementation_name)
            .field("activation", &self.activation)
            .finish()
    }
}

impl ImplementationDescriptor {
    /// Describe implementation `I` of capability `T`, built by `factory`
    pub fn new<T, I, F>(factory: F) -> Self
    where
        T: ?Sized + Send + Sync + 'static,
        I: ?Sized + 'static,
        F: Fn(&Resolver<'_>) -> Result<Arc<T>, CoreError> + Send + Sync + 'static,
    {
        let factory: ServiceFactory = Arc::new(move |resolver: &Resolver<'_>| {
            let instance = factory(resolver)?;
            Ok(Arc::new(instance) as AnyInstance)
        });

        Self {
            capability_id: TypeId::of::<T>(),
            capability_name: std::any::type_name::<T>(),
            implementation_name: std::any::type_name::<I>(),
            activation: ServiceActivationStrategy::Factory(factory),
        }
    }

    /// Describe a concrete type that is its own capability and builds with `Default`
    pub fn of_default<T>() -> Self
    where
        T: Default + Send + Sync + 'static,
    {
        Self::new::<T, T, _>(|_| Ok(Arc::new(T::default())))
    }

    /// Describe a pre-built instance; every resolution returns this exact `Arc`
    pub fn instance<T>(instance: Arc<T>) -> Self
    where
        T: ?Sized + Send + Sync + 'static,
    {
        Self {
            capability_id: TypeId::of::<T>(),
            capability_name: std::any::type_name::<T>(),
            implementation_name: std::any::type_name::<T>(),
            activation: ServiceActivationStrategy::Instance(Arc::new(instance) as AnyInstance),
        }
    }

    /// Override the implementation name recorded for diagnostics
    pub fn with_implementation_name(mut self, name: &'static str) -> Self {
        self.implementation_name = name;
        self
    }

    /// Key of this implementation's capability, optionally qualified by `name`
    pub fn key(&self, name: Option<String>) -> ServiceId {
        ServiceId {
            type_id: self.capability_id,
            type_name: self.capability_name,
            name,
        }
    }

    pub fn capability_id(&self) -> TypeId {
        self.capability_id
    }

    pub fn capability_name(&self) -> &'static str {
        self.capability_name
    }

    pub fn implementation_name(&self) -> &'static str {
        self.implementation_name
    }

    pub fn activation(&self) -> &ServiceActivationStrategy {
        &self.activation
    }

    pub fn is_instance(&self) -> bool {
        matches!(self.activation, ServiceActivationStrategy::Instance(_))
    }

    /// Produce an erased instance, constructing one if this is a factory
    pub(crate) fn activate(&self, resolver: &Resolver<'_>) -> Result<AnyInstance, CoreError> {
        match &self.activation {
            ServiceActivationStrategy::Factory(factory) => factory(resolver),
            ServiceActivationStrategy::Instance(instance) => Ok(instance.clone()),
        }
    }
}

/// Recover the typed `Arc<T>` from an erased instance
pub(crate) fn downcast_instance<T>(
    instance: &AnyInstance,
    service_id: &ServiceId,
) -> Result<Arc<T>, CoreError>
where
    T: ?Sized + Send + Sync + 'static,
{
    instance
        .downcast_ref::<Arc<T>>()
        .cloned()
        .ok_or_else(|| CoreError::TypeMismatch {
            service_type: service_id.to_string(),
            actual: "an instance of another capability".to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Greeter: Send + Sync {
        fn greet(&self) -> String;
    }

    #[derive(Debug, Default)]
    struct EnglishGreeter;

    impl Greeter for EnglishGreeter {
        fn greet(&self) -> String {
            "hello".to_string()
        }
    }

    #[test]
    fn test_service_id_creation() {
        let id1 = ServiceId::of::<EnglishGreeter>();
        let id2 = ServiceId::named::<EnglishGreeter>("en");

        assert_eq!(id1.type_id, TypeId::of::<EnglishGreeter>());
        assert_eq!(id1.name, None);
        assert_eq!(id2.name, Some("en".to_string()));
        assert!(id2.matches_named::<EnglishGreeter>("en"));
        assert!(id2.is_capability::<EnglishGreeter>());

        assert_ne!(id1, id2);
    }

    #[test]
    fn test_type_name_capture() {
        let id = ServiceId::of::<dyn Greeter>();
        assert!(id.type_name().contains("Greeter"));
        assert_eq!(ServiceId::of::<String>().type_name(), "alloc::string::String");
        assert!(ServiceId::named::<String>("x").to_string().ends_with("String(x)"));
    }

    #[test]
    fn test_descriptor_records_names() {
        let descriptor = ImplementationDescriptor::new::<dyn Greeter, EnglishGreeter, _>(|_| {
            Ok(Arc::new(EnglishGreeter) as Arc<dyn Greeter>)
        });

        assert_eq!(descriptor.capability_id(), TypeId::of::<dyn Greeter>());
        assert!(descriptor.implementation_name().contains("EnglishGreeter"));
        assert!(!descriptor.is_instance());
    }

    #[test]
    fn test_instance_descriptor_downcasts_to_same_arc() {
        let greeter: Arc<dyn Greeter> = Arc::new(EnglishGreeter);
        let descriptor = ImplementationDescriptor::instance(greeter.clone());
        assert!(descriptor.is_instance());

        let erased = match descriptor.activation() {
            ServiceActivationStrategy::Instance(instance) => instance.clone(),
            ServiceActivationStrategy::Factory(_) => panic!("expected instance"),
        };
        let id = ServiceId::of::<dyn Greeter>();
        let recovered = downcast_instance::<dyn Greeter>(&erased, &id).unwrap();
        assert!(Arc::ptr_eq(&recovered, &greeter));
        assert_eq!(recovered.greet(), "hello");

        assert!(downcast_instance::<String>(&erased, &id).is_err());
    }
}
