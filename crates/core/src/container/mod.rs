pub mod binding;
mod construction;
pub mod descriptor;
pub mod resolver;
pub mod scope;
pub mod store;


pub use binding::{Binding, BindingKey, CollectionBinding};
pub use descriptor::{
    AnyInstance, ImplementationDescriptor, ServiceActivationStrategy, ServiceFactory, ServiceId,
};
pub use resolver::Resolver;
pub use scope::{DuplicatePolicy, ServiceScope};
pub use store::BindingStore;
