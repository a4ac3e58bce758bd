mod association;
pub use association::{Accessors, Association, Relation, Through};

mod attribute;
pub use attribute::{Attribute, AttributeType, AutoStrategy, Transform};

mod definition;
pub use definition::{DefineOptions, ModelOptions, SchemaDefinition};

mod extension;
pub use extension::{HookKind, Hooks, Method, StaticMethod};

mod model;
pub use model::{Model, ModelId};

mod name;
pub use name::Name;

mod registry;
pub use registry::Registry;

mod spec;
pub use spec::{AssociationKind, AssociationOptions, AssociationSpec, NormalizedAssociation};
