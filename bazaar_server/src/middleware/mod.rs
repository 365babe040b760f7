mod identity;

pub use identity::IdentityMiddlewareFactory;
