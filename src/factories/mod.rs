pub mod backend_factory;
