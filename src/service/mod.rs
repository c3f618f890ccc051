//! CrudService: generic CRUD using the safe SQL builder.

mod crud;
mod validation;
pub use crud::{row_to_json, CrudService};
pub use validation::RequestValidator;
