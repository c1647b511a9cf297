pub mod definition;
pub mod edge;
pub mod node;
pub mod value;

pub use definition::*;
pub use edge::*;
pub use node::*;
pub use value::*;
