mod fetch;
mod graph;
mod load;
mod records;

pub use fetch::{FetchToken, Fetcher};
pub use graph::{GraphDocument, LinkSpec, NodeSpec};
pub use load::{load_graph, load_records};
pub use records::{FieldValue, Record};
