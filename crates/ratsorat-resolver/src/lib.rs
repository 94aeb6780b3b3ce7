//! Module resolution engine: compiled resolvers that memoize each module's
//! value, detect dependency cycles, and drive whole tables to a fixed point.

pub mod graph;
pub mod path;
pub mod resolve_all;
pub mod resolver;
