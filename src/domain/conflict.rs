pub mod conflict_graph;
pub mod conflict_graph_builder;
