pub mod healthy_sequence;
pub mod implanter;
pub mod instantiation;
pub mod motif;
pub mod plan;
pub mod sequence_implanting;
pub mod signal;
pub mod state;
