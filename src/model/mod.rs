pub mod dataset;
pub mod repertoire;
pub mod sequence;
